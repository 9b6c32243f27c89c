//! Session-related types.
//!
//! Types stored in the session for authentication state and for the
//! anonymous basket identity.

use serde::{Deserialize, Serialize};

use mercato_core::UserId;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's login name.
    pub username: String,
}

/// Session keys.
pub mod session_keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the anonymous basket token. Issued lazily on the first
    /// anonymous basket write and re-read from the session on every request,
    /// never from process-wide state.
    pub const BASKET_TOKEN: &str = "basket_token";
}
