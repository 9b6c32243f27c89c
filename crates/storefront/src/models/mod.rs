//! Domain models and wire-level views for the storefront.
//!
//! Row structs live next to the repositories that load them; the types here
//! are either domain objects (`User`) or the typed JSON shapes each endpoint
//! serializes - one explicit struct per payload, validated at the boundary.

pub mod basket;
pub mod catalog;
pub mod order;
pub mod pagination;
pub mod profile;
pub mod session;
pub mod user;

pub use session::{CurrentUser, session_keys};
