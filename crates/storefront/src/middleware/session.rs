//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions.

use sqlx::PgPool;
use tower_sessions::{Expiry, Session, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;
use uuid::Uuid;

use crate::config::StorefrontConfig;
use crate::models::session_keys;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "mercato_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with `PostgreSQL` store.
///
/// The sessions table is created by the store's own migration at startup.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore> {
    let store = PostgresStore::new(pool.clone());

    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Create the session table if it doesn't exist yet. Runs once at startup.
///
/// # Errors
///
/// Returns an error if the store migration fails.
pub async fn migrate_session_store(pool: &PgPool) -> Result<(), sqlx::Error> {
    PostgresStore::new(pool.clone()).migrate().await
}

/// The anonymous basket token stored in this session, if one was issued.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn basket_token(session: &Session) -> Result<Option<String>, tower_sessions::session::Error> {
    session.get::<String>(session_keys::BASKET_TOKEN).await
}

/// The anonymous basket token for this session, issuing a fresh one on the
/// first anonymous basket write.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn ensure_basket_token(
    session: &Session,
) -> Result<String, tower_sessions::session::Error> {
    if let Some(token) = session.get::<String>(session_keys::BASKET_TOKEN).await? {
        return Ok(token);
    }

    let token = Uuid::new_v4().to_string();
    session.insert(session_keys::BASKET_TOKEN, &token).await?;

    Ok(token)
}

/// Remove the anonymous basket token after its lines were merged into an
/// authenticated basket.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn clear_basket_token(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<String>(session_keys::BASKET_TOKEN).await?;
    Ok(())
}
