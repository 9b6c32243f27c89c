//! Database operations for the storefront `PostgreSQL` schema.
//!
//! ## Tables
//!
//! - `app_user` - Accounts and password hashes
//! - `session` - Tower-sessions storage (managed by the session store)
//! - `category` / `subcategory` / `tag` - Catalog taxonomy
//! - `product` and satellites (`product_image`, `product_sale`,
//!   `product_specification`, `product_tag`, `review`)
//! - `basket` / `temporary_basket` - Mutable pre-checkout line items
//! - `orders` / `order_item` / `payment` - Checkout state
//! - `profile` / `profile_image` - One-to-one user profiles
//!
//! # Migrations
//!
//! Migrations live in `crates/storefront/migrations/` and run at startup,
//! followed by the session store's own table migration.
//!
//! Queries are runtime-bound (`sqlx::query` / `query_as` / `QueryBuilder`)
//! so the workspace builds without a reachable database.

pub mod baskets;
pub mod catalog;
pub mod orders;
pub mod profiles;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors returned by the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The requested row does not exist.
    #[error("row not found")]
    NotFound,

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored value could not be interpreted.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
