//! Database-backed integration tests for Mercato.
//!
//! Every test in `tests/` runs under `#[sqlx::test]` against its own
//! throwaway database with the storefront migrations applied, so
//! `DATABASE_URL` must point at a `PostgreSQL` server with create-database
//! rights.
//!
//! This crate holds the shared seeding helpers; the tests themselves live in
//! `tests/`.

// Fixture helpers panic on seed failure.
#![allow(clippy::missing_panics_doc)]

use rust_decimal::Decimal;
use sqlx::PgPool;

/// Insert an account and return its id.
///
/// The password hash is a placeholder; tests that exercise login go through
/// the sign-up endpoint instead.
pub async fn seed_user(pool: &PgPool, username: &str) -> i32 {
    let (id,): (i32,) = sqlx::query_as(
        "INSERT INTO app_user (username, first_name, password_hash)
         VALUES ($1, 'Test', 'x')
         RETURNING id",
    )
    .bind(username)
    .fetch_one(pool)
    .await
    .expect("seed app_user");

    id
}

/// Insert a category with one subcategory and return the subcategory id.
pub async fn seed_subcategory(pool: &PgPool) -> i32 {
    let (category,): (i32,) =
        sqlx::query_as("INSERT INTO category (title) VALUES ('Fixture') RETURNING id")
            .fetch_one(pool)
            .await
            .expect("seed category");

    let (id,): (i32,) = sqlx::query_as(
        "INSERT INTO subcategory (category_id, title) VALUES ($1, 'Fixture') RETURNING id",
    )
    .bind(category)
    .fetch_one(pool)
    .await
    .expect("seed subcategory");

    id
}

/// Insert a product and return its id.
pub async fn seed_product(pool: &PgPool, subcategory: i32, title: &str, price: &str) -> i32 {
    let (id,): (i32,) = sqlx::query_as(
        "INSERT INTO product (subcategory_id, title, price, count)
         VALUES ($1, $2, $3::numeric, 100)
         RETURNING id",
    )
    .bind(subcategory)
    .bind(title)
    .bind(price)
    .fetch_one(pool)
    .await
    .expect("seed product");

    id
}

/// The `(product_id, count)` lines in a user's basket, by product id.
pub async fn basket_rows(pool: &PgPool, user: i32) -> Vec<(i32, Decimal)> {
    sqlx::query_as("SELECT product_id, count FROM basket WHERE user_id = $1 ORDER BY product_id")
        .bind(user)
        .fetch_all(pool)
        .await
        .expect("read basket")
}

/// The `(product_id, count)` lines in an anonymous basket, by product id.
pub async fn temporary_basket_rows(pool: &PgPool, token: &str) -> Vec<(i32, Decimal)> {
    sqlx::query_as(
        "SELECT product_id, count FROM temporary_basket
         WHERE session_token = $1 ORDER BY product_id",
    )
    .bind(token)
    .fetch_all(pool)
    .await
    .expect("read temporary basket")
}
