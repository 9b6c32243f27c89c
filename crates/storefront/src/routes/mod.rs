//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Health check
//! GET  /health/ready            - Readiness check (database)
//!
//! # Catalog
//! GET  /api/categories          - Category tree
//! GET  /api/catalog             - Filtered, sorted, paginated products
//! GET  /api/products/popular    - Top-rated shelf
//! GET  /api/products/limited    - Limited-edition shelf
//! GET  /api/banners             - Curated banner products
//! GET  /api/sales               - Paginated sale listing
//! GET  /api/tags                - Tags, optionally scoped by category
//! GET  /api/product/{id}        - Product detail
//! POST /api/product/{id}/reviews - Attach a review (requires auth)
//!
//! # Basket (works for anonymous sessions too)
//! GET    /api/basket            - Current basket
//! POST   /api/basket            - Add a product
//! DELETE /api/basket            - Reduce or remove a product
//!
//! # Checkout (requires auth)
//! POST /api/order               - Stage one: create or reuse a draft
//! GET  /api/orders              - Order history
//! GET  /api/order/{id}          - Order detail
//! POST /api/order/{id}          - Stage two: confirm details and snapshot
//! POST /api/payment/{id}        - Toy payment validation
//!
//! # Profile (requires auth)
//! GET  /api/profile             - Profile with avatar
//! POST /api/profile             - Upsert profile details
//! POST /api/profile/avatar      - Multipart avatar upload
//! POST /api/profile/password    - Change password
//!
//! # Auth
//! POST /api/sign-in             - Login
//! POST /api/sign-up             - Register and login
//! POST /api/sign-out            - Logout
//! ```

pub mod auth;
pub mod basket;
pub mod catalog;
pub mod health;
pub mod orders;
pub mod profile;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the `/api` router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(catalog::categories))
        .route("/catalog", get(catalog::catalog))
        .route("/products/popular", get(catalog::popular))
        .route("/products/limited", get(catalog::limited))
        .route("/banners", get(catalog::banners))
        .route("/sales", get(catalog::sales))
        .route("/tags", get(catalog::tags))
        .route("/product/{id}", get(catalog::product))
        .route("/product/{id}/reviews", post(catalog::create_review))
        .route(
            "/basket",
            get(basket::show).post(basket::add).delete(basket::remove),
        )
        .route("/order", post(orders::create))
        .route("/orders", get(orders::list))
        .route("/order/{id}", get(orders::show).post(orders::confirm))
        .route("/payment/{id}", post(orders::pay))
        .route("/profile", get(profile::show).post(profile::update))
        .route("/profile/avatar", post(profile::upload_avatar))
        .route("/profile/password", post(profile::change_password))
        .route("/sign-in", post(auth::sign_in))
        .route("/sign-up", post(auth::sign_up))
        .route("/sign-out", post(auth::sign_out))
}

/// Create the health-check router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
}
