//! Checkout flow tests through the HTTP router.

#![allow(clippy::unwrap_used)]

use std::path::PathBuf;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use secrecy::SecretString;
use sqlx::PgPool;
use tower::ServiceExt;

use mercato_integration_tests::{seed_product, seed_subcategory};
use mercato_storefront::config::StorefrontConfig;
use mercato_storefront::middleware::create_session_layer;
use mercato_storefront::middleware::session::migrate_session_store;
use mercato_storefront::routes;
use mercato_storefront::state::AppState;

/// Build the API router over the test database, the way `main` does.
async fn app(pool: PgPool) -> axum::Router {
    migrate_session_store(&pool).await.unwrap();

    let config = StorefrontConfig {
        database_url: SecretString::from("postgres://unused"),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: "http://localhost".to_string(),
        session_secret: SecretString::from("f".repeat(32)),
        media_root: PathBuf::from("media"),
        banner_products: vec![],
        sentry_dsn: None,
        sentry_environment: None,
    };

    let state = AppState::new(config, pool);
    let session_layer = create_session_layer(state.pool(), state.config());

    axum::Router::new()
        .nest("/api", routes::api_routes())
        .layer(session_layer)
        .with_state(state)
}

/// Sign up a fresh account and return the session cookie.
async fn sign_up(app: &axum::Router, username: &str) -> String {
    let body = format!(
        r#"{{"name": "Jane", "username": "{username}", "password": "long enough password"}}"#
    );
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/sign-up")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

#[sqlx::test(migrations = "../storefront/migrations")]
async fn stage_one_lists_the_server_side_basket(pool: PgPool) {
    let sub = seed_subcategory(&pool).await;
    let in_basket = seed_product(&pool, sub, "Lamp", "19.99").await;
    let posted = seed_product(&pool, sub, "Mug", "5.00").await;

    let app = app(pool).await;
    let cookie = sign_up(&app, "stage-one").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/basket")
                .header(header::COOKIE, &cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(format!(r#"{{"id": {in_basket}, "count": 2}}"#)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The posted lines name a different product; the draft listing must
    // come from the stored basket, not from the request body.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/order")
                .header(header::COOKIE, &cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(format!(r#"[{{"id": {posted}, "count": 5}}]"#)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    let products = json["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["id"], in_basket);
    assert_eq!(products[0]["count"], "2");
    assert!(json["orderId"].is_i64());
}
