//! Basket repository contract tests.
//!
//! The merge and reduce semantics live entirely in single SQL statements, so
//! they are exercised here against a real database rather than as unit
//! tests.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use sqlx::PgPool;

use mercato_core::{ProductId, UserId};
use mercato_integration_tests::{
    basket_rows, seed_product, seed_subcategory, seed_user, temporary_basket_rows,
};
use mercato_storefront::db::RepositoryError;
use mercato_storefront::db::baskets::BasketRepository;

#[sqlx::test(migrations = "../storefront/migrations")]
async fn repeated_add_merges_into_one_line(pool: PgPool) {
    let user = seed_user(&pool, "merge-add").await;
    let sub = seed_subcategory(&pool).await;
    let product = seed_product(&pool, sub, "Lamp", "19.99").await;

    let baskets = BasketRepository::new(&pool);
    baskets
        .add_for_user(UserId::new(user), ProductId::new(product), 2)
        .await
        .unwrap();
    baskets
        .add_for_user(UserId::new(user), ProductId::new(product), 3)
        .await
        .unwrap();

    assert_eq!(
        basket_rows(&pool, user).await,
        vec![(product, Decimal::from(5))]
    );
}

#[sqlx::test(migrations = "../storefront/migrations")]
async fn reduce_below_count_decrements_the_line(pool: PgPool) {
    let user = seed_user(&pool, "reduce-part").await;
    let sub = seed_subcategory(&pool).await;
    let product = seed_product(&pool, sub, "Mug", "5.00").await;

    let baskets = BasketRepository::new(&pool);
    baskets
        .add_for_user(UserId::new(user), ProductId::new(product), 5)
        .await
        .unwrap();
    baskets
        .reduce_for_user(UserId::new(user), ProductId::new(product), 2)
        .await
        .unwrap();

    assert_eq!(
        basket_rows(&pool, user).await,
        vec![(product, Decimal::from(3))]
    );
}

#[sqlx::test(migrations = "../storefront/migrations")]
async fn reduce_at_or_above_count_deletes_the_line(pool: PgPool) {
    let user = seed_user(&pool, "reduce-all").await;
    let sub = seed_subcategory(&pool).await;
    let exact = seed_product(&pool, sub, "Plate", "8.00").await;
    let over = seed_product(&pool, sub, "Bowl", "6.00").await;

    let baskets = BasketRepository::new(&pool);
    baskets
        .add_for_user(UserId::new(user), ProductId::new(exact), 2)
        .await
        .unwrap();
    baskets
        .add_for_user(UserId::new(user), ProductId::new(over), 1)
        .await
        .unwrap();

    baskets
        .reduce_for_user(UserId::new(user), ProductId::new(exact), 2)
        .await
        .unwrap();
    baskets
        .reduce_for_user(UserId::new(user), ProductId::new(over), 5)
        .await
        .unwrap();

    assert!(basket_rows(&pool, user).await.is_empty());
}

#[sqlx::test(migrations = "../storefront/migrations")]
async fn login_merge_folds_anonymous_lines_into_the_user_basket(pool: PgPool) {
    let user = seed_user(&pool, "merge-login").await;
    let sub = seed_subcategory(&pool).await;
    let shared = seed_product(&pool, sub, "Lamp", "19.99").await;
    let extra = seed_product(&pool, sub, "Mug", "5.00").await;
    let token = "anon-token";

    let baskets = BasketRepository::new(&pool);
    baskets
        .add_for_user(UserId::new(user), ProductId::new(shared), 1)
        .await
        .unwrap();
    baskets
        .add_for_token(token, ProductId::new(shared), 2)
        .await
        .unwrap();
    baskets
        .add_for_token(token, ProductId::new(extra), 4)
        .await
        .unwrap();

    baskets.merge_into_user(token, UserId::new(user)).await.unwrap();

    assert_eq!(
        basket_rows(&pool, user).await,
        vec![(shared, Decimal::from(3)), (extra, Decimal::from(4))]
    );
    assert!(temporary_basket_rows(&pool, token).await.is_empty());
}

#[sqlx::test(migrations = "../storefront/migrations")]
async fn adding_an_unknown_product_is_not_found(pool: PgPool) {
    let user = seed_user(&pool, "missing-product").await;

    let result = BasketRepository::new(&pool)
        .add_for_user(UserId::new(user), ProductId::new(999_999), 1)
        .await;

    assert!(matches!(result, Err(RepositoryError::NotFound)));
}
