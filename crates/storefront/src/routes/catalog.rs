//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use mercato_core::ProductId;

use crate::db::catalog::CatalogRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::catalog::{CatalogQuery, CategoryView, ProductCard, ProductDetail, ReviewView, SaleView, TagView};
use crate::models::pagination::{PageQuery, Paginated};
use crate::state::AppState;

/// Body of a review submission. The client echoes display fields back; only
/// the text and rate are stored.
#[derive(Debug, Deserialize)]
pub struct ReviewCreate {
    pub text: String,
    pub rate: i16,
}

/// Query parameter scoping the tag listing.
#[derive(Debug, Deserialize)]
pub struct TagScope {
    pub category: Option<i32>,
}

/// `GET /api/categories`
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<CategoryView>>> {
    let tree = CatalogRepository::new(state.pool()).categories().await?;
    Ok(Json(tree))
}

/// `GET /api/catalog`
pub async fn catalog(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Paginated<ProductCard>>> {
    let (items, total) = CatalogRepository::new(state.pool())
        .list_catalog(&query, &page)
        .await?;
    Ok(Json(Paginated::new(items, &page, total)))
}

/// `GET /api/products/popular`
pub async fn popular(State(state): State<AppState>) -> Result<Json<Vec<ProductCard>>> {
    let cards = CatalogRepository::new(state.pool()).popular().await?;
    Ok(Json(cards))
}

/// `GET /api/products/limited`
pub async fn limited(State(state): State<AppState>) -> Result<Json<Vec<ProductCard>>> {
    let cards = CatalogRepository::new(state.pool()).limited().await?;
    Ok(Json(cards))
}

/// `GET /api/banners`
pub async fn banners(State(state): State<AppState>) -> Result<Json<Vec<ProductCard>>> {
    let ids = state.config().banner_products.clone();
    let cards = CatalogRepository::new(state.pool()).cards_by_ids(&ids).await?;
    Ok(Json(cards))
}

/// `GET /api/sales`
pub async fn sales(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Paginated<SaleView>>> {
    let (items, total) = CatalogRepository::new(state.pool()).list_sales(&page).await?;
    Ok(Json(Paginated::new(items, &page, total)))
}

/// `GET /api/tags`
pub async fn tags(
    State(state): State<AppState>,
    Query(scope): Query<TagScope>,
) -> Result<Json<Vec<TagView>>> {
    let tags = CatalogRepository::new(state.pool()).tags(scope.category).await?;
    Ok(Json(tags))
}

/// `GET /api/product/{id}`
pub async fn product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductDetail>> {
    let detail = CatalogRepository::new(state.pool())
        .product_detail(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    Ok(Json(detail))
}

/// `POST /api/product/{id}/reviews`
///
/// Responds with the product's full review list so the client can replace
/// what it renders.
pub async fn create_review(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
    Json(body): Json<ReviewCreate>,
) -> Result<(StatusCode, Json<Vec<ReviewView>>)> {
    if !(1..=5).contains(&body.rate) {
        return Err(AppError::BadRequest(
            "Rate must be between 1 and 5".to_string(),
        ));
    }
    if body.text.trim().is_empty() {
        return Err(AppError::BadRequest("Review text is required".to_string()));
    }

    let repo = CatalogRepository::new(state.pool());
    let product = ProductId::new(id);
    repo.create_review(product, user.id, body.text.trim(), body.rate)
        .await?;
    let reviews = repo.reviews(product).await?;

    Ok((StatusCode::CREATED, Json(reviews)))
}
