//! Basket route handlers.
//!
//! All three endpoints serve both authenticated and anonymous buyers: an
//! authenticated request works on the user's basket, an anonymous one on the
//! temporary basket keyed by a session-stored token.

use axum::{Json, extract::State};
use tower_sessions::Session;

use crate::db::baskets::{BasketLine, BasketRepository};
use crate::db::catalog::CatalogRepository;
use crate::error::{AppError, Result};
use crate::middleware::OptionalAuth;
use crate::middleware::session::{basket_token, ensure_basket_token};
use crate::models::basket::BasketChange;
use crate::models::catalog::ProductCard;
use crate::models::CurrentUser;
use crate::state::AppState;

/// `GET /api/basket`
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Result<Json<Vec<ProductCard>>> {
    let items = current_items(&state, user.as_ref(), &session).await?;
    Ok(Json(items))
}

/// `POST /api/basket`
///
/// Adds `count` of a product, merging into an existing line, and responds
/// with the whole updated basket.
pub async fn add(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Json(change): Json<BasketChange>,
) -> Result<Json<Vec<ProductCard>>> {
    if change.count <= 0 {
        return Err(AppError::BadRequest(
            "Count must be positive".to_string(),
        ));
    }

    let baskets = BasketRepository::new(state.pool());
    match &user {
        Some(user) => baskets.add_for_user(user.id, change.id, change.count).await?,
        None => {
            let token = ensure_basket_token(&session).await?;
            baskets.add_for_token(&token, change.id, change.count).await?;
        }
    }

    let items = current_items(&state, user.as_ref(), &session).await?;
    Ok(Json(items))
}

/// `DELETE /api/basket`
///
/// Reduces a line by `count`, removing it when the reduction reaches the
/// current quantity, and responds with the whole updated basket.
pub async fn remove(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Json(change): Json<BasketChange>,
) -> Result<Json<Vec<ProductCard>>> {
    if change.count <= 0 {
        return Err(AppError::BadRequest(
            "Count must be positive".to_string(),
        ));
    }

    let baskets = BasketRepository::new(state.pool());
    match &user {
        Some(user) => {
            baskets
                .reduce_for_user(user.id, change.id, change.count)
                .await?;
        }
        None => {
            if let Some(token) = basket_token(&session).await? {
                baskets.reduce_for_token(&token, change.id, change.count).await?;
            }
        }
    }

    let items = current_items(&state, user.as_ref(), &session).await?;
    Ok(Json(items))
}

/// The caller's basket rendered as product cards with line quantities.
pub(crate) async fn current_items(
    state: &AppState,
    user: Option<&CurrentUser>,
    session: &Session,
) -> Result<Vec<ProductCard>> {
    let baskets = BasketRepository::new(state.pool());

    let lines: Vec<BasketLine> = match user {
        Some(user) => baskets.list_for_user(user.id).await?,
        None => match basket_token(session).await? {
            Some(token) => baskets.list_for_token(&token).await?,
            None => Vec::new(),
        },
    };

    let line_pairs: Vec<_> = lines.iter().map(|l| (l.product_id, l.count)).collect();
    let items = CatalogRepository::new(state.pool())
        .cards_with_counts(&line_pairs)
        .await?;

    Ok(items)
}
