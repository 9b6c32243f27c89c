//! Checkout route handlers: two-stage orders and the toy payment step.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;

use mercato_core::{OrderId, UserId, round_money};

use crate::db::baskets::BasketRepository;
use crate::db::catalog::CatalogRepository;
use crate::db::orders::{OrderLine, OrderRecord, OrderRepository};
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::order::{OrderConfirm, OrderCreated, OrderView, PaymentCard, PaymentView};
use crate::services::payment::validate_card_number;
use crate::state::AppState;

/// `POST /api/order`
///
/// Stage one: reuse the user's newest untouched draft or create one, and
/// render the user's current basket as live product cards. The basket is
/// read server-side; whatever the client posts is ignored, so a stale
/// client cannot smuggle its own lines into the listing.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<(StatusCode, Json<OrderCreated>)> {
    let orders = OrderRepository::new(state.pool());

    let order_id = match orders.find_draft(current.id).await? {
        Some(id) => id,
        None => {
            let user = UserRepository::new(state.pool())
                .get_by_id(current.id)
                .await?
                .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;
            orders.create_draft(current.id, &user.full_name()).await?
        }
    };

    let lines = BasketRepository::new(state.pool())
        .list_for_user(current.id)
        .await?;
    let line_pairs: Vec<_> = lines.iter().map(|l| (l.product_id, l.count)).collect();
    let products = CatalogRepository::new(state.pool())
        .cards_with_counts(&line_pairs)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderCreated { order_id, products }),
    ))
}

/// `GET /api/orders`
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<Vec<OrderView>>> {
    let records = OrderRepository::new(state.pool())
        .list_for_user(current.id)
        .await?;

    let mut views = Vec::with_capacity(records.len());
    for record in records {
        views.push(record_to_view(&state, record).await?);
    }

    Ok(Json(views))
}

/// `GET /api/order/{id}`
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Json<OrderView>> {
    let record = fetch_order(&state, OrderId::new(id), current.id).await?;
    Ok(Json(record_to_view(&state, record).await?))
}

/// `POST /api/order/{id}`
///
/// Stage two: store the buyer's details and pin the posted basket snapshot
/// onto the order, then respond with the order as it now stands.
pub async fn confirm(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<i32>,
    Json(body): Json<OrderConfirm>,
) -> Result<Json<OrderView>> {
    let order_id = OrderId::new(id);
    let orders = OrderRepository::new(state.pool());

    let lines: Vec<OrderLine> = body
        .snapshot_lines()
        .into_iter()
        .map(|(product_id, count)| OrderLine { product_id, count })
        .collect();

    orders
        .confirm(
            order_id,
            current.id,
            &body,
            round_money(body.basket_count.price),
            &lines,
        )
        .await?;

    let record = fetch_order(&state, order_id, current.id).await?;
    Ok(Json(record_to_view(&state, record).await?))
}

/// `POST /api/payment/{id}`
///
/// Runs the card-number checks. A rejection parks the order in
/// `awaiting payment` with the message and stays retriable; acceptance
/// records the payment, marks the order paid and empties the basket.
pub async fn pay(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<i32>,
    Json(card): Json<PaymentCard>,
) -> Result<(StatusCode, Json<PaymentView>)> {
    let order_id = OrderId::new(id);
    let orders = OrderRepository::new(state.pool());

    // Ownership check before any annotation is written.
    fetch_order(&state, order_id, current.id).await?;

    let validation = validate_card_number(&card.number);

    if let Some(length_error) = validation.length_error {
        orders.set_payment_failure(order_id, length_error).await?;
    }

    if let Err(message) = validation.verdict {
        orders.set_payment_failure(order_id, message).await?;
        return Err(AppError::BadRequest(message.to_string()));
    }

    let payment_id = orders.record_payment(order_id, &card).await?;
    BasketRepository::new(state.pool())
        .clear_for_user(current.id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PaymentView {
            id: payment_id,
            order: order_id,
            name: card.name,
            number: card.number,
            month: card.month,
            year: card.year,
            code: card.code,
        }),
    ))
}

async fn fetch_order(state: &AppState, order: OrderId, user: UserId) -> Result<OrderRecord> {
    OrderRepository::new(state.pool())
        .get(order, user)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {}", order.as_i32())))
}

/// Render an order for the wire: resolve the lines to product cards and
/// recompute the total from the effective prices, never the stored value.
async fn record_to_view(state: &AppState, record: OrderRecord) -> Result<OrderView> {
    let line_pairs: Vec<_> = record
        .lines
        .iter()
        .map(|l| (l.product_id, l.count))
        .collect();
    let products = CatalogRepository::new(state.pool())
        .cards_with_counts(&line_pairs)
        .await?;

    let total: Decimal = products.iter().map(|p| p.price * p.count).sum();

    Ok(OrderView {
        id: record.id,
        created_at: record.created_at,
        full_name: record.full_name,
        email: record.email,
        phone: record.phone,
        delivery_type: record.delivery_type,
        payment_type: record.payment_type,
        total_cost: round_money(total),
        status: record.status,
        payment_error: record.payment_error,
        city: record.city,
        address: record.address,
        products,
    })
}
