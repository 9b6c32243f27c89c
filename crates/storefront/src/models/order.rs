//! Order and payment wire shapes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use mercato_core::{DeliveryType, OrderId, OrderStatus, PaymentId, PaymentType, ProductId};

use super::catalog::ProductCard;

/// Placeholder values a freshly drafted order carries until the buyer
/// confirms it. A draft is recognized by all four fields still holding
/// these values together with the `accepted` status.
pub mod draft {
    pub const CITY: &str = "Enter city of the delivery";
    pub const ADDRESS: &str = "Enter address of the delivery";
    pub const EMAIL: &str = "user@domain.com";
    pub const PHONE: &str = "0";
}

/// An order as returned by the order endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub delivery_type: DeliveryType,
    pub payment_type: PaymentType,
    /// Recomputed from the order lines on every read, never the stored value.
    pub total_cost: Decimal,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_error: Option<String>,
    pub city: String,
    pub address: String,
    pub products: Vec<ProductCard>,
}

/// Response of the stage-one order request: the draft id and the user's
/// current basket rendered as live product cards.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    pub order_id: OrderId,
    pub products: Vec<ProductCard>,
}

/// One line of the stage-two basket snapshot, keyed by product id in the
/// request body. Only the quantity is read.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SnapshotLine {
    pub count: Decimal,
}

/// The client-side basket totals accompanying the stage-two snapshot.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BasketTotal {
    pub price: Decimal,
}

/// Stage-two confirmation body: the buyer's delivery and contact details
/// plus the basket snapshot to pin onto the order.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub delivery_type: DeliveryType,
    #[serde(default)]
    pub payment_type: PaymentType,
    pub city: String,
    pub address: String,
    /// Basket lines keyed by stringified product id.
    #[serde(default)]
    pub basket: std::collections::HashMap<String, SnapshotLine>,
    /// Client-computed totals; `price` becomes the stored `total_cost`.
    pub basket_count: BasketTotal,
}

impl OrderConfirm {
    /// Snapshot lines with parsed product ids. Keys that aren't numeric are
    /// dropped rather than failing the whole confirmation.
    #[must_use]
    pub fn snapshot_lines(&self) -> Vec<(ProductId, Decimal)> {
        let mut lines: Vec<(ProductId, Decimal)> = self
            .basket
            .iter()
            .filter_map(|(key, line)| {
                key.parse::<i32>()
                    .ok()
                    .map(|id| (ProductId::new(id), line.count))
            })
            .collect();
        lines.sort_by_key(|(id, _)| id.as_i32());
        lines
    }
}

/// An accepted payment as returned by the payment endpoint.
#[derive(Debug, Serialize)]
pub struct PaymentView {
    pub id: PaymentId,
    pub order: OrderId,
    pub name: String,
    pub number: String,
    pub month: String,
    pub year: String,
    pub code: String,
}

/// Card details posted to the payment endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentCard {
    pub name: String,
    pub number: String,
    pub month: String,
    pub year: String,
    pub code: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_confirm_defaults_delivery_and_payment() {
        let confirm: OrderConfirm = serde_json::from_str(
            r#"{"fullName": "Jane Doe", "email": "jane@example.com", "phone": "123",
                "city": "Riga", "address": "Main st 1",
                "basketCount": {"price": "39.98"}}"#,
        )
        .unwrap();
        assert_eq!(confirm.delivery_type, DeliveryType::Standard);
        assert_eq!(confirm.payment_type, PaymentType::Online);
        assert!(confirm.basket.is_empty());
    }

    #[test]
    fn test_snapshot_lines_parse_and_sort_keys() {
        let confirm: OrderConfirm = serde_json::from_str(
            r#"{"fullName": "Jane Doe", "email": "jane@example.com", "phone": "123",
                "deliveryType": "free", "paymentType": "card",
                "city": "Riga", "address": "Main st 1",
                "basket": {
                    "9": {"count": "2", "title": "Lamp"},
                    "4": {"count": "1"},
                    "junk": {"count": "7"}
                },
                "basketCount": {"price": "59.97"}}"#,
        )
        .unwrap();
        let lines = confirm.snapshot_lines();
        assert_eq!(
            lines,
            vec![
                (ProductId::new(4), Decimal::from(1)),
                (ProductId::new(9), Decimal::from(2)),
            ]
        );
        assert_eq!(confirm.basket_count.price, Decimal::new(5997, 2));
    }

    #[test]
    fn test_draft_sentinels_match_schema_defaults() {
        // Draft detection compares against the column defaults, so the
        // constants and the DDL must stay in lockstep.
        let ddl = include_str!("../../migrations/0004_create_orders.sql");
        assert!(ddl.contains(draft::CITY));
        assert!(ddl.contains(draft::ADDRESS));
        assert!(ddl.contains(draft::EMAIL));
        assert!(ddl.contains(&format!("'{}'", draft::PHONE)));
    }

    #[test]
    fn test_order_view_hides_absent_payment_error() {
        let view = OrderView {
            id: OrderId::new(1),
            created_at: Utc::now(),
            full_name: "Jane Doe".to_string(),
            email: draft::EMAIL.to_string(),
            phone: draft::PHONE.to_string(),
            delivery_type: DeliveryType::Standard,
            payment_type: PaymentType::Online,
            total_cost: Decimal::ZERO,
            status: OrderStatus::Accepted,
            payment_error: None,
            city: draft::CITY.to_string(),
            address: draft::ADDRESS.to_string(),
            products: vec![],
        };
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("paymentError").is_none());
        assert_eq!(json["status"], "accepted");
        assert_eq!(json["deliveryType"], "standard");
    }
}
