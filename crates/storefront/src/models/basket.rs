//! Basket wire shapes.
//!
//! The basket endpoints respond with plain product cards carrying the
//! basketed quantity in place of the stock count, so the only shape defined
//! here is the mutation body.

use serde::Deserialize;

use mercato_core::ProductId;

/// Body of a basket add or reduce request.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BasketChange {
    pub id: ProductId,
    pub count: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_basket_change_parses() {
        let change: BasketChange = serde_json::from_str(r#"{"id": 3, "count": 2}"#).unwrap();
        assert_eq!(change.id, ProductId::new(3));
        assert_eq!(change.count, 2);
    }
}
