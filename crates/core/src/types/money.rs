//! Money helpers shared by every price-surfacing read path.
//!
//! The effective price of a product is its active sale price when one
//! exists, otherwise its list price. Every component that shows a price or
//! sums a total goes through [`effective_price`] so the displayed price and
//! the charged price cannot diverge.

use rust_decimal::Decimal;

/// Resolve the effective unit price of a product.
///
/// `sale_price` is the price of the product's sale row with the lowest id,
/// if any such row exists. The sale rows carry date ranges but the model
/// does not enforce them, so mere presence of a row activates the override.
#[must_use]
pub fn effective_price(list_price: Decimal, sale_price: Option<Decimal>) -> Decimal {
    sale_price.unwrap_or(list_price)
}

/// Round a monetary amount to 2 decimal places (banker-free, half away from
/// zero), the rounding applied to order totals at finalize time.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_sale_price_wins() {
        assert_eq!(
            effective_price(dec("25.00"), Some(dec("19.99"))),
            dec("19.99")
        );
    }

    #[test]
    fn test_list_price_without_sale() {
        assert_eq!(effective_price(dec("25.00"), None), dec("25.00"));
    }

    #[test]
    fn test_round_money_two_places() {
        assert_eq!(round_money(dec("10.005")), dec("10.01"));
        assert_eq!(round_money(dec("10.004")), dec("10.00"));
        assert_eq!(round_money(dec("10")), dec("10.00"));
    }
}
