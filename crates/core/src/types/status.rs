//! Order lifecycle enums.
//!
//! The order status is a tagged lifecycle state; payment validation failures
//! are carried in a separate error field on the order rather than being
//! appended to the status text.

use serde::{Deserialize, Serialize};

/// Order lifecycle state.
///
/// `Accepted` is the draft/placeholder state an order is created in,
/// `AwaitingPayment` marks an order whose last payment attempt was rejected,
/// and `Paid` is the terminal success state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Accepted,
    AwaitingPayment,
    Paid,
}

impl OrderStatus {
    /// Stable database/wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::AwaitingPayment => "awaiting_payment",
            Self::Paid => "paid",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accepted" => Ok(Self::Accepted),
            "awaiting_payment" => Ok(Self::AwaitingPayment),
            "paid" => Ok(Self::Paid),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Delivery options offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    Free,
    Discount,
    #[default]
    Standard,
}

impl DeliveryType {
    /// Stable database/wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Discount => "discount",
            Self::Standard => "standard",
        }
    }
}

impl std::fmt::Display for DeliveryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeliveryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "discount" => Ok(Self::Discount),
            "standard" => Ok(Self::Standard),
            _ => Err(format!("invalid delivery type: {s}")),
        }
    }
}

/// Payment options offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Card,
    Cash,
    #[default]
    Online,
}

impl PaymentType {
    /// Stable database/wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Cash => "cash",
            Self::Online => "online",
        }
    }
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(Self::Card),
            "cash" => Ok(Self::Cash),
            "online" => Ok(Self::Online),
            _ => Err(format!("invalid payment type: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_roundtrip() {
        for status in [
            OrderStatus::Accepted,
            OrderStatus::AwaitingPayment,
            OrderStatus::Paid,
        ] {
            let parsed: OrderStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_status_serde() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::AwaitingPayment).unwrap(),
            "\"awaiting_payment\""
        );
    }

    #[test]
    fn test_defaults() {
        assert_eq!(OrderStatus::default(), OrderStatus::Accepted);
        assert_eq!(DeliveryType::default(), DeliveryType::Standard);
        assert_eq!(PaymentType::default(), PaymentType::Online);
    }

    #[test]
    fn test_checkout_enums_roundtrip() {
        assert_eq!("free".parse::<DeliveryType>().unwrap(), DeliveryType::Free);
        assert_eq!("cash".parse::<PaymentType>().unwrap(), PaymentType::Cash);
        assert!("teleport".parse::<DeliveryType>().is_err());
        assert!("barter".parse::<PaymentType>().is_err());
    }
}
