//! Payment records and method parsing.

use chrono::{DateTime, Utc};
use common::{OrderId, PaymentId};
use serde::{Deserialize, Serialize};

use crate::error::OrderError;
use crate::money::Money;

/// Payment methods we can settle.
///
/// The wire format is a free string so that an unsupported method fails with
/// a domain error (and a 400) rather than a deserialization error; parse with
/// [`PaymentMethod::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
}

impl PaymentMethod {
    /// Parses a method string from a settlement request.
    pub fn parse(method: &str) -> Result<Self, OrderError> {
        match method {
            "card" => Ok(PaymentMethod::Card),
            other => Err(OrderError::UnsupportedPaymentMethod {
                method: other.to_string(),
            }),
        }
    }

    /// Returns the database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
        }
    }
}

/// Outcome of a settlement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Completed,
    Failed,
}

impl PaymentStatus {
    /// Returns the database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }

    /// Parses the database representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(PaymentStatus::Completed),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

/// A recorded payment attempt against an order.
///
/// One order has at most one completed payment; failed attempts may repeat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    /// Transaction id assigned by an external gateway; none exists in this
    /// core, so settlements record `None`.
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_is_the_only_supported_method() {
        assert_eq!(PaymentMethod::parse("card").unwrap(), PaymentMethod::Card);
        assert!(matches!(
            PaymentMethod::parse("paypal"),
            Err(OrderError::UnsupportedPaymentMethod { .. })
        ));
        // Parsing is exact, not case-folded.
        assert!(PaymentMethod::parse("Card").is_err());
    }

    #[test]
    fn payment_status_roundtrips() {
        assert_eq!(
            PaymentStatus::parse(PaymentStatus::Completed.as_str()),
            Some(PaymentStatus::Completed)
        );
        assert_eq!(PaymentStatus::parse("pending"), None);
    }
}
