//! Orders, order items, and the order lifecycle state machine.

use chrono::{DateTime, Duration, Utc};
use common::{OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::OrderError;
use crate::money::Money;

/// Days after order creation during which a completed order may be returned.
/// The boundary is inclusive: a return at exactly 30 days succeeds.
pub const RETURN_WINDOW_DAYS: i64 = 30;

/// The status of an order in its lifecycle.
///
/// Transitions:
/// ```text
/// PendingPayment ──► Completed ──► Cancelled
///        │
///        └─────────► Cancelled
/// ```
///
/// A return does not transition the status: it sets the order's
/// [`ReturnStatus`] side channel and the status stays `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created by checkout, stock reserved, awaiting settlement.
    #[default]
    PendingPayment,

    /// Payment settled.
    Completed,

    /// Cancelled before or after payment (terminal).
    Cancelled,

    /// Terminal marker used when an admin collaborator voids an order
    /// entirely; regular returns keep the status at `Completed`.
    Returned,
}

impl OrderStatus {
    /// Returns true if payment can be settled in this status.
    pub fn can_settle(&self) -> bool {
        matches!(self, OrderStatus::PendingPayment)
    }

    /// Returns true if the order can be cancelled in this status.
    ///
    /// Cancelling a completed order models a post-payment void.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::PendingPayment | OrderStatus::Completed)
    }

    /// Returns true if the order can be returned in this status.
    pub fn can_return(&self) -> bool {
        matches!(self, OrderStatus::Completed)
    }

    /// Returns the status as the string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::PendingPayment => "pending_payment",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Returned => "returned",
        }
    }

    /// Parses the database representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending_payment" => Some(OrderStatus::PendingPayment),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            "returned" => Some(OrderStatus::Returned),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Side-channel flag recording that a completed order was returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnStatus {
    Returned,
}

impl ReturnStatus {
    /// Returns the database representation.
    pub fn as_str(&self) -> &'static str {
        "returned"
    }

    /// Parses the database representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "returned" => Some(ReturnStatus::Returned),
            _ => None,
        }
    }
}

/// Snapshot of one purchased line.
///
/// The unit price is captured at checkout and never recomputed, so order
/// history stays accurate when catalog prices change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
}

impl OrderItem {
    /// Returns the total price for this line.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// An order with its item snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total: Money,
    pub status: OrderStatus,
    pub return_status: Option<ReturnStatus>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Checks that the order can be cancelled.
    ///
    /// A returned order keeps `Completed` status, so the return flag must be
    /// checked too: its stock already went back once and cancelling would
    /// release it a second time.
    pub fn check_cancellable(&self) -> Result<(), OrderError> {
        if self.return_status.is_some() {
            return Err(OrderError::InvalidTransition {
                status: OrderStatus::Returned,
                action: "cancel",
            });
        }
        if self.status.can_cancel() {
            Ok(())
        } else {
            Err(OrderError::InvalidTransition {
                status: self.status,
                action: "cancel",
            })
        }
    }

    /// Checks that the order can be returned at `now`.
    ///
    /// Check order: already-returned first, then status, then the window,
    /// so the most specific failure wins.
    pub fn check_returnable(&self, now: DateTime<Utc>) -> Result<(), OrderError> {
        if self.return_status.is_some() {
            return Err(OrderError::AlreadyReturned);
        }
        if !self.status.can_return() {
            return Err(OrderError::InvalidTransition {
                status: self.status,
                action: "return",
            });
        }
        if now.signed_duration_since(self.created_at) > Duration::days(RETURN_WINDOW_DAYS) {
            return Err(OrderError::ReturnWindowExpired);
        }
        Ok(())
    }

    /// Checks that payment can be settled.
    pub fn check_settleable(&self) -> Result<(), OrderError> {
        if self.status.can_settle() {
            Ok(())
        } else {
            Err(OrderError::PaymentAlreadyProcessed)
        }
    }
}
