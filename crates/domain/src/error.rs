//! Domain error taxonomy.

use common::{CategoryId, OrderId, ProductId};
use thiserror::Error;

use crate::order::OrderStatus;

/// Errors produced by cart, checkout, settlement, and lifecycle operations.
///
/// Every storage backend returns these for business-rule violations; the API
/// layer maps them to HTTP statuses. The messages are user-visible and must
/// not leak internals.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Checkout was attempted with an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// A product does not have enough stock for the requested quantity.
    #[error("Insufficient stock for {product_name}")]
    InsufficientStock { product_name: String },

    /// Quantity must be strictly positive.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// The order is not in a state that allows the requested action.
    #[error("Cannot {action} order in {status} state")]
    InvalidTransition {
        status: OrderStatus,
        action: &'static str,
    },

    /// The order has already been returned.
    #[error("Order already returned")]
    AlreadyReturned,

    /// The 30-day return window has closed.
    #[error("Order return period has expired")]
    ReturnWindowExpired,

    /// The order already left the pending-payment state.
    #[error("Payment already processed")]
    PaymentAlreadyProcessed,

    /// The payment method is not one we can settle.
    #[error("Unsupported payment method: {method}")]
    UnsupportedPaymentMethod { method: String },

    /// The caller does not own the resource.
    #[error("Unauthorized access")]
    Unauthorized,

    /// No order with this id visible to the caller.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// No such product in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// No such category.
    #[error("Category not found: {0}")]
    CategoryNotFound(CategoryId),
}
