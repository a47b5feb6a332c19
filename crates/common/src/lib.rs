//! Shared types for the commerce backend.

pub mod types;

pub use types::{CategoryId, OrderId, PaymentId, ProductId, UserId};
