//! HTTP route handlers.

pub mod cart;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod payments;
pub mod products;

use std::sync::Arc;

use store::CommerceStore;

/// Shared application state accessible from all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CommerceStore>,
}
