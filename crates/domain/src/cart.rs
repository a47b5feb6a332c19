//! Cart lines as seen by the API.

use common::ProductId;
use serde::{Deserialize, Serialize};

use crate::error::OrderError;
use crate::money::Money;

/// One cart line joined with current catalog data.
///
/// The price shown here is advisory; the binding price is captured under the
/// product row lock at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartEntry {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl CartEntry {
    /// Returns the advisory total for this line.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// Validates a quantity for a cart add.
pub fn validate_quantity(quantity: u32) -> Result<(), OrderError> {
    if quantity == 0 {
        Err(OrderError::InvalidQuantity { quantity })
    } else {
        Ok(())
    }
}
