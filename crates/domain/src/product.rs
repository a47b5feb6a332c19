//! Catalog entities.

use chrono::{DateTime, Utc};
use common::{CategoryId, ProductId};
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// A catalog product with its live stock count.
///
/// Stock is only ever mutated through the stock ledger operations of a
/// storage backend (reserve at checkout, release at cancel/return); after any
/// committed operation `stock >= 0` holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub unit_price: Money,
    pub stock: u32,
    pub category_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Input for creating a catalog product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub unit_price: Money,
    pub stock: u32,
    pub category_id: Option<CategoryId>,
}

/// Catalog listing filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    /// Restrict to products in the category with this name.
    pub category: Option<String>,
    /// Case-insensitive substring match on the product name.
    pub search: Option<String>,
}

impl ProductFilter {
    /// Returns true if the product passes both filters.
    pub fn matches(&self, product: &Product, category_name: Option<&str>) -> bool {
        if let Some(ref wanted) = self.category
            && category_name != Some(wanted.as_str())
        {
            return false;
        }
        if let Some(ref needle) = self.search
            && !product
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase())
        {
            return false;
        }
        true
    }
}
