//! Cart endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::ProductId;
use domain::{CartEntry, Money};
use serde::{Deserialize, Serialize};

use crate::auth::Caller;
use crate::error::{ApiError, ApiJson};
use crate::routes::AppState;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct AddCartItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

// -- Response types --

#[derive(Serialize)]
pub struct CartLineResponse {
    pub product_id: String,
    pub product_name: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
}

impl From<CartEntry> for CartLineResponse {
    fn from(entry: CartEntry) -> Self {
        Self {
            product_id: entry.product_id.to_string(),
            product_name: entry.product_name,
            unit_price_cents: entry.unit_price.cents(),
            quantity: entry.quantity,
        }
    }
}

#[derive(Serialize)]
pub struct CartResponse {
    pub items: Vec<CartLineResponse>,
    pub total_items: usize,
    pub total_cents: i64,
}

// -- Handlers --

/// GET /cart — the caller's cart with an advisory total.
pub async fn get(
    State(state): State<AppState>,
    Caller(user): Caller,
) -> Result<Json<CartResponse>, ApiError> {
    let entries = state.store.get_cart(user).await?;
    let total: Money = entries.iter().map(CartEntry::line_total).sum();
    Ok(Json(CartResponse {
        total_items: entries.len(),
        total_cents: total.cents(),
        items: entries.into_iter().map(Into::into).collect(),
    }))
}

/// POST /cart/items — add a line to the caller's cart, merging quantity if
/// the product is already present.
#[tracing::instrument(skip(state))]
pub async fn add_item(
    State(state): State<AppState>,
    Caller(user): Caller,
    ApiJson(req): ApiJson<AddCartItemRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .add_cart_line(user, req.product_id, req.quantity)
        .await?;
    Ok(StatusCode::CREATED)
}
