//! Order lifecycle endpoints: checkout, queries, cancel, return.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::OrderId;
use domain::{Order, OrderItem, ReturnStatus};
use metrics::counter;
use serde::Serialize;

use crate::auth::Caller;
use crate::error::ApiError;
use crate::routes::AppState;

// -- Response types --

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            product_id: item.product_id.to_string(),
            quantity: item.quantity,
            unit_price_cents: item.unit_price.cents(),
        }
    }
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub status: String,
    pub return_status: Option<String>,
    pub total_cents: i64,
    pub created_at: String,
    pub items: Vec<OrderItemResponse>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.to_string(),
            status: order.status.as_str().to_string(),
            return_status: order.return_status.map(|r| match r {
                ReturnStatus::Returned => "returned".to_string(),
            }),
            total_cents: order.total.cents(),
            created_at: order.created_at.to_rfc3339(),
            items: order.items.into_iter().map(Into::into).collect(),
        }
    }
}

// -- Handlers --

/// POST /checkout — turn the caller's cart into a pending order.
#[tracing::instrument(skip(state))]
pub async fn checkout(
    State(state): State<AppState>,
    Caller(user): Caller,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let order = state.store.checkout(user).await?;
    counter!("checkouts_total").increment(1);
    tracing::info!(order_id = %order.id, total = %order.total, "order placed");
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// GET /orders — the caller's order history, newest first.
pub async fn list(
    State(state): State<AppState>,
    Caller(user): Caller,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state.store.list_orders(user).await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// GET /orders/{id} — one of the caller's orders.
pub async fn get(
    State(state): State<AppState>,
    Caller(user): Caller,
    Path(order_id): Path<OrderId>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.store.get_order(user, order_id).await?;
    Ok(Json(order.into()))
}

/// POST /orders/{id}/cancel — cancel a pending or completed order.
#[tracing::instrument(skip(state))]
pub async fn cancel(
    State(state): State<AppState>,
    Caller(user): Caller,
    Path(order_id): Path<OrderId>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.store.cancel_order(user, order_id).await?;
    counter!("orders_cancelled_total").increment(1);
    tracing::info!(order_id = %order.id, "order cancelled");
    Ok(Json(order.into()))
}

/// POST /orders/{id}/return — flag a completed order as returned.
#[tracing::instrument(skip(state))]
pub async fn request_return(
    State(state): State<AppState>,
    Caller(user): Caller,
    Path(order_id): Path<OrderId>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.store.return_order(user, order_id).await?;
    counter!("orders_returned_total").increment(1);
    tracing::info!(order_id = %order.id, "order returned");
    Ok(Json(order.into()))
}
