//! Payment settlement endpoint.

use axum::Json;
use axum::extract::State;
use common::OrderId;
use domain::Payment;
use metrics::counter;
use serde::{Deserialize, Serialize};

use crate::auth::Caller;
use crate::error::{ApiError, ApiJson};
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct ProcessPaymentRequest {
    pub order_id: OrderId,
    pub payment_method: String,
}

#[derive(Serialize)]
pub struct PaymentResponse {
    pub id: String,
    pub order_id: String,
    pub amount_cents: i64,
    pub method: String,
    pub status: String,
    pub transaction_id: Option<String>,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id.to_string(),
            order_id: payment.order_id.to_string(),
            amount_cents: payment.amount.cents(),
            method: payment.method.as_str().to_string(),
            status: payment.status.as_str().to_string(),
            transaction_id: payment.transaction_id,
        }
    }
}

/// POST /payments/process — settle a pending order and complete it.
#[tracing::instrument(skip(state))]
pub async fn process(
    State(state): State<AppState>,
    Caller(user): Caller,
    ApiJson(req): ApiJson<ProcessPaymentRequest>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let payment = state
        .store
        .process_payment(user, req.order_id, &req.payment_method)
        .await?;
    counter!("payments_processed_total").increment(1);
    tracing::info!(order_id = %payment.order_id, amount = %payment.amount, "payment settled");
    Ok(Json(payment.into()))
}
