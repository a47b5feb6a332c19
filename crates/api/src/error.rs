//! API error types with HTTP response mapping.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::OrderError;
use store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// No valid caller identity on the request.
    Unauthenticated(String),
    /// Malformed request input.
    BadRequest(String),
    /// Store or domain failure.
    Store(StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Store(err) => store_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn store_error_to_response(err: StoreError) -> (StatusCode, String) {
    match &err {
        StoreError::Order(order_err) => {
            let status = match order_err {
                OrderError::EmptyCart
                | OrderError::InvalidQuantity { .. }
                | OrderError::InsufficientStock { .. }
                | OrderError::InvalidTransition { .. }
                | OrderError::AlreadyReturned
                | OrderError::ReturnWindowExpired
                | OrderError::PaymentAlreadyProcessed
                | OrderError::UnsupportedPaymentMethod { .. } => StatusCode::BAD_REQUEST,
                OrderError::OrderNotFound(_)
                | OrderError::ProductNotFound(_)
                | OrderError::CategoryNotFound(_) => StatusCode::NOT_FOUND,
                OrderError::Unauthorized => StatusCode::FORBIDDEN,
            };
            (status, order_err.to_string())
        }
        // Storage failures roll the transaction back; the detail goes to the
        // log, never to the client.
        StoreError::Database(_) | StoreError::Migration(_) | StoreError::Decode { .. } => {
            tracing::error!(error = %err, "internal store error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

/// JSON body extractor whose rejection is a 400 `ApiError` instead of
/// axum's default 422, keeping missing-field errors in the same
/// `{"error": ...}` shape as the rest of the taxonomy.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(ApiJson(value))
    }
}
