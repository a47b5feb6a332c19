//! HTTP API server for the commerce core.
//!
//! Exposes the catalog, cart, checkout, payment, and order lifecycle
//! endpoints over REST, with structured logging (tracing) and Prometheus
//! metrics. Identity arrives as a gateway-verified `x-user-id` header.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: AppState, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/products", get(routes::products::list))
        .route("/products", post(routes::products::create))
        .route("/products/{id}", get(routes::products::get))
        .route("/categories", get(routes::products::list_categories))
        .route("/categories", post(routes::products::create_category))
        .route("/cart", get(routes::cart::get))
        .route("/cart/items", post(routes::cart::add_item))
        .route("/checkout", post(routes::orders::checkout))
        .route("/payments/process", post(routes::payments::process))
        .route("/orders", get(routes::orders::list))
        .route("/orders/{id}", get(routes::orders::get))
        .route("/orders/{id}/cancel", post(routes::orders::cancel))
        .route("/orders/{id}/return", post(routes::orders::request_return))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
