//! Catalog endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::ProductId;
use domain::{Category, NewProduct, Product, ProductFilter};
use serde::Serialize;

use crate::error::{ApiError, ApiJson};
use crate::routes::AppState;

// -- Response types --

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub unit_price_cents: i64,
    pub stock: u32,
    pub category_id: Option<String>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name,
            description: p.description,
            unit_price_cents: p.unit_price.cents(),
            stock: p.stock,
            category_id: p.category_id.map(|id| id.to_string()),
        }
    }
}

#[derive(Serialize)]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.name,
        }
    }
}

// -- Handlers --

/// GET /products — list products, optionally filtered by `category` name
/// and `search` substring.
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.store.list_products(filter).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// GET /products/{id} — fetch one product.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state.store.get_product(id).await?;
    Ok(Json(product.into()))
}

/// POST /products — create a product (catalog collaborator surface).
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewProduct>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    if req.unit_price.is_negative() {
        return Err(ApiError::BadRequest("Price must not be negative".to_string()));
    }
    let product = state.store.create_product(req).await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// GET /categories — list all categories.
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let categories = state.store.list_categories().await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

#[derive(serde::Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

/// POST /categories — create a category.
pub async fn create_category(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Category name is required".to_string()));
    }
    let category = state.store.create_category(&req.name).await?;
    Ok((StatusCode::CREATED, Json(category.into())))
}
