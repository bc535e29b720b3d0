//! Product API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{Product, ProductCreate, ProductUpdate};
use shared::util::now_millis;

use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/products - all products, legacy category names resolved
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let products = state.catalog().list_products().await?;
    Ok(Json(products))
}

/// GET /api/products/low-stock - active products at or below their minimum
pub async fn low_stock(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let products = state.catalog().low_stock().await?;
    Ok(Json(products))
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Product>> {
    let product = state.catalog().get_product(id).await?;
    Ok(Json(product))
}

/// POST /api/products
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    let product = state.catalog().create_product(payload, now_millis()).await?;
    Ok(Json(product))
}

/// PUT /api/products/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    let product = state
        .catalog()
        .update_product(id, payload, now_millis())
        .await?;
    Ok(Json(product))
}

/// DELETE /api/products/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    state.catalog().delete_product(id).await?;
    Ok(Json(true))
}
