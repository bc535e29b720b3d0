//! Sales API Handlers
//!
//! Submission and status changes keep product stock in step; see
//! [`SalesService`](crate::services::SalesService).

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{Sale, SaleCreate, SaleStatusChange, SaleUpdate};
use shared::util::now_millis;

use crate::api::query::RangeQuery;
use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/sales?start=&end= - newest first
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<Vec<Sale>>> {
    let window = query.window(state.config.timezone)?;
    let sales = state.sales().list(window).await?;
    Ok(Json(sales))
}

/// GET /api/sales/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Sale>> {
    let sale = state.sales().get(id).await?;
    Ok(Json(sale))
}

/// POST /api/sales - submit a sale and decrement stock
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<SaleCreate>,
) -> AppResult<Json<Sale>> {
    let sale = state.sales().create(payload, now_millis()).await?;
    Ok(Json(sale))
}

/// PUT /api/sales/{id} - notes and status
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<SaleUpdate>,
) -> AppResult<Json<Sale>> {
    let sale = state.sales().update(id, payload).await?;
    Ok(Json(sale))
}

/// PUT /api/sales/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<SaleStatusChange>,
) -> AppResult<Json<Sale>> {
    let sale = state.sales().update_status(id, payload.status).await?;
    Ok(Json(sale))
}

/// DELETE /api/sales/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    state.sales().delete(id).await?;
    Ok(Json(true))
}
