//! Expense API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{Expense, ExpenseCreate, ExpenseUpdate};

use crate::api::query::RangeQuery;
use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/expenses?start=&end=
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<Vec<Expense>>> {
    let window = query.window(state.config.timezone)?;
    let expenses = state.expenses().list(window).await?;
    Ok(Json(expenses))
}

/// GET /api/expenses/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Expense>> {
    let expense = state.expenses().get(id).await?;
    Ok(Json(expense))
}

/// POST /api/expenses
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseCreate>,
) -> AppResult<Json<Expense>> {
    let expense = state.expenses().create(payload).await?;
    Ok(Json(expense))
}

/// PUT /api/expenses/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ExpenseUpdate>,
) -> AppResult<Json<Expense>> {
    let expense = state.expenses().update(id, payload).await?;
    Ok(Json(expense))
}

/// DELETE /api/expenses/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    state.expenses().delete(id).await?;
    Ok(Json(true))
}
