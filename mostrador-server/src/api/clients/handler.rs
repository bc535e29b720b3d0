//! Client API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{Client, ClientCreate, ClientUpdate};
use shared::util::now_millis;

use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/clients
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Client>>> {
    let clients = state.clients().list().await?;
    Ok(Json(clients))
}

/// GET /api/clients/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Client>> {
    let client = state.clients().get(id).await?;
    Ok(Json(client))
}

/// POST /api/clients
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ClientCreate>,
) -> AppResult<Json<Client>> {
    let client = state.clients().create(payload, now_millis()).await?;
    Ok(Json(client))
}

/// PUT /api/clients/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ClientUpdate>,
) -> AppResult<Json<Client>> {
    let client = state.clients().update(id, payload).await?;
    Ok(Json(client))
}

/// DELETE /api/clients/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    state.clients().delete(id).await?;
    Ok(Json(true))
}
