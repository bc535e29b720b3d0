//! Business profile API Handlers

use axum::{Json, extract::State};
use shared::models::{BusinessProfile, BusinessProfileUpdate};

use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/settings - created with defaults on first access
pub async fn get_settings(State(state): State<ServerState>) -> AppResult<Json<BusinessProfile>> {
    let profile = state.settings().get().await?;
    Ok(Json(profile))
}

/// PUT /api/settings
pub async fn update_settings(
    State(state): State<ServerState>,
    Json(payload): Json<BusinessProfileUpdate>,
) -> AppResult<Json<BusinessProfile>> {
    let profile = state.settings().update(payload).await?;
    Ok(Json(profile))
}
