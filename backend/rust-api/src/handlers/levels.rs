use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::models::level::LevelSummary;
use crate::models::LevelId;
use crate::services::AppState;

use super::{game_error, HandlerError};

pub async fn list_levels(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.catalog.summaries()))
}

pub async fn get_level(
    State(state): State<Arc<AppState>>,
    Path(level_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id: LevelId = level_id.parse().map_err(game_error)?;
    let level = state.catalog.resolve(&id).map_err(game_error)?;
    let summary = LevelSummary::from_resolved(&level, state.catalog.next_level_id(&id));

    Ok((StatusCode::OK, Json(summary)))
}
