use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::models::LevelId;
use crate::services::AppState;

use super::{game_error, parse_player, HandlerError};

pub async fn get_progress(
    State(state): State<Arc<AppState>>,
    Path(player): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let player = parse_player(&player)?;
    Ok((StatusCode::OK, Json(state.progress.load(&player))))
}

pub async fn reset_progress(
    State(state): State<Arc<AppState>>,
    Path(player): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let player = parse_player(&player)?;
    Ok((StatusCode::OK, Json(state.progress.reset_all(&player))))
}

pub async fn add_star(
    State(state): State<Arc<AppState>>,
    Path((player, level_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, HandlerError> {
    let player = parse_player(&player)?;
    let id: LevelId = level_id.parse().map_err(game_error)?;

    let progress = state.progress.add_star(&player, &id).map_err(game_error)?;
    Ok((StatusCode::OK, Json(progress)))
}

pub async fn reset_level_stars(
    State(state): State<Arc<AppState>>,
    Path((player, level_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, HandlerError> {
    let player = parse_player(&player)?;
    let id: LevelId = level_id.parse().map_err(game_error)?;

    let progress = state
        .progress
        .reset_level_stars(&player, &id)
        .map_err(game_error)?;
    Ok((StatusCode::OK, Json(progress)))
}

pub async fn complete_level(
    State(state): State<Arc<AppState>>,
    Path((player, level_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, HandlerError> {
    let player = parse_player(&player)?;
    let id: LevelId = level_id.parse().map_err(game_error)?;

    let progress = state
        .progress
        .complete_level(&player, &id)
        .map_err(game_error)?;
    Ok((StatusCode::OK, Json(progress)))
}
