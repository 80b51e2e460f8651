use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::models::session::{CreateSessionRequest, SubmitAnswerRequest};
use crate::services::{session_service::SessionService, AppState};

use super::{game_error, validation_error, HandlerError};

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    req.validate().map_err(validation_error)?;
    tracing::info!(
        "Creating session for player={}, level_id={}",
        req.player,
        req.level_id
    );

    let service = SessionService::new(&state);
    let response = service.start(req).await.map_err(game_error)?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let service = SessionService::new(&state);
    let view = service.view(&session_id).await.map_err(game_error)?;
    Ok((StatusCode::OK, Json(view)))
}

pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    req.validate().map_err(validation_error)?;
    tracing::info!("Submitting answer for session: {}", session_id);

    let service = SessionService::new(&state);
    let response = service
        .answer(&session_id, req)
        .await
        .map_err(game_error)?;
    Ok((StatusCode::OK, Json(response)))
}
