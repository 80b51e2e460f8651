use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use validator::Validate;

use crate::models::difficulty::{DifficultyRequest, DifficultyResponse};
use crate::services::encouragement::MessageHistory;
use crate::services::AppState;

use super::{game_error, validation_error, HandlerError};

/// Advisor boundary: same request/response shape the collaborator speaks.
pub async fn advise_difficulty(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DifficultyRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    req.validate().map_err(validation_error)?;

    let mut rng = state.fork_rng();
    let (advice, _) = state
        .advisor
        .advise(&req, &MessageHistory::new(), &mut rng)
        .await
        .map_err(game_error)?;

    tracing::info!(
        "Difficulty advice: {} -> {} (source={})",
        req.current_difficulty,
        advice.difficulty,
        advice.source.as_str()
    );

    Ok((
        StatusCode::OK,
        Json(DifficultyResponse {
            difficulty: advice.difficulty,
            message: advice.message,
        }),
    ))
}
