use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::error::GameError;
use crate::metrics;
use crate::models::PlayerId;
use crate::services::AppState;

pub mod difficulty;
pub mod levels;
pub mod problems;
pub mod progress;
pub mod sessions;

pub type HandlerError = (StatusCode, String);

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let advisor = if state.advisor.has_collaborator() {
        "configured"
    } else {
        "rules_only"
    };

    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "mathworlds-api",
            "version": env!("CARGO_PKG_VERSION"),
            "dependencies": {
                "advisor": advisor,
                "levels": state.catalog.all_level_ids().len(),
            }
        })),
    )
}

pub async fn metrics_handler() -> impl IntoResponse {
    match metrics::render_metrics() {
        Ok(metrics_text) => (StatusCode::OK, metrics_text),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to render metrics: {}", e),
        ),
    }
}

pub(crate) fn game_error(e: GameError) -> HandlerError {
    tracing::debug!("Request rejected: {}", e);
    (e.status_code(), e.to_string())
}

pub(crate) fn validation_error(e: validator::ValidationErrors) -> HandlerError {
    (StatusCode::BAD_REQUEST, format!("Validation error: {}", e))
}

pub(crate) fn parse_player(raw: &str) -> Result<PlayerId, HandlerError> {
    PlayerId::parse(raw).map_err(game_error)
}
