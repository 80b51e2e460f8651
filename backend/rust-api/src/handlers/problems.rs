use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use validator::Validate;

use crate::models::problem::{GenerateProblemRequest, GenerateProblemResponse};
use crate::models::LevelId;
use crate::services::problem_generator::ProblemGenerator;
use crate::services::AppState;

use super::{game_error, validation_error, HandlerError};

pub async fn generate_problem(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateProblemRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    req.validate().map_err(validation_error)?;

    let level_id: LevelId = req.level_id.parse().map_err(game_error)?;
    let level = state.catalog.resolve(&level_id).map_err(game_error)?;

    let mut generator = ProblemGenerator::new(state.fork_rng());
    let problem = generator
        .generate_for_level(&level, req.difficulty)
        .map_err(game_error)?;

    tracing::debug!(
        "Generated problem for level={}, difficulty={}: {}",
        level_id,
        req.difficulty,
        problem.question
    );

    Ok((StatusCode::OK, Json(GenerateProblemResponse { level_id, problem })))
}
