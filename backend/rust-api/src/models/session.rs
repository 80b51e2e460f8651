use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{difficulty::Advice, problem::MathProblem, Difficulty, LevelId, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
    /// Superseded by a newer session or idle too long.
    Expired,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[validate(length(min = 1, max = 32))]
    pub player: String,
    #[validate(length(min = 3, max = 16))]
    pub level_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub level_id: LevelId,
    pub stars_to_complete: u32,
    pub difficulty: Difficulty,
    pub problem: MathProblem,
    pub message: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    pub choice: i64,
    /// Client-measured response time. Measured server-side when absent.
    #[validate(range(min = 0.0, max = 3600.0))]
    pub elapsed_seconds: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerResponse {
    pub correct: bool,
    pub correct_answer: i64,
    pub stars: u32,
    pub stars_to_complete: u32,
    pub level_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlocked_level: Option<LevelId>,
    pub difficulty: Difficulty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advice: Option<Advice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_problem: Option<MathProblem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub player: PlayerId,
    pub level_id: LevelId,
    pub status: SessionStatus,
    pub difficulty: Difficulty,
    pub stars: u32,
    pub stars_to_complete: u32,
    pub answered: u32,
    pub correct: u32,
    pub current_problem: Option<MathProblem>,
    pub started_at: DateTime<Utc>,
}
