use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Difficulty, LevelId, Operation};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MathProblem {
    pub question: String,
    pub answer: i64,
    pub choices: Vec<i64>,
    pub operation: Operation,
    pub difficulty: Difficulty,
    pub operand_a: i64,
    pub operand_b: i64,
}

impl MathProblem {
    pub fn is_correct(&self, choice: i64) -> bool {
        choice == self.answer
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateProblemRequest {
    #[validate(length(min = 3, max = 16))]
    pub level_id: String,
    #[serde(default)]
    pub difficulty: Difficulty,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateProblemResponse {
    pub level_id: LevelId,
    pub problem: MathProblem,
}
