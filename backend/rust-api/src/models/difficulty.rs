use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use validator::{Validate, ValidationError};

use super::{Difficulty, LevelId, Operation};

/// Number of trailing response times kept in a performance window.
pub const WINDOW_TIMES: usize = 10;

/// The advisor is consulted after every this-many answers.
pub const ADVISOR_INTERVAL: u32 = 5;

/// Average used when no response time has been sampled yet.
const DEFAULT_AVERAGE_SECONDS: f64 = 5.0;

/// Request sent to (and accepted from) the difficulty collaborator boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_counts"))]
pub struct DifficultyRequest {
    #[validate(range(min = 1))]
    pub total_count: u32,
    pub correct_count: u32,
    #[validate(range(min = 0.0, max = 3600.0))]
    pub average_time: f64,
    pub current_difficulty: Difficulty,
    pub operation: Operation,
    #[serde(default)]
    pub level_id: Option<LevelId>,
}

fn validate_counts(req: &DifficultyRequest) -> Result<(), ValidationError> {
    if req.correct_count > req.total_count {
        return Err(ValidationError::new("correct_count_exceeds_total"));
    }
    if !req.average_time.is_finite() {
        return Err(ValidationError::new("average_time_not_finite"));
    }
    Ok(())
}

/// What the collaborator answers with, and what the boundary endpoint returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyResponse {
    pub difficulty: Difficulty,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceSource {
    Collaborator,
    Fallback,
}

impl AdviceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdviceSource::Collaborator => "collaborator",
            AdviceSource::Fallback => "fallback",
        }
    }
}

/// Outcome of one advisor consultation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advice {
    pub difficulty: Difficulty,
    pub message: String,
    pub source: AdviceSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_difficulty: Option<Difficulty>,
}

/// Rolling per-session performance sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceWindow {
    pub correct: u32,
    pub total: u32,
    pub times: VecDeque<f64>,
}

impl PerformanceWindow {
    pub fn record(&mut self, correct: bool, seconds: f64) {
        self.total += 1;
        if correct {
            self.correct += 1;
        }

        let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        if self.times.len() == WINDOW_TIMES {
            self.times.pop_front();
        }
        self.times.push_back(seconds);
    }

    pub fn average_time(&self) -> f64 {
        if self.times.is_empty() {
            return DEFAULT_AVERAGE_SECONDS;
        }
        self.times.iter().sum::<f64>() / self.times.len() as f64
    }

    /// True right after every `ADVISOR_INTERVAL`-th answer.
    pub fn advisor_due(&self) -> bool {
        self.total > 0 && self.total % ADVISOR_INTERVAL == 0
    }

    pub fn to_request(
        &self,
        current: Difficulty,
        operation: Operation,
        level_id: Option<LevelId>,
    ) -> DifficultyRequest {
        DifficultyRequest {
            total_count: self.total,
            correct_count: self.correct,
            average_time: (self.average_time() * 10.0).round() / 10.0,
            current_difficulty: current,
            operation,
            level_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_keeps_last_ten_times() {
        let mut window = PerformanceWindow::default();
        for i in 0..15 {
            window.record(i % 2 == 0, i as f64);
        }
        assert_eq!(window.total, 15);
        assert_eq!(window.correct, 8);
        assert_eq!(window.times.len(), WINDOW_TIMES);
        assert_eq!(window.times.front().copied(), Some(5.0));
        assert_eq!(window.times.back().copied(), Some(14.0));
    }

    #[test]
    fn empty_window_average_defaults() {
        assert_eq!(PerformanceWindow::default().average_time(), 5.0);
    }

    #[test]
    fn advisor_due_every_fifth_answer() {
        let mut window = PerformanceWindow::default();
        let mut due = Vec::new();
        for _ in 0..10 {
            window.record(true, 1.0);
            due.push(window.advisor_due());
        }
        assert_eq!(
            due,
            vec![false, false, false, false, true, false, false, false, false, true]
        );
    }

    #[test]
    fn request_rounds_average_to_one_decimal() {
        let mut window = PerformanceWindow::default();
        window.record(true, 1.26);
        window.record(false, 2.0);
        window.record(true, 3.0);
        let req = window.to_request(Difficulty::Easy, Operation::Addition, None);
        assert_eq!(req.average_time, 2.1);
        assert_eq!(req.correct_count, 2);
        assert_eq!(req.total_count, 3);
    }

    #[test]
    fn request_validation_rejects_bad_counts() {
        let mut req = DifficultyRequest {
            total_count: 10,
            correct_count: 9,
            average_time: 3.0,
            current_difficulty: Difficulty::Easy,
            operation: Operation::Addition,
            level_id: None,
        };
        assert!(req.validate().is_ok());

        req.correct_count = 11;
        assert!(req.validate().is_err());

        req.correct_count = 0;
        req.total_count = 0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn request_uses_camel_case_on_the_wire() {
        let json = r#"{
            "correctCount": 4,
            "totalCount": 5,
            "averageTime": 3.2,
            "currentDifficulty": "medium",
            "operation": "division",
            "levelId": "4-1"
        }"#;
        let req: DifficultyRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.current_difficulty, Difficulty::Medium);
        assert_eq!(req.level_id, Some(LevelId::new(4, 1)));
    }
}
