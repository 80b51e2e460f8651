use async_trait::async_trait;
use rand::Rng;
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crate::error::GameError;
use crate::metrics::DIFFICULTY_DECISIONS_TOTAL;
use crate::models::difficulty::{Advice, AdviceSource, DifficultyRequest, DifficultyResponse};
use crate::models::Difficulty;

use super::encouragement::{is_child_friendly, pick_message, MessageCategory, MessageHistory};

const ESCALATE_ACCURACY: f64 = 0.8;
const ESCALATE_MAX_SECONDS: f64 = 5.0;
const DEESCALATE_ACCURACY: f64 = 0.5;
const DEESCALATE_MIN_SECONDS: f64 = 10.0;

/// Rule engine: next tier from accuracy and average response time.
///
/// - accuracy >= 80% and average under 5s: one tier harder
/// - accuracy under 50% or average over 10s: one tier easier
/// - otherwise unchanged
pub fn decide(
    correct_count: u32,
    total_count: u32,
    average_seconds: f64,
    current: Difficulty,
) -> Result<Difficulty, GameError> {
    if total_count == 0 {
        return Err(GameError::InvalidInput("totalCount must be positive".into()));
    }
    if correct_count > total_count {
        return Err(GameError::InvalidInput(format!(
            "correctCount {} exceeds totalCount {}",
            correct_count, total_count
        )));
    }
    if !average_seconds.is_finite() || average_seconds < 0.0 {
        return Err(GameError::InvalidInput(format!(
            "averageTime must be a non-negative number, got {}",
            average_seconds
        )));
    }

    let accuracy = correct_count as f64 / total_count as f64;

    let next = if accuracy >= ESCALATE_ACCURACY && average_seconds < ESCALATE_MAX_SECONDS {
        current.harder()
    } else if accuracy < DEESCALATE_ACCURACY || average_seconds > DEESCALATE_MIN_SECONDS {
        current.easier()
    } else {
        current
    };

    Ok(next)
}

/// External phrasing collaborator. Supplies encouragement text and its own
/// tier suggestion.
#[async_trait]
pub trait PhrasingClient: Send + Sync {
    async fn phrase(&self, request: &DifficultyRequest) -> anyhow::Result<DifficultyResponse>;
}

/// Rule engine plus optional phrasing collaborator.
///
/// The tier always comes from [`decide`]; the collaborator only contributes
/// the message. Any collaborator failure, including exceeding `timeout`,
/// falls back to a locally picked message.
#[derive(Clone)]
pub struct DifficultyAdvisor {
    client: Option<Arc<dyn PhrasingClient>>,
    timeout: Duration,
}

impl DifficultyAdvisor {
    pub fn new(client: Option<Arc<dyn PhrasingClient>>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn rules_only() -> Self {
        Self::new(None, Duration::ZERO)
    }

    pub fn has_collaborator(&self) -> bool {
        self.client.is_some()
    }

    pub async fn advise<R: Rng + ?Sized>(
        &self,
        request: &DifficultyRequest,
        history: &MessageHistory,
        rng: &mut R,
    ) -> Result<(Advice, MessageHistory), GameError> {
        let current = request.current_difficulty;
        let next = decide(
            request.correct_count,
            request.total_count,
            request.average_time,
            current,
        )?;
        let direction = direction_label(current, next);

        tracing::debug!(
            "Difficulty rules: {}/{} correct, avg={}s, {} -> {}",
            request.correct_count,
            request.total_count,
            request.average_time,
            current,
            next
        );

        if let Some(client) = &self.client {
            match tokio::time::timeout(self.timeout, client.phrase(request)).await {
                Ok(Ok(response)) if is_child_friendly(&response.message) => {
                    if response.difficulty != next {
                        tracing::info!(
                            "Collaborator suggested {} but rules chose {}; keeping {}",
                            response.difficulty,
                            next,
                            next
                        );
                    }
                    DIFFICULTY_DECISIONS_TOTAL
                        .with_label_values(&[AdviceSource::Collaborator.as_str(), direction])
                        .inc();

                    let advice = Advice {
                        difficulty: next,
                        message: response.message.trim().to_string(),
                        source: AdviceSource::Collaborator,
                        suggested_difficulty: Some(response.difficulty),
                    };
                    return Ok((advice, history.clone()));
                }
                Ok(Ok(response)) => {
                    tracing::warn!(
                        "Collaborator message rejected as unsuitable: {:?}",
                        response.message
                    );
                }
                Ok(Err(e)) => {
                    tracing::warn!("Difficulty collaborator failed: {:#}", e);
                }
                Err(_) => {
                    tracing::warn!(
                        "Difficulty collaborator timed out after {}ms",
                        self.timeout.as_millis()
                    );
                }
            }
        }

        DIFFICULTY_DECISIONS_TOTAL
            .with_label_values(&[AdviceSource::Fallback.as_str(), direction])
            .inc();

        let (message, history) = pick_message(fallback_category(current, next), history, rng);
        let advice = Advice {
            difficulty: next,
            message,
            source: AdviceSource::Fallback,
            suggested_difficulty: None,
        };
        Ok((advice, history))
    }
}

fn fallback_category(current: Difficulty, next: Difficulty) -> MessageCategory {
    match next.cmp(&current) {
        Ordering::Greater => MessageCategory::Celebration,
        Ordering::Less => MessageCategory::Comfort,
        Ordering::Equal => MessageCategory::Encouragement,
    }
}

fn direction_label(current: Difficulty, next: Difficulty) -> &'static str {
    match next.cmp(&current) {
        Ordering::Greater => "up",
        Ordering::Less => "down",
        Ordering::Equal => "same",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Operation;
    use rand::{rngs::StdRng, SeedableRng};

    struct CannedClient(DifficultyResponse);

    #[async_trait]
    impl PhrasingClient for CannedClient {
        async fn phrase(&self, _request: &DifficultyRequest) -> anyhow::Result<DifficultyResponse> {
            Ok(self.0.clone())
        }
    }

    struct FailingClient;

    #[async_trait]
    impl PhrasingClient for FailingClient {
        async fn phrase(&self, _request: &DifficultyRequest) -> anyhow::Result<DifficultyResponse> {
            anyhow::bail!("connection refused")
        }
    }

    struct StalledClient;

    #[async_trait]
    impl PhrasingClient for StalledClient {
        async fn phrase(&self, _request: &DifficultyRequest) -> anyhow::Result<DifficultyResponse> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            anyhow::bail!("unreachable")
        }
    }

    fn request(correct: u32, total: u32, avg: f64, current: Difficulty) -> DifficultyRequest {
        DifficultyRequest {
            total_count: total,
            correct_count: correct,
            average_time: avg,
            current_difficulty: current,
            operation: Operation::Addition,
            level_id: None,
        }
    }

    #[test]
    fn decide_escalates_fast_accurate_play() {
        assert!(decide(9, 10, 3.0, Difficulty::Easy).unwrap() >= Difficulty::Medium);
        assert_eq!(decide(8, 10, 4.9, Difficulty::Medium).unwrap(), Difficulty::Hard);
        assert_eq!(decide(10, 10, 1.0, Difficulty::Hard).unwrap(), Difficulty::Hard);
    }

    #[test]
    fn decide_deescalates_struggling_play() {
        assert_eq!(decide(2, 10, 12.0, Difficulty::Medium).unwrap(), Difficulty::Easy);
        assert_eq!(decide(4, 10, 3.0, Difficulty::Hard).unwrap(), Difficulty::Medium);
        assert_eq!(decide(10, 10, 10.5, Difficulty::Hard).unwrap(), Difficulty::Medium);
        assert_eq!(decide(0, 5, 2.0, Difficulty::Easy).unwrap(), Difficulty::Easy);
    }

    #[test]
    fn decide_holds_in_between() {
        assert_eq!(decide(6, 10, 7.0, Difficulty::Medium).unwrap(), Difficulty::Medium);
        // Accurate but not fast enough.
        assert_eq!(decide(9, 10, 5.0, Difficulty::Easy).unwrap(), Difficulty::Easy);
        // Exactly 50% at exactly 10s stays put.
        assert_eq!(decide(5, 10, 10.0, Difficulty::Hard).unwrap(), Difficulty::Hard);
    }

    #[test]
    fn decide_rejects_invalid_input() {
        assert!(matches!(
            decide(0, 0, 3.0, Difficulty::Easy),
            Err(GameError::InvalidInput(_))
        ));
        assert!(matches!(
            decide(6, 5, 3.0, Difficulty::Easy),
            Err(GameError::InvalidInput(_))
        ));
        assert!(matches!(
            decide(3, 5, f64::NAN, Difficulty::Easy),
            Err(GameError::InvalidInput(_))
        ));
        assert!(matches!(
            decide(3, 5, -1.0, Difficulty::Easy),
            Err(GameError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn rules_only_uses_fallback_message() {
        let advisor = DifficultyAdvisor::rules_only();
        let mut rng = StdRng::seed_from_u64(1);
        let (advice, history) = advisor
            .advise(&request(9, 10, 3.0, Difficulty::Easy), &MessageHistory::new(), &mut rng)
            .await
            .unwrap();

        assert_eq!(advice.difficulty, Difficulty::Medium);
        assert_eq!(advice.source, AdviceSource::Fallback);
        assert!(is_child_friendly(&advice.message));
        assert!(history.contains(&advice.message));
    }

    #[tokio::test]
    async fn collaborator_supplies_message_but_not_tier() {
        let client = CannedClient(DifficultyResponse {
            difficulty: Difficulty::Hard,
            message: "You are a counting champion!".into(),
        });
        let advisor = DifficultyAdvisor::new(Some(Arc::new(client)), Duration::from_secs(1));
        let mut rng = StdRng::seed_from_u64(1);

        let (advice, _) = advisor
            .advise(&request(6, 10, 7.0, Difficulty::Medium), &MessageHistory::new(), &mut rng)
            .await
            .unwrap();

        assert_eq!(advice.difficulty, Difficulty::Medium);
        assert_eq!(advice.message, "You are a counting champion!");
        assert_eq!(advice.source, AdviceSource::Collaborator);
        assert_eq!(advice.suggested_difficulty, Some(Difficulty::Hard));
    }

    #[tokio::test]
    async fn discouraging_collaborator_message_is_replaced() {
        let client = CannedClient(DifficultyResponse {
            difficulty: Difficulty::Easy,
            message: "That was wrong".into(),
        });
        let advisor = DifficultyAdvisor::new(Some(Arc::new(client)), Duration::from_secs(1));
        let mut rng = StdRng::seed_from_u64(1);

        let (advice, _) = advisor
            .advise(&request(2, 10, 12.0, Difficulty::Medium), &MessageHistory::new(), &mut rng)
            .await
            .unwrap();

        assert_eq!(advice.difficulty, Difficulty::Easy);
        assert_eq!(advice.source, AdviceSource::Fallback);
        assert!(!advice.message.to_lowercase().contains("wrong"));
    }

    #[tokio::test]
    async fn failing_collaborator_matches_rules_only() {
        let advisor = DifficultyAdvisor::new(Some(Arc::new(FailingClient)), Duration::from_secs(1));
        let rules = DifficultyAdvisor::rules_only();
        let req = request(2, 10, 12.0, Difficulty::Hard);

        let (with_failure, _) = advisor
            .advise(&req, &MessageHistory::new(), &mut StdRng::seed_from_u64(4))
            .await
            .unwrap();
        let (without, _) = rules
            .advise(&req, &MessageHistory::new(), &mut StdRng::seed_from_u64(4))
            .await
            .unwrap();

        assert_eq!(with_failure, without);
        assert_eq!(with_failure.difficulty, Difficulty::Medium);
    }

    #[tokio::test]
    async fn stalled_collaborator_times_out() {
        let advisor =
            DifficultyAdvisor::new(Some(Arc::new(StalledClient)), Duration::from_millis(200));
        let mut rng = StdRng::seed_from_u64(5);

        let (advice, _) = advisor
            .advise(&request(6, 10, 7.0, Difficulty::Easy), &MessageHistory::new(), &mut rng)
            .await
            .unwrap();

        assert_eq!(advice.difficulty, Difficulty::Easy);
        assert_eq!(advice.source, AdviceSource::Fallback);
    }

    #[tokio::test]
    async fn invalid_window_is_rejected_before_collaborator() {
        let advisor = DifficultyAdvisor::rules_only();
        let mut rng = StdRng::seed_from_u64(1);
        let result = advisor
            .advise(&request(0, 0, 3.0, Difficulty::Easy), &MessageHistory::new(), &mut rng)
            .await;
        assert!(matches!(result, Err(GameError::InvalidInput(_))));
    }
}
