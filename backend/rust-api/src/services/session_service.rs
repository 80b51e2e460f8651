use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::GameError;
use crate::metrics::{ANSWERS_SUBMITTED_TOTAL, SESSIONS_ACTIVE};
use crate::models::difficulty::PerformanceWindow;
use crate::models::problem::MathProblem;
use crate::models::session::{
    CreateSessionRequest, CreateSessionResponse, SessionStatus, SessionView, SubmitAnswerRequest,
    SubmitAnswerResponse,
};
use crate::models::{Difficulty, LevelId, Operation, PlayerId};

use super::encouragement::{pick_message, MessageCategory, MessageHistory};
use super::problem_generator::ProblemGenerator;
use super::AppState;

/// Consecutive correct answers between two encouragement messages.
const STREAK_ENCOURAGEMENT: u32 = 3;

/// One player working through one level.
pub struct PlaySession {
    id: String,
    player: PlayerId,
    level_id: LevelId,
    operation: Operation,
    stars_to_complete: u32,
    status: SessionStatus,
    difficulty: Difficulty,
    stars: u32,
    streak: u32,
    window: PerformanceWindow,
    history: MessageHistory,
    generator: ProblemGenerator<StdRng>,
    current_problem: Option<MathProblem>,
    issued_at: DateTime<Utc>,
    started_at: DateTime<Utc>,
}

impl PlaySession {
    fn say(&mut self, category: MessageCategory) -> String {
        let (message, history) = pick_message(category, &self.history, self.generator.rng_mut());
        self.history = history;
        message
    }

    fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id.clone(),
            player: self.player.clone(),
            level_id: self.level_id,
            status: self.status,
            difficulty: self.difficulty,
            stars: self.stars,
            stars_to_complete: self.stars_to_complete,
            answered: self.window.total,
            correct: self.window.correct,
            current_problem: self.current_problem.clone(),
            started_at: self.started_at,
        }
    }

    fn elapsed_seconds(&self, now: DateTime<Utc>) -> f64 {
        (now - self.issued_at).num_milliseconds().max(0) as f64 / 1000.0
    }

    /// Replaced by a newer session of the same player, or left unanswered too long.
    fn is_stale(&self, player: &PlayerId, now: DateTime<Utc>, idle: Duration) -> bool {
        self.status == SessionStatus::Active
            && (&self.player == player || now - self.issued_at >= idle)
    }
}

pub struct SessionService<'a> {
    state: &'a AppState,
}

impl<'a> SessionService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub async fn start(
        &self,
        req: CreateSessionRequest,
    ) -> Result<CreateSessionResponse, GameError> {
        let player = PlayerId::parse(&req.player)?;
        let level_id: LevelId = req.level_id.parse()?;
        let level = self.state.catalog.resolve(&level_id)?;

        let progress = self.state.progress.load(&player);
        if !progress.is_unlocked(&level_id) {
            tracing::info!(
                "Refusing session: level={} is locked for player={}",
                level_id,
                player
            );
            return Err(GameError::Locked(level_id.to_string()));
        }

        self.evict_stale(&player).await;
        self.state.progress.reset_level_stars(&player, &level_id)?;

        let mut generator = ProblemGenerator::new(self.state.fork_rng());
        let difficulty = Difficulty::default();
        let problem = generator.generate_for_level(&level, difficulty)?;
        let now = Utc::now();

        let mut session = PlaySession {
            id: Uuid::new_v4().to_string(),
            player,
            level_id,
            operation: level.world.operation,
            stars_to_complete: level.sub_level.stars_to_complete,
            status: SessionStatus::Active,
            difficulty,
            stars: 0,
            streak: 0,
            window: PerformanceWindow::default(),
            history: MessageHistory::new(),
            generator,
            current_problem: Some(problem.clone()),
            issued_at: now,
            started_at: now,
        };
        let message = session.say(MessageCategory::Welcome);

        let response = CreateSessionResponse {
            session_id: session.id.clone(),
            level_id,
            stars_to_complete: session.stars_to_complete,
            difficulty,
            problem,
            message,
        };

        tracing::info!(
            "Session started: id={}, player={}, level={}",
            session.id,
            session.player,
            level_id
        );

        self.state.sessions.write().await.insert(
            session.id.clone(),
            Arc::new(tokio::sync::Mutex::new(session)),
        );
        SESSIONS_ACTIVE.inc();

        Ok(response)
    }

    pub async fn view(&self, session_id: &str) -> Result<SessionView, GameError> {
        let session = self.lookup(session_id).await?;
        let session = session.lock().await;
        Ok(session.view())
    }

    pub async fn answer(
        &self,
        session_id: &str,
        req: SubmitAnswerRequest,
    ) -> Result<SubmitAnswerResponse, GameError> {
        let handle = self.lookup(session_id).await?;
        let mut guard = handle.lock().await;
        let session = &mut *guard;

        // Cleared or replaced only once the answer is fully processed
        let problem = match &session.current_problem {
            Some(problem) if session.status == SessionStatus::Active => problem.clone(),
            _ => {
                return Err(GameError::InvalidInput(format!(
                    "Session {} is no longer active",
                    session_id
                )))
            }
        };

        let elapsed = req
            .elapsed_seconds
            .unwrap_or_else(|| session.elapsed_seconds(Utc::now()));
        let correct = problem.is_correct(req.choice);
        session.window.record(correct, elapsed);
        ANSWERS_SUBMITTED_TOTAL
            .with_label_values(&[if correct { "true" } else { "false" }])
            .inc();

        tracing::debug!(
            "Answer: session={}, choice={}, answer={}, correct={}, elapsed={:.1}s",
            session.id,
            req.choice,
            problem.answer,
            correct,
            elapsed
        );

        let mut message = None;
        let mut level_completed = false;
        let mut unlocked_level = None;

        if correct {
            session.stars += 1;
            session.streak += 1;
            self.state
                .progress
                .add_star(&session.player, &session.level_id)?;

            if session.stars >= session.stars_to_complete {
                let progress = self
                    .state
                    .progress
                    .complete_level(&session.player, &session.level_id)?;

                if progress.is_completed(&session.level_id) {
                    unlocked_level = self
                        .state
                        .catalog
                        .next_level_id(&session.level_id)
                        .filter(|next| progress.is_unlocked(next));
                    level_completed = true;
                    message = Some(session.say(MessageCategory::Celebration));
                } else {
                    tracing::warn!(
                        "Session {} reached {} stars but level={} was not recorded as completed \
                         (stored stars={}); keeping the session active",
                        session.id,
                        session.stars,
                        session.level_id,
                        progress.stars_for(&session.level_id)
                    );
                }
            }

            if !level_completed {
                if session.stars == session.stars_to_complete / 2 {
                    message = Some(session.say(MessageCategory::Milestone));
                } else if session.streak % STREAK_ENCOURAGEMENT == 0 {
                    message = Some(session.say(MessageCategory::Encouragement));
                }
            }
        } else {
            session.streak = 0;
            message = Some(session.say(MessageCategory::Comfort));
        }

        if level_completed {
            session.status = SessionStatus::Completed;
            session.current_problem = None;
            let response = SubmitAnswerResponse {
                correct,
                correct_answer: problem.answer,
                stars: session.stars,
                stars_to_complete: session.stars_to_complete,
                level_completed,
                unlocked_level,
                difficulty: session.difficulty,
                advice: None,
                message,
                next_problem: None,
            };

            drop(guard);
            self.state.sessions.write().await.remove(session_id);
            SESSIONS_ACTIVE.dec();
            tracing::info!("Session completed: id={}", session_id);
            return Ok(response);
        }

        let mut advice = None;
        if session.window.advisor_due() {
            let request = session.window.to_request(
                session.difficulty,
                session.operation,
                Some(session.level_id),
            );
            let (outcome, history) = self
                .state
                .advisor
                .advise(&request, &session.history, session.generator.rng_mut())
                .await?;
            session.history = history;
            session.difficulty = outcome.difficulty;
            advice = Some(outcome);
        }

        let level = self.state.catalog.resolve(&session.level_id)?;
        let next = session
            .generator
            .generate_for_level(&level, session.difficulty)?;
        session.current_problem = Some(next.clone());
        session.issued_at = Utc::now();

        Ok(SubmitAnswerResponse {
            correct,
            correct_answer: problem.answer,
            stars: session.stars,
            stars_to_complete: session.stars_to_complete,
            level_completed,
            unlocked_level,
            difficulty: session.difficulty,
            advice,
            message,
            next_problem: Some(next),
        })
    }

    /// Drops the player's earlier sessions and any session idle past the
    /// configured timeout.
    async fn evict_stale(&self, player: &PlayerId) {
        let now = Utc::now();
        let idle = Duration::seconds(self.state.config.session_idle_secs as i64);

        // Session locks are never awaited while the registry lock is held
        let handles: Vec<_> = self
            .state
            .sessions
            .read()
            .await
            .iter()
            .map(|(id, handle)| (id.clone(), handle.clone()))
            .collect();

        let mut stale = Vec::new();
        for (id, handle) in handles {
            let mut session = handle.lock().await;
            if session.is_stale(player, now, idle) {
                session.status = SessionStatus::Expired;
                session.current_problem = None;
                stale.push(id);
            }
        }

        if stale.is_empty() {
            return;
        }

        let mut sessions = self.state.sessions.write().await;
        for id in stale {
            if sessions.remove(&id).is_some() {
                SESSIONS_ACTIVE.dec();
                tracing::info!("Session expired: id={}", id);
            }
        }
    }

    async fn lookup(
        &self,
        session_id: &str,
    ) -> Result<Arc<tokio::sync::Mutex<PlaySession>>, GameError> {
        self.state
            .sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| GameError::SessionNotFound(session_id.to_string()))
    }
}
