use std::sync::Arc;

use crate::error::GameError;
use crate::metrics::{record_storage_operation, LEVELS_COMPLETED_TOTAL, STARS_AWARDED_TOTAL};
use crate::models::progress::GameProgress;
use crate::models::{LevelId, PlayerId};

use super::level_graph::LevelGraph;
use super::progress_storage::ProgressStorage;

/// Per-player progress with read-modify-write mutations.
///
/// Storage failures and corrupt payloads are absorbed: reads fall back to a
/// fresh record, failed writes are logged and dropped. Only unknown level ids
/// surface as errors.
pub struct ProgressStore {
    storage: Arc<dyn ProgressStorage>,
    graph: Arc<LevelGraph>,
}

impl ProgressStore {
    pub fn new(storage: Arc<dyn ProgressStorage>, graph: Arc<LevelGraph>) -> Self {
        Self { storage, graph }
    }

    pub fn default_progress(&self) -> GameProgress {
        GameProgress::fresh(self.graph.first_level_id())
    }

    pub fn load(&self, player: &PlayerId) -> GameProgress {
        let payload = match self.storage.read(player) {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                tracing::debug!("No saved progress for player={}, starting fresh", player);
                return self.default_progress();
            }
            Err(e) => {
                tracing::warn!("Progress storage unavailable for player={}: {}", player, e);
                record_storage_operation("load", "unavailable");
                return self.default_progress();
            }
        };

        match serde_json::from_str::<GameProgress>(&payload) {
            Ok(progress) => {
                record_storage_operation("load", "ok");
                self.sanitize(player, progress)
            }
            Err(e) => {
                tracing::warn!(
                    "Corrupt progress payload for player={}, substituting default: {}",
                    player,
                    e
                );
                record_storage_operation("load", "corrupt");
                self.default_progress()
            }
        }
    }

    pub fn add_star(&self, player: &PlayerId, id: &LevelId) -> Result<GameProgress, GameError> {
        self.graph.resolve(id)?;

        let mut progress = self.load(player);
        let stars = progress.stars.entry(*id).or_insert(0);
        *stars += 1;
        STARS_AWARDED_TOTAL.inc();

        tracing::debug!("Star added: player={}, level={}, stars={}", player, id, stars);
        self.save(player, &progress);
        Ok(progress)
    }

    /// Zero the level's stars on (re-)entry. Completion and unlocks are kept.
    pub fn reset_level_stars(
        &self,
        player: &PlayerId,
        id: &LevelId,
    ) -> Result<GameProgress, GameError> {
        self.graph.resolve(id)?;

        let mut progress = self.load(player);
        progress.stars.insert(*id, 0);
        self.save(player, &progress);
        Ok(progress)
    }

    /// Mark the level completed and unlock its successor. Idempotent.
    ///
    /// A level that has not reached its star target is left untouched.
    pub fn complete_level(
        &self,
        player: &PlayerId,
        id: &LevelId,
    ) -> Result<GameProgress, GameError> {
        let level = self.graph.resolve(id)?;
        let threshold = level.sub_level.stars_to_complete;

        let mut progress = self.load(player);

        if !progress.is_completed(id) {
            let stars = progress.stars_for(id);
            if stars < threshold {
                tracing::warn!(
                    "Refusing to complete level={} for player={}: {}/{} stars",
                    id,
                    player,
                    stars,
                    threshold
                );
                return Ok(progress);
            }

            progress.completed_levels.insert(*id);
            LEVELS_COMPLETED_TOTAL
                .with_label_values(&[&id.to_string()])
                .inc();
            tracing::info!("Level completed: player={}, level={}", player, id);
        }

        if let Some(next) = self.graph.next_level_id(id) {
            if progress.unlocked_levels.insert(next) {
                tracing::info!("Level unlocked: player={}, level={}", player, next);
            }
        }

        self.save(player, &progress);
        Ok(progress)
    }

    pub fn reset_all(&self, player: &PlayerId) -> GameProgress {
        let progress = self.default_progress();
        tracing::info!("Resetting all progress for player={}", player);
        self.save(player, &progress);
        progress
    }

    fn save(&self, player: &PlayerId, progress: &GameProgress) {
        let payload = match serde_json::to_string(progress) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Failed to serialize progress for player={}: {}", player, e);
                record_storage_operation("save", "error");
                return;
            }
        };

        match self.storage.write(player, &payload) {
            Ok(()) => record_storage_operation("save", "ok"),
            Err(e) => {
                tracing::warn!("Failed to persist progress for player={}: {}", player, e);
                record_storage_operation("save", "unavailable");
            }
        }
    }

    /// Drop identifiers the catalog does not know and re-establish the
    /// first-level unlock.
    fn sanitize(&self, player: &PlayerId, mut progress: GameProgress) -> GameProgress {
        let graph = &self.graph;
        let before = progress.unlocked_levels.len()
            + progress.completed_levels.len()
            + progress.stars.len();

        progress.unlocked_levels.retain(|id| graph.contains(id));
        progress.completed_levels.retain(|id| graph.contains(id));
        progress.stars.retain(|id, _| graph.contains(id));

        let after = progress.unlocked_levels.len()
            + progress.completed_levels.len()
            + progress.stars.len();
        if after != before {
            tracing::warn!(
                "Dropped {} unknown level entries from progress of player={}",
                before - after,
                player
            );
        }

        progress.unlocked_levels.insert(graph.first_level_id());
        progress
    }
}
