use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::LevelId;

/// Persisted per-player progress. The JSON shape is the storage format:
/// `{ "unlockedLevels": [..], "stars": {..}, "completedLevels": [..] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameProgress {
    pub unlocked_levels: BTreeSet<LevelId>,
    #[serde(default)]
    pub stars: BTreeMap<LevelId, u32>,
    #[serde(default)]
    pub completed_levels: BTreeSet<LevelId>,
}

impl GameProgress {
    /// Fresh record with only `first` unlocked.
    pub fn fresh(first: LevelId) -> Self {
        Self {
            unlocked_levels: BTreeSet::from([first]),
            stars: BTreeMap::new(),
            completed_levels: BTreeSet::new(),
        }
    }

    pub fn stars_for(&self, id: &LevelId) -> u32 {
        self.stars.get(id).copied().unwrap_or(0)
    }

    pub fn is_unlocked(&self, id: &LevelId) -> bool {
        self.unlocked_levels.contains(id)
    }

    pub fn is_completed(&self, id: &LevelId) -> bool {
        self.completed_levels.contains(id)
    }
}
