use serde::{Deserialize, Serialize};

use super::{Difficulty, LevelId, Operation};
use crate::error::GameError;

/// Upper bound for any operand range bound.
pub const OPERAND_LIMIT: i64 = 10_000;

/// Inclusive `[min, max]` bound for one operand at one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperandRange {
    pub min: i64,
    pub max: i64,
}

impl OperandRange {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.min < 0 || self.max < 0 {
            return Err(GameError::InvalidRange(format!(
                "negative bound in [{}, {}]",
                self.min, self.max
            )));
        }
        if self.min > self.max {
            return Err(GameError::InvalidRange(format!(
                "min {} exceeds max {}",
                self.min, self.max
            )));
        }
        if self.max > OPERAND_LIMIT {
            return Err(GameError::InvalidRange(format!(
                "max {} exceeds operand limit {}",
                self.max, OPERAND_LIMIT
            )));
        }
        Ok(())
    }

    pub fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Per-tier operand ranges for one operand of one sub-level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeTable {
    pub easy: OperandRange,
    pub medium: OperandRange,
    pub hard: OperandRange,
}

impl RangeTable {
    pub const fn new(easy: (i64, i64), medium: (i64, i64), hard: (i64, i64)) -> Self {
        Self {
            easy: OperandRange::new(easy.0, easy.1),
            medium: OperandRange::new(medium.0, medium.1),
            hard: OperandRange::new(hard.0, hard.1),
        }
    }

    pub fn for_tier(&self, difficulty: Difficulty) -> OperandRange {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }

    pub fn validate(&self) -> Result<(), GameError> {
        self.easy.validate()?;
        self.medium.validate()?;
        self.hard.validate()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubLevelDefinition {
    pub sub_id: u32,
    pub name: String,
    pub stars_to_complete: u32,
    pub ranges_a: RangeTable,
    pub ranges_b: RangeTable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldDefinition {
    pub world_id: u32,
    pub name: String,
    pub operation: Operation,
    pub theme: String,
    pub emoji: String,
    pub description: String,
    pub sub_levels: Vec<SubLevelDefinition>,
}

impl WorldDefinition {
    pub fn sub_level(&self, sub_id: u32) -> Option<&SubLevelDefinition> {
        self.sub_levels.iter().find(|sub| sub.sub_id == sub_id)
    }
}

/// A resolved catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedLevel<'a> {
    pub id: LevelId,
    pub world: &'a WorldDefinition,
    pub sub_level: &'a SubLevelDefinition,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelSummary {
    pub id: LevelId,
    pub world_id: u32,
    pub world_name: String,
    pub name: String,
    pub operation: Operation,
    pub theme: String,
    pub emoji: String,
    pub stars_to_complete: u32,
    pub next_level_id: Option<LevelId>,
}

impl LevelSummary {
    pub fn from_resolved(level: &ResolvedLevel<'_>, next_level_id: Option<LevelId>) -> Self {
        Self {
            id: level.id,
            world_id: level.world.world_id,
            world_name: level.world.name.clone(),
            name: level.sub_level.name.clone(),
            operation: level.world.operation,
            theme: level.world.theme.clone(),
            emoji: level.world.emoji.clone(),
            stars_to_complete: level.sub_level.stars_to_complete,
            next_level_id,
        }
    }
}
