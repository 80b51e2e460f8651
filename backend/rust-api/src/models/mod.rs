use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::GameError;

pub mod difficulty;
pub mod level;
pub mod problem;
pub mod progress;
pub mod session;

#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// One tier up, capped at `Hard`.
    pub fn harder(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium | Difficulty::Hard => Difficulty::Hard,
        }
    }

    /// One tier down, floored at `Easy`.
    pub fn easier(self) -> Self {
        match self {
            Difficulty::Hard => Difficulty::Medium,
            Difficulty::Medium | Difficulty::Easy => Difficulty::Easy,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(GameError::InvalidInput(format!(
                "Unknown difficulty: {}",
                value
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Addition => "addition",
            Operation::Subtraction => "subtraction",
            Operation::Multiplication => "multiplication",
            Operation::Division => "division",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operation::Addition => "+",
            Operation::Subtraction => "-",
            Operation::Multiplication => "×",
            Operation::Division => "÷",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite world/sub-level key, rendered as `"{world}-{sub}"`.
///
/// Ordering follows the catalog: world first, then sub-level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LevelId {
    pub world: u32,
    pub sub: u32,
}

impl LevelId {
    pub const fn new(world: u32, sub: u32) -> Self {
        Self { world, sub }
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.world, self.sub)
    }
}

impl FromStr for LevelId {
    type Err = GameError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || GameError::InvalidInput(format!("Invalid level id: {}", value));

        let (world, sub) = value.trim().split_once('-').ok_or_else(invalid)?;
        let world: u32 = world.parse().map_err(|_| invalid())?;
        let sub: u32 = sub.parse().map_err(|_| invalid())?;

        if world == 0 || sub == 0 {
            return Err(invalid());
        }

        Ok(LevelId { world, sub })
    }
}

impl TryFrom<String> for LevelId {
    type Error = GameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LevelId> for String {
    fn from(id: LevelId) -> Self {
        id.to_string()
    }
}

const PLAYER_NAME_MAX_LEN: usize = 32;

/// Player identity; every progress operation is namespaced by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerId(String);

impl PlayerId {
    pub fn parse(name: &str) -> Result<Self, GameError> {
        let name = name.trim();

        if name.is_empty() || name.chars().count() > PLAYER_NAME_MAX_LEN {
            return Err(GameError::InvalidInput(format!(
                "Player name must be 1-{} characters",
                PLAYER_NAME_MAX_LEN
            )));
        }

        let allowed = |c: char| c.is_alphanumeric() || c == ' ' || c == '-' || c == '_';
        if !name.chars().all(allowed) {
            return Err(GameError::InvalidInput(format!(
                "Player name contains unsupported characters: {}",
                name
            )));
        }

        Ok(PlayerId(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filesystem-safe key derived from the name.
    pub fn storage_key(&self) -> String {
        hex::encode(self.0.as_bytes())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PlayerId {
    type Error = GameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PlayerId::parse(&value)
    }
}

impl From<PlayerId> for String {
    fn from(id: PlayerId) -> Self {
        id.0
    }
}
