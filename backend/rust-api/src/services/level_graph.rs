use lazy_static::lazy_static;
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::GameError;
use crate::models::level::{
    LevelSummary, RangeTable, ResolvedLevel, SubLevelDefinition, WorldDefinition,
};
use crate::models::{LevelId, Operation};

lazy_static! {
    /// Built-in catalog shared by the generator and the progress store.
    pub static ref CATALOG: Arc<LevelGraph> =
        Arc::new(LevelGraph::new(builtin_worlds()).expect("built-in level catalog is valid"));
}

/// Ordered catalog of worlds and their sub-levels.
///
/// Identifiers that have shipped must stay resolvable: content updates may
/// append worlds or sub-levels, never renumber or drop them.
#[derive(Debug, Clone)]
pub struct LevelGraph {
    worlds: Vec<WorldDefinition>,
    order: Vec<LevelId>,
}

impl LevelGraph {
    pub fn new(worlds: Vec<WorldDefinition>) -> Result<Self, GameError> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();

        for world in &worlds {
            if world.world_id == 0 {
                return Err(GameError::InvalidInput("world id must be positive".into()));
            }
            if world.sub_levels.is_empty() {
                return Err(GameError::InvalidInput(format!(
                    "world {} has no sub-levels",
                    world.world_id
                )));
            }

            for sub in &world.sub_levels {
                let id = LevelId::new(world.world_id, sub.sub_id);
                if sub.sub_id == 0 || !seen.insert(id) {
                    return Err(GameError::InvalidInput(format!(
                        "duplicate or invalid level id {}",
                        id
                    )));
                }
                if sub.stars_to_complete == 0 {
                    return Err(GameError::InvalidInput(format!(
                        "level {} needs a positive star target",
                        id
                    )));
                }

                sub.ranges_a.validate()?;
                sub.ranges_b.validate()?;

                if world.operation == Operation::Division
                    && [sub.ranges_b.easy, sub.ranges_b.medium, sub.ranges_b.hard]
                        .iter()
                        .any(|range| range.max < 1)
                {
                    return Err(GameError::InvalidRange(format!(
                        "level {} has no non-zero divisor",
                        id
                    )));
                }

                order.push(id);
            }
        }

        if order.is_empty() {
            return Err(GameError::InvalidInput("catalog is empty".into()));
        }

        Ok(Self { worlds, order })
    }

    pub fn resolve(&self, id: &LevelId) -> Result<ResolvedLevel<'_>, GameError> {
        let world = self
            .worlds
            .iter()
            .find(|world| world.world_id == id.world)
            .ok_or_else(|| GameError::NotFound(id.to_string()))?;
        let sub_level = world
            .sub_level(id.sub)
            .ok_or_else(|| GameError::NotFound(id.to_string()))?;

        Ok(ResolvedLevel {
            id: *id,
            world,
            sub_level,
        })
    }

    /// World order, then sub-level order. Defines "next level".
    pub fn all_level_ids(&self) -> &[LevelId] {
        &self.order
    }

    pub fn first_level_id(&self) -> LevelId {
        self.order[0]
    }

    pub fn contains(&self, id: &LevelId) -> bool {
        self.order.contains(id)
    }

    pub fn next_level_id(&self, id: &LevelId) -> Option<LevelId> {
        let position = self.order.iter().position(|candidate| candidate == id)?;
        self.order.get(position + 1).copied()
    }

    pub fn summaries(&self) -> Vec<LevelSummary> {
        self.order
            .iter()
            .filter_map(|id| self.resolve(id).ok())
            .map(|level| LevelSummary::from_resolved(&level, self.next_level_id(&level.id)))
            .collect()
    }
}

fn sub_level(
    sub_id: u32,
    name: &str,
    stars_to_complete: u32,
    ranges_a: RangeTable,
    ranges_b: RangeTable,
) -> SubLevelDefinition {
    SubLevelDefinition {
        sub_id,
        name: name.to_string(),
        stars_to_complete,
        ranges_a,
        ranges_b,
    }
}

fn world(
    world_id: u32,
    name: &str,
    operation: Operation,
    theme: &str,
    emoji: &str,
    description: &str,
    sub_levels: Vec<SubLevelDefinition>,
) -> WorldDefinition {
    WorldDefinition {
        world_id,
        name: name.to_string(),
        operation,
        theme: theme.to_string(),
        emoji: emoji.to_string(),
        description: description.to_string(),
        sub_levels,
    }
}

// For division worlds `ranges_a` is the quotient range and `ranges_b` the divisor range.
pub fn builtin_worlds() -> Vec<WorldDefinition> {
    vec![
        world(
            1,
            "Space Journey",
            Operation::Addition,
            "space",
            "🚀",
            "Travel planet to planet with addition!",
            vec![
                sub_level(
                    1,
                    "Launch Pad",
                    8,
                    RangeTable::new((1, 5), (2, 8), (5, 10)),
                    RangeTable::new((1, 5), (2, 8), (5, 10)),
                ),
                sub_level(
                    2,
                    "Moon Base",
                    10,
                    RangeTable::new((1, 10), (5, 15), (10, 25)),
                    RangeTable::new((1, 10), (5, 15), (10, 25)),
                ),
                sub_level(
                    3,
                    "Star Cluster",
                    12,
                    RangeTable::new((5, 15), (10, 30), (10, 50)),
                    RangeTable::new((5, 15), (10, 30), (10, 50)),
                ),
            ],
        ),
        world(
            2,
            "Ocean Explorer",
            Operation::Subtraction,
            "ocean",
            "🐙",
            "Dive deep with subtraction!",
            vec![
                sub_level(
                    1,
                    "Coral Reef",
                    8,
                    RangeTable::new((3, 10), (5, 15), (10, 20)),
                    RangeTable::new((1, 5), (1, 10), (5, 15)),
                ),
                sub_level(
                    2,
                    "Kelp Forest",
                    10,
                    RangeTable::new((10, 20), (10, 25), (20, 40)),
                    RangeTable::new((1, 10), (5, 15), (10, 25)),
                ),
                sub_level(
                    3,
                    "Deep Trench",
                    12,
                    RangeTable::new((20, 40), (25, 50), (40, 99)),
                    RangeTable::new((5, 20), (10, 30), (20, 60)),
                ),
            ],
        ),
        world(
            3,
            "Enchanted Forest",
            Operation::Multiplication,
            "forest",
            "🌳",
            "Explore the forest with multiplication!",
            vec![
                sub_level(
                    1,
                    "Mushroom Ring",
                    8,
                    RangeTable::new((1, 3), (1, 5), (2, 5)),
                    RangeTable::new((1, 5), (2, 5), (2, 6)),
                ),
                sub_level(
                    2,
                    "Whispering Oaks",
                    10,
                    RangeTable::new((1, 5), (2, 8), (3, 10)),
                    RangeTable::new((1, 5), (2, 8), (3, 10)),
                ),
                sub_level(
                    3,
                    "Dragon Grove",
                    12,
                    RangeTable::new((2, 8), (3, 12), (6, 12)),
                    RangeTable::new((2, 8), (3, 12), (6, 12)),
                ),
            ],
        ),
        world(
            4,
            "Castle Quest",
            Operation::Division,
            "castle",
            "🏰",
            "Unlock the castle with division!",
            vec![
                sub_level(
                    1,
                    "Drawbridge",
                    8,
                    RangeTable::new((1, 5), (1, 5), (2, 6)),
                    RangeTable::new((1, 2), (1, 5), (2, 5)),
                ),
                sub_level(
                    2,
                    "Great Hall",
                    10,
                    RangeTable::new((1, 5), (2, 8), (3, 10)),
                    RangeTable::new((1, 5), (2, 8), (2, 10)),
                ),
                sub_level(
                    3,
                    "Throne Room",
                    12,
                    RangeTable::new((2, 8), (3, 12), (5, 12)),
                    RangeTable::new((2, 8), (2, 10), (3, 12)),
                ),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_order() {
        let ids: Vec<String> = CATALOG
            .all_level_ids()
            .iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(
            ids,
            vec![
                "1-1", "1-2", "1-3", "2-1", "2-2", "2-3", "3-1", "3-2", "3-3", "4-1", "4-2",
                "4-3"
            ]
        );
        assert_eq!(CATALOG.first_level_id(), LevelId::new(1, 1));
    }

    #[test]
    fn next_level_crosses_worlds_and_ends() {
        assert_eq!(
            CATALOG.next_level_id(&LevelId::new(1, 1)),
            Some(LevelId::new(1, 2))
        );
        assert_eq!(
            CATALOG.next_level_id(&LevelId::new(1, 3)),
            Some(LevelId::new(2, 1))
        );
        assert_eq!(CATALOG.next_level_id(&LevelId::new(4, 3)), None);
        assert_eq!(CATALOG.next_level_id(&LevelId::new(9, 9)), None);
    }

    #[test]
    fn resolve_returns_world_and_sub_level() {
        let level = CATALOG.resolve(&LevelId::new(1, 1)).unwrap();
        assert_eq!(level.world.operation, Operation::Addition);
        assert_eq!(level.sub_level.stars_to_complete, 8);

        let level = CATALOG.resolve(&LevelId::new(4, 2)).unwrap();
        assert_eq!(level.world.name, "Castle Quest");
        assert_eq!(level.sub_level.name, "Great Hall");
    }

    #[test]
    fn resolve_unknown_is_not_found() {
        assert_eq!(
            CATALOG.resolve(&LevelId::new(5, 1)).unwrap_err(),
            GameError::NotFound("5-1".into())
        );
        assert_eq!(
            CATALOG.resolve(&LevelId::new(1, 4)).unwrap_err(),
            GameError::NotFound("1-4".into())
        );
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut worlds = builtin_worlds();
        let copy = worlds[0].sub_levels[0].clone();
        worlds[0].sub_levels.push(copy);
        assert!(LevelGraph::new(worlds).is_err());
    }

    #[test]
    fn rejects_zero_only_divisor() {
        let mut worlds = builtin_worlds();
        worlds[3].sub_levels[0].ranges_b = RangeTable::new((0, 0), (1, 5), (2, 5));
        assert!(matches!(
            LevelGraph::new(worlds),
            Err(GameError::InvalidRange(_))
        ));
    }

    #[test]
    fn rejects_empty_catalog() {
        assert!(LevelGraph::new(Vec::new()).is_err());
    }

    #[test]
    fn summaries_cover_every_level() {
        let summaries = CATALOG.summaries();
        assert_eq!(summaries.len(), CATALOG.all_level_ids().len());
        assert_eq!(summaries[2].next_level_id, Some(LevelId::new(2, 1)));
        assert_eq!(summaries.last().unwrap().next_level_id, None);
    }
}
