//! Reference contact detection
//!
//! The game engine normally reports contacts. This stands in for it in the
//! headless runner and in tests: circle overlap against the player, reporting
//! each contact once when it begins (like a physics "begin contact" callback).

use std::collections::BTreeSet;

use glam::Vec2;

use super::spawner::Spawner;
use super::state::EntityHandle;

/// Handles whose centers are within `reach` of the player
pub fn overlapping(player: Vec2, reach: f32, spawner: &Spawner) -> Vec<EntityHandle> {
    let reach_sq = reach * reach;
    spawner
        .entities()
        .filter(|e| e.pos.distance_squared(player) <= reach_sq)
        .map(|e| e.handle)
        .collect()
}

/// Remembers which entities are touching so a contact fires only on entry
#[derive(Debug, Clone, Default)]
pub struct ContactTracker {
    touching: BTreeSet<EntityHandle>,
}

impl ContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entities that started touching the player since the last call
    pub fn begin_contacts(&mut self, player: Vec2, reach: f32, spawner: &Spawner) -> Vec<EntityHandle> {
        let now: BTreeSet<EntityHandle> = overlapping(player, reach, spawner).into_iter().collect();
        let began = now.difference(&self.touching).copied().collect();
        self.touching = now;
        began
    }

    pub fn clear(&mut self) {
        self.touching.clear();
    }
}
