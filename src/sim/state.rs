//! Core simulation types
//!
//! Phases, entity kinds, handles and the events the session reports outward.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the player to start
    #[default]
    Menu,
    /// Active gameplay
    Playing,
    /// Run ended, state frozen until restart
    GameOver,
}

/// Time-limited effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PowerupKind {
    /// Doubles scroll speed
    Speed,
    /// Pulls chillies toward the player
    Magnet,
    /// Doubles chilli score
    DoubleScore,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 3] = [PowerupKind::Speed, PowerupKind::Magnet, PowerupKind::DoubleScore];
    pub const COUNT: usize = Self::ALL.len();

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Parse a legacy asset name ("PowerupSpeed", "PowerupMagnet", "Powerup2x")
    pub fn from_name(name: &str) -> Option<Self> {
        EntityKind::from_name(name).and_then(EntityKind::powerup)
    }
}

/// Broad gameplay role of a spawnable kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityCategory {
    Collectible,
    Obstacle,
    Powerup,
}

/// Every spawnable kind. Each one owns a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Chilli,
    Crate,
    Grass,
    Flower,
    PowerupSpeed,
    PowerupMagnet,
    PowerupDoubleScore,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Chilli,
        EntityKind::Crate,
        EntityKind::Grass,
        EntityKind::Flower,
        EntityKind::PowerupSpeed,
        EntityKind::PowerupMagnet,
        EntityKind::PowerupDoubleScore,
    ];
    pub const COUNT: usize = Self::ALL.len();

    /// Kinds drawn from by the obstacle pattern
    pub const OBSTACLES: [EntityKind; 3] = [EntityKind::Crate, EntityKind::Grass, EntityKind::Flower];
    /// Kinds drawn from by the power-up pattern
    pub const POWERUPS: [EntityKind; 3] = [
        EntityKind::PowerupSpeed,
        EntityKind::PowerupMagnet,
        EntityKind::PowerupDoubleScore,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn category(self) -> EntityCategory {
        match self {
            EntityKind::Chilli => EntityCategory::Collectible,
            EntityKind::Crate | EntityKind::Grass | EntityKind::Flower => EntityCategory::Obstacle,
            EntityKind::PowerupSpeed | EntityKind::PowerupMagnet | EntityKind::PowerupDoubleScore => {
                EntityCategory::Powerup
            }
        }
    }

    /// Effect granted when this kind is collected
    pub fn powerup(self) -> Option<PowerupKind> {
        match self {
            EntityKind::PowerupSpeed => Some(PowerupKind::Speed),
            EntityKind::PowerupMagnet => Some(PowerupKind::Magnet),
            EntityKind::PowerupDoubleScore => Some(PowerupKind::DoubleScore),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Chilli => "Chilli",
            EntityKind::Crate => "Crate",
            EntityKind::Grass => "Grass",
            EntityKind::Flower => "Flower",
            EntityKind::PowerupSpeed => "PowerupSpeed",
            EntityKind::PowerupMagnet => "PowerupMagnet",
            EntityKind::PowerupDoubleScore => "Powerup2x",
        }
    }

    /// Parse a legacy asset name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

/// Identity of a pooled entity. Stable for the life of the pool; reused after release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityHandle {
    pub kind: EntityKind,
    pub slot: u32,
}

/// Things that happened during a tick or a collision callback
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Session entered `Playing` from the menu or after a game over
    GameStarted,
    Spawned { handle: EntityHandle, lane: usize },
    Despawned { handle: EntityHandle },
    ChilliCollected { score: u64 },
    ObstacleHit { lives: u8 },
    PowerupActivated { kind: PowerupKind },
    /// A difficulty milestone raised the base speed
    SpeedIncreased { base_speed: f32, milestones: u32 },
    GameOver { score: u64 },
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    /// Run counter mixed into the seed so each restart gets a fresh sequence
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed.wrapping_add(self.stream.wrapping_mul(0x9E37_79B9_7F4A_7C15)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_names() {
        assert_eq!(EntityKind::from_name("Chilli"), Some(EntityKind::Chilli));
        assert_eq!(EntityKind::from_name("Powerup2x"), Some(EntityKind::PowerupDoubleScore));
        assert_eq!(EntityKind::from_name("Rock"), None);
        assert_eq!(PowerupKind::from_name("PowerupMagnet"), Some(PowerupKind::Magnet));
        assert_eq!(PowerupKind::from_name("Crate"), None);
    }

    #[test]
    fn test_categories() {
        for kind in EntityKind::OBSTACLES {
            assert_eq!(kind.category(), EntityCategory::Obstacle);
        }
        for kind in EntityKind::POWERUPS {
            assert_eq!(kind.category(), EntityCategory::Powerup);
            assert!(kind.powerup().is_some());
        }
        assert_eq!(EntityKind::Chilli.category(), EntityCategory::Collectible);
    }

    #[test]
    fn test_indices_are_dense() {
        for (i, kind) in EntityKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
        for (i, kind) in PowerupKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }
}
