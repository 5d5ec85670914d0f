//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied delta time only
//! - Seeded RNG only
//! - Stable iteration order (by entity handle)
//! - No rendering, audio or platform dependencies

pub mod contact;
pub mod difficulty;
pub mod entity;
pub mod lane;
pub mod pool;
pub mod powerup;
pub mod rng;
pub mod session;
pub mod spawner;
pub mod state;

pub use contact::{ContactTracker, overlapping};
pub use difficulty::DifficultyEngine;
pub use entity::{Motion, MotionContext, MovingEntity};
pub use lane::LaneModel;
pub use pool::{ObjectPool, PoolSet};
pub use powerup::{PowerupEntry, PowerupTracker};
pub use rng::RandomSource;
pub use session::{GameSession, HudSnapshot, PowerupStatus};
pub use spawner::{SpawnPattern, Spawner};
pub use state::{EntityCategory, EntityHandle, EntityKind, GameEvent, GamePhase, PowerupKind, RngState};
