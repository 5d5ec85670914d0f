//! Session orchestrator
//!
//! Owns score, lives and phase, and drives every other simulation piece in a fixed
//! order once per frame:
//! 1. power-ups collected last frame take effect
//! 2. difficulty advances (speed for this frame)
//! 3. power-up timers count down
//! 4. spawner may emit a pattern
//! 5. entities move; those past the exit line are recycled
//!
//! Contacts are reported by the caller after `tick` returns. Their effects on
//! speed and score multipliers show up from the next frame.

use std::mem;

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::DifficultyEngine;
use super::entity::MovingEntity;
use super::powerup::PowerupTracker;
use super::spawner::Spawner;
use super::state::{EntityCategory, EntityHandle, GameEvent, GamePhase, PowerupKind, RngState};
use crate::tuning::{Tuning, TuningError};

/// Power-up state for the HUD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerupStatus {
    pub kind: PowerupKind,
    pub active: bool,
    pub progress: f32,
}

/// Everything a presentation layer needs to draw the HUD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u8,
    pub max_lives: u8,
    pub speed: f32,
    pub base_speed: f32,
    pub time_elapsed: f32,
    pub milestones: u32,
    pub active_entities: usize,
    pub powerups: Vec<PowerupStatus>,
}

#[derive(Debug, Clone)]
pub struct GameSession {
    tuning: Tuning,
    phase: GamePhase,
    score: u64,
    lives: u8,
    /// Effective speed computed by the last tick
    speed: f32,
    ticks: u64,
    difficulty: DifficultyEngine,
    powerups: PowerupTracker,
    spawner: Spawner,
    rng_state: RngState,
    rng: Pcg32,
    /// Chillies collected since the last tick, fed to difficulty next tick
    pending_chillies: u32,
    /// Power-ups collected since the last tick, activated next tick
    pending_powerups: Vec<PowerupKind>,
    events: Vec<GameEvent>,
}

impl GameSession {
    /// New session waiting in the menu. Invalid tuning is replaced by the defaults.
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        match Self::try_new(tuning, seed) {
            Ok(session) => session,
            Err(err) => {
                log::warn!("Invalid tuning, using defaults: {}", err);
                Self::with_tuning(Tuning::default(), seed)
            }
        }
    }

    /// New session waiting in the menu, rejecting invalid tuning
    pub fn try_new(tuning: Tuning, seed: u64) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self::with_tuning(tuning, seed))
    }

    fn with_tuning(tuning: Tuning, seed: u64) -> Self {
        let rng_state = RngState::new(seed);
        Self {
            phase: GamePhase::Menu,
            score: 0,
            lives: tuning.max_lives,
            speed: tuning.initial_speed,
            ticks: 0,
            difficulty: DifficultyEngine::new(&tuning),
            powerups: PowerupTracker::new(tuning.powerup_durations),
            spawner: Spawner::new(&tuning),
            rng: rng_state.to_rng(),
            rng_state,
            pending_chillies: 0,
            pending_powerups: Vec::new(),
            events: Vec::new(),
            tuning,
        }
    }

    // === Phase transitions ===

    /// Menu -> Playing. Ignored in any other phase.
    pub fn start_game(&mut self) -> bool {
        if self.phase != GamePhase::Menu {
            log::debug!("start_game ignored in {:?}", self.phase);
            return false;
        }
        self.begin_run();
        true
    }

    /// GameOver -> Playing. Ignored in any other phase.
    pub fn restart_game(&mut self) -> bool {
        if self.phase != GamePhase::GameOver {
            log::debug!("restart_game ignored in {:?}", self.phase);
            return false;
        }
        self.rng_state.stream += 1;
        self.rng = self.rng_state.to_rng();
        self.begin_run();
        true
    }

    fn begin_run(&mut self) {
        self.score = 0;
        self.lives = self.tuning.max_lives;
        self.ticks = 0;
        self.difficulty.reset();
        self.powerups.clear();
        self.spawner.reset();
        self.speed = self.difficulty.base_speed();
        self.pending_chillies = 0;
        self.pending_powerups.clear();
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::GameStarted);
        log::info!("Run started (seed {}, run {})", self.rng_state.seed, self.rng_state.stream);
    }

    fn end_game(&mut self) {
        self.phase = GamePhase::GameOver;
        self.events.push(GameEvent::GameOver { score: self.score });
        log::info!("Game Over! Score: {}", self.score);
    }

    // === Per-frame update ===

    /// Advance the simulation by one frame. `player` feeds the magnet; without it
    /// chillies keep to their lanes.
    pub fn tick(&mut self, dt: f32, player: Option<Vec2>) {
        if self.phase != GamePhase::Playing {
            return;
        }
        debug_assert!(dt.is_finite(), "non-finite dt {dt}");
        let dt = dt.max(0.0);
        self.ticks += 1;

        for kind in self.pending_powerups.drain(..) {
            if self.powerups.activate(kind) {
                self.events.push(GameEvent::PowerupActivated { kind });
                log::debug!("Power-up {:?} active", kind);
            }
        }

        let milestones_before = self.difficulty.milestones_applied();
        let chillies = mem::take(&mut self.pending_chillies);
        self.speed = self.difficulty.advance(dt, chillies, &self.powerups);
        if self.difficulty.milestones_applied() > milestones_before {
            self.events.push(GameEvent::SpeedIncreased {
                base_speed: self.difficulty.base_speed(),
                milestones: self.difficulty.milestones_applied(),
            });
        }

        self.powerups.tick(dt);

        for handle in self.spawner.tick(dt, self.speed, &mut self.rng) {
            if let Some(entity) = self.spawner.entity(handle) {
                self.events.push(GameEvent::Spawned {
                    handle,
                    lane: entity.lane,
                });
            }
        }

        let exited = self.spawner.advance_entities(dt, self.speed, &self.powerups, player);
        self.events
            .extend(exited.into_iter().map(|handle| GameEvent::Despawned { handle }));

        log::trace!(
            "tick {}: speed={:.1} active={}",
            self.ticks,
            self.speed,
            self.spawner.active_len()
        );
    }

    // === Collision reactions ===

    /// Player ran into an obstacle
    pub fn on_obstacle_hit(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }

        self.lives = self.lives.saturating_sub(1);
        self.events.push(GameEvent::ObstacleHit { lives: self.lives });
        log::info!("Player hit obstacle! Lives remaining: {}", self.lives);

        if self.lives == 0 {
            self.end_game();
        }
    }

    /// Player picked up a chilli
    pub fn on_collectible_collected(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }

        let multiplier = if self.powerups.is_active(PowerupKind::DoubleScore) {
            2
        } else {
            1
        };
        self.score += self.tuning.chilli_score * multiplier;
        self.pending_chillies += 1;
        self.events.push(GameEvent::ChilliCollected { score: self.score });
    }

    /// Player picked up a power-up. It takes effect on the next tick.
    pub fn on_powerup_collected(&mut self, kind: PowerupKind) {
        if self.phase != GamePhase::Playing {
            return;
        }
        log::debug!("Collected power-up: {:?}", kind);
        self.pending_powerups.push(kind);
    }

    /// Power-up reported by legacy asset name; unknown names are ignored
    pub fn on_powerup_collected_named(&mut self, name: &str) {
        match PowerupKind::from_name(name) {
            Some(kind) => self.on_powerup_collected(kind),
            None => log::debug!("Ignoring unknown power-up '{}'", name),
        }
    }

    /// Classify a contact with an active entity and apply its reaction.
    ///
    /// Chillies and power-ups are consumed; obstacles stay on the field.
    /// Returns the category handled, or `None` if nothing happened.
    pub fn resolve_contact(&mut self, handle: EntityHandle) -> Option<EntityCategory> {
        if self.phase != GamePhase::Playing {
            return None;
        }
        let kind = self.spawner.entity(handle)?.kind;

        let category = kind.category();
        match category {
            EntityCategory::Collectible => {
                self.on_collectible_collected();
                self.despawn(handle);
            }
            EntityCategory::Obstacle => self.on_obstacle_hit(),
            EntityCategory::Powerup => {
                if let Some(powerup) = kind.powerup() {
                    self.on_powerup_collected(powerup);
                }
                self.despawn(handle);
            }
        }
        Some(category)
    }

    /// External despawn request. Safe to repeat.
    pub fn despawn(&mut self, handle: EntityHandle) -> bool {
        let removed = self.spawner.despawn(handle);
        if removed {
            self.events.push(GameEvent::Despawned { handle });
        }
        removed
    }

    // === Read accessors ===

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    /// Effective speed of the last tick
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn base_speed(&self) -> f32 {
        self.difficulty.base_speed()
    }

    pub fn time_elapsed(&self) -> f32 {
        self.difficulty.time_elapsed()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_powerup_active(&self, kind: PowerupKind) -> bool {
        self.powerups.is_active(kind)
    }

    pub fn powerup_progress(&self, kind: PowerupKind) -> f32 {
        self.powerups.progress(kind)
    }

    pub fn powerups(&self) -> &PowerupTracker {
        &self.powerups
    }

    pub fn difficulty(&self) -> &DifficultyEngine {
        &self.difficulty
    }

    pub fn spawner(&self) -> &Spawner {
        &self.spawner
    }

    pub fn entity(&self, handle: EntityHandle) -> Option<&MovingEntity> {
        self.spawner.entity(handle)
    }

    pub fn entities(&self) -> impl Iterator<Item = &MovingEntity> {
        self.spawner.entities()
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn seed(&self) -> u64 {
        self.rng_state.seed
    }

    /// Take all events reported since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        mem::take(&mut self.events)
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            phase: self.phase,
            score: self.score,
            lives: self.lives,
            max_lives: self.tuning.max_lives,
            speed: self.speed,
            base_speed: self.difficulty.base_speed(),
            time_elapsed: self.difficulty.time_elapsed(),
            milestones: self.difficulty.milestones_applied(),
            active_entities: self.spawner.active_len(),
            powerups: PowerupKind::ALL
                .iter()
                .map(|&kind| PowerupStatus {
                    kind,
                    active: self.powerups.is_active(kind),
                    progress: self.powerups.progress(kind),
                })
                .collect(),
        }
    }
}
