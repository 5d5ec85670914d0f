//! Speed progression
//!
//! Milestones come from two independent counters that add together:
//! - one per `time_to_scale` seconds of play
//! - one per `chillies_to_scale` chillies collected
//!
//! Each newly crossed milestone multiplies the base speed by `speed_step`, clamped
//! to `max_speed`. Neither counter ever resets the other.

use serde::{Deserialize, Serialize};

use super::powerup::PowerupTracker;
use super::state::PowerupKind;
use crate::tuning::Tuning;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyEngine {
    /// Seconds of play, accumulated in f64 so milestones land on the exact frame
    time_elapsed: f64,
    chillies_since_last_scale: u32,
    milestones_applied: u32,
    base_speed: f32,

    initial_speed: f32,
    max_speed: f32,
    speed_step: f32,
    boost_factor: f32,
    time_to_scale: f64,
    chillies_to_scale: u32,
}

impl DifficultyEngine {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            time_elapsed: 0.0,
            chillies_since_last_scale: 0,
            milestones_applied: 0,
            base_speed: tuning.initial_speed,
            initial_speed: tuning.initial_speed,
            max_speed: tuning.max_speed,
            speed_step: tuning.speed_step,
            boost_factor: tuning.speed_boost_factor,
            time_to_scale: f64::from(tuning.time_to_scale),
            chillies_to_scale: tuning.chillies_to_scale,
        }
    }

    /// Back to the initial speed with all counters cleared
    pub fn reset(&mut self) {
        self.time_elapsed = 0.0;
        self.chillies_since_last_scale = 0;
        self.milestones_applied = 0;
        self.base_speed = self.initial_speed;
    }

    /// Accumulate progress and return the effective speed for this tick
    pub fn advance(&mut self, dt: f32, chillies_delta: u32, powerups: &PowerupTracker) -> f32 {
        debug_assert!(dt.is_finite(), "non-finite dt {dt}");
        self.time_elapsed += f64::from(dt.max(0.0));
        self.chillies_since_last_scale = self.chillies_since_last_scale.saturating_add(chillies_delta);

        self.apply_milestones();
        self.effective_speed(powerups)
    }

    fn apply_milestones(&mut self) {
        let expected = self.expected_milestones();
        if expected <= self.milestones_applied {
            return;
        }

        let crossed = expected - self.milestones_applied;
        for _ in 0..crossed {
            self.base_speed *= self.speed_step;
        }
        self.base_speed = self.base_speed.min(self.max_speed);
        self.milestones_applied = expected;

        log::info!(
            "Difficulty increased! New speed: {:.1} ({} milestones)",
            self.base_speed,
            self.milestones_applied
        );
    }

    /// Milestones earned so far by time and chillies combined
    pub fn expected_milestones(&self) -> u32 {
        let by_time = if self.time_to_scale > 0.0 {
            (self.time_elapsed / self.time_to_scale).floor() as u32
        } else {
            0
        };
        let by_chillies = self
            .chillies_since_last_scale
            .checked_div(self.chillies_to_scale)
            .unwrap_or(0);
        by_time + by_chillies
    }

    /// Base speed, doubled while the Speed power-up is active
    pub fn effective_speed(&self, powerups: &PowerupTracker) -> f32 {
        if powerups.is_active(PowerupKind::Speed) {
            self.base_speed * self.boost_factor
        } else {
            self.base_speed
        }
    }

    pub fn base_speed(&self) -> f32 {
        self.base_speed
    }

    pub fn time_elapsed(&self) -> f32 {
        self.time_elapsed as f32
    }

    pub fn chillies_since_last_scale(&self) -> u32 {
        self.chillies_since_last_scale
    }

    pub fn milestones_applied(&self) -> u32 {
        self.milestones_applied
    }
}
