//! Data-driven game balance
//!
//! Every gameplay constant the simulation reads lives in [`Tuning`]. Defaults match
//! `crate::consts`; a JSON file can override any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::state::{EntityKind, PowerupKind};

/// Environment variable naming a JSON tuning file
pub const TUNING_ENV_VAR: &str = "CHILLI_RUSH_TUNING";

/// Errors raised while loading or validating tuning data
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl TuningError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        TuningError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Power-up durations in seconds. `None` (or a non-positive value) leaves the kind
/// unconfigured, and activating it does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerupDurations {
    pub speed: Option<f32>,
    pub magnet: Option<f32>,
    pub double_score: Option<f32>,
}

impl Default for PowerupDurations {
    fn default() -> Self {
        Self {
            speed: Some(5.0),
            magnet: Some(8.0),
            double_score: Some(10.0),
        }
    }
}

impl PowerupDurations {
    /// Configured duration for a kind, if it is usable
    pub fn get(&self, kind: PowerupKind) -> Option<f32> {
        let duration = match kind {
            PowerupKind::Speed => self.speed,
            PowerupKind::Magnet => self.magnet,
            PowerupKind::DoubleScore => self.double_score,
        };
        duration.filter(|d| d.is_finite() && *d > 0.0)
    }
}

/// Lane geometry. Lane `i` sits at `lane_x[i] * (1 + taper * y) + bend * y²`.
///
/// With `taper` and `bend` at zero the lanes are straight vertical lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneGeometry {
    /// Lane centers at y = 0, left to right
    pub lane_x: Vec<f32>,
    /// Perspective spread per unit of y
    pub taper: f32,
    /// Quadratic sideways bend shared by all lanes
    pub bend: f32,
}

impl Default for LaneGeometry {
    fn default() -> Self {
        Self {
            lane_x: LANE_X_POSITIONS.to_vec(),
            taper: 0.0,
            bend: 0.0,
        }
    }
}

/// Number of handles each pool creates up front
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolPrewarm {
    pub chilli: usize,
    pub crate_box: usize,
    pub grass: usize,
    pub flower: usize,
    pub powerup: usize,
}

impl Default for PoolPrewarm {
    fn default() -> Self {
        Self {
            chilli: 20,
            crate_box: 10,
            grass: 5,
            flower: 5,
            powerup: 2,
        }
    }
}

impl PoolPrewarm {
    pub fn for_kind(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Chilli => self.chilli,
            EntityKind::Crate => self.crate_box,
            EntityKind::Grass => self.grass,
            EntityKind::Flower => self.flower,
            EntityKind::PowerupSpeed | EntityKind::PowerupMagnet | EntityKind::PowerupDoubleScore => {
                self.powerup
            }
        }
    }
}

/// Complete gameplay tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Speed & difficulty ===
    pub initial_speed: f32,
    pub max_speed: f32,
    /// Multiplier per milestone
    pub speed_step: f32,
    /// Effective speed multiplier while the Speed power-up is active
    pub speed_boost_factor: f32,
    pub time_to_scale: f32,
    pub chillies_to_scale: u32,

    // === Player ===
    pub max_lives: u8,
    pub chilli_score: u64,

    // === Spawning ===
    pub spawn_interval: f32,
    pub spawn_y: f32,
    pub exit_y: f32,
    /// Rolls below this spawn a power-up
    pub powerup_band: f32,
    /// Rolls in [powerup_band, obstacle_band) spawn an obstacle pair
    pub obstacle_band: f32,
    /// Most chillies in one pattern
    pub max_chillies_per_pattern: usize,
    pub prewarm: PoolPrewarm,
    pub lanes: LaneGeometry,

    // === Power-ups ===
    pub powerup_durations: PowerupDurations,
    /// Fraction of the distance to the player a magnetised chilli covers per tick
    pub magnet_lerp: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            initial_speed: INITIAL_SPEED,
            max_speed: MAX_SPEED,
            speed_step: SPEED_STEP,
            speed_boost_factor: SPEED_BOOST_FACTOR,
            time_to_scale: TIME_TO_SCALE,
            chillies_to_scale: CHILLIES_TO_SCALE,

            max_lives: MAX_LIVES,
            chilli_score: CHILLI_SCORE,

            spawn_interval: SPAWN_INTERVAL,
            spawn_y: SPAWN_Y,
            exit_y: EXIT_Y,
            powerup_band: 0.2,
            obstacle_band: 0.4,
            max_chillies_per_pattern: 3,
            prewarm: PoolPrewarm::default(),
            lanes: LaneGeometry::default(),

            powerup_durations: PowerupDurations::default(),
            magnet_lerp: MAGNET_LERP,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read, parse and validate a tuning file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load from the file named by `CHILLI_RUSH_TUNING`, or use defaults
    pub fn load_or_default() -> Self {
        let Ok(path) = std::env::var(TUNING_ENV_VAR) else {
            log::info!("Using default tuning");
            return Self::default();
        };

        match Self::from_file(&path) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path);
                tuning
            }
            Err(err) => {
                log::warn!("Ignoring tuning file '{}': {}", path, err);
                Self::default()
            }
        }
    }

    /// Check the invariants the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        if !(self.initial_speed.is_finite() && self.initial_speed > 0.0) {
            return Err(TuningError::invalid("initial_speed", "must be positive"));
        }
        if !(self.max_speed.is_finite() && self.max_speed >= self.initial_speed) {
            return Err(TuningError::invalid(
                "max_speed",
                format!("must be at least initial_speed ({})", self.initial_speed),
            ));
        }
        if !(self.speed_step.is_finite() && self.speed_step >= 1.0) {
            return Err(TuningError::invalid("speed_step", "must be >= 1.0"));
        }
        if !(self.speed_boost_factor.is_finite() && self.speed_boost_factor > 0.0) {
            return Err(TuningError::invalid("speed_boost_factor", "must be positive"));
        }
        if !(self.time_to_scale.is_finite() && self.time_to_scale > 0.0) {
            return Err(TuningError::invalid("time_to_scale", "must be positive"));
        }
        if self.chillies_to_scale == 0 {
            return Err(TuningError::invalid("chillies_to_scale", "must be positive"));
        }
        if self.max_lives == 0 {
            return Err(TuningError::invalid("max_lives", "must be positive"));
        }
        if !(self.spawn_interval.is_finite() && self.spawn_interval > 0.0) {
            return Err(TuningError::invalid("spawn_interval", "must be positive"));
        }
        if !(self.exit_y > self.spawn_y) {
            return Err(TuningError::invalid("exit_y", "must be below spawn_y"));
        }
        if !(0.0..=1.0).contains(&self.powerup_band)
            || !(self.powerup_band..=1.0).contains(&self.obstacle_band)
        {
            return Err(TuningError::invalid(
                "obstacle_band",
                "bands must satisfy 0 <= powerup_band <= obstacle_band <= 1",
            ));
        }
        if self.max_chillies_per_pattern == 0 {
            return Err(TuningError::invalid("max_chillies_per_pattern", "must be positive"));
        }
        if self.lanes.lane_x.is_empty() {
            return Err(TuningError::invalid("lanes.lane_x", "need at least one lane"));
        }
        if self.lanes.lane_x.iter().any(|x| !x.is_finite())
            || !self.lanes.taper.is_finite()
            || !self.lanes.bend.is_finite()
        {
            return Err(TuningError::invalid("lanes", "geometry must be finite"));
        }
        if !(self.magnet_lerp > 0.0 && self.magnet_lerp <= 1.0) {
            return Err(TuningError::invalid("magnet_lerp", "must be in (0, 1]"));
        }
        Ok(())
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.lane_x.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.lane_count(), 3);
        assert_eq!(tuning.powerup_durations.get(PowerupKind::Magnet), Some(8.0));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "max_lives": 3, "lanes": { "taper": 0.001 } }"#)
            .expect("valid tuning");
        assert_eq!(tuning.max_lives, 3);
        assert_eq!(tuning.lanes.lane_x, LANE_X_POSITIONS.to_vec());
        assert!((tuning.lanes.taper - 0.001).abs() < f32::EPSILON);
        assert_eq!(tuning.initial_speed, INITIAL_SPEED);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = Tuning::from_json(r#"{ "max_speed": 100.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "max_speed", .. }));

        let err = Tuning::from_json(r#"{ "lanes": { "lane_x": [] } }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "lanes.lane_x", .. }));

        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_unconfigured_duration() {
        let durations = PowerupDurations {
            speed: None,
            magnet: Some(0.0),
            double_score: Some(10.0),
        };
        assert_eq!(durations.get(PowerupKind::Speed), None);
        assert_eq!(durations.get(PowerupKind::Magnet), None);
        assert_eq!(durations.get(PowerupKind::DoubleScore), Some(10.0));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Tuning::from_file("/nonexistent/chilli-rush-tuning.json").unwrap_err();
        assert!(matches!(err, TuningError::Io(_)));
    }
}
