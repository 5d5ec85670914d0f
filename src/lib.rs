//! Chilli Rush - lane-based endless runner simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (difficulty, spawning, power-ups, session state)
//! - `tuning`: Data-driven game balance
//!
//! Rendering, audio, UI and asset loading live outside this crate. They drive
//! [`sim::GameSession`] once per frame and consume its events and read accessors.

pub mod sim;
pub mod tuning;

pub use sim::{EntityHandle, EntityKind, GameEvent, GamePhase, GameSession, PowerupKind};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the headless runner (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Scroll speed at the start of a run (units/s)
    pub const INITIAL_SPEED: f32 = 300.0;
    /// Base scroll speed never grows past this
    pub const MAX_SPEED: f32 = 800.0;
    /// Multiplier applied per difficulty milestone
    pub const SPEED_STEP: f32 = 1.10;
    /// Effective speed multiplier while the Speed power-up is active
    pub const SPEED_BOOST_FACTOR: f32 = 2.0;

    pub const MAX_LIVES: u8 = 5;
    pub const CHILLI_SCORE: u64 = 1;

    /// Seconds of play per difficulty milestone
    pub const TIME_TO_SCALE: f32 = 45.0;
    /// Chillies collected per difficulty milestone
    pub const CHILLIES_TO_SCALE: u32 = 50;

    /// Seconds between spawn patterns
    pub const SPAWN_INTERVAL: f32 = 0.75;
    /// Y where objects appear (top of the field)
    pub const SPAWN_Y: f32 = -550.0;
    /// Objects past this Y are off-screen and get recycled
    pub const EXIT_Y: f32 = 550.0;
    /// Default lane centers at y = 0
    pub const LANE_X_POSITIONS: [f32; 3] = [-120.0, 0.0, 120.0];

    /// Magnet pull, fraction of the remaining distance covered per tick
    pub const MAGNET_LERP: f32 = 0.1;
}

