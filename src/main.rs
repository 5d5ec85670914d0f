//! Chilli Rush headless runner
//!
//! Plays one run with a simple autopilot and prints the final HUD as JSON.
//!
//! Usage: `chilli-rush [seed] [max_frames]`
//! Set `RUST_LOG=debug` for spawn/despawn detail and `CHILLI_RUSH_TUNING=path.json`
//! to override gameplay tuning.

use glam::Vec2;

use chilli_rush::consts::*;
use chilli_rush::sim::{ContactTracker, EntityCategory, GameEvent, GamePhase, GameSession, LaneModel};
use chilli_rush::Tuning;

/// Player sits near the bottom of the field
const PLAYER_Y: f32 = 400.0;
/// Contact distance between the player and an object's center
const PLAYER_REACH: f32 = 40.0;
/// Sideways steering speed (units/s)
const PLAYER_STRAFE_SPEED: f32 = 900.0;
/// How far up the field the autopilot looks
const LOOKAHEAD: f32 = 350.0;
/// Host frame time; the simulation substeps at `SIM_DT`
const HOST_FRAME_DT: f32 = 1.0 / 30.0;

/// Picks the lane with the best nearby payoff and steers toward it
struct Autopilot {
    pos: Vec2,
    target_lane: usize,
}

impl Autopilot {
    fn new(lanes: &LaneModel) -> Self {
        let lane = lanes.lane_count() / 2;
        let x = lanes.lane_center_x(lane, PLAYER_Y).unwrap_or(0.0);
        Self {
            pos: Vec2::new(x, PLAYER_Y),
            target_lane: lane,
        }
    }

    fn update(&mut self, session: &GameSession, dt: f32) {
        let lanes = session.spawner().lanes();
        let mut lane_value = vec![0.0f32; lanes.lane_count()];
        for entity in session.entities() {
            let ahead = PLAYER_Y - entity.pos.y;
            if !(0.0..=LOOKAHEAD).contains(&ahead) {
                continue;
            }
            lane_value[entity.lane] += match entity.kind.category() {
                EntityCategory::Obstacle => -10.0,
                EntityCategory::Collectible => 1.0,
                EntityCategory::Powerup => 2.0,
            };
        }

        // Stay put unless another lane is strictly better
        let mut best = self.target_lane;
        for (lane, &value) in lane_value.iter().enumerate() {
            if value > lane_value[best] {
                best = lane;
            }
        }
        self.target_lane = best;

        if let Some(target_x) = lanes.lane_center_x(self.target_lane, PLAYER_Y) {
            let max_step = PLAYER_STRAFE_SPEED * dt;
            self.pos.x += (target_x - self.pos.x).clamp(-max_step, max_step);
        }
    }
}

fn parse_arg<T: std::str::FromStr>(args: &[String], index: usize, default: T) -> T {
    match args.get(index) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("Invalid argument '{}', using default", raw);
            default
        }),
        None => default,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let seed: u64 = parse_arg(&args, 1, 0xC4111);
    let max_frames: u64 = parse_arg(&args, 2, 60 * 30 * 5);

    let tuning = Tuning::load_or_default();
    let mut session = GameSession::new(tuning, seed);
    let mut pilot = Autopilot::new(session.spawner().lanes());
    let mut contacts = ContactTracker::new();
    session.start_game();

    let mut accumulator = 0.0f32;
    let mut powerups_collected = 0u32;
    for _ in 0..max_frames {
        accumulator += HOST_FRAME_DT;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            pilot.update(&session, SIM_DT);
            session.tick(SIM_DT, Some(pilot.pos));

            for handle in contacts.begin_contacts(pilot.pos, PLAYER_REACH, session.spawner()) {
                if session.resolve_contact(handle) == Some(EntityCategory::Powerup) {
                    powerups_collected += 1;
                }
            }

            for event in session.drain_events() {
                match event {
                    GameEvent::SpeedIncreased { base_speed, milestones } => {
                        log::info!("Milestone {}: base speed {:.1}", milestones, base_speed)
                    }
                    GameEvent::PowerupActivated { kind } => log::info!("Power-up active: {:?}", kind),
                    other => log::debug!("{:?}", other),
                }
            }

            accumulator -= SIM_DT;
            substeps += 1;
        }

        if session.phase() == GamePhase::GameOver {
            break;
        }
    }

    log::info!(
        "Run finished after {:.1}s: score {}, {} power-ups",
        session.time_elapsed(),
        session.score(),
        powerups_collected
    );

    match serde_json::to_string_pretty(&session.hud()) {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("Failed to serialize HUD: {}", err),
    }
}
