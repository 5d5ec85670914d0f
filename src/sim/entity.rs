//! Per-instance state of a scrolling object

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::lane::LaneModel;
use super::powerup::PowerupTracker;
use super::state::{EntityCategory, EntityHandle, EntityKind, PowerupKind};

/// Result of advancing an entity one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// Still on screen
    OnField,
    /// Crossed the exit line and should go back to its pool
    Exited,
}

/// Per-tick inputs shared by every entity
#[derive(Debug, Clone, Copy)]
pub struct MotionContext<'a> {
    pub dt: f32,
    pub speed: f32,
    pub lanes: &'a LaneModel,
    pub powerups: &'a PowerupTracker,
    /// Player position, if the environment provides one
    pub player: Option<Vec2>,
    pub magnet_lerp: f32,
    pub exit_y: f32,
}

/// A checked-out object moving down its lane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingEntity {
    pub handle: EntityHandle,
    pub kind: EntityKind,
    pub lane: usize,
    pub pos: Vec2,
    pub speed: f32,
}

impl MovingEntity {
    /// Fresh state for a just-acquired handle, placed on its lane at `spawn_y`
    pub fn spawn(handle: EntityHandle, lane: usize, lanes: &LaneModel, spawn_y: f32, speed: f32) -> Self {
        debug_assert!(lanes.is_valid(lane), "lane {lane} out of range");
        let x = lanes.lane_center_x(lane, spawn_y).unwrap_or(0.0);
        Self {
            handle,
            kind: handle.kind,
            lane,
            pos: Vec2::new(x, spawn_y),
            speed,
        }
    }

    /// Whether the magnet currently owns this entity's motion
    pub fn is_magnetised(&self, powerups: &PowerupTracker, player: Option<Vec2>) -> bool {
        self.kind.category() == EntityCategory::Collectible
            && player.is_some()
            && powerups.is_active(PowerupKind::Magnet)
    }

    /// Advance one tick
    pub fn tick(&mut self, ctx: &MotionContext<'_>) -> Motion {
        self.speed = ctx.speed;

        let magnet_target = if self.is_magnetised(ctx.powerups, ctx.player) {
            ctx.player
        } else {
            None
        };

        match magnet_target {
            Some(player) => {
                self.pos = self.pos.lerp(player, ctx.magnet_lerp);
            }
            None => {
                self.pos.y += self.speed * ctx.dt;
                if let Some(x) = ctx.lanes.lane_center_x(self.lane, self.pos.y) {
                    self.pos.x = x;
                }
            }
        }

        if self.pos.y > ctx.exit_y {
            Motion::Exited
        } else {
            Motion::OnField
        }
    }
}
