//! Time-limited power-up effects
//!
//! One slot per [`PowerupKind`]. Activation refreshes a slot to its full duration;
//! it never stacks or extends.

use serde::{Deserialize, Serialize};

use super::state::PowerupKind;
use crate::tuning::PowerupDurations;

/// An active effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerupEntry {
    pub kind: PowerupKind,
    pub total_duration: f32,
    pub time_remaining: f32,
}

/// Tracks which effects are active and for how much longer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerupTracker {
    durations: PowerupDurations,
    entries: [Option<PowerupEntry>; PowerupKind::COUNT],
}

impl PowerupTracker {
    pub fn new(durations: PowerupDurations) -> Self {
        Self {
            durations,
            entries: [None; PowerupKind::COUNT],
        }
    }

    /// Start (or restart) an effect. Kinds without a configured duration are ignored.
    pub fn activate(&mut self, kind: PowerupKind) -> bool {
        let Some(duration) = self.durations.get(kind) else {
            log::debug!("Ignoring power-up {:?}: no duration configured", kind);
            return false;
        };

        self.entries[kind.index()] = Some(PowerupEntry {
            kind,
            total_duration: duration,
            time_remaining: duration,
        });
        true
    }

    /// Activate by legacy asset name; unknown names are ignored
    pub fn activate_named(&mut self, name: &str) -> bool {
        match PowerupKind::from_name(name) {
            Some(kind) => self.activate(kind),
            None => {
                log::debug!("Ignoring unknown power-up '{}'", name);
                false
            }
        }
    }

    /// Count down every active effect and drop the ones that ran out this tick
    pub fn tick(&mut self, dt: f32) {
        for slot in self.entries.iter_mut() {
            let expired = match slot {
                Some(entry) => {
                    entry.time_remaining -= dt;
                    entry.time_remaining <= 0.0
                }
                None => false,
            };
            if let Some(entry) = slot.take_if(|_| expired) {
                log::debug!("Power-up {:?} expired", entry.kind);
            }
        }
    }

    #[inline]
    pub fn is_active(&self, kind: PowerupKind) -> bool {
        self.entries[kind.index()].is_some()
    }

    /// Fraction of the effect left, in [0, 1]. Zero when inactive.
    pub fn progress(&self, kind: PowerupKind) -> f32 {
        self.entries[kind.index()]
            .map(|e| (e.time_remaining / e.total_duration).clamp(0.0, 1.0))
            .unwrap_or(0.0)
    }

    /// Seconds left, zero when inactive
    pub fn remaining(&self, kind: PowerupKind) -> f32 {
        self.entries[kind.index()]
            .map(|e| e.time_remaining)
            .unwrap_or(0.0)
    }

    pub fn entry(&self, kind: PowerupKind) -> Option<&PowerupEntry> {
        self.entries[kind.index()].as_ref()
    }

    /// Active effects in kind order
    pub fn active_kinds(&self) -> impl Iterator<Item = PowerupKind> + '_ {
        self.entries.iter().flatten().map(|e| e.kind)
    }

    pub fn clear(&mut self) {
        self.entries = [None; PowerupKind::COUNT];
    }
}
