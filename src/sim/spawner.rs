//! Pattern spawner and owner of the active entity set
//!
//! Every `spawn_interval` seconds one roll picks a pattern:
//! - `[0, powerup_band)`: a single power-up in a random lane
//! - `[powerup_band, obstacle_band)`: two obstacles in two different lanes
//! - `[obstacle_band, 1)`: one to three chillies, each in its own lane
//!
//! The spawner is the only thing that moves handles between pools and the active set.

use std::collections::BTreeMap;

use glam::Vec2;

use super::entity::{Motion, MotionContext, MovingEntity};
use super::lane::LaneModel;
use super::pool::PoolSet;
use super::powerup::PowerupTracker;
use super::rng::RandomSource;
use super::state::{EntityHandle, EntityKind};
use crate::tuning::Tuning;

/// Which pattern a roll selected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnPattern {
    Powerup,
    Obstacles,
    Chillies,
}

#[derive(Debug, Clone)]
pub struct Spawner {
    lanes: LaneModel,
    pools: PoolSet,
    /// Checked-out entities, iterated in handle order
    active: BTreeMap<EntityHandle, MovingEntity>,
    timer: f32,
    interval: f32,
    spawn_y: f32,
    exit_y: f32,
    powerup_band: f32,
    obstacle_band: f32,
    max_chillies: usize,
    magnet_lerp: f32,
}

impl Spawner {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            lanes: LaneModel::new(tuning.lanes.clone()),
            pools: PoolSet::new(&tuning.prewarm),
            active: BTreeMap::new(),
            timer: 0.0,
            interval: tuning.spawn_interval,
            spawn_y: tuning.spawn_y,
            exit_y: tuning.exit_y,
            powerup_band: tuning.powerup_band,
            obstacle_band: tuning.obstacle_band,
            max_chillies: tuning.max_chillies_per_pattern,
            magnet_lerp: tuning.magnet_lerp,
        }
    }

    /// Map a roll in [0, 1) to a pattern
    pub fn choose_pattern(&self, roll: f32) -> SpawnPattern {
        if roll < self.powerup_band {
            SpawnPattern::Powerup
        } else if roll < self.obstacle_band {
            SpawnPattern::Obstacles
        } else {
            SpawnPattern::Chillies
        }
    }

    /// Advance the spawn timer; emits at most one pattern. Returns new handles.
    pub fn tick(&mut self, dt: f32, speed: f32, rng: &mut impl RandomSource) -> Vec<EntityHandle> {
        self.timer += dt;
        if self.timer < self.interval {
            return Vec::new();
        }
        self.timer = 0.0;

        let pattern = self.choose_pattern(rng.next_unit());
        self.spawn_pattern(pattern, speed, rng)
    }

    /// Spawn one pattern immediately
    pub fn spawn_pattern(
        &mut self,
        pattern: SpawnPattern,
        speed: f32,
        rng: &mut impl RandomSource,
    ) -> Vec<EntityHandle> {
        let lane_count = self.lanes.lane_count();
        let mut spawned = Vec::with_capacity(3);

        match pattern {
            SpawnPattern::Powerup => {
                let kind = EntityKind::POWERUPS[rng.next_index(EntityKind::POWERUPS.len())];
                let lane = rng.next_index(lane_count);
                spawned.push(self.spawn(kind, lane, speed));
            }
            SpawnPattern::Obstacles => {
                let first = rng.next_index(lane_count);
                spawned.push(self.spawn_obstacle(first, speed, rng));

                if lane_count > 1 {
                    let second = loop {
                        let lane = rng.next_index(lane_count);
                        if lane != first {
                            break lane;
                        }
                    };
                    spawned.push(self.spawn_obstacle(second, speed, rng));
                }
            }
            SpawnPattern::Chillies => {
                let max = self.max_chillies.min(lane_count);
                let count = 1 + rng.next_index(max);
                let mut used: Vec<usize> = Vec::with_capacity(count);
                for _ in 0..count {
                    let lane = loop {
                        let lane = rng.next_index(lane_count);
                        if !used.contains(&lane) {
                            break lane;
                        }
                    };
                    used.push(lane);
                    spawned.push(self.spawn(EntityKind::Chilli, lane, speed));
                }
            }
        }

        log::debug!("Spawned {:?} pattern: {} entities", pattern, spawned.len());
        spawned
    }

    fn spawn_obstacle(&mut self, lane: usize, speed: f32, rng: &mut impl RandomSource) -> EntityHandle {
        let kind = EntityKind::OBSTACLES[rng.next_index(EntityKind::OBSTACLES.len())];
        self.spawn(kind, lane, speed)
    }

    /// Check a handle out of its pool and place it at the top of `lane`
    pub fn spawn(&mut self, kind: EntityKind, lane: usize, speed: f32) -> EntityHandle {
        let handle = self.pools.acquire(kind);
        let entity = MovingEntity::spawn(handle, lane, &self.lanes, self.spawn_y, speed);
        self.active.insert(handle, entity);
        handle
    }

    /// Return an entity to its pool. False if it is not active.
    pub fn despawn(&mut self, handle: EntityHandle) -> bool {
        if self.active.remove(&handle).is_none() {
            log::trace!("Ignoring despawn of inactive {:?}", handle);
            return false;
        }
        let released = self.pools.release(handle);
        debug_assert!(released, "active entity {:?} was not checked out", handle);
        true
    }

    /// Move every active entity and recycle the ones that left the field
    pub fn advance_entities(
        &mut self,
        dt: f32,
        speed: f32,
        powerups: &PowerupTracker,
        player: Option<Vec2>,
    ) -> Vec<EntityHandle> {
        let ctx = MotionContext {
            dt,
            speed,
            lanes: &self.lanes,
            powerups,
            player,
            magnet_lerp: self.magnet_lerp,
            exit_y: self.exit_y,
        };

        let exited: Vec<EntityHandle> = self
            .active
            .values_mut()
            .filter_map(|entity| (entity.tick(&ctx) == Motion::Exited).then_some(entity.handle))
            .collect();

        exited.into_iter().filter(|&handle| self.despawn(handle)).collect()
    }

    /// Release everything and restart the spawn timer
    pub fn reset(&mut self) {
        for handle in std::mem::take(&mut self.active).into_keys() {
            self.pools.release(handle);
        }
        self.timer = 0.0;
    }

    pub fn entity(&self, handle: EntityHandle) -> Option<&MovingEntity> {
        self.active.get(&handle)
    }

    /// Active entities in handle order
    pub fn entities(&self) -> impl Iterator<Item = &MovingEntity> {
        self.active.values()
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn pools(&self) -> &PoolSet {
        &self.pools
    }

    pub fn lanes(&self) -> &LaneModel {
        &self.lanes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::scripted::ScriptedRng;
    use crate::sim::state::EntityCategory;
    use crate::tuning::PowerupDurations;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn spawner() -> Spawner {
        Spawner::new(&Tuning::default())
    }

    fn lanes_of(spawner: &Spawner, handles: &[EntityHandle]) -> Vec<usize> {
        handles
            .iter()
            .map(|h| spawner.entity(*h).expect("spawned entity is active").lane)
            .collect()
    }

    #[test]
    fn test_bands_partition_unit_interval() {
        let s = spawner();
        assert_eq!(s.choose_pattern(0.0), SpawnPattern::Powerup);
        assert_eq!(s.choose_pattern(0.199), SpawnPattern::Powerup);
        assert_eq!(s.choose_pattern(0.2), SpawnPattern::Obstacles);
        assert_eq!(s.choose_pattern(0.399), SpawnPattern::Obstacles);
        assert_eq!(s.choose_pattern(0.4), SpawnPattern::Chillies);
        assert_eq!(s.choose_pattern(0.999), SpawnPattern::Chillies);
    }

    #[test]
    fn test_interval_gates_spawning() {
        let mut s = spawner();
        let mut rng = ScriptedRng::new(&[0.9], &[0, 1, 2]);
        assert!(s.tick(0.5, 300.0, &mut rng).is_empty());
        let spawned = s.tick(0.25, 300.0, &mut rng);
        assert_eq!(spawned.len(), 1);
        // Timer restarted from zero
        assert!(s.tick(0.5, 300.0, &mut rng).is_empty());
    }

    #[test]
    fn test_obstacle_pattern_resamples_second_lane() {
        let mut s = spawner();
        // first lane 1 as a crate, lane 1 twice more (rejected), then lane 2 as a flower
        let mut rng = ScriptedRng::new(&[0.3], &[1, 0, 1, 1, 2, 2]);
        let spawned = s.spawn_pattern(SpawnPattern::Obstacles, 300.0, &mut rng);
        assert_eq!(spawned.len(), 2);
        assert_eq!(lanes_of(&s, &spawned), vec![1, 2]);
        assert_eq!(spawned[0].kind, EntityKind::Crate);
        assert_eq!(spawned[1].kind, EntityKind::Flower);
    }

    #[test]
    fn test_chilli_pattern_resamples_used_lanes() {
        let mut s = spawner();
        // count index 2 -> three chillies; lanes 0, 0 (rejected), 2, 2 (rejected), 0 (rejected), 1
        let mut rng = ScriptedRng::new(&[0.5], &[2, 0, 0, 2, 2, 0, 1]);
        let spawned = s.spawn_pattern(SpawnPattern::Chillies, 300.0, &mut rng);
        assert_eq!(lanes_of(&s, &spawned), vec![0, 2, 1]);
        assert!(spawned.iter().all(|h| h.kind == EntityKind::Chilli));
    }

    #[test]
    fn test_powerup_pattern() {
        let mut s = spawner();
        let mut rng = ScriptedRng::new(&[0.1], &[1, 2]);
        let spawned = s.tick(1.0, 300.0, &mut rng);
        assert_eq!(spawned.len(), 1);
        assert_eq!(spawned[0].kind, EntityKind::PowerupMagnet);
        assert_eq!(lanes_of(&s, &spawned), vec![2]);
    }

    #[test]
    fn test_spawn_placement() {
        let mut s = spawner();
        let h = s.spawn(EntityKind::Crate, 0, 420.0);
        let e = s.entity(h).unwrap();
        assert_eq!(e.pos, Vec2::new(-120.0, -550.0));
        assert_eq!(e.speed, 420.0);
        assert_eq!(e.kind, EntityKind::Crate);
    }

    #[test]
    fn test_reused_handle_gets_fresh_state() {
        let mut s = spawner();
        let powerups = PowerupTracker::new(PowerupDurations::default());
        let h = s.spawn(EntityKind::Chilli, 2, 300.0);
        s.advance_entities(1.0, 300.0, &powerups, None);
        assert!(s.despawn(h));

        let reused = s.spawn(EntityKind::Chilli, 0, 100.0);
        assert_eq!(reused, h);
        let e = s.entity(reused).unwrap();
        assert_eq!(e.lane, 0);
        assert_eq!(e.pos, Vec2::new(-120.0, -550.0));
        assert_eq!(e.speed, 100.0);
    }

    #[test]
    fn test_double_despawn_is_noop() {
        let mut s = spawner();
        let h = s.spawn(EntityKind::Grass, 1, 300.0);
        assert!(s.despawn(h));
        let pool_after_once = s.pools().get(EntityKind::Grass).clone();
        assert!(!s.despawn(h));
        assert_eq!(s.pools().get(EntityKind::Grass), &pool_after_once);
        assert_eq!(s.active_len(), 0);
    }

    #[test]
    fn test_exiting_entities_are_recycled() {
        let mut s = spawner();
        let powerups = PowerupTracker::new(PowerupDurations::default());
        let h = s.spawn(EntityKind::Crate, 1, 500.0);
        // 1100 units of travel needed; 2.0s at 500/s is 1000
        assert!(s.advance_entities(2.0, 500.0, &powerups, None).is_empty());
        let exited = s.advance_entities(0.5, 500.0, &powerups, None);
        assert_eq!(exited, vec![h]);
        assert!(s.entity(h).is_none());
        assert!(!s.pools().is_checked_out(h));
        assert!(!s.despawn(h));
    }

    #[test]
    fn test_reset_returns_everything() {
        let mut s = spawner();
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..20 {
            s.tick(1.0, 300.0, &mut rng);
        }
        assert!(s.active_len() > 0);
        s.reset();
        assert_eq!(s.active_len(), 0);
        for kind in EntityKind::ALL {
            assert_eq!(s.pools().get(kind).active_len(), 0);
        }
    }

    #[test]
    fn test_single_lane_field_terminates() {
        let tuning = Tuning {
            lanes: crate::tuning::LaneGeometry {
                lane_x: vec![0.0],
                ..Default::default()
            },
            ..Tuning::default()
        };
        let mut s = Spawner::new(&tuning);
        let mut rng = Pcg32::seed_from_u64(9);
        assert_eq!(s.spawn_pattern(SpawnPattern::Obstacles, 300.0, &mut rng).len(), 1);
        assert_eq!(s.spawn_pattern(SpawnPattern::Chillies, 300.0, &mut rng).len(), 1);
    }

    proptest! {
        #[test]
        fn prop_patterns_use_distinct_lanes(seed in any::<u64>(), roll in 0.0f32..1.0) {
            let mut s = spawner();
            let mut rng = Pcg32::seed_from_u64(seed);
            let pattern = s.choose_pattern(roll);
            let spawned = s.spawn_pattern(pattern, 300.0, &mut rng);
            let mut lanes = lanes_of(&s, &spawned);
            lanes.sort_unstable();
            lanes.dedup();
            prop_assert_eq!(lanes.len(), spawned.len());

            match pattern {
                SpawnPattern::Powerup => {
                    prop_assert_eq!(spawned.len(), 1);
                    prop_assert_eq!(spawned[0].kind.category(), EntityCategory::Powerup);
                }
                SpawnPattern::Obstacles => {
                    prop_assert_eq!(spawned.len(), 2);
                    for h in &spawned {
                        prop_assert_eq!(h.kind.category(), EntityCategory::Obstacle);
                    }
                }
                SpawnPattern::Chillies => {
                    prop_assert!((1..=3).contains(&spawned.len()));
                    for h in &spawned {
                        prop_assert_eq!(h.kind, EntityKind::Chilli);
                    }
                }
            }
        }

        #[test]
        fn prop_active_set_matches_pools(seed in any::<u64>(), steps in 1usize..120) {
            let mut s = spawner();
            let powerups = PowerupTracker::new(PowerupDurations::default());
            let mut rng = Pcg32::seed_from_u64(seed);
            for i in 0..steps {
                let spawned = s.tick(0.4, 300.0, &mut rng);
                if i % 7 == 0 {
                    for h in spawned {
                        s.despawn(h);
                        s.despawn(h);
                    }
                }
                s.advance_entities(0.4, 300.0, &powerups, None);
            }
            let checked_out: usize = EntityKind::ALL
                .iter()
                .map(|&k| s.pools().get(k).active_len())
                .sum();
            prop_assert_eq!(checked_out, s.active_len());
            for e in s.entities() {
                prop_assert!(s.pools().is_checked_out(e.handle));
            }
        }
    }
}
