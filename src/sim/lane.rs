//! Lane geometry
//!
//! Lanes are vertical tracks that may spread with depth (`taper`) or bend (`bend`):
//! - `x(lane, y) = lane_x[lane] * (1 + taper * y) + bend * y²`
//!
//! Entities re-snap to this curve every tick, so curved lanes carry them along.

use serde::{Deserialize, Serialize};

use crate::tuning::LaneGeometry;

/// Maps (lane, y) to a horizontal position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneModel {
    geometry: LaneGeometry,
}

impl LaneModel {
    pub fn new(geometry: LaneGeometry) -> Self {
        Self { geometry }
    }

    /// Number of lanes
    #[inline]
    pub fn lane_count(&self) -> usize {
        self.geometry.lane_x.len()
    }

    #[inline]
    pub fn is_valid(&self, lane: usize) -> bool {
        lane < self.lane_count()
    }

    /// Center of `lane` at height `y`, `None` for an out-of-range lane
    pub fn lane_center_x(&self, lane: usize, y: f32) -> Option<f32> {
        let base = *self.geometry.lane_x.get(lane)?;
        Some(base * (1.0 + self.geometry.taper * y) + self.geometry.bend * y * y)
    }

    /// Lane whose center is nearest to `x` at height `y`
    pub fn nearest_lane(&self, x: f32, y: f32) -> Option<usize> {
        (0..self.lane_count())
            .filter_map(|lane| self.lane_center_x(lane, y).map(|cx| (lane, (cx - x).abs())))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(lane, _)| lane)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight() -> LaneModel {
        LaneModel::new(LaneGeometry::default())
    }

    #[test]
    fn test_straight_lanes_ignore_y() {
        let lanes = straight();
        assert_eq!(lanes.lane_count(), 3);
        for y in [-550.0, 0.0, 300.0] {
            assert_eq!(lanes.lane_center_x(0, y), Some(-120.0));
            assert_eq!(lanes.lane_center_x(1, y), Some(0.0));
            assert_eq!(lanes.lane_center_x(2, y), Some(120.0));
        }
    }

    #[test]
    fn test_invalid_lane() {
        let lanes = straight();
        assert!(!lanes.is_valid(3));
        assert_eq!(lanes.lane_center_x(3, 0.0), None);
    }

    #[test]
    fn test_taper_spreads_lanes_with_depth() {
        let lanes = LaneModel::new(LaneGeometry {
            taper: 0.001,
            ..LaneGeometry::default()
        });
        let near = lanes.lane_center_x(2, 500.0).unwrap();
        let far = lanes.lane_center_x(2, -500.0).unwrap();
        assert!((near - 180.0).abs() < 1e-3);
        assert!((far - 60.0).abs() < 1e-3);
        // Center lane stays put
        assert_eq!(lanes.lane_center_x(1, 500.0), Some(0.0));
    }

    #[test]
    fn test_bend_shifts_every_lane() {
        let lanes = LaneModel::new(LaneGeometry {
            bend: 0.0001,
            ..LaneGeometry::default()
        });
        let x = lanes.lane_center_x(1, 100.0).unwrap();
        assert!((x - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_nearest_lane() {
        let lanes = straight();
        assert_eq!(lanes.nearest_lane(-100.0, 0.0), Some(0));
        assert_eq!(lanes.nearest_lane(10.0, 0.0), Some(1));
        assert_eq!(lanes.nearest_lane(500.0, 0.0), Some(2));
    }
}
