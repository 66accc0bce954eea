//! Planar coordinates and straight-line distance.
//!
//! The service area is a flat grid: "lat" is axis 1 and "long" is axis 2.
//! Distances are Euclidean; there is no road network.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub long: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, long: f64) -> Self {
        Self { lat, long }
    }

    pub fn distance_to(&self, other: Coordinate) -> f64 {
        straight_line_distance(*self, other)
    }

    pub fn offset(&self, d_lat: f64, d_long: f64) -> Self {
        Self::new(self.lat + d_lat, self.long + d_long)
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.long.is_finite()
    }

    /// Move at most `max_step` toward `target`. Lands exactly on `target` when
    /// it is within reach, so arrival can be tested with `==`.
    pub fn step_towards(&self, target: Coordinate, max_step: f64) -> Coordinate {
        let remaining = self.distance_to(target);
        if remaining <= max_step || remaining == 0.0 {
            return target;
        }
        let fraction = max_step / remaining;
        Coordinate::new(
            self.lat + (target.lat - self.lat) * fraction,
            self.long + (target.long - self.long) * fraction,
        )
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, long): (f64, f64)) -> Self {
        Self::new(lat, long)
    }
}

pub fn straight_line_distance(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = b.lat - a.lat;
    let d_long = b.long - a.long;
    (d_lat * d_lat + d_long * d_long).sqrt()
}
