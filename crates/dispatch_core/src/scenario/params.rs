use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::ecs::Tick;
use crate::error::{DispatchError, DispatchResult};

const DEFAULT_DISTANCE_WEIGHT: f64 = 20.0;
const DEFAULT_TICKS_TO_RUN: Tick = 10;
const DEFAULT_RADIUS_MIN: f64 = 5.0;
const DEFAULT_RADIUS_STEP: f64 = 5.0;
const DEFAULT_RADIUS_MAX: f64 = 15.0;
const DEFAULT_TIME_RADIUS: f64 = 5.0;
const DEFAULT_MINIMUM_SCORE: f64 = 5.0;
const DEFAULT_DESTINATION_SATURATION: f64 = 30.0;

/// Slack for the last search radius, so `min + k * step` still reaches `max`
/// after floating point rounding.
const RADIUS_EPSILON: f64 = 1e-9;

/// Tunable dispatch parameters for one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Resource)]
#[serde(default)]
pub struct DispatchParams {
    /// Weight of the ride distance in the score.
    pub distance_weight: f64,
    /// Smallest probe radius of the matching search.
    pub radius_min: f64,
    /// Increment between probe radii.
    pub radius_step: f64,
    /// Largest probe radius (inclusive).
    pub radius_max: f64,
    /// How many ticks before the requested pickup time a vehicle may arrive.
    pub time_radius: f64,
    /// Floor a candidate's score must strictly exceed.
    pub minimum_score: f64,
    /// Destination demand at which the destination penalty vanishes. 0 disables the penalty.
    pub destination_saturation: f64,
    pub ticks_to_run: Tick,
}

impl Default for DispatchParams {
    fn default() -> Self {
        Self {
            distance_weight: DEFAULT_DISTANCE_WEIGHT,
            radius_min: DEFAULT_RADIUS_MIN,
            radius_step: DEFAULT_RADIUS_STEP,
            radius_max: DEFAULT_RADIUS_MAX,
            time_radius: DEFAULT_TIME_RADIUS,
            minimum_score: DEFAULT_MINIMUM_SCORE,
            destination_saturation: DEFAULT_DESTINATION_SATURATION,
            ticks_to_run: DEFAULT_TICKS_TO_RUN,
        }
    }
}

/// The slice of [`DispatchParams`] the scoring function reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringParams {
    pub time_radius: f64,
    pub distance_weight: f64,
    pub destination_saturation: f64,
}

impl DispatchParams {
    pub fn with_distance_weight(mut self, weight: f64) -> Self {
        self.distance_weight = weight;
        self
    }

    /// Probe radii: `min`, `min + step`, ... up to and including `max`.
    pub fn with_search_radii(mut self, min: f64, step: f64, max: f64) -> Self {
        self.radius_min = min;
        self.radius_step = step;
        self.radius_max = max;
        self
    }

    pub fn with_time_radius(mut self, time_radius: f64) -> Self {
        self.time_radius = time_radius;
        self
    }

    pub fn with_minimum_score(mut self, minimum_score: f64) -> Self {
        self.minimum_score = minimum_score;
        self
    }

    pub fn with_destination_saturation(mut self, saturation: f64) -> Self {
        self.destination_saturation = saturation;
        self
    }

    pub fn with_ticks_to_run(mut self, ticks: Tick) -> Self {
        self.ticks_to_run = ticks;
        self
    }

    pub fn scoring(&self) -> ScoringParams {
        ScoringParams {
            time_radius: self.time_radius,
            distance_weight: self.distance_weight,
            destination_saturation: self.destination_saturation,
        }
    }

    /// Ascending probe radii. Computed as `min + k * step` so the sequence does
    /// not drift; empty if the parameters are invalid.
    pub fn search_radii(&self) -> impl Iterator<Item = f64> {
        let (min, step, max) = (self.radius_min, self.radius_step, self.radius_max);
        let count = if step > 0.0 && step.is_finite() && min <= max {
            ((max - min) / step + RADIUS_EPSILON).floor() as usize + 1
        } else {
            0
        };
        (0..count).map(move |k| min + k as f64 * step)
    }

    pub fn validate(&self) -> DispatchResult<()> {
        let finite = [
            ("distance_weight", self.distance_weight),
            ("radius_min", self.radius_min),
            ("radius_step", self.radius_step),
            ("radius_max", self.radius_max),
            ("time_radius", self.time_radius),
            ("minimum_score", self.minimum_score),
            ("destination_saturation", self.destination_saturation),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, value)| !value.is_finite()) {
            return Err(DispatchError::configuration(format!(
                "{name} must be finite, got {value}"
            )));
        }
        if self.radius_step <= 0.0 {
            return Err(DispatchError::configuration(format!(
                "radius_step must be > 0, got {}",
                self.radius_step
            )));
        }
        if self.radius_min < 0.0 || self.radius_min > self.radius_max {
            return Err(DispatchError::configuration(format!(
                "search radii must satisfy 0 <= min <= max, got min {} max {}",
                self.radius_min, self.radius_max
            )));
        }
        if self.time_radius < 0.0 {
            return Err(DispatchError::configuration("time_radius must be >= 0"));
        }
        if self.destination_saturation < 0.0 {
            return Err(DispatchError::configuration(
                "destination_saturation must be >= 0",
            ));
        }
        Ok(())
    }
}
