use serde::{Deserialize, Serialize};

use crate::error::DispatchResult;
use crate::geo::Coordinate;
use crate::movement::{StraightLineMovement, DEFAULT_SPEED};
use crate::spatial::GridBounds;

use super::{DispatchParams, RequestSpec, Scenario, ScenarioBuilder, DEFAULT_SECTION_RADIUS};

/// A scenario described as data. Every field is optional in JSON and falls
/// back to its default.
///
/// ```json
/// {
///   "name": "downtown",
///   "bounds": { "lat_min": 0, "lat_max": 20, "long_min": 0, "long_max": 20 },
///   "params": { "minimum_score": 5, "ticks_to_run": 40 },
///   "vehicles": [{ "lat": 0, "long": 0 }],
///   "requests": [
///     { "location": { "lat": 2, "long": 2 },
///       "destination": { "lat": 18, "long": 18 },
///       "request_time": 4 }
///   ],
///   "request_count": 30,
///   "seed": 11
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub name: String,
    pub bounds: GridBounds,
    pub section_radius: f64,
    pub params: DispatchParams,
    pub vehicles: Vec<Coordinate>,
    pub requests: Vec<RequestSpec>,
    pub fleet_size: Option<usize>,
    pub request_count: Option<usize>,
    pub seed: Option<u64>,
    /// Straight-line movement speed, distance units per tick.
    pub speed: f64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            name: "scenario".to_string(),
            bounds: GridBounds::default(),
            section_radius: DEFAULT_SECTION_RADIUS,
            params: DispatchParams::default(),
            vehicles: Vec::new(),
            requests: Vec::new(),
            fleet_size: None,
            request_count: None,
            seed: None,
            speed: DEFAULT_SPEED,
        }
    }
}

impl ScenarioConfig {
    pub fn from_json_str(json: &str) -> DispatchResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a JSON array of scenario configurations.
    pub fn list_from_json_str(json: &str) -> DispatchResult<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn into_builder(self) -> DispatchResult<ScenarioBuilder> {
        let movement = StraightLineMovement::new(self.speed)?;
        let mut builder = ScenarioBuilder::new(self.name)
            .with_bounds(self.bounds)
            .with_section_radius(self.section_radius)
            .with_params(self.params)
            .with_vehicles(self.vehicles)
            .with_requests(self.requests)
            .with_movement(movement);
        if let Some(fleet_size) = self.fleet_size {
            builder = builder.with_fleet_size(fleet_size);
        }
        if let Some(request_count) = self.request_count {
            builder = builder.with_request_count(request_count);
        }
        if let Some(seed) = self.seed {
            builder = builder.with_seed(seed);
        }
        Ok(builder)
    }

    pub fn into_scenario(self) -> DispatchResult<Scenario> {
        self.into_builder()?.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config = ScenarioConfig::from_json_str("{}").expect("config");
        assert_eq!(config, ScenarioConfig::default());
    }

    #[test]
    fn documented_example_parses() {
        let json = r#"{
            "name": "downtown",
            "bounds": { "lat_min": 0, "lat_max": 20, "long_min": 0, "long_max": 20 },
            "params": { "minimum_score": 5, "ticks_to_run": 40 },
            "vehicles": [{ "lat": 0, "long": 0 }],
            "requests": [
                { "location": { "lat": 2, "long": 2 },
                  "destination": { "lat": 18, "long": 18 },
                  "request_time": 4 }
            ],
            "request_count": 30,
            "seed": 11
        }"#;
        let scenario = ScenarioConfig::from_json_str(json)
            .and_then(ScenarioConfig::into_scenario)
            .expect("scenario");
        assert_eq!(scenario.name, "downtown");
        assert_eq!(scenario.params.ticks_to_run, 40);
        assert_eq!(scenario.vehicles.len(), 1);
        assert_eq!(scenario.requests.len(), 30);
        assert_eq!(scenario.requests[0].request_time, 4);
    }

    #[test]
    fn malformed_json_is_a_configuration_error() {
        let err = ScenarioConfig::from_json_str(r#"{ "section_radius": "wide" }"#).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn zero_speed_is_rejected() {
        let config = ScenarioConfig {
            speed: 0.0,
            ..ScenarioConfig::default()
        };
        assert!(config.into_builder().is_err());
    }
}
