//! Scenario setup: the scenario value, its builder and JSON form, and world
//! construction.
//!
//! A [`Scenario`] is a plain value owned by whoever runs it. It is turned into
//! an ECS world by [`build_scenario`]; nothing is shared between scenarios.

mod build;
mod builder;
mod config;
mod params;

use std::fmt;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

pub use build::build_scenario;
pub use builder::ScenarioBuilder;
pub use config::ScenarioConfig;
pub use params::{DispatchParams, ScoringParams};

use crate::ecs::Tick;
use crate::error::{DispatchError, DispatchResult};
use crate::geo::Coordinate;
use crate::matching::ScoringFunction;
use crate::movement::MovementModel;
use crate::spatial::GridBounds;

pub const DEFAULT_SECTION_RADIUS: f64 = 5.0;

/// A ride request as supplied by the scenario, before it is registered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RequestSpec {
    pub location: Coordinate,
    pub destination: Coordinate,
    pub request_time: Tick,
}

impl RequestSpec {
    pub fn new(location: Coordinate, destination: Coordinate, request_time: Tick) -> Self {
        Self {
            location,
            destination,
            request_time,
        }
    }
}

/// Name of the scenario a world was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Resource)]
pub struct ScenarioName(pub String);

/// One independently configured simulation run.
pub struct Scenario {
    pub name: String,
    pub bounds: GridBounds,
    pub section_radius: f64,
    pub params: DispatchParams,
    /// Starting locations, in fleet order.
    pub vehicles: Vec<Coordinate>,
    pub requests: Vec<RequestSpec>,
    pub movement: Box<dyn MovementModel>,
    pub scoring: Box<dyn ScoringFunction>,
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("bounds", &self.bounds)
            .field("section_radius", &self.section_radius)
            .field("params", &self.params)
            .field("vehicles", &self.vehicles.len())
            .field("requests", &self.requests.len())
            .finish_non_exhaustive()
    }
}

impl Scenario {
    /// Check everything that must hold before the scenario may start.
    pub fn validate(&self) -> DispatchResult<()> {
        validate_settings(&self.name, self.section_radius, &self.bounds, &self.params)?;
        self.validate_entities()
    }

    /// Every listed vehicle and request sits at finite coordinates.
    fn validate_entities(&self) -> DispatchResult<()> {
        if let Some(position) = self.vehicles.iter().position(|v| !v.is_finite()) {
            return Err(DispatchError::configuration(format!(
                "scenario {}: vehicle {position} has a non-finite location",
                self.name
            )));
        }
        if let Some(position) = self
            .requests
            .iter()
            .position(|r| !r.location.is_finite() || !r.destination.is_finite())
        {
            return Err(DispatchError::configuration(format!(
                "scenario {}: request {position} has a non-finite coordinate",
                self.name
            )));
        }
        Ok(())
    }
}

/// Section radius, bounds and parameter checks shared by [`Scenario::validate`]
/// and [`ScenarioBuilder::build`].
fn validate_settings(
    name: &str,
    section_radius: f64,
    bounds: &GridBounds,
    params: &DispatchParams,
) -> DispatchResult<()> {
    if !section_radius.is_finite() || section_radius <= 0.0 {
        return Err(DispatchError::configuration(format!(
            "scenario {name}: section radius must be > 0, got {section_radius}"
        )));
    }
    bounds.validate()?;
    params.validate()
}
