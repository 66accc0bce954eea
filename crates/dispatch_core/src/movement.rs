//! Movement collaborator: moves a vehicle once per tick.
//!
//! The model only decides where the vehicle ends up and whether the passenger
//! boarded. Distance accounting and state transitions belong to the fleet step.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::ecs::{RideRequest, Tick, Vehicle};
use crate::error::{DispatchError, DispatchResult};
use crate::geo::Coordinate;

pub trait MovementModel: Send + Sync {
    /// Advance `vehicle` by one tick and return its new location.
    ///
    /// `assignment` is the vehicle's active request, if any. The model may set
    /// `picked_up` on it once the vehicle has reached the pickup point.
    fn advance(
        &self,
        vehicle: &Vehicle,
        assignment: Option<&mut RideRequest>,
        tick: Tick,
    ) -> DispatchResult<Coordinate>;
}

pub const DEFAULT_SPEED: f64 = 1.0;

/// Moves in a straight line at a fixed speed (distance units per tick): to the
/// pickup first, then to the destination. The passenger boards once the vehicle
/// stands on the pickup point and the requested pickup time has come.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StraightLineMovement {
    pub speed: f64,
}

impl Default for StraightLineMovement {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
        }
    }
}

impl StraightLineMovement {
    pub fn new(speed: f64) -> DispatchResult<Self> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(DispatchError::configuration(format!(
                "movement speed must be > 0, got {speed}"
            )));
        }
        Ok(Self { speed })
    }
}

impl MovementModel for StraightLineMovement {
    fn advance(
        &self,
        vehicle: &Vehicle,
        assignment: Option<&mut RideRequest>,
        tick: Tick,
    ) -> DispatchResult<Coordinate> {
        let Some(request) = assignment else {
            return Ok(vehicle.location);
        };

        if request.picked_up {
            return Ok(vehicle.location.step_towards(request.destination, self.speed));
        }

        let next = vehicle.location.step_towards(request.location, self.speed);
        if next == request.location && tick >= request.request_time {
            request.picked_up = true;
        }
        Ok(next)
    }
}

/// Resource wrapper for the movement model trait object.
#[derive(Resource)]
pub struct MovementModelResource(pub Box<dyn MovementModel>);

impl MovementModelResource {
    pub fn new(model: Box<dyn MovementModel>) -> Self {
        Self(model)
    }
}

impl Default for MovementModelResource {
    fn default() -> Self {
        Self(Box::new(StraightLineMovement::default()))
    }
}

impl std::ops::Deref for MovementModelResource {
    type Target = dyn MovementModel;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
