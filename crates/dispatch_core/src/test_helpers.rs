//! Test helpers for common test setup and utilities.
//!
//! Shared between unit tests, integration tests and the experiments crate.

use bevy_ecs::prelude::{Entity, World};

use crate::clock::TickClock;
use crate::ecs::{FleetOrder, RequestId, RideRequest, Tick, Vehicle, VehicleId};
use crate::error::{DispatchError, DispatchResult};
use crate::geo::Coordinate;
use crate::matching::ScoringFunctionResource;
use crate::movement::{MovementModel, MovementModelResource, StraightLineMovement};
use crate::scenario::{DispatchParams, RequestSpec, ScenarioBuilder};
use crate::spatial::{GridBounds, SpatialIndex};
use crate::telemetry::DispatchTelemetry;

/// Request of the single-ride reference scenario: (2,2) to (18,18), picked up at tick 4.
pub const REFERENCE_REQUEST: RequestSpec = RequestSpec {
    location: Coordinate::new(2.0, 2.0),
    destination: Coordinate::new(18.0, 18.0),
    request_time: 4,
};

/// Ticks after which the reference ride has certainly been dropped off.
pub const REFERENCE_TICKS: Tick = 40;

/// One vehicle at the origin and [`REFERENCE_REQUEST`] on the default 20x20 grid.
pub fn reference_scenario(name: &str) -> ScenarioBuilder {
    ScenarioBuilder::new(name)
        .with_bounds(GridBounds::default())
        .with_section_radius(5.0)
        .with_params(
            DispatchParams::default()
                .with_minimum_score(5.0)
                .with_search_radii(5.0, 5.0, 15.0)
                .with_time_radius(5.0)
                .with_ticks_to_run(REFERENCE_TICKS),
        )
        .with_vehicle(Coordinate::new(0.0, 0.0))
        .with_request(REFERENCE_REQUEST)
}

/// Create a world with every dispatch resource on the default grid, no
/// vehicles and no requests.
pub fn create_test_world(params: DispatchParams) -> World {
    let mut world = World::new();
    world.insert_resource(TickClock::default());
    world.insert_resource(params);
    world.insert_resource(
        SpatialIndex::new(GridBounds::default(), 5.0).unwrap_or_else(|err| panic!("{err}")),
    );
    world.insert_resource(FleetOrder::default());
    world.insert_resource(DispatchTelemetry::default());
    world.insert_resource(MovementModelResource::default());
    world.insert_resource(ScoringFunctionResource::default());
    world
}

/// Spawn a vehicle and append it to the fleet order.
pub fn spawn_vehicle(world: &mut World, location: Coordinate) -> Entity {
    let next_id = world.resource::<FleetOrder>().len() as u32;
    let entity = world.spawn(Vehicle::new(VehicleId(next_id), location)).id();
    world.resource_mut::<FleetOrder>().0.push(entity);
    entity
}

pub fn insert_request(world: &mut World, request: RequestSpec) -> RequestId {
    world.resource_mut::<SpatialIndex>().insert(RideRequest::new(
        request.location,
        request.destination,
        request.request_time,
    ))
}

/// Straight-line movement that reports a fault for one vehicle on one tick.
#[derive(Debug, Clone, Copy)]
pub struct FaultyMovement {
    pub vehicle: VehicleId,
    pub tick: Tick,
    pub inner: StraightLineMovement,
}

impl FaultyMovement {
    pub fn new(vehicle: VehicleId, tick: Tick) -> Self {
        Self {
            vehicle,
            tick,
            inner: StraightLineMovement::default(),
        }
    }
}

impl MovementModel for FaultyMovement {
    fn advance(
        &self,
        vehicle: &Vehicle,
        assignment: Option<&mut RideRequest>,
        tick: Tick,
    ) -> DispatchResult<Coordinate> {
        if vehicle.id == self.vehicle && tick == self.tick {
            return Err(DispatchError::vehicle_fault(vehicle.id, "injected movement fault"));
        }
        self.inner.advance(vehicle, assignment, tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ensure_dispatch_resources;

    #[test]
    fn test_world_is_runnable() {
        let world = create_test_world(DispatchParams::default());
        assert!(ensure_dispatch_resources(&world).is_ok());
    }

    #[test]
    fn spawned_vehicles_join_the_fleet_in_order() {
        let mut world = create_test_world(DispatchParams::default());
        let first = spawn_vehicle(&mut world, Coordinate::new(0.0, 0.0));
        let second = spawn_vehicle(&mut world, Coordinate::new(1.0, 1.0));
        assert_eq!(world.resource::<FleetOrder>().0, vec![first, second]);
        assert_eq!(world.get::<Vehicle>(second).map(|v| v.id), Some(VehicleId(1)));
    }
}
