use bevy_ecs::prelude::World;
use dispatch_core::ecs::{FleetOrder, Vehicle};
use dispatch_core::scenario::{build_scenario, Scenario};
use dispatch_core::spatial::SpatialIndex;
use dispatch_core::telemetry::DispatchTelemetry;

/// Build a fresh world from `scenario`, panicking on configuration errors.
pub fn world_from(scenario: Scenario) -> World {
    let mut world = World::new();
    build_scenario(&mut world, scenario).expect("scenario should build");
    world
}

/// Vehicles in fleet order.
pub fn fleet(world: &World) -> Vec<Vehicle> {
    world
        .resource::<FleetOrder>()
        .iter()
        .map(|entity| world.get::<Vehicle>(*entity).expect("vehicle").clone())
        .collect()
}

pub fn telemetry(world: &World) -> &DispatchTelemetry {
    world.resource::<DispatchTelemetry>()
}

pub fn index(world: &World) -> &SpatialIndex {
    world.resource::<SpatialIndex>()
}

pub fn total_distances(world: &World) -> (f64, f64) {
    fleet(world).iter().fold((0.0, 0.0), |(with, without), v| {
        (
            with + v.distance_with_passenger,
            without + v.distance_without_passenger,
        )
    })
}
