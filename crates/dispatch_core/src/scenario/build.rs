use bevy_ecs::prelude::World;
use tracing::info;

use crate::clock::TickClock;
use crate::ecs::{FleetOrder, RideRequest, Vehicle, VehicleId};
use crate::error::{DispatchError, DispatchResult};
use crate::matching::ScoringFunctionResource;
use crate::movement::MovementModelResource;
use crate::spatial::SpatialIndex;
use crate::telemetry::DispatchTelemetry;

use super::{Scenario, ScenarioName};

/// Populate `world` with everything one scenario run needs: the request index,
/// the fleet (spawned in order), parameters, clock, telemetry and the movement
/// and scoring collaborators.
///
/// Fails with a configuration error, leaving the world untouched, if the
/// scenario is invalid.
pub fn build_scenario(world: &mut World, scenario: Scenario) -> DispatchResult<()> {
    scenario.validate()?;
    let Scenario {
        name,
        bounds,
        section_radius,
        params,
        vehicles,
        requests,
        movement,
        scoring,
    } = scenario;

    let mut index = SpatialIndex::new(bounds, section_radius)?;
    let vehicle_ids = (0..vehicles.len())
        .map(|i| {
            u32::try_from(i).map(VehicleId).map_err(|_| {
                DispatchError::configuration(format!("fleet of {} vehicles is too large", vehicles.len()))
            })
        })
        .collect::<DispatchResult<Vec<_>>>()?;

    let request_count = requests.len();
    for request in requests {
        index.insert(RideRequest::new(request.location, request.destination, request.request_time));
    }

    let fleet: Vec<_> = vehicle_ids
        .into_iter()
        .zip(vehicles)
        .map(|(id, location)| world.spawn(Vehicle::new(id, location)).id())
        .collect();

    info!(
        scenario = %name,
        vehicles = fleet.len(),
        requests = request_count,
        cells = index.cell_count(),
        ticks = params.ticks_to_run,
        "scenario built"
    );

    world.insert_resource(TickClock::default());
    world.insert_resource(params);
    world.insert_resource(index);
    world.insert_resource(FleetOrder(fleet));
    world.insert_resource(DispatchTelemetry::default());
    world.insert_resource(MovementModelResource::new(movement));
    world.insert_resource(ScoringFunctionResource::new(scoring));
    world.insert_resource(ScenarioName(name));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use crate::runner::ensure_dispatch_resources;
    use crate::scenario::{RequestSpec, ScenarioBuilder};

    #[test]
    fn world_holds_fleet_in_order_and_all_requests() {
        let scenario = ScenarioBuilder::new("setup")
            .with_vehicles([Coordinate::new(3.0, 3.0), Coordinate::new(9.0, 9.0)])
            .with_request(RequestSpec::new(
                Coordinate::new(1.0, 1.0),
                Coordinate::new(6.0, 6.0),
                2,
            ))
            .build()
            .expect("scenario");

        let mut world = World::new();
        build_scenario(&mut world, scenario).expect("build");
        ensure_dispatch_resources(&world).expect("resources");

        let fleet = world.resource::<FleetOrder>().0.clone();
        let ids: Vec<VehicleId> = fleet
            .iter()
            .filter_map(|entity| world.get::<Vehicle>(*entity).map(|v| v.id))
            .collect();
        assert_eq!(ids, vec![VehicleId(0), VehicleId(1)]);
        assert_eq!(world.resource::<SpatialIndex>().len(), 1);
        assert_eq!(world.resource::<ScenarioName>().0, "setup");
    }

    #[test]
    fn invalid_scenario_leaves_world_empty() {
        let mut scenario = ScenarioBuilder::new("bad").build().expect("scenario");
        scenario.section_radius = -1.0;

        let mut world = World::new();
        let err = build_scenario(&mut world, scenario).unwrap_err();
        assert!(err.is_configuration());
        assert!(!world.contains_resource::<SpatialIndex>());
    }
}
