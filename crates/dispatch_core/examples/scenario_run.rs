//! Run one randomly populated scenario and print what each vehicle did.
//!
//! Run with: RUST_LOG=dispatch_core=debug cargo run -p dispatch_core --example scenario_run

use bevy_ecs::prelude::World;
use dispatch_core::ecs::{FleetOrder, Vehicle};
use dispatch_core::runner::{dispatch_schedule, run_all_ticks};
use dispatch_core::scenario::{build_scenario, DispatchParams, ScenarioBuilder};
use dispatch_core::telemetry::DispatchTelemetry;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    const FLEET_SIZE: usize = 10;
    const REQUEST_COUNT: usize = 60;
    const TICKS: u64 = 40;

    let scenario = ScenarioBuilder::new("scenario_run")
        .with_params(DispatchParams::default().with_ticks_to_run(TICKS))
        .with_fleet_size(FLEET_SIZE)
        .with_request_count(REQUEST_COUNT)
        .with_seed(123)
        .build();
    let scenario = match scenario {
        Ok(scenario) => scenario,
        Err(err) => {
            eprintln!("invalid scenario: {err}");
            std::process::exit(1);
        }
    };

    let mut world = World::new();
    if let Err(err) = build_scenario(&mut world, scenario) {
        eprintln!("failed to build scenario: {err}");
        std::process::exit(1);
    }
    let mut schedule = dispatch_schedule();
    let ticks = match run_all_ticks(&mut world, &mut schedule, None) {
        Ok(ticks) => ticks,
        Err(err) => {
            eprintln!("run failed: {err}");
            std::process::exit(1);
        }
    };

    let telemetry = world.resource::<DispatchTelemetry>();
    println!(
        "--- Scenario run ({} vehicles, {} requests, {} ticks, seed 123) ---",
        FLEET_SIZE, REQUEST_COUNT, ticks
    );
    println!("Matched requests: {}", telemetry.matched_requests());
    println!("Completed requests: {}", telemetry.completed_requests);
    println!("Vehicle faults: {}", telemetry.vehicle_faults);

    let (mut with, mut without) = (0.0, 0.0);
    for entity in world.resource::<FleetOrder>().iter() {
        let Some(vehicle) = world.get::<Vehicle>(*entity) else {
            continue;
        };
        with += vehicle.distance_with_passenger;
        without += vehicle.distance_without_passenger;
        println!(
            "  {}  with passenger={:.2}  without={:.2}  events={}",
            vehicle.id,
            vehicle.distance_with_passenger,
            vehicle.distance_without_passenger,
            vehicle.routing_log.len()
        );
    }
    let total = with + without;
    let utilization = if total > 0.0 { with / total } else { 0.0 };
    println!("Utilization: {:.3}", utilization);
}
