//! Performance benchmarks for dispatch_core using Criterion.rs.

use bevy_ecs::prelude::World;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dispatch_core::ecs::{RideRequest, Vehicle, VehicleId};
use dispatch_core::geo::Coordinate;
use dispatch_core::matching::{find_best_request, HeuristicScoring};
use dispatch_core::runner::{dispatch_schedule, run_all_ticks};
use dispatch_core::scenario::{build_scenario, DispatchParams, ScenarioBuilder};
use dispatch_core::spatial::{GridBounds, SpatialIndex};

fn bench_simulation_run(c: &mut Criterion) {
    let scenarios = vec![
        ("small", 20, 200),
        ("medium", 100, 1_000),
        ("large", 400, 5_000),
    ];

    let mut group = c.benchmark_group("simulation_run");
    for (name, vehicles, requests) in scenarios {
        group.bench_with_input(
            BenchmarkId::from_parameter(name),
            &(vehicles, requests),
            |b, &(vehicles, requests)| {
                b.iter(|| {
                    let scenario = ScenarioBuilder::new(name)
                        .with_bounds(GridBounds::new(0.0, 200.0, 0.0, 200.0))
                        .with_params(
                            DispatchParams::default()
                                .with_search_radii(5.0, 5.0, 25.0)
                                .with_ticks_to_run(100),
                        )
                        .with_fleet_size(vehicles)
                        .with_request_count(requests)
                        .with_seed(42)
                        .build()
                        .expect("scenario");
                    let mut world = World::new();
                    build_scenario(&mut world, scenario).expect("build");
                    let mut schedule = dispatch_schedule();
                    black_box(run_all_ticks(&mut world, &mut schedule, None).expect("run"));
                });
            },
        );
    }
    group.finish();
}

fn bench_matching_search(c: &mut Criterion) {
    let mut index = SpatialIndex::new(GridBounds::new(0.0, 100.0, 0.0, 100.0), 5.0)
        .expect("index");
    // A dense neighbourhood around the vehicle, all inside the feasibility window.
    for i in 0..500u32 {
        let offset = f64::from(i % 20);
        let location = Coordinate::new(50.0 + offset * 0.5, 50.0 - offset * 0.5);
        let destination = Coordinate::new(90.0 - offset, 10.0 + offset);
        index.insert(RideRequest::new(location, destination, 8 + u64::from(i % 5)));
    }
    let vehicle = Vehicle::new(VehicleId(0), Coordinate::new(50.0, 50.0));
    let params = DispatchParams::default();

    c.bench_function("find_best_request_500_requests", |b| {
        b.iter(|| {
            black_box(find_best_request(
                &vehicle,
                &mut index,
                &HeuristicScoring,
                &params,
                1,
            ));
        });
    });
}

criterion_group!(benches, bench_simulation_run, bench_matching_search);
criterion_main!(benches);
