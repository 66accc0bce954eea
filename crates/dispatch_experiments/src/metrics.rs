//! Metrics extraction from finished scenario worlds.
//!
//! Utilization, distances and request counts come straight from the fleet and
//! the dispatch telemetry. Match lead time is the number of ticks between a
//! request being matched and its requested pickup time.

use bevy_ecs::prelude::World;
use dispatch_core::clock::TickClock;
use dispatch_core::ecs::{FleetOrder, RoutingLogEntry, Vehicle, VehicleId};
use dispatch_core::error::{DispatchError, DispatchResult};
use dispatch_core::scenario::ScenarioName;
use dispatch_core::spatial::SpatialIndex;
use dispatch_core::telemetry::DispatchTelemetry;
use serde::Serialize;

/// Distances driven by one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleSummary {
    pub vehicle: VehicleId,
    pub distance_with_passenger: f64,
    pub distance_without_passenger: f64,
    pub dropoffs: usize,
}

/// Pickup and dropoff events of one vehicle, in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleRoutingLog {
    pub vehicle: VehicleId,
    pub entries: Vec<RoutingLogEntry>,
}

/// Aggregated metrics from a single scenario run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub scenario: String,
    /// Distance with passenger over total distance; 0 when nothing moved.
    pub utilization: f64,
    pub total_distance_with_passenger: f64,
    pub total_distance_without_passenger: f64,
    pub completed_request_count: usize,
    pub matched_request_count: usize,
    pub vehicle_fault_count: usize,
    pub total_requests: usize,
    pub total_vehicles: usize,
    pub ticks_run: u64,
    /// Matched requests over all requests.
    pub match_rate: f64,
    /// Lead time of a match: ticks from the match to the requested pickup
    /// time, over every matched request.
    pub avg_match_lead_ticks: f64,
    pub median_match_lead_ticks: f64,
    pub p90_match_lead_ticks: f64,
    pub vehicles: Vec<VehicleSummary>,
    /// Present only when routing logs were requested.
    pub routing_logs: Option<Vec<VehicleRoutingLog>>,
}

impl SimulationResult {
    /// Average, median and P90 of the match lead times.
    fn calculate_stats(values: &[u64]) -> (f64, f64, f64) {
        if values.is_empty() {
            return (0.0, 0.0, 0.0);
        }

        let mut sorted = values.to_vec();
        sorted.sort_unstable();

        let avg = sorted.iter().sum::<u64>() as f64 / sorted.len() as f64;
        let median = if sorted.len() % 2 == 0 {
            (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) as f64 / 2.0
        } else {
            sorted[sorted.len() / 2] as f64
        };
        let p90_idx = ((sorted.len() - 1) as f64 * 0.9) as usize;
        let p90 = sorted[p90_idx.min(sorted.len() - 1)] as f64;

        (avg, median, p90)
    }
}

pub fn utilization(with_passenger: f64, without_passenger: f64) -> f64 {
    let total = with_passenger + without_passenger;
    if total > 0.0 {
        (with_passenger / total).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn missing(resource: &str) -> DispatchError {
    DispatchError::configuration(format!("{resource} resource not found"))
}

/// Extract metrics from a world whose ticks have all run.
pub fn extract_metrics(world: &World, include_routing_log: bool) -> DispatchResult<SimulationResult> {
    let telemetry = world
        .get_resource::<DispatchTelemetry>()
        .ok_or_else(|| missing("DispatchTelemetry"))?;
    let index = world
        .get_resource::<SpatialIndex>()
        .ok_or_else(|| missing("SpatialIndex"))?;
    let fleet = world
        .get_resource::<FleetOrder>()
        .ok_or_else(|| missing("FleetOrder"))?;
    let ticks_run = world
        .get_resource::<TickClock>()
        .map(|clock| clock.elapsed())
        .unwrap_or(0);
    let scenario = world
        .get_resource::<ScenarioName>()
        .map(|name| name.0.clone())
        .unwrap_or_default();

    let vehicles: Vec<&Vehicle> = fleet
        .iter()
        .filter_map(|entity| world.get::<Vehicle>(*entity))
        .collect();

    let total_with: f64 = vehicles.iter().map(|v| v.distance_with_passenger).sum();
    let total_without: f64 = vehicles.iter().map(|v| v.distance_without_passenger).sum();

    let lead_times: Vec<u64> = index
        .requests()
        .iter()
        .filter_map(|request| {
            request
                .time_matched
                .map(|matched_at| request.request_time.saturating_sub(matched_at))
        })
        .collect();
    let (avg_lead, median_lead, p90_lead) = SimulationResult::calculate_stats(&lead_times);

    let matched = telemetry.matched_requests();
    let total_requests = index.len();
    let match_rate = if total_requests > 0 {
        matched as f64 / total_requests as f64
    } else {
        0.0
    };

    let summaries = vehicles
        .iter()
        .map(|v| VehicleSummary {
            vehicle: v.id,
            distance_with_passenger: v.distance_with_passenger,
            distance_without_passenger: v.distance_without_passenger,
            dropoffs: v
                .routing_log
                .iter()
                .filter(|entry| entry.kind == dispatch_core::ecs::RoutingEventKind::Dropoff)
                .count(),
        })
        .collect();

    let routing_logs = include_routing_log.then(|| {
        vehicles
            .iter()
            .map(|v| VehicleRoutingLog {
                vehicle: v.id,
                entries: v.routing_log.clone(),
            })
            .collect()
    });

    Ok(SimulationResult {
        scenario,
        utilization: utilization(total_with, total_without),
        total_distance_with_passenger: total_with,
        total_distance_without_passenger: total_without,
        completed_request_count: telemetry.completed_requests,
        matched_request_count: matched,
        vehicle_fault_count: telemetry.vehicle_faults,
        total_requests,
        total_vehicles: vehicles.len(),
        ticks_run,
        match_rate,
        avg_match_lead_ticks: avg_lead,
        median_match_lead_ticks: median_lead,
        p90_match_lead_ticks: p90_lead,
        vehicles: summaries,
        routing_logs,
    })
}
