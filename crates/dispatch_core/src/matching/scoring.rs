use crate::ecs::{RequestId, Tick, Vehicle};
use crate::scenario::ScoringParams;
use crate::spatial::SpatialIndex;

/// Heuristic that rates a vehicle ↔ request pairing.
///
/// Returns `None` when the request is ineligible for the vehicle. Scoring may
/// write derived values back onto the request (distance caches), so it takes
/// the index mutably; requests are never shared across scenarios.
pub trait ScoringFunction: Send + Sync {
    fn score(
        &self,
        vehicle: &Vehicle,
        request: RequestId,
        index: &mut SpatialIndex,
        now: Tick,
        params: &ScoringParams,
    ) -> Option<f64>;
}

/// Weight of the pickup/ride ratio and of the ride distance.
const COMPONENT_SCALE: f64 = 10.0;
/// Penalty for a destination with no expected demand.
const MAX_DESTINATION_PENALTY: f64 = 3.0;
/// Final score multiplier.
const SCORE_SCALE: f64 = 10.0;

/// Default scoring: favours long rides with short pickups, and penalises
/// destinations with little demand around the expected drop-off time.
///
/// A request is eligible only if the vehicle can reach it no later than the
/// requested pickup time and no more than `time_radius` ticks early.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicScoring;

impl HeuristicScoring {
    /// Tick from which the vehicle is free: now when idle, otherwise the
    /// expected completion of its current assignment.
    fn available_from(vehicle: &Vehicle, index: &SpatialIndex, now: Tick) -> f64 {
        vehicle
            .active_assignment
            .and_then(|id| index.request(id))
            .map(|assignment| assignment.expected_completion())
            .unwrap_or(now as f64)
    }

    fn destination_penalty(requests_at_destination: usize, saturation: f64) -> f64 {
        if saturation <= 0.0 {
            return 0.0;
        }
        let demand = requests_at_destination as f64;
        if demand < saturation {
            MAX_DESTINATION_PENALTY - demand * (MAX_DESTINATION_PENALTY / saturation)
        } else {
            0.0
        }
    }
}

impl ScoringFunction for HeuristicScoring {
    fn score(
        &self,
        vehicle: &Vehicle,
        request_id: RequestId,
        index: &mut SpatialIndex,
        now: Tick,
        params: &ScoringParams,
    ) -> Option<f64> {
        let available_from = Self::available_from(vehicle, index, now);

        let request = index.request_mut(request_id)?;
        let pickup_distance = vehicle.location.distance_to(request.location);
        request.distance_to_pickup = Some(pickup_distance);

        let required_arrival = available_from + pickup_distance.ceil();
        let request_time = request.request_time as f64;
        if request_time < required_arrival || request_time > required_arrival + params.time_radius
        {
            return None;
        }

        let ride_distance = request.ride_distance();
        let destination = request.destination;
        // Drop-off demand is looked up at the whole tick the ride ends in.
        let dropoff_tick = request
            .request_time
            .saturating_add(ride_distance.floor() as Tick);

        let requests_at_destination = if params.destination_saturation > 0.0 {
            index.count_matching(destination, dropoff_tick)
        } else {
            0
        };
        if let Some(request) = index.request_mut(request_id) {
            request.requests_at_destination = Some(requests_at_destination);
        }

        let total = ride_distance + pickup_distance;
        let utilization_component = if total > 0.0 {
            ride_distance / total * COMPONENT_SCALE
        } else {
            COMPONENT_SCALE
        };
        let distance_value = ride_distance * params.distance_weight * COMPONENT_SCALE;
        let penalty =
            Self::destination_penalty(requests_at_destination, params.destination_saturation);

        Some((utilization_component + distance_value - penalty) * SCORE_SCALE)
    }
}
