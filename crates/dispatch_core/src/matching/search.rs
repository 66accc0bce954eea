//! Expanding-radius matching search.
//!
//! For an idle vehicle, probe five cells per radius (center, up, down, left,
//! right), smallest radius first, and keep the best-scoring unmatched request.
//! The first radius that yields a candidate above the minimum score wins; later
//! radii are never tried. Replacement is strictly-greater only, so among equal
//! scores the earliest discovered candidate is kept.

use crate::ecs::{RequestId, Tick, Vehicle, VehicleState};
use crate::geo::Coordinate;
use crate::scenario::DispatchParams;
use crate::spatial::{CellKey, SpatialIndex};

use super::scoring::ScoringFunction;

/// Best request found for a vehicle, with where it was found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchCandidate {
    pub request: RequestId,
    pub score: f64,
    pub cell: CellKey,
    pub radius: f64,
}

/// Cells probed at `radius` around `origin`, in probe order, without repeats.
/// Probes that clamp onto an already listed cell are dropped.
pub fn probe_cells(index: &SpatialIndex, origin: Coordinate, radius: f64) -> Vec<CellKey> {
    let probes = [
        origin,
        origin.offset(radius, 0.0),
        origin.offset(-radius, 0.0),
        origin.offset(0.0, -radius),
        origin.offset(0.0, radius),
    ];
    let mut cells: Vec<CellKey> = Vec::with_capacity(probes.len());
    for probe in probes {
        let key = index.cell_key_for(probe);
        if !cells.contains(&key) {
            cells.push(key);
        }
    }
    cells
}

/// Run the expanding-radius search for `vehicle`. Returns `None` when no
/// request strictly beats `params.minimum_score` at any radius.
pub fn find_best_request(
    vehicle: &Vehicle,
    index: &mut SpatialIndex,
    scoring: &dyn ScoringFunction,
    params: &DispatchParams,
    now: Tick,
) -> Option<MatchCandidate> {
    let scoring_params = params.scoring();

    for radius in params.search_radii() {
        let mut top_score = params.minimum_score;
        let mut best: Option<MatchCandidate> = None;

        for cell in probe_cells(index, vehicle.location, radius) {
            // Buckets are append-only, so slots stay valid while scoring
            // writes derived fields back onto the requests.
            let len = index.bucket(cell).len();
            for slot in 0..len {
                let request_id = index.bucket(cell)[slot];
                let unmatched = index.request(request_id).is_some_and(|r| !r.matched);
                if !unmatched {
                    continue;
                }
                let Some(score) =
                    scoring.score(vehicle, request_id, index, now, &scoring_params)
                else {
                    continue;
                };
                if score > top_score {
                    top_score = score;
                    best = Some(MatchCandidate {
                        request: request_id,
                        score,
                        cell,
                        radius,
                    });
                }
            }
        }

        if best.is_some() && top_score > params.minimum_score {
            return best;
        }
    }
    None
}

/// Attach `candidate` to `vehicle` and mark the request matched at `tick`.
/// Returns `false` without changes if the request is gone or already matched.
pub fn assign_request(
    vehicle: &mut Vehicle,
    index: &mut SpatialIndex,
    candidate: &MatchCandidate,
    tick: Tick,
) -> bool {
    let Some(request) = index.request_mut(candidate.request) else {
        return false;
    };
    if request.matched || vehicle.active_assignment.is_some() {
        return false;
    }
    request.matched = true;
    request.time_matched = Some(tick);
    vehicle.active_assignment = Some(candidate.request);
    vehicle.has_passenger = false;
    vehicle.state = if vehicle.location == request.location {
        VehicleState::WaitingAtPickup
    } else {
        VehicleState::EnRouteToPickup
    };
    true
}
