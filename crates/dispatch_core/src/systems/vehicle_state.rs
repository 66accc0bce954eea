//! Per-vehicle movement bookkeeping and pickup/dropoff transitions.
//!
//! Both functions report inconsistencies as [`DispatchError::VehicleStateFault`];
//! the fleet step recovers from them by dropping the vehicle's assignment.

use crate::ecs::{RequestId, RoutingEventKind, Tick, Vehicle, VehicleState};
use crate::error::{DispatchError, DispatchResult};
use crate::movement::MovementModel;
use crate::spatial::SpatialIndex;

/// What a transition did to the vehicle this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// No assignment held.
    Idle,
    /// Passenger dropped off; the assignment is detached.
    Completed(RequestId),
    /// Passenger boarded this tick.
    PickedUp(RequestId),
    /// Still working on the assignment.
    Holding(RequestId),
}

fn missing_assignment(vehicle: &Vehicle, request: RequestId) -> DispatchError {
    DispatchError::vehicle_fault(vehicle.id, format!("assignment {request} is not registered"))
}

/// Move the vehicle one tick through `movement` and book the distance.
///
/// The move counts as carrying a passenger if the assignment was already picked
/// up before the move; the tick a passenger boards is still empty driving.
pub fn advance_vehicle(
    vehicle: &mut Vehicle,
    index: &mut SpatialIndex,
    movement: &dyn MovementModel,
    tick: Tick,
) -> DispatchResult<()> {
    if !vehicle.location.is_finite() {
        return Err(DispatchError::vehicle_fault(
            vehicle.id,
            format!("location {:?} is not finite", vehicle.location),
        ));
    }

    let (next, with_passenger) = match vehicle.active_assignment {
        Some(request_id) => {
            let request = index
                .request_mut(request_id)
                .ok_or_else(|| missing_assignment(vehicle, request_id))?;
            let was_picked_up = request.picked_up;
            (movement.advance(vehicle, Some(request), tick)?, was_picked_up)
        }
        None => (movement.advance(vehicle, None, tick)?, false),
    };

    if !next.is_finite() {
        return Err(DispatchError::vehicle_fault(
            vehicle.id,
            format!("movement returned non-finite location {next:?}"),
        ));
    }

    let travelled = vehicle.location.distance_to(next);
    if with_passenger {
        vehicle.distance_with_passenger += travelled;
    } else {
        vehicle.distance_without_passenger += travelled;
    }
    vehicle.location = next;
    Ok(())
}

/// Apply the pickup/dropoff rules to a vehicle that has just moved.
pub fn apply_transition(
    vehicle: &mut Vehicle,
    index: &SpatialIndex,
    tick: Tick,
) -> DispatchResult<Transition> {
    let Some(request_id) = vehicle.active_assignment else {
        vehicle.state = VehicleState::Idle;
        vehicle.has_passenger = false;
        return Ok(Transition::Idle);
    };
    let request = index
        .request(request_id)
        .ok_or_else(|| missing_assignment(vehicle, request_id))?;

    if vehicle.location == request.destination {
        vehicle.drop_assignment();
        vehicle.log_event(tick, RoutingEventKind::Dropoff);
        return Ok(Transition::Completed(request_id));
    }

    if request.picked_up {
        vehicle.state = VehicleState::EnRouteToDestination;
        if !vehicle.has_passenger {
            vehicle.has_passenger = true;
            vehicle.log_event(tick, RoutingEventKind::Pickup);
            return Ok(Transition::PickedUp(request_id));
        }
        return Ok(Transition::Holding(request_id));
    }

    vehicle.has_passenger = false;
    vehicle.state = if vehicle.location == request.location {
        VehicleState::WaitingAtPickup
    } else {
        VehicleState::EnRouteToPickup
    };
    Ok(Transition::Holding(request_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{RideRequest, VehicleId};
    use crate::geo::Coordinate;
    use crate::movement::StraightLineMovement;
    use crate::spatial::GridBounds;

    fn setup(request_time: Tick) -> (SpatialIndex, Vehicle, RequestId) {
        let mut index = SpatialIndex::new(GridBounds::default(), 5.0).expect("index");
        let id = index.insert(RideRequest::new(
            Coordinate::new(0.0, 2.0),
            Coordinate::new(0.0, 4.0),
            request_time,
        ));
        let mut vehicle = Vehicle::new(VehicleId(0), Coordinate::new(0.0, 0.0));
        vehicle.active_assignment = Some(id);
        vehicle.state = VehicleState::EnRouteToPickup;
        (index, vehicle, id)
    }

    #[test]
    fn idle_without_assignment() {
        let index = SpatialIndex::new(GridBounds::default(), 5.0).expect("index");
        let mut vehicle = Vehicle::new(VehicleId(0), Coordinate::new(1.0, 1.0));
        assert_eq!(
            apply_transition(&mut vehicle, &index, 1).expect("transition"),
            Transition::Idle
        );
        assert_eq!(vehicle.state, VehicleState::Idle);
    }

    #[test]
    fn waiting_only_when_standing_on_pickup() {
        let (index, mut vehicle, id) = setup(5);
        assert_eq!(
            apply_transition(&mut vehicle, &index, 1).expect("transition"),
            Transition::Holding(id)
        );
        assert_eq!(vehicle.state, VehicleState::EnRouteToPickup);

        vehicle.location = Coordinate::new(0.0, 2.0);
        apply_transition(&mut vehicle, &index, 2).expect("transition");
        assert_eq!(vehicle.state, VehicleState::WaitingAtPickup);
        assert!(!vehicle.has_passenger);
    }

    #[test]
    fn pickup_is_logged_once() {
        let (mut index, mut vehicle, id) = setup(0);
        vehicle.location = Coordinate::new(0.0, 2.0);
        if let Some(request) = index.request_mut(id) {
            request.picked_up = true;
        }

        assert_eq!(
            apply_transition(&mut vehicle, &index, 3).expect("transition"),
            Transition::PickedUp(id)
        );
        assert_eq!(
            apply_transition(&mut vehicle, &index, 4).expect("transition"),
            Transition::Holding(id)
        );
        assert!(vehicle.has_passenger);
        assert_eq!(vehicle.state, VehicleState::EnRouteToDestination);
        assert_eq!(vehicle.routing_log.len(), 1);
        assert_eq!(vehicle.routing_log[0].kind, RoutingEventKind::Pickup);
        assert_eq!(vehicle.routing_log[0].tick, 3);
    }

    #[test]
    fn dropoff_detaches_assignment() {
        let (mut index, mut vehicle, id) = setup(0);
        if let Some(request) = index.request_mut(id) {
            request.picked_up = true;
        }
        vehicle.has_passenger = true;
        vehicle.location = Coordinate::new(0.0, 4.0);

        assert_eq!(
            apply_transition(&mut vehicle, &index, 6).expect("transition"),
            Transition::Completed(id)
        );
        assert!(vehicle.is_idle());
        assert!(!vehicle.has_passenger);
        assert_eq!(vehicle.routing_log.last().map(|e| e.kind), Some(RoutingEventKind::Dropoff));
        // The request stays matched; it is never handed out again.
        assert!(index.request(id).is_some_and(|r| r.picked_up));
    }

    #[test]
    fn distance_is_booked_by_passenger_state_before_the_move() {
        let (mut index, mut vehicle, _) = setup(2);
        let movement = StraightLineMovement::default();

        advance_vehicle(&mut vehicle, &mut index, &movement, 1).expect("advance");
        advance_vehicle(&mut vehicle, &mut index, &movement, 2).expect("advance");
        // Arrived and boarded on tick 2; both moves were empty.
        assert_eq!(vehicle.distance_without_passenger, 2.0);
        assert_eq!(vehicle.distance_with_passenger, 0.0);

        advance_vehicle(&mut vehicle, &mut index, &movement, 3).expect("advance");
        assert_eq!(vehicle.distance_with_passenger, 1.0);
        assert_eq!(vehicle.location, Coordinate::new(0.0, 3.0));
    }

    #[test]
    fn dangling_assignment_is_a_vehicle_fault() {
        let index = SpatialIndex::new(GridBounds::default(), 5.0).expect("index");
        let mut vehicle = Vehicle::new(VehicleId(3), Coordinate::new(0.0, 0.0));
        vehicle.active_assignment = Some(RequestId(42));

        let err = apply_transition(&mut vehicle, &index, 1).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::VehicleStateFault { vehicle: VehicleId(3), .. }
        ));
    }

    #[test]
    fn non_finite_location_is_a_vehicle_fault() {
        let mut index = SpatialIndex::new(GridBounds::default(), 5.0).expect("index");
        let mut vehicle = Vehicle::new(VehicleId(1), Coordinate::new(f64::NAN, 0.0));
        let err = advance_vehicle(&mut vehicle, &mut index, &StraightLineMovement::default(), 1)
            .unwrap_err();
        assert!(matches!(err, DispatchError::VehicleStateFault { .. }));
    }
}
