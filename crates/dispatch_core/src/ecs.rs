use std::fmt;

use bevy_ecs::prelude::{Component, Entity, Resource};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Simulation tick. Ticks are numbered from 1.
pub type Tick = u64;

/// Position of a request in its scenario's flat request registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub usize);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// Position of a vehicle in its scenario's fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VehicleId(pub u32);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RideRequest {
    id: RequestId,
    pub location: Coordinate,
    pub destination: Coordinate,
    pub request_time: Tick,
    pub matched: bool,
    pub time_matched: Option<Tick>,
    pub picked_up: bool,
    /// Distance from the last scored vehicle to the pickup. Overwritten by every score.
    pub distance_to_pickup: Option<f64>,
    /// Pickup to dropoff distance; derived once, then reused.
    pub distance_of_ride: Option<f64>,
    /// Destination demand seen by the last score.
    pub requests_at_destination: Option<usize>,
}

impl RideRequest {
    /// The id is assigned when the request is inserted into a [`crate::spatial::SpatialIndex`].
    pub fn new(location: Coordinate, destination: Coordinate, request_time: Tick) -> Self {
        Self {
            id: RequestId(0),
            location,
            destination,
            request_time,
            matched: false,
            time_matched: None,
            picked_up: false,
            distance_to_pickup: None,
            distance_of_ride: None,
            requests_at_destination: None,
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: RequestId) {
        self.id = id;
    }

    /// Cached ride distance, deriving and caching it on first use.
    pub fn ride_distance(&mut self) -> f64 {
        match self.distance_of_ride {
            Some(distance) => distance,
            None => {
                let distance = self.location.distance_to(self.destination);
                self.distance_of_ride = Some(distance);
                distance
            }
        }
    }

    /// Ride distance without touching the cache.
    pub fn peek_ride_distance(&self) -> f64 {
        self.distance_of_ride
            .unwrap_or_else(|| self.location.distance_to(self.destination))
    }

    /// Tick at which the ride is expected to finish: pickup at the requested
    /// time plus one tick per unit of ride distance.
    pub fn expected_completion(&self) -> f64 {
        self.request_time as f64 + self.peek_ride_distance()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleState {
    Idle,
    EnRouteToPickup,
    WaitingAtPickup,
    EnRouteToDestination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoutingEventKind {
    Pickup,
    Dropoff,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutingLogEntry {
    pub tick: Tick,
    pub location: Coordinate,
    pub kind: RoutingEventKind,
}

#[derive(Debug, Clone, PartialEq, Component)]
pub struct Vehicle {
    pub id: VehicleId,
    pub location: Coordinate,
    pub state: VehicleState,
    pub active_assignment: Option<RequestId>,
    pub has_passenger: bool,
    pub distance_with_passenger: f64,
    pub distance_without_passenger: f64,
    pub routing_log: Vec<RoutingLogEntry>,
}

impl Vehicle {
    pub fn new(id: VehicleId, location: Coordinate) -> Self {
        Self {
            id,
            location,
            state: VehicleState::Idle,
            active_assignment: None,
            has_passenger: false,
            distance_with_passenger: 0.0,
            distance_without_passenger: 0.0,
            routing_log: Vec::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.active_assignment.is_none()
    }

    pub fn total_distance(&self) -> f64 {
        self.distance_with_passenger + self.distance_without_passenger
    }

    pub fn log_event(&mut self, tick: Tick, kind: RoutingEventKind) {
        self.routing_log.push(RoutingLogEntry {
            tick,
            location: self.location,
            kind,
        });
    }

    /// Forget the active assignment and fall back to Idle. The request keeps
    /// its matched flag and is never handed to another vehicle.
    pub fn drop_assignment(&mut self) -> Option<RequestId> {
        self.has_passenger = false;
        self.state = VehicleState::Idle;
        self.active_assignment.take()
    }
}

/// Vehicle entities in fleet order. Ticks walk this list, never query order.
#[derive(Debug, Clone, Default, Resource)]
pub struct FleetOrder(pub Vec<Entity>);

impl std::ops::Deref for FleetOrder {
    type Target = [Entity];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
