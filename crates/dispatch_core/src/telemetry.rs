//! Telemetry: per-scenario counters and the match log.

use std::collections::HashMap;

use bevy_ecs::prelude::Resource;
use serde::Serialize;

use crate::ecs::{RequestId, Tick, VehicleId};

/// One accepted match, recorded when a request is attached to a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchRecord {
    pub tick: Tick,
    pub vehicle: VehicleId,
    pub request: RequestId,
    pub score: f64,
}

/// Running counters for one scenario. Insert as a resource before the first tick.
#[derive(Debug, Default, Clone, Resource)]
pub struct DispatchTelemetry {
    pub completed_requests: usize,
    pub vehicle_faults: usize,
    pub matches: Vec<MatchRecord>,
}

impl DispatchTelemetry {
    pub fn record_match(&mut self, record: MatchRecord) {
        self.matches.push(record);
    }

    pub fn record_completion(&mut self) {
        self.completed_requests += 1;
    }

    pub fn record_fault(&mut self) {
        self.vehicle_faults += 1;
    }

    pub fn matched_requests(&self) -> usize {
        self.matches.len()
    }

    /// Requests that appear in more than one match record. Empty unless a
    /// request was double-booked.
    pub fn double_booked(&self) -> Vec<RequestId> {
        let mut seen: HashMap<RequestId, usize> = HashMap::new();
        for record in &self.matches {
            *seen.entry(record.request).or_default() += 1;
        }
        let mut repeated: Vec<RequestId> = seen
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(request, _)| request)
            .collect();
        repeated.sort();
        repeated
    }
}
