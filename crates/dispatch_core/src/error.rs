//! Dispatch error type.
//!
//! An ineligible match is not an error: scoring reports it as `None` and the
//! matching search skips the request.

use thiserror::Error;

use crate::ecs::VehicleId;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Malformed or missing scenario parameters. The scenario is never started.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid scenario configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Inconsistency while advancing one vehicle. Recovered inside the tick by
    /// dropping the vehicle's active assignment.
    #[error("vehicle {vehicle} fault: {reason}")]
    VehicleStateFault { vehicle: VehicleId, reason: String },

    /// Unrecovered fault inside a scenario task. Only that scenario's outcome
    /// is affected.
    #[error("scenario task fault: {0}")]
    ScenarioTaskFault(String),

    #[error("scenario cancelled after {completed_ticks} ticks")]
    Cancelled { completed_ticks: u64 },
}

impl DispatchError {
    pub fn configuration(message: impl Into<String>) -> Self {
        DispatchError::Configuration(message.into())
    }

    pub fn vehicle_fault(vehicle: VehicleId, reason: impl Into<String>) -> Self {
        DispatchError::VehicleStateFault {
            vehicle,
            reason: reason.into(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DispatchError::Configuration(_) | DispatchError::ConfigParse(_)
        )
    }
}

/// Shorthand result type for the dispatch crates.
pub type DispatchResult<T> = Result<T, DispatchError>;
