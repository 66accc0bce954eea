use std::cmp::Ordering;

use dispatch_core::error::DispatchError;
use serde::Serialize;

use crate::metrics::SimulationResult;
use crate::runner::ScenarioOutcome;

/// Aggregate view over the outcomes of one orchestrator run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepSummary {
    pub scenarios: usize,
    pub succeeded: usize,
    /// Failed outcomes, cancelled ones excluded.
    pub failed: usize,
    pub cancelled: usize,
    pub total_completed_requests: usize,
    pub total_matched_requests: usize,
    /// Mean over successful scenarios; 0 when none succeeded.
    pub mean_utilization: f64,
    pub best_utilization_index: Option<usize>,
}

pub fn summarize(outcomes: &[ScenarioOutcome]) -> SweepSummary {
    let results: Vec<&SimulationResult> = outcomes.iter().filter_map(|o| o.metrics()).collect();
    let cancelled = outcomes
        .iter()
        .filter(|o| matches!(o.result, Err(DispatchError::Cancelled { .. })))
        .count();

    let mean_utilization = if results.is_empty() {
        0.0
    } else {
        results.iter().map(|r| r.utilization).sum::<f64>() / results.len() as f64
    };

    SweepSummary {
        scenarios: outcomes.len(),
        succeeded: results.len(),
        failed: outcomes.len() - results.len() - cancelled,
        cancelled,
        total_completed_requests: results.iter().map(|r| r.completed_request_count).sum(),
        total_matched_requests: results.iter().map(|r| r.matched_request_count).sum(),
        mean_utilization,
        best_utilization_index: best_utilization_index(outcomes),
    }
}

/// Submission index of the successful outcome with the highest utilization.
/// The earliest outcome wins ties.
pub fn best_utilization_index(outcomes: &[ScenarioOutcome]) -> Option<usize> {
    outcomes
        .iter()
        .filter_map(|o| o.metrics().map(|m| (o.index, m.utilization)))
        .rev()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(Ordering::Equal))
        .map(|(index, _)| index)
}
