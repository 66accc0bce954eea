use thiserror::Error;

/// Failures of the orchestrator itself. Per-scenario failures are reported in
/// each scenario's outcome instead.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
