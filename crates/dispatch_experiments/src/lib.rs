//! Parallel execution of fleet dispatch scenarios.
//!
//! Each scenario is an independent value run to completion in its own ECS
//! world on a rayon worker pool. Outcomes come back in submission order, and a
//! failure or panic in one scenario never touches its siblings.
//!
//! # Quick Start
//!
//! ```no_run
//! use dispatch_experiments::{run_parallel_configs, summarize, OrchestratorOptions, ParameterSpace};
//!
//! let configs = ParameterSpace::grid()
//!     .minimum_score(vec![0.0, 5.0, 10.0])
//!     .fleet_size(vec![5, 10])
//!     .request_count(vec![100])
//!     .seed(vec![7])
//!     .generate()
//!     .into_iter()
//!     .map(|set| set.config)
//!     .collect();
//!
//! let outcomes = run_parallel_configs(configs, &OrchestratorOptions::default()).unwrap();
//! let summary = summarize(&outcomes);
//! println!("best utilization: {:?}", summary.best_utilization_index);
//! ```
//!
//! # Architecture
//!
//! - [`parameters`]: grid and sampled variation over a base configuration
//! - [`runner`]: single and parallel scenario execution
//! - [`metrics`]: metrics extraction from a finished world
//! - [`summary`]: aggregation across outcomes

pub mod error;
pub mod metrics;
pub mod parameters;
pub mod runner;
pub mod summary;

pub use error::OrchestratorError;
pub use metrics::{SimulationResult, VehicleRoutingLog, VehicleSummary};
pub use parameters::{ParameterSet, ParameterSpace};
pub use runner::{
    run_parallel_configs, run_parallel_scenarios, run_single_scenario, OrchestratorOptions,
    ScenarioOutcome,
};
pub use summary::{best_utilization_index, summarize, SweepSummary};
