//! Parallel scenario execution using rayon.
//!
//! Every scenario runs in its own [`World`] on a dedicated worker pool. Results
//! are collected from an indexed parallel iterator, so outcomes come back in
//! submission order whatever order the tasks finish in. A panic inside one
//! scenario is caught and reported as that scenario's outcome.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use bevy_ecs::prelude::World;
use dispatch_core::error::{DispatchError, DispatchResult};
use dispatch_core::runner::{dispatch_schedule, run_all_ticks};
use dispatch_core::scenario::{build_scenario, Scenario, ScenarioConfig};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{error, info};

use crate::error::OrchestratorError;
use crate::metrics::{extract_metrics, SimulationResult};

#[derive(Debug, Clone, Default)]
pub struct OrchestratorOptions {
    /// Worker count. `None` uses rayon's default (available parallelism).
    pub num_threads: Option<usize>,
    pub show_progress: bool,
    pub include_routing_log: bool,
    /// Shared flag; every scenario checks it at tick boundaries.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl OrchestratorOptions {
    pub fn with_num_threads(mut self, threads: usize) -> Self {
        self.num_threads = Some(threads);
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn with_routing_log(mut self, include: bool) -> Self {
        self.include_routing_log = include;
        self
    }

    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Result of one submitted scenario.
#[derive(Debug)]
pub struct ScenarioOutcome {
    /// Submission position.
    pub index: usize,
    pub name: String,
    pub result: DispatchResult<SimulationResult>,
}

impl ScenarioOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn metrics(&self) -> Option<&SimulationResult> {
        self.result.as_ref().ok()
    }
}

/// Run one scenario to completion on the calling thread.
///
/// Builds a fresh world, runs every tick and extracts metrics. A configuration
/// error is returned before any tick runs.
pub fn run_single_scenario(
    scenario: Scenario,
    include_routing_log: bool,
    cancel: Option<&AtomicBool>,
) -> DispatchResult<SimulationResult> {
    let name = scenario.name.clone();
    info!(
        scenario = %name,
        vehicles = scenario.vehicles.len(),
        requests = scenario.requests.len(),
        ticks = scenario.params.ticks_to_run,
        "scenario started"
    );

    let mut world = World::new();
    build_scenario(&mut world, scenario)?;
    let mut schedule = dispatch_schedule();
    run_all_ticks(&mut world, &mut schedule, cancel)?;

    let result = extract_metrics(&world, include_routing_log)?;
    info!(
        scenario = %name,
        completed = result.completed_request_count,
        matched = result.matched_request_count,
        faults = result.vehicle_fault_count,
        utilization = result.utilization,
        "scenario finished"
    );
    Ok(result)
}

/// Run scenarios in parallel and return one outcome per scenario, in
/// submission order.
pub fn run_parallel_scenarios(
    scenarios: Vec<Scenario>,
    options: &OrchestratorOptions,
) -> Result<Vec<ScenarioOutcome>, OrchestratorError> {
    let tasks = scenarios
        .into_iter()
        .map(|scenario| (scenario.name.clone(), move || Ok::<_, DispatchError>(scenario)))
        .collect();
    run_tasks(tasks, options)
}

/// Like [`run_parallel_scenarios`], but converts each configuration inside its
/// own task, so a malformed configuration only fails its own outcome.
pub fn run_parallel_configs(
    configs: Vec<ScenarioConfig>,
    options: &OrchestratorOptions,
) -> Result<Vec<ScenarioOutcome>, OrchestratorError> {
    let tasks = configs
        .into_iter()
        .map(|config| (config.name.clone(), move || config.into_scenario()))
        .collect();
    run_tasks(tasks, options)
}

fn run_tasks<F>(
    tasks: Vec<(String, F)>,
    options: &OrchestratorOptions,
) -> Result<Vec<ScenarioOutcome>, OrchestratorError>
where
    F: FnOnce() -> DispatchResult<Scenario> + Send,
{
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = options.num_threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build()?;

    let pb = progress_bar(tasks.len(), options.show_progress);
    let include_routing_log = options.include_routing_log;
    let cancel = options.cancel.as_deref();

    let outcomes = pool.install(|| {
        tasks
            .into_par_iter()
            .enumerate()
            .map(|(index, (name, prepare))| {
                let result = catch_unwind(AssertUnwindSafe(|| {
                    run_single_scenario(prepare()?, include_routing_log, cancel)
                }))
                .unwrap_or_else(|payload| {
                    Err(DispatchError::ScenarioTaskFault(panic_message(payload)))
                });

                if let Err(err) = &result {
                    error!(scenario = %name, index, error = %err, "scenario failed");
                }
                if let Some(progress_bar) = &pb {
                    progress_bar.inc(1);
                }
                ScenarioOutcome {
                    index,
                    name,
                    result,
                }
            })
            .collect::<Vec<_>>()
    });

    if let Some(progress_bar) = &pb {
        progress_bar.finish_with_message("Completed");
    }

    Ok(outcomes)
}

fn progress_bar(total: usize, show: bool) -> Option<ProgressBar> {
    if !show || total == 0 {
        return None;
    }
    let bar = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
    {
        bar.set_style(style.progress_chars("#>-"));
    }
    Some(bar)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "scenario task panicked".to_string()
    }
}
