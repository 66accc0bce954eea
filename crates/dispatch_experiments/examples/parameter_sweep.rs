//! Example: sweep scoring parameters and fleet sizes in parallel.
//!
//! Generates a grid over the minimum score, time radius and fleet size, runs
//! every combination on all cores, then prints the best configuration and a
//! JSON summary. Set `RUST_LOG=dispatch_experiments=info` to see per-scenario
//! start and finish events.

use dispatch_core::scenario::{DispatchParams, ScenarioConfig};
use dispatch_experiments::{run_parallel_configs, summarize, OrchestratorOptions, ParameterSpace};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let base = ScenarioConfig {
        name: "sweep".to_string(),
        params: DispatchParams::default().with_ticks_to_run(60),
        request_count: Some(400),
        ..ScenarioConfig::default()
    };
    let parameter_sets = ParameterSpace::grid()
        .with_base(base)
        .minimum_score(vec![0.0, 5.0, 10.0])
        .time_radius(vec![3.0, 5.0, 10.0])
        .fleet_size(vec![10, 25, 50])
        .seed(vec![1, 2])
        .generate();
    println!("Generated {} parameter combinations", parameter_sets.len());

    let configs: Vec<ScenarioConfig> = parameter_sets.iter().map(|set| set.config.clone()).collect();
    let options = OrchestratorOptions::default().with_progress(true);
    let outcomes = run_parallel_configs(configs, &options)?;

    let summary = summarize(&outcomes);
    println!(
        "Completed {} scenarios ({} failed, {} cancelled)",
        summary.succeeded, summary.failed, summary.cancelled
    );

    if let Some(best) = summary.best_utilization_index {
        let config = &parameter_sets[best].config;
        if let Some(metrics) = outcomes[best].metrics() {
            println!("\n=== Best Configuration ===");
            println!("Scenario: {}", metrics.scenario);
            println!("Minimum score: {:.1}", config.params.minimum_score);
            println!("Time radius: {:.1}", config.params.time_radius);
            println!("Fleet size: {:?}", config.fleet_size);
            println!("Utilization: {:.2}%", metrics.utilization * 100.0);
            println!("Completed requests: {}", metrics.completed_request_count);
            println!("Match rate: {:.2}%", metrics.match_rate * 100.0);
        }
    }

    println!("\n{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
