//! preempt — emergency-vehicle signal preemption against a live SUMO run.
//!
//! Usage: `preempt [config.toml]`.  `SUMO_HOME` must point at the SUMO
//! installation; the binary is started with the configured `.sumocfg` and
//! driven over TraCI until the scenario ends.

use anyhow::{Context, Result};

use sp_fuzzy::FuzzyInferenceEngine;
use sp_preempt::ControlLoopBuilder;
use sp_traci::SumoLauncher;

use preempt_demo::{init_tracing, load_config, print_summary, run};

fn main() -> Result<()> {
    init_tracing();
    let config = load_config()?;

    let engine = FuzzyInferenceEngine::green_time().context("building green-time engine")?;

    let launcher = SumoLauncher::from_config(&config.simulation).context("locating SUMO")?;
    tracing::info!(
        binary = %launcher.binary().display(),
        config = %config.simulation.config_path.display(),
        port = config.simulation.port,
        "launching simulator"
    );
    let sim = launcher.launch().context("connecting to SUMO")?;

    let mut control = ControlLoopBuilder::new(sim, &engine, &config)
        .build()
        .context("preparing control loop")?;
    let summary = run(&mut control, &config)?;

    print_summary(&summary);
    Ok(())
}
