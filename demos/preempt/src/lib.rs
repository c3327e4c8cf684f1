//! Shared start-up for the preemption binaries.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sp_core::AppConfig;
use sp_output::{CsvWriter, SessionLogObserver};
use sp_preempt::{ControlLoop, NoopObserver, RunSummary};
use sp_sim::TrafficSimulator;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_CONFIG: &str = "preempt.toml";

/// Install the `fmt` subscriber.  `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

/// Load the config named by the first argument, or `preempt.toml`.
///
/// An explicitly named file must exist; the default one may be absent, in
/// which case built-in defaults apply.
pub fn load_config() -> Result<AppConfig> {
    match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => read(&path),
        None if Path::new(DEFAULT_CONFIG).exists() => read(Path::new(DEFAULT_CONFIG)),
        None => {
            tracing::info!("no {DEFAULT_CONFIG} found, using defaults");
            Ok(AppConfig::default())
        }
    }
}

fn read(path: &Path) -> Result<AppConfig> {
    let config = AppConfig::from_file(path)
        .with_context(|| format!("loading config from {}", path.display()))?;
    tracing::info!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Run `control`, logging sessions to CSV when `[output] dir` is set.
pub fn run<S: TrafficSimulator>(control: &mut ControlLoop<'_, S>, config: &AppConfig) -> Result<RunSummary> {
    let Some(dir) = &config.output.dir else {
        return Ok(control.run(&mut NoopObserver)?);
    };

    let writer = CsvWriter::new(dir).with_context(|| format!("opening output in {}", dir.display()))?;
    let mut obs = SessionLogObserver::new(writer);
    let summary = control.run(&mut obs)?;
    if let Some(e) = obs.take_error() {
        return Err(e).context("writing session log");
    }
    tracing::info!(sessions = obs.sessions_written(), dir = %dir.display(), "session log written");
    Ok(summary)
}

pub fn print_summary(summary: &RunSummary) {
    println!();
    println!("Ticks:              {}", summary.ticks);
    println!("Requests:           {}", summary.requests);
    println!("Sessions completed: {}", summary.sessions_completed);
    println!("Sessions failed:    {}", summary.sessions_failed);
    println!("Requests rejected:  {}", summary.requests_rejected);
    if summary.hit_tick_limit {
        println!("(stopped at the tick limit with traffic still running)");
    }
}
