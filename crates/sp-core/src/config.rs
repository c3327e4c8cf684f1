//! Configuration loading and typed config structures.
//!
//! The binaries read a TOML file whose sections mirror [`AppConfig`].  Every
//! field has a default, so an empty file is a valid configuration:
//!
//! ```toml
//! [simulation]
//! rendering   = "headless"        # or "gui"
//! config_path = "myConfig.sumocfg"
//! port        = 8813
//!
//! [preemption]
//! clearance_secs           = 3.0
//! max_clearance_wait_ticks = 3600
//! urgency                  = 1.0
//! fallback_green_secs      = 25.0   # default: the engine's medium centroid
//!
//! [output]
//! dir = "output/preempt"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult, TrafficLightId};

/// Environment variable naming the simulator installation root.
pub const SUMO_HOME_ENV: &str = "SUMO_HOME";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub preemption: PreemptionConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load and validate configuration from a TOML file.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn parse(text: &str) -> CoreResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the preemption logic cannot honour.
    pub fn validate(&self) -> CoreResult<()> {
        self.preemption.validate()?;
        if self.simulation.config_path.as_os_str().is_empty() {
            return Err(CoreError::Config("simulation.config_path is empty".into()));
        }
        if self.simulation.max_ticks == Some(0) {
            return Err(CoreError::Config("simulation.max_ticks must be positive".into()));
        }
        Ok(())
    }
}

// ── [simulation] ──────────────────────────────────────────────────────────────

/// Whether the external simulator runs with its graphical front end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rendering {
    Gui,
    #[default]
    Headless,
}

impl Rendering {
    /// Name of the simulator executable for this rendering mode.
    pub fn binary_name(self) -> &'static str {
        match self {
            Self::Gui => "sumo-gui",
            Self::Headless => "sumo",
        }
    }
}

/// Connection and scope settings for the simulation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub rendering: Rendering,

    /// Scenario file handed to the simulator with `-c`.
    #[serde(default = "default_config_path")]
    pub config_path: PathBuf,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Connection attempts (one per 100 ms) while the simulator starts up.
    #[serde(default = "default_connect_retries")]
    pub connect_retries: u32,

    /// Traffic light under control.  `None` picks the first one reported.
    #[serde(default)]
    pub traffic_light: Option<TrafficLightId>,

    /// Hard stop for the control loop.  `None` runs until the simulator
    /// reports no outstanding vehicles.
    #[serde(default)]
    pub max_ticks: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rendering:       Rendering::default(),
            config_path:     default_config_path(),
            host:            default_host(),
            port:            default_port(),
            connect_retries: default_connect_retries(),
            traffic_light:   None,
            max_ticks:       None,
        }
    }
}

fn default_config_path() -> PathBuf {
    PathBuf::from("myConfig.sumocfg")
}

fn default_host() -> String {
    "127.0.0.1".to_owned()
}

const fn default_port() -> u16 {
    8813
}

const fn default_connect_retries() -> u32 {
    30
}

// ── [preemption] ──────────────────────────────────────────────────────────────

/// Timing and fallback parameters of the preemption state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreemptionConfig {
    /// Amber clearance given to the current phase before switching.
    #[serde(default = "default_clearance_secs")]
    pub clearance_secs: f64,

    /// Upper bound on ticks spent waiting for emergency vehicles to clear.
    #[serde(default = "default_max_clearance_wait_ticks")]
    pub max_clearance_wait_ticks: u64,

    /// Urgency attached to every detected emergency vehicle.
    #[serde(default = "default_urgency")]
    pub urgency: f64,

    /// Green time used when fuzzy inference fails.  `None` uses the
    /// engine's own fallback.
    #[serde(default)]
    pub fallback_green_secs: Option<f64>,
}

impl Default for PreemptionConfig {
    fn default() -> Self {
        Self {
            clearance_secs:           default_clearance_secs(),
            max_clearance_wait_ticks: default_max_clearance_wait_ticks(),
            urgency:                  default_urgency(),
            fallback_green_secs:      None,
        }
    }
}

impl PreemptionConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.clearance_secs.is_finite() && self.clearance_secs > 0.0) {
            return Err(CoreError::Config(format!(
                "preemption.clearance_secs must be positive, got {}",
                self.clearance_secs
            )));
        }
        if self.max_clearance_wait_ticks == 0 {
            return Err(CoreError::Config(
                "preemption.max_clearance_wait_ticks must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.urgency) {
            return Err(CoreError::Config(format!(
                "preemption.urgency must lie in [0, 1], got {}",
                self.urgency
            )));
        }
        if let Some(secs) = self.fallback_green_secs {
            if !(0.0..=60.0).contains(&secs) {
                return Err(CoreError::Config(format!(
                    "preemption.fallback_green_secs must lie in [0, 60], got {secs}"
                )));
            }
        }
        Ok(())
    }
}

const fn default_clearance_secs() -> f64 {
    3.0
}

const fn default_max_clearance_wait_ticks() -> u64 {
    3_600
}

const fn default_urgency() -> f64 {
    1.0
}

// ── [output] ──────────────────────────────────────────────────────────────────

/// Where session logs go.  No directory means no files are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

// ── Environment ───────────────────────────────────────────────────────────────

/// Resolve the simulator installation root from `SUMO_HOME`.
pub fn sumo_home() -> CoreResult<PathBuf> {
    match std::env::var_os(SUMO_HOME_ENV) {
        Some(v) if !v.is_empty() => Ok(PathBuf::from(v)),
        _ => Err(CoreError::MissingEnv(SUMO_HOME_ENV)),
    }
}
