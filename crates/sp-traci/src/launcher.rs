//! Start SUMO and open a TraCI session to it.

use std::net::TcpStream;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use sp_core::{SimulationConfig, config::sumo_home};

use crate::{TraciError, TraciResult, TraciSimulator};

/// Delay between connection attempts while SUMO starts listening.
pub const RETRY_DELAY: Duration = Duration::from_millis(100);

/// Builds the SUMO command line and connects to the spawned process.
///
/// # Example
///
/// ```rust,ignore
/// let sim = SumoLauncher::from_config(&config.simulation)?.launch()?;
/// ```
#[derive(Debug, Clone)]
pub struct SumoLauncher {
    binary:      PathBuf,
    config_path: PathBuf,
    host:        String,
    port:        u16,
    retries:     u32,
}

impl SumoLauncher {
    /// Resolve the binary under `$SUMO_HOME/bin`.  Fails if `SUMO_HOME` is
    /// unset.
    pub fn from_config(config: &SimulationConfig) -> TraciResult<Self> {
        Ok(Self::with_sumo_home(&sumo_home()?, config))
    }

    pub fn with_sumo_home(sumo_home: &Path, config: &SimulationConfig) -> Self {
        Self {
            binary:      sumo_home.join("bin").join(config.rendering.binary_name()),
            config_path: config.config_path.clone(),
            host:        config.host.clone(),
            port:        config.port,
            retries:     config.connect_retries.max(1),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// `sumo -c <config> --remote-port <port>`.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-c")
            .arg(&self.config_path)
            .arg("--remote-port")
            .arg(self.port.to_string())
            .stdin(Stdio::null());
        cmd
    }

    /// Spawn SUMO, connect, and handshake.
    pub fn launch(&self) -> TraciResult<TraciSimulator<TcpStream>> {
        tracing::info!(
            binary = %self.binary.display(),
            config = %self.config_path.display(),
            port = self.port,
            "launching SUMO"
        );
        let mut child = self
            .command()
            .spawn()
            .map_err(|e| TraciError::Connect(format!("spawn {}: {e}", self.binary.display())))?;

        let connected = self.connect_with_retries(&mut || match child.try_wait() {
            Ok(Some(status)) => Some(status.to_string()),
            _ => None,
        });
        let stream = match connected {
            Ok(stream) => stream,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        };

        match TraciSimulator::connect(stream) {
            Ok(sim) => Ok(sim.with_child(child)),
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                Err(e)
            }
        }
    }

    /// Connect to an already running server.
    pub fn attach(&self) -> TraciResult<TraciSimulator<TcpStream>> {
        let stream = self.connect_with_retries(&mut || None)?;
        TraciSimulator::connect(stream)
    }

    /// Retry until the port accepts.  `exited` reports a dead server so the
    /// wait ends early.
    fn connect_with_retries(
        &self,
        exited: &mut dyn FnMut() -> Option<String>,
    ) -> TraciResult<TcpStream> {
        let addr = (self.host.as_str(), self.port);
        let mut last_err = None;
        for attempt in 1..=self.retries {
            match TcpStream::connect(addr) {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    tracing::debug!(attempt, "TraCI port accepted connection");
                    return Ok(stream);
                }
                Err(e) => last_err = Some(e),
            }
            if let Some(status) = exited() {
                return Err(TraciError::Connect(format!("SUMO exited early ({status})")));
            }
            thread::sleep(RETRY_DELAY);
        }
        Err(TraciError::Connect(format!(
            "{}:{} refused {} attempts: {}",
            self.host,
            self.port,
            self.retries,
            last_err.map(|e| e.to_string()).unwrap_or_default()
        )))
    }
}
