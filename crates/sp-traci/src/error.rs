use std::io;

use sp_core::CoreError;
use sp_sim::SimulatorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraciError {
    /// Launching or reaching the simulator failed.
    #[error("cannot connect to SUMO: {0}")]
    Connect(String),

    #[error("TraCI I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed TraCI message: {0}")]
    Malformed(String),

    #[error("expected TraCI command 0x{expected:02x}, got 0x{got:02x}")]
    UnexpectedCommand { expected: u8, got: u8 },

    /// The simulator answered with a non-OK status.
    #[error("TraCI command 0x{command:02x} failed: {description}")]
    CommandFailed { command: u8, description: String },

    #[error("SUMO configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("TraCI connection is closed")]
    Closed,
}

impl From<TraciError> for SimulatorError {
    fn from(e: TraciError) -> Self {
        match e {
            TraciError::CommandFailed { .. } => SimulatorError::Rejected(e.to_string()),
            TraciError::Malformed(_) | TraciError::UnexpectedCommand { .. } => {
                SimulatorError::Protocol(e.to_string())
            }
            TraciError::Closed => SimulatorError::Closed,
            TraciError::Connect(_) | TraciError::Io(_) | TraciError::Config(_) => {
                SimulatorError::Connection(e.to_string())
            }
        }
    }
}

pub type TraciResult<T> = Result<T, TraciError>;
