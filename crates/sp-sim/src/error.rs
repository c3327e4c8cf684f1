use sp_core::{LaneId, TrafficLightId, VehicleId};
use thiserror::Error;

/// Errors reported by a [`TrafficSimulator`][crate::TrafficSimulator].
#[derive(Debug, Error)]
pub enum SimulatorError {
    /// The simulator could not be launched, reached, or handshaken with.
    #[error("simulation connection error: {0}")]
    Connection(String),

    /// The simulator answered, but not in a way the client understands.
    #[error("simulator protocol error: {0}")]
    Protocol(String),

    /// The simulator rejected a command (unknown object, bad value, …).
    #[error("simulator rejected command: {0}")]
    Rejected(String),

    #[error("vehicle {0} not found")]
    VehicleNotFound(VehicleId),

    #[error("lane {0} not found")]
    LaneNotFound(LaneId),

    #[error("traffic light {0} not found")]
    TrafficLightNotFound(TrafficLightId),

    #[error("phase {phase} out of range for traffic light {light} with {count} phases")]
    PhaseOutOfRange {
        light: TrafficLightId,
        phase: usize,
        count: usize,
    },

    #[error("simulation session is closed")]
    Closed,
}

impl SimulatorError {
    /// `true` for errors that end the simulation session.  Everything else
    /// concerns one object and can be skipped.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Protocol(_) | Self::Closed)
    }
}

/// Alias for `Result<T, SimulatorError>`.
pub type SimulatorResult<T> = Result<T, SimulatorError>;
