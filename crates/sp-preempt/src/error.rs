use sp_core::{CoreError, TrafficLightId};
use sp_sim::SimulatorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreemptError {
    /// A session is already running for this light.  The request is
    /// dropped; the next scan re-detects the vehicle if it still waits.
    #[error("traffic light {light} already has an open preemption session")]
    SessionAlreadyOpen { light: TrafficLightId },

    /// The simulator reported a phase layout the state machine cannot work
    /// with.  The session was aborted.
    #[error("inconsistent signal state at {light}: {reason}")]
    StateInconsistency { light: TrafficLightId, reason: String },

    /// Emergency vehicles were still present when the wait bound ran out.
    /// The signal was restored anyway.
    #[error("emergency vehicles still present at {light} after {waited} ticks, signal restored")]
    ClearanceTimeout { light: TrafficLightId, waited: u64 },

    #[error("invalid preemption configuration: {0}")]
    Config(#[from] CoreError),

    #[error("no traffic light reported by the simulator")]
    NoTrafficLight,

    #[error("configured traffic light {0} is not in the network")]
    UnknownTrafficLight(TrafficLightId),

    #[error(transparent)]
    Simulator(#[from] SimulatorError),
}

impl PreemptError {
    /// `true` when the simulation session itself is gone.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Simulator(e) if e.is_fatal())
    }
}

pub type PreemptResult<T> = Result<T, PreemptError>;
