//! Preemption session state.

use std::fmt;

use sp_core::{LaneId, Tick, TrafficLightId, VehicleId};

/// Where a traffic light is in its preemption cycle.
///
/// ```text
/// Normal ─accept─▶ YellowClearance ─clearance elapsed─▶ EmergencyGreen
///    ▲                                                        │
///    └── Restoring ◀─no emergency vehicle─ AwaitClearance ◀───┘
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PreemptionState {
    Normal,
    YellowClearance,
    EmergencyGreen,
    AwaitClearance,
    Restoring,
}

impl PreemptionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::YellowClearance => "yellow_clearance",
            Self::EmergencyGreen => "emergency_green",
            Self::AwaitClearance => "await_clearance",
            Self::Restoring => "restoring",
        }
    }
}

impl fmt::Display for PreemptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One accepted preemption, from acceptance until the light is back in
/// normal cycling.
#[derive(Clone, Debug, PartialEq)]
pub struct PreemptionSession {
    pub traffic_light:  TrafficLightId,
    pub lane:           LaneId,
    pub vehicle:        VehicleId,
    /// Phase the light was in before anything was changed.
    pub original_phase: usize,
    pub phase_count:    usize,
    pub queue_length:   u32,
    pub urgency:        f64,
    /// Emergency green duration in seconds.
    pub green_secs:     f64,
    /// `true` when inference failed and the configured fallback was used.
    pub used_fallback:  bool,
    pub state:          PreemptionState,
    pub opened_at:      Tick,
}

impl PreemptionSession {
    /// Phase that serves the emergency approach.
    pub fn emergency_phase(&self) -> usize {
        (self.original_phase + 1) % self.phase_count
    }

    /// Phase normal cycling resumes from.
    pub fn final_phase(&self) -> usize {
        (self.original_phase + 2) % self.phase_count
    }
}

/// How a session ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Emergency vehicles cleared and the signal was restored.
    Completed,
    /// The wait bound ran out; the signal was restored regardless.
    TimedOut,
    /// The session was abandoned part-way.
    Aborted,
}

impl SessionOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::TimedOut => "timed_out",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of a finished session, handed to observers.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionReport {
    pub session:          PreemptionSession,
    pub outcome:          SessionOutcome,
    pub closed_at:        Tick,
    /// Ticks spent waiting for clearance.
    pub clearance_ticks:  u64,
    /// Phase the light was left in, if the machine set one.
    pub restored_phase:   Option<usize>,
    /// Error text for sessions that did not complete.
    pub error:            Option<String>,
}
