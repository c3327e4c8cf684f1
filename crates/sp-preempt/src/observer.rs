//! Observer trait for progress reporting and data collection.

use sp_core::Tick;
use sp_fuzzy::InferenceError;

use crate::{PreemptError, PreemptionRequest, PreemptionSession, PreemptionState, RunSummary, ScanReport, SessionReport};

/// Callbacks invoked by the control loop and the state machine.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: count preemptions
///
/// ```rust,ignore
/// struct Counter(usize);
///
/// impl PreemptionObserver for Counter {
///     fn on_session_end(&mut self, _report: &SessionReport) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait PreemptionObserver {
    /// Called after every control-loop scan.
    fn on_tick_end(&mut self, _tick: Tick, _scan: &ScanReport) {}

    /// Called when a scan produced a request, before it is handled.
    fn on_request(&mut self, _tick: Tick, _request: &PreemptionRequest) {}

    /// Called when a request is turned away because a session is open.
    fn on_request_rejected(&mut self, _tick: Tick, _request: &PreemptionRequest, _error: &PreemptError) {}

    /// Called after the session has moved from `from` to `session.state`.
    fn on_transition(&mut self, _tick: Tick, _session: &PreemptionSession, _from: PreemptionState) {}

    /// Called when inference failed and `fallback_secs` is used instead.
    fn on_inference_fallback(
        &mut self,
        _request:       &PreemptionRequest,
        _error:         &InferenceError,
        _fallback_secs: f64,
    ) {}

    /// Called once per accepted session, however it ended.
    fn on_session_end(&mut self, _report: &SessionReport) {}

    /// Called once after the loop exits and the simulator is closed.
    fn on_run_end(&mut self, _summary: &RunSummary) {}
}

/// A [`PreemptionObserver`] that does nothing.
pub struct NoopObserver;

impl PreemptionObserver for NoopObserver {}
