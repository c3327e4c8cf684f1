//! The preemption state machine.

use std::collections::HashSet;

use sp_core::{CoreError, PreemptionConfig, SimClock, Tick, TrafficLightId};
use sp_fuzzy::FuzzyInferenceEngine;
use sp_sim::{SimulatorError, TrafficSimulator};

use crate::{
    PreemptError, PreemptResult, PreemptionObserver, PreemptionRequest, PreemptionSession,
    PreemptionState, SessionOutcome, SessionReport,
};

/// Fewest phases a program needs for the emergency and restore phases to be
/// distinct from the original one.
pub const MIN_PHASES: usize = 3;

/// Drives a traffic light through preemption and back.
///
/// A session for light `L` that starts in phase `p` of `n`:
///
/// 1. **YellowClearance**: the current phase is cut to `clearance_secs` and
///    the machine steps the simulator until that time has passed.
/// 2. **EmergencyGreen**: phase `(p + 1) mod n` for the recommended
///    duration.
/// 3. **AwaitClearance**: step once per tick until no emergency vehicle is
///    left in the network, at most `max_clearance_wait_ticks` times.
/// 4. **Restoring**: phase `(p + 2) mod n`, session closed.
///
/// All waiting is counted in simulator steps.  At most one session per light
/// is open at a time.
pub struct PreemptionStateMachine<'e> {
    engine:        &'e FuzzyInferenceEngine,
    config:        PreemptionConfig,
    fallback_secs: f64,
    open:          HashSet<TrafficLightId>,
}

impl<'e> PreemptionStateMachine<'e> {
    /// The green time used when inference fails is
    /// `config.fallback_green_secs`, else the engine's own fallback.  With
    /// neither the machine cannot be built.
    pub fn new(engine: &'e FuzzyInferenceEngine, config: PreemptionConfig) -> PreemptResult<Self> {
        let fallback_secs = config
            .fallback_green_secs
            .or_else(|| engine.fallback_green())
            .ok_or_else(|| {
                CoreError::Config(
                    "no fallback green time: set preemption.fallback_green_secs or give the \
                     engine a `medium` output set"
                        .into(),
                )
            })?;
        Ok(Self { engine, config, fallback_secs, open: HashSet::new() })
    }

    pub fn config(&self) -> &PreemptionConfig {
        &self.config
    }

    /// Green time used when inference fails.
    pub fn fallback_secs(&self) -> f64 {
        self.fallback_secs
    }

    /// `true` while a session for `light` is open.
    pub fn is_open(&self, light: &TrafficLightId) -> bool {
        self.open.contains(light)
    }

    /// Accept `request` and run its session to completion.
    pub fn handle<S, O>(
        &mut self,
        sim:      &mut S,
        request:  &PreemptionRequest,
        observer: &mut O,
    ) -> PreemptResult<SessionReport>
    where
        S: TrafficSimulator + ?Sized,
        O: PreemptionObserver + ?Sized,
    {
        let mut session = self.begin(sim, request, observer)?;
        self.drive(sim, &mut session, observer)
    }

    /// Open a session and enter yellow clearance.
    ///
    /// The original phase and phase count are read before the signal is
    /// touched; a layout the machine cannot serve is refused without any
    /// change to the light.
    pub fn begin<S, O>(
        &mut self,
        sim:      &mut S,
        request:  &PreemptionRequest,
        observer: &mut O,
    ) -> PreemptResult<PreemptionSession>
    where
        S: TrafficSimulator + ?Sized,
        O: PreemptionObserver + ?Sized,
    {
        let light = &request.traffic_light;
        if self.open.contains(light) {
            return Err(PreemptError::SessionAlreadyOpen { light: light.clone() });
        }

        let original_phase = sim.phase(light)?;
        let phase_count = sim.phase_count(light)?;
        if phase_count < MIN_PHASES {
            return Err(PreemptError::StateInconsistency {
                light:  light.clone(),
                reason: format!("program has {phase_count} phases, need at least {MIN_PHASES}"),
            });
        }
        if original_phase >= phase_count {
            return Err(PreemptError::StateInconsistency {
                light:  light.clone(),
                reason: format!("current phase {original_phase} outside 0..{phase_count}"),
            });
        }

        let (green_secs, used_fallback) = self.recommend(request, observer);
        let mut session = PreemptionSession {
            traffic_light: light.clone(),
            lane: request.lane.clone(),
            vehicle: request.vehicle.clone(),
            original_phase,
            phase_count,
            queue_length: request.queue_length,
            urgency: request.urgency,
            green_secs,
            used_fallback,
            state: PreemptionState::Normal,
            opened_at: sim.current_tick(),
        };
        tracing::info!(
            %light,
            vehicle = %session.vehicle,
            lane = %session.lane,
            queue = session.queue_length,
            green_secs,
            original_phase,
            "preemption accepted"
        );

        self.open.insert(light.clone());
        if let Err(e) = sim.set_phase_duration(light, self.config.clearance_secs) {
            return Err(self.abort(sim, &mut session, 0, e.into(), observer));
        }
        Self::transition(sim.current_tick(), &mut session, PreemptionState::YellowClearance, observer);
        Ok(session)
    }

    /// Run an open session from yellow clearance back to normal.
    pub fn drive<S, O>(
        &mut self,
        sim:      &mut S,
        session:  &mut PreemptionSession,
        observer: &mut O,
    ) -> PreemptResult<SessionReport>
    where
        S: TrafficSimulator + ?Sized,
        O: PreemptionObserver + ?Sized,
    {
        let mut waited = 0;
        let outcome = match self.cycle(sim, session, &mut waited, observer) {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.abort(sim, session, waited, e, observer)),
        };
        self.open.remove(&session.traffic_light);

        let mut report = SessionReport {
            session:         session.clone(),
            outcome,
            closed_at:       sim.current_tick(),
            clearance_ticks: waited,
            restored_phase:  Some(session.final_phase()),
            error:           None,
        };
        if outcome == SessionOutcome::TimedOut {
            let err = PreemptError::ClearanceTimeout {
                light: session.traffic_light.clone(),
                waited,
            };
            tracing::warn!(light = %session.traffic_light, waited, "clearance wait expired, signal restored");
            report.error = Some(err.to_string());
            observer.on_session_end(&report);
            return Err(err);
        }
        tracing::info!(
            light = %session.traffic_light,
            waited,
            phase = session.final_phase(),
            "preemption complete"
        );
        observer.on_session_end(&report);
        Ok(report)
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn recommend<O>(&self, request: &PreemptionRequest, observer: &mut O) -> (f64, bool)
    where
        O: PreemptionObserver + ?Sized,
    {
        match self.engine.evaluate(request.queue_length as f64, request.urgency) {
            Ok(secs) => (secs, false),
            Err(e) => {
                let fallback = self.fallback_secs;
                tracing::warn!(
                    light = %request.traffic_light,
                    error = %e,
                    fallback,
                    "green-time inference failed, using fallback"
                );
                observer.on_inference_fallback(request, &e, fallback);
                (fallback, true)
            }
        }
    }

    fn cycle<S, O>(
        &self,
        sim:      &mut S,
        session:  &mut PreemptionSession,
        waited:   &mut u64,
        observer: &mut O,
    ) -> PreemptResult<SessionOutcome>
    where
        S: TrafficSimulator + ?Sized,
        O: PreemptionObserver + ?Sized,
    {
        let light = session.traffic_light.clone();

        let clearance = SimClock::from_step_secs(sim.step_length_secs())
            .ticks_for_secs(self.config.clearance_secs);
        for _ in 0..clearance {
            sim.step()?;
        }

        set_phase(sim, &light, session.emergency_phase())?;
        sim.set_phase_duration(&light, session.green_secs)?;
        Self::transition(sim.current_tick(), session, PreemptionState::EmergencyGreen, observer);
        Self::transition(sim.current_tick(), session, PreemptionState::AwaitClearance, observer);

        let mut cleared = false;
        while *waited < self.config.max_clearance_wait_ticks {
            sim.step()?;
            *waited += 1;
            if !sim.emergency_vehicle_present()? {
                cleared = true;
                break;
            }
        }

        if cleared {
            Self::transition(sim.current_tick(), session, PreemptionState::Restoring, observer);
        }
        set_phase(sim, &light, session.final_phase())?;
        Self::transition(sim.current_tick(), session, PreemptionState::Normal, observer);
        Ok(if cleared { SessionOutcome::Completed } else { SessionOutcome::TimedOut })
    }

    /// Close a failed session: best-effort return to the original phase,
    /// report, and hand the error back.
    fn abort<S, O>(
        &mut self,
        sim:      &mut S,
        session:  &mut PreemptionSession,
        waited:   u64,
        error:    PreemptError,
        observer: &mut O,
    ) -> PreemptError
    where
        S: TrafficSimulator + ?Sized,
        O: PreemptionObserver + ?Sized,
    {
        let light = session.traffic_light.clone();
        self.open.remove(&light);

        let mut restored_phase = None;
        if !error.is_fatal() && session.original_phase < session.phase_count {
            match sim.set_phase(&light, session.original_phase) {
                Ok(()) => restored_phase = Some(session.original_phase),
                Err(e) => tracing::warn!(%light, error = %e, "could not restore original phase"),
            }
        }
        tracing::warn!(%light, state = %session.state, %error, "preemption aborted");
        if session.state != PreemptionState::Normal {
            Self::transition(sim.current_tick(), session, PreemptionState::Normal, observer);
        }

        observer.on_session_end(&SessionReport {
            session: session.clone(),
            outcome: SessionOutcome::Aborted,
            closed_at: sim.current_tick(),
            clearance_ticks: waited,
            restored_phase,
            error: Some(error.to_string()),
        });
        error
    }

    fn transition<O>(tick: Tick, session: &mut PreemptionSession, to: PreemptionState, observer: &mut O)
    where
        O: PreemptionObserver + ?Sized,
    {
        let from = session.state;
        session.state = to;
        tracing::debug!(light = %session.traffic_light, %from, %to, %tick, "preemption state change");
        observer.on_transition(tick, session, from);
    }
}

/// `set_phase` with a refused phase reported as an inconsistency.  A live
/// simulator refuses a bad index with a failed command, not a range error.
fn set_phase<S>(sim: &mut S, light: &TrafficLightId, phase: usize) -> PreemptResult<()>
where
    S: TrafficSimulator + ?Sized,
{
    match sim.set_phase(light, phase) {
        Ok(()) => Ok(()),
        Err(SimulatorError::PhaseOutOfRange { phase, count, .. }) => Err(PreemptError::StateInconsistency {
            light:  light.clone(),
            reason: format!("phase {phase} rejected, light has {count} phases"),
        }),
        Err(SimulatorError::Rejected(why)) => Err(PreemptError::StateInconsistency {
            light:  light.clone(),
            reason: format!("phase {phase} rejected: {why}"),
        }),
        Err(e) => Err(e.into()),
    }
}
