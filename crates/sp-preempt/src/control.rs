//! The control loop: step, scan, preempt.

use sp_core::{AppConfig, Tick, TrafficLightId};
use sp_fuzzy::FuzzyInferenceEngine;
use sp_sim::TrafficSimulator;

use crate::{
    DetectionScanner, PreemptError, PreemptResult, PreemptionObserver, PreemptionStateMachine,
    ScanReport,
};

/// Counters for one control-loop run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Simulator steps taken, inside sessions included.
    pub ticks:              u64,
    pub requests:           u32,
    pub sessions_completed: u32,
    /// Sessions that timed out, aborted, or were refused as inconsistent.
    pub sessions_failed:    u32,
    /// Requests turned away because a session was already open.
    pub requests_rejected:  u32,
    /// `true` if the run stopped at `max_ticks` with work still pending.
    pub hit_tick_limit:     bool,
}

/// Advances the simulator one tick at a time, scans for emergency vehicles
/// held at red, and runs each resulting session to completion before the
/// next scan.
///
/// Create via [`ControlLoopBuilder`].
pub struct ControlLoop<'e, S: TrafficSimulator> {
    sim:       S,
    scanner:   DetectionScanner,
    machine:   PreemptionStateMachine<'e>,
    max_ticks: Option<u64>,
}

impl<'e, S: TrafficSimulator> ControlLoop<'e, S> {
    /// Run until the simulator has no pending work or `max_ticks` is
    /// reached, then close the simulator.
    ///
    /// Only fatal simulator errors end the run early; the simulator is
    /// closed before they are returned.
    pub fn run<O>(&mut self, observer: &mut O) -> PreemptResult<RunSummary>
    where
        O: PreemptionObserver + ?Sized,
    {
        tracing::info!(light = %self.scanner.light(), max_ticks = ?self.max_ticks, "control loop starting");
        let mut summary = RunSummary::default();

        let result = self.run_inner(&mut summary, observer);
        summary.ticks = self.sim.current_tick().0;

        if let Err(e) = result {
            if let Err(close_err) = self.sim.close() {
                tracing::warn!(error = %close_err, "closing simulator after failure");
            }
            tracing::error!(error = %e, "control loop aborted");
            return Err(e);
        }

        self.sim.close()?;
        tracing::info!(
            ticks = summary.ticks,
            completed = summary.sessions_completed,
            failed = summary.sessions_failed,
            rejected = summary.requests_rejected,
            "control loop finished"
        );
        observer.on_run_end(&summary);
        Ok(summary)
    }

    fn run_inner<O>(&mut self, summary: &mut RunSummary, observer: &mut O) -> PreemptResult<()>
    where
        O: PreemptionObserver + ?Sized,
    {
        loop {
            if let Some(max) = self.max_ticks {
                if self.sim.current_tick().0 >= max {
                    summary.hit_tick_limit = self.sim.has_pending_work()?;
                    tracing::info!(max, "tick limit reached");
                    return Ok(());
                }
            }
            if !self.sim.has_pending_work()? {
                return Ok(());
            }

            let tick = self.sim.step()?;
            let scan = self.scan(tick)?;
            observer.on_tick_end(tick, &scan);

            if let Some(request) = scan.request {
                summary.requests += 1;
                observer.on_request(tick, &request);
                match self.machine.handle(&mut self.sim, &request, observer) {
                    Ok(_) => summary.sessions_completed += 1,
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e @ PreemptError::SessionAlreadyOpen { .. }) => {
                        tracing::debug!(error = %e, "request deferred");
                        summary.requests_rejected += 1;
                        observer.on_request_rejected(tick, &request, &e);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "preemption session failed");
                        summary.sessions_failed += 1;
                    }
                }
            }
        }
    }

    /// One scan.  A non-fatal scan failure counts as an empty scan.
    fn scan(&mut self, tick: Tick) -> PreemptResult<ScanReport> {
        match self.scanner.scan(&mut self.sim) {
            Ok(scan) => Ok(scan),
            Err(e) if e.is_fatal() => Err(e.into()),
            Err(e) => {
                tracing::warn!(%tick, error = %e, "scan failed");
                Ok(ScanReport::default())
            }
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn simulator(&self) -> &S {
        &self.sim
    }

    pub fn simulator_mut(&mut self) -> &mut S {
        &mut self.sim
    }

    pub fn into_simulator(self) -> S {
        self.sim
    }

    pub fn scanner(&self) -> &DetectionScanner {
        &self.scanner
    }

    pub fn machine(&self) -> &PreemptionStateMachine<'e> {
        &self.machine
    }
}

// ── ControlLoopBuilder ────────────────────────────────────────────────────────

/// Fluent builder for [`ControlLoop`].
///
/// # Required inputs
///
/// - `S: TrafficSimulator`: a connected simulator
/// - [`FuzzyInferenceEngine`]: borrowed for the lifetime of the loop
/// - [`AppConfig`]: preemption timings, urgency, tick bound, light id
///
/// # Example
///
/// ```rust,ignore
/// let engine = FuzzyInferenceEngine::green_time()?;
/// let mut control = ControlLoopBuilder::new(sim, &engine, &config).build()?;
/// let summary = control.run(&mut NoopObserver)?;
/// ```
pub struct ControlLoopBuilder<'e, S: TrafficSimulator> {
    sim:       S,
    engine:    &'e FuzzyInferenceEngine,
    config:    AppConfig,
    light:     Option<TrafficLightId>,
}

impl<'e, S: TrafficSimulator> ControlLoopBuilder<'e, S> {
    pub fn new(sim: S, engine: &'e FuzzyInferenceEngine, config: &AppConfig) -> Self {
        Self {
            sim,
            engine,
            light: config.simulation.traffic_light.clone(),
            config: config.clone(),
        }
    }

    /// Control `light` instead of the configured or first reported one.
    pub fn traffic_light(mut self, light: TrafficLightId) -> Self {
        self.light = Some(light);
        self
    }

    /// Resolve the controlled light and return a ready-to-run loop.
    ///
    /// The light must be one the simulator reports.
    pub fn build(mut self) -> PreemptResult<ControlLoop<'e, S>> {
        self.config.preemption.validate()?;
        let urgency = self.config.preemption.urgency;
        let machine = PreemptionStateMachine::new(self.engine, self.config.preemption)?;

        let lights = self.sim.traffic_light_ids()?;
        let light = match self.light {
            Some(light) if lights.contains(&light) => light,
            Some(light) => return Err(PreemptError::UnknownTrafficLight(light)),
            None => lights.into_iter().next().ok_or(PreemptError::NoTrafficLight)?,
        };
        tracing::info!(%light, "controlling traffic light");

        Ok(ControlLoop {
            sim:       self.sim,
            scanner:   DetectionScanner::new(light, urgency),
            machine,
            max_ticks: self.config.simulation.max_ticks,
        })
    }
}
