//! A deterministic in-memory intersection.
//!
//! `ScriptedSimulator` implements [`TrafficSimulator`] without any external
//! process.  Lights cycle through fixed-duration phases; vehicles enter at a
//! scheduled tick and leave once their lane has shown green for a configured
//! number of ticks.  Vehicles on lanes no light controls count down every
//! tick.
//!
//! Every `set_phase` / `set_phase_duration` call is recorded so tests can
//! check exactly what a controller commanded.

use std::collections::{HashMap, HashSet};

use sp_core::{LaneId, SignalState, SimClock, Tick, TrafficLightId, VehicleCategory, VehicleId};

use crate::{SimulatorError, SimulatorResult, TrafficSimulator};

/// Green ticks for a vehicle that never leaves.
pub const NEVER_CLEARS: u32 = u32::MAX;

// ── ScriptedVehicle ───────────────────────────────────────────────────────────

/// One vehicle in a scripted scenario.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptedVehicle {
    pub id:          VehicleId,
    pub category:    VehicleCategory,
    pub lane:        LaneId,
    /// First tick at which the vehicle is in the network.
    pub enter_tick:  Tick,
    /// Green ticks needed on its lane before it leaves.
    pub green_ticks: u32,
}

impl ScriptedVehicle {
    /// A vehicle present from tick 0 that leaves after one green tick.
    pub fn new(id: &str, category: VehicleCategory, lane: &str) -> Self {
        Self {
            id: VehicleId::from(id),
            category,
            lane: LaneId::from(lane),
            enter_tick: Tick::ZERO,
            green_ticks: 1,
        }
    }

    pub fn enters_at(mut self, tick: Tick) -> Self {
        self.enter_tick = tick;
        self
    }

    /// Green ticks before the vehicle leaves (at least one).
    pub fn clears_after(mut self, green_ticks: u32) -> Self {
        self.green_ticks = green_ticks.max(1);
        self
    }

    /// The vehicle never leaves the network.
    pub fn stuck(mut self) -> Self {
        self.green_ticks = NEVER_CLEARS;
        self
    }
}

/// A command the scripted simulator received, with the tick it arrived at.
#[derive(Clone, Debug, PartialEq)]
pub enum ScriptCommand {
    SetPhase {
        tick:  Tick,
        light: TrafficLightId,
        phase: usize,
    },
    SetPhaseDuration {
        tick:  Tick,
        light: TrafficLightId,
        secs:  f64,
    },
}

// ── Internal state ────────────────────────────────────────────────────────────

struct Light {
    id:             TrafficLightId,
    phases:         Vec<(SignalState, f64)>,
    current:        usize,
    remaining_secs: f64,
    /// Link index → lane.
    links:          Vec<LaneId>,
}

impl Light {
    fn state(&self) -> &SignalState {
        &self.phases[self.current].0
    }

    fn link_index(&self, lane: &LaneId) -> Option<usize> {
        self.links.iter().position(|l| l == lane)
    }

    fn enter_phase(&mut self, phase: usize) {
        self.current = phase;
        self.remaining_secs = self.phases[phase].1;
    }
}

struct VehicleState {
    plan:       ScriptedVehicle,
    green_left: u32,
    exited:     bool,
}

impl VehicleState {
    fn present_at(&self, tick: Tick) -> bool {
        !self.exited && self.plan.enter_tick <= tick
    }
}

// ── ScriptedSimulator ─────────────────────────────────────────────────────────

/// In-memory [`TrafficSimulator`].  Create via [`ScriptedSimulatorBuilder`].
pub struct ScriptedSimulator {
    clock:          SimClock,
    lights:         Vec<Light>,
    lanes:          HashMap<LaneId, u32>,
    vehicles:       Vec<VehicleState>,
    vanishing:      HashSet<VehicleId>,
    phase_override: HashMap<TrafficLightId, usize>,
    refused_phases: HashSet<(TrafficLightId, usize)>,
    commands:       Vec<ScriptCommand>,
    closed:         bool,
}

impl ScriptedSimulator {
    /// Commands received so far, oldest first.
    pub fn commands(&self) -> &[ScriptCommand] {
        &self.commands
    }

    /// The phase the light is really in, ignoring any misreport.
    pub fn actual_phase(&self, light: &TrafficLightId) -> Option<usize> {
        self.lights.iter().find(|l| l.id == *light).map(|l| l.current)
    }

    /// `true` once the vehicle has left the network.
    pub fn has_exited(&self, vehicle: &VehicleId) -> bool {
        self.vehicles
            .iter()
            .any(|v| v.plan.id == *vehicle && v.exited)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> SimulatorResult<()> {
        if self.closed { Err(SimulatorError::Closed) } else { Ok(()) }
    }

    fn light(&self, id: &TrafficLightId) -> SimulatorResult<&Light> {
        self.lights
            .iter()
            .find(|l| l.id == *id)
            .ok_or_else(|| SimulatorError::TrafficLightNotFound(id.clone()))
    }

    fn light_mut(&mut self, id: &TrafficLightId) -> SimulatorResult<&mut Light> {
        self.lights
            .iter_mut()
            .find(|l| l.id == *id)
            .ok_or_else(|| SimulatorError::TrafficLightNotFound(id.clone()))
    }

    fn present_vehicle(&self, id: &VehicleId) -> SimulatorResult<&VehicleState> {
        let now = self.clock.current_tick;
        if self.vanishing.contains(id) {
            return Err(SimulatorError::VehicleNotFound(id.clone()));
        }
        self.vehicles
            .iter()
            .find(|v| v.plan.id == *id && v.present_at(now))
            .ok_or_else(|| SimulatorError::VehicleNotFound(id.clone()))
    }

    /// `true` if `lane` shows green on the light controlling it.  Lanes no
    /// light controls are free-flowing.
    fn lane_flows(&self, lane: &LaneId) -> bool {
        let mut controlled = false;
        for light in &self.lights {
            if let Some(idx) = light.link_index(lane) {
                controlled = true;
                if light.state().is_green(idx) {
                    return true;
                }
            }
        }
        !controlled
    }
}

impl TrafficSimulator for ScriptedSimulator {
    fn step(&mut self) -> SimulatorResult<Tick> {
        self.ensure_open()?;
        let before = self.clock.current_tick;

        // Vehicles move on the signal shown during the step just taken.
        let flows: Vec<bool> = self
            .vehicles
            .iter()
            .map(|v| v.present_at(before) && self.lane_flows(&v.plan.lane))
            .collect();
        for (v, flows) in self.vehicles.iter_mut().zip(flows) {
            if flows && v.green_left != NEVER_CLEARS {
                v.green_left = v.green_left.saturating_sub(1);
                if v.green_left == 0 {
                    v.exited = true;
                }
            }
        }

        let step_secs = self.clock.step_secs();
        for light in &mut self.lights {
            light.remaining_secs -= step_secs;
            if light.remaining_secs <= 1e-9 {
                let next = (light.current + 1) % light.phases.len();
                light.enter_phase(next);
            }
        }

        Ok(self.clock.advance())
    }

    fn current_tick(&self) -> Tick {
        self.clock.current_tick
    }

    fn step_length_secs(&self) -> f64 {
        self.clock.step_secs()
    }

    fn has_pending_work(&mut self) -> SimulatorResult<bool> {
        self.ensure_open()?;
        Ok(self.vehicles.iter().any(|v| !v.exited))
    }

    fn close(&mut self) -> SimulatorResult<()> {
        self.closed = true;
        Ok(())
    }

    fn vehicle_ids(&mut self) -> SimulatorResult<Vec<VehicleId>> {
        self.ensure_open()?;
        let now = self.clock.current_tick;
        Ok(self
            .vehicles
            .iter()
            .filter(|v| v.present_at(now))
            .map(|v| v.plan.id.clone())
            .collect())
    }

    fn vehicle_category(&mut self, vehicle: &VehicleId) -> SimulatorResult<VehicleCategory> {
        self.ensure_open()?;
        Ok(self.present_vehicle(vehicle)?.plan.category)
    }

    fn vehicle_lane(&mut self, vehicle: &VehicleId) -> SimulatorResult<LaneId> {
        self.ensure_open()?;
        Ok(self.present_vehicle(vehicle)?.plan.lane.clone())
    }

    fn lane_link_index(
        &mut self,
        light: &TrafficLightId,
        lane:  &LaneId,
    ) -> SimulatorResult<Option<usize>> {
        self.ensure_open()?;
        Ok(self.light(light)?.link_index(lane))
    }

    fn lane_vehicle_count(&mut self, lane: &LaneId) -> SimulatorResult<u32> {
        self.ensure_open()?;
        let base = *self
            .lanes
            .get(lane)
            .ok_or_else(|| SimulatorError::LaneNotFound(lane.clone()))?;
        let now = self.clock.current_tick;
        let on_lane = self
            .vehicles
            .iter()
            .filter(|v| v.present_at(now) && v.plan.lane == *lane)
            .count() as u32;
        Ok(base + on_lane)
    }

    fn traffic_light_ids(&mut self) -> SimulatorResult<Vec<TrafficLightId>> {
        self.ensure_open()?;
        Ok(self.lights.iter().map(|l| l.id.clone()).collect())
    }

    fn phase(&mut self, light: &TrafficLightId) -> SimulatorResult<usize> {
        self.ensure_open()?;
        let actual = self.light(light)?.current;
        Ok(self.phase_override.get(light).copied().unwrap_or(actual))
    }

    fn set_phase(&mut self, light: &TrafficLightId, phase: usize) -> SimulatorResult<()> {
        self.ensure_open()?;
        let tick = self.clock.current_tick;
        if self.refused_phases.contains(&(light.clone(), phase)) {
            return Err(SimulatorError::Rejected(format!("traffic light {light} refused phase {phase}")));
        }
        let l = self.light_mut(light)?;
        if phase >= l.phases.len() {
            return Err(SimulatorError::PhaseOutOfRange {
                light: light.clone(),
                phase,
                count: l.phases.len(),
            });
        }
        l.enter_phase(phase);
        self.commands.push(ScriptCommand::SetPhase { tick, light: light.clone(), phase });
        Ok(())
    }

    fn set_phase_duration(&mut self, light: &TrafficLightId, secs: f64) -> SimulatorResult<()> {
        self.ensure_open()?;
        let tick = self.clock.current_tick;
        self.light_mut(light)?.remaining_secs = secs;
        self.commands.push(ScriptCommand::SetPhaseDuration { tick, light: light.clone(), secs });
        Ok(())
    }

    fn phase_count(&mut self, light: &TrafficLightId) -> SimulatorResult<usize> {
        self.ensure_open()?;
        Ok(self.light(light)?.phases.len())
    }

    fn signal_state(&mut self, light: &TrafficLightId) -> SimulatorResult<SignalState> {
        self.ensure_open()?;
        Ok(self.light(light)?.state().clone())
    }
}

// ── ScriptedSimulatorBuilder ──────────────────────────────────────────────────

/// Fluent builder for [`ScriptedSimulator`].
///
/// # Example
///
/// ```rust,ignore
/// let sim = ScriptedSimulatorBuilder::new()
///     .traffic_light("J1", [("GGrr", 30.0), ("yyrr", 3.0), ("rrGG", 30.0), ("rryy", 3.0)])
///     .controlled_lanes("J1", ["n_0", "n_1", "e_0", "e_1"])
///     .vehicle(ScriptedVehicle::new("ev0", VehicleCategory::Emergency, "e_0").clears_after(4))
///     .build()?;
/// ```
#[derive(Default)]
pub struct ScriptedSimulatorBuilder {
    step_ms:        Option<u32>,
    lights:         Vec<(TrafficLightId, Vec<(String, f64)>)>,
    links:          HashMap<TrafficLightId, Vec<LaneId>>,
    initial_phase:  HashMap<TrafficLightId, usize>,
    lanes:          Vec<(LaneId, u32)>,
    vehicles:       Vec<ScriptedVehicle>,
    vanishing:      HashSet<VehicleId>,
    phase_override: HashMap<TrafficLightId, usize>,
    refused_phases: HashSet<(TrafficLightId, usize)>,
}

impl ScriptedSimulatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step length in milliseconds.  Default: 1000.
    pub fn step_ms(mut self, step_ms: u32) -> Self {
        self.step_ms = Some(step_ms);
        self
    }

    /// Add a light with its phase program: `(state string, duration secs)`.
    pub fn traffic_light<'a>(
        mut self,
        id:     &str,
        phases: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> Self {
        let phases = phases.into_iter().map(|(s, d)| (s.to_owned(), d)).collect();
        self.lights.push((TrafficLightId::from(id), phases));
        self
    }

    /// Lanes controlled by `light`, in link-index order.  Lanes not yet
    /// declared are added with an empty base queue.
    pub fn controlled_lanes<'a>(
        mut self,
        light: &str,
        lanes: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let lanes: Vec<LaneId> = lanes.into_iter().map(LaneId::from).collect();
        for lane in &lanes {
            if !self.lanes.iter().any(|(l, _)| l == lane) {
                self.lanes.push((lane.clone(), 0));
            }
        }
        self.links.insert(TrafficLightId::from(light), lanes);
        self
    }

    /// Start `light` in `phase` instead of phase 0.
    pub fn initial_phase(mut self, light: &str, phase: usize) -> Self {
        self.initial_phase.insert(TrafficLightId::from(light), phase);
        self
    }

    /// Declare a lane with vehicles already queued on it beyond the scripted
    /// ones.
    pub fn lane(mut self, id: &str, base_queue: u32) -> Self {
        let id = LaneId::from(id);
        match self.lanes.iter_mut().find(|(l, _)| *l == id) {
            Some(slot) => slot.1 = base_queue,
            None => self.lanes.push((id, base_queue)),
        }
        self
    }

    pub fn vehicle(mut self, vehicle: ScriptedVehicle) -> Self {
        self.vehicles.push(vehicle);
        self
    }

    pub fn vehicles(mut self, vehicles: impl IntoIterator<Item = ScriptedVehicle>) -> Self {
        self.vehicles.extend(vehicles);
        self
    }

    /// The vehicle is listed but every lookup on it fails, as if it left
    /// between listing and query.
    pub fn vanishing_vehicle(mut self, id: &str) -> Self {
        self.vanishing.insert(VehicleId::from(id));
        self
    }

    /// `phase()` reports `phase` for `light` regardless of its real phase.
    pub fn misreport_phase(mut self, light: &str, phase: usize) -> Self {
        self.phase_override.insert(TrafficLightId::from(light), phase);
        self
    }

    /// `set_phase(light, phase)` fails with a rejected command.  The light's
    /// own cycling still enters the phase.
    pub fn reject_phase(mut self, light: &str, phase: usize) -> Self {
        self.refused_phases.insert((TrafficLightId::from(light), phase));
        self
    }

    /// Validate phase programs and return a simulator at tick 0.
    pub fn build(self) -> SimulatorResult<ScriptedSimulator> {
        let mut lights = Vec::with_capacity(self.lights.len());
        for (id, raw) in self.lights {
            if raw.is_empty() {
                return Err(SimulatorError::Rejected(format!("traffic light {id} has no phases")));
            }
            let mut phases = Vec::with_capacity(raw.len());
            for (state, secs) in raw {
                let parsed = SignalState::parse(&state).ok_or_else(|| {
                    SimulatorError::Rejected(format!("traffic light {id}: bad state {state:?}"))
                })?;
                if !(secs.is_finite() && secs > 0.0) {
                    return Err(SimulatorError::Rejected(format!(
                        "traffic light {id}: phase duration must be positive, got {secs}"
                    )));
                }
                phases.push((parsed, secs));
            }
            let start = self.initial_phase.get(&id).copied().unwrap_or(0);
            if start >= phases.len() {
                return Err(SimulatorError::PhaseOutOfRange {
                    light: id,
                    phase: start,
                    count: phases.len(),
                });
            }
            let links = self.links.get(&id).cloned().unwrap_or_default();
            let mut light = Light { id, phases, current: 0, remaining_secs: 0.0, links };
            light.enter_phase(start);
            lights.push(light);
        }

        let mut lanes: HashMap<LaneId, u32> = self.lanes.into_iter().collect();
        for v in &self.vehicles {
            lanes.entry(v.lane.clone()).or_insert(0);
        }

        let vehicles = self
            .vehicles
            .into_iter()
            .map(|plan| VehicleState { green_left: plan.green_ticks, plan, exited: false })
            .collect();

        Ok(ScriptedSimulator {
            clock: SimClock::new(self.step_ms.unwrap_or(1_000)),
            lights,
            lanes,
            vehicles,
            vanishing: self.vanishing,
            phase_override: self.phase_override,
            refused_phases: self.refused_phases,
            commands: Vec::new(),
            closed: false,
        })
    }
}
