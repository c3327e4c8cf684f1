//! `TrafficSimulator` backed by a live TraCI connection.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::process::Child;

use sp_core::{LaneId, SignalState, SimClock, Tick, TrafficLightId, VehicleCategory, VehicleId};
use sp_sim::{SimulatorError, SimulatorResult, TrafficSimulator};

use crate::constants::*;
use crate::{TraciClient, TraciError, TraciResult, TraciValue};

/// A SUMO session seen through the [`TrafficSimulator`] trait.
///
/// Controlled-lane lists are fetched once per light and cached; they do not
/// change while a program runs.
pub struct TraciSimulator<S: Read + Write = TcpStream> {
    client:           TraciClient<S>,
    child:            Option<Child>,
    clock:            SimClock,
    controlled_lanes: HashMap<TrafficLightId, Vec<LaneId>>,
    closed:           bool,
}

impl<S: Read + Write> TraciSimulator<S> {
    /// Handshake on an open stream and read the step length.
    pub fn connect(stream: S) -> TraciResult<Self> {
        let mut client = TraciClient::new(stream);
        let (api, identifier) = client.version()?;
        tracing::info!(api, %identifier, "connected to TraCI server");

        let step_secs = client
            .get(CMD_GET_SIM_VARIABLE, VAR_DELTA_T, "")
            .and_then(delta_t_secs)?;
        tracing::debug!(step_secs, "simulation step length");

        Ok(Self {
            client,
            child: None,
            clock: SimClock::from_step_secs(step_secs),
            controlled_lanes: HashMap::new(),
            closed: false,
        })
    }

    /// Attach the simulator process so `close` can reap it.
    pub fn with_child(mut self, child: Child) -> Self {
        self.child = Some(child);
        self
    }

    pub fn client(&self) -> &TraciClient<S> {
        &self.client
    }

    fn open(&mut self) -> SimulatorResult<&mut TraciClient<S>> {
        if self.closed {
            return Err(SimulatorError::Closed);
        }
        Ok(&mut self.client)
    }

    fn get(&mut self, domain: u8, var: u8, object: &str) -> TraciResult<TraciValue> {
        if self.closed {
            return Err(TraciError::Closed);
        }
        self.client.get(domain, var, object)
    }

    fn light_lanes(&mut self, light: &TrafficLightId) -> SimulatorResult<&[LaneId]> {
        if !self.controlled_lanes.contains_key(light) {
            let lanes = self
                .get(CMD_GET_TL_VARIABLE, TL_CONTROLLED_LANES, light.as_str())
                .and_then(TraciValue::into_string_list)
                .map_err(|e| or_missing(e, || SimulatorError::TrafficLightNotFound(light.clone())))?;
            self.controlled_lanes
                .insert(light.clone(), lanes.into_iter().map(LaneId::from).collect());
        }
        Ok(self.controlled_lanes.get(light).map(Vec::as_slice).unwrap_or_default())
    }
}

/// Map a rejected command onto the "unknown object" error for its domain.
/// Everything else keeps its generic mapping.
fn or_missing(e: TraciError, missing: impl FnOnce() -> SimulatorError) -> SimulatorError {
    match e {
        TraciError::CommandFailed { .. } => missing(),
        other => other.into(),
    }
}

/// Step length in seconds.  Current servers send a double in seconds; older
/// ones an int in milliseconds.
fn delta_t_secs(value: TraciValue) -> TraciResult<f64> {
    match value {
        TraciValue::Int(ms) => Ok(ms as f64 / 1_000.0),
        other => other.into_f64(),
    }
}

/// Number of phases in `program` within a complete RYG definition.
///
/// The definition is a compound of logics, each
/// `(programID, type, currentPhase, phases, parameters)`.  The logic whose id
/// matches `program` wins; otherwise the first one.
pub fn phases_in_program(definition: TraciValue, program: &str) -> TraciResult<usize> {
    let logics = definition.into_compound()?;
    let mut first = None;
    for logic in logics {
        let fields = logic.into_compound()?;
        if fields.len() < 4 {
            return Err(TraciError::Malformed(format!(
                "program logic has {} fields, expected at least 4",
                fields.len()
            )));
        }
        let matches = fields[0].as_str() == Some(program);
        let phases = match &fields[3] {
            TraciValue::Compound(p) => p.len(),
            _ => return Err(TraciError::Malformed("program phases are not a compound".into())),
        };
        if matches {
            return Ok(phases);
        }
        first.get_or_insert(phases);
    }
    first.ok_or_else(|| TraciError::Malformed("traffic light has no program logic".into()))
}

impl<S: Read + Write> TrafficSimulator for TraciSimulator<S> {
    fn step(&mut self) -> SimulatorResult<Tick> {
        self.open()?.simulation_step()?;
        Ok(self.clock.advance())
    }

    fn current_tick(&self) -> Tick {
        self.clock.current_tick
    }

    fn step_length_secs(&self) -> f64 {
        self.clock.step_secs()
    }

    fn has_pending_work(&mut self) -> SimulatorResult<bool> {
        let expected = self
            .get(CMD_GET_SIM_VARIABLE, VAR_MIN_EXPECTED_VEHICLES, "")?
            .into_int()?;
        Ok(expected > 0)
    }

    fn close(&mut self) -> SimulatorResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let result = self.client.close();
        if let Some(mut child) = self.child.take() {
            match child.wait() {
                Ok(status) => tracing::debug!(%status, "SUMO exited"),
                Err(e) => tracing::warn!(error = %e, "could not reap SUMO process"),
            }
        }
        result.map_err(SimulatorError::from)
    }

    fn vehicle_ids(&mut self) -> SimulatorResult<Vec<VehicleId>> {
        let ids = self.get(CMD_GET_VEHICLE_VARIABLE, ID_LIST, "")?.into_string_list()?;
        Ok(ids.into_iter().map(VehicleId::from).collect())
    }

    fn vehicle_category(&mut self, vehicle: &VehicleId) -> SimulatorResult<VehicleCategory> {
        let class = self
            .get(CMD_GET_VEHICLE_VARIABLE, VAR_VEHICLECLASS, vehicle.as_str())
            .and_then(TraciValue::into_string)
            .map_err(|e| or_missing(e, || SimulatorError::VehicleNotFound(vehicle.clone())))?;
        Ok(VehicleCategory::from_vehicle_class(&class))
    }

    fn vehicle_lane(&mut self, vehicle: &VehicleId) -> SimulatorResult<LaneId> {
        let lane = self
            .get(CMD_GET_VEHICLE_VARIABLE, VAR_LANE_ID, vehicle.as_str())
            .and_then(TraciValue::into_string)
            .map_err(|e| or_missing(e, || SimulatorError::VehicleNotFound(vehicle.clone())))?;
        Ok(LaneId::from(lane))
    }

    fn lane_link_index(
        &mut self,
        light: &TrafficLightId,
        lane:  &LaneId,
    ) -> SimulatorResult<Option<usize>> {
        self.open()?;
        Ok(self.light_lanes(light)?.iter().position(|l| l == lane))
    }

    fn lane_vehicle_count(&mut self, lane: &LaneId) -> SimulatorResult<u32> {
        let n = self
            .get(CMD_GET_LANE_VARIABLE, LAST_STEP_VEHICLE_NUMBER, lane.as_str())
            .and_then(TraciValue::into_int)
            .map_err(|e| or_missing(e, || SimulatorError::LaneNotFound(lane.clone())))?;
        u32::try_from(n).map_err(|_| SimulatorError::Protocol(format!("lane {lane}: vehicle count {n}")))
    }

    fn traffic_light_ids(&mut self) -> SimulatorResult<Vec<TrafficLightId>> {
        let ids = self.get(CMD_GET_TL_VARIABLE, ID_LIST, "")?.into_string_list()?;
        Ok(ids.into_iter().map(TrafficLightId::from).collect())
    }

    fn phase(&mut self, light: &TrafficLightId) -> SimulatorResult<usize> {
        let p = self
            .get(CMD_GET_TL_VARIABLE, TL_CURRENT_PHASE, light.as_str())
            .and_then(TraciValue::into_int)
            .map_err(|e| or_missing(e, || SimulatorError::TrafficLightNotFound(light.clone())))?;
        // A negative index surfaces as out of range rather than a wire error.
        Ok(usize::try_from(p).unwrap_or(usize::MAX))
    }

    fn set_phase(&mut self, light: &TrafficLightId, phase: usize) -> SimulatorResult<()> {
        let index = i32::try_from(phase).map_err(|_| SimulatorError::PhaseOutOfRange {
            light: light.clone(),
            phase,
            count: i32::MAX as usize,
        })?;
        self.open()?
            .set(CMD_SET_TL_VARIABLE, TL_PHASE_INDEX, light.as_str(), &TraciValue::Int(index))?;
        Ok(())
    }

    fn set_phase_duration(&mut self, light: &TrafficLightId, secs: f64) -> SimulatorResult<()> {
        self.open()?
            .set(CMD_SET_TL_VARIABLE, TL_PHASE_DURATION, light.as_str(), &TraciValue::Double(secs))?;
        Ok(())
    }

    fn phase_count(&mut self, light: &TrafficLightId) -> SimulatorResult<usize> {
        let missing = || SimulatorError::TrafficLightNotFound(light.clone());
        let program = self
            .get(CMD_GET_TL_VARIABLE, TL_CURRENT_PROGRAM, light.as_str())
            .and_then(TraciValue::into_string)
            .map_err(|e| or_missing(e, missing))?;
        let definition = self
            .get(CMD_GET_TL_VARIABLE, TL_COMPLETE_DEFINITION_RYG, light.as_str())
            .map_err(|e| or_missing(e, missing))?;
        Ok(phases_in_program(definition, &program)?)
    }

    fn signal_state(&mut self, light: &TrafficLightId) -> SimulatorResult<SignalState> {
        let raw = self
            .get(CMD_GET_TL_VARIABLE, TL_RED_YELLOW_GREEN_STATE, light.as_str())
            .and_then(TraciValue::into_string)
            .map_err(|e| or_missing(e, || SimulatorError::TrafficLightNotFound(light.clone())))?;
        SignalState::parse(&raw)
            .ok_or_else(|| SimulatorError::Protocol(format!("light {light}: bad signal state {raw:?}")))
    }
}
