//! The `TrafficSimulator` trait: the capability surface the core consumes.

use sp_core::{LaneId, SignalState, Tick, TrafficLightId, VehicleCategory, VehicleId};

use crate::SimulatorResult;

/// An external traffic simulation advanced in discrete steps.
///
/// Query methods take `&mut self` because a networked implementation must
/// write to its connection to answer them.
///
/// # Required methods
///
/// Everything except [`emergency_vehicle_present`][Self::emergency_vehicle_present],
/// which has a default built on the vehicle queries.
///
/// # Example
///
/// ```rust,ignore
/// while sim.has_pending_work()? {
///     let tick = sim.step()?;
///     for v in sim.vehicle_ids()? {
///         if sim.vehicle_category(&v)?.is_emergency() { /* … */ }
///     }
/// }
/// sim.close()?;
/// ```
pub trait TrafficSimulator {
    // ── Time ──────────────────────────────────────────────────────────────

    /// Advance the simulation by one step and return the new tick.
    fn step(&mut self) -> SimulatorResult<Tick>;

    /// Ticks stepped so far in this session.
    fn current_tick(&self) -> Tick;

    /// Simulated seconds covered by one step.
    fn step_length_secs(&self) -> f64;

    /// `true` while vehicles are in the network or still scheduled to enter.
    fn has_pending_work(&mut self) -> SimulatorResult<bool>;

    /// End the session.  Idempotent.
    fn close(&mut self) -> SimulatorResult<()>;

    // ── Vehicles ──────────────────────────────────────────────────────────

    /// Vehicles currently in the network, in simulator order.
    fn vehicle_ids(&mut self) -> SimulatorResult<Vec<VehicleId>>;

    fn vehicle_category(&mut self, vehicle: &VehicleId) -> SimulatorResult<VehicleCategory>;

    fn vehicle_lane(&mut self, vehicle: &VehicleId) -> SimulatorResult<LaneId>;

    /// `true` if any emergency vehicle is anywhere in the network.
    ///
    /// Vehicles that vanish between listing and lookup are skipped.
    fn emergency_vehicle_present(&mut self) -> SimulatorResult<bool> {
        for vehicle in self.vehicle_ids()? {
            match self.vehicle_category(&vehicle) {
                Ok(category) if category.is_emergency() => return Ok(true),
                Ok(_) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::debug!(%vehicle, error = %e, "skipping vehicle in clearance check");
                }
            }
        }
        Ok(false)
    }

    // ── Lanes ─────────────────────────────────────────────────────────────

    /// Index of `lane` within `light`'s signal-state string, or `None` if the
    /// light does not control the lane.
    fn lane_link_index(
        &mut self,
        light: &TrafficLightId,
        lane:  &LaneId,
    ) -> SimulatorResult<Option<usize>>;

    /// Vehicles on `lane` during the last step.
    fn lane_vehicle_count(&mut self, lane: &LaneId) -> SimulatorResult<u32>;

    // ── Traffic lights ────────────────────────────────────────────────────

    fn traffic_light_ids(&mut self) -> SimulatorResult<Vec<TrafficLightId>>;

    fn phase(&mut self, light: &TrafficLightId) -> SimulatorResult<usize>;

    fn set_phase(&mut self, light: &TrafficLightId, phase: usize) -> SimulatorResult<()>;

    /// Remaining duration of the current phase, in seconds.
    fn set_phase_duration(&mut self, light: &TrafficLightId, secs: f64) -> SimulatorResult<()>;

    fn phase_count(&mut self, light: &TrafficLightId) -> SimulatorResult<usize>;

    fn signal_state(&mut self, light: &TrafficLightId) -> SimulatorResult<SignalState>;
}
