//! Per-tick search for an emergency vehicle held at red.

use sp_core::{SignalState, TrafficLightId, VehicleId};
use sp_sim::{SimulatorResult, TrafficSimulator};

use crate::PreemptionRequest;

/// What one scan saw.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScanReport {
    /// Vehicles listed by the simulator this tick.
    pub vehicles: usize,
    /// Vehicles whose lookups failed and were skipped.
    pub skipped:  usize,
    /// The first emergency vehicle found waiting at red, if any.
    pub request:  Option<PreemptionRequest>,
}

/// Scans the network for emergency vehicles stopped at red on lanes of one
/// traffic light.
///
/// Only the character at the lane's link index is consulted, and only `r`
/// counts as red.  Vehicles on lanes the light does not control are ignored.
#[derive(Clone, Debug)]
pub struct DetectionScanner {
    light:   TrafficLightId,
    urgency: f64,
}

impl DetectionScanner {
    /// `urgency` is clamped to [0, 1].
    pub fn new(light: TrafficLightId, urgency: f64) -> Self {
        let urgency = if urgency.is_finite() { urgency.clamp(0.0, 1.0) } else { 1.0 };
        Self { light, urgency }
    }

    pub fn light(&self) -> &TrafficLightId {
        &self.light
    }

    pub fn urgency(&self) -> f64 {
        self.urgency
    }

    /// Inspect every vehicle in simulator order and stop at the first match.
    ///
    /// Per-vehicle lookup failures are logged and skipped; only fatal
    /// simulator errors and a failed signal-state read abort the scan.
    pub fn scan<S>(&self, sim: &mut S) -> SimulatorResult<ScanReport>
    where
        S: TrafficSimulator + ?Sized,
    {
        let state = sim.signal_state(&self.light)?;
        let vehicles = sim.vehicle_ids()?;
        let mut report = ScanReport { vehicles: vehicles.len(), ..ScanReport::default() };

        for vehicle in &vehicles {
            match self.inspect(sim, vehicle, &state) {
                Ok(Some(request)) => {
                    tracing::debug!(
                        %vehicle,
                        lane = %request.lane,
                        queue = request.queue_length,
                        "emergency vehicle waiting at red"
                    );
                    report.request = Some(request);
                    break;
                }
                Ok(None) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!(%vehicle, error = %e, "skipping vehicle");
                    report.skipped += 1;
                }
            }
        }
        Ok(report)
    }

    fn inspect<S>(
        &self,
        sim:     &mut S,
        vehicle: &VehicleId,
        state:   &SignalState,
    ) -> SimulatorResult<Option<PreemptionRequest>>
    where
        S: TrafficSimulator + ?Sized,
    {
        if !sim.vehicle_category(vehicle)?.is_emergency() {
            return Ok(None);
        }
        let lane = sim.vehicle_lane(vehicle)?;
        let Some(link) = sim.lane_link_index(&self.light, &lane)? else {
            return Ok(None);
        };
        if !state.is_red(link) {
            return Ok(None);
        }
        let queue_length = sim.lane_vehicle_count(&lane)?;
        Ok(Some(PreemptionRequest {
            traffic_light: self.light.clone(),
            lane,
            vehicle: vehicle.clone(),
            queue_length,
            urgency: self.urgency,
        }))
    }
}
