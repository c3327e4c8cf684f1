use sp_core::{LaneId, TrafficLightId, VehicleId};

/// An emergency vehicle waiting at red, as found by one scan.
#[derive(Clone, Debug, PartialEq)]
pub struct PreemptionRequest {
    pub traffic_light: TrafficLightId,
    pub lane:          LaneId,
    pub vehicle:       VehicleId,
    /// Vehicles on the lane during the last step, the emergency vehicle
    /// included.
    pub queue_length:  u32,
    /// Declared urgency in [0, 1].
    pub urgency:       f64,
}
