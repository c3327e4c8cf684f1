//! Plain data row types written by output backends.

use serde::Serialize;
use sp_preempt::{ScanReport, SessionReport};
use sp_core::Tick;

/// Column order of `sessions.csv`.
pub const SESSION_HEADERS: [&str; 15] = [
    "traffic_light",
    "vehicle",
    "lane",
    "opened_at",
    "closed_at",
    "original_phase",
    "phase_count",
    "queue_length",
    "urgency",
    "green_secs",
    "used_fallback",
    "outcome",
    "clearance_ticks",
    "restored_phase",
    "error",
];

/// Column order of `tick_summaries.csv`.
pub const TICK_SUMMARY_HEADERS: [&str; 4] = ["tick", "vehicles", "skipped", "request_vehicle"];

/// One preemption session, however it ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRow {
    pub traffic_light:   String,
    pub vehicle:         String,
    pub lane:            String,
    pub opened_at:       u64,
    pub closed_at:       u64,
    pub original_phase:  usize,
    pub phase_count:     usize,
    pub queue_length:    u32,
    pub urgency:         f64,
    pub green_secs:      f64,
    /// Written as `0`/`1`.
    pub used_fallback:   u8,
    pub outcome:         &'static str,
    pub clearance_ticks: u64,
    /// Empty when the machine never set a phase.
    pub restored_phase:  Option<usize>,
    pub error:           Option<String>,
}

impl From<&SessionReport> for SessionRow {
    fn from(report: &SessionReport) -> Self {
        let s = &report.session;
        Self {
            traffic_light:   s.traffic_light.to_string(),
            vehicle:         s.vehicle.to_string(),
            lane:            s.lane.to_string(),
            opened_at:       s.opened_at.0,
            closed_at:       report.closed_at.0,
            original_phase:  s.original_phase,
            phase_count:     s.phase_count,
            queue_length:    s.queue_length,
            urgency:         s.urgency,
            green_secs:      s.green_secs,
            used_fallback:   s.used_fallback as u8,
            outcome:         report.outcome.as_str(),
            clearance_ticks: report.clearance_ticks,
            restored_phase:  report.restored_phase,
            error:           report.error.clone(),
        }
    }
}

/// What the control loop saw on one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickSummaryRow {
    pub tick:            u64,
    pub vehicles:        u64,
    pub skipped:         u64,
    /// The emergency vehicle that raised a request, if any.
    pub request_vehicle: Option<String>,
}

impl TickSummaryRow {
    pub fn new(tick: Tick, scan: &ScanReport) -> Self {
        Self {
            tick:            tick.0,
            vehicles:        scan.vehicles as u64,
            skipped:         scan.skipped as u64,
            request_vehicle: scan.request.as_ref().map(|r| r.vehicle.to_string()),
        }
    }
}
