//! `sp-core` — foundational types for the signal-preemption workspace.
//!
//! This crate is a dependency of every other `sp-*` crate.  It intentionally
//! has no `sp-*` dependencies.
//!
//! # What lives here
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`ids`]      | `TrafficLightId`, `LaneId`, `VehicleId`                   |
//! | [`time`]     | `Tick`, `SimClock`                                        |
//! | [`signal`]   | `SignalColor`, `SignalState` (one char per link)          |
//! | [`vehicle`]  | `VehicleCategory` enum                                    |
//! | [`config`]   | `AppConfig` and its sections, TOML loading                |
//! | [`rng`]      | `SimRng` (seeded scenario generation)                     |
//! | [`error`]    | `CoreError`, `CoreResult`                                 |

pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod signal;
pub mod time;
pub mod vehicle;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{AppConfig, OutputConfig, PreemptionConfig, Rendering, SimulationConfig};
pub use error::{CoreError, CoreResult};
pub use ids::{LaneId, TrafficLightId, VehicleId};
pub use rng::SimRng;
pub use signal::{SignalColor, SignalState};
pub use time::{SimClock, Tick};
pub use vehicle::VehicleCategory;
