//! `sp-sim` — the simulator capability seam.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                       |
//! |---------------|----------------------------------------------------------------|
//! | [`simulator`] | `TrafficSimulator` trait: everything the core asks of a sim   |
//! | [`scripted`]  | `ScriptedSimulator` + builder: deterministic in-memory junction |
//! | [`error`]     | `SimulatorError`, `SimulatorResult<T>`                         |
//!
//! # Design notes
//!
//! The preemption core never talks to a concrete simulator.  It drives a
//! `&mut impl TrafficSimulator`, so the same state machine runs against the
//! TCP client in `sp-traci` and against `ScriptedSimulator` in tests and
//! offline demos.

pub mod error;
pub mod scripted;
pub mod simulator;

#[cfg(test)]
mod tests;

pub use error::{SimulatorError, SimulatorResult};
pub use scripted::{ScriptCommand, ScriptedSimulator, ScriptedSimulatorBuilder, ScriptedVehicle};
pub use simulator::TrafficSimulator;
