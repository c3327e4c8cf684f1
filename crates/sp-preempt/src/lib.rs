//! `sp-preempt` — emergency-vehicle signal preemption.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`request`]  | `PreemptionRequest`: one detected emergency at red          |
//! | [`scanner`]  | `DetectionScanner`, `ScanReport`                             |
//! | [`session`]  | `PreemptionState`, `PreemptionSession`, `SessionReport`      |
//! | [`machine`]  | `PreemptionStateMachine`: clearance, green, wait, restore   |
//! | [`control`]  | `ControlLoop`, `ControlLoopBuilder`, `RunSummary`            |
//! | [`observer`] | `PreemptionObserver` hooks, `NoopObserver`                   |
//! | [`error`]    | `PreemptError`, `PreemptResult<T>`                           |
//!
//! # Control flow
//!
//! ```text
//! while simulator has pending work:
//!   step ─▶ scan ─▶ request? ─▶ begin session ─▶ drive to Normal
//!                                   │                  │
//!                             green time from     all waits are
//!                           FuzzyInferenceEngine  simulator steps
//! close simulator
//! ```
//!
//! Sessions run synchronously inside the loop iteration that detected them.
//! Everything is generic over [`sp_sim::TrafficSimulator`], so the same code
//! drives SUMO over TraCI and the scripted in-memory junction.

pub mod control;
pub mod error;
pub mod machine;
pub mod observer;
pub mod request;
pub mod scanner;
pub mod session;


pub use control::{ControlLoop, ControlLoopBuilder, RunSummary};
pub use error::{PreemptError, PreemptResult};
pub use machine::PreemptionStateMachine;
pub use observer::{NoopObserver, PreemptionObserver};
pub use request::PreemptionRequest;
pub use scanner::{DetectionScanner, ScanReport};
pub use session::{PreemptionSession, PreemptionState, SessionOutcome, SessionReport};
