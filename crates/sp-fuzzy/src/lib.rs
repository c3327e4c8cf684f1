//! `sp-fuzzy` — Mamdani fuzzy inference for green-time recommendation.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                      |
//! |----------------|---------------------------------------------------------------|
//! | [`membership`] | `MembershipFunction` (triangular)                             |
//! | [`variable`]   | `LinguisticVariable`: universe plus labelled sets            |
//! | [`rule`]       | `Rule`: conjunctive antecedent, single consequent            |
//! | [`engine`]     | `MamdaniEngine`, `EngineBuilder`                              |
//! | [`green_time`] | `FuzzyInferenceEngine`: the fixed queue × urgency system     |
//! | [`error`]      | `InferenceError`, `InferenceResult<T>`                        |
//!
//! # Inference pipeline
//!
//! ```text
//! crisp inputs ─clamp─▶ fuzzify ─min─▶ firing strengths
//!     ─clip+max─▶ aggregated curve on a fixed grid ─centroid─▶ crisp output
//! ```
//!
//! The engine is an immutable value: build it once at startup and pass a
//! reference to whoever needs a recommendation.

pub mod engine;
pub mod error;
pub mod green_time;
pub mod membership;
pub mod rule;
pub mod variable;


pub use engine::{EngineBuilder, MamdaniEngine};
pub use error::{InferenceError, InferenceResult};
pub use green_time::FuzzyInferenceEngine;
pub use membership::MembershipFunction;
pub use rule::Rule;
pub use variable::LinguisticVariable;
