//! The queue × urgency → green-time system used for preemption.

use crate::{EngineBuilder, InferenceResult, LinguisticVariable, MamdaniEngine, MembershipFunction, Rule};

pub const QUEUE: &str = "queue";
pub const URGENCY: &str = "urgency";
pub const GREEN_TIME: &str = "green_time";

/// Output label whose centroid serves as the conservative fallback.
const FALLBACK_LABEL: &str = "medium";

/// `(queue, urgency) → green_time`, one entry per rule.
const RULE_TABLE: [(&str, &str, &str); 9] = [
    ("low", "low", "short"),
    ("low", "medium", "medium"),
    ("low", "high", "long"),
    ("medium", "low", "medium"),
    ("medium", "medium", "long"),
    ("medium", "high", "very_long"),
    ("high", "low", "long"),
    ("high", "medium", "very_long"),
    ("high", "high", "very_long"),
];

/// Recommends an emergency green duration from lane queue length and
/// declared urgency.
///
/// Inputs: `queue` on [0, 50] vehicles, `urgency` on [0, 1].
/// Output: `green_time` on [0, 60] seconds.
#[derive(Debug, Clone)]
pub struct FuzzyInferenceEngine {
    engine: MamdaniEngine,
}

impl FuzzyInferenceEngine {
    /// Build the fixed nine-rule system.
    pub fn green_time() -> InferenceResult<Self> {
        let queue = LinguisticVariable::new(QUEUE, 0.0, 50.0)
            .with_set("low", MembershipFunction::triangular(0.0, 0.0, 15.0))
            .with_set("medium", MembershipFunction::triangular(10.0, 25.0, 40.0))
            .with_set("high", MembershipFunction::triangular(30.0, 50.0, 50.0));

        let urgency = LinguisticVariable::new(URGENCY, 0.0, 1.0)
            .with_set("low", MembershipFunction::triangular(0.0, 0.0, 0.4))
            .with_set("medium", MembershipFunction::triangular(0.2, 0.5, 0.8))
            .with_set("high", MembershipFunction::triangular(0.6, 1.0, 1.0));

        let green_time = LinguisticVariable::new(GREEN_TIME, 0.0, 60.0)
            .with_set("short", MembershipFunction::triangular(0.0, 10.0, 20.0))
            .with_set("medium", MembershipFunction::triangular(15.0, 25.0, 35.0))
            .with_set("long", MembershipFunction::triangular(30.0, 45.0, 55.0))
            .with_set("very_long", MembershipFunction::triangular(50.0, 60.0, 60.0));

        let rules = RULE_TABLE
            .iter()
            .map(|&(q, u, g)| Rule::new([(QUEUE, q), (URGENCY, u)], (GREEN_TIME, g)));

        let engine = EngineBuilder::new()
            .input(queue)
            .input(urgency)
            .output(green_time)
            .rules(rules)
            .build()?;
        Ok(Self { engine })
    }

    /// Wrap an arbitrary two-input engine whose inputs are (queue, urgency).
    pub fn from_engine(engine: MamdaniEngine) -> Self {
        Self { engine }
    }

    /// Recommended green duration in seconds.
    pub fn evaluate(&self, queue: f64, urgency: f64) -> InferenceResult<f64> {
        self.engine.infer(&[queue, urgency])
    }

    /// Centroid of the output's `medium` set, if it has one.
    pub fn fallback_green(&self) -> Option<f64> {
        self.engine.output_centroid(FALLBACK_LABEL)
    }

    pub fn engine(&self) -> &MamdaniEngine {
        &self.engine
    }
}
