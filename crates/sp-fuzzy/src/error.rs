use thiserror::Error;

/// Errors raised while building or evaluating a fuzzy system.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InferenceError {
    /// The aggregated output curve is zero everywhere, so the centroid
    /// denominator is zero.
    #[error("no rule fired for inputs {inputs:?}: aggregated membership is empty")]
    NoRuleFired { inputs: Vec<f64> },

    #[error("input {variable} is not a finite number ({value})")]
    NonFiniteInput { variable: String, value: f64 },

    #[error("expected {expected} crisp inputs, got {got}")]
    InputArity { expected: usize, got: usize },

    #[error("rule references unknown variable {0:?}")]
    UnknownVariable(String),

    #[error("variable {variable:?} has no set labelled {label:?}")]
    UnknownLabel { variable: String, label: String },

    #[error("set {label:?} of {variable:?} has invalid breakpoints [{a}, {b}, {c}]")]
    InvalidMembership {
        variable: String,
        label:    String,
        a:        f64,
        b:        f64,
        c:        f64,
    },

    #[error("variable {variable:?} has an invalid universe [{lo}, {hi}]")]
    InvalidUniverse { variable: String, lo: f64, hi: f64 },

    #[error("defuzzification step must be positive and finite, got {0}")]
    InvalidResolution(f64),

    #[error("defuzzification step {step} needs more than {max} grid intervals")]
    ResolutionTooFine { step: f64, max: usize },

    #[error("fuzzy system has no output variable")]
    MissingOutput,

    #[error("fuzzy system has no rules")]
    NoRules,
}

/// Alias for `Result<T, InferenceError>`.
pub type InferenceResult<T> = Result<T, InferenceError>;
