//! Mamdani inference engine and its builder.

use crate::rule::CompiledRule;
use crate::{InferenceError, InferenceResult, LinguisticVariable, Rule};

/// Default defuzzification grid step.
pub const DEFAULT_RESOLUTION: f64 = 0.1;

/// Most intervals a defuzzification grid may have.
pub const MAX_GRID_INTERVALS: usize = 1_000_000;

/// Aggregated membership below this sum is treated as empty.
const EMPTY_AREA: f64 = 1e-12;

// ── MamdaniEngine ─────────────────────────────────────────────────────────────

/// A validated Mamdani system: min for AND and implication, max for
/// aggregation, centroid defuzzification on a fixed grid.
///
/// Immutable once built; [`infer`][Self::infer] takes `&self` and has no side
/// effects.  Create via [`EngineBuilder`].
#[derive(Debug, Clone)]
pub struct MamdaniEngine {
    inputs:   Vec<LinguisticVariable>,
    output:   LinguisticVariable,
    rules:    Vec<Rule>,
    compiled: Vec<CompiledRule>,

    /// Sample points of the output universe, `lo..=hi`.
    grid:   Vec<f64>,
    /// `curves[s][i]` = degree of `grid[i]` in output set `s`.
    curves: Vec<Vec<f64>>,
}

impl MamdaniEngine {
    /// Run inference on crisp inputs given in the order the inputs were
    /// registered with the builder.
    ///
    /// Inputs outside a variable's universe are clamped to it.  Returns
    /// [`InferenceError::NoRuleFired`] if the aggregated curve is empty.
    pub fn infer(&self, crisp: &[f64]) -> InferenceResult<f64> {
        let strengths = self.firing_strengths(crisp)?;

        // max over rules sharing a consequent: min(s, μ) is monotone in s, so
        // clipping each set at its strongest rule equals max-of-clips.
        let mut per_set = vec![0.0_f64; self.output.set_count()];
        for (rule, s) in self.compiled.iter().zip(&strengths) {
            let slot = &mut per_set[rule.consequent];
            *slot = slot.max(*s);
        }

        let mut num = 0.0;
        let mut den = 0.0;
        for (i, &x) in self.grid.iter().enumerate() {
            let mu = per_set
                .iter()
                .zip(&self.curves)
                .map(|(&s, curve)| s.min(curve[i]))
                .fold(0.0_f64, f64::max);
            num += x * mu;
            den += mu;
        }

        if den <= EMPTY_AREA {
            return Err(InferenceError::NoRuleFired { inputs: crisp.to_vec() });
        }
        Ok((num / den).clamp(self.output.lo, self.output.hi))
    }

    /// Firing strength of every rule, in rule order.
    pub fn firing_strengths(&self, crisp: &[f64]) -> InferenceResult<Vec<f64>> {
        if crisp.len() != self.inputs.len() {
            return Err(InferenceError::InputArity {
                expected: self.inputs.len(),
                got:      crisp.len(),
            });
        }

        let mut degrees = Vec::with_capacity(self.inputs.len());
        for (var, &x) in self.inputs.iter().zip(crisp) {
            if !x.is_finite() {
                return Err(InferenceError::NonFiniteInput {
                    variable: var.name.clone(),
                    value:    x,
                });
            }
            degrees.push(var.fuzzify(x));
        }

        Ok(self
            .compiled
            .iter()
            .map(|rule| {
                rule.antecedents
                    .iter()
                    .map(|&(v, s)| degrees[v][s])
                    .fold(1.0_f64, f64::min)
            })
            .collect())
    }

    /// Centroid of an unclipped output set, e.g. as a fallback value.
    pub fn output_centroid(&self, label: &str) -> Option<f64> {
        self.output.set(label).map(|f| f.centroid())
    }

    pub fn inputs(&self) -> &[LinguisticVariable] {
        &self.inputs
    }

    pub fn output(&self) -> &LinguisticVariable {
        &self.output
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of sample points used for defuzzification.
    pub fn grid_len(&self) -> usize {
        self.grid.len()
    }
}

// ── EngineBuilder ─────────────────────────────────────────────────────────────

/// Fluent builder for [`MamdaniEngine`].
///
/// ```rust,ignore
/// let engine = EngineBuilder::new()
///     .input(queue)
///     .input(urgency)
///     .output(green_time)
///     .rule(Rule::new([("queue", "low"), ("urgency", "low")], ("green_time", "short")))
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    inputs:     Vec<LinguisticVariable>,
    output:     Option<LinguisticVariable>,
    rules:      Vec<Rule>,
    resolution: Option<f64>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an input variable.  Crisp values passed to
    /// [`MamdaniEngine::infer`] follow registration order.
    pub fn input(mut self, variable: LinguisticVariable) -> Self {
        self.inputs.push(variable);
        self
    }

    pub fn output(mut self, variable: LinguisticVariable) -> Self {
        self.output = Some(variable);
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Grid step for defuzzification.  Default: [`DEFAULT_RESOLUTION`].
    /// The output universe may span at most [`MAX_GRID_INTERVALS`] steps.
    pub fn resolution(mut self, step: f64) -> Self {
        self.resolution = Some(step);
        self
    }

    /// Validate variables and rules, sample the output sets, and return a
    /// ready-to-use engine.
    pub fn build(self) -> InferenceResult<MamdaniEngine> {
        let output = self.output.ok_or(InferenceError::MissingOutput)?;
        if self.rules.is_empty() {
            return Err(InferenceError::NoRules);
        }

        let step = self.resolution.unwrap_or(DEFAULT_RESOLUTION);
        if !(step.is_finite() && step > 0.0) {
            return Err(InferenceError::InvalidResolution(step));
        }

        for var in self.inputs.iter().chain(std::iter::once(&output)) {
            validate_variable(var)?;
        }

        let span = output.hi - output.lo;
        let intervals = (span / step).round();
        if intervals > MAX_GRID_INTERVALS as f64 {
            return Err(InferenceError::ResolutionTooFine { step, max: MAX_GRID_INTERVALS });
        }
        let intervals = (intervals as usize).max(1);

        let compiled = self
            .rules
            .iter()
            .map(|rule| compile_rule(rule, &self.inputs, &output))
            .collect::<InferenceResult<Vec<_>>>()?;

        // x_i = lo + span * i / n keeps both endpoints exact, so shoulder
        // peaks at the universe boundary are sampled at degree 1.
        let grid: Vec<f64> = (0..=intervals)
            .map(|i| output.lo + span * i as f64 / intervals as f64)
            .collect();
        let curves = output
            .sets()
            .map(|(_, f)| grid.iter().map(|&x| f.degree(x)).collect())
            .collect();

        Ok(MamdaniEngine {
            inputs: self.inputs,
            output,
            rules: self.rules,
            compiled,
            grid,
            curves,
        })
    }
}

fn validate_variable(var: &LinguisticVariable) -> InferenceResult<()> {
    if !(var.lo.is_finite() && var.hi.is_finite() && var.lo < var.hi) {
        return Err(InferenceError::InvalidUniverse {
            variable: var.name.clone(),
            lo:       var.lo,
            hi:       var.hi,
        });
    }
    for (label, f) in var.sets() {
        if !f.is_well_formed() {
            let (a, b, c) = f.breakpoints();
            return Err(InferenceError::InvalidMembership {
                variable: var.name.clone(),
                label: label.to_owned(),
                a,
                b,
                c,
            });
        }
    }
    Ok(())
}

fn compile_rule(
    rule:   &Rule,
    inputs: &[LinguisticVariable],
    output: &LinguisticVariable,
) -> InferenceResult<CompiledRule> {
    let antecedents = rule
        .antecedents
        .iter()
        .map(|(name, label)| {
            let v = inputs
                .iter()
                .position(|var| var.name == *name)
                .ok_or_else(|| InferenceError::UnknownVariable(name.clone()))?;
            let s = inputs[v].set_index(label).ok_or_else(|| InferenceError::UnknownLabel {
                variable: name.clone(),
                label:    label.clone(),
            })?;
            Ok((v, s))
        })
        .collect::<InferenceResult<Vec<_>>>()?;

    let (out_name, out_label) = &rule.consequent;
    if *out_name != output.name {
        return Err(InferenceError::UnknownVariable(out_name.clone()));
    }
    let consequent = output.set_index(out_label).ok_or_else(|| InferenceError::UnknownLabel {
        variable: out_name.clone(),
        label:    out_label.clone(),
    })?;

    Ok(CompiledRule { antecedents, consequent })
}
