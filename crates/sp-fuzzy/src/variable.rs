//! Linguistic variables.

use crate::MembershipFunction;

/// A named quantity with a numeric universe and labelled fuzzy sets.
///
/// Sets keep their insertion order so that iteration, and anything derived
/// from it, is reproducible.
#[derive(Debug, Clone, PartialEq)]
pub struct LinguisticVariable {
    pub name: String,
    pub lo:   f64,
    pub hi:   f64,
    sets:     Vec<(String, MembershipFunction)>,
}

impl LinguisticVariable {
    pub fn new(name: impl Into<String>, lo: f64, hi: f64) -> Self {
        Self {
            name: name.into(),
            lo,
            hi,
            sets: Vec::new(),
        }
    }

    /// Add (or replace) the set called `label`.
    pub fn with_set(mut self, label: impl Into<String>, function: MembershipFunction) -> Self {
        let label = label.into();
        match self.sets.iter_mut().find(|(l, _)| *l == label) {
            Some(slot) => slot.1 = function,
            None => self.sets.push((label, function)),
        }
        self
    }

    /// Clamp a crisp value to the universe.
    #[inline]
    pub fn clamp(&self, x: f64) -> f64 {
        x.clamp(self.lo, self.hi)
    }

    pub fn set(&self, label: &str) -> Option<&MembershipFunction> {
        self.sets.iter().find(|(l, _)| l == label).map(|(_, f)| f)
    }

    pub(crate) fn set_index(&self, label: &str) -> Option<usize> {
        self.sets.iter().position(|(l, _)| l == label)
    }

    /// Degree of `x` (clamped) in the set `label`.
    pub fn degree(&self, label: &str, x: f64) -> Option<f64> {
        self.set(label).map(|f| f.degree(self.clamp(x)))
    }

    /// Degrees of `x` (clamped) in every set, in insertion order.
    pub fn fuzzify(&self, x: f64) -> Vec<f64> {
        let x = self.clamp(x);
        self.sets.iter().map(|(_, f)| f.degree(x)).collect()
    }

    pub fn sets(&self) -> impl Iterator<Item = (&str, &MembershipFunction)> {
        self.sets.iter().map(|(l, f)| (l.as_str(), f))
    }

    pub fn set_count(&self) -> usize {
        self.sets.len()
    }
}
