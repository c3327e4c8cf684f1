//! Fuzzy rules.

/// `IF v1 is L1 AND v2 is L2 … THEN out is L`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// `(variable, label)` pairs joined by logical AND.
    pub antecedents: Vec<(String, String)>,
    /// `(output variable, label)`.
    pub consequent:  (String, String),
}

impl Rule {
    pub fn new<'a>(
        antecedents: impl IntoIterator<Item = (&'a str, &'a str)>,
        consequent:  (&str, &str),
    ) -> Self {
        Self {
            antecedents: antecedents
                .into_iter()
                .map(|(v, l)| (v.to_owned(), l.to_owned()))
                .collect(),
            consequent: (consequent.0.to_owned(), consequent.1.to_owned()),
        }
    }
}

/// A rule with names resolved to indices at build time.
#[derive(Debug, Clone)]
pub(crate) struct CompiledRule {
    /// `(input index, set index)` pairs.
    pub antecedents: Vec<(usize, usize)>,
    /// Output set index.
    pub consequent:  usize,
}
