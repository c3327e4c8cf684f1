//! Membership functions.

/// Maps a crisp value to a membership degree in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MembershipFunction {
    /// Triangle rising from `a` to a peak at `b` and falling to `c`.
    ///
    /// Shoulders are allowed: `a == b` gives a left shoulder whose degree is
    /// 1 at `a`, `b == c` a right shoulder whose degree is 1 at `c`.
    Triangular { a: f64, b: f64, c: f64 },
}

impl MembershipFunction {
    #[inline]
    pub const fn triangular(a: f64, b: f64, c: f64) -> Self {
        Self::Triangular { a, b, c }
    }

    /// Membership degree of `x`.  Zero outside the support.
    pub fn degree(&self, x: f64) -> f64 {
        match *self {
            Self::Triangular { a, b, c } => {
                if x < a || x > c {
                    0.0
                } else if x == b {
                    1.0
                } else if x < b {
                    (x - a) / (b - a)
                } else {
                    (c - x) / (c - b)
                }
            }
        }
    }

    /// Closed interval outside which the degree is zero.
    pub fn support(&self) -> (f64, f64) {
        match *self {
            Self::Triangular { a, c, .. } => (a, c),
        }
    }

    /// Centroid of the unclipped shape.
    pub fn centroid(&self) -> f64 {
        match *self {
            Self::Triangular { a, b, c } => (a + b + c) / 3.0,
        }
    }

    /// `true` if the breakpoints are finite and ordered.
    pub fn is_well_formed(&self) -> bool {
        match *self {
            Self::Triangular { a, b, c } => {
                a.is_finite() && b.is_finite() && c.is_finite() && a <= b && b <= c
            }
        }
    }

    pub(crate) fn breakpoints(&self) -> (f64, f64, f64) {
        match *self {
            Self::Triangular { a, b, c } => (a, b, c),
        }
    }
}
