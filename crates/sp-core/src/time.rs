//! Simulation time model.
//!
//! # Design
//!
//! Time is represented as a monotonically increasing `Tick` counter, one tick
//! per simulator step.  The mapping to simulated seconds is held in
//! `SimClock`:
//!
//!   sim_secs = tick * step_ms / 1000
//!
//! Every wait in the preemption logic is expressed as a tick count derived
//! from the clock, never as wall-clock time.  The default step length is
//! 1 000 ms, which matches the external simulator's default.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Tracks the current tick and converts between ticks and simulated seconds.
///
/// `SimClock` is cheap to copy and holds no heap data.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SimClock {
    /// Simulated milliseconds covered by one tick.  Default: 1000.
    pub step_ms: u32,
    /// The current tick, advanced by `SimClock::advance()` each step.
    pub current_tick: Tick,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(1_000)
    }
}

impl SimClock {
    /// Create a clock at tick 0 with the given step length.
    ///
    /// A zero step length is bumped to 1 ms so tick conversions stay finite.
    pub fn new(step_ms: u32) -> Self {
        Self {
            step_ms: step_ms.max(1),
            current_tick: Tick::ZERO,
        }
    }

    /// Build a clock from a step length in (possibly fractional) seconds.
    pub fn from_step_secs(step_secs: f64) -> Self {
        let ms = if step_secs.is_finite() && step_secs > 0.0 {
            (step_secs * 1_000.0).round().min(u32::MAX as f64) as u32
        } else {
            1_000
        };
        Self::new(ms)
    }

    /// Advance the clock by one tick and return the new tick.
    #[inline]
    pub fn advance(&mut self) -> Tick {
        self.current_tick = Tick(self.current_tick.0 + 1);
        self.current_tick
    }

    /// Step length in seconds.
    #[inline]
    pub fn step_secs(&self) -> f64 {
        self.step_ms as f64 / 1_000.0
    }

    /// Elapsed simulated seconds since tick 0.
    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.current_tick.0 as f64 * self.step_secs()
    }

    /// How many ticks span `secs` seconds?  Rounds up and never returns
    /// zero, so a timed wait always lets at least one step pass.
    pub fn ticks_for_secs(&self, secs: f64) -> u64 {
        if !secs.is_finite() || secs <= 0.0 {
            return 1;
        }
        let ms = (secs * 1_000.0).ceil() as u64;
        ms.div_ceil(self.step_ms as u64).max(1)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1} s)", self.current_tick, self.elapsed_secs())
    }
}
