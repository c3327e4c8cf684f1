//! Signal-state strings.
//!
//! A traffic light reports its state as one character per controlled link
//! (`rrGGyy…`).  `SignalState` parses that string once into typed colours so
//! callers compare enums instead of characters.

use std::fmt;

/// The colour shown to one controlled link.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SignalColor {
    /// `r`: stop.
    Red,
    /// `u`: red/yellow, about to turn green.
    RedYellow,
    /// `y` / `Y`: amber, vehicles should stop.
    Yellow,
    /// `g`: green, must yield to priority streams.
    Green,
    /// `G`: green with priority.
    GreenPriority,
    /// `s`: green right-turn arrow, stop first.
    Stop,
    /// `o` / `O`: signal off.
    Off,
}

impl SignalColor {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'r' => Some(Self::Red),
            'u' => Some(Self::RedYellow),
            'y' | 'Y' => Some(Self::Yellow),
            'g' => Some(Self::Green),
            'G' => Some(Self::GreenPriority),
            's' => Some(Self::Stop),
            'o' | 'O' => Some(Self::Off),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Red => 'r',
            Self::RedYellow => 'u',
            Self::Yellow => 'y',
            Self::Green => 'g',
            Self::GreenPriority => 'G',
            Self::Stop => 's',
            Self::Off => 'o',
        }
    }

    #[inline]
    pub fn is_red(self) -> bool {
        self == Self::Red
    }

    #[inline]
    pub fn is_green(self) -> bool {
        matches!(self, Self::Green | Self::GreenPriority)
    }
}

/// A parsed signal-state string, indexed by link index.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SignalState(Vec<SignalColor>);

impl SignalState {
    /// Parse a state string.  Returns `None` if any character is unknown.
    pub fn parse(state: &str) -> Option<Self> {
        state
            .chars()
            .map(SignalColor::from_char)
            .collect::<Option<Vec<_>>>()
            .map(Self)
    }

    /// Colour at `link_index`, or `None` if the index is past the end.
    #[inline]
    pub fn color(&self, link_index: usize) -> Option<SignalColor> {
        self.0.get(link_index).copied()
    }

    #[inline]
    pub fn is_red(&self, link_index: usize) -> bool {
        self.color(link_index).is_some_and(SignalColor::is_red)
    }

    #[inline]
    pub fn is_green(&self, link_index: usize) -> bool {
        self.color(link_index).is_some_and(SignalColor::is_green)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SignalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.0 {
            write!(f, "{}", c.as_char())?;
        }
        Ok(())
    }
}
