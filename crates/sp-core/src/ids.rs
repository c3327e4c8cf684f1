//! Strongly typed identifier wrappers.
//!
//! The external simulator names every object with a string, so the wrappers
//! hold an owned `String`.  Distinct types keep a lane id from being passed
//! where a traffic-light id is expected.

use std::fmt;

/// Generate a typed ID wrapper around an owned string.
macro_rules! named_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[derive(serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        $vis struct $name(pub String);

        impl $name {
            #[inline]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            #[inline]
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            #[inline]
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl AsRef<str> for $name {
            #[inline]
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

named_id! {
    /// Identifier of a signalised intersection (a traffic-light program owner).
    pub struct TrafficLightId;
}

named_id! {
    /// Identifier of a single lane.
    pub struct LaneId;
}

named_id! {
    /// Identifier of a vehicle currently in the network.
    pub struct VehicleId;
}
