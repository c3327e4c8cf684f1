//! Vehicle category enumeration.

use std::fmt;

/// Category of a vehicle, resolved once from the simulator's vehicle class.
///
/// Only [`Emergency`][VehicleCategory::Emergency] matters to preemption; the
/// remaining variants exist so logs and scripted scenarios can name what a
/// vehicle is without falling back to free-form strings.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum VehicleCategory {
    #[default]
    Passenger,
    Bus,
    Truck,
    Emergency,
    /// Police, fire brigade and other authority vehicles.
    Authority,
    Other,
}

impl VehicleCategory {
    /// Map a simulator vehicle-class name to a category.
    ///
    /// The match is exact: a type called `"emergency_van"` with class
    /// `"passenger"` is a passenger car.
    pub fn from_vehicle_class(class: &str) -> Self {
        match class {
            "emergency" => Self::Emergency,
            "authority" => Self::Authority,
            "passenger" | "private" | "taxi" | "evehicle" => Self::Passenger,
            "bus" | "coach" => Self::Bus,
            "truck" | "trailer" | "delivery" => Self::Truck,
            _ => Self::Other,
        }
    }

    /// `true` for vehicles that trigger signal preemption.
    #[inline]
    pub fn is_emergency(self) -> bool {
        self == Self::Emergency
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passenger => "passenger",
            Self::Bus => "bus",
            Self::Truck => "truck",
            Self::Emergency => "emergency",
            Self::Authority => "authority",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
