//! Typed scalar quantities.
//!
//! Each physical quantity the summary tracks is a thin newtype over `f64` so
//! that accumulators of different kinds cannot be merged with each other.
//! Units are whatever the observation source reports; the engine never
//! converts between them.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A scalar measurement that can be accumulated and averaged
pub trait Quantity: Copy + PartialOrd + fmt::Debug {
    /// Short human readable name, used in logs and reports
    const NAME: &'static str;

    /// Wrap a raw value
    fn from_value(value: f64) -> Self;

    /// Extract the raw value
    fn value(self) -> f64;
}

macro_rules! quantity {
    ($(#[$meta:meta])* $name:ident, $label:literal, $unit:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub f64);

        impl Quantity for $name {
            const NAME: &'static str = $label;

            #[inline]
            fn from_value(value: f64) -> Self {
                Self(value)
            }

            #[inline]
            fn value(self) -> f64 {
                self.0
            }
        }

        impl From<f64> for $name {
            fn from(value: f64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:.1}{}", self.0, $unit)
            }
        }
    };
}

quantity!(
    /// Air, soil or leaf temperature
    Temperature,
    "temperature",
    "°F"
);
quantity!(
    /// Relative humidity in percent
    Humidity,
    "humidity",
    "%"
);
quantity!(
    /// Barometric pressure
    Pressure,
    "pressure",
    " inHg"
);
quantity!(
    /// Wind speed
    Speed,
    "speed",
    " mph"
);
quantity!(
    /// Compass heading in degrees, 0 = north, clockwise
    Heading,
    "heading",
    "°"
);
quantity!(
    /// Rainfall or evapotranspiration depth
    Depth,
    "depth",
    " mm"
);
quantity!(
    /// Solar radiation
    SolarRadiation,
    "solar radiation",
    " W/m²"
);
quantity!(
    /// Soil moisture tension
    SoilMoisture,
    "soil moisture",
    " cb"
);
quantity!(LeafWetness, "leaf wetness", "");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_ordering_follows_value() {
        assert!(Temperature(10.0) < Temperature(20.5));
        assert_eq!(Speed::from_value(4.5).value(), 4.5);
    }

    #[test]
    fn test_quantity_display() {
        assert_eq!(Temperature(72.34).to_string(), "72.3°F");
        assert_eq!(Depth(3.0).to_string(), "3.0 mm");
    }
}
