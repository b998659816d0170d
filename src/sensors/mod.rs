//! Auxiliary sensor kinds and their per-sensor statistics.
//!
//! Besides the station's primary instruments, a console can report extra
//! thermometers, hygrometers, soil probes and leaf wetness sensors. Each of
//! those is summarised independently, keyed by its sensor id.

mod statistics;

pub use statistics::{SensorAccumulator, SensorStatistics};

use core::fmt;

use serde::{Deserialize, Serialize};

/// Kind of sensor that produced a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorType {
    Thermometer,
    LeafTemperature,
    SoilTemperature,
    Hygrometer,
    SoilMoisture,
    LeafWetness,
    UltravioletSensor,
    SolarRadiationSensor,
    RainCollector,
    Anemometer,
    Barometer,
}

/// Measurement family a sensor's readings are accumulated as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorFamily {
    Temperature,
    Humidity,
    SoilMoisture,
    LeafWetness,
}

impl SensorType {
    /// The family this sensor is summarised as, or `None` for sensor kinds
    /// the per-sensor statistics do not track
    pub const fn family(self) -> Option<SensorFamily> {
        match self {
            Self::Thermometer | Self::LeafTemperature | Self::SoilTemperature => {
                Some(SensorFamily::Temperature)
            }
            Self::Hygrometer => Some(SensorFamily::Humidity),
            Self::SoilMoisture => Some(SensorFamily::SoilMoisture),
            Self::LeafWetness => Some(SensorFamily::LeafWetness),
            Self::UltravioletSensor
            | Self::SolarRadiationSensor
            | Self::RainCollector
            | Self::Anemometer
            | Self::Barometer => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Thermometer => "Thermometer",
            Self::LeafTemperature => "Leaf Temperature",
            Self::SoilTemperature => "Soil Temperature",
            Self::Hygrometer => "Hygrometer",
            Self::SoilMoisture => "Soil Moisture",
            Self::LeafWetness => "Leaf Wetness",
            Self::UltravioletSensor => "UV",
            Self::SolarRadiationSensor => "Solar Radiation",
            Self::RainCollector => "Rain Collector",
            Self::Anemometer => "Anemometer",
            Self::Barometer => "Barometer",
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
