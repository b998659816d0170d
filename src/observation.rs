//! Raw observation records as delivered by the collector.

use std::time::Duration;

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::{SummaryError, SummaryResult};
use crate::quantity::{Depth, Heading, Humidity, Pressure, SolarRadiation, Speed, Temperature};
use crate::sensors::SensorType;

/// Wind vector: speed and the heading the wind blows from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: Speed,
    pub direction: Heading,
}

impl Wind {
    pub fn new(speed: Speed, direction: Heading) -> Self {
        Self { speed, direction }
    }

    pub fn is_calm(&self) -> bool {
        self.speed.0 == 0.0
    }
}

/// One reading from an auxiliary sensor (extra thermometer, soil probe, ...)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub sensor_id: u32,
    pub sensor_type: SensorType,
    pub value: f64,
}

/// A raw observation valid for `duration` starting at `time`.
///
/// Every measurement is optional; a missing value is simply not accumulated.
/// The `high_*`/`low_*` fields are set by sources whose records already
/// summarise an archive interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub time: NaiveDateTime,
    pub duration: Duration,
    pub outdoor_temp: Option<Temperature>,
    pub high_outdoor_temp: Option<Temperature>,
    pub low_outdoor_temp: Option<Temperature>,
    pub indoor_temp: Option<Temperature>,
    pub outdoor_humidity: Option<Humidity>,
    pub indoor_humidity: Option<Humidity>,
    pub baro_pressure: Option<Pressure>,
    pub dew_point: Option<Temperature>,
    pub heat_index: Option<Temperature>,
    pub wind_chill: Option<Temperature>,
    pub solar_radiation: Option<SolarRadiation>,
    pub high_solar_radiation: Option<SolarRadiation>,
    pub wind: Option<Wind>,
    pub high_wind_speed: Option<Speed>,
    pub gust: Option<Speed>,
    pub rainfall: Option<Depth>,
    pub high_rainfall_rate: Option<Depth>,
    pub evapotranspiration: Option<Depth>,
    pub sensor_readings: Vec<SensorReading>,
}

impl Observation {
    /// Create an empty observation. Negative durations are rejected.
    pub fn new(time: NaiveDateTime, duration: TimeDelta) -> SummaryResult<Self> {
        let duration = duration.to_std().map_err(|_| SummaryError::NegativeDuration)?;
        Ok(Self::with_duration(time, duration))
    }

    pub fn with_duration(time: NaiveDateTime, duration: Duration) -> Self {
        Self {
            time,
            duration,
            outdoor_temp: None,
            high_outdoor_temp: None,
            low_outdoor_temp: None,
            indoor_temp: None,
            outdoor_humidity: None,
            indoor_humidity: None,
            baro_pressure: None,
            dew_point: None,
            heat_index: None,
            wind_chill: None,
            solar_radiation: None,
            high_solar_radiation: None,
            wind: None,
            high_wind_speed: None,
            gust: None,
            rainfall: None,
            high_rainfall_rate: None,
            evapotranspiration: None,
            sensor_readings: Vec::new(),
        }
    }
}
