use core::fmt;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{SensorFamily, SensorType};
use crate::error::{SummaryError, SummaryResult};
use crate::measurement::MeasurementAccumulator;
use crate::quantity::{Humidity, LeafWetness, Quantity, SoilMoisture, Temperature};

/// Accumulator for one auxiliary sensor, typed by its family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SensorAccumulator {
    Temperature(MeasurementAccumulator<Temperature>),
    Humidity(MeasurementAccumulator<Humidity>),
    SoilMoisture(MeasurementAccumulator<SoilMoisture>),
    LeafWetness(MeasurementAccumulator<LeafWetness>),
}

/// Forward a generic expression to whichever accumulator variant is held
macro_rules! with_accumulator {
    ($self:expr, $acc:ident => $body:expr) => {
        match $self {
            SensorAccumulator::Temperature($acc) => $body,
            SensorAccumulator::Humidity($acc) => $body,
            SensorAccumulator::SoilMoisture($acc) => $body,
            SensorAccumulator::LeafWetness($acc) => $body,
        }
    };
}

fn raw<Q: Quantity>(value: Option<Q>) -> Option<f64> {
    value.map(Quantity::value)
}

impl SensorAccumulator {
    pub fn new(family: SensorFamily) -> Self {
        match family {
            SensorFamily::Temperature => Self::Temperature(MeasurementAccumulator::new()),
            SensorFamily::Humidity => Self::Humidity(MeasurementAccumulator::new()),
            SensorFamily::SoilMoisture => Self::SoilMoisture(MeasurementAccumulator::new()),
            SensorFamily::LeafWetness => Self::LeafWetness(MeasurementAccumulator::new()),
        }
    }

    pub fn family(&self) -> SensorFamily {
        match self {
            Self::Temperature(_) => SensorFamily::Temperature,
            Self::Humidity(_) => SensorFamily::Humidity,
            Self::SoilMoisture(_) => SensorFamily::SoilMoisture,
            Self::LeafWetness(_) => SensorFamily::LeafWetness,
        }
    }

    pub fn apply_value(&mut self, value: f64, time: NaiveDateTime, duration: Duration) {
        with_accumulator!(self, acc => acc.apply_value(Some(Quantity::from_value(value)), time, duration))
    }

    /// Merge an accumulator of the same family. Different families are a
    /// configuration error and leave `self` untouched.
    pub fn merge(&mut self, other: &Self) -> SummaryResult<()> {
        match (self, other) {
            (Self::Temperature(a), Self::Temperature(b)) => a.merge(b),
            (Self::Humidity(a), Self::Humidity(b)) => a.merge(b),
            (Self::SoilMoisture(a), Self::SoilMoisture(b)) => a.merge(b),
            (Self::LeafWetness(a), Self::LeafWetness(b)) => a.merge(b),
            (a, b) => {
                return Err(SummaryError::mismatch(format!(
                    "sensor family {:?} cannot merge {:?}",
                    a.family(),
                    b.family()
                )));
            }
        }
        Ok(())
    }

    pub fn minimum(&self) -> Option<f64> {
        with_accumulator!(self, acc => raw(acc.minimum()))
    }

    pub fn minimum_time(&self) -> Option<NaiveDateTime> {
        with_accumulator!(self, acc => acc.minimum_time())
    }

    pub fn maximum(&self) -> Option<f64> {
        with_accumulator!(self, acc => raw(acc.maximum()))
    }

    pub fn maximum_time(&self) -> Option<NaiveDateTime> {
        with_accumulator!(self, acc => acc.maximum_time())
    }

    pub fn average(&self) -> Option<f64> {
        with_accumulator!(self, acc => raw(acc.average()))
    }

    pub fn duration(&self) -> Duration {
        with_accumulator!(self, acc => acc.duration())
    }
}

/// Statistics for one auxiliary sensor over a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorStatistics {
    date: NaiveDate,
    sensor_id: u32,
    sensor_type: SensorType,
    stats: SensorAccumulator,
}

impl SensorStatistics {
    /// Empty statistics for a sensor, or `None` if its kind is not tracked
    pub fn new(date: NaiveDate, sensor_id: u32, sensor_type: SensorType) -> Option<Self> {
        let family = sensor_type.family()?;
        Some(Self {
            date,
            sensor_id,
            sensor_type,
            stats: SensorAccumulator::new(family),
        })
    }

    /// Rehydrate persisted statistics.
    ///
    /// Fails when the accumulator does not belong to the sensor type's family.
    pub fn from_parts(
        date: NaiveDate,
        sensor_id: u32,
        sensor_type: SensorType,
        stats: SensorAccumulator,
    ) -> SummaryResult<Self> {
        if sensor_type.family() != Some(stats.family()) {
            return Err(SummaryError::mismatch(format!(
                "sensor {} of type {} cannot hold {:?} statistics",
                sensor_id,
                sensor_type,
                stats.family()
            )));
        }
        Ok(Self {
            date,
            sensor_id,
            sensor_type,
            stats,
        })
    }

    pub fn apply_value(&mut self, value: f64, time: NaiveDateTime, duration: Duration) {
        self.stats.apply_value(value, time, duration);
    }

    pub fn family(&self) -> SensorFamily {
        self.stats.family()
    }

    /// Whether `other` can be merged into `self`
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.sensor_id == other.sensor_id && self.family() == other.family()
    }

    pub fn merge(&mut self, other: &Self) -> SummaryResult<()> {
        if self.sensor_id != other.sensor_id {
            return Err(SummaryError::mismatch(format!(
                "sensor id {} cannot merge sensor id {}",
                self.sensor_id, other.sensor_id
            )));
        }
        self.stats.merge(&other.stats)
    }

    /// Copy of `other` re-dated to `date`, used when a merge adds a sensor
    /// the target period has not seen yet
    pub(crate) fn redated(other: &Self, date: NaiveDate) -> Self {
        Self {
            date,
            ..other.clone()
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn sensor_id(&self) -> u32 {
        self.sensor_id
    }

    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    pub fn stats(&self) -> &SensorAccumulator {
        &self.stats
    }
}

impl fmt::Display for SensorStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sensor {} ({}):", self.sensor_id, self.sensor_type)?;
        with_accumulator!(&self.stats, acc => write!(f, " {}", acc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn at(hour: u32) -> NaiveDateTime {
        day().and_hms_opt(hour, 0, 0).unwrap()
    }

    #[test]
    fn test_untracked_sensor_type_has_no_statistics() {
        assert!(SensorStatistics::new(day(), 7, SensorType::RainCollector).is_none());
    }

    #[test]
    fn test_sensor_statistics_accumulate() {
        let mut stats = SensorStatistics::new(day(), 3, SensorType::SoilTemperature).unwrap();
        stats.apply_value(50.0, at(1), Duration::from_secs(60));
        stats.apply_value(54.0, at(2), Duration::from_secs(60));

        assert_eq!(stats.family(), SensorFamily::Temperature);
        assert_eq!(stats.stats().minimum(), Some(50.0));
        assert_eq!(stats.stats().maximum_time(), Some(at(2)));
        assert_eq!(stats.stats().average(), Some(52.0));
    }

    #[test]
    fn test_family_mismatch_is_rejected() {
        let mut a = SensorAccumulator::new(SensorFamily::Humidity);
        a.apply_value(40.0, at(0), Duration::from_secs(60));
        let b = SensorAccumulator::new(SensorFamily::LeafWetness);

        assert!(matches!(a.merge(&b), Err(SummaryError::ConfigMismatch { .. })));
        assert_eq!(a.average(), Some(40.0));
    }

    #[test]
    fn test_from_parts_checks_family() {
        let acc = SensorAccumulator::new(SensorFamily::Humidity);
        assert!(SensorStatistics::from_parts(day(), 1, SensorType::Thermometer, acc.clone()).is_err());
        assert!(SensorStatistics::from_parts(day(), 1, SensorType::Hygrometer, acc).is_ok());
    }
}
