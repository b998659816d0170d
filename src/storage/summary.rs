//! Period summaries: the statistics kept for one day, month or year.
//!
//! A [`PeriodSummary`] is built either from raw observations
//! ([`PeriodSummary::apply_observation`]) or by merging the summaries of its
//! sub-periods ([`PeriodSummary::merge_period`]). Both paths produce the same
//! statistics because every component stores durations and weighted sums
//! rather than finished averages.

use core::fmt;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime, Timelike};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{SummaryError, SummaryResult};
use crate::measurement::{Extremum, MeasurementAccumulator, keep_max};
use crate::observation::{Observation, SensorReading};
use crate::quantity::{Depth, Humidity, Pressure, Quantity, SolarRadiation, Speed, Temperature};
use crate::rainfall::HourlyDepthMap;
use crate::sensors::SensorStatistics;
use crate::threshold::{ThresholdBin, ThresholdBinDuration, check_unique_ids};
use crate::wind::{WindParameters, WindRose};

/// A value that is present and not NaN
fn present<Q: Quantity>(value: Option<Q>) -> Option<Q> {
    value.filter(|v| !v.value().is_nan())
}

/// Accumulators fed one sample per merged sub-period.
///
/// `high` collects each sub-period's highest outdoor temperature, so its
/// maximum is the hottest high and its minimum the coolest high. `low` and
/// `mean` work the same way for lows and mean temperatures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodTemperatures {
    high: MeasurementAccumulator<Temperature>,
    low: MeasurementAccumulator<Temperature>,
    mean: MeasurementAccumulator<Temperature>,
}

impl PeriodTemperatures {
    pub fn is_empty(&self) -> bool {
        self.high.is_empty() && self.low.is_empty() && self.mean.is_empty()
    }

    /// Feed one sub-period's outdoor temperature statistics.
    ///
    /// Each sample is weighted by the time the sub-period has temperature
    /// data for. The mean is stamped at midnight of the sub-period's date,
    /// so the time of the highest or lowest mean names a day, never an hour.
    fn apply_period(&mut self, outdoor: &MeasurementAccumulator<Temperature>, date: NaiveDate) {
        let weight = outdoor.duration();
        if let Some(high) = outdoor.max_extremum() {
            self.high.apply_value(Some(high.value), high.time, weight);
        }
        if let Some(low) = outdoor.min_extremum() {
            self.low.apply_value(Some(low.value), low.time, weight);
        }
        self.mean
            .apply_value(outdoor.average(), date.and_time(NaiveTime::MIN), weight);
    }

    fn merge(&mut self, other: &Self) {
        self.high.merge(&other.high);
        self.low.merge(&other.low);
        self.mean.merge(&other.mean);
    }

    pub fn high(&self) -> &MeasurementAccumulator<Temperature> {
        &self.high
    }

    pub fn low(&self) -> &MeasurementAccumulator<Temperature> {
        &self.low
    }

    pub fn mean(&self) -> &MeasurementAccumulator<Temperature> {
        &self.mean
    }

    pub fn high_mut(&mut self) -> &mut MeasurementAccumulator<Temperature> {
        &mut self.high
    }

    pub fn low_mut(&mut self) -> &mut MeasurementAccumulator<Temperature> {
        &mut self.low
    }

    pub fn mean_mut(&mut self) -> &mut MeasurementAccumulator<Temperature> {
        &mut self.mean
    }
}

/// All statistics for one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    /// First day of the period
    date: NaiveDate,
    /// Sum of every applied observation's duration
    duration: Duration,
    outdoor_temp: MeasurementAccumulator<Temperature>,
    indoor_temp: MeasurementAccumulator<Temperature>,
    outdoor_humidity: MeasurementAccumulator<Humidity>,
    indoor_humidity: MeasurementAccumulator<Humidity>,
    baro_pressure: MeasurementAccumulator<Pressure>,
    wind_speed: MeasurementAccumulator<Speed>,
    wind_gust: MeasurementAccumulator<Speed>,
    solar_radiation: MeasurementAccumulator<SolarRadiation>,
    dew_point: MeasurementAccumulator<Temperature>,
    heat_index: MeasurementAccumulator<Temperature>,
    wind_chill: MeasurementAccumulator<Temperature>,
    /// High/low/mean of each merged sub-period
    period_temps: PeriodTemperatures,
    wind_rose: WindRose,
    threshold_bins: Vec<ThresholdBinDuration>,
    hourly_rainfall: HourlyDepthMap,
    total_rainfall: Depth,
    max_rainfall_rate: Option<Extremum<Depth>>,
    total_et: Depth,
    /// Auxiliary sensors keyed by sensor id
    sensors: BTreeMap<u32, SensorStatistics>,
    /// Set by the first merge; raw observations are rejected afterwards
    merged: bool,
}

macro_rules! accumulator_accessors {
    ($($field:ident, $field_mut:ident: $q:ty;)*) => {
        $(
            pub fn $field(&self) -> &MeasurementAccumulator<$q> {
                &self.$field
            }

            pub fn $field_mut(&mut self) -> &mut MeasurementAccumulator<$q> {
                &mut self.$field
            }
        )*
    };
}

impl PeriodSummary {
    /// An empty summary seeded with the wind rose shape and threshold bins.
    ///
    /// Fails on invalid wind parameters or duplicate threshold bin ids.
    pub fn new(
        date: NaiveDate,
        wind: &WindParameters,
        bins: &[ThresholdBin],
    ) -> SummaryResult<Self> {
        check_unique_ids(bins)?;

        Ok(Self {
            date,
            duration: Duration::ZERO,
            outdoor_temp: MeasurementAccumulator::new(),
            indoor_temp: MeasurementAccumulator::new(),
            outdoor_humidity: MeasurementAccumulator::new(),
            indoor_humidity: MeasurementAccumulator::new(),
            baro_pressure: MeasurementAccumulator::new(),
            wind_speed: MeasurementAccumulator::new(),
            wind_gust: MeasurementAccumulator::new(),
            solar_radiation: MeasurementAccumulator::new(),
            dew_point: MeasurementAccumulator::new(),
            heat_index: MeasurementAccumulator::new(),
            wind_chill: MeasurementAccumulator::new(),
            period_temps: PeriodTemperatures::default(),
            wind_rose: WindRose::new(date, wind)?,
            threshold_bins: bins
                .iter()
                .map(|bin| ThresholdBinDuration::new(*bin, date))
                .collect(),
            hourly_rainfall: HourlyDepthMap::new(date),
            total_rainfall: Depth(0.0),
            max_rainfall_rate: None,
            total_et: Depth(0.0),
            sensors: BTreeMap::new(),
            merged: false,
        })
    }

    /// Fold one raw observation into the summary
    pub fn apply_observation(&mut self, obs: &Observation) -> SummaryResult<()> {
        if self.merged {
            return Err(SummaryError::RawAfterMerge);
        }

        let time = obs.time;
        let dur = obs.duration;
        self.duration += dur;

        // Archive records carry their own high/low; plain samples are all three.
        let avg = present(obs.outdoor_temp);
        self.outdoor_temp.apply_precomputed(
            present(obs.low_outdoor_temp).or(avg),
            present(obs.high_outdoor_temp).or(avg),
            avg,
            time,
            dur,
        );
        self.indoor_temp.apply_value(obs.indoor_temp, time, dur);
        self.outdoor_humidity.apply_value(obs.outdoor_humidity, time, dur);
        self.indoor_humidity.apply_value(obs.indoor_humidity, time, dur);
        self.baro_pressure.apply_value(obs.baro_pressure, time, dur);
        self.dew_point.apply_value(obs.dew_point, time, dur);
        self.heat_index.apply_value(obs.heat_index, time, dur);
        self.wind_chill.apply_value(obs.wind_chill, time, dur);

        let solar = present(obs.solar_radiation);
        self.solar_radiation.apply_precomputed(
            solar,
            present(obs.high_solar_radiation).or(solar),
            solar,
            time,
            dur,
        );

        let wind = obs
            .wind
            .filter(|w| !w.speed.0.is_nan() && !w.direction.0.is_nan());
        if let Some(wind) = wind {
            self.wind_rose.apply_wind(dur, wind);
        }
        let speed = wind.map(|w| w.speed);
        self.wind_speed
            .apply_precomputed(speed, present(obs.high_wind_speed).or(speed), speed, time, dur);
        self.wind_gust.apply_value(obs.gust, time, dur);

        if let Some(rain) = obs.rainfall.filter(|r| !r.0.is_nan()) {
            self.total_rainfall.0 += rain.0;
            self.hourly_rainfall.add_rain(time.hour(), rain)?;
        }
        if let Some(rate) = obs.high_rainfall_rate {
            keep_max(&mut self.max_rainfall_rate, Extremum::new(rate, time));
        }
        if let Some(et) = obs.evapotranspiration.filter(|e| !e.0.is_nan()) {
            self.total_et.0 += et.0;
        }

        if let Some(temp) = avg {
            for bin in &mut self.threshold_bins {
                bin.add_duration_if_in_bin(temp, dur);
            }
        }

        for reading in &obs.sensor_readings {
            self.apply_sensor_reading(reading, obs);
        }

        Ok(())
    }

    fn apply_sensor_reading(&mut self, reading: &SensorReading, obs: &Observation) {
        let date = self.date;
        let stats = match self.sensors.entry(reading.sensor_id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                match SensorStatistics::new(date, reading.sensor_id, reading.sensor_type) {
                    Some(stats) => entry.insert(stats),
                    None => {
                        warn!(
                            "Skipping reading from sensor {}: {} is not summarised",
                            reading.sensor_id, reading.sensor_type
                        );
                        return;
                    }
                }
            }
        };

        if reading.sensor_type.family() != Some(stats.family()) {
            warn!(
                "Skipping reading from sensor {}: {} does not match its {:?} history",
                reading.sensor_id,
                reading.sensor_type,
                stats.family()
            );
            return;
        }

        stats.apply_value(reading.value, obs.time, obs.duration);
    }

    /// Check that `other` has the same schema, without touching anything
    fn check_mergeable(&self, other: &Self) -> SummaryResult<()> {
        self.wind_rose.check_compatible(&other.wind_rose)?;

        // Sorted rather than a set: each id must appear as often on both sides.
        let mut mine: Vec<u32> = self.threshold_bins.iter().map(|b| b.bin_id()).collect();
        let mut theirs: Vec<u32> = other.threshold_bins.iter().map(|b| b.bin_id()).collect();
        mine.sort_unstable();
        theirs.sort_unstable();
        if mine != theirs {
            return Err(SummaryError::mismatch(format!(
                "threshold bins {:?} cannot merge {:?}",
                mine, theirs
            )));
        }

        for (id, theirs) in &other.sensors {
            if let Some(mine) = self.sensors.get(id) {
                if mine.family() != theirs.family() {
                    return Err(SummaryError::mismatch(format!(
                        "sensor {} is {:?} here but {:?} in the merged period",
                        id,
                        mine.family(),
                        theirs.family()
                    )));
                }
            }
        }

        Ok(())
    }

    /// Fold the summary of a sub-period (or sibling period) into this one.
    ///
    /// Fails with [`SummaryError::ConfigMismatch`] before any mutation when
    /// the wind rose shape, threshold bin ids or sensor families differ.
    pub fn merge_period(&mut self, other: &Self) -> SummaryResult<()> {
        self.check_mergeable(other)?;

        // A summary built from raw data becomes one of its own sub-periods.
        if !self.merged && self.period_temps.is_empty() {
            self.period_temps.apply_period(&self.outdoor_temp, self.date);
        }
        if other.period_temps.is_empty() {
            self.period_temps.apply_period(&other.outdoor_temp, other.date);
        } else {
            self.period_temps.merge(&other.period_temps);
        }

        self.duration += other.duration;
        self.outdoor_temp.merge(&other.outdoor_temp);
        self.indoor_temp.merge(&other.indoor_temp);
        self.outdoor_humidity.merge(&other.outdoor_humidity);
        self.indoor_humidity.merge(&other.indoor_humidity);
        self.baro_pressure.merge(&other.baro_pressure);
        self.wind_speed.merge(&other.wind_speed);
        self.wind_gust.merge(&other.wind_gust);
        self.solar_radiation.merge(&other.solar_radiation);
        self.dew_point.merge(&other.dew_point);
        self.heat_index.merge(&other.heat_index);
        self.wind_chill.merge(&other.wind_chill);

        self.wind_rose.merge(&other.wind_rose)?;

        self.total_rainfall.0 += other.total_rainfall.0;
        if let Some(rate) = other.max_rainfall_rate {
            keep_max(&mut self.max_rainfall_rate, rate);
        }
        self.total_et.0 += other.total_et.0;
        self.hourly_rainfall.merge(&other.hourly_rainfall);

        for mine in &mut self.threshold_bins {
            if let Some(theirs) = other.threshold_bins.iter().find(|t| mine.is_same_bin(t)) {
                mine.add_duration(theirs.duration());
            }
        }

        for (id, theirs) in &other.sensors {
            match self.sensors.entry(*id) {
                Entry::Occupied(mut entry) => entry.get_mut().merge(theirs)?,
                Entry::Vacant(entry) => {
                    entry.insert(SensorStatistics::redated(theirs, self.date));
                }
            }
        }

        self.merged = true;
        debug!(
            "Merged period {} into {} ({}s total)",
            other.date,
            self.date,
            self.duration.as_secs()
        );
        Ok(())
    }

    accumulator_accessors! {
        outdoor_temp, outdoor_temp_mut: Temperature;
        indoor_temp, indoor_temp_mut: Temperature;
        outdoor_humidity, outdoor_humidity_mut: Humidity;
        indoor_humidity, indoor_humidity_mut: Humidity;
        baro_pressure, baro_pressure_mut: Pressure;
        wind_speed, wind_speed_mut: Speed;
        wind_gust, wind_gust_mut: Speed;
        solar_radiation, solar_radiation_mut: SolarRadiation;
        dew_point, dew_point_mut: Temperature;
        heat_index, heat_index_mut: Temperature;
        wind_chill, wind_chill_mut: Temperature;
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn is_merged(&self) -> bool {
        self.merged
    }

    pub fn period_temperatures(&self) -> &PeriodTemperatures {
        &self.period_temps
    }

    pub fn period_temperatures_mut(&mut self) -> &mut PeriodTemperatures {
        &mut self.period_temps
    }

    pub fn wind_rose(&self) -> &WindRose {
        &self.wind_rose
    }

    pub fn threshold_bins(&self) -> &[ThresholdBinDuration] {
        &self.threshold_bins
    }

    pub fn threshold_bin(&self, id: u32) -> Option<&ThresholdBinDuration> {
        self.threshold_bins.iter().find(|b| b.bin_id() == id)
    }

    pub fn hourly_rainfall(&self) -> &HourlyDepthMap {
        &self.hourly_rainfall
    }

    pub fn total_rainfall(&self) -> Depth {
        self.total_rainfall
    }

    pub fn max_rainfall_rate(&self) -> Option<&Extremum<Depth>> {
        self.max_rainfall_rate.as_ref()
    }

    pub fn total_et(&self) -> Depth {
        self.total_et
    }

    pub fn sensor(&self, sensor_id: u32) -> Option<&SensorStatistics> {
        self.sensors.get(&sensor_id)
    }

    /// Sensor statistics in ascending sensor id order
    pub fn sensors(&self) -> impl Iterator<Item = &SensorStatistics> + '_ {
        self.sensors.values()
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    /// Replace the wind rose. The new rose must have the same shape.
    pub fn set_wind_rose(&mut self, rose: WindRose) -> SummaryResult<()> {
        self.wind_rose.check_compatible(&rose)?;
        self.wind_rose = rose;
        Ok(())
    }

    /// Overwrite the duration stored for threshold bin `id`
    pub fn set_threshold_bin_duration(&mut self, id: u32, duration: Duration) -> SummaryResult<()> {
        let bin = self
            .threshold_bins
            .iter_mut()
            .find(|b| b.bin_id() == id)
            .ok_or_else(|| SummaryError::mismatch(format!("threshold bin {} is not configured", id)))?;
        *bin = ThresholdBinDuration::with_duration(*bin.bin(), bin.date(), duration);
        Ok(())
    }

    pub fn set_hourly_rainfall(&mut self, hourly: HourlyDepthMap) {
        self.hourly_rainfall = hourly;
    }

    pub fn set_total_rainfall(&mut self, depth: Depth) {
        self.total_rainfall = depth;
    }

    pub fn set_max_rainfall_rate(&mut self, rate: Option<Extremum<Depth>>) {
        self.max_rainfall_rate = rate;
    }

    pub fn set_total_et(&mut self, depth: Depth) {
        self.total_et = depth;
    }

    /// Insert or replace the statistics of one sensor
    pub fn set_sensor(&mut self, stats: SensorStatistics) {
        self.sensors.insert(stats.sensor_id(), stats);
    }

    /// Mark a rehydrated summary as the product of merges
    pub fn set_merged(&mut self, merged: bool) {
        self.merged = merged;
    }

    fn midnight(&self) -> chrono::NaiveDateTime {
        self.date.and_time(NaiveTime::MIN)
    }

    /// Hottest high of the period, or the period's own maximum
    pub fn max_high_outdoor_temp(&self) -> Option<Extremum<Temperature>> {
        self.period_temps
            .high
            .max_extremum()
            .or(self.outdoor_temp.max_extremum())
            .copied()
    }

    /// Coolest high of the period, or the period's own maximum
    pub fn min_high_outdoor_temp(&self) -> Option<Extremum<Temperature>> {
        self.period_temps
            .high
            .min_extremum()
            .or(self.outdoor_temp.max_extremum())
            .copied()
    }

    pub fn avg_high_outdoor_temp(&self) -> Option<Temperature> {
        self.period_temps.high.average().or(self.outdoor_temp.maximum())
    }

    /// Warmest low of the period, or the period's own minimum
    pub fn max_low_outdoor_temp(&self) -> Option<Extremum<Temperature>> {
        self.period_temps
            .low
            .max_extremum()
            .or(self.outdoor_temp.min_extremum())
            .copied()
    }

    /// Coldest low of the period, or the period's own minimum
    pub fn min_low_outdoor_temp(&self) -> Option<Extremum<Temperature>> {
        self.period_temps
            .low
            .min_extremum()
            .or(self.outdoor_temp.min_extremum())
            .copied()
    }

    pub fn avg_low_outdoor_temp(&self) -> Option<Temperature> {
        self.period_temps.low.average().or(self.outdoor_temp.minimum())
    }

    pub fn max_mean_outdoor_temp(&self) -> Option<Extremum<Temperature>> {
        self.period_temps.mean.max_extremum().copied().or_else(|| {
            self.outdoor_temp
                .average()
                .map(|avg| Extremum::new(avg, self.midnight()))
        })
    }

    pub fn min_mean_outdoor_temp(&self) -> Option<Extremum<Temperature>> {
        self.period_temps.mean.min_extremum().copied().or_else(|| {
            self.outdoor_temp
                .average()
                .map(|avg| Extremum::new(avg, self.midnight()))
        })
    }
}

fn write_extremum(f: &mut fmt::Formatter<'_>, label: &str, e: Option<Extremum<Temperature>>) -> fmt::Result {
    match e {
        Some(e) => writeln!(f, "{}: {} at {}", label, e.value, e.time.format("%Y-%m-%d %H:%M")),
        None => writeln!(f, "{}: N/A", label),
    }
}

impl fmt::Display for PeriodSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary for {} ({}s)", self.date, self.duration.as_secs())?;
        writeln!(f, "Outdoor Temperature: {}", self.outdoor_temp)?;
        write_extremum(f, "  Highest High", self.max_high_outdoor_temp())?;
        write_extremum(f, "  Lowest High", self.min_high_outdoor_temp())?;
        write_extremum(f, "  Highest Low", self.max_low_outdoor_temp())?;
        write_extremum(f, "  Lowest Low", self.min_low_outdoor_temp())?;
        writeln!(f, "Indoor Temperature: {}", self.indoor_temp)?;
        writeln!(f, "Outdoor Humidity: {}", self.outdoor_humidity)?;
        writeln!(f, "Indoor Humidity: {}", self.indoor_humidity)?;
        writeln!(f, "Barometric Pressure: {}", self.baro_pressure)?;
        writeln!(f, "Wind Speed: {}", self.wind_speed)?;
        writeln!(f, "Wind Gust: {}", self.wind_gust)?;
        writeln!(f, "Solar Radiation: {}", self.solar_radiation)?;
        writeln!(f, "Dew Point: {}", self.dew_point)?;
        writeln!(f, "Heat Index: {}", self.heat_index)?;
        writeln!(f, "Wind Chill: {}", self.wind_chill)?;
        write!(f, "Rainfall: {}", self.total_rainfall)?;
        match self.max_rainfall_rate {
            Some(rate) => writeln!(f, "  Max Rate: {} at {}", rate.value, rate.time.format("%H:%M"))?,
            None => writeln!(f)?,
        }
        for (hour, depth) in self.hourly_rainfall.hours() {
            writeln!(f, "  {:02}:00 {}", hour, depth)?;
        }
        writeln!(f, "ET: {}", self.total_et)?;
        for bin in &self.threshold_bins {
            writeln!(f, "Threshold {}: {}s", bin.bin(), bin.duration().as_secs())?;
        }
        for sensor in self.sensors.values() {
            writeln!(f, "{}", sensor)?;
        }
        write!(f, "Wind Rose:\n{}", self.wind_rose)
    }
}
