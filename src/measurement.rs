//! Running extrema and duration-weighted averages of a single quantity.
//!
//! [`MeasurementAccumulator`] is the building block of every summary. It can be
//! fed raw values one at a time or merged with another accumulator covering a
//! different time span, and both paths give the same result: averages are
//! always kept as a weighted sum plus total duration, never as an average of
//! averages.

use core::fmt;
use core::marker::PhantomData;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::quantity::Quantity;

/// A minimum or maximum value together with the time it was observed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extremum<Q> {
    pub value: Q,
    pub time: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtremeKind {
    Minimum,
    Maximum,
}

impl<Q: Quantity> Extremum<Q> {
    pub fn new(value: Q, time: NaiveDateTime) -> Self {
        Self { value, time }
    }

    /// Whether `self` should replace `current` as the extreme.
    ///
    /// Equal values keep the earlier time so the result does not depend on
    /// the order periods are merged in.
    fn supersedes(&self, current: &Self, kind: ExtremeKind) -> bool {
        let candidate = self.value.value();
        let held = current.value.value();
        let better = match kind {
            ExtremeKind::Minimum => candidate < held,
            ExtremeKind::Maximum => candidate > held,
        };
        better || (candidate == held && self.time < current.time)
    }
}

fn apply_extreme<Q: Quantity>(slot: &mut Option<Extremum<Q>>, candidate: Extremum<Q>, kind: ExtremeKind) {
    let replace = match slot {
        None => true,
        Some(current) => candidate.supersedes(current, kind),
    };
    if replace {
        *slot = Some(candidate);
    }
}

/// Keep the larger of `slot` and `candidate`, the earlier one on ties
pub(crate) fn keep_max<Q: Quantity>(slot: &mut Option<Extremum<Q>>, candidate: Extremum<Q>) {
    if !candidate.value.value().is_nan() {
        apply_extreme(slot, candidate, ExtremeKind::Maximum);
    }
}

/// Duration-weighted average stored as `sum(value * seconds)` and total time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedAverage<Q> {
    weighted_sum: f64,
    duration: Duration,
    #[serde(skip)]
    _quantity: PhantomData<Q>,
}

impl<Q> Default for WeightedAverage<Q> {
    fn default() -> Self {
        Self {
            weighted_sum: 0.0,
            duration: Duration::ZERO,
            _quantity: PhantomData,
        }
    }
}

impl<Q: Quantity> WeightedAverage<Q> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a persisted average and the duration it covers
    pub fn from_average(average: Q, duration: Duration) -> Self {
        Self {
            weighted_sum: average.value() * duration.as_secs_f64(),
            duration,
            _quantity: PhantomData,
        }
    }

    pub fn apply(&mut self, value: Q, duration: Duration) {
        self.weighted_sum += value.value() * duration.as_secs_f64();
        self.duration += duration;
    }

    pub fn merge(&mut self, other: &Self) {
        self.weighted_sum += other.weighted_sum;
        self.duration += other.duration;
    }

    /// The average, or `None` when no time has been accumulated
    pub fn average(&self) -> Option<Q> {
        if self.duration.is_zero() {
            None
        } else {
            Some(Q::from_value(self.weighted_sum / self.duration.as_secs_f64()))
        }
    }

    pub fn weighted_sum(&self) -> f64 {
        self.weighted_sum
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

/// Min/max with timestamps and a duration-weighted average of one quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementAccumulator<Q> {
    min: Option<Extremum<Q>>,
    max: Option<Extremum<Q>>,
    average: WeightedAverage<Q>,
}

impl<Q> Default for MeasurementAccumulator<Q> {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            average: WeightedAverage::default(),
        }
    }
}

impl<Q: Quantity> MeasurementAccumulator<Q> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate from persisted fields
    pub fn from_parts(
        min: Option<Extremum<Q>>,
        max: Option<Extremum<Q>>,
        average: Option<Q>,
        duration: Duration,
    ) -> Self {
        let average = match average {
            Some(avg) => WeightedAverage::from_average(avg, duration),
            None => WeightedAverage::default(),
        };
        Self { min, max, average }
    }

    /// Apply one sample valid for `duration`. Missing (or NaN) values are skipped.
    pub fn apply_value(&mut self, value: Option<Q>, time: NaiveDateTime, duration: Duration) {
        let Some(value) = value.filter(|v| !v.value().is_nan()) else {
            return;
        };
        apply_extreme(&mut self.min, Extremum::new(value, time), ExtremeKind::Minimum);
        apply_extreme(&mut self.max, Extremum::new(value, time), ExtremeKind::Maximum);
        self.average.apply(value, duration);
    }

    /// Apply a record that already summarises a sub-interval.
    ///
    /// `min` and `max` only feed the extrema, `avg` only feeds the average.
    pub fn apply_precomputed(
        &mut self,
        min: Option<Q>,
        max: Option<Q>,
        avg: Option<Q>,
        time: NaiveDateTime,
        duration: Duration,
    ) {
        if let Some(min) = min.filter(|v| !v.value().is_nan()) {
            apply_extreme(&mut self.min, Extremum::new(min, time), ExtremeKind::Minimum);
        }
        if let Some(max) = max.filter(|v| !v.value().is_nan()) {
            apply_extreme(&mut self.max, Extremum::new(max, time), ExtremeKind::Maximum);
        }
        if let Some(avg) = avg.filter(|v| !v.value().is_nan()) {
            self.average.apply(avg, duration);
        }
    }

    /// Fold another accumulator of the same quantity into this one
    pub fn merge(&mut self, other: &Self) {
        if let Some(min) = other.min {
            apply_extreme(&mut self.min, min, ExtremeKind::Minimum);
        }
        if let Some(max) = other.max {
            apply_extreme(&mut self.max, max, ExtremeKind::Maximum);
        }
        self.average.merge(&other.average);
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none() && self.average.duration().is_zero()
    }

    pub fn min_extremum(&self) -> Option<&Extremum<Q>> {
        self.min.as_ref()
    }

    pub fn max_extremum(&self) -> Option<&Extremum<Q>> {
        self.max.as_ref()
    }

    pub fn minimum(&self) -> Option<Q> {
        self.min.map(|e| e.value)
    }

    pub fn minimum_time(&self) -> Option<NaiveDateTime> {
        self.min.map(|e| e.time)
    }

    pub fn maximum(&self) -> Option<Q> {
        self.max.map(|e| e.value)
    }

    pub fn maximum_time(&self) -> Option<NaiveDateTime> {
        self.max.map(|e| e.time)
    }

    pub fn average(&self) -> Option<Q> {
        self.average.average()
    }

    pub fn weighted_sum(&self) -> f64 {
        self.average.weighted_sum()
    }

    /// Total time covered by the average
    pub fn duration(&self) -> Duration {
        self.average.duration()
    }

    pub fn set_minimum(&mut self, value: Q, time: NaiveDateTime) {
        self.min = Some(Extremum::new(value, time));
    }

    pub fn set_maximum(&mut self, value: Q, time: NaiveDateTime) {
        self.max = Some(Extremum::new(value, time));
    }

    pub fn set_average(&mut self, average: Q, duration: Duration) {
        self.average = WeightedAverage::from_average(average, duration);
    }
}

impl<Q: Quantity + fmt::Display> fmt::Display for MeasurementAccumulator<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.min {
            Some(e) => write!(f, "Min: {} ({})", e.value, e.time.format("%Y-%m-%d %H:%M"))?,
            None => write!(f, "Min: N/A")?,
        }
        match self.max {
            Some(e) => write!(f, "  Max: {} ({})", e.value, e.time.format("%Y-%m-%d %H:%M"))?,
            None => write!(f, "  Max: N/A")?,
        }
        match self.average() {
            Some(avg) => write!(f, "  Avg: {}", avg),
            None => write!(f, "  Avg: N/A"),
        }
    }
}
