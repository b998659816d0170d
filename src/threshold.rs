//! Threshold bins: how long a quantity stayed above or below a set point.
//!
//! Typical bins are "outdoor temperature at or above 80°F" or "below
//! freezing". Bins are configured externally and identified by id; a summary
//! is seeded with one [`ThresholdBinDuration`] per configured bin.

use core::fmt;
use std::time::Duration;

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{SummaryError, SummaryResult};
use crate::quantity::{Quantity, Temperature};

/// Which side of the threshold a bin counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdDirection {
    /// value >= threshold
    Above,
    /// value < threshold
    Below,
}

/// An immutable threshold predicate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBin<Q = Temperature> {
    id: u32,
    direction: ThresholdDirection,
    threshold: Q,
}

impl<Q: Quantity> ThresholdBin<Q> {
    pub const fn new(id: u32, direction: ThresholdDirection, threshold: Q) -> Self {
        Self {
            id,
            direction,
            threshold,
        }
    }

    pub fn is_in_bin(&self, value: Q) -> bool {
        match self.direction {
            ThresholdDirection::Above => value.value() >= self.threshold.value(),
            ThresholdDirection::Below => value.value() < self.threshold.value(),
        }
    }

    pub const fn id(&self) -> u32 {
        self.id
    }

    pub const fn direction(&self) -> ThresholdDirection {
        self.direction
    }

    pub fn threshold(&self) -> Q {
        self.threshold
    }
}

impl<Q: Quantity + fmt::Display> fmt::Display for ThresholdBin<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.direction {
            ThresholdDirection::Above => ">=",
            ThresholdDirection::Below => "<",
        };
        write!(f, "ID={} {} {}", self.id, op, self.threshold)
    }
}

/// Bin ids identify a bin across periods, so each may appear only once
pub fn check_unique_ids<Q: Quantity>(bins: &[ThresholdBin<Q>]) -> SummaryResult<()> {
    let mut seen = HashSet::new();
    for bin in bins {
        if !seen.insert(bin.id()) {
            return Err(SummaryError::mismatch(format!(
                "threshold bin id {} configured twice",
                bin.id()
            )));
        }
    }
    Ok(())
}

/// Time accumulated against one [`ThresholdBin`] for a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBinDuration<Q = Temperature> {
    bin: ThresholdBin<Q>,
    date: NaiveDate,
    duration: Duration,
}

impl<Q: Quantity> ThresholdBinDuration<Q> {
    pub fn new(bin: ThresholdBin<Q>, date: NaiveDate) -> Self {
        Self::with_duration(bin, date, Duration::ZERO)
    }

    pub fn with_duration(bin: ThresholdBin<Q>, date: NaiveDate, duration: Duration) -> Self {
        Self {
            bin,
            date,
            duration,
        }
    }

    /// Add `duration` if `value` satisfies the bin's predicate
    pub fn add_duration_if_in_bin(&mut self, value: Q, duration: Duration) {
        if self.bin.is_in_bin(value) {
            self.duration += duration;
        }
    }

    /// Unconditional add, for merging the same bin from another period
    pub fn add_duration(&mut self, duration: Duration) {
        self.duration += duration;
    }

    pub fn is_same_bin(&self, other: &Self) -> bool {
        self.bin.id() == other.bin.id()
    }

    pub fn bin_id(&self) -> u32 {
        self.bin.id()
    }

    pub fn bin(&self) -> &ThresholdBin<Q> {
        &self.bin
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}
