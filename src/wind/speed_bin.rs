use core::fmt;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::quantity::Speed;

/// A wind speed range with an exclusive lower and inclusive upper bound
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedBin {
    index: usize,
    min: Speed,
    max: Speed,
}

impl SpeedBin {
    /// Lower bound of the first bin
    pub const MIN_SPEED: Speed = Speed(0.0);
    /// Upper bound of the last, open-ended bin
    pub const MAX_SPEED: Speed = Speed(1000.0);

    pub const fn new(index: usize, min: Speed, max: Speed) -> Self {
        Self { index, min, max }
    }

    /// `min < speed <= max`. A calm sample never lands in a bin.
    pub fn contains(&self, speed: Speed) -> bool {
        speed.0 > self.min.0 && speed.0 <= self.max.0
    }

    pub const fn index(&self) -> usize {
        self.index
    }

    pub const fn min(&self) -> Speed {
        self.min
    }

    pub const fn max(&self) -> Speed {
        self.max
    }
}

impl fmt::Display for SpeedBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == Self::MIN_SPEED {
            write!(f, "<={}", self.max)
        } else if self.max == Self::MAX_SPEED {
            write!(f, ">{}", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}

/// Time the wind spent in one speed bin within one direction sector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedBinDuration {
    speed_bin_index: usize,
    sector_index: usize,
    date: NaiveDate,
    duration: Duration,
}

impl SpeedBinDuration {
    pub fn new(speed_bin_index: usize, sector_index: usize, date: NaiveDate) -> Self {
        Self::with_duration(speed_bin_index, sector_index, date, Duration::ZERO)
    }

    pub fn with_duration(
        speed_bin_index: usize,
        sector_index: usize,
        date: NaiveDate,
        duration: Duration,
    ) -> Self {
        Self {
            speed_bin_index,
            sector_index,
            date,
            duration,
        }
    }

    pub fn add_duration(&mut self, duration: Duration) {
        self.duration += duration;
    }

    pub fn speed_bin_index(&self) -> usize {
        self.speed_bin_index
    }

    pub fn sector_index(&self) -> usize {
        self.sector_index
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}
