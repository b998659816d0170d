use core::fmt;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{SpeedBin, SpeedBinDuration};
use crate::error::{SummaryError, SummaryResult};
use crate::measurement::WeightedAverage;
use crate::quantity::Speed;

pub(crate) fn percentage(part: Duration, whole: Duration) -> f64 {
    if whole.is_zero() {
        0.0
    } else {
        part.as_secs_f64() / whole.as_secs_f64() * 100.0
    }
}

/// Wind statistics for one direction sector of a [`WindRose`](super::WindRose)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindDirectionSlice {
    date: NaiveDate,
    sector_index: usize,
    max_speed: Speed,
    /// Average speed; its duration is the time the wind blew in this sector
    speed: WeightedAverage<Speed>,
    bin_durations: Vec<SpeedBinDuration>,
}

impl WindDirectionSlice {
    pub fn new(date: NaiveDate, sector_index: usize, speed_bins: &[SpeedBin]) -> Self {
        let bin_durations = speed_bins
            .iter()
            .map(|bin| SpeedBinDuration::new(bin.index(), sector_index, date))
            .collect();

        Self {
            date,
            sector_index,
            max_speed: Speed(0.0),
            speed: WeightedAverage::new(),
            bin_durations,
        }
    }

    /// Rehydrate a slice from persisted fields
    pub fn from_parts(
        date: NaiveDate,
        sector_index: usize,
        slice_duration: Duration,
        avg_speed: Speed,
        max_speed: Speed,
        bin_durations: Vec<SpeedBinDuration>,
    ) -> SummaryResult<Self> {
        if let Some(bad) = bin_durations.iter().find(|d| d.sector_index() != sector_index) {
            return Err(SummaryError::mismatch(format!(
                "speed bin duration for sector {} stored in sector {}",
                bad.sector_index(),
                sector_index
            )));
        }

        Ok(Self {
            date,
            sector_index,
            max_speed,
            speed: WeightedAverage::from_average(avg_speed, slice_duration),
            bin_durations,
        })
    }

    /// Apply one windy sample that falls into this sector
    pub(crate) fn apply_sample(&mut self, duration: Duration, speed: Speed, speed_bins: &[SpeedBin]) {
        self.speed.apply(speed, duration);

        if speed > self.max_speed {
            self.max_speed = speed;
        }

        for (bin, bin_duration) in speed_bins.iter().zip(self.bin_durations.iter_mut()) {
            if bin.contains(speed) {
                bin_duration.add_duration(duration);
            }
        }
    }

    /// Fold the same sector of another rose into this one
    pub(crate) fn merge(&mut self, other: &Self) {
        if other.slice_duration().is_zero() {
            return;
        }

        if other.max_speed > self.max_speed {
            self.max_speed = other.max_speed;
        }
        self.speed.merge(&other.speed);

        for theirs in &other.bin_durations {
            if let Some(mine) = self
                .bin_durations
                .iter_mut()
                .find(|d| d.speed_bin_index() == theirs.speed_bin_index())
            {
                mine.add_duration(theirs.duration());
            }
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn sector_index(&self) -> usize {
        self.sector_index
    }

    /// Time the (non-calm) wind blew from this sector
    pub fn slice_duration(&self) -> Duration {
        self.speed.duration()
    }

    pub fn avg_speed(&self) -> Option<Speed> {
        self.speed.average()
    }

    pub fn max_speed(&self) -> Speed {
        self.max_speed
    }

    pub fn bin_durations(&self) -> &[SpeedBinDuration] {
        &self.bin_durations
    }

    pub fn num_speed_bins(&self) -> usize {
        self.bin_durations.len()
    }

    /// Share of this sector's time spent in speed bin `bin`
    pub fn speed_bin_percentage(&self, bin: usize) -> f64 {
        self.bin_durations
            .get(bin)
            .map_or(0.0, |d| percentage(d.duration(), self.slice_duration()))
    }

    /// Share of `total` (the rose's total time) spent in this sector
    pub fn percentage_of(&self, total: Duration) -> f64 {
        percentage(self.slice_duration(), total)
    }
}

impl fmt::Display for WindDirectionSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Heading Index: {:2} Windy Time: {:6} Max: {}",
            self.sector_index,
            self.slice_duration().as_secs(),
            self.max_speed
        )?;
        match self.avg_speed() {
            Some(avg) => write!(f, " Avg: {}", avg)?,
            None => write!(f, " Avg: N/A")?,
        }
        write!(f, " Bins:")?;
        for bin in &self.bin_durations {
            write!(f, " ({})", bin.duration().as_secs())?;
        }
        Ok(())
    }
}
