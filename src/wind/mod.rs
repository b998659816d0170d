//! Wind rose: a direction × speed histogram of wind time.
//!
//! The compass is split into equal direction sectors ("slices") centred on
//! north, and each sector further tracks how long the wind blew within each
//! configured speed bin. Calm samples (speed exactly zero) only count toward
//! the rose's calm time.

mod rose;
mod slice;
mod speed_bin;

pub use rose::WindRose;
pub use slice::WindDirectionSlice;
pub use speed_bin::{SpeedBin, SpeedBinDuration};

use serde::{Deserialize, Serialize};

use crate::error::{SummaryError, SummaryResult};
use crate::quantity::Speed;

/// Default number of direction sectors
pub const DEFAULT_DIRECTION_SLICES: usize = 16;

/// Default number of speed bins
pub const DEFAULT_SPEED_BINS: usize = 5;

/// Default speed bin width (mph)
pub const DEFAULT_SPEED_BIN_INTERVAL: Speed = Speed(5.0);

/// Shape of a wind rose: sector count and speed bin layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindParameters {
    pub speed_bin_interval: Speed,
    pub speed_bin_count: usize,
    pub direction_slice_count: usize,
}

impl Default for WindParameters {
    fn default() -> Self {
        Self {
            speed_bin_interval: DEFAULT_SPEED_BIN_INTERVAL,
            speed_bin_count: DEFAULT_SPEED_BINS,
            direction_slice_count: DEFAULT_DIRECTION_SLICES,
        }
    }
}

impl WindParameters {
    pub fn new(
        speed_bin_interval: Speed,
        speed_bin_count: usize,
        direction_slice_count: usize,
    ) -> SummaryResult<Self> {
        let params = Self {
            speed_bin_interval,
            speed_bin_count,
            direction_slice_count,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> SummaryResult<()> {
        if self.direction_slice_count == 0 || self.direction_slice_count > 360 {
            return Err(SummaryError::InvalidWindParameters {
                reason: "direction slice count must be between 1 and 360",
            });
        }
        if self.speed_bin_count == 0 {
            return Err(SummaryError::InvalidWindParameters {
                reason: "at least one speed bin is required",
            });
        }
        if !(self.speed_bin_interval.0 > 0.0) {
            return Err(SummaryError::InvalidWindParameters {
                reason: "speed bin interval must be positive",
            });
        }
        Ok(())
    }

    /// Speed bins `(i*w, (i+1)*w]`, with the last bin open up to
    /// [`SpeedBin::MAX_SPEED`]
    pub fn speed_bins(&self) -> Vec<SpeedBin> {
        let mut bins = Vec::with_capacity(self.speed_bin_count);
        let mut min = SpeedBin::MIN_SPEED;
        let mut max = self.speed_bin_interval;

        for i in 0..self.speed_bin_count.saturating_sub(1) {
            bins.push(SpeedBin::new(i, min, max));
            min = Speed(min.0 + self.speed_bin_interval.0);
            max = Speed(max.0 + self.speed_bin_interval.0);
        }

        if self.speed_bin_count > 0 {
            bins.push(SpeedBin::new(self.speed_bin_count - 1, min, SpeedBin::MAX_SPEED));
        }
        bins
    }
}

/// Direction sector a heading falls into.
///
/// With 360 sectors the sector is the whole-degree heading. Otherwise sector
/// 0 is centred on north and spans `[0, arc/2)` and `[360 - arc/2, 360)`;
/// sector `i` spans `[arc/2 + (i-1)*arc, arc/2 + i*arc)`. Headings outside
/// every range fall back to sector 0.
pub fn sector_index(heading: f64, sector_count: usize) -> usize {
    if sector_count == 360 {
        let index = heading.floor() as usize;
        return if index < 360 { index } else { 0 };
    }

    let arc = 360.0 / sector_count as f64;
    let mut start = 0.0;
    let mut end = arc / 2.0;
    for i in 0..sector_count {
        if heading >= start && heading < end {
            return i;
        }
        start = end;
        end += arc;
    }
    0
}
