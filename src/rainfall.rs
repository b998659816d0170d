//! Per-hour rainfall for one date.

use std::ops::RangeInclusive;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{SummaryError, SummaryResult};
use crate::quantity::Depth;

/// Valid hours of the day
pub const HOURS: RangeInclusive<u32> = 0..=23;

/// Sparse hour → rainfall depth map.
///
/// An hour with no entry means no rain was recorded, which is different
/// from a recorded depth of zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyDepthMap {
    date: NaiveDate,
    hours: [Option<Depth>; 24],
}

fn check_hour(hour: u32) -> SummaryResult<usize> {
    if HOURS.contains(&hour) {
        Ok(hour as usize)
    } else {
        Err(SummaryError::InvalidHour(hour))
    }
}

impl HourlyDepthMap {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            hours: [None; 24],
        }
    }

    /// Set (or replace) the depth recorded for `hour`
    pub fn put_rain(&mut self, hour: u32, depth: Depth) -> SummaryResult<()> {
        let index = check_hour(hour)?;
        self.hours[index] = Some(depth);
        Ok(())
    }

    /// Add `depth` to whatever `hour` already holds
    pub fn add_rain(&mut self, hour: u32, depth: Depth) -> SummaryResult<()> {
        let index = check_hour(hour)?;
        let slot = &mut self.hours[index];
        *slot = Some(Depth(slot.map_or(0.0, |d| d.0) + depth.0));
        Ok(())
    }

    pub fn rain(&self, hour: u32) -> Option<Depth> {
        check_hour(hour).ok().and_then(|i| self.hours[i])
    }

    /// Hours that have a recorded depth, in ascending order
    pub fn hours(&self) -> impl Iterator<Item = (u32, Depth)> + '_ {
        self.hours
            .iter()
            .enumerate()
            .filter_map(|(hour, depth)| depth.map(|d| (hour as u32, d)))
    }

    pub fn is_empty(&self) -> bool {
        self.hours.iter().all(Option::is_none)
    }

    /// Sum of all recorded hours
    pub fn total(&self) -> Depth {
        Depth(self.hours().map(|(_, d)| d.0).sum())
    }

    /// Union of both maps, summing hours present in both
    pub fn merge(&mut self, other: &Self) {
        for (mine, theirs) in self.hours.iter_mut().zip(other.hours.iter()) {
            if let Some(theirs) = theirs {
                *mine = Some(Depth(mine.map_or(0.0, |d| d.0) + theirs.0));
            }
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 12).unwrap()
    }

    #[test]
    fn test_put_rain_replaces() {
        let mut map = HourlyDepthMap::new(day());
        map.put_rain(3, Depth(1.0)).unwrap();
        map.put_rain(3, Depth(2.5)).unwrap();
        assert_eq!(map.rain(3), Some(Depth(2.5)));
        assert_eq!(map.rain(4), None);
    }

    #[test]
    fn test_invalid_hour_is_rejected() {
        let mut map = HourlyDepthMap::new(day());
        assert!(matches!(map.put_rain(24, Depth(1.0)), Err(SummaryError::InvalidHour(24))));
        assert!(map.add_rain(99, Depth(1.0)).is_err());
        assert_eq!(map.rain(24), None);
        assert!(map.is_empty());
    }

    #[test]
    fn test_merge_sums_overlap_and_keeps_disjoint_hours() {
        let mut a = HourlyDepthMap::new(day());
        a.put_rain(14, Depth(3.0)).unwrap();
        a.put_rain(2, Depth(0.5)).unwrap();
        let mut b = HourlyDepthMap::new(day());
        b.put_rain(14, Depth(2.0)).unwrap();
        b.put_rain(20, Depth(1.25)).unwrap();

        a.merge(&b);

        assert_eq!(a.rain(14), Some(Depth(5.0)));
        assert_eq!(a.rain(2), Some(Depth(0.5)));
        assert_eq!(a.rain(20), Some(Depth(1.25)));
        assert_eq!(a.hours().map(|(h, _)| h).collect::<Vec<_>>(), vec![2, 14, 20]);
        assert_eq!(a.total(), Depth(6.75));
    }

    #[test]
    fn test_recorded_zero_is_not_absent() {
        let mut map = HourlyDepthMap::new(day());
        map.put_rain(0, Depth(0.0)).unwrap();
        assert_eq!(map.rain(0), Some(Depth(0.0)));
        assert!(!map.is_empty());
    }
}
