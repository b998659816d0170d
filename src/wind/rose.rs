use core::fmt;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::slice::percentage;
use super::{SpeedBin, WindDirectionSlice, WindParameters, sector_index};
use crate::error::{SummaryError, SummaryResult};
use crate::observation::Wind;
use crate::quantity::{Heading, Speed};

/// Direction × speed histogram of wind time for one period
///
/// The rose owns the only copy of the total and calm durations; per-sector
/// percentages are computed from them on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindRose {
    date: NaiveDate,
    slices: Vec<WindDirectionSlice>,
    speed_bins: Vec<SpeedBin>,
    total_duration: Duration,
    calm_duration: Duration,
}

impl WindRose {
    /// An empty rose. Fails when `params` cannot describe a rose.
    pub fn new(date: NaiveDate, params: &WindParameters) -> SummaryResult<Self> {
        params.validate()?;

        let speed_bins = params.speed_bins();
        let slices = (0..params.direction_slice_count)
            .map(|i| WindDirectionSlice::new(date, i, &speed_bins))
            .collect();

        Ok(Self {
            date,
            slices,
            speed_bins,
            total_duration: Duration::ZERO,
            calm_duration: Duration::ZERO,
        })
    }

    /// Rehydrate a rose from persisted fields.
    ///
    /// Slices must be stored in sector order with one duration per speed bin.
    pub fn from_parts(
        date: NaiveDate,
        speed_bins: Vec<SpeedBin>,
        slices: Vec<WindDirectionSlice>,
        total_duration: Duration,
        calm_duration: Duration,
    ) -> SummaryResult<Self> {
        if slices.is_empty() {
            return Err(SummaryError::mismatch("wind rose without direction slices"));
        }
        for (i, slice) in slices.iter().enumerate() {
            if slice.sector_index() != i {
                return Err(SummaryError::mismatch(format!(
                    "slice {} stored at position {}",
                    slice.sector_index(),
                    i
                )));
            }
            if slice.num_speed_bins() != speed_bins.len() {
                return Err(SummaryError::mismatch(format!(
                    "slice {} has {} speed bins, expected {}",
                    i,
                    slice.num_speed_bins(),
                    speed_bins.len()
                )));
            }
        }
        if calm_duration > total_duration {
            return Err(SummaryError::mismatch("calm duration exceeds total duration"));
        }

        Ok(Self {
            date,
            slices,
            speed_bins,
            total_duration,
            calm_duration,
        })
    }

    /// Sector index for a heading under this rose's sector count
    pub fn sector_for(&self, heading: Heading) -> usize {
        sector_index(heading.0, self.slices.len())
    }

    pub fn apply_wind(&mut self, duration: Duration, wind: Wind) {
        self.apply_observation(duration, wind.speed, wind.direction);
    }

    /// Record `duration` of wind at `speed` from `heading`
    pub fn apply_observation(&mut self, duration: Duration, speed: Speed, heading: Heading) {
        self.total_duration += duration;

        if speed.0 == 0.0 {
            self.calm_duration += duration;
            return;
        }

        let sector = self.sector_for(heading);
        if let Some(slice) = self.slices.get_mut(sector) {
            slice.apply_sample(duration, speed, &self.speed_bins);
        }
    }

    /// Whether `other` has the same sector count and speed bin layout
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.slices.len() == other.slices.len() && self.speed_bins == other.speed_bins
    }

    pub(crate) fn check_compatible(&self, other: &Self) -> SummaryResult<()> {
        if self.slices.len() != other.slices.len() {
            return Err(SummaryError::mismatch(format!(
                "wind rose has {} sectors, other has {}",
                self.slices.len(),
                other.slices.len()
            )));
        }
        if self.speed_bins != other.speed_bins {
            return Err(SummaryError::mismatch("wind rose speed bins differ"));
        }
        Ok(())
    }

    /// Fold another rose of the same shape into this one
    pub fn merge(&mut self, other: &Self) -> SummaryResult<()> {
        self.check_compatible(other)?;

        self.total_duration += other.total_duration;
        self.calm_duration += other.calm_duration;

        for (mine, theirs) in self.slices.iter_mut().zip(&other.slices) {
            mine.merge(theirs);
        }
        Ok(())
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn num_slices(&self) -> usize {
        self.slices.len()
    }

    pub fn slice(&self, index: usize) -> Option<&WindDirectionSlice> {
        self.slices.get(index)
    }

    pub fn slices(&self) -> &[WindDirectionSlice] {
        &self.slices
    }

    pub fn speed_bins(&self) -> &[SpeedBin] {
        &self.speed_bins
    }

    pub fn total_duration(&self) -> Duration {
        self.total_duration
    }

    pub fn calm_duration(&self) -> Duration {
        self.calm_duration
    }

    /// Time the wind was not calm
    pub fn windy_duration(&self) -> Duration {
        self.total_duration.saturating_sub(self.calm_duration)
    }

    pub fn calm_percentage(&self) -> f64 {
        percentage(self.calm_duration, self.total_duration)
    }

    /// Share of all recorded time the wind blew from sector `index`
    pub fn percentage_of_total(&self, index: usize) -> f64 {
        self.slice(index)
            .map_or(0.0, |s| s.percentage_of(self.total_duration))
    }

    /// Share of the windy (non-calm) time the wind blew from sector `index`
    pub fn percentage_of_wind(&self, index: usize) -> f64 {
        self.slice(index)
            .map_or(0.0, |s| s.percentage_of(self.windy_duration()))
    }
}

impl fmt::Display for WindRose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Total time: {}\nCalm: {} {:.1}%",
            self.total_duration.as_secs(),
            self.calm_duration.as_secs(),
            self.calm_percentage()
        )?;
        for (i, slice) in self.slices.iter().enumerate() {
            writeln!(
                f,
                "{} % of Wind {:.1}% % of Total {:.1}%",
                slice,
                self.percentage_of_wind(i),
                self.percentage_of_total(i)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn minutes(m: u64) -> Duration {
        Duration::from_secs(m * 60)
    }

    fn rose() -> WindRose {
        WindRose::new(day(), &WindParameters::default()).unwrap()
    }

    #[test]
    fn test_new_rose_shape() {
        let rose = rose();
        assert_eq!(rose.num_slices(), 16);
        assert_eq!(rose.speed_bins().len(), 5);
        assert!(rose.slices().iter().all(|s| s.num_speed_bins() == 5));
        assert_eq!(rose.percentage_of_total(0), 0.0);
    }

    #[test]
    fn test_calm_sample_only_touches_totals() {
        let mut rose = rose();
        rose.apply_observation(minutes(10), Speed(0.0), Heading(45.0));

        assert_eq!(rose.total_duration(), minutes(10));
        assert_eq!(rose.calm_duration(), minutes(10));
        assert_eq!(rose.windy_duration(), Duration::ZERO);
        assert!(rose.slices().iter().all(|s| s.slice_duration().is_zero()));
        assert_eq!(rose.calm_percentage(), 100.0);
    }

    #[test]
    fn test_total_is_calm_plus_windy() {
        let mut rose = rose();
        let samples = [(0.0, 10.0), (3.0, 350.0), (0.0, 0.0), (12.0, 200.0), (6.5, 95.0)];
        for (speed, heading) in samples {
            rose.apply_observation(minutes(5), Speed(speed), Heading(heading));
            assert_eq!(
                rose.total_duration(),
                rose.calm_duration() + rose.windy_duration()
            );
        }
        assert_eq!(rose.calm_duration(), minutes(10));
        assert_eq!(rose.windy_duration(), minutes(15));
    }

    #[test]
    fn test_percentages_follow_global_totals() {
        let mut rose = rose();
        rose.apply_observation(minutes(30), Speed(4.0), Heading(0.0));
        rose.apply_observation(minutes(10), Speed(0.0), Heading(0.0));
        rose.apply_observation(minutes(10), Speed(9.0), Heading(90.0));

        // Sector 0 is 30 of 50 minutes in total and 30 of 40 windy minutes.
        assert!((rose.percentage_of_total(0) - 60.0).abs() < 1e-9);
        assert!((rose.percentage_of_wind(0) - 75.0).abs() < 1e-9);

        // A later sample elsewhere lowers sector 0's share without touching it.
        rose.apply_observation(minutes(40), Speed(9.0), Heading(90.0));
        assert!((rose.percentage_of_total(0) - 33.333_333_333).abs() < 1e-6);
        assert_eq!(rose.slice(0).unwrap().slice_duration(), minutes(30));
    }

    #[test]
    fn test_sample_lands_in_sector_and_bin() {
        let mut rose = rose();
        rose.apply_observation(minutes(5), Speed(5.0), Heading(348.75));
        rose.apply_observation(minutes(5), Speed(5.0001), Heading(11.26));

        let north = rose.slice(0).unwrap();
        assert_eq!(north.bin_durations()[0].duration(), minutes(5));
        assert_eq!(north.bin_durations()[1].duration(), Duration::ZERO);

        let nne = rose.slice(1).unwrap();
        assert_eq!(nne.bin_durations()[0].duration(), Duration::ZERO);
        assert_eq!(nne.bin_durations()[1].duration(), minutes(5));
    }

    #[test]
    fn test_merge_matches_direct_application() {
        let samples = [
            (4.0, 10.0),
            (0.0, 10.0),
            (17.0, 181.0),
            (2.5, 359.0),
            (30.0, 270.0),
            (9.0, 12.0),
        ];

        let mut direct = rose();
        for (speed, heading) in samples {
            direct.apply_observation(minutes(5), Speed(speed), Heading(heading));
        }

        let mut first = rose();
        let mut second = rose();
        for (speed, heading) in &samples[..3] {
            first.apply_observation(minutes(5), Speed(*speed), Heading(*heading));
        }
        for (speed, heading) in &samples[3..] {
            second.apply_observation(minutes(5), Speed(*speed), Heading(*heading));
        }
        second.merge(&first).unwrap();

        assert_eq!(second.total_duration(), direct.total_duration());
        assert_eq!(second.calm_duration(), direct.calm_duration());
        for (a, b) in second.slices().iter().zip(direct.slices()) {
            assert_eq!(a.slice_duration(), b.slice_duration());
            assert_eq!(a.max_speed(), b.max_speed());
            assert_eq!(a.bin_durations(), b.bin_durations());
            match (a.avg_speed(), b.avg_speed()) {
                (Some(x), Some(y)) => assert!((x.0 - y.0).abs() < 1e-9),
                (x, y) => assert_eq!(x, y),
            }
        }
    }

    #[test]
    fn test_merge_rejects_different_shape() {
        let mut a = rose();
        a.apply_observation(minutes(5), Speed(3.0), Heading(0.0));
        let before = a.clone();

        let eight = WindParameters::new(Speed(5.0), 5, 8).unwrap();
        let b = WindRose::new(day(), &eight).unwrap();
        assert!(matches!(a.merge(&b), Err(SummaryError::ConfigMismatch { .. })));

        let wide = WindParameters::new(Speed(10.0), 5, 16).unwrap();
        let c = WindRose::new(day(), &wide).unwrap();
        assert!(!a.is_compatible(&c));
        assert!(a.merge(&c).is_err());

        assert_eq!(a, before);
    }

    #[test]
    fn test_new_rejects_unvalidated_parameters() {
        let no_sectors = WindParameters {
            direction_slice_count: 0,
            ..WindParameters::default()
        };
        assert!(matches!(
            WindRose::new(day(), &no_sectors),
            Err(SummaryError::InvalidWindParameters { .. })
        ));

        let no_bins = WindParameters {
            speed_bin_count: 0,
            ..WindParameters::default()
        };
        assert!(WindRose::new(day(), &no_bins).is_err());
    }

    #[test]
    fn test_from_parts_validates_layout() {
        let params = WindParameters::new(Speed(5.0), 2, 4).unwrap();
        let bins = params.speed_bins();
        let slices: Vec<_> = (0..4).map(|i| WindDirectionSlice::new(day(), i, &bins)).collect();

        let ok = WindRose::from_parts(day(), bins.clone(), slices.clone(), minutes(10), minutes(2));
        assert!(ok.is_ok());

        let mut shuffled = slices.clone();
        shuffled.swap(0, 1);
        assert!(WindRose::from_parts(day(), bins.clone(), shuffled, minutes(10), minutes(2)).is_err());

        assert!(WindRose::from_parts(day(), bins, slices, minutes(1), minutes(2)).is_err());
    }
}
