pub mod accumulator;
pub mod snapshot;
pub mod summary;

pub use accumulator::{RollupAccumulator, RollupEvent};
pub use summary::{PeriodSummary, PeriodTemperatures};

use chrono::{Datelike, NaiveDate};

/// Summary tier, from finest to coarsest
///
/// Each tier is built by merging the summaries of the tier below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SummaryTier {
    /// One calendar day, built from raw observations
    Day,
    /// One calendar month of day summaries
    Month,
    /// One calendar year of month summaries
    Year,
}

impl SummaryTier {
    /// Get a short label for logs and reports
    pub const fn label(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// The date a summary of this tier containing `date` is keyed by
    pub fn period_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Day => date,
            Self::Month => date.with_day(1).unwrap_or(date),
            Self::Year => date.with_ordinal(1).unwrap_or(date),
        }
    }

    /// Whether `a` and `b` fall in the same period of this tier
    pub fn same_period(self, a: NaiveDate, b: NaiveDate) -> bool {
        self.period_start(a) == self.period_start(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_start() {
        let date = NaiveDate::from_ymd_opt(2023, 9, 17).unwrap();
        assert_eq!(SummaryTier::Day.period_start(date), date);
        assert_eq!(
            SummaryTier::Month.period_start(date),
            NaiveDate::from_ymd_opt(2023, 9, 1).unwrap()
        );
        assert_eq!(
            SummaryTier::Year.period_start(date),
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_same_period() {
        let a = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(!SummaryTier::Month.same_period(a, b));
        assert!(!SummaryTier::Year.same_period(a, b));
        assert!(SummaryTier::Year.same_period(b, b.succ_opt().unwrap()));
        assert!(SummaryTier::Day < SummaryTier::Year);
    }
}
