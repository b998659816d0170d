use chrono::NaiveDate;
use log::{debug, info};

use super::{PeriodSummary, SummaryTier};
use crate::config::RollupConfig;
use crate::error::{SummaryError, SummaryResult};
use crate::observation::Observation;

/// Events emitted by the accumulator when a period closes
#[derive(Debug, Clone, PartialEq)]
pub enum RollupEvent {
    /// A day summary was completed
    Day(PeriodSummary),
    /// A month summary was completed
    Month(PeriodSummary),
    /// A year summary was completed
    Year(PeriodSummary),
}

impl RollupEvent {
    pub fn tier(&self) -> SummaryTier {
        match self {
            Self::Day(_) => SummaryTier::Day,
            Self::Month(_) => SummaryTier::Month,
            Self::Year(_) => SummaryTier::Year,
        }
    }

    pub fn summary(&self) -> &PeriodSummary {
        match self {
            Self::Day(s) | Self::Month(s) | Self::Year(s) => s,
        }
    }

    pub fn into_summary(self) -> PeriodSummary {
        match self {
            Self::Day(s) | Self::Month(s) | Self::Year(s) => s,
        }
    }
}

/// Tiered day → month → year rollup of an ordered observation stream
///
/// Observations go into the open day summary. When an observation for a
/// later date arrives the day is closed and merged into the open month;
/// month and year boundaries close those tiers the same way. Every closed
/// period is returned as a [`RollupEvent`], finest tier first.
///
/// ## Usage
///
/// ```rust,ignore
/// let mut accumulator = RollupAccumulator::new(RollupConfig::default())?;
///
/// for obs in observations {
///     for event in accumulator.add_observation(&obs)? {
///         store(event);
///     }
/// }
/// for event in accumulator.finish()? {
///     store(event);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RollupAccumulator {
    config: RollupConfig,
    /// Open day, fed with raw observations
    day: Option<PeriodSummary>,
    /// Open month, fed with closed days
    month: Option<PeriodSummary>,
    /// Open year, fed with closed months
    year: Option<PeriodSummary>,
}

impl RollupAccumulator {
    /// Fails when `config` is invalid, before any observation is taken
    pub fn new(config: RollupConfig) -> SummaryResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            day: None,
            month: None,
            year: None,
        })
    }

    pub fn config(&self) -> &RollupConfig {
        &self.config
    }

    /// The summary currently open for `tier`, if any
    pub fn open(&self, tier: SummaryTier) -> Option<&PeriodSummary> {
        match tier {
            SummaryTier::Day => self.day.as_ref(),
            SummaryTier::Month => self.month.as_ref(),
            SummaryTier::Year => self.year.as_ref(),
        }
    }

    /// Add an observation, returning any periods its date closes.
    ///
    /// Observations must arrive in date order; one older than the open day
    /// is rejected with [`SummaryError::OutOfOrder`].
    pub fn add_observation(&mut self, obs: &Observation) -> SummaryResult<Vec<RollupEvent>> {
        let date = obs.time.date();
        let mut events = Vec::new();

        if let Some(open) = self.day.as_ref().map(PeriodSummary::date) {
            if date < open {
                return Err(SummaryError::OutOfOrder { got: date, open });
            }
            if date != open {
                self.close_day(&mut events)?;
                if !SummaryTier::Month.same_period(date, open) {
                    self.close_month(&mut events)?;
                }
                if !SummaryTier::Year.same_period(date, open) {
                    self.close_year(&mut events);
                }
            }
        }

        let day = match self.day.take() {
            Some(day) => day,
            None => {
                debug!("Opening day {}", date);
                PeriodSummary::new(date, &self.config.wind, &self.config.threshold_bins)?
            }
        };
        let day = self.day.insert(day);
        day.apply_observation(obs)?;

        Ok(events)
    }

    /// Close every open tier, finest first
    pub fn finish(&mut self) -> SummaryResult<Vec<RollupEvent>> {
        let mut events = Vec::new();
        self.close_day(&mut events)?;
        self.close_month(&mut events)?;
        self.close_year(&mut events);
        Ok(events)
    }

    fn close_day(&mut self, events: &mut Vec<RollupEvent>) -> SummaryResult<()> {
        let Some(day) = self.day.take() else {
            return Ok(());
        };
        if let Err(e) = merge_into(&mut self.month, SummaryTier::Month, &self.config, &day) {
            self.day = Some(day);
            return Err(e);
        }
        info!("Closed day {} ({}s of data)", day.date(), day.duration().as_secs());
        events.push(RollupEvent::Day(day));
        Ok(())
    }

    fn close_month(&mut self, events: &mut Vec<RollupEvent>) -> SummaryResult<()> {
        let Some(month) = self.month.take() else {
            return Ok(());
        };
        if let Err(e) = merge_into(&mut self.year, SummaryTier::Year, &self.config, &month) {
            self.month = Some(month);
            return Err(e);
        }
        info!("Closed month {}", month.date().format("%Y-%m"));
        events.push(RollupEvent::Month(month));
        Ok(())
    }

    fn close_year(&mut self, events: &mut Vec<RollupEvent>) {
        if let Some(year) = self.year.take() {
            info!("Closed year {}", year.date().format("%Y"));
            events.push(RollupEvent::Year(year));
        }
    }
}

/// Merge `period` into the open summary of `tier`, opening it if needed
fn merge_into(
    slot: &mut Option<PeriodSummary>,
    tier: SummaryTier,
    config: &RollupConfig,
    period: &PeriodSummary,
) -> SummaryResult<()> {
    let start: NaiveDate = tier.period_start(period.date());
    let target = match slot.take() {
        Some(target) => target,
        None => {
            debug!("Opening {} {}", tier.label(), start);
            PeriodSummary::new(start, &config.wind, &config.threshold_bins)?
        }
    };
    slot.insert(target).merge_period(period)
}
