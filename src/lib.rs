//! Statistics rollup engine for weather station summaries.
//!
//! Raw observations are folded into day [`PeriodSummary`]s, which merge into
//! months and years without ever re-reading the raw data.

pub mod config;
pub mod error;
pub mod measurement;
pub mod observation;
pub mod quantity;
pub mod rainfall;
pub mod sensors;
pub mod storage;
pub mod threshold;
pub mod wind;

pub use config::RollupConfig;
pub use error::{SummaryError, SummaryResult};
pub use measurement::{Extremum, MeasurementAccumulator, WeightedAverage};
pub use observation::{Observation, SensorReading, Wind};
pub use rainfall::HourlyDepthMap;
pub use storage::{PeriodSummary, RollupAccumulator, RollupEvent, SummaryTier};
pub use threshold::{ThresholdBin, ThresholdBinDuration, ThresholdDirection};
pub use wind::{SpeedBin, WindDirectionSlice, WindParameters, WindRose};
