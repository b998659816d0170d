//! Error types shared by every summary operation.

use thiserror::Error;

/// Errors raised while building, merging or persisting summaries
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Two aggregates with different shapes were asked to merge
    #[error("Configuration mismatch: {what}")]
    ConfigMismatch {
        /// Which part of the schema differs
        what: String,
    },

    /// Hour of day outside 0..=23
    #[error("Illegal hour specified ({0}). Must be 0 through 23")]
    InvalidHour(u32),

    /// An observation carried a negative validity duration
    #[error("Observation duration must not be negative")]
    NegativeDuration,

    /// Wind parameters that cannot describe a wind rose
    #[error("Invalid wind parameters: {reason}")]
    InvalidWindParameters {
        /// Why the parameters were rejected
        reason: &'static str,
    },

    /// Raw observations fed into a summary that already absorbed a merge
    #[error("Raw observations cannot be applied after a period merge")]
    RawAfterMerge,

    /// The tiered rollup received an observation older than the open day
    #[error("Observation for {got} arrived after {open} was opened")]
    OutOfOrder {
        /// Date of the offending observation
        got: chrono::NaiveDate,
        /// Date of the open day summary
        open: chrono::NaiveDate,
    },

    #[error("Snapshot encoding error: {0}")]
    Snapshot(#[from] postcard::Error),

    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SummaryError {
    pub(crate) fn mismatch(what: impl Into<String>) -> Self {
        Self::ConfigMismatch { what: what.into() }
    }
}

/// Result type for summary operations
pub type SummaryResult<T> = Result<T, SummaryError>;
