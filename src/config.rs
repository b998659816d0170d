//! Summary configuration: wind rose shape and threshold bins.
//!
//! ```toml
//! [wind]
//! speed_bin_interval = 5.0
//! speed_bin_count = 5
//! direction_slice_count = 16
//!
//! [[threshold_bins]]
//! id = 1
//! direction = "above"
//! threshold = 80.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SummaryResult;
use crate::threshold::{ThresholdBin, check_unique_ids};
use crate::wind::WindParameters;

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct RollupConfig {
    pub wind: WindParameters,
    pub threshold_bins: Vec<ThresholdBin>,
}

impl RollupConfig {
    pub fn from_toml_str(text: &str) -> SummaryResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> SummaryResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> SummaryResult<()> {
        self.wind.validate()?;
        check_unique_ids(&self.threshold_bins)
    }
}
