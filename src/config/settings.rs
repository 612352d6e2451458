//! Settings configuration types

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::stats::{
    AggregatorParams, HistoryRetention, DEFAULT_SECONDS_SAVED_PER_SEARCH, DEFAULT_TREND_DAYS,
    MAX_RANGE_DAYS,
};

/// General settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Estimated seconds of scrolling avoided by each direct search
    #[serde(default = "default_seconds_saved_per_search")]
    pub seconds_saved_per_search: f64,

    /// Days charted in the trend when no window length is given (all-time views)
    #[serde(default = "default_trend_days")]
    pub default_trend_days: u32,

    /// How long searches are kept: "7d", "30d" or "forever"
    #[serde(default)]
    pub retention: HistoryRetention,

    /// Name shown on shared stats. Falls back to `User-XXXX` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Random per-install ID, generated by `skipfeed init`
    #[serde(default)]
    pub device_id: String,
}

fn default_seconds_saved_per_search() -> f64 {
    DEFAULT_SECONDS_SAVED_PER_SEARCH
}

fn default_trend_days() -> u32 {
    DEFAULT_TREND_DAYS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seconds_saved_per_search: default_seconds_saved_per_search(),
            default_trend_days: default_trend_days(),
            retention: HistoryRetention::default(),
            display_name: None,
            device_id: String::new(),
        }
    }
}

impl Settings {
    /// Reject values the aggregator cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.default_trend_days == 0 || self.default_trend_days > MAX_RANGE_DAYS {
            bail!(
                "default_trend_days must be between 1 and {}, got {}",
                MAX_RANGE_DAYS,
                self.default_trend_days
            );
        }
        if !self.seconds_saved_per_search.is_finite() || self.seconds_saved_per_search < 0.0 {
            bail!(
                "seconds_saved_per_search must be a non-negative number, got {}",
                self.seconds_saved_per_search
            );
        }
        Ok(())
    }

    pub fn aggregator_params(&self) -> AggregatorParams {
        AggregatorParams {
            seconds_saved_per_search: self.seconds_saved_per_search,
            default_trend_days: self.default_trend_days,
        }
    }
}
