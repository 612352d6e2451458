//! The shareable stats record
//!
//! `PeerStats` is the only data that leaves the device. Field names on the
//! wire are single letters to keep tokens (and QR codes) short.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::stats::TimeRange;

/// Wire schema version understood by this build
pub const SCHEMA_VERSION: u32 = 1;
/// Upper bound on `top_platforms` entries
pub const MAX_TOP_PLATFORMS: usize = 4;

/// Period a shared record covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SharePeriod {
    #[default]
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
}

impl SharePeriod {
    pub fn days(&self) -> u32 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Week => "7d",
            Self::Month => "30d",
        }
    }

    pub fn time_range(&self) -> TimeRange {
        match self {
            Self::Week => TimeRange::Last7Days,
            Self::Month => TimeRange::Last30Days,
        }
    }
}

impl fmt::Display for SharePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SharePeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "7d" | "7" | "week" => Ok(Self::Week),
            "30d" | "30" | "month" => Ok(Self::Month),
            other => Err(format!("unknown share period '{}', expected 7d or 30d", other)),
        }
    }
}

/// One entry of the top-platform breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerPlatform {
    /// Platform display name
    pub name: String,
    /// Fraction of the period's searches, in `[0, 1]`
    pub percent: f64,
}

/// Reduced, versioned subset of a stats snapshot, safe to hand to someone else
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerStats {
    #[serde(rename = "v")]
    pub version: u32,
    #[serde(rename = "u")]
    pub display_name: String,
    #[serde(rename = "p")]
    pub period: SharePeriod,
    /// Minutes saved over the period
    #[serde(rename = "ts")]
    pub time_saved_minutes: u64,
    #[serde(rename = "fs")]
    pub focus_score: u32,
    #[serde(rename = "eff")]
    pub efficiency: f64,
    #[serde(rename = "tp")]
    pub top_platforms: Vec<PeerPlatform>,
    /// Daily searches, oldest first, one entry per day of the period
    #[serde(rename = "tr")]
    pub trend: Vec<u64>,
    /// Generation date, `yyyy-MM-dd`
    #[serde(rename = "gen")]
    pub generated: String,
}

impl PeerStats {
    /// Check the bounds a record must satisfy to be encoded or accepted.
    ///
    /// Returns a description of the first violation.
    pub fn validate(&self) -> Result<(), String> {
        if self.version != SCHEMA_VERSION {
            return Err(format!("unsupported schema version {}", self.version));
        }
        if self.top_platforms.len() > MAX_TOP_PLATFORMS {
            return Err(format!(
                "{} top platforms, at most {} allowed",
                self.top_platforms.len(),
                MAX_TOP_PLATFORMS
            ));
        }
        if self.trend.len() != self.period.days() as usize {
            return Err(format!(
                "trend has {} days, expected {} for period {}",
                self.trend.len(),
                self.period.days(),
                self.period
            ));
        }
        if self.focus_score > 100 {
            return Err(format!("focus score {} out of range", self.focus_score));
        }
        if !is_fraction(self.efficiency) {
            return Err(format!("efficiency {} out of range", self.efficiency));
        }
        if let Some(platform) = self.top_platforms.iter().find(|p| !is_fraction(p.percent)) {
            return Err(format!("share {} for '{}' out of range", platform.percent, platform.name));
        }
        if self.generated_on().is_none() {
            return Err(format!("invalid generation date '{}'", self.generated));
        }
        Ok(())
    }

    pub fn generated_on(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.generated, "%Y-%m-%d").ok()
    }

    pub fn total_trend_searches(&self) -> u64 {
        self.trend.iter().sum()
    }
}

fn is_fraction(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PeerStats {
        PeerStats {
            version: SCHEMA_VERSION,
            display_name: "User-AB12".to_string(),
            period: SharePeriod::Week,
            time_saved_minutes: 42,
            focus_score: 60,
            efficiency: 0.75,
            top_platforms: vec![
                PeerPlatform { name: "Reddit".to_string(), percent: 0.75 },
                PeerPlatform { name: "YouTube".to_string(), percent: 0.25 },
            ],
            trend: vec![0, 1, 2, 0, 5, 3, 4],
            generated: "2024-05-15".to_string(),
        }
    }

    #[test]
    fn test_wire_field_names() {
        let value = serde_json::to_value(sample()).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();

        for key in ["v", "u", "p", "ts", "fs", "eff", "tp", "tr", "gen"] {
            assert!(keys.contains(&key), "missing key {}", key);
        }
        assert_eq!(value["p"], "7d");
        assert_eq!(value["tp"][0]["name"], "Reddit");
    }

    #[test]
    fn test_validate_accepts_sample() {
        assert_eq!(sample().validate(), Ok(()));
    }

    #[test]
    fn test_validate_bounds() {
        let mut stats = sample();
        stats.trend.push(1);
        assert!(stats.validate().unwrap_err().contains("trend"));

        let mut stats = sample();
        stats.top_platforms = (0..5)
            .map(|i| PeerPlatform { name: format!("p{}", i), percent: 0.2 })
            .collect();
        assert!(stats.validate().is_err());

        let mut stats = sample();
        stats.efficiency = f64::NAN;
        assert!(stats.validate().is_err());

        let mut stats = sample();
        stats.generated = "15/05/2024".to_string();
        assert!(stats.validate().is_err());
    }

    #[test]
    fn test_period_parsing() {
        assert_eq!("30d".parse::<SharePeriod>(), Ok(SharePeriod::Month));
        assert_eq!("week".parse::<SharePeriod>(), Ok(SharePeriod::Week));
        assert!("90d".parse::<SharePeriod>().is_err());
        assert_eq!(SharePeriod::Month.time_range().days(), Some(30));
    }
}
