//! Data models for statistics tracking
//!
//! These structures represent derived read models computed from the search
//! event log. None of them is a source of truth.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::Platform;

/// Longest trailing window, in days, a range or trend may cover
pub const MAX_RANGE_DAYS: u32 = 3660;

/// Time range for filtering stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum TimeRange {
    #[default]
    Last7Days,
    Last30Days,
    /// Trailing window of an arbitrary number of days
    LastDays(u32),
    AllTime,
}

impl TimeRange {
    /// Get the number of days to look back (None for all time)
    pub fn days(&self) -> Option<u32> {
        match self {
            Self::Last7Days => Some(7),
            Self::Last30Days => Some(30),
            Self::LastDays(days) => Some(*days),
            Self::AllTime => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Last7Days => "Last 7 days".to_string(),
            Self::Last30Days => "Last 30 days".to_string(),
            Self::LastDays(days) => format!("Last {} days", days),
            Self::AllTime => "All time".to_string(),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.days() {
            Some(days) => write!(f, "{}d", days),
            None => write!(f, "all"),
        }
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if s == "all" || s == "all-time" {
            return Ok(Self::AllTime);
        }
        let digits = s.strip_suffix('d').unwrap_or(&s);
        match digits.parse::<u32>() {
            Ok(7) => Ok(Self::Last7Days),
            Ok(30) => Ok(Self::Last30Days),
            Ok(days) if days > MAX_RANGE_DAYS => Err(format!(
                "time range '{}' is too long, at most {} days",
                s, MAX_RANGE_DAYS
            )),
            Ok(days) if days > 0 => Ok(Self::LastDays(days)),
            _ => Err(format!("invalid time range '{}', expected e.g. 7d, 30d or all", s)),
        }
    }
}

impl From<TimeRange> for String {
    fn from(range: TimeRange) -> Self {
        range.to_string()
    }
}

impl TryFrom<String> for TimeRange {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// How long recorded searches are kept before pruning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HistoryRetention {
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "30d")]
    ThirtyDays,
    #[default]
    #[serde(rename = "forever")]
    Forever,
}

impl HistoryRetention {
    pub fn days(&self) -> Option<u32> {
        match self {
            Self::SevenDays => Some(7),
            Self::ThirtyDays => Some(30),
            Self::Forever => None,
        }
    }
}

impl FromStr for HistoryRetention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "7d" | "7" => Ok(Self::SevenDays),
            "30d" | "30" => Ok(Self::ThirtyDays),
            "forever" | "unlimited" => Ok(Self::Forever),
            other => Err(format!("invalid retention '{}', expected 7d, 30d or forever", other)),
        }
    }
}

/// Coarse part of the day a search happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    /// 03:00 - 11:30
    Morning,
    /// 11:30 - 18:00
    Afternoon,
    /// 18:00 - 03:00 (wraps past midnight)
    Evening,
}

impl TimeOfDay {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Evening => "Evening",
        }
    }
}

/// Search counts per part of the day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDayBuckets {
    pub morning: u64,
    pub afternoon: u64,
    pub evening: u64,
}

impl TimeOfDayBuckets {
    pub fn add(&mut self, bucket: TimeOfDay) {
        match bucket {
            TimeOfDay::Morning => self.morning += 1,
            TimeOfDay::Afternoon => self.afternoon += 1,
            TimeOfDay::Evening => self.evening += 1,
        }
    }

    pub fn get(&self, bucket: TimeOfDay) -> u64 {
        match bucket {
            TimeOfDay::Morning => self.morning,
            TimeOfDay::Afternoon => self.afternoon,
            TimeOfDay::Evening => self.evening,
        }
    }

    pub fn total(&self) -> u64 {
        self.morning + self.afternoon + self.evening
    }

    /// The busiest part of the day; earlier buckets win ties
    pub fn peak(&self) -> Option<TimeOfDay> {
        [TimeOfDay::Morning, TimeOfDay::Afternoon, TimeOfDay::Evening]
            .into_iter()
            .filter(|bucket| self.get(*bucket) > 0)
            .fold(None, |best: Option<TimeOfDay>, bucket| match best {
                Some(b) if self.get(b) >= self.get(bucket) => Some(b),
                _ => Some(bucket),
            })
    }
}

/// Search count for one platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformCount {
    pub platform: Platform,
    pub count: u64,
}

/// Derived statistics for one time range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub range: TimeRange,
    /// Local calendar date the snapshot was computed for
    pub generated_on: NaiveDate,

    pub total_searches: u64,
    pub today_searches: u64,
    pub time_saved_seconds: f64,
    pub time_saved_today_seconds: f64,

    /// Descending by count, ties in platform declaration order
    pub platform_ranking: Vec<PlatformCount>,
    /// One entry per day, oldest first, ending today
    pub daily_trend: Vec<u64>,
    pub time_of_day: TimeOfDayBuckets,

    /// `min(100, total_searches * 2)`
    pub focus_score: u32,
    /// Share of searches with a known result count that found something
    pub efficiency_rate: f64,
    pub today_efficiency_rate: f64,
}

impl StatsSnapshot {
    pub fn time_saved_minutes(&self) -> u64 {
        (self.time_saved_seconds / 60.0).floor() as u64
    }

    pub fn time_saved_today_minutes(&self) -> u64 {
        (self.time_saved_today_seconds / 60.0).floor() as u64
    }

    /// Platforms ordered by usage, then unused ones in declaration order
    pub fn platform_order(&self) -> Vec<Platform> {
        let mut order: Vec<Platform> = self.platform_ranking.iter().map(|pc| pc.platform).collect();
        let unused: Vec<Platform> = Platform::all()
            .iter()
            .filter(|p| !order.contains(p))
            .copied()
            .collect();
        order.extend(unused);
        order
    }

    /// Fraction of window searches that went to each of the top `limit` platforms
    pub fn platform_shares(&self, limit: usize) -> Vec<(Platform, f64)> {
        let total = self.total_searches.max(1) as f64;
        self.platform_ranking
            .iter()
            .take(limit)
            .map(|pc| (pc.platform, pc.count as f64 / total))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_range_parse_and_display() {
        assert_eq!("7d".parse::<TimeRange>().unwrap(), TimeRange::Last7Days);
        assert_eq!("30".parse::<TimeRange>().unwrap(), TimeRange::Last30Days);
        assert_eq!("14d".parse::<TimeRange>().unwrap(), TimeRange::LastDays(14));
        assert_eq!("ALL".parse::<TimeRange>().unwrap(), TimeRange::AllTime);
        assert!("0d".parse::<TimeRange>().is_err());
        assert!("week".parse::<TimeRange>().is_err());
        assert_eq!("3660d".parse::<TimeRange>().unwrap(), TimeRange::LastDays(MAX_RANGE_DAYS));
        assert!("3661d".parse::<TimeRange>().is_err());
        assert!("200000000d".parse::<TimeRange>().is_err());
        assert_eq!(TimeRange::LastDays(14).to_string(), "14d");
    }

    #[test]
    fn test_peak_prefers_earlier_bucket_on_tie() {
        let buckets = TimeOfDayBuckets { morning: 2, afternoon: 5, evening: 5 };
        assert_eq!(buckets.peak(), Some(TimeOfDay::Afternoon));
        assert_eq!(TimeOfDayBuckets::default().peak(), None);
    }

    #[test]
    fn test_platform_order_puts_unused_platforms_last() {
        let snapshot = StatsSnapshot {
            range: TimeRange::AllTime,
            generated_on: NaiveDate::from_ymd_opt(2024, 5, 15).unwrap(),
            total_searches: 5,
            today_searches: 0,
            time_saved_seconds: 150.0,
            time_saved_today_seconds: 0.0,
            platform_ranking: vec![
                PlatformCount { platform: Platform::Google, count: 3 },
                PlatformCount { platform: Platform::Reddit, count: 2 },
            ],
            daily_trend: vec![0; 7],
            time_of_day: TimeOfDayBuckets::default(),
            focus_score: 10,
            efficiency_rate: 0.0,
            today_efficiency_rate: 0.0,
        };

        assert_eq!(
            snapshot.platform_order(),
            vec![
                Platform::Google,
                Platform::Reddit,
                Platform::Youtube,
                Platform::Instagram,
                Platform::Facebook,
                Platform::X,
                Platform::Bing,
            ]
        );
    }

    #[test]
    fn test_retention_serializes_as_short_codes() {
        let json = serde_json::to_string(&HistoryRetention::ThirtyDays).unwrap();
        assert_eq!(json, "\"30d\"");
        assert_eq!(HistoryRetention::Forever.days(), None);
    }
}
