//! Shared fixtures for integration tests
#![allow(dead_code)]

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use tempfile::TempDir;

use skipfeed::stats::StatsManager;
use skipfeed::{Platform, SearchEvent};

/// A stats database in a fresh temp directory
pub fn create_test_db() -> (TempDir, StatsManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let manager = StatsManager::with_path(&temp_dir.path().join("stats.db"))
        .expect("Failed to open stats database");
    (temp_dir, manager)
}

/// Wednesday 2024-05-15 14:00 at UTC+02:00
pub fn fixed_now() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(2 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 5, 15, 14, 0, 0)
        .unwrap()
}

pub fn minutes_before_now(minutes: i64) -> DateTime<Utc> {
    fixed_now().with_timezone(&Utc) - Duration::minutes(minutes)
}

pub fn record(manager: &StatsManager, query: &str, platform: Platform, at: DateTime<Utc>) {
    manager
        .recorder()
        .record_search(&SearchEvent::new(query, platform, at))
        .expect("Failed to record search");
}
