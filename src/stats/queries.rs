//! Read access to the search event log
//!
//! Every read returns an owned copy of the rows, so aggregation always works
//! on a point-in-time view even while other handles keep recording.

use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rusqlite::Row;
use tracing::warn;

use super::aggregator::{aggregate, AggregatorParams};
use super::db::StatsDb;
use super::models::{StatsSnapshot, TimeRange};
use crate::domain::{Platform, SearchEvent};

/// Query interface for statistics
pub struct StatsQuery {
    db: StatsDb,
}

impl StatsQuery {
    pub fn new(db: StatsDb) -> Self {
        Self { db }
    }

    /// List events at or after `since` (all events when `None`), oldest first
    pub fn list_events(&self, since: Option<DateTime<Utc>>) -> Result<Vec<SearchEvent>> {
        let conn = self.db.conn();
        let since_ms = since.map(|s| s.timestamp_millis()).unwrap_or(i64::MIN);
        let mut stmt = conn.prepare(
            "SELECT query, platform, timestamp, result_count FROM search_events
             WHERE timestamp >= ?1 ORDER BY timestamp, id",
        )?;
        let rows = stmt.query_map([since_ms], read_row)?;
        Ok(collect_events(rows))
    }

    /// Most recent distinct searches, newest first.
    ///
    /// Repeating the same query on the same platform only keeps its latest run.
    pub fn recent_searches(&self, limit: usize) -> Result<Vec<SearchEvent>> {
        let conn = self.db.conn();
        // SQLite takes bare columns from the row that produced MAX(timestamp)
        let mut stmt = conn.prepare(
            "SELECT query, platform, MAX(timestamp) AS ts, result_count FROM search_events
             GROUP BY query, platform ORDER BY ts DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map([limit as i64], read_row)?;
        Ok(collect_events(rows))
    }

    /// Most recent searches on one platform, newest first
    pub fn searches_for_platform(&self, platform: Platform, limit: usize) -> Result<Vec<SearchEvent>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT query, platform, timestamp, result_count FROM search_events
             WHERE platform = ?1 ORDER BY timestamp DESC, id DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(rusqlite::params![platform.as_str(), limit as i64], read_row)?;
        Ok(collect_events(rows))
    }

    pub fn total_searches(&self) -> Result<u64> {
        let conn = self.db.conn();
        Ok(conn.query_row("SELECT COUNT(*) FROM search_events", [], |r| r.get(0))?)
    }

    /// Load the events relevant to `range` and aggregate them as of `now`
    pub fn snapshot<Tz: TimeZone>(
        &self,
        range: TimeRange,
        now: &DateTime<Tz>,
        params: &AggregatorParams,
    ) -> Result<StatsSnapshot> {
        // Loose lower bound; the aggregator applies the exact calendar window.
        // A window reaching past the earliest representable instant has no bound.
        let since = range.days().and_then(|days| {
            now.with_timezone(&Utc)
                .checked_sub_signed(Duration::days(i64::from(days) + 1))
        });
        let events = self.list_events(since)?;
        Ok(aggregate(&events, now, range, params))
    }
}

type RawRow = (String, String, i64, Option<u32>);

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

/// Convert raw rows, skipping any the current build cannot interpret
fn collect_events(rows: impl Iterator<Item = rusqlite::Result<RawRow>>) -> Vec<SearchEvent> {
    rows.filter_map(|row| match row {
        Ok(raw) => Some(raw),
        Err(e) => {
            warn!("Skipping unreadable search row: {}", e);
            None
        }
    })
    .filter_map(|(query, platform, timestamp_ms, result_count)| {
        let Some(platform) = Platform::from_str(&platform) else {
            warn!("Skipping search with unknown platform '{}'", platform);
            return None;
        };
        let Some(timestamp) = DateTime::from_timestamp_millis(timestamp_ms) else {
            warn!("Skipping search with invalid timestamp {}", timestamp_ms);
            return None;
        };
        Some(SearchEvent {
            query,
            platform,
            timestamp,
            result_count,
        })
    })
    .collect()
}
