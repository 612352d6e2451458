//! Stats recorder - appends searches to the event log
//!
//! The log is append-only: events are inserted and, through retention, pruned
//! from the old end, but never updated.

use anyhow::{bail, Result};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use super::db::StatsDb;
use super::models::HistoryRetention;
use crate::domain::SearchEvent;

/// Records searches to the database
#[derive(Clone)]
pub struct StatsRecorder {
    db: StatsDb,
}

impl StatsRecorder {
    pub fn new(db: StatsDb) -> Self {
        Self { db }
    }

    /// Append a performed search to the log
    pub fn record_search(&self, event: &SearchEvent) -> Result<()> {
        let query = normalize_query(&event.query);
        if query.is_empty() {
            bail!("Refusing to record a search with an empty query");
        }

        let conn = self.db.conn();
        conn.execute(
            r#"INSERT INTO search_events (query, platform, timestamp, result_count)
               VALUES (?1, ?2, ?3, ?4)"#,
            rusqlite::params![
                query,
                event.platform.as_str(),
                event.timestamp.timestamp_millis(),
                event.result_count,
            ],
        )?;
        debug!(platform = %event.platform, "Recorded search");
        Ok(())
    }

    /// Delete events older than the retention window. Returns the number removed.
    pub fn prune(&self, retention: HistoryRetention, now: DateTime<Utc>) -> Result<usize> {
        let Some(days) = retention.days() else {
            return Ok(0);
        };
        let cutoff = now - Duration::days(i64::from(days));

        let conn = self.db.conn();
        let removed = conn.execute(
            "DELETE FROM search_events WHERE timestamp < ?1",
            [cutoff.timestamp_millis()],
        )?;
        if removed > 0 {
            info!("Pruned {} searches older than {} days", removed, days);
        }
        Ok(removed)
    }

    /// Delete the whole search history. Returns the number removed.
    pub fn clear(&self) -> Result<usize> {
        let conn = self.db.conn();
        let removed = conn.execute("DELETE FROM search_events", [])?;
        info!("Cleared {} searches from history", removed);
        Ok(removed)
    }
}

/// Collapse surrounding and repeated inner whitespace
fn normalize_query(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}
