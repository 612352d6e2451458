//! Usage statistics for SkipFeed
//!
//! Searches are appended to a SQLite event log (`~/.skipfeed/stats.db`).
//! Everything shown to the user is derived from that log on demand.
//!
//! # Architecture
//!
//! ```text
//! record_search ──▶ search_events ──▶ list_events ──▶ aggregate ──▶ StatsSnapshot
//!                                                                    │
//!                          kv_store ◀── BadgeEngine ◀────────────────┤
//!                                                                    ▼
//!                                                        share / export / CLI
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let stats = StatsManager::new()?;
//!
//! stats.recorder().record_search(&SearchEvent::new("rust", Platform::Reddit, Utc::now()))?;
//!
//! let snapshot = stats.query().snapshot(TimeRange::Last7Days, &Local::now(), &params)?;
//! ```

mod aggregator;
pub mod badges;
mod db;
pub mod export;
mod models;
mod queries;
mod recorder;
mod store;
mod time_bucket;

pub use aggregator::{
    aggregate, daily_trend, efficiency_rate, rank_platforms, AggregatorParams,
    DEFAULT_SECONDS_SAVED_PER_SEARCH, DEFAULT_TREND_DAYS,
};
pub use badges::{Badge, BadgeEngine, BadgeEvent, BadgeId, BadgeState, ShareBadge, UnlockedBadge};
pub use db::StatsDb;
pub use models::{
    HistoryRetention, PlatformCount, MAX_RANGE_DAYS, StatsSnapshot, TimeOfDay, TimeOfDayBuckets, TimeRange,
};
pub use queries::StatsQuery;
pub use recorder::StatsRecorder;
pub use store::{MemoryStore, SqliteStore, Store};
pub use time_bucket::{day_bucket, local_date, parse_day_bucket, time_of_day, window_days, window_start};

use anyhow::Result;

/// Badge engine persisted in the stats database
pub type PersistentBadgeEngine = BadgeEngine<SqliteStore<Vec<BadgeState>>>;

/// Central manager for statistics tracking
///
/// Coordinates recording and querying of statistics.
/// Thread-safe through internal mutex on the database connection.
#[derive(Clone)]
pub struct StatsManager {
    db: StatsDb,
}

impl StatsManager {
    /// Create a new StatsManager with the default database location
    pub fn new() -> Result<Self> {
        let db = StatsDb::open_default()?;
        Ok(Self { db })
    }

    /// Create a StatsManager with a custom database path
    pub fn with_path(path: &std::path::Path) -> Result<Self> {
        let db = StatsDb::open(path)?;
        Ok(Self { db })
    }

    pub fn in_memory() -> Result<Self> {
        let db = StatsDb::open_in_memory()?;
        Ok(Self { db })
    }

    /// Get a recorder for writing statistics
    pub fn recorder(&self) -> StatsRecorder {
        StatsRecorder::new(self.db.clone())
    }

    /// Get a query interface for reading statistics
    pub fn query(&self) -> StatsQuery {
        StatsQuery::new(self.db.clone())
    }

    /// Badge state document in this database
    pub fn badge_store(&self) -> SqliteStore<Vec<BadgeState>> {
        SqliteStore::new(self.db.clone(), badges::BADGE_STATE_KEY)
    }

    /// Badge engine loaded from this database
    pub fn badge_engine(&self) -> Result<PersistentBadgeEngine> {
        BadgeEngine::new(self.badge_store())
    }

    /// Delete every recorded search. Badges stay unlocked.
    pub fn reset_all(&self) -> Result<()> {
        self.db.reset_all()
    }
}
