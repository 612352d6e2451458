use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Platform;

/// A single performed search, as recorded in the event log.
///
/// Events are append-only: once recorded they are never mutated, only pruned
/// by the retention policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEvent {
    /// The text the user searched for
    pub query: String,
    /// Where the search was redirected
    pub platform: Platform,
    /// When the search was performed
    pub timestamp: DateTime<Utc>,
    /// Number of results, when the destination reported one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_count: Option<u32>,
}

impl SearchEvent {
    pub fn new(query: impl Into<String>, platform: Platform, timestamp: DateTime<Utc>) -> Self {
        Self {
            query: query.into(),
            platform,
            timestamp,
            result_count: None,
        }
    }

    pub fn with_result_count(mut self, count: u32) -> Self {
        self.result_count = Some(count);
        self
    }
}
