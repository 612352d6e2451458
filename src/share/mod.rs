//! Stats sharing
//!
//! Local stats are reduced to a [`PeerStats`] record and exchanged as a
//! compact token. Imported records are display-only; they never touch the
//! local event log.

pub mod codec;
mod orchestrator;
mod peer_stats;

pub use codec::{decode, encode, StatsCodeError};
pub use orchestrator::{
    build_peer_stats, Comparison, DeviceDisplayName, DisplayNameProvider, GeneratedCode,
    MetricComparison, ShareOrchestrator,
};
pub use peer_stats::{PeerPlatform, PeerStats, SharePeriod, MAX_TOP_PLATFORMS, SCHEMA_VERSION};
