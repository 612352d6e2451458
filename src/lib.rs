//! SkipFeed - search without the feed
//!
//! SkipFeed sends searches straight to a platform's search page instead of
//! its feed. Every search is logged locally, and this crate turns that log
//! into usage statistics, badges and a shareable stats code.
//!
//! ## Modules
//!
//! - [`stats`]: the search event log, aggregation into snapshots, badges and export
//! - [`share`]: the peer stats record, its token codec and the share/compare flow
//! - [`config`]: `~/.skipfeed/config.toml`

pub mod config;
pub mod domain;
pub mod share;
pub mod stats;

pub use domain::*;
