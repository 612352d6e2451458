//! CLI command implementations

pub mod badges;
pub mod export;
pub mod history;
pub mod init;
pub mod record;
pub mod share;
pub mod stats;

use std::path::{Path, PathBuf};

use anyhow::Result;

use skipfeed::config::Config;
use skipfeed::share::{DeviceDisplayName, ShareOrchestrator};
use skipfeed::stats::{AggregatorParams, BadgeState, SqliteStore, StatsManager, UnlockedBadge};

/// Everything a command needs: loaded config plus the open stats database
pub struct Context {
    pub config: Config,
    pub stats: StatsManager,
}

impl Context {
    /// Load config (creating it on first run) and open the stats database
    pub fn open(config_path: &Path, db_path: Option<&Path>) -> Result<Self> {
        let config = if config_path.exists() {
            Config::from_file(config_path)?
        } else {
            Config::init(config_path, false)?.0
        };

        let stats = match db_path {
            Some(path) => StatsManager::with_path(path)?,
            None => StatsManager::new()?,
        };

        Ok(Self { config, stats })
    }

    pub fn params(&self) -> AggregatorParams {
        self.config.aggregator_params()
    }

    pub fn orchestrator(
        &self,
    ) -> Result<ShareOrchestrator<SqliteStore<Vec<BadgeState>>, DeviceDisplayName>> {
        Ok(ShareOrchestrator::new(
            self.stats.query(),
            self.stats.badge_engine()?,
            self.config.display_name_provider(),
            self.params(),
        ))
    }
}

/// Resolve `--config`, defaulting to ~/.skipfeed/config.toml
pub fn config_path(config: Option<PathBuf>) -> PathBuf {
    config.unwrap_or_else(Config::global_config_path)
}

pub fn print_unlocked(unlocked: &[UnlockedBadge]) {
    for entry in unlocked {
        println!(
            "Badge unlocked: {} - {}",
            entry.badge.title, entry.badge.description
        );
    }
}
