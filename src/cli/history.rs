//! History and retention commands

use anyhow::{anyhow, Result};
use chrono::{Local, Utc};

use skipfeed::stats::HistoryRetention;
use skipfeed::Platform;

use super::Context;

/// List recent searches, newest first
pub fn history_command(ctx: &Context, limit: usize, platform: Option<String>, clear: bool) -> Result<()> {
    if clear {
        let removed = ctx.stats.recorder().clear()?;
        println!("Cleared {} searches.", removed);
        return Ok(());
    }

    let query = ctx.stats.query();
    let events = match platform {
        Some(name) => {
            let platform =
                Platform::from_str(&name).ok_or_else(|| anyhow!("Unknown platform '{}'", name))?;
            query.searches_for_platform(platform, limit)?
        }
        None => query.recent_searches(limit)?,
    };

    if events.is_empty() {
        println!("No searches recorded.");
        return Ok(());
    }

    println!("Recent searches ({}):\n", events.len());
    for event in events {
        let local = event.timestamp.with_timezone(&Local);
        print!(
            "  {}  {:<10} {}",
            local.format("%Y-%m-%d %H:%M"),
            event.platform.display_name(),
            event.query
        );
        match event.result_count {
            Some(count) => println!("  ({} results)", count),
            None => println!(),
        }
    }

    Ok(())
}

/// Drop searches older than the retention window
pub fn prune_command(ctx: &Context, retention: Option<String>) -> Result<()> {
    let retention: HistoryRetention = match retention {
        Some(value) => value.parse().map_err(|e: String| anyhow!(e))?,
        None => ctx.config.settings.retention,
    };

    let removed = ctx.stats.recorder().prune(retention, Utc::now())?;
    println!("Removed {} searches.", removed);
    Ok(())
}
