//! Record command implementation

use anyhow::{anyhow, Result};
use chrono::{Local, Utc};

use skipfeed::{Platform, SearchEvent};

use super::{print_unlocked, Context};

/// Record one search, apply retention and re-check badges
pub fn record_command(ctx: &Context, platform: &str, query: &str, results: Option<u32>) -> Result<()> {
    let platform = Platform::from_str(platform).ok_or_else(|| {
        let known: Vec<&str> = Platform::all().iter().map(|p| p.as_str()).collect();
        anyhow!("Unknown platform '{}'. Expected one of: {}", platform, known.join(", "))
    })?;

    let now = Local::now();
    let mut event = SearchEvent::new(query, platform, now.with_timezone(&Utc));
    if let Some(count) = results {
        event = event.with_result_count(count);
    }

    let recorder = ctx.stats.recorder();
    recorder.record_search(&event)?;
    recorder.prune(ctx.config.settings.retention, now.with_timezone(&Utc))?;
    println!("Recorded {} search: {}", platform.display_name(), query.trim());

    let unlocked = ctx.orchestrator()?.evaluate_badges(&now)?;
    print_unlocked(&unlocked);

    Ok(())
}
