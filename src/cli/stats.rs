//! Stats command implementation

use anyhow::{anyhow, Result};
use chrono::{Duration, Local};

use skipfeed::stats::export::format_time_saved;
use skipfeed::stats::{StatsSnapshot, TimeOfDay, TimeRange};

use super::Context;

/// Show the usage dashboard for a time range
pub fn stats_command(ctx: &Context, range: &str, json: bool) -> Result<()> {
    let range: TimeRange = range.parse().map_err(|e: String| anyhow!(e))?;
    let now = Local::now();
    let snapshot = ctx.stats.query().snapshot(range, &now, &ctx.params())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    print_snapshot(&snapshot);
    Ok(())
}

fn print_snapshot(snapshot: &StatsSnapshot) {
    println!("Stats ({}):\n", snapshot.range.label());
    println!(
        "  Searches:     {} ({} today)",
        snapshot.total_searches, snapshot.today_searches
    );
    println!(
        "  Time saved:   {} ({} today)",
        format_time_saved(snapshot.time_saved_seconds),
        format_time_saved(snapshot.time_saved_today_seconds)
    );
    println!("  Focus score:  {}/100", snapshot.focus_score);
    println!("  Efficiency:   {:.0}%", snapshot.efficiency_rate * 100.0);
    if let Some(peak) = snapshot.time_of_day.peak() {
        println!("  Busiest time: {}", peak.label());
    }

    if !snapshot.platform_ranking.is_empty() {
        println!("\nPlatforms:");
        for (platform, share) in snapshot.platform_shares(usize::MAX) {
            let count = snapshot
                .platform_ranking
                .iter()
                .find(|pc| pc.platform == platform)
                .map(|pc| pc.count)
                .unwrap_or(0);
            println!("  {:<10} {:>5}  ({:.1}%)", platform.display_name(), count, share * 100.0);
        }
    }

    println!("\nTime of day:");
    for bucket in [TimeOfDay::Morning, TimeOfDay::Afternoon, TimeOfDay::Evening] {
        println!("  {:<10} {:>5}", bucket.label(), snapshot.time_of_day.get(bucket));
    }

    println!("\nDaily trend:");
    let max = snapshot.daily_trend.iter().copied().max().unwrap_or(0).max(1);
    let days = snapshot.daily_trend.len() as i64;
    for (i, count) in snapshot.daily_trend.iter().enumerate() {
        let date = snapshot.generated_on - Duration::days(days - 1 - i as i64);
        let bar = "#".repeat(((*count * 30) / max) as usize);
        println!("  {}  {:<30} {}", date.format("%Y-%m-%d"), bar, count);
    }
}
