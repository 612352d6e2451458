//! Share and compare commands

use anyhow::{anyhow, Result};
use chrono::Local;

use skipfeed::share::{MetricComparison, SharePeriod, StatsCodeError};

use super::{print_unlocked, Context};

/// Print a share code for the period; `shared` records a completed share
pub fn share_command(ctx: &Context, period: &str, shared: bool) -> Result<()> {
    let period: SharePeriod = period.parse().map_err(|e: String| anyhow!(e))?;
    let now = Local::now();
    let orchestrator = ctx.orchestrator()?;

    let generated = orchestrator.generate_code(period, &now)?;
    println!("{}", generated.token);
    print_unlocked(generated.unlocked.as_slice());

    if shared {
        if let Some(unlocked) = orchestrator.record_share(&now)? {
            print_unlocked(&[unlocked]);
        }
    }

    Ok(())
}

/// Compare local stats with a friend's code
pub fn compare_command(ctx: &Context, code: &str) -> Result<()> {
    let comparison = ctx
        .orchestrator()?
        .compare(code, &Local::now())
        .map_err(user_facing)?;

    let peer = &comparison.peer;
    println!(
        "You vs {} ({}, generated {}):\n",
        peer.display_name, peer.period, peer.generated
    );
    print_metric("Minutes saved", &comparison.time_saved_minutes);
    print_metric("Searches", &comparison.searches);
    print_metric("Focus score", &comparison.focus_score);
    print_metric(
        "Efficiency %",
        &MetricComparison::new(comparison.efficiency.mine * 100.0, comparison.efficiency.peer * 100.0),
    );

    if !peer.top_platforms.is_empty() {
        println!("\n{}'s top platforms:", peer.display_name);
        for platform in &peer.top_platforms {
            println!("  {:<10} {:.0}%", platform.name, platform.percent * 100.0);
        }
    }

    Ok(())
}

/// Replace codec errors with their generic message; other errors pass through
fn user_facing(error: anyhow::Error) -> anyhow::Error {
    match error.downcast_ref::<StatsCodeError>() {
        Some(codec_error) => {
            tracing::warn!("Rejected stats code: {}", codec_error);
            anyhow!(codec_error.user_message())
        }
        None => error,
    }
}

fn print_metric(label: &str, metric: &MetricComparison) {
    let marker = if metric.is_ahead() { "+" } else { "-" };
    println!(
        "  {:<14} {:>8.0} vs {:<8.0} {} {:.0}%",
        label,
        metric.mine,
        metric.peer,
        marker,
        metric.percent_change().abs(),
    );
}
