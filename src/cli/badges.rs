//! Badges command implementation

use anyhow::Result;
use chrono::Local;

use skipfeed::stats::badges::{BadgeTrigger, BADGES};

use super::{print_unlocked, Context};

/// Re-check threshold badges and list badge status
pub fn badges_command(ctx: &Context, all: bool) -> Result<()> {
    let orchestrator = ctx.orchestrator()?;
    let unlocked = orchestrator.evaluate_badges(&Local::now())?;
    print_unlocked(&unlocked);

    let engine = orchestrator.badges();
    let earned = engine.unlocked_badges();

    if all {
        println!("Badges ({}/{}):\n", earned.len(), BADGES.len());
        for badge in BADGES {
            let status = match engine.unlocked_at(badge.id) {
                Some(at) => format!("unlocked {}", at.with_timezone(&Local).format("%Y-%m-%d")),
                None => "locked".to_string(),
            };
            let hint = match badge.trigger {
                BadgeTrigger::Threshold => "",
                BadgeTrigger::Event(_) => " (event)",
            };
            println!("  [{}] {}{} - {}", status, badge.title, hint, badge.description);
        }
        return Ok(());
    }

    if earned.is_empty() {
        println!("No badges unlocked yet.");
        return Ok(());
    }

    println!("Unlocked badges ({}):\n", earned.len());
    for badge in earned {
        println!("  {} ({})", badge.title, badge.icon);
    }
    Ok(())
}
