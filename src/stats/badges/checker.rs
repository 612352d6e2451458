//! Threshold badge checks
//!
//! Pure functions: given a snapshot and the already-unlocked IDs, return the
//! badges that should unlock now.

use super::definitions::BadgeId;
use crate::stats::models::StatsSnapshot;

/// Minutes saved in a single day for the daily focus badge
pub const DAILY_FOCUS_MINUTES: u64 = 10;
/// Efficiency that also qualifies for the daily focus badge
pub const DAILY_FOCUS_EFFICIENCY: f64 = 0.70;
/// Total minutes saved for the marathon badge
pub const MARATHON_MINUTES: u64 = 300;

/// Check the daily focus badge against today's numbers
pub fn check_daily_focus(snapshot: &StatsSnapshot, unlocked: &[String]) -> Vec<BadgeId> {
    let qualifies = snapshot.time_saved_today_minutes() >= DAILY_FOCUS_MINUTES
        || snapshot.today_efficiency_rate >= DAILY_FOCUS_EFFICIENCY;

    if qualifies && !is_unlocked(BadgeId::SevenFocusStreak, unlocked) {
        vec![BadgeId::SevenFocusStreak]
    } else {
        Vec::new()
    }
}

/// Check cumulative time-saved milestones
pub fn check_time_saved_milestones(snapshot: &StatsSnapshot, unlocked: &[String]) -> Vec<BadgeId> {
    let mut newly_unlocked = Vec::new();

    let milestones = [(MARATHON_MINUTES, BadgeId::Marathon300)];

    for (threshold, id) in milestones {
        if snapshot.time_saved_minutes() >= threshold && !is_unlocked(id, unlocked) {
            newly_unlocked.push(id);
        }
    }

    newly_unlocked
}

/// Run every threshold check
pub fn check_threshold_badges(snapshot: &StatsSnapshot, unlocked: &[String]) -> Vec<BadgeId> {
    let mut newly_unlocked = check_daily_focus(snapshot, unlocked);
    newly_unlocked.extend(check_time_saved_milestones(snapshot, unlocked));
    newly_unlocked
}

fn is_unlocked(id: BadgeId, unlocked: &[String]) -> bool {
    unlocked.iter().any(|u| u == id.as_str())
}
