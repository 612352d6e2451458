//! Badges: threshold and event-driven unlocks over the stats snapshot

mod checker;
mod definitions;
mod engine;

pub use checker::{
    check_daily_focus, check_threshold_badges, check_time_saved_milestones, DAILY_FOCUS_EFFICIENCY,
    DAILY_FOCUS_MINUTES, MARATHON_MINUTES,
};
pub use definitions::{Badge, BadgeEvent, BadgeId, BadgeTrigger, BADGES};
pub use engine::{BadgeEngine, BadgeState, ShareBadge, UnlockedBadge, BADGE_STATE_KEY};
