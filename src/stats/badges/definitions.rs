//! Badge definitions and metadata
//!
//! The catalog order below is the order badges are listed in when no unlock
//! order applies (e.g. "all badges" views).

/// Unique identifier for each badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeId {
    SevenFocusStreak,
    Marathon300,
    FirstShare,
    SocialStarter,
}

impl BadgeId {
    /// Get the string ID for persistence
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SevenFocusStreak => "seven_focus_streak",
            Self::Marathon300 => "marathon_300",
            Self::FirstShare => "first_share",
            Self::SocialStarter => "social_starter",
        }
    }

    /// Parse from a persisted string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "seven_focus_streak" => Some(Self::SevenFocusStreak),
            "marathon_300" => Some(Self::Marathon300),
            "first_share" => Some(Self::FirstShare),
            "social_starter" => Some(Self::SocialStarter),
            _ => None,
        }
    }

    /// Get all badge IDs in catalog order
    pub fn all() -> &'static [BadgeId] {
        &[
            Self::SevenFocusStreak,
            Self::Marathon300,
            Self::FirstShare,
            Self::SocialStarter,
        ]
    }
}

/// Discrete user actions that unlock event badges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeEvent {
    /// The user completed a share (card, code, or QR)
    ShareCompleted,
    /// The user generated a peer-comparison code
    PeerCodeGenerated,
}

impl BadgeEvent {
    /// The badge this event unlocks
    pub fn badge(&self) -> BadgeId {
        match self {
            Self::ShareCompleted => BadgeId::FirstShare,
            Self::PeerCodeGenerated => BadgeId::SocialStarter,
        }
    }
}

/// How a badge gets unlocked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTrigger {
    /// Checked against every fresh stats snapshot
    Threshold,
    /// Fired explicitly by the caller
    Event(BadgeEvent),
}

/// Badge definition with display metadata
#[derive(Debug, Clone)]
pub struct Badge {
    pub id: BadgeId,
    pub title: &'static str,
    pub description: &'static str,
    /// Icon identifier understood by the card renderers
    pub icon: &'static str,
    pub trigger: BadgeTrigger,
}

/// All badge definitions
pub static BADGES: &[Badge] = &[
    Badge {
        id: BadgeId::SevenFocusStreak,
        title: "Seven Focus Streak",
        description: "Save 10 minutes in a day, or keep today's efficiency at 70% or more",
        icon: "flame.fill",
        trigger: BadgeTrigger::Threshold,
    },
    Badge {
        id: BadgeId::Marathon300,
        title: "Marathon 300",
        description: "Save 300 minutes of scrolling in total",
        icon: "figure.run",
        trigger: BadgeTrigger::Threshold,
    },
    Badge {
        id: BadgeId::FirstShare,
        title: "First Share",
        description: "Share your stats for the first time",
        icon: "square.and.arrow.up",
        trigger: BadgeTrigger::Event(BadgeEvent::ShareCompleted),
    },
    Badge {
        id: BadgeId::SocialStarter,
        title: "Social Starter",
        description: "Generate a code to compare with a friend",
        icon: "person.2.fill",
        trigger: BadgeTrigger::Event(BadgeEvent::PeerCodeGenerated),
    },
];

impl Badge {
    /// Get badge definition by ID
    pub fn get(id: BadgeId) -> &'static Badge {
        BADGES
            .iter()
            .find(|b| b.id == id)
            .expect("All badges should be defined")
    }

    /// Look up a persisted ID; unknown IDs (e.g. retired badges) yield `None`
    pub fn lookup(id: &str) -> Option<&'static Badge> {
        BadgeId::from_str(id).map(Self::get)
    }
}
