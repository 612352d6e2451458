//! Badge engine - unlock evaluation and persistence
//!
//! Each badge is either locked or unlocked. Unlocking is one-way: once a
//! badge has an `unlocked_at` it is never changed again, no matter how often
//! its condition fires afterwards.

use std::sync::Mutex;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::checker::check_threshold_badges;
use super::definitions::{Badge, BadgeEvent, BadgeId};
use crate::stats::models::StatsSnapshot;
use crate::stats::store::Store;

/// Key the badge list is stored under
pub const BADGE_STATE_KEY: &str = "badges_state";

/// Persisted unlock state for one badge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeState {
    pub id: String,
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// Display data for an unlocked badge, as consumed by card renderers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareBadge {
    pub id: &'static str,
    pub title: &'static str,
    pub icon: &'static str,
}

/// A badge that was just unlocked
#[derive(Debug, Clone)]
pub struct UnlockedBadge {
    pub badge: &'static Badge,
    pub unlocked_at: DateTime<Utc>,
}

/// Evaluates unlock conditions and owns the persisted badge state
pub struct BadgeEngine<S> {
    store: S,
    /// Unlock order; guarded so check-and-set plus save is atomic
    states: Mutex<Vec<BadgeState>>,
}

impl<S: Store<Vec<BadgeState>>> BadgeEngine<S> {
    /// Create an engine, loading any previously persisted state
    pub fn new(store: S) -> Result<Self> {
        let states = store.load()?.unwrap_or_default();
        debug!("Loaded {} badge states", states.len());
        Ok(Self {
            store,
            states: Mutex::new(states),
        })
    }

    /// Check every threshold badge against a fresh snapshot.
    ///
    /// Cumulative badges read the snapshot's totals, so pass an all-time
    /// snapshot to evaluate them over the whole history.
    pub fn evaluate(&self, snapshot: &StatsSnapshot, at: DateTime<Utc>) -> Result<Vec<UnlockedBadge>> {
        let mut states = self.lock();
        let candidates = check_threshold_badges(snapshot, &unlocked_ids(&states));
        self.unlock(&mut states, &candidates, at)
    }

    /// Record a discrete user action; unlocks at most one badge
    pub fn fire_event(&self, event: BadgeEvent, at: DateTime<Utc>) -> Result<Option<UnlockedBadge>> {
        let mut states = self.lock();
        let unlocked = self.unlock(&mut states, &[event.badge()], at)?;
        Ok(unlocked.into_iter().next())
    }

    /// Unlocked badges with display metadata, in unlock order.
    ///
    /// IDs no longer in the catalog are skipped.
    pub fn unlocked_badges(&self) -> Vec<ShareBadge> {
        self.lock()
            .iter()
            .filter(|state| state.unlocked_at.is_some())
            .filter_map(|state| Badge::lookup(&state.id))
            .map(|badge| ShareBadge {
                id: badge.id.as_str(),
                title: badge.title,
                icon: badge.icon,
            })
            .collect()
    }

    pub fn is_unlocked(&self, id: BadgeId) -> bool {
        self.lock()
            .iter()
            .any(|state| state.id == id.as_str() && state.unlocked_at.is_some())
    }

    /// When a badge was unlocked, if it has been
    pub fn unlocked_at(&self, id: BadgeId) -> Option<DateTime<Utc>> {
        self.lock()
            .iter()
            .find(|state| state.id == id.as_str())
            .and_then(|state| state.unlocked_at)
    }

    /// Raw persisted states, including IDs unknown to this build
    pub fn states(&self) -> Vec<BadgeState> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<BadgeState>> {
        self.states.lock().expect("Badge state lock poisoned")
    }

    /// Unlock `ids` that are still locked and persist the result.
    ///
    /// The check runs against the stored list inside one store update, so
    /// engines sharing a store never unlock a badge twice. The in-memory copy
    /// is replaced only after the update succeeds.
    fn unlock(
        &self,
        states: &mut Vec<BadgeState>,
        ids: &[BadgeId],
        at: DateTime<Utc>,
    ) -> Result<Vec<UnlockedBadge>> {
        let (current, newly_unlocked) = self.store.update(|stored| {
            let mut next = stored.unwrap_or_default();
            let newly_unlocked = apply_unlocks(&mut next, ids, at);
            let save = (!newly_unlocked.is_empty()).then(|| next.clone());
            (save, (next, newly_unlocked))
        })?;

        *states = current;
        for unlocked in &newly_unlocked {
            info!("Badge unlocked: {}", unlocked.badge.title);
        }
        Ok(newly_unlocked)
    }
}

/// Set `unlocked_at` on each still-locked id, appending unseen ones
fn apply_unlocks(
    states: &mut Vec<BadgeState>,
    ids: &[BadgeId],
    at: DateTime<Utc>,
) -> Vec<UnlockedBadge> {
    let mut newly_unlocked = Vec::new();
    for id in ids {
        match states.iter_mut().find(|state| state.id == id.as_str()) {
            Some(state) if state.unlocked_at.is_some() => continue,
            Some(state) => state.unlocked_at = Some(at),
            None => states.push(BadgeState {
                id: id.as_str().to_string(),
                unlocked_at: Some(at),
            }),
        }
        newly_unlocked.push(UnlockedBadge {
            badge: Badge::get(*id),
            unlocked_at: at,
        });
    }
    newly_unlocked
}

fn unlocked_ids(states: &[BadgeState]) -> Vec<String> {
    states
        .iter()
        .filter(|state| state.unlocked_at.is_some())
        .map(|state| state.id.clone())
        .collect()
}
