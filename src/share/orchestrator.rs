//! Share flow: build a peer record, turn it into a code, compare with a friend's

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use tracing::info;

use super::codec;
use super::peer_stats::{PeerPlatform, PeerStats, SharePeriod, MAX_TOP_PLATFORMS, SCHEMA_VERSION};
use crate::stats::{
    day_bucket, AggregatorParams, BadgeEngine, BadgeEvent, BadgeState, StatsQuery, StatsSnapshot,
    Store, TimeRange, UnlockedBadge,
};

/// Source of the name shown on shared stats
pub trait DisplayNameProvider {
    fn display_name(&self) -> String;
}

/// Configured name, falling back to `User-XXXX` derived from the device ID
#[derive(Debug, Clone)]
pub struct DeviceDisplayName {
    configured: Option<String>,
    device_id: String,
}

impl DeviceDisplayName {
    pub fn new(configured: Option<String>, device_id: impl Into<String>) -> Self {
        Self {
            configured,
            device_id: device_id.into(),
        }
    }
}

impl DisplayNameProvider for DeviceDisplayName {
    fn display_name(&self) -> String {
        if let Some(name) = self.configured.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        let prefix: String = self
            .device_id
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(4)
            .collect::<String>()
            .to_uppercase();
        if prefix.is_empty() {
            "User".to_string()
        } else {
            format!("User-{}", prefix)
        }
    }
}

/// One metric, side by side
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricComparison {
    pub mine: f64,
    pub peer: f64,
}

impl MetricComparison {
    pub fn new(mine: f64, peer: f64) -> Self {
        Self { mine, peer }
    }

    pub fn difference(&self) -> f64 {
        self.mine - self.peer
    }

    /// How far ahead (positive) or behind the peer, relative to the peer's value
    pub fn percent_change(&self) -> f64 {
        if self.peer == 0.0 {
            if self.mine > 0.0 { 100.0 } else { 0.0 }
        } else {
            ((self.mine - self.peer) / self.peer) * 100.0
        }
    }

    pub fn is_ahead(&self) -> bool {
        self.mine >= self.peer
    }
}

/// Local stats next to an imported peer record, over the peer's period
#[derive(Debug, Clone)]
pub struct Comparison {
    pub me: PeerStats,
    pub peer: PeerStats,
    pub time_saved_minutes: MetricComparison,
    pub focus_score: MetricComparison,
    pub efficiency: MetricComparison,
    pub searches: MetricComparison,
}

impl Comparison {
    pub fn new(me: PeerStats, peer: PeerStats) -> Self {
        Self {
            time_saved_minutes: MetricComparison::new(
                me.time_saved_minutes as f64,
                peer.time_saved_minutes as f64,
            ),
            focus_score: MetricComparison::new(f64::from(me.focus_score), f64::from(peer.focus_score)),
            efficiency: MetricComparison::new(me.efficiency, peer.efficiency),
            searches: MetricComparison::new(
                me.total_trend_searches() as f64,
                peer.total_trend_searches() as f64,
            ),
            me,
            peer,
        }
    }
}

/// A freshly generated share code
#[derive(Debug, Clone)]
pub struct GeneratedCode {
    pub token: String,
    pub stats: PeerStats,
    pub unlocked: Option<UnlockedBadge>,
}

/// Reduce a snapshot to its shareable subset
pub fn build_peer_stats(snapshot: &StatsSnapshot, period: SharePeriod, display_name: String) -> PeerStats {
    PeerStats {
        version: SCHEMA_VERSION,
        display_name,
        period,
        time_saved_minutes: snapshot.time_saved_minutes(),
        focus_score: snapshot.focus_score.min(100),
        efficiency: snapshot.efficiency_rate.clamp(0.0, 1.0),
        top_platforms: snapshot
            .platform_shares(MAX_TOP_PLATFORMS)
            .into_iter()
            .map(|(platform, share)| PeerPlatform {
                name: platform.display_name().to_string(),
                percent: share,
            })
            .collect(),
        trend: snapshot.daily_trend.clone(),
        generated: day_bucket(snapshot.generated_on),
    }
}

/// Glue between the event log, badges and the codec
pub struct ShareOrchestrator<S, N> {
    query: StatsQuery,
    badges: BadgeEngine<S>,
    names: N,
    params: AggregatorParams,
}

impl<S, N> ShareOrchestrator<S, N>
where
    S: Store<Vec<BadgeState>>,
    N: DisplayNameProvider,
{
    pub fn new(query: StatsQuery, badges: BadgeEngine<S>, names: N, params: AggregatorParams) -> Self {
        Self {
            query,
            badges,
            names,
            params,
        }
    }

    pub fn badges(&self) -> &BadgeEngine<S> {
        &self.badges
    }

    /// Snapshot for `period` reduced to a peer record
    pub fn peer_stats<Tz: TimeZone>(&self, period: SharePeriod, now: &DateTime<Tz>) -> Result<PeerStats> {
        let snapshot = self.query.snapshot(period.time_range(), now, &self.params)?;
        Ok(build_peer_stats(&snapshot, period, self.names.display_name()))
    }

    /// Evaluate threshold badges against all recorded history
    pub fn evaluate_badges<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<Vec<UnlockedBadge>> {
        let snapshot = self.query.snapshot(TimeRange::AllTime, now, &self.params)?;
        self.badges.evaluate(&snapshot, now.with_timezone(&Utc))
    }

    /// Build and encode a peer record; generating a code counts toward badges
    pub fn generate_code<Tz: TimeZone>(&self, period: SharePeriod, now: &DateTime<Tz>) -> Result<GeneratedCode> {
        let stats = self.peer_stats(period, now)?;
        let token = codec::encode(&stats)?;
        let unlocked = self
            .badges
            .fire_event(BadgeEvent::PeerCodeGenerated, now.with_timezone(&Utc))?;
        info!(period = %period, "Generated share code");
        Ok(GeneratedCode {
            token,
            stats,
            unlocked,
        })
    }

    /// The user completed a share
    pub fn record_share<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<Option<UnlockedBadge>> {
        self.badges
            .fire_event(BadgeEvent::ShareCompleted, now.with_timezone(&Utc))
    }

    /// Decode a friend's code and line it up against local stats for the same period.
    ///
    /// Decode failures are returned as [`codec::StatsCodeError`] inside the
    /// `anyhow::Error`.
    pub fn compare<Tz: TimeZone>(&self, token: &str, now: &DateTime<Tz>) -> Result<Comparison> {
        let peer = codec::decode(token)?;
        let me = self.peer_stats(peer.period, now)?;
        Ok(Comparison::new(me, peer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Platform, SearchEvent};
    use crate::share::StatsCodeError;
    use crate::stats::{BadgeId, MemoryStore, StatsManager};
    use chrono::{Duration, FixedOffset};

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 15, 14, 0, 0)
            .unwrap()
    }

    fn orchestrator() -> (StatsManager, ShareOrchestrator<MemoryStore<Vec<BadgeState>>, DeviceDisplayName>) {
        let manager = StatsManager::in_memory().unwrap();
        let badges = BadgeEngine::new(MemoryStore::new()).unwrap();
        let names = DeviceDisplayName::new(None, "ab12cd34-0000-4000-8000-000000000000");
        let orchestrator =
            ShareOrchestrator::new(manager.query(), badges, names, AggregatorParams::default());
        (manager, orchestrator)
    }

    fn record(manager: &StatsManager, platform: Platform, at: DateTime<Utc>) {
        manager
            .recorder()
            .record_search(&SearchEvent::new("query", platform, at).with_result_count(3))
            .unwrap();
    }

    #[test]
    fn test_display_name() {
        let device = DeviceDisplayName::new(None, "ab12cd34-0000");
        assert_eq!(device.display_name(), "User-AB12");

        let configured = DeviceDisplayName::new(Some("  Sam ".to_string()), "ab12");
        assert_eq!(configured.display_name(), "Sam");

        let blank = DeviceDisplayName::new(Some(" ".to_string()), "");
        assert_eq!(blank.display_name(), "User");
    }

    #[test]
    fn test_peer_stats_from_log() {
        let (manager, orchestrator) = orchestrator();
        let utc_now = now().with_timezone(&Utc);
        for _ in 0..3 {
            record(&manager, Platform::Reddit, utc_now - Duration::hours(1));
        }
        record(&manager, Platform::Youtube, utc_now - Duration::days(2));
        // Outside the 7 day period
        record(&manager, Platform::Google, utc_now - Duration::days(9));

        let stats = orchestrator.peer_stats(SharePeriod::Week, &now()).unwrap();

        assert_eq!(stats.display_name, "User-AB12");
        assert_eq!(stats.trend, vec![0, 0, 0, 0, 1, 0, 3]);
        assert_eq!(stats.time_saved_minutes, 2);
        assert_eq!(stats.focus_score, 8);
        assert_eq!(stats.top_platforms[0].name, "Reddit");
        assert!((stats.top_platforms[0].percent - 0.75).abs() < 1e-9);
        assert_eq!(stats.generated, "2024-05-15");
        assert_eq!(stats.validate(), Ok(()));
    }

    #[test]
    fn test_generate_code_unlocks_social_starter_once() {
        let (_manager, orchestrator) = orchestrator();

        let first = orchestrator.generate_code(SharePeriod::Month, &now()).unwrap();
        assert_eq!(first.unlocked.unwrap().badge.id, BadgeId::SocialStarter);
        assert_eq!(first.stats.trend.len(), 30);

        let second = orchestrator.generate_code(SharePeriod::Month, &now()).unwrap();
        assert!(second.unlocked.is_none());
        assert_eq!(first.token, second.token);
    }

    #[test]
    fn test_record_share() {
        let (_manager, orchestrator) = orchestrator();
        assert!(orchestrator.record_share(&now()).unwrap().is_some());
        assert!(orchestrator.record_share(&now()).unwrap().is_none());
        assert!(orchestrator.badges().is_unlocked(BadgeId::FirstShare));
    }

    #[test]
    fn test_compare_with_peer() {
        let (manager, orchestrator) = orchestrator();
        record(&manager, Platform::Reddit, now().with_timezone(&Utc));

        let mut peer = orchestrator.peer_stats(SharePeriod::Week, &now()).unwrap();
        peer.display_name = "Friend".to_string();
        peer.focus_score = 10;
        let token = codec::encode(&peer).unwrap();

        let comparison = orchestrator.compare(&token, &now()).unwrap();
        assert_eq!(comparison.peer.display_name, "Friend");
        assert_eq!(comparison.focus_score, MetricComparison::new(2.0, 10.0));
        assert!(!comparison.focus_score.is_ahead());
        assert_eq!(comparison.searches.difference(), 0.0);
    }

    #[test]
    fn test_compare_surfaces_codec_error() {
        let (_manager, orchestrator) = orchestrator();
        let err = orchestrator.compare("not a code!", &now()).unwrap_err();

        assert_eq!(
            err.downcast_ref::<StatsCodeError>(),
            Some(&StatsCodeError::InvalidEncoding)
        );
    }

    #[test]
    fn test_evaluate_badges_uses_all_time_totals() {
        let (manager, orchestrator) = orchestrator();
        let utc_now = now().with_timezone(&Utc);
        // 600 searches at 30s each is 300 minutes, spread well beyond a week
        for day in 0..60 {
            for _ in 0..10 {
                record(&manager, Platform::Bing, utc_now - Duration::days(day + 10));
            }
        }

        let unlocked = orchestrator.evaluate_badges(&now()).unwrap();
        let ids: Vec<BadgeId> = unlocked.iter().map(|u| u.badge.id).collect();
        assert_eq!(ids, vec![BadgeId::Marathon300]);
    }

    #[test]
    fn test_metric_comparison() {
        let metric = MetricComparison::new(15.0, 10.0);
        assert_eq!(metric.difference(), 5.0);
        assert_eq!(metric.percent_change(), 50.0);
        assert!(metric.is_ahead());
        assert_eq!(MetricComparison::new(3.0, 0.0).percent_change(), 100.0);
    }
}
