//! Folds the search event log into a [`StatsSnapshot`].
//!
//! Aggregation is a pure function of the events handed in and a reference
//! "now". It never touches the database: callers pass a point-in-time copy
//! of the log (see [`StatsQuery::list_events`](super::StatsQuery::list_events)).

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, TimeZone};
use tracing::debug;

use super::models::{PlatformCount, StatsSnapshot, TimeOfDayBuckets, TimeRange, MAX_RANGE_DAYS};
use super::time_bucket::{local_date, minute_of_day, time_of_day, window_days, window_start};
use crate::domain::{Platform, SearchEvent};

/// Default estimate of scrolling avoided per direct search
pub const DEFAULT_SECONDS_SAVED_PER_SEARCH: f64 = 30.0;
/// Trend length charted for all-time snapshots
pub const DEFAULT_TREND_DAYS: u32 = 7;

/// Tunable inputs to aggregation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregatorParams {
    /// Seconds of feed scrolling one direct search is assumed to save
    pub seconds_saved_per_search: f64,
    /// Trend length used when the range has no fixed number of days
    pub default_trend_days: u32,
}

impl Default for AggregatorParams {
    fn default() -> Self {
        Self {
            seconds_saved_per_search: DEFAULT_SECONDS_SAVED_PER_SEARCH,
            default_trend_days: DEFAULT_TREND_DAYS,
        }
    }
}

impl AggregatorParams {
    /// Per-search estimate clamped so time saved never decreases with more searches
    fn seconds_per_search(&self) -> f64 {
        if self.seconds_saved_per_search.is_finite() {
            self.seconds_saved_per_search.max(0.0)
        } else {
            0.0
        }
    }
}

/// Compute a snapshot of `events` for `range`, as seen at `now`.
///
/// `now`'s timezone defines the local calendar used for "today", the daily
/// trend and time-of-day buckets. Event order does not matter.
pub fn aggregate<Tz: TimeZone>(
    events: &[SearchEvent],
    now: &DateTime<Tz>,
    range: TimeRange,
    params: &AggregatorParams,
) -> StatsSnapshot {
    let tz = now.timezone();
    let today = now.date_naive();
    let trend_days = range
        .days()
        .unwrap_or(params.default_trend_days)
        .clamp(1, MAX_RANGE_DAYS);
    let start = range.days().map(|days| window_start(today, days));

    // Resolve local dates once; the rest of the fold works on these
    let in_window: Vec<(&SearchEvent, NaiveDate)> = events
        .iter()
        .map(|event| (event, local_date(&event.timestamp, &tz)))
        .filter(|(_, date)| match start {
            Some(start) => *date >= start && *date <= today,
            None => true,
        })
        .collect();

    let total_searches = in_window.len() as u64;
    let today_events: Vec<&SearchEvent> = in_window
        .iter()
        .filter(|(_, date)| *date == today)
        .map(|(event, _)| *event)
        .collect();
    let today_searches = today_events.len() as u64;

    let per_search = params.seconds_per_search();
    let focus_score = total_searches.saturating_mul(2).min(100) as u32;

    let snapshot = StatsSnapshot {
        range,
        generated_on: today,
        total_searches,
        today_searches,
        time_saved_seconds: total_searches as f64 * per_search,
        time_saved_today_seconds: today_searches as f64 * per_search,
        platform_ranking: rank_platforms(in_window.iter().map(|(event, _)| event.platform)),
        daily_trend: daily_trend(in_window.iter().map(|(_, date)| *date), today, trend_days),
        time_of_day: time_of_day_buckets(in_window.iter().map(|(event, _)| *event), &tz),
        focus_score,
        efficiency_rate: efficiency_rate(in_window.iter().map(|(event, _)| *event)),
        today_efficiency_rate: efficiency_rate(today_events.iter().copied()),
    };

    debug!(
        range = %range,
        total = snapshot.total_searches,
        today = snapshot.today_searches,
        "Aggregated search events"
    );
    snapshot
}

/// Group by platform, most used first.
///
/// Counting into a `BTreeMap` keyed by the platform enum visits platforms in
/// declaration order, and the sort below is stable, so ties keep that order.
pub fn rank_platforms(platforms: impl Iterator<Item = Platform>) -> Vec<PlatformCount> {
    let mut counts: BTreeMap<Platform, u64> = BTreeMap::new();
    for platform in platforms {
        *counts.entry(platform).or_insert(0) += 1;
    }

    let mut ranking: Vec<PlatformCount> = counts
        .into_iter()
        .map(|(platform, count)| PlatformCount { platform, count })
        .collect();
    ranking.sort_by(|a, b| b.count.cmp(&a.count));
    ranking
}

/// Per-day counts for the `days` days ending on `today`, zero-filled
pub fn daily_trend(dates: impl Iterator<Item = NaiveDate>, today: NaiveDate, days: u32) -> Vec<u64> {
    let mut per_day: HashMap<NaiveDate, u64> = HashMap::new();
    for date in dates {
        *per_day.entry(date).or_insert(0) += 1;
    }

    window_days(today, days)
        .into_iter()
        .map(|day| per_day.get(&day).copied().unwrap_or(0))
        .collect()
}

fn time_of_day_buckets<'a, Tz: TimeZone>(
    events: impl Iterator<Item = &'a SearchEvent>,
    tz: &Tz,
) -> TimeOfDayBuckets {
    let mut buckets = TimeOfDayBuckets::default();
    for event in events {
        buckets.add(time_of_day(minute_of_day(&event.timestamp, tz)));
    }
    buckets
}

/// Fraction of searches with a reported result count that found results.
///
/// Searches without a result count carry no signal and are ignored; with no
/// signal at all the rate is 0.
pub fn efficiency_rate<'a>(events: impl Iterator<Item = &'a SearchEvent>) -> f64 {
    let (with_signal, successful) = events
        .filter_map(|event| event.result_count)
        .fold((0u64, 0u64), |(seen, hits), count| {
            (seen + 1, hits + u64::from(count > 0))
        });

    if with_signal == 0 {
        0.0
    } else {
        successful as f64 / with_signal as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, Utc};

    fn tz() -> FixedOffset {
        FixedOffset::east_opt(2 * 3600).unwrap()
    }

    /// 2024-05-15 14:00 local (UTC+2)
    fn now() -> DateTime<FixedOffset> {
        tz().with_ymd_and_hms(2024, 5, 15, 14, 0, 0).unwrap()
    }

    fn event_at(platform: Platform, local: DateTime<FixedOffset>) -> SearchEvent {
        SearchEvent::new("rust", platform, local.with_timezone(&Utc))
    }

    #[test]
    fn test_empty_log_yields_zeroed_snapshot() {
        let snapshot = aggregate(&[], &now(), TimeRange::Last7Days, &AggregatorParams::default());

        assert_eq!(snapshot.total_searches, 0);
        assert_eq!(snapshot.today_searches, 0);
        assert_eq!(snapshot.daily_trend, vec![0; 7]);
        assert!(snapshot.platform_ranking.is_empty());
        assert_eq!(snapshot.time_of_day, TimeOfDayBuckets::default());
        assert_eq!(snapshot.focus_score, 0);
        assert_eq!(snapshot.efficiency_rate, 0.0);
        assert_eq!(snapshot.time_saved_seconds, 0.0);
    }

    #[test]
    fn test_ranking_for_todays_searches() {
        let events = vec![
            event_at(Platform::Reddit, now()),
            event_at(Platform::Youtube, now()),
            event_at(Platform::Reddit, now()),
            event_at(Platform::Reddit, now()),
        ];
        let snapshot = aggregate(&events, &now(), TimeRange::Last7Days, &AggregatorParams::default());

        assert_eq!(snapshot.total_searches, 4);
        assert_eq!(snapshot.today_searches, 4);
        assert_eq!(
            snapshot.platform_ranking,
            vec![
                PlatformCount { platform: Platform::Reddit, count: 3 },
                PlatformCount { platform: Platform::Youtube, count: 1 },
            ]
        );
        assert_eq!(*snapshot.daily_trend.last().unwrap(), 4);
    }

    #[test]
    fn test_ranking_ties_follow_declaration_order() {
        let events = vec![
            event_at(Platform::Bing, now()),
            event_at(Platform::Google, now()),
            event_at(Platform::Youtube, now()),
        ];
        let ranking = aggregate(&events, &now(), TimeRange::AllTime, &AggregatorParams::default())
            .platform_ranking;
        let order: Vec<Platform> = ranking.iter().map(|pc| pc.platform).collect();
        assert_eq!(order, vec![Platform::Youtube, Platform::Google, Platform::Bing]);
    }

    #[test]
    fn test_trend_is_zero_filled_and_excludes_older_events() {
        let events = vec![
            event_at(Platform::Google, now() - Duration::days(2)),
            event_at(Platform::Google, now() - Duration::days(2)),
            event_at(Platform::Google, now() - Duration::days(6)),
            // Outside the 7-day window
            event_at(Platform::Google, now() - Duration::days(7)),
        ];
        let snapshot = aggregate(&events, &now(), TimeRange::Last7Days, &AggregatorParams::default());

        assert_eq!(snapshot.daily_trend, vec![1, 0, 0, 0, 2, 0, 0]);
        assert_eq!(snapshot.total_searches, 3);
        let ranked: u64 = snapshot.platform_ranking.iter().map(|pc| pc.count).sum();
        assert_eq!(ranked, snapshot.total_searches);
    }

    #[test]
    fn test_trend_length_matches_window_for_sparse_data() {
        let events = vec![event_at(Platform::X, now())];
        for days in [1u32, 7, 14, 30, 90] {
            let snapshot = aggregate(
                &events,
                &now(),
                TimeRange::LastDays(days),
                &AggregatorParams::default(),
            );
            assert_eq!(snapshot.daily_trend.len(), days as usize);
        }
    }

    #[test]
    fn test_all_time_uses_default_trend_length() {
        let params = AggregatorParams { default_trend_days: 5, ..Default::default() };
        let events = vec![event_at(Platform::X, now() - Duration::days(400))];
        let snapshot = aggregate(&events, &now(), TimeRange::AllTime, &params);

        assert_eq!(snapshot.total_searches, 1);
        assert_eq!(snapshot.daily_trend, vec![0; 5]);
    }

    #[test]
    fn test_oversized_trend_length_is_capped() {
        let params = AggregatorParams { default_trend_days: u32::MAX, ..Default::default() };
        let snapshot = aggregate(&[], &now(), TimeRange::AllTime, &params);
        assert_eq!(snapshot.daily_trend.len(), MAX_RANGE_DAYS as usize);

        let snapshot = aggregate(&[], &now(), TimeRange::LastDays(u32::MAX), &params);
        assert_eq!(snapshot.daily_trend.len(), MAX_RANGE_DAYS as usize);
    }

    #[test]
    fn test_today_uses_local_calendar() {
        // 23:30 UTC on the 14th is 01:30 on the 15th in UTC+2
        let late = Utc.with_ymd_and_hms(2024, 5, 14, 23, 30, 0).unwrap();
        let events = vec![SearchEvent::new("late", Platform::Reddit, late)];
        let snapshot = aggregate(&events, &now(), TimeRange::Last7Days, &AggregatorParams::default());

        assert_eq!(snapshot.today_searches, 1);
        assert_eq!(snapshot.time_of_day.evening, 1);
    }

    #[test]
    fn test_time_of_day_buckets() {
        let day = |h, m| tz().with_ymd_and_hms(2024, 5, 15, h, m, 0).unwrap();
        let events = vec![
            event_at(Platform::Reddit, day(3, 0)),
            event_at(Platform::Reddit, day(11, 29)),
            event_at(Platform::Reddit, day(11, 30)),
            event_at(Platform::Reddit, day(17, 59)),
            event_at(Platform::Reddit, day(18, 0)),
            event_at(Platform::Reddit, day(2, 59)),
        ];
        let buckets = aggregate(&events, &now(), TimeRange::AllTime, &AggregatorParams::default())
            .time_of_day;

        assert_eq!(buckets, TimeOfDayBuckets { morning: 2, afternoon: 2, evening: 2 });
    }

    #[test]
    fn test_focus_score_caps_at_100() {
        let events: Vec<SearchEvent> = (0..51).map(|_| event_at(Platform::Bing, now())).collect();
        let snapshot = aggregate(&events, &now(), TimeRange::AllTime, &AggregatorParams::default());
        assert_eq!(snapshot.focus_score, 100);

        let snapshot = aggregate(&events[..7], &now(), TimeRange::AllTime, &AggregatorParams::default());
        assert_eq!(snapshot.focus_score, 14);
    }

    #[test]
    fn test_time_saved_scales_with_count() {
        let params = AggregatorParams { seconds_saved_per_search: 45.0, ..Default::default() };
        let events = vec![
            event_at(Platform::Youtube, now()),
            event_at(Platform::Youtube, now() - Duration::days(1)),
        ];
        let snapshot = aggregate(&events, &now(), TimeRange::Last7Days, &params);

        assert_eq!(snapshot.time_saved_seconds, 90.0);
        assert_eq!(snapshot.time_saved_today_seconds, 45.0);
    }

    #[test]
    fn test_negative_per_search_estimate_is_clamped() {
        let params = AggregatorParams { seconds_saved_per_search: -10.0, ..Default::default() };
        let events = vec![event_at(Platform::Youtube, now())];
        let snapshot = aggregate(&events, &now(), TimeRange::Last7Days, &params);
        assert_eq!(snapshot.time_saved_seconds, 0.0);
    }

    #[test]
    fn test_efficiency_ignores_events_without_result_counts() {
        let events = vec![
            event_at(Platform::Reddit, now()).with_result_count(12),
            event_at(Platform::Reddit, now()).with_result_count(0),
            event_at(Platform::Reddit, now()).with_result_count(3),
            event_at(Platform::Reddit, now()),
        ];
        let snapshot = aggregate(&events, &now(), TimeRange::Last7Days, &AggregatorParams::default());

        assert!((snapshot.efficiency_rate - 2.0 / 3.0).abs() < 1e-9);
        assert!((snapshot.today_efficiency_rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_aggregation_is_order_independent() {
        let mut events = vec![
            event_at(Platform::Reddit, now() - Duration::days(1)),
            event_at(Platform::Google, now()),
            event_at(Platform::Reddit, now() - Duration::hours(3)),
        ];
        let forward = aggregate(&events, &now(), TimeRange::Last7Days, &AggregatorParams::default());
        events.reverse();
        let backward = aggregate(&events, &now(), TimeRange::Last7Days, &AggregatorParams::default());
        assert_eq!(forward, backward);
    }
}
