//! Export of search history and usage statistics
//!
//! Three formats share the same inputs: the raw events for the range and the
//! snapshot computed over that range.

use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use serde_json::json;

use super::models::StatsSnapshot;
use super::time_bucket::{local_date, window_start};
use crate::domain::SearchEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Txt,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Txt => "txt",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.extension().to_ascii_uppercase())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "txt" | "text" => Ok(Self::Txt),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown export format '{}', expected csv, txt or json", other)),
        }
    }
}

/// Which parts of the report to include
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSections {
    pub search_history: bool,
    pub platform_usage: bool,
    pub usage_statistics: bool,
}

impl Default for ExportSections {
    fn default() -> Self {
        Self {
            search_history: true,
            platform_usage: true,
            usage_statistics: true,
        }
    }
}

impl ExportSections {
    pub fn is_empty(&self) -> bool {
        !(self.search_history || self.platform_usage || self.usage_statistics)
    }
}

/// Render an export report.
///
/// Events outside `snapshot.range` (as seen from `generated_at`'s calendar)
/// are left out; history is listed newest first.
pub fn export<Tz>(
    events: &[SearchEvent],
    snapshot: &StatsSnapshot,
    format: ExportFormat,
    sections: ExportSections,
    generated_at: &DateTime<Tz>,
) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let tz = generated_at.timezone();
    let today = generated_at.date_naive();
    let start = snapshot.range.days().map(|days| window_start(today, days));
    // Same window the aggregator used for the snapshot
    let mut history: Vec<&SearchEvent> = events
        .iter()
        .filter(|event| match start {
            Some(start) => {
                let date = local_date(&event.timestamp, &tz);
                date >= start && date <= today
            }
            None => true,
        })
        .collect();
    history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    match format {
        ExportFormat::Csv => Ok(render_csv(&history, snapshot, sections, &tz)),
        ExportFormat::Txt => Ok(render_txt(&history, snapshot, sections, generated_at)),
        ExportFormat::Json => render_json(&history, snapshot, sections, generated_at),
    }
}

/// Quote a CSV field, doubling embedded quotes
pub fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// "1h 5m" style duration, minutes only below an hour
pub fn format_time_saved(seconds: f64) -> String {
    let total_minutes = (seconds.max(0.0) / 60.0) as u64;
    let (hours, minutes) = (total_minutes / 60, total_minutes % 60);
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

fn render_csv<Tz>(
    history: &[&SearchEvent],
    snapshot: &StatsSnapshot,
    sections: ExportSections,
    tz: &Tz,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut csv = String::new();

    if sections.search_history {
        csv.push_str("Date,Time,Platform,Query,Search_Count\n");
        for event in history {
            let local = event.timestamp.with_timezone(tz);
            let _ = writeln!(
                csv,
                "{},{},{},{},1",
                csv_field(&local.format("%Y-%m-%d").to_string()),
                csv_field(&local.format("%H:%M:%S").to_string()),
                csv_field(event.platform.display_name()),
                csv_field(&event.query),
            );
        }
    }

    if sections.platform_usage {
        if !csv.is_empty() {
            csv.push_str("\n\n");
        }
        csv.push_str("Platform Usage Summary:\n");
        csv.push_str("Platform,Total_Searches,Percentage\n");
        for entry in &snapshot.platform_ranking {
            let _ = writeln!(
                csv,
                "{},{},{:.1}%",
                csv_field(entry.platform.display_name()),
                entry.count,
                percentage(entry.count, snapshot.total_searches),
            );
        }
    }

    if sections.usage_statistics {
        if !csv.is_empty() {
            csv.push_str("\n\n");
        }
        csv.push_str("Usage Statistics:\n");
        csv.push_str("Metric,Value\n");
        let _ = writeln!(csv, "{},{}", csv_field("Total Searches"), snapshot.total_searches);
        let _ = writeln!(csv, "{},{}", csv_field("Today's Searches"), snapshot.today_searches);
        let _ = writeln!(csv, "{},{}", csv_field("Time Saved (minutes)"), snapshot.time_saved_minutes());
        let _ = writeln!(
            csv,
            "{},{}",
            csv_field("Today's Time Saved (minutes)"),
            snapshot.time_saved_today_minutes()
        );
    }

    csv
}

fn render_txt<Tz>(
    history: &[&SearchEvent],
    snapshot: &StatsSnapshot,
    sections: ExportSections,
    generated_at: &DateTime<Tz>,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let tz = generated_at.timezone();
    let mut out = String::from("SkipFeed Export Report\n");
    let _ = writeln!(out, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "Time Range: {}", snapshot.range.label());
    if sections.search_history {
        let _ = writeln!(out, "Total Searches: {}", history.len());
    }
    out.push_str(&"=".repeat(50));
    out.push_str("\n\n");

    if sections.search_history {
        out.push_str("SEARCH HISTORY:\n");
        out.push_str(&"-".repeat(20));
        out.push('\n');
        for event in history {
            let local = event.timestamp.with_timezone(&tz);
            let _ = writeln!(out, "Date: {}", local.format("%Y-%m-%d %H:%M:%S"));
            let _ = writeln!(out, "Platform: {}", event.platform.display_name());
            let _ = writeln!(out, "Query: {}", event.query);
            if let Some(count) = event.result_count {
                let _ = writeln!(out, "Results: {}", count);
            }
            out.push('\n');
        }
    }

    if sections.platform_usage {
        if sections.search_history {
            out.push('\n');
        }
        out.push_str("PLATFORM USAGE SUMMARY:\n");
        out.push_str(&"-".repeat(25));
        out.push('\n');
        for entry in &snapshot.platform_ranking {
            let _ = writeln!(
                out,
                "{}: {} searches ({:.1}%)",
                entry.platform.display_name(),
                entry.count,
                percentage(entry.count, snapshot.total_searches),
            );
        }
    }

    if sections.usage_statistics {
        if sections.search_history || sections.platform_usage {
            out.push('\n');
        }
        out.push_str("STATISTICS:\n");
        out.push_str(&"-".repeat(12));
        out.push('\n');
        let _ = writeln!(out, "Total Searches: {}", snapshot.total_searches);
        let _ = writeln!(out, "Today's Searches: {}", snapshot.today_searches);
        let _ = writeln!(out, "Time Saved: {}", format_time_saved(snapshot.time_saved_seconds));
        let _ = writeln!(
            out,
            "Today's Time Saved: {}",
            format_time_saved(snapshot.time_saved_today_seconds)
        );
    }

    out
}

fn render_json<Tz>(
    history: &[&SearchEvent],
    snapshot: &StatsSnapshot,
    sections: ExportSections,
    generated_at: &DateTime<Tz>,
) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut doc = json!({
        "export_info": {
            "generated_at": generated_at.to_rfc3339(),
            "time_range": snapshot.range.label(),
            "format": "JSON",
            "app_version": env!("CARGO_PKG_VERSION"),
            "included_content": {
                "search_queries": sections.search_history,
                "platform_usage": sections.platform_usage,
                "usage_statistics": sections.usage_statistics,
            },
        },
    });

    if sections.search_history {
        doc["search_history"] = history
            .iter()
            .map(|event| {
                json!({
                    "query": event.query,
                    "platform": event.platform.as_str(),
                    "platform_name": event.platform.display_name(),
                    "timestamp": event.timestamp.to_rfc3339(),
                    "result_count": event.result_count,
                })
            })
            .collect();
    }

    if sections.platform_usage {
        doc["platform_usage"] = snapshot
            .platform_ranking
            .iter()
            .map(|entry| {
                json!({
                    "platform": entry.platform.as_str(),
                    "platform_name": entry.platform.display_name(),
                    "search_count": entry.count,
                })
            })
            .collect();
    }

    if sections.usage_statistics {
        doc["statistics"] = json!({
            "total_searches": snapshot.total_searches,
            "todays_searches": snapshot.today_searches,
            "time_saved_seconds": snapshot.time_saved_seconds,
            "todays_time_saved_seconds": snapshot.time_saved_today_seconds,
        });
    }

    serde_json::to_string_pretty(&doc).context("Failed to serialize export")
}
