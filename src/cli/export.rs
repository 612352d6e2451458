//! Export command implementation

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context as _, Result};
use chrono::Local;

use skipfeed::stats::export::{export, ExportFormat, ExportSections};
use skipfeed::stats::TimeRange;

use super::Context;

pub struct ExportArgs {
    pub format: String,
    pub range: String,
    pub output: Option<PathBuf>,
    /// Write to a timestamped file in the current directory when no output is given
    pub save: bool,
    pub sections: ExportSections,
}

/// Write history and statistics to a file (or stdout)
pub fn export_command(ctx: &Context, args: ExportArgs) -> Result<()> {
    let format: ExportFormat = args.format.parse().map_err(|e: String| anyhow!(e))?;
    let range: TimeRange = args.range.parse().map_err(|e: String| anyhow!(e))?;
    if args.sections.is_empty() {
        bail!("Nothing to export: every section is disabled");
    }

    let now = Local::now();
    let query = ctx.stats.query();
    let snapshot = query.snapshot(range, &now, &ctx.params())?;
    let events = query.list_events(None)?;
    let content = export(&events, &snapshot, format, args.sections, &now)?;

    let output = match (args.output, args.save) {
        (Some(path), _) => Some(path),
        (None, true) => Some(PathBuf::from(default_file_name(format))),
        (None, false) => None,
    };

    match output {
        Some(path) => {
            std::fs::write(&path, content)
                .with_context(|| format!("Failed to write export: {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

/// Default export file name, e.g. `SkipFeed_Export_2024-05-15_10-00-00.csv`
pub fn default_file_name(format: ExportFormat) -> String {
    format!(
        "SkipFeed_Export_{}.{}",
        Local::now().format("%Y-%m-%d_%H-%M-%S"),
        format.extension()
    )
}
