use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use skipfeed::stats::export::ExportSections;

mod cli;

#[derive(Parser)]
#[command(name = "skipfeed")]
#[command(about = "SkipFeed - search without the feed, and see the time you saved")]
#[command(version)]
struct Cli {
    /// Path to the stats database (defaults to ~/.skipfeed/stats.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Path to the config file (defaults to ~/.skipfeed/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a search performed on a platform
    Record {
        /// youtube, reddit, instagram, facebook, x, google or bing
        platform: String,

        /// The search query
        query: String,

        /// Number of results the search returned
        #[arg(long)]
        results: Option<u32>,
    },

    /// Show usage statistics
    Stats {
        /// Time range: 7d, 30d, any Nd, or all
        #[arg(short, long, default_value = "7d")]
        range: String,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show recent searches
    History {
        /// Maximum number of searches to show
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,

        /// Only show searches on this platform
        #[arg(long)]
        platform: Option<String>,

        /// Delete all recorded searches instead of listing them
        #[arg(long)]
        clear: bool,
    },

    /// Show unlocked badges
    Badges {
        /// Include locked badges
        #[arg(long)]
        all: bool,
    },

    /// Generate a code others can compare against
    Share {
        /// Period to share: 7d or 30d
        #[arg(short, long, default_value = "7d")]
        period: String,

        /// Record that the code was shared
        #[arg(long)]
        shared: bool,
    },

    /// Compare your stats with a friend's code
    Compare {
        /// The code to compare against
        code: String,
    },

    /// Export history and statistics
    Export {
        /// csv, txt or json
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Time range: 7d, 30d or all
        #[arg(short, long, default_value = "all")]
        range: String,

        /// Output file (prints to stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write to a timestamped file in the current directory
        #[arg(long)]
        save: bool,

        /// Leave out the search history
        #[arg(long)]
        no_history: bool,

        /// Leave out the platform usage summary
        #[arg(long)]
        no_platforms: bool,

        /// Leave out the usage statistics
        #[arg(long)]
        no_statistics: bool,
    },

    /// Delete searches older than the retention window
    Prune {
        /// 7d, 30d or forever (defaults to the configured retention)
        #[arg(long)]
        retention: Option<String>,
    },

    /// Initialize ~/.skipfeed/config.toml with a new device ID
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli::config_path(cli.config);

    // Init must work before a config exists, so the rest open it lazily
    let db_path = cli.db;
    let open = || cli::Context::open(&config_path, db_path.as_deref());

    match cli.command {
        Commands::Init { force } => cli::init::init_command(&config_path, force)?,
        Commands::Record {
            platform,
            query,
            results,
        } => cli::record::record_command(&open()?, &platform, &query, results)?,
        Commands::Stats { range, json } => cli::stats::stats_command(&open()?, &range, json)?,
        Commands::History {
            limit,
            platform,
            clear,
        } => cli::history::history_command(&open()?, limit, platform, clear)?,
        Commands::Badges { all } => cli::badges::badges_command(&open()?, all)?,
        Commands::Share { period, shared } => cli::share::share_command(&open()?, &period, shared)?,
        Commands::Compare { code } => cli::share::compare_command(&open()?, &code)?,
        Commands::Export {
            format,
            range,
            output,
            save,
            no_history,
            no_platforms,
            no_statistics,
        } => cli::export::export_command(
            &open()?,
            cli::export::ExportArgs {
                format,
                range,
                output,
                save,
                sections: ExportSections {
                    search_history: !no_history,
                    platform_usage: !no_platforms,
                    usage_statistics: !no_statistics,
                },
            },
        )?,
        Commands::Prune { retention } => cli::history::prune_command(&open()?, retention)?,
    }

    Ok(())
}
