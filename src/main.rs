//! Reconcile Trace CLI
//!
//! Replays scheduler notifications for an interruptible tree walk through
//! the stack tracker and the user-timing profiler, then writes a JSON
//! profile and an optional flamegraph.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use reconcile_trace::commands::{
    display_schema, display_version, execute_replay, validate_args, validate_profile_file,
    ReplayArgs,
};
use reconcile_trace::flamegraph::{FlamegraphConfig, FlamegraphPalette};
use reconcile_trace::timing::ProfilerConfig;

/// Reconcile Trace - stack traces and timing for tree reconciliation
#[derive(Parser, Debug)]
#[command(name = "reconcile-trace")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a scripted work loop and profile it
    Replay {
        /// Replay script (JSON)
        #[arg(short, long)]
        script: PathBuf,

        /// Output path for JSON profile
        #[arg(short, long, default_value = "profile.json")]
        output: PathBuf,

        /// Output path for SVG flamegraph (optional)
        #[arg(short, long)]
        flamegraph: Option<PathBuf>,

        /// Number of top labels to include
        #[arg(long, default_value = "20")]
        top_labels: usize,

        /// Flamegraph title
        #[arg(long)]
        title: Option<String>,

        /// Flamegraph width in pixels
        #[arg(long, default_value = "1200")]
        width: usize,

        /// Flamegraph palette
        #[arg(long, value_enum, default_value = "hot")]
        palette: FlamegraphPalette,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,

        /// Disable user-timing measurements
        #[arg(long, env = "RECONCILE_TRACE_NO_USER_TIMING")]
        no_user_timing: bool,

        /// Use the production (no-op) stack tracker
        #[arg(long)]
        no_dev: bool,

        /// Also skip host components and mode boundaries in node timers
        #[arg(long)]
        hide_host: bool,
    },

    /// Validate a profile JSON file
    Validate {
        /// Path to profile JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Replay {
            script,
            output,
            flamegraph,
            top_labels,
            title,
            width,
            palette,
            summary,
            no_user_timing,
            no_dev,
            hide_host,
        } => {
            let fg_config = flamegraph.as_ref().map(|_| {
                let mut config = FlamegraphConfig::new().with_palette(palette);
                if let Some(title) = title {
                    config = config.with_title(title);
                }
                config.width = width;
                config
            });

            let profiler = ProfilerConfig::new()
                .with_user_timing(!no_user_timing)
                .with_hidden_host_nodes(hide_host);

            let args = ReplayArgs {
                script,
                output_json: output,
                output_svg: flamegraph,
                top_labels,
                flamegraph_config: fg_config,
                print_summary: summary,
                profiler,
                dev_mode: !no_dev,
            };

            // Validate args first
            validate_args(&args)?;

            execute_replay(args)?;
        }

        Commands::Validate { file } => {
            validate_profile_file(&file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
