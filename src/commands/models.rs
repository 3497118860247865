//! Argument models shared by the CLI and the command implementations.

use crate::flamegraph::FlamegraphConfig;
use crate::timing::ProfilerConfig;
use crate::utils::config::DEFAULT_TOP_LABELS;
use std::path::PathBuf;

/// Arguments for the replay command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ReplayArgs {
    /// Replay script to drive the profiler with
    pub script: PathBuf,

    /// Output path for JSON profile
    pub output_json: PathBuf,

    /// Output path for SVG flamegraph (optional)
    pub output_svg: Option<PathBuf>,

    /// Number of hot labels to include in profile
    pub top_labels: usize,

    /// Flamegraph configuration
    pub flamegraph_config: Option<FlamegraphConfig>,

    /// Print text summary to stdout
    pub print_summary: bool,

    /// Profiler switches
    pub profiler: ProfilerConfig,

    /// Use the development stack tracker
    pub dev_mode: bool,
}

impl Default for ReplayArgs {
    fn default() -> Self {
        Self {
            script: PathBuf::from("replay.json"),
            output_json: PathBuf::from("profile.json"),
            output_svg: None,
            top_labels: DEFAULT_TOP_LABELS,
            flamegraph_config: None,
            print_summary: false,
            profiler: ProfilerConfig::default(),
            dev_mode: true,
        }
    }
}
