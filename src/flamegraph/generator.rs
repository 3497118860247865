//! SVG flamegraph generation backed by inferno.
//!
//! Frames are colored by inferno's palettes; the text summary colors rows
//! by scope (work loop, commit, lifecycle phase, node).

use crate::aggregator::stack_builder::CollapsedStack;
use crate::utils::error::FlamegraphError;
use inferno::flamegraph::color::{BasicPalette, Palette};
use inferno::flamegraph::{self, Options};
use log::info;

/// Palette choices exposed on the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FlamegraphPalette {
    #[default]
    Hot,
    Aqua,
    Blue,
    Purple,
}

impl FlamegraphPalette {
    fn to_inferno(self) -> Palette {
        match self {
            FlamegraphPalette::Hot => Palette::Basic(BasicPalette::Hot),
            FlamegraphPalette::Aqua => Palette::Basic(BasicPalette::Aqua),
            FlamegraphPalette::Blue => Palette::Basic(BasicPalette::Blue),
            FlamegraphPalette::Purple => Palette::Basic(BasicPalette::Purple),
        }
    }
}

/// Flamegraph configuration
#[derive(Debug, Clone)]
pub struct FlamegraphConfig {
    pub title: String,
    pub width: usize,
    pub palette: FlamegraphPalette,
}

impl Default for FlamegraphConfig {
    fn default() -> Self {
        Self {
            title: "Tree Reconciliation Profile".to_string(),
            width: 1200,
            palette: FlamegraphPalette::default(),
        }
    }
}

impl FlamegraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_palette(mut self, palette: FlamegraphPalette) -> Self {
        self.palette = palette;
        self
    }
}

/// Generate SVG flamegraph from collapsed stacks
///
/// **Public** - main entry point for flamegraph rendering
///
/// # Errors
/// * `FlamegraphError::EmptyStacks` - nothing to draw
/// * `FlamegraphError::RenderFailed` - inferno failed to render
/// * `FlamegraphError::InvalidUtf8` - rendered bytes were not UTF-8
pub fn generate_flamegraph(
    stacks: &[CollapsedStack],
    config: Option<&FlamegraphConfig>,
) -> Result<String, FlamegraphError> {
    let lines: Vec<String> = stacks
        .iter()
        .filter(|stack| stack.weight > 0)
        .map(CollapsedStack::to_line)
        .collect();
    if lines.is_empty() {
        return Err(FlamegraphError::EmptyStacks);
    }

    let config = config.cloned().unwrap_or_default();
    info!("Generating flamegraph with {} stacks", lines.len());

    let mut options = Options::default();
    options.title = config.title.clone();
    options.count_name = "us".to_string();
    options.image_width = Some(config.width);
    options.colors = config.palette.to_inferno();

    let mut svg = Vec::new();
    flamegraph::from_lines(&mut options, lines.iter().map(String::as_str), &mut svg)
        .map_err(|e| FlamegraphError::RenderFailed(e.to_string()))?;
    let svg = String::from_utf8(svg)?;

    info!("Flamegraph generated successfully ({} bytes)", svg.len());
    Ok(svg)
}

fn ansi_color(frame: &str) -> &'static str {
    if frame.starts_with("(Tree Reconciliation") {
        "\x1b[36m" // Cyan
    } else if frame.starts_with("(Committing") || frame.starts_with("(Calling") {
        "\x1b[34m" // Blue
    } else if frame.starts_with("(Waiting") {
        "\x1b[90m" // Gray
    } else if frame.contains('.') && !frame.ends_with(']') {
        "\x1b[35m" // Magenta: lifecycle phase
    } else {
        "\x1b[32m" // Green: node work
    }
}

/// Keep the tail of a long stack, respecting char boundaries
fn truncate_left(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_string();
    }
    let tail: String = text.chars().skip(count - (max_chars - 3)).collect();
    format!("...{}", tail)
}

/// Create a text summary with percentages and table formatting
pub fn generate_text_summary(stacks: &[CollapsedStack], max_lines: usize) -> String {
    let mut lines = Vec::new();
    let total: u64 = stacks.iter().map(|s| s.weight).sum::<u64>().max(1);

    lines.push("  HOT STACKS (self time)".to_string());
    lines.push(format!("  {:<52} {:>12} {:>7}", "Stack (Hottest First)", "US", "%"));
    lines.push(format!("  {}", "-".repeat(73)));

    for stack in stacks.iter().take(max_lines) {
        let percentage = (stack.weight as f64 / total as f64) * 100.0;
        let frame = stack.stack.rsplit(';').next().unwrap_or(&stack.stack);
        lines.push(format!(
            "  {}{:<52}\x1b[0m {:>12} {:>6.1}%",
            ansi_color(frame),
            truncate_left(&stack.stack, 52),
            stack.weight,
            percentage
        ));
    }

    if stacks.len() > max_lines {
        lines.push(String::new());
        lines.push(format!(
            "   (Showing top {} of {} unique stacks)",
            max_lines,
            stacks.len()
        ));
    }

    lines.join("\n")
}
