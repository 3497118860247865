//! Validate, schema and version command implementations.

use crate::output::read_profile;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::{Context, Result};
use std::path::Path;

/// Validate a profile JSON file
pub fn validate_profile_file(file_path: &Path) -> Result<()> {
    println!("Validating profile: {}", file_path.display());

    let profile = read_profile(file_path)
        .with_context(|| format!("Failed to read profile {}", file_path.display()))?;

    if profile.measurement_count != profile.measurements.len() {
        anyhow::bail!(
            "measurement_count is {} but {} measurements are present",
            profile.measurement_count,
            profile.measurements.len()
        );
    }

    println!("✓ Valid profile JSON");
    println!("  Version: {}", profile.version);
    println!("  Generated: {}", profile.generated_at);
    println!("  Total Duration: {} us", profile.total_duration_us);
    println!("  Measurements: {}", profile.measurement_count);
    println!("  Warnings: {}", profile.warning_count);
    println!("  Hot Labels: {}", profile.hot_labels.len());

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Reconcile Trace Profile Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string            - Schema version (e.g., '1.0.0')");
        println!("  generated_at: string       - RFC 3339 timestamp");
        println!("  total_duration_us: number  - Wall time covered by measurements");
        println!("  measurement_count: number  - Number of measurements");
        println!("  warning_count: number      - Measurements with a warning");
        println!("  measurements: array        - Recorded intervals");
        println!("    label: string            - Prefixed label, with optional warning");
        println!("    start_us: number         - Start position");
        println!("    duration_us: number      - Elapsed time");
        println!("  hot_labels: array          - Labels ranked by total duration");
        println!("    label: string            - Label without prefix or warning");
        println!("    total_us: number         - Summed duration");
        println!("    count: number            - Number of measurements");
        println!("    percentage: number       - Share of total duration");
        println!("  captured_stacks: array?    - Stack traces captured during replay");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Reconcile Trace v{}", env!("CARGO_PKG_VERSION"));
    println!("Profile Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Stack traces and user-timing profiles for interruptible tree reconciliation.");
}
