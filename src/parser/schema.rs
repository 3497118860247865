//! Output JSON schema definitions for profile data.
//!
//! This module defines the structure of JSON files we write to disk.
//! Schema is versioned to allow future evolution.

use crate::timing::Measurement;
use crate::tree::NodeId;
use serde::{Deserialize, Serialize};

/// Top-level profile structure written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Schema version for compatibility checking
    pub version: String,

    /// Timestamp when profile was generated
    pub generated_at: String,

    /// Wall time covered by all measurements
    pub total_duration_us: u64,

    pub measurement_count: usize,

    /// Measurements that carry a warning annotation
    pub warning_count: usize,

    /// Every recorded measurement, in completion order
    pub measurements: Vec<Measurement>,

    /// Top labels (ranked by total duration)
    pub hot_labels: Vec<HotLabel>,

    /// Stack traces captured during the replay
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub captured_stacks: Vec<CapturedStack>,
}

/// Total time attributed to one measurement name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotLabel {
    /// Label without prefix or warning (e.g., "App [update]")
    pub label: String,

    /// Sum of durations
    pub total_us: u64,

    /// Number of measurements
    pub count: u64,

    /// Percentage of the profile's total duration
    pub percentage: f64,
}

/// A stack trace pulled from the tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedStack {
    /// Clock position when captured
    pub at_us: u64,

    pub node: Option<NodeId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    pub trace: String,
}
