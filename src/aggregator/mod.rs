//! Aggregation of recorded measurements into collapsed stacks and metrics.
//!
//! This module transforms the profiler's timeline into:
//! - Collapsed stack format (for flamegraph generation)
//! - Hot label analysis (where the walk spent its time)
//! - Warning counts

pub mod metrics;
pub mod stack_builder;

// Re-export main types and functions
pub use metrics::{calculate_hot_labels, count_warnings, total_span_us};
pub use stack_builder::{build_collapsed_stacks, CollapsedStack};
