//! User-timing profiler for the tree walk.
//!
//! This module handles:
//! - The marker capability and an in-memory recording backend
//! - Mark name and label formatting
//! - Per-walk bookkeeping (`TimingState`)
//! - The `Profiler` hooks the scheduler calls

pub mod clock;
pub mod labels;
pub mod marker;
pub mod profiler;
pub mod state;

// Re-export main types
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use labels::{CommitSubphase, MeasurementPhase};
pub use marker::{MarkerBackend, MarkerEvent, Measurement, RecordingBackend};
pub use profiler::{Profiler, ProfilerConfig};
pub use state::TimingState;
