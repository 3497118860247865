//! Stack tracking for error attribution.
//!
//! The scheduler reports which node it is working on; error formatting code
//! later pulls a component-style stack trace or the current owner's name.
//! In non-development configurations the no-op tracker is used, so every
//! call returns empty/none without touching any state.

pub mod describe;
pub mod tracker;

// Re-export main types and functions
pub use describe::{
    describe_node, describe_stack, DefaultFrameFormatter, FrameFormatter, NameResolver,
    TypeNameResolver,
};
pub use tracker::{tracker, tracker_with, DevStackTracker, NoopStackTracker, StackTracker, TrackerPhase};
