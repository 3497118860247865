//! Replay-script parsing and schema definitions.
//!
//! This module handles:
//! - Parsing a JSON replay script of scheduler notifications
//! - Validating node references in the script
//! - Defining output schema

pub mod schema;
pub mod script;

// Re-export main types
pub use schema::{CapturedStack, HotLabel, Profile};
pub use script::{parse_script, NodeSpec, ReplayEvent, ReplayScript};
