//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod models;
pub mod replay;
pub mod utils;

// Re-export main command functions
pub use models::ReplayArgs;
pub use replay::{execute_replay, run_script, to_profile, validate_args, ReplayOutcome, ReplaySession};
pub use utils::{display_schema, display_version, validate_profile_file};
