//! The work-node tree the instrumentation reads.
//!
//! Nodes live in an arena owned by the caller and refer to each other via
//! [`NodeId`] handles. `parent`, `owner` and `previous_version` are
//! non-owning links; a handle that no longer resolves ends a walk instead
//! of panicking.

pub mod arena;
pub mod node;

// Re-export main types
pub use arena::{Ancestors, NodeId, WorkTree};
pub use node::{NodeKind, SourceLocation, WorkNode};
