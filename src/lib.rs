//! Reconcile Trace
//!
//! Observability for an incremental, interruptible tree-reconciliation
//! engine. A scheduler walks a tree of work nodes depth-first, may yield
//! mid-walk and resume later, and may abandon work on error. This crate
//! rides on top of that walk and provides:
//!
//! - a **stack tracker** that rebuilds a component-style stack trace from
//!   whatever node is currently being processed, and
//! - a **profiler** that emits user-timing marks and measures per work
//!   loop, node, lifecycle phase, commit and commit sub-phase, surviving
//!   pause/resume of the walk.
//!
//! The `reconcile-trace` binary replays a scripted sequence of scheduler
//! notifications through both, and writes a JSON profile plus an optional
//! flamegraph.
//!
//! ## Getting Started
//!
//! ```ignore
//! use reconcile_trace::timing::{Profiler, ProfilerConfig, RecordingBackend};
//! use reconcile_trace::tree::{NodeKind, WorkNode, WorkTree};
//!
//! let mut tree = WorkTree::new();
//! let root = tree.insert(WorkNode::new(NodeKind::HostRoot));
//! let app = tree.insert(WorkNode::new(NodeKind::ClassComponent).named("App").with_parent(root));
//!
//! let mut profiler = Profiler::new(ProfilerConfig::default(), Some(RecordingBackend::monotonic()));
//! profiler.start_work_loop(&tree, Some(root));
//! profiler.start_node_work(&mut tree, app);
//! profiler.stop_node_work(&mut tree, app);
//! profiler.stop_work_loop(&tree, None, true);
//! ```

pub mod aggregator;
pub mod commands;
pub mod flamegraph;
pub mod output;
pub mod parser;
pub mod stack;
pub mod timing;
pub mod tree;
pub mod utils;
