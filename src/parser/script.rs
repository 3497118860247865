//! Parser for replay scripts.
//!
//! A replay script describes a work tree and the ordered notifications a
//! scheduler would send while walking it. Clock time only moves on
//! `advance` events, so replays are deterministic.
//!
//! ```json
//! {
//!   "nodes": [
//!     { "kind": "HostRoot" },
//!     { "kind": "ClassComponent", "name": "App", "parent": 0 }
//!   ],
//!   "events": [
//!     { "op": "start_work_loop", "next": 0 },
//!     { "op": "start_node_work", "node": 1 },
//!     { "op": "advance", "micros": 120 },
//!     { "op": "stop_node_work", "node": 1 },
//!     { "op": "stop_work_loop", "completed_root": true }
//!   ]
//! }
//! ```

use crate::stack::TrackerPhase;
use crate::timing::{CommitSubphase, MeasurementPhase};
use crate::tree::{NodeId, NodeKind, SourceLocation, WorkNode, WorkTree};
use crate::utils::error::ParseError;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// A complete replay script
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,

    #[serde(default)]
    pub events: Vec<ReplayEvent>,
}

/// One work node; links are indices into `nodes`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub kind: NodeKind,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub parent: Option<NodeId>,

    #[serde(default)]
    pub owner: Option<NodeId>,

    #[serde(default)]
    pub previous_version: Option<NodeId>,

    #[serde(default)]
    pub source: Option<SourceLocation>,
}

/// One scheduler notification (or clock/tracker step)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ReplayEvent {
    Advance {
        micros: u64,
    },
    StartWorkLoop {
        #[serde(default)]
        next: Option<NodeId>,
    },
    StopWorkLoop {
        #[serde(default)]
        interrupted_by: Option<NodeId>,
        #[serde(default)]
        completed_root: bool,
    },
    StartNodeWork {
        node: NodeId,
    },
    CancelNodeWork {
        node: NodeId,
    },
    StopNodeWork {
        node: NodeId,
    },
    StopFailedNodeWork {
        node: NodeId,
    },
    StartPhase {
        node: NodeId,
        phase: MeasurementPhase,
    },
    StopPhase,
    StartCommit,
    StopCommit,
    StartCommitSubphase {
        subphase: CommitSubphase,
    },
    StopCommitSubphase {
        subphase: CommitSubphase,
    },
    RecordEffect,
    RecordScheduleUpdate,
    StartCallbackWait,
    StopCallbackWait {
        #[serde(default)]
        did_expire: bool,
        timeout_ms: u64,
    },
    SetCurrent {
        node: NodeId,
    },
    ResetCurrent,
    SetPhase {
        #[serde(default)]
        phase: Option<TrackerPhase>,
    },
    CaptureStack,
    /// Scheduler went idle: drop profiler bookkeeping
    Idle,
}

impl ReplayEvent {
    /// Node handles this event refers to
    fn referenced_nodes(&self) -> Vec<NodeId> {
        match self {
            ReplayEvent::StartWorkLoop { next } => next.iter().copied().collect(),
            ReplayEvent::StopWorkLoop { interrupted_by, .. } => interrupted_by.iter().copied().collect(),
            ReplayEvent::StartNodeWork { node }
            | ReplayEvent::CancelNodeWork { node }
            | ReplayEvent::StopNodeWork { node }
            | ReplayEvent::StopFailedNodeWork { node }
            | ReplayEvent::StartPhase { node, .. }
            | ReplayEvent::SetCurrent { node } => vec![*node],
            _ => Vec::new(),
        }
    }
}

impl ReplayScript {
    /// Check that every node reference resolves
    ///
    /// **Public** - called by `parse_script`
    pub fn validate(&self) -> Result<(), ParseError> {
        let count = self.nodes.len();
        let check = |what: &str, id: NodeId| {
            if id.index() < count {
                Ok(())
            } else {
                Err(ParseError::InvalidScript(format!(
                    "{} refers to node {} but only {} nodes are defined",
                    what, id, count
                )))
            }
        };

        for (index, entry) in self.nodes.iter().enumerate() {
            let links = [
                ("parent", entry.parent),
                ("owner", entry.owner),
                ("previous_version", entry.previous_version),
            ];
            for (field, link) in links {
                if let Some(id) = link {
                    check(&format!("node {} {}", index, field), id)?;
                    if field == "parent" && id.index() == index {
                        return Err(ParseError::InvalidScript(format!(
                            "node {} is its own parent",
                            index
                        )));
                    }
                }
            }
        }

        for (index, event) in self.events.iter().enumerate() {
            for id in event.referenced_nodes() {
                check(&format!("event {}", index), id)?;
            }
        }

        Ok(())
    }

    /// Materialize the node list into an arena
    pub fn build_tree(&self) -> WorkTree {
        let mut tree = WorkTree::new();
        for entry in &self.nodes {
            tree.insert(WorkNode {
                component_type: entry.name.clone(),
                parent: entry.parent,
                previous_version: entry.previous_version,
                owner: entry.owner,
                source_location: entry.source.clone(),
                ..WorkNode::new(entry.kind)
            });
        }
        debug!("Built work tree with {} nodes", tree.len());
        tree
    }
}

/// Parse and validate a replay script
///
/// **Public** - main entry point for script parsing
///
/// # Errors
/// * `ParseError::JsonError` - malformed JSON or unknown event/kind
/// * `ParseError::InvalidScript` - a node reference is out of range
pub fn parse_script(json: &str) -> Result<ReplayScript, ParseError> {
    let script: ReplayScript = serde_json::from_str(json)?;
    script.validate()?;
    info!(
        "Parsed replay script: {} nodes, {} events",
        script.nodes.len(),
        script.events.len()
    );
    Ok(script)
}
