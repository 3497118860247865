//! Arena storage for work nodes.

use super::node::WorkNode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle to a node in a [`WorkTree`]
///
/// The index doubles as the node's debug id in measurement names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Arena of work nodes
///
/// **Public** - the tree builder owns node lifetime; the instrumentation only
/// reads links and flips the per-node timing flag.
#[derive(Debug, Clone, Default)]
pub struct WorkTree {
    nodes: Vec<WorkNode>,
}

impl WorkTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its handle
    pub fn insert(&mut self, node: WorkNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&WorkNode> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut WorkNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Parent of `id`, if both resolve
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    /// Iterate `id` and then each of its ancestors up to the root
    ///
    /// Stops at the first handle that does not resolve. The walk is capped
    /// at the arena size, so a corrupted parent cycle cannot spin forever.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.get(id).map(|_| id),
            remaining: self.nodes.len(),
        }
    }

    /// Ids of nodes that currently owe an open measurement
    pub fn timed_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_currently_timed)
            .map(|(index, _)| NodeId(index))
            .collect()
    }

    /// Forget every owed measurement
    pub fn clear_timed_flags(&mut self) {
        for node in &mut self.nodes {
            node.is_currently_timed = false;
        }
    }
}

/// Iterator over a node and its ancestors, innermost first
pub struct Ancestors<'a> {
    tree: &'a WorkTree,
    next: Option<NodeId>,
    remaining: usize,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next?;
        self.remaining -= 1;
        self.next = self
            .tree
            .parent_of(current)
            .filter(|parent| self.tree.get(*parent).is_some());
        Some(current)
    }
}
