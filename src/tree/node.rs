//! Work node definition.

use super::arena::NodeId;
use serde::{Deserialize, Serialize};

/// Kind of a work node
///
/// Structural kinds have no user-visible representation: they are skipped
/// by stack traces and node-level timers but still traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    HostRoot,
    HostPortal,
    HostComponent,
    HostText,
    Fragment,
    Mode,
    ContextProvider,
    ContextConsumer,
    ClassComponent,
    FunctionComponent,
    ForwardRef,
    MemoComponent,
    SuspenseComponent,
    DehydratedSuspenseComponent,
}

impl NodeKind {
    /// Root, portal, text, fragment and context boundaries
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            NodeKind::HostRoot
                | NodeKind::HostPortal
                | NodeKind::HostText
                | NodeKind::Fragment
                | NodeKind::ContextProvider
                | NodeKind::ContextConsumer
        )
    }

    /// Host elements and mode boundaries; hidden from timers only on request
    pub fn is_host_detail(self) -> bool {
        matches!(self, NodeKind::HostComponent | NodeKind::Mode)
    }

    pub fn is_suspense(self) -> bool {
        matches!(
            self,
            NodeKind::SuspenseComponent | NodeKind::DehydratedSuspenseComponent
        )
    }
}

/// Where a node was declared (development builds only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file_name: String,
    pub line_number: u32,
}

impl SourceLocation {
    pub fn new(file_name: impl Into<String>, line_number: u32) -> Self {
        Self {
            file_name: file_name.into(),
            line_number,
        }
    }
}

/// A single node of the work tree
///
/// Everything except `is_currently_timed` is owned by whoever builds the
/// tree. The timing flag belongs to the profiler.
#[derive(Debug, Clone)]
pub struct WorkNode {
    /// Node category
    pub kind: NodeKind,

    /// Opaque component type, resolved to a display name externally
    pub component_type: Option<String>,

    /// Enclosing node; `None` for the root
    pub parent: Option<NodeId>,

    /// Matching node in the previous tree, if this is an update
    pub previous_version: Option<NodeId>,

    /// Node that logically created this one
    pub owner: Option<NodeId>,

    /// Declaration site
    pub source_location: Option<SourceLocation>,

    pub(crate) is_currently_timed: bool,
}

impl WorkNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            component_type: None,
            parent: None,
            previous_version: None,
            owner: None,
            source_location: None,
            is_currently_timed: false,
        }
    }

    pub fn named(mut self, component_type: impl Into<String>) -> Self {
        self.component_type = Some(component_type.into());
        self
    }

    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_owner(mut self, owner: NodeId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_previous_version(mut self, previous: NodeId) -> Self {
        self.previous_version = Some(previous);
        self
    }

    pub fn with_source(mut self, source: SourceLocation) -> Self {
        self.source_location = Some(source);
        self
    }

    /// True while the profiler owes this node an open measurement
    pub fn is_currently_timed(&self) -> bool {
        self.is_currently_timed
    }

    /// Updates re-use a node from the previous tree; mounts do not
    pub fn is_update(&self) -> bool {
        self.previous_version.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_kinds() {
        assert!(NodeKind::HostRoot.is_structural());
        assert!(NodeKind::ContextConsumer.is_structural());
        assert!(!NodeKind::ClassComponent.is_structural());
        assert!(!NodeKind::HostComponent.is_structural());
        assert!(NodeKind::HostComponent.is_host_detail());
    }

    #[test]
    fn test_builder_sets_links() {
        let node = WorkNode::new(NodeKind::FunctionComponent)
            .named("Button")
            .with_parent(NodeId::from_index(0))
            .with_previous_version(NodeId::from_index(7));

        assert_eq!(node.component_type.as_deref(), Some("Button"));
        assert_eq!(node.parent, Some(NodeId::from_index(0)));
        assert!(node.is_update());
        assert!(!node.is_currently_timed());
    }
}
