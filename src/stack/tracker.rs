//! Current-node tracking.
//!
//! Two implementations sit behind [`StackTracker`]: [`DevStackTracker`]
//! keeps the pointer and builds traces, [`NoopStackTracker`] ignores every
//! call. Which one exists is decided once, by [`tracker`], so callers never
//! check a development flag themselves.

use super::describe::{
    describe_stack, DefaultFrameFormatter, FrameFormatter, NameResolver, TypeNameResolver,
};
use crate::tree::{NodeId, WorkTree};
use log::trace;
use serde::{Deserialize, Serialize};

/// Auxiliary label for what the current node is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackerPhase {
    Render,
    GetChildContext,
}

/// Notifications from the scheduler plus pulls from error reporting
///
/// Every method is safe to call at any time, including when no walk is
/// active.
pub trait StackTracker {
    /// Record `node` as current and clear the phase tag
    fn set_current(&mut self, node: NodeId);

    /// Forget the current node and phase
    fn reset_current(&mut self);

    fn set_phase(&mut self, phase: Option<TrackerPhase>);

    fn current(&self) -> Option<NodeId>;

    fn phase(&self) -> Option<TrackerPhase>;

    /// Display name of the current node's owner
    fn current_owner_name(&self, tree: &WorkTree) -> Option<String>;

    /// Stack trace from the current node, or empty when idle
    fn current_stack_trace(&self, tree: &WorkTree) -> String;
}

/// Build a tracker with the default name resolver and frame formatter
///
/// **Public** - main entry point
pub fn tracker(dev_mode: bool) -> Box<dyn StackTracker> {
    tracker_with(dev_mode, TypeNameResolver, DefaultFrameFormatter)
}

/// Build a tracker with injected helpers
pub fn tracker_with<R, F>(dev_mode: bool, resolver: R, formatter: F) -> Box<dyn StackTracker>
where
    R: NameResolver + 'static,
    F: FrameFormatter + 'static,
{
    if dev_mode {
        Box::new(DevStackTracker::new(resolver, formatter))
    } else {
        Box::new(NoopStackTracker)
    }
}

/// Development tracker
pub struct DevStackTracker {
    current: Option<NodeId>,
    phase: Option<TrackerPhase>,
    resolver: Box<dyn NameResolver>,
    formatter: Box<dyn FrameFormatter>,
}

impl DevStackTracker {
    pub fn new<R, F>(resolver: R, formatter: F) -> Self
    where
        R: NameResolver + 'static,
        F: FrameFormatter + 'static,
    {
        Self {
            current: None,
            phase: None,
            resolver: Box::new(resolver),
            formatter: Box::new(formatter),
        }
    }
}

impl Default for DevStackTracker {
    fn default() -> Self {
        Self::new(TypeNameResolver, DefaultFrameFormatter)
    }
}

impl StackTracker for DevStackTracker {
    fn set_current(&mut self, node: NodeId) {
        trace!("Current node set to #{}", node);
        self.current = Some(node);
        self.phase = None;
    }

    fn reset_current(&mut self) {
        self.current = None;
        self.phase = None;
    }

    fn set_phase(&mut self, phase: Option<TrackerPhase>) {
        self.phase = phase;
    }

    fn current(&self) -> Option<NodeId> {
        self.current
    }

    fn phase(&self) -> Option<TrackerPhase> {
        self.phase
    }

    fn current_owner_name(&self, tree: &WorkTree) -> Option<String> {
        let owner = tree.get(self.current?)?.owner?;
        let owner = tree.get(owner)?;
        self.resolver.display_name(owner.component_type.as_deref())
    }

    fn current_stack_trace(&self, tree: &WorkTree) -> String {
        match self.current {
            Some(node) => describe_stack(tree, node, self.resolver.as_ref(), self.formatter.as_ref()),
            None => String::new(),
        }
    }
}

/// Production tracker: does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStackTracker;

impl StackTracker for NoopStackTracker {
    fn set_current(&mut self, _node: NodeId) {}

    fn reset_current(&mut self) {}

    fn set_phase(&mut self, _phase: Option<TrackerPhase>) {}

    fn current(&self) -> Option<NodeId> {
        None
    }

    fn phase(&self) -> Option<TrackerPhase> {
        None
    }

    fn current_owner_name(&self, _tree: &WorkTree) -> Option<String> {
        None
    }

    fn current_stack_trace(&self, _tree: &WorkTree) -> String {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{NodeKind, SourceLocation, WorkNode};
    use pretty_assertions::assert_eq;

    fn sample_tree() -> (WorkTree, NodeId, NodeId, NodeId, NodeId) {
        let mut tree = WorkTree::new();
        let root = tree.insert(WorkNode::new(NodeKind::HostRoot));
        let app = tree.insert(WorkNode::new(NodeKind::ClassComponent).named("App").with_parent(root));
        let list = tree.insert(
            WorkNode::new(NodeKind::FunctionComponent)
                .named("List")
                .with_parent(app)
                .with_owner(app),
        );
        let item = tree.insert(
            WorkNode::new(NodeKind::FunctionComponent)
                .named("Item")
                .with_parent(list)
                .with_owner(list)
                .with_source(SourceLocation::new("src/List.js", 40)),
        );
        (tree, root, app, list, item)
    }

    #[test]
    fn test_idle_tracker_is_empty() {
        let (tree, ..) = sample_tree();
        let tracker = DevStackTracker::default();
        assert_eq!(tracker.current_stack_trace(&tree), "");
        assert_eq!(tracker.current_owner_name(&tree), None);
    }

    #[test]
    fn test_root_trace_is_empty() {
        let (tree, root, ..) = sample_tree();
        let mut tracker = DevStackTracker::default();
        tracker.set_current(root);
        assert_eq!(tracker.current_stack_trace(&tree), "");
    }

    #[test]
    fn test_three_deep_trace() {
        let (tree, _, _, _, item) = sample_tree();
        let mut tracker = DevStackTracker::default();
        tracker.set_current(item);

        let trace = tracker.current_stack_trace(&tree);
        assert_eq!(
            trace,
            "\n    in Item (at List.js:40)\n    in List (created by App)\n    in App"
        );
        assert_eq!(trace.matches("\n    in ").count(), 3);
        assert_eq!(tracker.current_owner_name(&tree), Some("List".to_string()));
    }

    #[test]
    fn test_set_current_clears_phase() {
        let (_, _, app, list, _) = sample_tree();
        let mut tracker = DevStackTracker::default();
        tracker.set_current(app);
        tracker.set_phase(Some(TrackerPhase::Render));
        assert_eq!(tracker.phase(), Some(TrackerPhase::Render));

        tracker.set_current(list);
        assert_eq!(tracker.phase(), None);

        tracker.reset_current();
        assert_eq!(tracker.current(), None);
    }

    #[test]
    fn test_noop_tracker_ignores_everything() {
        let (tree, _, _, _, item) = sample_tree();
        let mut tracker = tracker(false);
        tracker.set_current(item);
        tracker.set_phase(Some(TrackerPhase::GetChildContext));

        assert_eq!(tracker.current(), None);
        assert_eq!(tracker.phase(), None);
        assert_eq!(tracker.current_stack_trace(&tree), "");
        assert_eq!(tracker.current_owner_name(&tree), None);
    }
}
