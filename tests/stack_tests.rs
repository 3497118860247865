use pretty_assertions::assert_eq;
use reconcile_trace::stack::{
    describe_stack, tracker, tracker_with, DefaultFrameFormatter, FrameFormatter, StackTracker,
    TypeNameResolver,
};
use reconcile_trace::tree::{NodeId, NodeKind, SourceLocation, WorkNode, WorkTree};

struct Tree {
    tree: WorkTree,
    root: NodeId,
    leaf: NodeId,
}

/// root -> Provider -> App -> Fragment -> Sidebar -> Text -> Link
fn build() -> Tree {
    let mut tree = WorkTree::new();
    let root = tree.insert(WorkNode::new(NodeKind::HostRoot));
    let provider = tree.insert(WorkNode::new(NodeKind::ContextProvider).with_parent(root));
    let app = tree.insert(WorkNode::new(NodeKind::ClassComponent).named("App").with_parent(provider));
    let fragment = tree.insert(WorkNode::new(NodeKind::Fragment).with_parent(app));
    let sidebar = tree.insert(
        WorkNode::new(NodeKind::FunctionComponent)
            .named("Sidebar")
            .with_parent(fragment)
            .with_owner(app)
            .with_source(SourceLocation::new("/src/layout/Sidebar.js", 8)),
    );
    let text = tree.insert(WorkNode::new(NodeKind::HostText).with_parent(sidebar));
    let leaf = tree.insert(
        WorkNode::new(NodeKind::ForwardRef)
            .named("Link")
            .with_parent(text)
            .with_owner(sidebar),
    );
    Tree { tree, root, leaf }
}

#[test]
fn test_no_current_node_gives_empty_trace() {
    let t = build();
    let tracker = tracker(true);
    assert_eq!(tracker.current_stack_trace(&t.tree), "");
    assert_eq!(tracker.current_owner_name(&t.tree), None);
}

#[test]
fn test_root_gives_empty_trace() {
    let t = build();
    let mut tracker = tracker(true);
    tracker.set_current(t.root);
    assert_eq!(tracker.current_stack_trace(&t.tree), "");
}

#[test]
fn test_three_meaningful_frames_outermost_last() {
    let t = build();
    let mut tracker = tracker(true);
    tracker.set_current(t.leaf);

    let trace = tracker.current_stack_trace(&t.tree);
    assert_eq!(
        trace,
        "\n    in Link (created by Sidebar)\n    in Sidebar (at Sidebar.js:8)\n    in App"
    );
    assert_eq!(tracker.current_owner_name(&t.tree), Some("Sidebar".to_string()));
}

#[test]
fn test_describe_stack_works_without_tracker() {
    let t = build();
    let trace = describe_stack(&t.tree, t.leaf, &TypeNameResolver, &DefaultFrameFormatter);
    assert_eq!(trace.lines().filter(|l| !l.is_empty()).count(), 3);
}

struct NamesOnly;

impl FrameFormatter for NamesOnly {
    fn format_frame(&self, name: Option<&str>, _: Option<&SourceLocation>, _: Option<&str>) -> String {
        format!("<{}>", name.unwrap_or("?"))
    }
}

#[test]
fn test_injected_helpers() {
    let t = build();
    let shout = |ty: Option<&str>| ty.map(str::to_uppercase);
    let mut tracker = tracker_with(true, shout, NamesOnly);
    tracker.set_current(t.leaf);
    assert_eq!(tracker.current_stack_trace(&t.tree), "<LINK><SIDEBAR><APP>");
    assert_eq!(tracker.current_owner_name(&t.tree), Some("SIDEBAR".to_string()));
}

#[test]
fn test_production_tracker_is_inert() {
    let t = build();
    let mut tracker = tracker(false);
    tracker.set_current(t.leaf);
    assert_eq!(tracker.current(), None);
    assert_eq!(tracker.current_stack_trace(&t.tree), "");
}

#[test]
fn test_dangling_current_node_is_safe() {
    let t = build();
    let mut tracker = tracker(true);
    tracker.set_current(NodeId::from_index(999));
    assert_eq!(tracker.current_stack_trace(&t.tree), "");
    assert_eq!(tracker.current_owner_name(&t.tree), None);
}
