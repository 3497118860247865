//! Frame formatting and stack description.

use crate::tree::{NodeId, SourceLocation, WorkNode, WorkTree};

/// Resolves an opaque component type to a display name
pub trait NameResolver {
    fn display_name(&self, component_type: Option<&str>) -> Option<String>;
}

impl<F> NameResolver for F
where
    F: Fn(Option<&str>) -> Option<String>,
{
    fn display_name(&self, component_type: Option<&str>) -> Option<String> {
        self(component_type)
    }
}

/// Uses the component type string itself as the display name
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeNameResolver;

impl NameResolver for TypeNameResolver {
    fn display_name(&self, component_type: Option<&str>) -> Option<String> {
        component_type.map(str::to_string)
    }
}

/// Formats one stack frame
pub trait FrameFormatter {
    fn format_frame(
        &self,
        name: Option<&str>,
        source: Option<&SourceLocation>,
        owner_name: Option<&str>,
    ) -> String;
}

/// `"\n    in Name (at file.js:12)"` or `"\n    in Name (created by Owner)"`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFrameFormatter;

impl FrameFormatter for DefaultFrameFormatter {
    fn format_frame(
        &self,
        name: Option<&str>,
        source: Option<&SourceLocation>,
        owner_name: Option<&str>,
    ) -> String {
        let mut frame = format!("\n    in {}", name.unwrap_or("Unknown"));
        if let Some(source) = source {
            frame.push_str(&format!(
                " (at {}:{})",
                short_file_name(&source.file_name),
                source.line_number
            ));
        } else if let Some(owner) = owner_name {
            frame.push_str(&format!(" (created by {})", owner));
        }
        frame
    }
}

/// Strip directories; keep the enclosing folder for `index.*` files
fn short_file_name(path: &str) -> String {
    let mut parts = path.rsplitn(2, ['/', '\\']);
    let file = parts.next().unwrap_or(path);
    let Some(dir) = parts.next() else {
        return file.to_string();
    };
    if file.starts_with("index.") {
        let folder = dir.rsplit(['/', '\\']).next().unwrap_or(dir);
        if !folder.is_empty() {
            return format!("{}/{}", folder, file);
        }
    }
    file.to_string()
}

/// Describe one node; structural kinds produce an empty frame
///
/// **Public** - used by the stack tracker and by error reporting directly
pub fn describe_node(
    tree: &WorkTree,
    node: &WorkNode,
    resolver: &dyn NameResolver,
    formatter: &dyn FrameFormatter,
) -> String {
    if node.kind.is_structural() {
        return String::new();
    }
    let name = resolver.display_name(node.component_type.as_deref());
    let owner_name = node
        .owner
        .and_then(|owner| tree.get(owner))
        .and_then(|owner| resolver.display_name(owner.component_type.as_deref()));
    formatter.format_frame(
        name.as_deref(),
        node.source_location.as_ref(),
        owner_name.as_deref(),
    )
}

/// Build a stack trace from `start` up to the root
///
/// **Public** - available regardless of development mode
///
/// One frame per meaningful node, innermost first and outermost last.
/// Structural nodes are walked through but print nothing.
pub fn describe_stack(
    tree: &WorkTree,
    start: NodeId,
    resolver: &dyn NameResolver,
    formatter: &dyn FrameFormatter,
) -> String {
    tree.ancestors(start)
        .filter_map(|id| tree.get(id))
        .map(|node| describe_node(tree, node, resolver, formatter))
        .collect()
}
