//! Documentation comments of types and methods.

use super::{Detector, Finding, NodeContext};
use crate::ast::{Modifier, NodeId, NodeKind, SyntaxTree, TypeKind};
use crate::javadoc;
use crate::signature;

/// Marker emitted by [`MethodDocDetector`] for a method without any comment.
pub const NO_JAVADOC: &str = "<no javadoc>";

/// Javadoc description plus the declaration it documents.
///
/// Methods are only considered when public or protected. Interface methods
/// not declared `private` count as public even without a written modifier.
/// The snippet line is the line on which the
/// description starts, not the line that opens the comment.
pub struct JavadocDetector;

impl Detector for JavadocDetector {
    fn name(&self) -> &'static str {
        "javadoc"
    }

    fn detect(&self, cx: &NodeContext<'_>, out: &mut Vec<Finding>) -> anyhow::Result<()> {
        let tree = cx.tree;
        match cx.kind() {
            NodeKind::Type(_) => {}
            NodeKind::Method(_) if is_visible(tree, cx.node) => {}
            _ => return Ok(()),
        }
        let node = tree.node(cx.node);
        let Some(doc) = node.javadoc() else {
            return Ok(());
        };

        let description = javadoc::description(doc);
        if description.trim().is_empty() {
            return Ok(());
        }
        let line = javadoc::description_line(doc, &description) as i64;
        let code = format!(
            "{}\n{}",
            description,
            signature::declaration(tree, cx.node)
        );
        out.push(Finding::new(line, code, node.name()));
        Ok(())
    }
}

/// Public or protected, or declared in an interface without `private`.
fn is_visible(tree: &SyntaxTree, method: NodeId) -> bool {
    let node = tree.node(method);
    if node.has_modifier(Modifier::Public) || node.has_modifier(Modifier::Protected) {
        return true;
    }
    let in_interface = tree
        .parent(method)
        .and_then(|p| tree.kind(p).type_decl())
        .map(|t| t.kind == TypeKind::Interface)
        .unwrap_or(false);
    in_interface && !node.has_modifier(Modifier::Private)
}

/// A method's documentation as plain text, whatever its visibility.
///
/// Uses the javadoc description when there is one, otherwise the content of
/// any comment directly above the method, otherwise [`NO_JAVADOC`].
pub struct MethodDocDetector;

impl Detector for MethodDocDetector {
    fn name(&self) -> &'static str {
        "method-doc"
    }

    fn detect(&self, cx: &NodeContext<'_>, out: &mut Vec<Finding>) -> anyhow::Result<()> {
        if !cx.kind().is_method() {
            return Ok(());
        }
        let node = cx.tree.node(cx.node);
        let doc = match &node.comment {
            Some(comment) if comment.is_javadoc() => javadoc::description(comment),
            Some(comment) => comment.content().to_string(),
            None => NO_JAVADOC.to_string(),
        };
        out.push(Finding::new(cx.tree.name_line(cx.node), doc, node.name()));
        Ok(())
    }
}
