//! Loops in methods and linear scans inside them.

use super::{Detector, Finding, NodeContext};
use crate::ast::{simple_type_name, ExprKind, NodeId, NodeKind, SyntaxTree};
use crate::signature;

/// Nearest loop around `id` without leaving its callable.
fn enclosing_loop(tree: &SyntaxTree, id: NodeId) -> Option<NodeId> {
    for ancestor in tree.ancestors(id) {
        let kind = tree.kind(ancestor);
        if kind.is_loop() {
            return Some(ancestor);
        }
        if kind.is_callable() || kind.is_type() {
            return None;
        }
    }
    None
}

/// Nodes in the body of `method` that belong to it rather than to a nested
/// class declared inside.
fn own_nodes(tree: &SyntaxTree, method: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    tree.descendants(method)
        .filter(move |id| tree.enclosing_callable(*id) == Some(method))
}

/// `contains` calls inside loops on a local declared with a list type.
///
/// The receiver must be a simple name declared in the same method with one
/// of the configured linear-scan types. Each call is reported once, with its
/// innermost loop as code.
pub struct LoopContainsDetector {
    linear_scan_types: Vec<String>,
}

impl LoopContainsDetector {
    pub fn new(linear_scan_types: Vec<String>) -> Self {
        Self { linear_scan_types }
    }

    fn is_linear_scan_local(&self, tree: &SyntaxTree, method: NodeId, name: &str) -> bool {
        tree.descendants(method).any(|id| match tree.kind(id) {
            NodeKind::Variable { ty, .. } => {
                tree.node(id).name() == name
                    && self
                        .linear_scan_types
                        .iter()
                        .any(|t| t == simple_type_name(ty))
            }
            _ => false,
        })
    }
}

impl Detector for LoopContainsDetector {
    fn name(&self) -> &'static str {
        "loop-contains"
    }

    fn detect(&self, cx: &NodeContext<'_>, out: &mut Vec<Finding>) -> anyhow::Result<()> {
        let tree = cx.tree;
        if !cx.kind().is_method() {
            return Ok(());
        }

        for call in own_nodes(tree, cx.node) {
            let Some(ExprKind::MethodCall {
                receiver: Some(receiver),
                ..
            }) = tree.kind(call).expr()
            else {
                continue;
            };
            if tree.node(call).name() != "contains" {
                continue;
            }
            if !matches!(tree.kind(*receiver), NodeKind::Expression(ExprKind::Name)) {
                continue;
            }
            let Some(loop_stmt) = enclosing_loop(tree, call) else {
                continue;
            };
            if !self.is_linear_scan_local(tree, cx.node, tree.node(*receiver).name()) {
                continue;
            }
            out.push(Finding::new(
                tree.line(call),
                tree.text(loop_stmt).trim(),
                tree.text(call).trim(),
            ));
        }
        Ok(())
    }
}

/// Every loop statement of a method, with the method signature as subject.
pub struct LoopBodyDetector;

impl Detector for LoopBodyDetector {
    fn name(&self) -> &'static str {
        "loop-body"
    }

    fn detect(&self, cx: &NodeContext<'_>, out: &mut Vec<Finding>) -> anyhow::Result<()> {
        let tree = cx.tree;
        if !cx.kind().is_method() {
            return Ok(());
        }
        let signature = signature::callable_signature(tree, cx.node);
        for stmt in own_nodes(tree, cx.node).filter(|id| tree.kind(*id).is_loop()) {
            out.push(Finding::new(
                tree.line(stmt),
                tree.text(stmt).trim(),
                signature.as_str(),
            ));
        }
        Ok(())
    }
}
