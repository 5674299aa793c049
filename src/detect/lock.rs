//! Lock usage.

use super::{Detector, Finding, NodeContext};
use crate::ast::{simple_type_name, ExprKind, Modifier, NodeId, NodeKind, StmtKind, SyntaxTree};
use crate::signature;

/// Subject used when a lock is not inside a method or constructor.
pub const UNKNOWN_CALLABLE: &str = "<unknown>";

/// Finds the three lock shapes: `synchronized` methods, `synchronized`
/// blocks locking on a class literal, and construction of a configured lock
/// type. The code is the guarded body; the subject is the signature of the
/// method or constructor involved.
pub struct LockDetector {
    lock_types: Vec<String>,
}

impl LockDetector {
    pub fn new(lock_types: Vec<String>) -> Self {
        Self { lock_types }
    }
}

impl Default for LockDetector {
    fn default() -> Self {
        Self::new(vec!["ReentrantLock".to_string()])
    }
}

fn callable_subject(tree: &SyntaxTree, id: NodeId) -> String {
    tree.enclosing_callable(id)
        .map(|c| signature::callable_signature(tree, c))
        .unwrap_or_else(|| UNKNOWN_CALLABLE.to_string())
}

/// Body of the enclosing callable; for a field initializer the field itself.
fn guarded_code(tree: &SyntaxTree, id: NodeId) -> String {
    for ancestor in tree.ancestors(id) {
        match tree.kind(ancestor) {
            NodeKind::Method(m) | NodeKind::Constructor(m) => {
                if let Some(body) = m.body {
                    return tree.text(body).to_string();
                }
                break;
            }
            NodeKind::Field { .. } => return tree.text(ancestor).trim().to_string(),
            NodeKind::Type(_) => break,
            _ => {}
        }
    }
    tree.text(id).trim().to_string()
}

impl Detector for LockDetector {
    fn name(&self) -> &'static str {
        "lock"
    }

    fn detect(&self, cx: &NodeContext<'_>, out: &mut Vec<Finding>) -> anyhow::Result<()> {
        let tree = cx.tree;
        match cx.kind() {
            NodeKind::Method(method) => {
                if !tree.node(cx.node).has_modifier(Modifier::Synchronized) {
                    return Ok(());
                }
                let Some(body) = method.body else {
                    return Ok(());
                };
                out.push(Finding::new(
                    cx.line(),
                    tree.text(body),
                    signature::callable_signature(tree, cx.node),
                ));
            }
            NodeKind::Statement(StmtKind::Synchronized {
                lock: Some(lock), ..
            }) => {
                if matches!(
                    tree.kind(*lock),
                    NodeKind::Expression(ExprKind::ClassLiteral { .. })
                ) {
                    out.push(Finding::new(
                        cx.line(),
                        cx.text().trim(),
                        callable_subject(tree, cx.node),
                    ));
                }
            }
            NodeKind::Expression(ExprKind::ObjectCreation { ty, .. }) => {
                if self.lock_types.iter().any(|t| t == simple_type_name(ty)) {
                    out.push(Finding::new(
                        cx.line(),
                        guarded_code(tree, cx.node),
                        callable_subject(tree, cx.node),
                    ));
                }
            }
            _ => {}
        }
        Ok(())
    }
}
