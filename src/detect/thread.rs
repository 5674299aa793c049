//! Thread names.

use super::{Detector, Finding, NodeContext};
use crate::ast::{simple_type_name, ExprKind, NodeId, NodeKind, StmtKind, SyntaxTree};
use crate::signature;

/// Names given to threads, either as a constructor argument of a thread
/// type or through a single-argument setter call.
///
/// The code of each finding is the owning statement of the expression: the
/// enclosing expression, return or declaration statement; failing that, the
/// declarator or assignment it initializes; failing that, the expression.
pub struct ThreadNameDetector {
    thread_types: Vec<String>,
    setter: String,
}

impl ThreadNameDetector {
    pub fn new(thread_types: Vec<String>, setter: impl Into<String>) -> Self {
        Self {
            thread_types,
            setter: setter.into(),
        }
    }
}

impl Default for ThreadNameDetector {
    fn default() -> Self {
        Self::new(vec!["Thread".to_string()], "setName")
    }
}

impl Detector for ThreadNameDetector {
    fn name(&self) -> &'static str {
        "thread-name"
    }

    fn detect(&self, cx: &NodeContext<'_>, out: &mut Vec<Finding>) -> anyhow::Result<()> {
        let tree = cx.tree;
        match cx.kind().expr() {
            Some(ExprKind::ObjectCreation { ty, args }) => {
                if !self.thread_types.iter().any(|t| t == simple_type_name(ty)) {
                    return Ok(());
                }
                let names = args.iter().filter(|a| {
                    matches!(
                        tree.kind(**a),
                        NodeKind::Expression(
                            ExprKind::StringLiteral { .. }
                                | ExprKind::Binary { .. }
                                | ExprKind::MethodCall { .. }
                        )
                    )
                });
                for arg in names {
                    out.push(Finding::new(
                        cx.line(),
                        owner_text(tree, cx.node),
                        resolve_name(tree, *arg),
                    ));
                }
            }
            Some(ExprKind::MethodCall { args, .. }) => {
                if tree.node(cx.node).name() == self.setter && args.len() == 1 {
                    out.push(Finding::new(
                        cx.line(),
                        owner_text(tree, cx.node),
                        resolve_name(tree, args[0]),
                    ));
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Best static rendering of a thread name expression. Literals give their
/// value, `+` concatenates both sides, names give the identifier, calls and
/// anything else give their source text.
pub fn resolve_name(tree: &SyntaxTree, expr: NodeId) -> String {
    match tree.kind(expr) {
        NodeKind::Expression(ExprKind::StringLiteral { value }) => value.clone(),
        NodeKind::Expression(ExprKind::Binary {
            op, left, right, ..
        }) if op == "+" => {
            format!("{}{}", resolve_name(tree, *left), resolve_name(tree, *right))
        }
        NodeKind::Expression(ExprKind::Name) => tree.node(expr).name().to_string(),
        NodeKind::Expression(ExprKind::Parenthesized { inner: Some(inner) }) => {
            resolve_name(tree, *inner)
        }
        _ => tree.text(expr).trim().to_string(),
    }
}

fn owner_text(tree: &SyntaxTree, expr: NodeId) -> String {
    let whole_statement = tree.find_ancestor(expr, |k| {
        matches!(
            k,
            NodeKind::Statement(StmtKind::Expression | StmtKind::Return { .. } | StmtKind::LocalVariable)
        )
    });
    if let Some(stmt) = whole_statement {
        return tree.text(stmt).trim().to_string();
    }

    for ancestor in tree.ancestors(expr) {
        match tree.kind(ancestor) {
            NodeKind::Variable { .. } => return signature::variable_declaration(tree, ancestor),
            NodeKind::Expression(ExprKind::Assignment { .. }) => {
                return tree.text(ancestor).trim().to_string()
            }
            NodeKind::Statement(_) => return tree.text(ancestor).trim().to_string(),
            _ => {}
        }
    }
    tree.text(expr).trim().to_string()
}
