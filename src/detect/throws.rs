//! Exception messages of `throw` statements.

use super::{literal_or_text, Detector, Finding, NodeContext};
use crate::ast::{ExprKind, NodeId, NodeKind, StmtKind, SyntaxTree};
use crate::signature;

/// Extracts the message of a thrown exception.
///
/// `throw new X(a, b)` yields one finding per constructor argument.
/// `throw e` looks up the latest declaration of `e` before the statement in
/// the nearest enclosing block; when it is initialized with a construction
/// that has arguments, the declaration and its first argument are reported.
pub struct ThrowMessageDetector;

impl Detector for ThrowMessageDetector {
    fn name(&self) -> &'static str {
        "throw-message"
    }

    fn detect(&self, cx: &NodeContext<'_>, out: &mut Vec<Finding>) -> anyhow::Result<()> {
        let tree = cx.tree;
        let NodeKind::Statement(StmtKind::Throw { expr: Some(expr) }) = cx.kind() else {
            return Ok(());
        };
        let line = cx.line();

        match tree.kind(*expr) {
            NodeKind::Expression(ExprKind::ObjectCreation { args, .. }) => {
                let code = cx.text().trim();
                for arg in args {
                    out.push(Finding::new(line, code, literal_or_text(tree, *arg)));
                }
            }
            NodeKind::Expression(ExprKind::Name) => {
                let name = tree.node(*expr).name();
                let Some(var) = prior_declaration(tree, cx.node, name) else {
                    return Ok(());
                };
                let NodeKind::Variable {
                    initializer: Some(init),
                    ..
                } = tree.kind(var)
                else {
                    return Ok(());
                };
                if let NodeKind::Expression(ExprKind::ObjectCreation { args, .. }) = tree.kind(*init)
                {
                    if let Some(first) = args.first() {
                        out.push(Finding::new(
                            line,
                            signature::variable_declaration(tree, var),
                            literal_or_text(tree, *first),
                        ));
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Latest declarator of `name` that starts before `stmt`, searched within
/// the nearest block enclosing `stmt`.
fn prior_declaration(tree: &SyntaxTree, stmt: NodeId, name: &str) -> Option<NodeId> {
    let block = tree.find_ancestor(stmt, |k| k.is_block())?;
    let limit = tree.node(stmt).span?.start_byte;
    tree.descendants(block)
        .filter(|id| matches!(tree.kind(*id), NodeKind::Variable { .. }))
        .filter(|id| tree.node(*id).name() == name)
        .filter(|id| {
            tree.node(*id)
                .span
                .map(|s| s.start_byte < limit)
                .unwrap_or(false)
        })
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::testing::{parse, run_on};

    fn throws(k: &NodeKind) -> bool {
        matches!(k, NodeKind::Statement(StmtKind::Throw { .. }))
    }

    #[test]
    fn test_direct_construction() {
        let tree = parse(
            "class A {\n  void f(int code) {\n    throw new IllegalStateException(\"bad state\", code);\n  }\n}",
        );
        let found = run_on(&ThrowMessageDetector, &tree, throws);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].line, 3);
        assert_eq!(
            found[0].code,
            "throw new IllegalStateException(\"bad state\", code);"
        );
        assert_eq!(found[0].subject, "bad state");
        assert_eq!(found[1].subject, "code");
    }

    #[test]
    fn test_no_argument_construction_yields_nothing() {
        let tree = parse("class A {\n  void f() {\n    throw new RuntimeException();\n  }\n}");
        assert!(run_on(&ThrowMessageDetector, &tree, throws).is_empty());
    }

    #[test]
    fn test_thrown_variable_uses_latest_prior_declaration() {
        let tree = parse(
            "class A {\n  void f(boolean b) {\n    RuntimeException e = new RuntimeException(\"first\");\n    if (b) {\n      RuntimeException e2 = new RuntimeException(\"other\");\n    }\n    throw e;\n  }\n}",
        );
        let found = run_on(&ThrowMessageDetector, &tree, throws);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 7);
        assert_eq!(
            found[0].code,
            "RuntimeException e = new RuntimeException(\"first\")"
        );
        assert_eq!(found[0].subject, "first");
    }

    #[test]
    fn test_thrown_variable_without_usable_declaration() {
        let tree = parse(
            "class A {\n  void f(RuntimeException p) {\n    RuntimeException q = p;\n    throw q;\n  }\n  void g(RuntimeException p) {\n    throw p;\n  }\n}",
        );
        assert!(run_on(&ThrowMessageDetector, &tree, throws).is_empty());
    }
}
