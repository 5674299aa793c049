//! Overlong statements and badly broken call arguments.

use super::{Detector, Finding, NodeContext};
use crate::ast::{ExprKind, NodeId, NodeKind, SyntaxTree};
use crate::rules::{Continuation, LongStatementSettings};
use crate::signature;

/// Two checks on variable declarators and method calls inside a method or
/// constructor:
///
/// 1. single-line text longer than `max_length`;
/// 2. a call argument that is a binary expression spanning several lines,
///    with its left operand ending before the expression does.
///
/// Both report the enclosing callable's signature as subject.
pub struct LongStatementDetector {
    max_length: usize,
    continuation: Continuation,
    outermost_only: bool,
}

impl LongStatementDetector {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            continuation: Continuation::default(),
            outermost_only: true,
        }
    }

    pub fn from_settings(settings: &LongStatementSettings) -> Self {
        Self {
            max_length: settings.max_length(),
            continuation: settings.continuation(),
            outermost_only: settings.outermost_only(),
        }
    }

    pub fn continuation(mut self, continuation: Continuation) -> Self {
        self.continuation = continuation;
        self
    }

    pub fn outermost_only(mut self, outermost_only: bool) -> Self {
        self.outermost_only = outermost_only;
        self
    }

    fn is_too_long(&self, tree: &SyntaxTree, id: NodeId) -> bool {
        let single_line = tree
            .node(id)
            .span
            .map(|s| s.is_single_line())
            .unwrap_or(false);
        single_line && tree.text(id).chars().count() > self.max_length
    }

    /// Whether a declarator or call around `id`, within the same statement,
    /// is itself too long.
    fn has_long_ancestor(&self, tree: &SyntaxTree, id: NodeId) -> bool {
        for ancestor in tree.ancestors(id) {
            let kind = tree.kind(ancestor);
            if kind.is_statement() || kind.is_block() || kind.is_callable() || kind.is_type() {
                return false;
            }
            if is_candidate(kind) && self.is_too_long(tree, ancestor) {
                return true;
            }
        }
        false
    }

    fn check_length(&self, cx: &NodeContext<'_>, signature: &str, out: &mut Vec<Finding>) {
        if !self.is_too_long(cx.tree, cx.node) {
            return;
        }
        if self.outermost_only && self.has_long_ancestor(cx.tree, cx.node) {
            return;
        }
        out.push(Finding::new(cx.line(), cx.text().trim(), signature));
    }

    fn check_arguments(&self, cx: &NodeContext<'_>, signature: &str, out: &mut Vec<Finding>) {
        let tree = cx.tree;
        let Some(ExprKind::MethodCall { args, .. }) = cx.kind().expr() else {
            return;
        };
        for arg in args {
            let Some(ExprKind::Binary { left, op_line, .. }) = tree.kind(*arg).expr() else {
                continue;
            };
            let (Some(arg_span), Some(left_span)) = (tree.node(*arg).span, tree.node(*left).span)
            else {
                continue;
            };
            if arg_span.is_single_line() || left_span.end_line >= arg_span.end_line {
                continue;
            }
            let flagged = match self.continuation {
                Continuation::AnyBreak => true,
                Continuation::TrailingOperator => *op_line == Some(left_span.end_line),
            };
            if flagged {
                out.push(Finding::new(
                    left_span.end_line as i64,
                    cx.text().trim(),
                    signature,
                ));
            }
        }
    }
}

impl Default for LongStatementDetector {
    fn default() -> Self {
        Self::new(80)
    }
}

fn is_candidate(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Variable { .. } | NodeKind::Expression(ExprKind::MethodCall { .. })
    )
}

impl Detector for LongStatementDetector {
    fn name(&self) -> &'static str {
        "long-statement"
    }

    fn detect(&self, cx: &NodeContext<'_>, out: &mut Vec<Finding>) -> anyhow::Result<()> {
        if !is_candidate(cx.kind()) {
            return Ok(());
        }
        let Some(callable) = cx.tree.enclosing_callable(cx.node) else {
            return Ok(());
        };
        let signature = signature::callable_signature(cx.tree, callable);

        self.check_length(cx, &signature, out);
        self.check_arguments(cx, &signature, out);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::testing::{parse, run_on};

    const SOURCE: &str = r#"class Report {
    private String header = "a field initializer that is long enough to pass the eighty char limit";

    public void render(StringBuilder out) {
        int total = 1;
        String line = repository.findAllByOwnerAndStatus(owner, status).stream().map(Item::name).toList().toString();
        out.append(prefix +
            suffix);
        out.append(prefix
            + suffix);
        out.append(prefix + suffix);
    }
}
"#;

    fn candidates(k: &NodeKind) -> bool {
        is_candidate(k)
    }

    #[test]
    fn test_long_line_reports_outermost_only() {
        let tree = parse(SOURCE);
        let found = run_on(&LongStatementDetector::default(), &tree, candidates);
        let long: Vec<_> = found.iter().filter(|f| f.line == 6).collect();
        assert_eq!(long.len(), 1);
        assert!(long[0].code.starts_with("line = repository.findAllByOwnerAndStatus"));
        assert_eq!(long[0].subject, "public void render(StringBuilder out)");
    }

    #[test]
    fn test_fields_outside_callables_ignored() {
        let tree = parse(SOURCE);
        let found = run_on(&LongStatementDetector::default(), &tree, candidates);
        assert!(found.iter().all(|f| f.line != 2));
    }

    #[test]
    fn test_every_nested_fragment_without_outermost_filter() {
        let tree = parse(SOURCE);
        let detector = LongStatementDetector::default().outermost_only(false);
        let found = run_on(&detector, &tree, candidates);
        assert!(found.iter().filter(|f| f.line == 6).count() > 1);
    }

    #[test]
    fn test_broken_binary_argument_any_break() {
        let tree = parse(SOURCE);
        let found = run_on(&LongStatementDetector::default(), &tree, candidates);
        let broken: Vec<_> = found.iter().filter(|f| f.line == 7 || f.line == 9).collect();
        assert_eq!(broken.len(), 2);
        assert_eq!(broken[0].line, 7);
        assert_eq!(broken[0].code, "out.append(prefix +\n            suffix)");
        assert_eq!(broken[1].line, 9);
    }

    #[test]
    fn test_broken_binary_argument_trailing_operator() {
        let tree = parse(SOURCE);
        let detector = LongStatementDetector::default().continuation(Continuation::TrailingOperator);
        let found = run_on(&detector, &tree, candidates);
        let broken: Vec<_> = found.iter().filter(|f| f.line == 7 || f.line == 9).collect();
        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].line, 7);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let tree = parse(SOURCE);
        let found = run_on(&LongStatementDetector::new(8), &tree, candidates);
        assert!(found.iter().any(|f| f.code == "total = 1"));
    }
}
