//! Log calls.

use super::{Detector, Finding, NodeContext};
use crate::ast::ExprKind;

/// Calls to one of the configured logging methods, e.g. `log.warn(..)`.
pub struct LogMessageDetector {
    methods: Vec<String>,
}

impl LogMessageDetector {
    pub fn new(methods: Vec<String>) -> Self {
        Self { methods }
    }
}

impl Default for LogMessageDetector {
    fn default() -> Self {
        Self::new(vec!["warn".to_string(), "error".to_string()])
    }
}

impl Detector for LogMessageDetector {
    fn name(&self) -> &'static str {
        "log-message"
    }

    fn detect(&self, cx: &NodeContext<'_>, out: &mut Vec<Finding>) -> anyhow::Result<()> {
        if !matches!(cx.kind().expr(), Some(ExprKind::MethodCall { .. })) {
            return Ok(());
        }
        let name = cx.tree.node(cx.node).name();
        if self.methods.iter().any(|m| m == name) {
            let call = cx.text().trim();
            out.push(Finding::new(cx.line(), call, call));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;
    use crate::detect::testing::{parse, run_on};

    fn calls(k: &NodeKind) -> bool {
        matches!(k, NodeKind::Expression(ExprKind::MethodCall { .. }))
    }

    #[test]
    fn test_warn_and_error_calls() {
        let tree = parse(
            "class S {\n  void f(Exception e) {\n    log.info(\"start\");\n    log.warn(\"slow: {}\", e.getMessage());\n    LOGGER.error(\"failed\", e);\n  }\n}",
        );
        let found = run_on(&LogMessageDetector::default(), &tree, calls);
        let got: Vec<_> = found.iter().map(|f| (f.line, f.code.as_str())).collect();
        assert_eq!(
            got,
            vec![
                (4, "log.warn(\"slow: {}\", e.getMessage())"),
                (5, "LOGGER.error(\"failed\", e)"),
            ]
        );
        assert_eq!(found[0].subject, found[0].code);
    }

    #[test]
    fn test_configured_methods() {
        let tree = parse("class S {\n  void f() {\n    log.info(\"start\");\n  }\n}");
        let detector = LogMessageDetector::new(vec!["info".to_string()]);
        assert_eq!(run_on(&detector, &tree, calls).len(), 1);
    }
}
