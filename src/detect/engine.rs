//! Scope dispatch over one syntax tree.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{debug, warn};

use super::{Collector, Detector, DetectorRegistry, Finding, NodeContext, Snippet};
use crate::frontend::SourceUnit;
use crate::rules::{Rule, RuleError, RuleSet};

/// Runs bound detectors over every node of a source unit.
#[derive(Debug)]
pub struct Engine {
    rules: Vec<Rule>,
    registry: DetectorRegistry,
}

impl Engine {
    pub fn new(rules: Vec<Rule>, registry: DetectorRegistry) -> Self {
        for rule in &rules {
            if !rule.tags().is_empty() && !registry.has_bindings(&rule.id) {
                debug!(rule = %rule.id, "no detector bound to rule");
            }
        }
        Self { rules, registry }
    }

    /// Engine with the built-in detectors configured from the rule set.
    pub fn from_rule_set(set: &RuleSet) -> Result<Self, RuleError> {
        let registry = DetectorRegistry::with_defaults(&set.settings)?;
        Ok(Self::new(set.rules.clone(), registry))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn registry(&self) -> &DetectorRegistry {
        &self.registry
    }

    /// Extract snippets from one unit.
    ///
    /// Output order is pre-order node visitation, then rule order, then
    /// binding order. A failing detector invocation contributes nothing and
    /// does not affect any other invocation.
    pub fn extract(&self, unit: &SourceUnit) -> Vec<Snippet> {
        let tree = &unit.tree;
        let path = unit.path_str();
        let mut collector = Collector::new();

        for node in tree.preorder() {
            let kind = tree.kind(node);
            for rule in self.rules.iter().filter(|r| r.applies_to(kind)) {
                let cx = NodeContext {
                    tree,
                    node,
                    rule,
                    path: &path,
                };
                for detector in self.registry.detectors_for(&rule.id) {
                    if let Some(findings) = invoke(detector, &cx) {
                        collector.extend(
                            findings
                                .into_iter()
                                .map(|f| Snippet::from_finding(rule, &path, f)),
                        );
                    }
                }
            }
        }

        collector.into_snippets()
    }
}

/// Run one detector invocation, isolating errors and panics.
fn invoke(detector: &dyn Detector, cx: &NodeContext<'_>) -> Option<Vec<Finding>> {
    let mut findings = Vec::new();
    let outcome = catch_unwind(AssertUnwindSafe(|| detector.detect(cx, &mut findings)));
    match outcome {
        Ok(Ok(())) => Some(findings),
        Ok(Err(e)) => {
            warn!(
                detector = detector.name(),
                rule = %cx.rule.id,
                file = cx.path,
                line = cx.line(),
                error = %e,
                "detector failed"
            );
            None
        }
        Err(_) => {
            warn!(
                detector = detector.name(),
                rule = %cx.rule.id,
                file = cx.path,
                line = cx.line(),
                "detector panicked"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::ast::NodeKind;
    use crate::detect::testing::parse;

    struct Failing;

    impl Detector for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn detect(&self, _cx: &NodeContext<'_>, out: &mut Vec<Finding>) -> anyhow::Result<()> {
            out.push(Finding::unplaced("partial", "partial"));
            anyhow::bail!("broken")
        }
    }

    struct Panicking;

    impl Detector for Panicking {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn detect(&self, _cx: &NodeContext<'_>, _out: &mut Vec<Finding>) -> anyhow::Result<()> {
            panic!("boom")
        }
    }

    /// Reports every node it sees with its kind and the rule id.
    struct Echo;

    impl Detector for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn detect(&self, cx: &NodeContext<'_>, out: &mut Vec<Finding>) -> anyhow::Result<()> {
            let label = match cx.kind() {
                NodeKind::Type(_) => "type",
                NodeKind::Method(_) => "method",
                _ => "other",
            };
            out.push(Finding::new(cx.line(), label, cx.rule.id.clone()));
            Ok(())
        }
    }

    fn unit(source: &str) -> SourceUnit {
        SourceUnit {
            path: PathBuf::from("src/A.java"),
            tree: parse(source),
        }
    }

    fn registry() -> DetectorRegistry {
        let mut registry = DetectorRegistry::new();
        registry.register(Box::new(Failing));
        registry.register(Box::new(Panicking));
        registry.register(Box::new(Echo));
        registry
    }

    #[test]
    fn test_dispatch_order_and_scope_matching() {
        let mut registry = registry();
        registry.bind("R-TYPE", "echo").unwrap();
        registry.bind("R-BOTH", "echo").unwrap();
        let rules = vec![
            Rule::new("R-BOTH", "CLASS_DECLARATION,METHOD_DECLARATION", "", "", ""),
            Rule::new("R-TYPE", "CLASS_DECLARATION", "", "", ""),
            Rule::new("R-INERT", "NOT_A_TAG", "", "", ""),
        ];
        let engine = Engine::new(rules, registry);
        let snippets = engine.extract(&unit("class A {\n  void f() {}\n}"));

        let seen: Vec<_> = snippets
            .iter()
            .map(|s| (s.rule_id.as_str(), s.code.as_str(), s.line))
            .collect();
        assert_eq!(
            seen,
            vec![("R-BOTH", "type", 1), ("R-TYPE", "type", 1), ("R-BOTH", "method", 2)]
        );
        assert!(snippets.iter().all(|s| s.file_path == "src/A.java"));
        assert_eq!(snippets[0].rule_scope, "CLASS_DECLARATION,METHOD_DECLARATION");
    }

    #[test]
    fn test_failures_are_isolated() {
        let mut registry = registry();
        registry.bind("R", "failing").unwrap();
        registry.bind("R", "panicking").unwrap();
        registry.bind("R", "echo").unwrap();
        let engine = Engine::new(vec![Rule::new("R", "CLASS_DECLARATION", "", "", "")], registry);
        let snippets = engine.extract(&unit("class A {}\nclass B {}"));

        assert_eq!(snippets.len(), 2);
        assert!(snippets.iter().all(|s| s.code == "type"));
    }

    #[test]
    fn test_zero_rules_is_empty_success() {
        let engine = Engine::from_rule_set(&RuleSet::default()).unwrap();
        assert!(engine.extract(&unit("class A {}")).is_empty());
    }
}
