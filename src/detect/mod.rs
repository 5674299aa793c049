//! Extraction engine: detectors, the registry that binds them to rule ids,
//! and the dispatcher that walks a syntax tree.

mod accessors;
mod continuity;
mod docs;
mod engine;
mod lock;
mod logging;
mod long_statement;
mod loops;
mod members;
mod naming;
mod registry;
mod request_path;
mod runner;
mod thread;
mod throws;
mod types;

pub use accessors::AccessorDetector;
pub use continuity::ContinuityDetector;
pub use docs::{JavadocDetector, MethodDocDetector};
pub use engine::Engine;
pub use lock::LockDetector;
pub use logging::LogMessageDetector;
pub use long_statement::LongStatementDetector;
pub use loops::{LoopBodyDetector, LoopContainsDetector};
pub use members::{ClassOutlineDetector, ConstantsDetector, InterfaceConstantsDetector};
pub use naming::NamingDetector;
pub use registry::{DetectorRegistry, DEFAULT_BINDINGS};
pub use request_path::RequestPathDetector;
pub use runner::{collect_files, Runner};
pub use thread::ThreadNameDetector;
pub use throws::ThrowMessageDetector;
pub use types::{Collector, ExtractionResult, Finding, SkippedFile, Snippet};

use crate::ast::{ExprKind, NodeId, NodeKind, SyntaxTree};
use crate::rules::{Rule, Settings};

/// Everything a detector may look at for one invocation.
pub struct NodeContext<'a> {
    pub tree: &'a SyntaxTree,
    pub node: NodeId,
    pub rule: &'a Rule,
    pub path: &'a str,
}

impl<'a> NodeContext<'a> {
    pub fn kind(&self) -> &'a NodeKind {
        self.tree.kind(self.node)
    }

    pub fn text(&self) -> &'a str {
        self.tree.text(self.node)
    }

    pub fn line(&self) -> i64 {
        self.tree.line(self.node)
    }
}

/// A snippet extraction algorithm bound to one or more rule ids.
///
/// Detectors only read the tree. Each invocation sees one node and the one
/// rule driving it; the node's kind has already been matched against the
/// rule's scope tags, but detectors still check for the kinds they handle.
pub trait Detector: Send + Sync {
    /// Name used in rule bindings.
    fn name(&self) -> &'static str;

    fn detect(&self, cx: &NodeContext<'_>, out: &mut Vec<Finding>) -> anyhow::Result<()>;
}

/// All built-in detectors, configured from `settings`, in registration order.
pub fn builtin(settings: &Settings) -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(NamingDetector),
        Box::new(JavadocDetector),
        Box::new(MethodDocDetector),
        Box::new(RequestPathDetector::new(
            settings.base_mapping_annotation(),
            settings.mapping_suffix(),
        )),
        Box::new(ContinuityDetector),
        Box::new(InterfaceConstantsDetector),
        Box::new(AccessorDetector),
        Box::new(ClassOutlineDetector),
        Box::new(LongStatementDetector::from_settings(&settings.long_statement)),
        Box::new(ThrowMessageDetector),
        Box::new(ConstantsDetector),
        Box::new(LoopContainsDetector::new(settings.linear_scan_types())),
        Box::new(LoopBodyDetector),
        Box::new(ThreadNameDetector::new(
            settings.thread_types(),
            settings.thread_name_setter(),
        )),
        Box::new(LockDetector::new(settings.lock_types())),
        Box::new(LogMessageDetector::new(settings.log_methods())),
    ]
}

/// Decoded value of a string literal node.
pub(crate) fn string_value(tree: &SyntaxTree, id: NodeId) -> Option<&str> {
    match tree.kind(id) {
        NodeKind::Expression(ExprKind::StringLiteral { value }) => Some(value),
        _ => None,
    }
}

/// String literal value, or the trimmed source text of any other node.
pub(crate) fn literal_or_text(tree: &SyntaxTree, id: NodeId) -> String {
    match string_value(tree, id) {
        Some(value) => value.to_string(),
        None => tree.text(id).trim().to_string(),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names_are_unique() {
        let detectors = builtin(&Settings::default());
        let mut names: Vec<_> = detectors.iter().map(|d| d.name()).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
        assert_eq!(total, 16);
    }

    #[test]
    fn test_literal_or_text() {
        let tree = testing::parse("class A { String s = \"x\\ty\"; int n = 1 + 2; }");
        let inits: Vec<_> = tree
            .preorder()
            .filter_map(|id| match tree.kind(id) {
                NodeKind::Variable { initializer, .. } => *initializer,
                _ => None,
            })
            .collect();
        assert_eq!(literal_or_text(&tree, inits[0]), "x\ty");
        assert_eq!(literal_or_text(&tree, inits[1]), "1 + 2");
    }
}
