//! Request paths of controller methods.

use super::{string_value, Detector, Finding, NodeContext};
use crate::ast::{AnnotationArgs, ExprKind, NodeId, NodeKind, SyntaxTree};

/// Composes the full request path of every mapped method of a type.
///
/// Base paths come from the type's base mapping annotation, method paths
/// from every method annotation whose name ends with the mapping suffix.
/// One finding is emitted per (base path, method path) pair, at the line of
/// the method annotation.
pub struct RequestPathDetector {
    base_annotation: String,
    suffix: String,
}

impl RequestPathDetector {
    pub fn new(base_annotation: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            base_annotation: base_annotation.into(),
            suffix: suffix.into(),
        }
    }
}

impl Default for RequestPathDetector {
    fn default() -> Self {
        Self::new("RequestMapping", "Mapping")
    }
}

impl Detector for RequestPathDetector {
    fn name(&self) -> &'static str {
        "request-path"
    }

    fn detect(&self, cx: &NodeContext<'_>, out: &mut Vec<Finding>) -> anyhow::Result<()> {
        let tree = cx.tree;
        if !cx.kind().is_type() {
            return Ok(());
        }

        // The last base annotation wins when several are present.
        let mut base_paths = vec![String::new()];
        for annotation in annotations(tree, cx.node) {
            if tree.node(annotation).name() == self.base_annotation {
                base_paths = paths(tree, annotation);
            }
        }

        for method in tree.members(cx.node).filter(|m| tree.kind(*m).is_method()) {
            let method_name = tree.node(method).name();
            for annotation in annotations(tree, method) {
                if !tree.node(annotation).name().ends_with(&self.suffix) {
                    continue;
                }
                let line = tree.line(annotation);
                let method_paths = paths(tree, annotation);
                for base in &base_paths {
                    for path in &method_paths {
                        out.push(Finding::new(line, compose(base, path), method_name));
                    }
                }
            }
        }
        Ok(())
    }
}

fn annotations(tree: &SyntaxTree, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    tree.children(id)
        .iter()
        .copied()
        .filter(move |c| matches!(tree.kind(*c), NodeKind::Annotation(_)))
}

/// Paths named by a mapping annotation; `[""]` when it names none.
fn paths(tree: &SyntaxTree, annotation: NodeId) -> Vec<String> {
    let mut found = Vec::new();
    match tree.kind(annotation) {
        NodeKind::Annotation(AnnotationArgs::Single(value)) => {
            found.extend(values(tree, *value));
        }
        NodeKind::Annotation(AnnotationArgs::Pairs(pairs)) => {
            for (key, value) in pairs {
                if key == "value" || key == "path" {
                    found.extend(values(tree, *value));
                }
            }
        }
        _ => {}
    }
    if found.is_empty() {
        found.push(String::new());
    }
    found
}

fn values(tree: &SyntaxTree, value: NodeId) -> Vec<String> {
    if let Some(s) = string_value(tree, value) {
        return vec![s.to_string()];
    }
    match tree.kind(value) {
        NodeKind::Expression(ExprKind::ArrayInitializer) => tree
            .children(value)
            .iter()
            .map(|e| match string_value(tree, *e) {
                Some(s) => s.to_string(),
                None => tree.text(*e).trim().to_string(),
            })
            .collect(),
        _ => vec![tree.text(value).trim().to_string()],
    }
}

/// `"/" + base + "/" + path`, with runs of `/` collapsed and one trailing
/// `/` removed.
fn compose(base: &str, path: &str) -> String {
    let joined = format!("/{}/{}", base, path);
    let mut out = String::with_capacity(joined.len());
    for c in joined.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    if out.ends_with('/') {
        out.pop();
    }
    out
}
