//! Grouping of constructors and overloads.

use std::collections::HashSet;

use super::{Detector, Finding, NodeContext};
use crate::ast::{NodeId, NodeKind, SyntaxTree};

/// Flags constructors and same-named methods that are not declared next to
/// each other. Runs one forward pass over the members of a class or
/// interface.
pub struct ContinuityDetector;

impl Detector for ContinuityDetector {
    fn name(&self) -> &'static str {
        "continuity"
    }

    fn detect(&self, cx: &NodeContext<'_>, out: &mut Vec<Finding>) -> anyhow::Result<()> {
        let tree = cx.tree;
        let is_class_or_interface = cx
            .kind()
            .type_decl()
            .map(|t| t.kind.is_class_or_interface())
            .unwrap_or(false);
        if !is_class_or_interface {
            return Ok(());
        }

        let class_name = tree.node(cx.node).name();
        let members: Vec<NodeId> = tree.members(cx.node).collect();

        if let Some(ctor) = split_constructor(tree, &members) {
            out.push(Finding::new(
                tree.line(ctor),
                tree.text(ctor).trim(),
                format!("constructors of class {} are not contiguous", class_name),
            ));
        }

        for method in split_overloads(tree, &members) {
            out.push(Finding::new(
                tree.line(method),
                tree.text(method).trim(),
                format!(
                    "overloads of {} in class {} are not contiguous",
                    tree.node(method).name(),
                    class_name
                ),
            ));
        }
        Ok(())
    }
}

/// The first constructor declared after the constructor run has closed.
fn split_constructor(tree: &SyntaxTree, members: &[NodeId]) -> Option<NodeId> {
    let mut in_run = false;
    let mut run_closed = false;
    for &member in members {
        if matches!(tree.kind(member), NodeKind::Constructor(_)) {
            if run_closed {
                return Some(member);
            }
            in_run = true;
        } else if in_run {
            run_closed = true;
        }
    }
    None
}

/// Every method whose name already had a run of declarations that was
/// closed by another member.
fn split_overloads(tree: &SyntaxTree, members: &[NodeId]) -> Vec<NodeId> {
    let mut flagged = Vec::new();
    let mut current: Option<&str> = None;
    let mut finished: HashSet<&str> = HashSet::new();

    for &member in members {
        if !tree.kind(member).is_method() {
            if let Some(name) = current.take() {
                finished.insert(name);
            }
            continue;
        }
        let name = tree.node(member).name();
        if finished.contains(name) {
            flagged.push(member);
        }
        match current {
            Some(open) if open == name => {}
            Some(open) => {
                finished.insert(open);
                current = Some(name);
            }
            None => current = Some(name),
        }
    }
    flagged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::testing::{parse, run_on};

    #[test]
    fn test_constructor_after_closed_run() {
        let tree = parse(
            "class Account {\n  Account() {}\n  Account(int id) {}\n  private int id;\n  Account(String name) {}\n  Account(long id) {}\n}",
        );
        let found = run_on(&ContinuityDetector, &tree, NodeKind::is_type);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 5);
        assert_eq!(found[0].code, "Account(String name) {}");
        assert!(found[0].subject.contains("Account"));
    }

    #[test]
    fn test_contiguous_members_are_clean() {
        let tree = parse(
            "class A {\n  A() {}\n  A(int x) {}\n  void f() {}\n  void f(int x) {}\n  void g() {}\n}",
        );
        assert!(run_on(&ContinuityDetector, &tree, NodeKind::is_type).is_empty());
    }

    #[test]
    fn test_every_reoccurrence_of_split_overload() {
        let tree = parse(
            "class A {\n  void f() {}\n  void g() {}\n  void f(int x) {}\n  int n;\n  void g(int y) {}\n  void f(long z) {}\n}",
        );
        let found = run_on(&ContinuityDetector, &tree, NodeKind::is_type);
        let lines: Vec<_> = found.iter().map(|f| f.line).collect();
        assert_eq!(lines, vec![4, 6, 7]);
        assert!(found[0].subject.starts_with("overloads of f"));
        assert!(found[1].subject.starts_with("overloads of g"));
    }

    #[test]
    fn test_enums_are_skipped() {
        let tree = parse("enum E {\n  A;\n  E() {}\n  void f() {}\n  E(int x) {}\n}");
        assert!(run_on(&ContinuityDetector, &tree, NodeKind::is_type).is_empty());
    }
}
