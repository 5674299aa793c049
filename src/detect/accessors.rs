//! Field accessor correlation.

use super::{Detector, Finding, NodeContext};
use crate::ast::{ExprKind, NodeId, NodeKind, StmtKind, SyntaxTree};

/// Marker used when a field has no setter or getter.
pub const NONE: &str = "none";

/// Correlates each declarator of a field with the methods of the enclosing
/// type that write (setter) or return (getter) it.
///
/// Matching is syntactic: an assignment target or returned expression is the
/// field when it is a simple name or a member access with the field's name.
/// Methods are scanned in declaration order and a later match replaces an
/// earlier one, so with two setters only the last is reported.
pub struct AccessorDetector;

#[derive(Default)]
struct Accessors<'t> {
    setter: Option<&'t str>,
    getter: Option<&'t str>,
}

impl Detector for AccessorDetector {
    fn name(&self) -> &'static str {
        "accessors"
    }

    fn detect(&self, cx: &NodeContext<'_>, out: &mut Vec<Finding>) -> anyhow::Result<()> {
        let tree = cx.tree;
        if !matches!(cx.kind(), NodeKind::Field { .. }) {
            return Ok(());
        }

        let mut fields: Vec<(&str, Accessors)> = tree
            .children(cx.node)
            .iter()
            .filter(|c| matches!(tree.kind(**c), NodeKind::Variable { .. }))
            .map(|v| (tree.node(*v).name(), Accessors::default()))
            .collect();

        if let Some(owner) = tree.enclosing_type(cx.node) {
            let methods = tree.members(owner).filter(|m| tree.kind(*m).is_method());
            for method in methods {
                scan_method(tree, method, &mut fields);
            }
        }

        let code = tree.text(cx.node).trim();
        for (name, accessors) in fields {
            let subject = format!(
                "field {}, setter {}, getter {}",
                name,
                describe(accessors.setter),
                describe(accessors.getter)
            );
            out.push(Finding::new(cx.line(), code, subject));
        }
        Ok(())
    }
}

fn describe(method: Option<&str>) -> String {
    match method {
        Some(name) => format!("{}()", name),
        None => NONE.to_string(),
    }
}

/// Record `method` as setter or getter of any field it writes or returns.
/// Assignments are applied before returns.
fn scan_method<'t>(tree: &'t SyntaxTree, method: NodeId, fields: &mut [(&str, Accessors<'t>)]) {
    let Some(body) = tree.kind(method).method().and_then(|m| m.body) else {
        return;
    };
    let method_name = tree.node(method).name();

    for node in tree.descendants(body) {
        if let NodeKind::Expression(ExprKind::Assignment { target, .. }) = tree.kind(node) {
            if let Some(slot) = field_slot(tree, *target, fields) {
                slot.setter = Some(method_name);
            }
        }
    }
    for node in tree.descendants(body) {
        if let NodeKind::Statement(StmtKind::Return { expr: Some(expr) }) = tree.kind(node) {
            if let Some(slot) = field_slot(tree, *expr, fields) {
                slot.getter = Some(method_name);
            }
        }
    }
}

fn field_slot<'f, 't>(
    tree: &SyntaxTree,
    expr: NodeId,
    fields: &'f mut [(&str, Accessors<'t>)],
) -> Option<&'f mut Accessors<'t>> {
    let name = match tree.kind(expr) {
        NodeKind::Expression(ExprKind::Name | ExprKind::FieldAccess { .. }) => {
            tree.node(expr).name()
        }
        _ => return None,
    };
    fields
        .iter_mut()
        .find(|(field, _)| *field == name)
        .map(|(_, accessors)| accessors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::testing::{parse, run_on};

    fn fields(k: &NodeKind) -> bool {
        matches!(k, NodeKind::Field { .. })
    }

    #[test]
    fn test_getter_and_setter() {
        let tree = parse(
            "class User {\n  private String name;\n  public String getName() { return name; }\n  public void setName(String name) { this.name = name; }\n}",
        );
        let found = run_on(&AccessorDetector, &tree, fields);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 2);
        assert_eq!(found[0].code, "private String name;");
        assert_eq!(
            found[0].subject,
            "field name, setter setName(), getter getName()"
        );
    }

    #[test]
    fn test_last_setter_wins() {
        let tree = parse(
            "class User {\n  private int age;\n  void setAge(int a) { age = a; }\n  void resetAge() { this.age = 0; }\n}",
        );
        let found = run_on(&AccessorDetector, &tree, fields);
        assert_eq!(found[0].subject, "field age, setter resetAge(), getter none");
    }

    #[test]
    fn test_field_without_accessors_still_reported() {
        let tree = parse("class C {\n  int a, b;\n  int sum() { return a + b; }\n}");
        let found = run_on(&AccessorDetector, &tree, fields);
        let subjects: Vec<_> = found.iter().map(|f| f.subject.as_str()).collect();
        assert_eq!(
            subjects,
            vec![
                "field a, setter none, getter none",
                "field b, setter none, getter none",
            ]
        );
    }
}
