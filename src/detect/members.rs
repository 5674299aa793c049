//! Type member summaries: interface constants, class outlines and
//! `static final` constants.

use lazy_static::lazy_static;
use regex::Regex;

use super::{Detector, Finding, NodeContext};
use crate::ast::{Modifier, NodeId, NodeKind, SyntaxTree, TypeKind};
use crate::signature;

lazy_static! {
    static ref UPPER_SNAKE: Regex = Regex::new(r"^[A-Z0-9_]+$").expect("valid regex");
}

/// Variable declarators of a field declaration.
fn declarators(tree: &SyntaxTree, field: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    tree.children(field)
        .iter()
        .copied()
        .filter(move |c| matches!(tree.kind(*c), NodeKind::Variable { .. }))
}

/// Interface fields that are not plain constants.
///
/// A field is reported when it has no initializer or a non-literal one, and
/// otherwise when its name is not upper snake case. One finding per
/// declarator, with the interface header as subject.
pub struct InterfaceConstantsDetector;

impl Detector for InterfaceConstantsDetector {
    fn name(&self) -> &'static str {
        "interface-constants"
    }

    fn detect(&self, cx: &NodeContext<'_>, out: &mut Vec<Finding>) -> anyhow::Result<()> {
        let tree = cx.tree;
        let is_interface = cx
            .kind()
            .type_decl()
            .map(|t| t.kind == TypeKind::Interface)
            .unwrap_or(false);
        if !is_interface {
            return Ok(());
        }
        let header = signature::type_header(tree, cx.node);

        let fields = tree
            .members(cx.node)
            .filter(|m| matches!(tree.kind(*m), NodeKind::Field { .. }));
        for field in fields {
            for var in declarators(tree, field) {
                let literal = match tree.kind(var) {
                    NodeKind::Variable {
                        initializer: Some(init),
                        ..
                    } => tree
                        .kind(*init)
                        .expr()
                        .map(|e| e.is_literal())
                        .unwrap_or(false),
                    _ => false,
                };
                if !literal || !UPPER_SNAKE.is_match(tree.node(var).name()) {
                    out.push(Finding::new(
                        tree.line(var),
                        tree.text(field).trim(),
                        header.clone(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Outline of a class or interface: fields as written, methods and
/// constructors as signatures, one indented line each.
pub struct ClassOutlineDetector;

impl Detector for ClassOutlineDetector {
    fn name(&self) -> &'static str {
        "class-outline"
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

        let mut outline = String::new();
        for member in tree.members(cx.node) {
            let line = match tree.kind(member) {
                NodeKind::Field { .. } => tree.text(member).trim().to_string(),
                NodeKind::Method(_) | NodeKind::Constructor(_) => {
                    format!("{};", signature::callable_signature(tree, member))
                }
                _ => continue,
            };
            outline.push_str("    ");
            outline.push_str(&line);
            outline.push('\n');
        }

        out.push(Finding::new(
            cx.line(),
            outline,
            signature::type_signature(tree, cx.node),
        ));
        Ok(())
    }
}

/// `static final` fields rendered as `access static final Type NAME = value;`.
pub struct ConstantsDetector;

impl Detector for ConstantsDetector {
    fn name(&self) -> &'static str {
        "constants"
    }

    fn detect(&self, cx: &NodeContext<'_>, out: &mut Vec<Finding>) -> anyhow::Result<()> {
        let tree = cx.tree;
        if !matches!(cx.kind(), NodeKind::Field { .. }) {
            return Ok(());
        }
        let field = tree.node(cx.node);
        if !(field.has_modifier(Modifier::Static) && field.has_modifier(Modifier::Final)) {
            return Ok(());
        }
        let access = field
            .modifiers
            .iter()
            .find(|m| m.is_access())
            .map(|m| m.as_str())
            .unwrap_or("");

        for var in declarators(tree, cx.node) {
            let NodeKind::Variable { ty, initializer } = tree.kind(var) else {
                continue;
            };
            let name = tree.node(var).name();
            let value = initializer.map(|i| tree.text(i)).unwrap_or("");
            let code = format!("{} static final {} {} = {};", access, ty, name, value);
            out.push(Finding::new(
                tree.name_line(var),
                code.trim_start(),
                name,
            ));
        }
        Ok(())
    }
}
