//! Declaration names with their word tokens.

use super::{Detector, Finding, NodeContext};
use crate::ast::NodeKind;
use crate::signature;
use crate::tokenize::{format_tokens, tokenize};

/// Emits the declaration of a type, method or variable followed by the
/// tokens of its name, e.g. `public class HttpClient\n[http, client]`.
pub struct NamingDetector;

impl Detector for NamingDetector {
    fn name(&self) -> &'static str {
        "naming"
    }

    fn detect(&self, cx: &NodeContext<'_>, out: &mut Vec<Finding>) -> anyhow::Result<()> {
        let tree = cx.tree;
        let declaration = match cx.kind() {
            NodeKind::Type(_) => signature::type_header(tree, cx.node),
            NodeKind::Method(_) => signature::callable_signature(tree, cx.node),
            NodeKind::Variable { .. } => signature::variable_declaration(tree, cx.node),
            _ => return Ok(()),
        };
        let name = tree.node(cx.node).name();
        let tokens = format_tokens(&tokenize(name));

        out.push(Finding::new(
            tree.name_line(cx.node),
            format!("{}\n{}", declaration, tokens),
            name,
        ));
        Ok(())
    }
}
