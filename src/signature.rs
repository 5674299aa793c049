//! Canonical declaration signatures.
//!
//! Signatures never include annotations or bodies, and modifiers always come
//! out in a fixed order regardless of how they were written.

use crate::ast::{Modifier, Node, NodeId, NodeKind, SyntaxTree};

/// Method modifiers that follow the access modifier, in output order.
const METHOD_MODIFIERS: &[Modifier] = &[
    Modifier::Static,
    Modifier::Abstract,
    Modifier::Final,
    Modifier::Native,
    Modifier::Synchronized,
];

/// Signature of a type, method or constructor; source text for anything else.
pub fn declaration(tree: &SyntaxTree, id: NodeId) -> String {
    match tree.kind(id) {
        NodeKind::Type(_) => type_signature(tree, id),
        NodeKind::Method(_) | NodeKind::Constructor(_) => callable_signature(tree, id),
        NodeKind::Variable { .. } => variable_declaration(tree, id),
        _ => tree.text(id).trim().to_string(),
    }
}

fn access(node: &Node) -> Option<&'static str> {
    node.modifiers
        .iter()
        .find(|m| m.is_access())
        .map(|m| m.as_str())
}

/// `public static class Name<T> extends Base implements A, B`
pub fn type_signature(tree: &SyntaxTree, id: NodeId) -> String {
    let node = tree.node(id);
    let Some(decl) = node.kind.type_decl() else {
        return tree.text(id).trim().to_string();
    };

    let mut parts: Vec<String> = Vec::new();
    parts.extend(access(node).map(str::to_string));
    if node.has_modifier(Modifier::Static) {
        parts.push("static".to_string());
    }
    parts.push(decl.kind.keyword().to_string());

    let mut name = node.name().to_string();
    if let Some(params) = &decl.type_params {
        name.push_str(params);
    }
    parts.push(name);

    if !decl.extends.is_empty() {
        parts.push(format!("extends {}", decl.extends.join(", ")));
    }
    if !decl.implements.is_empty() {
        parts.push(format!("implements {}", decl.implements.join(", ")));
    }
    parts.join(" ")
}

/// Short type header without generics or supertypes: `public interface Name`.
pub fn type_header(tree: &SyntaxTree, id: NodeId) -> String {
    let node = tree.node(id);
    let mut parts: Vec<&str> = Vec::new();
    parts.extend(access(node));
    if node.has_modifier(Modifier::Static) {
        parts.push("static");
    }
    if let Some(decl) = node.kind.type_decl() {
        parts.push(decl.kind.keyword());
    }
    parts.push(node.name());
    parts.join(" ")
}

/// `public static <T> List<T> name(Type a, Type b) throws X, Y`
pub fn callable_signature(tree: &SyntaxTree, id: NodeId) -> String {
    let node = tree.node(id);
    let Some(decl) = node.kind.method() else {
        return tree.text(id).trim().to_string();
    };

    let mut parts: Vec<String> = Vec::new();
    parts.extend(access(node).map(str::to_string));
    if node.kind.is_method() {
        for modifier in METHOD_MODIFIERS {
            if node.has_modifier(*modifier) {
                parts.push(modifier.as_str().to_string());
            }
        }
        if let Some(params) = &decl.type_params {
            parts.push(params.clone());
        }
        if let Some(ret) = &decl.return_type {
            parts.push(ret.clone());
        }
    }

    let params: Vec<String> = decl
        .params
        .iter()
        .map(|p| format!("{} {}", p.ty, p.name))
        .collect();
    parts.push(format!("{}({})", node.name(), params.join(", ")));

    if !decl.throws.is_empty() {
        parts.push(format!("throws {}", decl.throws.join(", ")));
    }
    parts.join(" ")
}

/// `Type name = initializer`, or `Type name` without one.
pub fn variable_declaration(tree: &SyntaxTree, id: NodeId) -> String {
    let node = tree.node(id);
    match &node.kind {
        NodeKind::Variable { ty, initializer } => match initializer {
            Some(init) => format!("{} {} = {}", ty, node.name(), tree.text(*init)),
            None => format!("{} {}", ty, node.name()),
        },
        _ => tree.text(id).trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::{Frontend, JavaFrontend};
    use std::path::Path;

    fn parse(source: &str) -> SyntaxTree {
        JavaFrontend::new()
            .parse(Path::new("Sig.java"), source)
            .unwrap()
            .tree
    }

    fn first(tree: &SyntaxTree, pred: impl Fn(&NodeKind) -> bool) -> NodeId {
        tree.preorder().find(|id| pred(tree.kind(*id))).unwrap()
    }

    #[test]
    fn test_type_signature() {
        let tree = parse(
            "@Component\npublic final class Repo<K, V> extends Base<K> implements Store, Closeable {}",
        );
        let ty = first(&tree, NodeKind::is_type);
        assert_eq!(
            type_signature(&tree, ty),
            "public class Repo<K, V> extends Base<K> implements Store, Closeable"
        );
        assert_eq!(type_header(&tree, ty), "public class Repo");
    }

    #[test]
    fn test_method_signature_fixed_order() {
        let tree = parse(
            "class A {\n  @Deprecated\n  synchronized static public <T> List<T> load(String key, int n) throws IOException, SQLException { return null; }\n}",
        );
        let method = first(&tree, NodeKind::is_method);
        assert_eq!(
            callable_signature(&tree, method),
            "public static synchronized <T> List<T> load(String key, int n) throws IOException, SQLException"
        );
    }

    #[test]
    fn test_constructor_and_variable() {
        let tree = parse("class A {\n  protected A(int size) {}\n  private Map<String, Integer> counts = new HashMap<>();\n}");
        let ctor = first(&tree, |k| matches!(k, NodeKind::Constructor(_)));
        assert_eq!(callable_signature(&tree, ctor), "protected A(int size)");

        let var = first(&tree, |k| matches!(k, NodeKind::Variable { .. }));
        assert_eq!(
            variable_declaration(&tree, var),
            "Map<String, Integer> counts = new HashMap<>()"
        );
    }

    #[test]
    fn test_c_style_array_declarator_keeps_dimensions() {
        let tree = parse("class A {\n  void f() {\n    int counts[] = {1, 2}, total = 0;\n  }\n}");
        let vars: Vec<_> = tree
            .preorder()
            .filter(|id| matches!(tree.kind(*id), NodeKind::Variable { .. }))
            .collect();
        assert_eq!(variable_declaration(&tree, vars[0]), "int[] counts = {1, 2}");
        assert_eq!(variable_declaration(&tree, vars[1]), "int total = 0");
    }

    #[test]
    fn test_interface_header() {
        let tree = parse("interface Shape extends Comparable<Shape> { double area(); }");
        let ty = first(&tree, NodeKind::is_type);
        assert_eq!(type_header(&tree, ty), "interface Shape");
        assert_eq!(type_signature(&tree, ty), "interface Shape extends Comparable<Shape>");
        let method = first(&tree, NodeKind::is_method);
        assert_eq!(declaration(&tree, method), "double area()");
    }
}
