//! Integration tests for the Java front end over the testdata fixtures.

use std::path::PathBuf;

use rulesnip::ast::{NodeKind, StmtKind, SyntaxTree, TypeKind};
use rulesnip::frontend::{Frontend, FrontendError, JavaFrontend};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata/java/com/example/shop")
        .join(name)
}

fn parse(name: &str) -> SyntaxTree {
    let path = fixture(name);
    let source = std::fs::read_to_string(&path).expect("should read fixture");
    JavaFrontend::new()
        .parse(&path, &source)
        .expect("fixture should parse")
        .tree
}

#[test]
fn test_handles_java_files_only() {
    let frontend = JavaFrontend::new();
    assert_eq!(frontend.language_id(), "java");
    assert!(frontend.handles(&fixture("Inventory.java")));
    assert!(!frontend.handles(&PathBuf::from("build.gradle")));
}

#[test]
fn test_class_members_in_source_order() {
    let tree = parse("Inventory.java");
    let class = tree
        .preorder()
        .find(|id| tree.kind(*id).is_type())
        .expect("class");
    assert_eq!(tree.node(class).name(), "Inventory");
    assert_eq!(tree.kind(class).type_decl().map(|t| t.kind), Some(TypeKind::Class));

    let members: Vec<_> = tree
        .members(class)
        .map(|m| match tree.kind(m) {
            NodeKind::Field { ty } => (format!("field {}", ty), tree.line(m)),
            _ => (tree.node(m).name().to_string(), tree.line(m)),
        })
        .collect();
    assert_eq!(
        members,
        vec![
            ("field List<String>".to_string(), 7),
            ("Inventory".to_string(), 9),
            ("size".to_string(), 13),
            ("Inventory".to_string(), 17),
            ("restock".to_string(), 21),
        ]
    );
}

#[test]
fn test_javadoc_attached_to_method() {
    let tree = parse("OrderController.java");
    let find = tree
        .preorder()
        .find(|id| tree.kind(*id).is_method() && tree.node(*id).name() == "find")
        .expect("find method");
    let doc = tree.node(find).javadoc().expect("javadoc");
    assert!(doc.content().contains("Looks up one order."));

    let create = tree
        .preorder()
        .find(|id| tree.kind(*id).is_method() && tree.node(*id).name() == "create")
        .expect("create method");
    assert!(tree.node(create).javadoc().is_none());
}

#[test]
fn test_statements_lowered() {
    let tree = parse("Dispatcher.java");
    let throws = tree
        .preorder()
        .filter(|id| matches!(tree.kind(*id), NodeKind::Statement(StmtKind::Throw { .. })))
        .count();
    assert_eq!(throws, 1);

    let sync_method = tree
        .preorder()
        .find(|id| tree.node(*id).name() == "drain")
        .expect("drain");
    assert_eq!(tree.line(sync_method), 15);
    assert_eq!(tree.end_line(sync_method), 17);
}

#[test]
fn test_syntax_errors_rejected_by_default() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata/broken/Broken.java");
    let source = std::fs::read_to_string(&path).unwrap();

    let err = JavaFrontend::new().parse(&path, &source).unwrap_err();
    assert!(matches!(err, FrontendError::Syntax { errors, .. } if errors > 0));

    let unit = JavaFrontend::new().tolerant(true).parse(&path, &source).unwrap();
    assert!(unit.tree.preorder().any(|id| tree_is_class(&unit.tree, id)));
}

fn tree_is_class(tree: &SyntaxTree, id: rulesnip::ast::NodeId) -> bool {
    tree.kind(id).is_type() && tree.node(id).name() == "Broken"
}
