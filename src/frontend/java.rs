//! Java front end using tree-sitter.
//!
//! The concrete tree is lowered into the engine's [`SyntaxTree`]: declarations
//! keep their modifiers, names and attached comments, while pure type syntax
//! (type identifiers, type arguments, parameter lists) is folded into the
//! payload of the declaration that owns it.

use std::path::Path;

use tree_sitter::{Language, Node as TsNode, Parser};

use super::{Frontend, FrontendError, SourceUnit};
use crate::ast::{
    AnnotationArgs, Comment, ExprKind, MethodDecl, Modifier, Node, NodeId, NodeKind, Param, Span,
    StmtKind, SyntaxTree, TypeDecl, TypeKind,
};

/// Grammar nodes that only carry type syntax or are consumed by their parent.
const FOLDED_KINDS: &[&str] = &[
    "line_comment",
    "block_comment",
    "modifiers",
    "type_identifier",
    "scoped_type_identifier",
    "generic_type",
    "integral_type",
    "floating_point_type",
    "boolean_type",
    "void_type",
    "array_type",
    "annotated_type",
    "type_arguments",
    "type_parameters",
    "dimensions",
    "formal_parameters",
    "inferred_parameters",
    "catch_formal_parameter",
    "throws",
    "superclass",
    "super_interfaces",
    "extends_interfaces",
    "permits",
    "package_declaration",
    "import_declaration",
];

const LITERAL_KINDS: &[&str] = &[
    "decimal_integer_literal",
    "hex_integer_literal",
    "octal_integer_literal",
    "binary_integer_literal",
    "decimal_floating_point_literal",
    "hex_floating_point_literal",
    "character_literal",
    "true",
    "false",
    "null_literal",
];

pub struct JavaFrontend {
    language: Language,
    tolerant: bool,
}

impl JavaFrontend {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_java::LANGUAGE.into(),
            tolerant: false,
        }
    }

    /// Accept files containing syntax errors instead of rejecting them.
    pub fn tolerant(mut self, tolerant: bool) -> Self {
        self.tolerant = tolerant;
        self
    }

    fn create_parser(&self) -> Result<Parser, FrontendError> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }
}

impl Default for JavaFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontend for JavaFrontend {
    fn language_id(&self) -> &'static str {
        "java"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["java"]
    }

    fn parse(&self, path: &Path, source: &str) -> Result<SourceUnit, FrontendError> {
        let mut parser = self.create_parser()?;
        let parsed = parser
            .parse(source, None)
            .ok_or_else(|| FrontendError::NoTree(path.display().to_string()))?;
        let root = parsed.root_node();

        if root.has_error() && !self.tolerant {
            let mut errors = Vec::new();
            collect_errors(root, &mut errors);
            return Err(FrontendError::Syntax {
                path: path.display().to_string(),
                errors: errors.len().max(1),
                first_line: errors.first().copied().unwrap_or(1),
            });
        }

        let mut lowerer = Lowerer {
            source,
            tree: SyntaxTree::new(source),
        };
        let unit = lowerer.tree.root();
        lowerer.lower_children(root, unit);

        Ok(SourceUnit {
            path: path.to_path_buf(),
            tree: lowerer.tree,
        })
    }
}

fn collect_errors(node: TsNode, lines: &mut Vec<usize>) {
    if node.is_error() || node.is_missing() {
        lines.push(node.start_position().row + 1);
        return;
    }
    if !node.has_error() {
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_errors(child, lines);
    }
}

fn named_children<'t>(node: TsNode<'t>) -> Vec<TsNode<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn all_children<'t>(node: TsNode<'t>) -> Vec<TsNode<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

fn is_comment(node: TsNode) -> bool {
    matches!(node.kind(), "line_comment" | "block_comment")
}

fn span_of(node: TsNode) -> Span {
    span_between(node, node)
}

fn span_between(first: TsNode, last: TsNode) -> Span {
    Span {
        start_line: first.start_position().row + 1,
        end_line: last.end_position().row + 1,
        start_byte: first.start_byte(),
        end_byte: last.end_byte(),
    }
}

struct Lowerer<'s> {
    source: &'s str,
    tree: SyntaxTree,
}

impl<'s> Lowerer<'s> {
    fn text(&self, node: TsNode) -> &'s str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn field_text(&self, node: TsNode, field: &str) -> Option<String> {
        node.child_by_field_name(field)
            .map(|n| self.text(n).to_string())
    }

    fn push(&mut self, parent: NodeId, ts: TsNode, kind: NodeKind) -> NodeId {
        self.tree
            .push(parent, Node::new(kind).with_span(span_of(ts)))
    }

    /// Push a node named after the `name` field of `ts`.
    fn push_named(&mut self, parent: NodeId, ts: TsNode, kind: NodeKind, field: &str) -> NodeId {
        let mut node = Node::new(kind).with_span(span_of(ts));
        if let Some(name) = ts.child_by_field_name(field) {
            node = node.with_name(self.text(name), Some(name.start_position().row + 1));
        }
        self.tree.push(parent, node)
    }

    fn set_kind(&mut self, id: NodeId, kind: NodeKind) {
        self.tree.node_mut(id).kind = kind;
    }

    fn lower_children(&mut self, ts: TsNode, parent: NodeId) {
        for child in named_children(ts) {
            self.lower(child, parent);
        }
    }

    fn lower(&mut self, ts: TsNode, parent: NodeId) -> Option<NodeId> {
        let kind = ts.kind();
        if FOLDED_KINDS.contains(&kind) {
            return None;
        }
        let id = match kind {
            "class_declaration" => self.lower_type(ts, parent, TypeKind::Class),
            "interface_declaration" => self.lower_type(ts, parent, TypeKind::Interface),
            "enum_declaration" => self.lower_type(ts, parent, TypeKind::Enum),
            "record_declaration" => self.lower_type(ts, parent, TypeKind::Record),
            "annotation_type_declaration" => self.lower_type(ts, parent, TypeKind::Annotation),
            "method_declaration" | "annotation_type_element_declaration" => {
                self.lower_callable(ts, parent, false)
            }
            "constructor_declaration" | "compact_constructor_declaration" => {
                self.lower_callable(ts, parent, true)
            }
            "field_declaration" | "constant_declaration" => self.lower_field(ts, parent),
            "local_variable_declaration" => {
                let stmt = self.push(parent, ts, NodeKind::Statement(StmtKind::LocalVariable));
                self.lower_declarators(ts, stmt);
                stmt
            }
            "resource" => self.lower_resource(ts, parent),
            "block" | "constructor_body" => {
                let block = self.push(parent, ts, NodeKind::Block);
                self.lower_children(ts, block);
                block
            }
            "static_initializer" => {
                let init = self.push(parent, ts, NodeKind::Other("initializer".to_string()));
                self.lower_children(ts, init);
                init
            }
            "enum_constant" => {
                let constant =
                    self.push_named(parent, ts, NodeKind::Other(kind.to_string()), "name");
                self.attach_comment(ts, constant);
                self.lower_children(ts, constant);
                constant
            }
            "annotation" | "marker_annotation" => self.lower_annotation(ts, parent),
            _ if kind.ends_with("_statement") => self.lower_statement(ts, parent),
            _ => self.lower_expression(ts, parent),
        };
        Some(id)
    }

    fn lower_modifiers(&mut self, ts: TsNode, decl: NodeId) {
        let Some(modifiers) = all_children(ts).into_iter().find(|c| c.kind() == "modifiers")
        else {
            return;
        };
        for child in all_children(modifiers) {
            match child.kind() {
                "annotation" | "marker_annotation" => {
                    self.lower_annotation(child, decl);
                }
                keyword => {
                    if let Some(m) = Modifier::parse(keyword) {
                        self.tree.node_mut(decl).modifiers.push(m);
                    }
                }
            }
        }
    }

    /// Attach the comment directly above a declaration. A comment that
    /// trails another node on the same line belongs to that node instead.
    fn attach_comment(&mut self, ts: TsNode, decl: NodeId) {
        let Some(prev) = ts.prev_sibling() else {
            return;
        };
        if !is_comment(prev) {
            return;
        }
        if let Some(before) = prev.prev_sibling() {
            if !is_comment(before) && before.end_position().row == prev.start_position().row {
                return;
            }
        }
        self.tree.node_mut(decl).comment = Some(Comment {
            text: self.text(prev).to_string(),
            line: prev.start_position().row + 1,
        });
    }

    fn type_names(&self, ts: TsNode) -> Vec<String> {
        let mut names = Vec::new();
        for child in named_children(ts) {
            if child.kind() == "type_list" {
                names.extend(self.type_names(child));
            } else {
                names.push(self.text(child).to_string());
            }
        }
        names
    }

    fn lower_type(&mut self, ts: TsNode, parent: NodeId, kind: TypeKind) -> NodeId {
        let mut decl = TypeDecl::new(kind);
        for child in named_children(ts) {
            match child.kind() {
                "type_parameters" => decl.type_params = Some(self.text(child).to_string()),
                "superclass" | "extends_interfaces" => decl.extends.extend(self.type_names(child)),
                "super_interfaces" => decl.implements.extend(self.type_names(child)),
                _ => {}
            }
        }

        let id = self.push_named(parent, ts, NodeKind::Type(decl), "name");
        self.lower_modifiers(ts, id);
        self.attach_comment(ts, id);

        if let Some(body) = ts.child_by_field_name("body") {
            self.lower_type_body(body, id);
        }
        id
    }

    fn lower_type_body(&mut self, body: TsNode, type_id: NodeId) {
        for member in named_children(body) {
            match member.kind() {
                "enum_body_declarations" => self.lower_type_body(member, type_id),
                "block" => {
                    let init =
                        self.push(type_id, member, NodeKind::Other("initializer".to_string()));
                    self.lower(member, init);
                }
                _ => {
                    self.lower(member, type_id);
                }
            }
        }
    }

    fn lower_callable(&mut self, ts: TsNode, parent: NodeId, constructor: bool) -> NodeId {
        let mut decl = MethodDecl {
            return_type: if constructor {
                None
            } else {
                self.field_text(ts, "type")
            },
            ..MethodDecl::default()
        };
        for child in named_children(ts) {
            match child.kind() {
                "type_parameters" => decl.type_params = Some(self.text(child).to_string()),
                "formal_parameters" => decl.params = self.params(child),
                "throws" => decl.throws = self.type_names(child),
                _ => {}
            }
        }

        let kind = if constructor {
            NodeKind::Constructor(decl)
        } else {
            NodeKind::Method(decl)
        };
        let id = self.push_named(parent, ts, kind, "name");
        self.lower_modifiers(ts, id);
        self.attach_comment(ts, id);

        if let Some(body) = ts.child_by_field_name("body") {
            let block = self.lower(body, id);
            if let NodeKind::Method(m) | NodeKind::Constructor(m) = &mut self.tree.node_mut(id).kind
            {
                m.body = block;
            }
        }
        id
    }

    fn params(&self, list: TsNode) -> Vec<Param> {
        let mut params = Vec::new();
        for param in named_children(list) {
            match param.kind() {
                "formal_parameter" => params.push(Param {
                    ty: self.field_text(param, "type").unwrap_or_default(),
                    name: self.field_text(param, "name").unwrap_or_default(),
                }),
                "spread_parameter" => {
                    let mut ty = String::new();
                    let mut name = String::new();
                    for part in named_children(param) {
                        match part.kind() {
                            "modifiers" => {}
                            "variable_declarator" => {
                                name = self.field_text(part, "name").unwrap_or_default();
                            }
                            _ if ty.is_empty() => ty = format!("{}...", self.text(part)),
                            _ => {}
                        }
                    }
                    params.push(Param { ty, name });
                }
                _ => {}
            }
        }
        params
    }

    fn lower_field(&mut self, ts: TsNode, parent: NodeId) -> NodeId {
        let ty = self.field_text(ts, "type").unwrap_or_default();
        let id = self.push(parent, ts, NodeKind::Field { ty });
        self.lower_modifiers(ts, id);
        self.attach_comment(ts, id);
        self.lower_declarators(ts, id);
        id
    }

    fn lower_declarators(&mut self, ts: TsNode, owner: NodeId) {
        let ty = self.field_text(ts, "type").unwrap_or_default();
        let declarators: Vec<TsNode> = {
            let mut cursor = ts.walk();
            ts.children_by_field_name("declarator", &mut cursor)
                .collect()
        };
        for declarator in declarators {
            // C-style array declarators: `int counts[]` has type `int[]`.
            let ty = match self.field_text(declarator, "dimensions") {
                Some(dims) => format!("{}{}", ty, dims),
                None => ty.clone(),
            };
            let var = self.push_named(
                owner,
                declarator,
                NodeKind::Variable {
                    ty: ty.clone(),
                    initializer: None,
                },
                "name",
            );
            if let Some(value) = declarator.child_by_field_name("value") {
                let init = self.lower(value, var);
                self.set_kind(var, NodeKind::Variable { ty, initializer: init });
            }
        }
    }

    fn lower_resource(&mut self, ts: TsNode, parent: NodeId) -> NodeId {
        let Some(ty) = self.field_text(ts, "type") else {
            return self.lower_expression(ts, parent);
        };
        let var = self.push_named(
            parent,
            ts,
            NodeKind::Variable {
                ty: ty.clone(),
                initializer: None,
            },
            "name",
        );
        if let Some(value) = ts.child_by_field_name("value") {
            let init = self.lower(value, var);
            self.set_kind(
                var,
                NodeKind::Variable {
                    ty,
                    initializer: init,
                },
            );
        }
        var
    }

    fn lower_statement(&mut self, ts: TsNode, parent: NodeId) -> NodeId {
        let kind = match ts.kind() {
            "for_statement" => StmtKind::For,
            "enhanced_for_statement" => StmtKind::ForEach,
            "while_statement" => StmtKind::While,
            "do_statement" => StmtKind::Do,
            "throw_statement" => StmtKind::Throw { expr: None },
            "return_statement" => StmtKind::Return { expr: None },
            "synchronized_statement" => StmtKind::Synchronized {
                lock: None,
                body: None,
            },
            "expression_statement" => StmtKind::Expression,
            "if_statement" => StmtKind::If,
            "try_statement" | "try_with_resources_statement" => StmtKind::Try,
            _ => StmtKind::Other,
        };
        let id = self.push(parent, ts, NodeKind::Statement(kind.clone()));

        match kind {
            StmtKind::ForEach => self.lower_foreach(ts, id),
            StmtKind::Throw { .. } | StmtKind::Return { .. } => {
                let mut expr = None;
                for child in named_children(ts) {
                    let lowered = self.lower(child, id);
                    if expr.is_none() {
                        expr = lowered;
                    }
                }
                let kind = match kind {
                    StmtKind::Throw { .. } => StmtKind::Throw { expr },
                    _ => StmtKind::Return { expr },
                };
                self.set_kind(id, NodeKind::Statement(kind));
            }
            StmtKind::Synchronized { .. } => {
                let mut lock = None;
                let mut body = None;
                for child in named_children(ts) {
                    match child.kind() {
                        "parenthesized_expression" => {
                            if let Some(inner) =
                                named_children(child).into_iter().find(|n| !is_comment(*n))
                            {
                                lock = self.lower(inner, id);
                            }
                        }
                        "block" => body = self.lower(child, id),
                        _ => {
                            self.lower(child, id);
                        }
                    }
                }
                self.set_kind(id, NodeKind::Statement(StmtKind::Synchronized { lock, body }));
            }
            _ => self.lower_children(ts, id),
        }
        id
    }

    fn lower_foreach(&mut self, ts: TsNode, stmt: NodeId) {
        if let (Some(ty), Some(name)) = (
            ts.child_by_field_name("type"),
            ts.child_by_field_name("name"),
        ) {
            let node = Node::new(NodeKind::Variable {
                ty: self.text(ty).to_string(),
                initializer: None,
            })
            .with_name(self.text(name), Some(name.start_position().row + 1))
            .with_span(span_between(ty, name));
            self.tree.push(stmt, node);
        }
        if let Some(value) = ts.child_by_field_name("value") {
            self.lower(value, stmt);
        }
        if let Some(body) = ts.child_by_field_name("body") {
            self.lower(body, stmt);
        }
    }

    fn lower_arguments(&mut self, ts: TsNode, owner: NodeId) -> Vec<NodeId> {
        let Some(arguments) = ts.child_by_field_name("arguments") else {
            return Vec::new();
        };
        named_children(arguments)
            .into_iter()
            .filter_map(|arg| self.lower(arg, owner))
            .collect()
    }

    fn lower_expression(&mut self, ts: TsNode, parent: NodeId) -> NodeId {
        let kind = ts.kind();
        match kind {
            "method_invocation" => {
                let id = self.push_named(
                    parent,
                    ts,
                    NodeKind::Expression(ExprKind::MethodCall {
                        receiver: None,
                        args: Vec::new(),
                    }),
                    "name",
                );
                let receiver = ts
                    .child_by_field_name("object")
                    .and_then(|object| self.lower(object, id));
                let args = self.lower_arguments(ts, id);
                self.set_kind(id, NodeKind::Expression(ExprKind::MethodCall { receiver, args }));
                id
            }
            "object_creation_expression" => {
                let ty = self.field_text(ts, "type").unwrap_or_default();
                let id = self.push(
                    parent,
                    ts,
                    NodeKind::Expression(ExprKind::ObjectCreation {
                        ty: ty.clone(),
                        args: Vec::new(),
                    }),
                );
                let args = self.lower_arguments(ts, id);
                for child in named_children(ts) {
                    if child.kind() == "class_body" {
                        self.lower_type_body(child, id);
                    }
                }
                self.set_kind(id, NodeKind::Expression(ExprKind::ObjectCreation { ty, args }));
                id
            }
            "binary_expression" | "assignment_expression" => {
                let id = self.push(parent, ts, NodeKind::Expression(ExprKind::Other));
                let left = ts
                    .child_by_field_name("left")
                    .and_then(|n| self.lower(n, id));
                let right = ts
                    .child_by_field_name("right")
                    .and_then(|n| self.lower(n, id));
                let operator = ts.child_by_field_name("operator");
                let op = operator.map(|o| self.text(o).to_string()).unwrap_or_default();
                if let (Some(left), Some(right)) = (left, right) {
                    let expr = if kind == "binary_expression" {
                        ExprKind::Binary {
                            op,
                            op_line: operator.map(|o| o.start_position().row + 1),
                            left,
                            right,
                        }
                    } else {
                        ExprKind::Assignment {
                            op,
                            target: left,
                            value: right,
                        }
                    };
                    self.set_kind(id, NodeKind::Expression(expr));
                }
                id
            }
            "identifier" => {
                let node = Node::new(NodeKind::Expression(ExprKind::Name))
                    .with_name(self.text(ts), Some(ts.start_position().row + 1))
                    .with_span(span_of(ts));
                self.tree.push(parent, node)
            }
            "field_access" => {
                let id = self.push_named(
                    parent,
                    ts,
                    NodeKind::Expression(ExprKind::FieldAccess { object: None }),
                    "field",
                );
                let object = ts
                    .child_by_field_name("object")
                    .and_then(|n| self.lower(n, id));
                self.set_kind(id, NodeKind::Expression(ExprKind::FieldAccess { object }));
                id
            }
            "string_literal" | "text_block" => {
                let value = unquote(self.text(ts));
                self.push(parent, ts, NodeKind::Expression(ExprKind::StringLiteral { value }))
            }
            "class_literal" => {
                let ty = named_children(ts)
                    .first()
                    .map(|n| self.text(*n).to_string())
                    .unwrap_or_default();
                self.push(parent, ts, NodeKind::Expression(ExprKind::ClassLiteral { ty }))
            }
            "parenthesized_expression" => {
                let id = self.push(
                    parent,
                    ts,
                    NodeKind::Expression(ExprKind::Parenthesized { inner: None }),
                );
                let mut inner = None;
                for child in named_children(ts) {
                    let lowered = self.lower(child, id);
                    if inner.is_none() {
                        inner = lowered;
                    }
                }
                self.set_kind(id, NodeKind::Expression(ExprKind::Parenthesized { inner }));
                id
            }
            "lambda_expression" => {
                let id = self.push(parent, ts, NodeKind::Expression(ExprKind::Lambda));
                if let Some(body) = ts.child_by_field_name("body") {
                    self.lower(body, id);
                }
                id
            }
            "array_initializer" | "element_value_array_initializer" => {
                let id = self.push(parent, ts, NodeKind::Expression(ExprKind::ArrayInitializer));
                self.lower_children(ts, id);
                id
            }
            _ if LITERAL_KINDS.contains(&kind) => {
                self.push(parent, ts, NodeKind::Expression(ExprKind::Literal))
            }
            _ if kind.ends_with("_expression") || matches!(kind, "this" | "super" | "array_access") => {
                let id = self.push(parent, ts, NodeKind::Expression(ExprKind::Other));
                self.lower_children(ts, id);
                id
            }
            _ => {
                let id = self.push(parent, ts, NodeKind::Other(kind.to_string()));
                self.lower_children(ts, id);
                id
            }
        }
    }

    fn lower_annotation(&mut self, ts: TsNode, parent: NodeId) -> NodeId {
        let mut node = Node::new(NodeKind::Annotation(AnnotationArgs::None)).with_span(span_of(ts));
        if let Some(name) = ts.child_by_field_name("name") {
            let text = self.text(name);
            let simple = text.rsplit('.').next().unwrap_or(text);
            node = node.with_name(simple, Some(name.start_position().row + 1));
        }
        let id = self.tree.push(parent, node);

        let Some(arguments) = ts.child_by_field_name("arguments") else {
            return id;
        };
        let values: Vec<TsNode> = named_children(arguments)
            .into_iter()
            .filter(|n| !is_comment(*n))
            .collect();
        let args = if values.iter().any(|v| v.kind() == "element_value_pair") {
            let mut pairs = Vec::new();
            for pair in values {
                let key = self.field_text(pair, "key").unwrap_or_default();
                if let Some(value) = pair
                    .child_by_field_name("value")
                    .and_then(|v| self.lower(v, id))
                {
                    pairs.push((key, value));
                }
            }
            AnnotationArgs::Pairs(pairs)
        } else {
            match values.first().and_then(|v| self.lower(*v, id)) {
                Some(value) => AnnotationArgs::Single(value),
                None => AnnotationArgs::None,
            }
        };
        self.set_kind(id, NodeKind::Annotation(args));
        id
    }
}

/// Value of a string literal or text block with escapes resolved.
fn unquote(raw: &str) -> String {
    match raw.strip_prefix("\"\"\"") {
        Some(body) => {
            let body = body.strip_suffix("\"\"\"").unwrap_or(body);
            let body = body.split_once('\n').map(|(_, rest)| rest).unwrap_or("");
            unescape(&strip_incidental_indent(body))
        }
        None => {
            let body = raw.strip_prefix('"').unwrap_or(raw);
            unescape(body.strip_suffix('"').unwrap_or(body))
        }
    }
}

/// Text block content with the common leading whitespace removed and
/// trailing whitespace stripped from every line. A closing delimiter on its
/// own line takes part in the common indentation.
fn strip_incidental_indent(body: &str) -> String {
    let lines: Vec<&str> = body.split('\n').collect();
    let last = lines.len() - 1;
    let indent = lines
        .iter()
        .enumerate()
        .filter(|(i, line)| *i == last || !line.trim().is_empty())
        .map(|(_, line)| line.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                return String::new();
            }
            line.chars().skip(indent).collect::<String>().trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decode Java escape sequences, including `\uXXXX` (any number of `u`s)
/// and octal escapes.
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    let mut pending_high: Option<u32> = None;

    while let Some(c) = chars.next() {
        if c != '\\' {
            flush_surrogate(&mut out, &mut pending_high);
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            flush_surrogate(&mut out, &mut pending_high);
            out.push('\\');
            break;
        };
        if next == 'u' {
            while chars.peek() == Some(&'u') {
                chars.next();
            }
            let hex: String = chars.clone().take(4).collect();
            let code = match u32::from_str_radix(&hex, 16) {
                Ok(code) if hex.len() == 4 && hex.chars().all(|h| h.is_ascii_hexdigit()) => code,
                _ => {
                    flush_surrogate(&mut out, &mut pending_high);
                    out.push_str("\\u");
                    continue;
                }
            };
            for _ in 0..4 {
                chars.next();
            }
            match (pending_high.take(), code) {
                (Some(high), 0xDC00..=0xDFFF) => {
                    let combined = 0x10000 + ((high - 0xD800) << 10) + (code - 0xDC00);
                    out.push(char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
                (high, 0xD800..=0xDBFF) => {
                    if high.is_some() {
                        out.push(char::REPLACEMENT_CHARACTER);
                    }
                    pending_high = Some(code);
                }
                (high, _) => {
                    if high.is_some() {
                        out.push(char::REPLACEMENT_CHARACTER);
                    }
                    out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
            }
            continue;
        }

        flush_surrogate(&mut out, &mut pending_high);
        match next {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            's' => out.push(' '),
            '\n' => {}
            '0'..='7' => {
                // Three digits only when the first is 0-3.
                let max_digits = if next <= '3' { 3 } else { 2 };
                let mut value = next.to_digit(8).unwrap_or(0);
                for _ in 1..max_digits {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            other => out.push(other),
        }
    }
    flush_surrogate(&mut out, &mut pending_high);
    out
}

/// A high surrogate with no low half becomes U+FFFD.
fn flush_surrogate(out: &mut String, pending_high: &mut Option<u32>) {
    if pending_high.take().is_some() {
        out.push(char::REPLACEMENT_CHARACTER);
    }
}
