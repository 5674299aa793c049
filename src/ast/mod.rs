//! Language-neutral syntax tree consumed by the extraction engine.
//!
//! The tree is an arena: every node lives in one `Vec` and refers to its
//! parent and children by [`NodeId`]. Front ends build it once per source
//! file; detectors only ever read it.

mod kinds;

pub use kinds::{
    AnnotationArgs, Comment, ExprKind, MethodDecl, Modifier, NodeKind, Param, StmtKind, TypeDecl,
    TypeKind,
};

/// Line reported when a node carries no position data.
pub const UNKNOWN_LINE: i64 = -1;

/// Index of a node inside its [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Source range of a node. Lines are 1-based, bytes index into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start_line: usize,
    pub end_line: usize,
    pub start_byte: usize,
    pub end_byte: usize,
}

impl Span {
    pub fn is_single_line(&self) -> bool {
        self.start_line == self.end_line
    }
}

/// A declared name and the line it appears on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub text: String,
    pub line: Option<usize>,
}

/// One node of the tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub name: Option<Ident>,
    pub modifiers: Vec<Modifier>,
    pub span: Option<Span>,
    /// Comment directly preceding the node, javadoc or not.
    pub comment: Option<Comment>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            name: None,
            modifiers: Vec::new(),
            span: None,
            comment: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_name(mut self, text: impl Into<String>, line: Option<usize>) -> Self {
        self.name = Some(Ident {
            text: text.into(),
            line,
        });
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn name(&self) -> &str {
        self.name.as_ref().map(|n| n.text.as_str()).unwrap_or("")
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    /// The javadoc comment attached to this node, if any.
    pub fn javadoc(&self) -> Option<&Comment> {
        self.comment.as_ref().filter(|c| c.is_javadoc())
    }
}

/// Arena-backed syntax tree for one source file.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: String,
    nodes: Vec<Node>,
}

impl SyntaxTree {
    /// Create a tree whose root is a compilation unit spanning `source`.
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let lines = source.lines().count().max(1);
        let root = Node::new(NodeKind::CompilationUnit).with_span(Span {
            start_line: 1,
            end_line: lines,
            start_byte: 0,
            end_byte: source.len(),
        });
        Self {
            source,
            nodes: vec![root],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Append `node` as the last child of `parent`.
    pub fn push(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Source text covered by the node, or "" when it has no span.
    pub fn text(&self, id: NodeId) -> &str {
        match self.nodes[id.0].span {
            Some(span) => self.source.get(span.start_byte..span.end_byte).unwrap_or(""),
            None => "",
        }
    }

    /// First line of the node, or [`UNKNOWN_LINE`].
    pub fn line(&self, id: NodeId) -> i64 {
        self.nodes[id.0]
            .span
            .map(|s| s.start_line as i64)
            .unwrap_or(UNKNOWN_LINE)
    }

    /// Last line of the node, or [`UNKNOWN_LINE`].
    pub fn end_line(&self, id: NodeId) -> i64 {
        self.nodes[id.0]
            .span
            .map(|s| s.end_line as i64)
            .unwrap_or(UNKNOWN_LINE)
    }

    /// Line of the declared name, falling back to the node's first line.
    pub fn name_line(&self, id: NodeId) -> i64 {
        let node = &self.nodes[id.0];
        match node.name.as_ref().and_then(|n| n.line) {
            Some(line) => line as i64,
            None => self.line(id),
        }
    }

    /// Strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Nearest strict ancestor satisfying `pred`.
    pub fn find_ancestor<F>(&self, id: NodeId, pred: F) -> Option<NodeId>
    where
        F: Fn(&NodeKind) -> bool,
    {
        self.ancestors(id).find(|a| pred(self.kind(*a)))
    }

    /// Strict descendants of `id` in pre-order.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    /// Every node of the tree in pre-order, root first.
    pub fn preorder(&self) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::once(self.root()).chain(self.descendants(self.root()))
    }

    /// Nearest enclosing type declaration.
    pub fn enclosing_type(&self, id: NodeId) -> Option<NodeId> {
        self.find_ancestor(id, |k| matches!(k, NodeKind::Type(_)))
    }

    /// Nearest enclosing method declaration.
    pub fn enclosing_method(&self, id: NodeId) -> Option<NodeId> {
        self.find_ancestor(id, |k| matches!(k, NodeKind::Method(_)))
    }

    /// Nearest enclosing method or constructor.
    pub fn enclosing_callable(&self, id: NodeId) -> Option<NodeId> {
        self.find_ancestor(id, |k| k.is_callable())
    }

    /// Direct members of a type declaration, in declaration order.
    pub fn members(&self, type_id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(type_id)
            .iter()
            .copied()
            .filter(move |c| self.kind(*c).is_member())
    }
}

pub struct Ancestors<'a> {
    tree: &'a SyntaxTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

pub struct Descendants<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(current).iter().rev().copied());
        Some(current)
    }
}

/// Strip generic arguments, array brackets and package qualification from a
/// type: `java.util.List<String>` becomes `List`.
pub fn simple_type_name(ty: &str) -> &str {
    let base = ty.split('<').next().unwrap_or(ty);
    let base = base.split('[').next().unwrap_or(base).trim();
    base.rsplit('.').next().unwrap_or(base).trim()
}
