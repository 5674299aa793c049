//! Node kinds and their payloads.

use super::NodeId;

/// Closed set of node kinds the engine understands.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    CompilationUnit,
    Type(TypeDecl),
    Method(MethodDecl),
    /// Constructor; `return_type` is always `None`.
    Constructor(MethodDecl),
    /// Field declaration; its children include one `Variable` per declarator.
    Field { ty: String },
    /// Variable declarator of a field, local or loop variable.
    Variable {
        ty: String,
        initializer: Option<NodeId>,
    },
    Block,
    Statement(StmtKind),
    Expression(ExprKind),
    Annotation(AnnotationArgs),
    /// Anything the front end does not model, tagged with its grammar name.
    Other(String),
}

impl NodeKind {
    pub fn is_type(&self) -> bool {
        matches!(self, NodeKind::Type(_))
    }

    pub fn is_method(&self) -> bool {
        matches!(self, NodeKind::Method(_))
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, NodeKind::Method(_) | NodeKind::Constructor(_))
    }

    pub fn is_loop(&self) -> bool {
        matches!(
            self,
            NodeKind::Statement(StmtKind::For | StmtKind::ForEach | StmtKind::While | StmtKind::Do)
        )
    }

    pub fn is_statement(&self) -> bool {
        matches!(self, NodeKind::Statement(_))
    }

    pub fn is_block(&self) -> bool {
        matches!(self, NodeKind::Block)
    }

    /// Whether the kind is a member of a type body.
    pub fn is_member(&self) -> bool {
        match self {
            NodeKind::Type(_)
            | NodeKind::Method(_)
            | NodeKind::Constructor(_)
            | NodeKind::Field { .. } => true,
            NodeKind::Other(grammar) => grammar == "initializer" || grammar == "enum_constant",
            NodeKind::CompilationUnit
            | NodeKind::Variable { .. }
            | NodeKind::Block
            | NodeKind::Statement(_)
            | NodeKind::Expression(_)
            | NodeKind::Annotation(_) => false,
        }
    }

    pub fn method(&self) -> Option<&MethodDecl> {
        match self {
            NodeKind::Method(m) | NodeKind::Constructor(m) => Some(m),
            _ => None,
        }
    }

    pub fn type_decl(&self) -> Option<&TypeDecl> {
        match self {
            NodeKind::Type(t) => Some(t),
            _ => None,
        }
    }

    pub fn expr(&self) -> Option<&ExprKind> {
        match self {
            NodeKind::Expression(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

impl TypeKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Record => "record",
            TypeKind::Annotation => "@interface",
        }
    }

    /// Class or interface, the kinds with free-form member lists.
    pub fn is_class_or_interface(&self) -> bool {
        matches!(self, TypeKind::Class | TypeKind::Interface)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub kind: TypeKind,
    /// Type parameter list including brackets, e.g. `<K, V>`.
    pub type_params: Option<String>,
    pub extends: Vec<String>,
    pub implements: Vec<String>,
}

impl TypeDecl {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            type_params: None,
            extends: Vec::new(),
            implements: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodDecl {
    pub return_type: Option<String>,
    pub type_params: Option<String>,
    pub params: Vec<Param>,
    pub throws: Vec<String>,
    pub body: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub ty: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    For,
    ForEach,
    While,
    Do,
    Throw {
        expr: Option<NodeId>,
    },
    Return {
        expr: Option<NodeId>,
    },
    Synchronized {
        lock: Option<NodeId>,
        body: Option<NodeId>,
    },
    Expression,
    LocalVariable,
    If,
    Try,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Method call; the node name is the method name.
    MethodCall {
        receiver: Option<NodeId>,
        args: Vec<NodeId>,
    },
    ObjectCreation {
        ty: String,
        args: Vec<NodeId>,
    },
    Binary {
        op: String,
        op_line: Option<usize>,
        left: NodeId,
        right: NodeId,
    },
    Assignment {
        op: String,
        target: NodeId,
        value: NodeId,
    },
    /// Simple name; the node name is the identifier.
    Name,
    /// `object.field`; the node name is the field.
    FieldAccess {
        object: Option<NodeId>,
    },
    /// String literal with escapes resolved.
    StringLiteral {
        value: String,
    },
    Literal,
    ClassLiteral {
        ty: String,
    },
    Parenthesized {
        inner: Option<NodeId>,
    },
    Lambda,
    ArrayInitializer,
    Other,
}

impl ExprKind {
    pub fn is_literal(&self) -> bool {
        matches!(self, ExprKind::StringLiteral { .. } | ExprKind::Literal)
    }
}

/// Arguments of an annotation. Values are expression nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationArgs {
    None,
    Single(NodeId),
    Pairs(Vec<(String, NodeId)>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Static,
    Abstract,
    Final,
    Native,
    Synchronized,
    Transient,
    Volatile,
    Strictfp,
    Default,
    Sealed,
    NonSealed,
}

impl Modifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Static => "static",
            Modifier::Abstract => "abstract",
            Modifier::Final => "final",
            Modifier::Native => "native",
            Modifier::Synchronized => "synchronized",
            Modifier::Transient => "transient",
            Modifier::Volatile => "volatile",
            Modifier::Strictfp => "strictfp",
            Modifier::Default => "default",
            Modifier::Sealed => "sealed",
            Modifier::NonSealed => "non-sealed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "public" => Some(Modifier::Public),
            "protected" => Some(Modifier::Protected),
            "private" => Some(Modifier::Private),
            "static" => Some(Modifier::Static),
            "abstract" => Some(Modifier::Abstract),
            "final" => Some(Modifier::Final),
            "native" => Some(Modifier::Native),
            "synchronized" => Some(Modifier::Synchronized),
            "transient" => Some(Modifier::Transient),
            "volatile" => Some(Modifier::Volatile),
            "strictfp" => Some(Modifier::Strictfp),
            "default" => Some(Modifier::Default),
            "sealed" => Some(Modifier::Sealed),
            "non-sealed" => Some(Modifier::NonSealed),
            _ => None,
        }
    }

    pub fn is_access(&self) -> bool {
        matches!(
            self,
            Modifier::Public | Modifier::Protected | Modifier::Private
        )
    }
}

impl std::fmt::Display for Modifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A source comment attached to the declaration that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Raw text including delimiters.
    pub text: String,
    /// 1-based line the comment opens on.
    pub line: usize,
}

impl Comment {
    pub fn is_javadoc(&self) -> bool {
        self.text.starts_with("/**") && self.text != "/**/"
    }

    /// Text between the delimiters.
    pub fn content(&self) -> &str {
        let text = self.text.as_str();
        if let Some(rest) = text.strip_prefix("//") {
            return rest;
        }
        let inner = text.strip_prefix("/**").or_else(|| text.strip_prefix("/*"));
        match inner {
            Some(inner) => inner.strip_suffix("*/").unwrap_or(inner),
            None => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_content() {
        let doc = Comment {
            text: "/** Summary. */".to_string(),
            line: 3,
        };
        assert!(doc.is_javadoc());
        assert_eq!(doc.content(), " Summary. ");

        let block = Comment {
            text: "/* plain */".to_string(),
            line: 1,
        };
        assert!(!block.is_javadoc());
        assert_eq!(block.content(), " plain ");

        let line = Comment {
            text: "// note".to_string(),
            line: 1,
        };
        assert_eq!(line.content(), " note");
    }

    #[test]
    fn test_modifier_roundtrip_names() {
        assert_eq!(Modifier::parse("non-sealed"), Some(Modifier::NonSealed));
        assert_eq!(Modifier::parse("volatile").map(|m| m.as_str()), Some("volatile"));
        assert!(Modifier::parse("@Override").is_none());
        assert!(Modifier::Private.is_access());
        assert!(!Modifier::Final.is_access());
    }

    #[test]
    fn test_loop_kinds() {
        assert!(NodeKind::Statement(StmtKind::ForEach).is_loop());
        assert!(!NodeKind::Statement(StmtKind::If).is_loop());
        assert!(NodeKind::Field { ty: "int".into() }.is_member());
        assert!(!NodeKind::Block.is_member());
    }
}
