//! Language front ends that turn source text into a [`SyntaxTree`].

mod java;

pub use java::JavaFrontend;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::ast::SyntaxTree;

/// Errors raised while turning source text into a tree.
#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("failed to load grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    #[error("parser produced no tree for {0}")]
    NoTree(String),

    #[error("{path}: {errors} syntax error(s), first at line {first_line}")]
    Syntax {
        path: String,
        errors: usize,
        first_line: usize,
    },
}

/// One parsed source file handed to the engine.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub tree: SyntaxTree,
}

impl SourceUnit {
    pub fn path_str(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}

/// A language front end.
///
/// Implementations must be cheap to share across threads; parser state that
/// is not `Sync` is created per call.
pub trait Frontend: Send + Sync {
    /// Language identifier, e.g. "java".
    fn language_id(&self) -> &'static str;

    /// File extensions handled, without the dot.
    fn file_extensions(&self) -> &'static [&'static str];

    /// Parse `source` into a tree.
    ///
    /// Files with syntax errors are rejected unless the front end was built
    /// to tolerate them.
    fn parse(&self, path: &Path, source: &str) -> Result<SourceUnit, FrontendError>;

    fn handles(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.file_extensions().contains(&ext))
            .unwrap_or(false)
    }
}
