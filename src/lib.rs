//! rulesnip - rule-driven extraction of annotated Java code snippets.
//!
//! A rule set names node kinds (class declarations, throw statements, log
//! calls, ...) and carries review criteria. rulesnip parses Java sources,
//! walks every node, and hands each node to the detectors bound to the
//! matching rules. Every finding becomes a [`Snippet`]: the code, a subject
//! and the rule it was extracted for.
//!
//! # Architecture
//!
//! - `frontend`: parses source files into a [`SyntaxTree`] (tree-sitter-java)
//! - `ast`: the language-neutral arena tree detectors work on
//! - `rules`: rule set schema, YAML/CSV loading and validation
//! - `detect`: detectors, the rule-to-detector registry, the engine and the runner
//! - `signature`, `javadoc`, `tokenize`: text helpers shared by detectors
//! - `report`: output formatting (JSON, pretty)
//!
//! # Adding a Detector
//!
//! Implement [`Detector`], register it with [`DetectorRegistry::register`]
//! and bind it to rule ids with [`DetectorRegistry::bind`] or the
//! `settings.bindings` table of a rule file.

pub mod ast;
pub mod cli;
pub mod detect;
pub mod frontend;
pub mod javadoc;
pub mod report;
pub mod rules;
pub mod signature;
pub mod tokenize;

pub use ast::SyntaxTree;
pub use detect::{Detector, DetectorRegistry, Engine, ExtractionResult, Runner, Snippet};
pub use frontend::{Frontend, JavaFrontend, SourceUnit};
pub use rules::{Rule, RuleSet, ScopeTag, Settings};
