//! Core types for extraction results.

use serde::{Deserialize, Serialize};

use crate::ast::UNKNOWN_LINE;
use crate::rules::Rule;

/// What a detector reports: a location, the code and the thing it is about.
/// The engine combines it with the driving rule into a [`Snippet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub line: i64,
    pub code: String,
    pub subject: String,
}

impl Finding {
    pub fn new(line: i64, code: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            line,
            code: code.into(),
            subject: subject.into(),
        }
    }

    /// A finding without position data.
    pub fn unplaced(code: impl Into<String>, subject: impl Into<String>) -> Self {
        Self::new(UNKNOWN_LINE, code, subject)
    }
}

/// One extracted, rule-annotated code fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub rule_id: String,
    pub rule_scope: String,
    pub rule_description: String,
    pub rule_criteria: String,
    pub rule_context: String,
    pub file_path: String,
    /// 1-based, -1 when unknown.
    pub line: i64,
    pub code: String,
    pub subject_name: String,
}

impl Snippet {
    pub fn from_finding(rule: &Rule, file_path: &str, finding: Finding) -> Self {
        Self {
            rule_id: rule.id.clone(),
            rule_scope: rule.scope.clone(),
            rule_description: rule.description.clone(),
            rule_criteria: rule.criteria.clone(),
            rule_context: rule.context.clone(),
            file_path: file_path.to_string(),
            line: finding.line,
            code: finding.code,
            subject_name: finding.subject,
        }
    }
}

/// Append-only sink for the snippets of one source unit.
#[derive(Debug, Default)]
pub struct Collector {
    snippets: Vec<Snippet>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, snippet: Snippet) {
        self.snippets.push(snippet);
    }

    pub fn extend<I: IntoIterator<Item = Snippet>>(&mut self, snippets: I) {
        self.snippets.extend(snippets);
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    pub fn into_snippets(self) -> Vec<Snippet> {
        self.snippets
    }
}

/// A file that could not be processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

/// Results of an extraction run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub snippets: Vec<Snippet>,
    /// Number of files extracted from
    pub scanned: usize,
    #[serde(default)]
    pub skipped: Vec<SkippedFile>,
}

impl ExtractionResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the snippets of one more file.
    pub fn add_file(&mut self, snippets: Vec<Snippet>) {
        self.snippets.extend(snippets);
        self.scanned += 1;
    }

    pub fn add_skipped(&mut self, path: impl Into<String>, reason: impl Into<String>) {
        self.skipped.push(SkippedFile {
            path: path.into(),
            reason: reason.into(),
        });
    }

    /// Snippet count per rule id, in first-seen order.
    pub fn counts_by_rule(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for snippet in &self.snippets {
            match counts.iter_mut().find(|(id, _)| *id == snippet.rule_id) {
                Some((_, n)) => *n += 1,
                None => counts.push((snippet.rule_id.clone(), 1)),
            }
        }
        counts
    }
}
