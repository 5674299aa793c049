//! Rule set schema and loading.
//!
//! A rule set is a list of rules plus optional engine settings. It is read
//! from YAML (a mapping with `rules:` and `settings:`, or a bare list of
//! rules) or from the legacy CSV layout
//! `RuleID,Scope,Description,Criteria,Context`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::ast::{NodeKind, StmtKind, TypeKind};

/// Errors raised while loading or validating a rule set.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("failed to read rule file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid rule file {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("rule {rule}: unknown scope tag {tag:?}")]
    UnknownScope { rule: String, tag: String },

    #[error("binding for {rule} names unknown detector {detector:?}")]
    UnknownDetector { rule: String, detector: String },

    #[error("invalid excluded_paths pattern {pattern:?}: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// Category of node kinds a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeTag {
    ClassDeclaration,
    MethodDeclaration,
    VariableDeclaration,
    FieldDeclaration,
    Javadoc,
    /// Legacy javadoc tag limited to type declarations.
    ClassJavadoc,
    /// Legacy javadoc tag limited to method declarations.
    MethodJavadoc,
    ThrowDeclaration,
    LockDeclaration,
    LogDeclaration,
    LongStatementDeclaration,
    ThreadDeclaration,
}

impl ScopeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeTag::ClassDeclaration => "CLASS_DECLARATION",
            ScopeTag::MethodDeclaration => "METHOD_DECLARATION",
            ScopeTag::VariableDeclaration => "VARIABLE_DECLARATION",
            ScopeTag::FieldDeclaration => "FIELD_DECLARATION",
            ScopeTag::Javadoc => "JAVADOC",
            ScopeTag::ClassJavadoc => "CLASS_JAVADOC",
            ScopeTag::MethodJavadoc => "METHOD_JAVADOC",
            ScopeTag::ThrowDeclaration => "THROW_DECLARATION",
            ScopeTag::LockDeclaration => "LOCK_DECLARATION",
            ScopeTag::LogDeclaration => "LOG_DECLARATION",
            ScopeTag::LongStatementDeclaration => "LONGSTATEMENT_DECLARATION",
            ScopeTag::ThreadDeclaration => "THREAD_DECLARATION",
        }
    }

    /// Parse a tag, ignoring case, underscores and dashes.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-') && !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "classdeclaration" => Some(ScopeTag::ClassDeclaration),
            "methoddeclaration" => Some(ScopeTag::MethodDeclaration),
            "variabledeclaration" => Some(ScopeTag::VariableDeclaration),
            "fielddeclaration" => Some(ScopeTag::FieldDeclaration),
            "javadoc" => Some(ScopeTag::Javadoc),
            "classjavadoc" => Some(ScopeTag::ClassJavadoc),
            "methodjavadoc" => Some(ScopeTag::MethodJavadoc),
            "throwdeclaration" => Some(ScopeTag::ThrowDeclaration),
            "lockdeclaration" => Some(ScopeTag::LockDeclaration),
            "logdeclaration" => Some(ScopeTag::LogDeclaration),
            "longstatementdeclaration" => Some(ScopeTag::LongStatementDeclaration),
            "threaddeclaration" => Some(ScopeTag::ThreadDeclaration),
            _ => None,
        }
    }

    /// Whether nodes of `kind` fall under this tag.
    pub fn matches(&self, kind: &NodeKind) -> bool {
        use crate::ast::ExprKind;

        match self {
            ScopeTag::ClassDeclaration | ScopeTag::ClassJavadoc => {
                matches!(kind, NodeKind::Type(t) if t.kind != TypeKind::Annotation)
            }
            ScopeTag::MethodDeclaration | ScopeTag::MethodJavadoc => kind.is_method(),
            ScopeTag::VariableDeclaration => matches!(kind, NodeKind::Variable { .. }),
            ScopeTag::FieldDeclaration => matches!(kind, NodeKind::Field { .. }),
            ScopeTag::Javadoc => {
                kind.is_method() || matches!(kind, NodeKind::Type(t) if t.kind != TypeKind::Annotation)
            }
            ScopeTag::ThrowDeclaration => {
                matches!(kind, NodeKind::Statement(StmtKind::Throw { .. }))
            }
            ScopeTag::LockDeclaration => matches!(
                kind,
                NodeKind::Method(_)
                    | NodeKind::Statement(StmtKind::Synchronized { .. })
                    | NodeKind::Expression(ExprKind::ObjectCreation { .. })
            ),
            ScopeTag::LogDeclaration => {
                matches!(kind, NodeKind::Expression(ExprKind::MethodCall { .. }))
            }
            ScopeTag::LongStatementDeclaration => matches!(
                kind,
                NodeKind::Variable { .. } | NodeKind::Expression(ExprKind::MethodCall { .. })
            ),
            ScopeTag::ThreadDeclaration => matches!(
                kind,
                NodeKind::Expression(
                    ExprKind::ObjectCreation { .. } | ExprKind::MethodCall { .. }
                )
            ),
        }
    }
}

impl std::fmt::Display for ScopeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single extraction rule.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Rule {
    pub id: String,
    /// Scope as written: one or more tags separated by `,`, `;` or `|`.
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub criteria: String,
    #[serde(default)]
    pub context: String,
    #[serde(skip)]
    tags: Vec<ScopeTag>,
}

impl Rule {
    pub fn new(
        id: impl Into<String>,
        scope: impl Into<String>,
        description: impl Into<String>,
        criteria: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        let mut rule = Self {
            id: id.into(),
            scope: scope.into(),
            description: description.into(),
            criteria: criteria.into(),
            context: context.into(),
            tags: Vec::new(),
        };
        rule.resolve_tags();
        rule
    }

    pub fn tags(&self) -> &[ScopeTag] {
        &self.tags
    }

    /// Whether any of the rule's tags covers `kind`.
    pub fn applies_to(&self, kind: &NodeKind) -> bool {
        self.tags.iter().any(|t| t.matches(kind))
    }

    /// Parse the scope string into tags. Returns the parts that are not
    /// recognized tags.
    fn resolve_tags(&mut self) -> Vec<String> {
        let mut unknown = Vec::new();
        self.tags.clear();
        for part in self.scope.split([',', ';', '|']) {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match ScopeTag::parse(part) {
                Some(tag) if !self.tags.contains(&tag) => self.tags.push(tag),
                Some(_) => {}
                None => unknown.push(part.to_string()),
            }
        }
        unknown
    }
}

/// How the long-statement detector treats a binary argument broken across
/// lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Continuation {
    /// Any break after the left operand is reported.
    #[default]
    AnyBreak,
    /// Only breaks that leave the operator at the end of the left operand's
    /// line are reported; a continuation line starting with the operator is
    /// accepted.
    TrailingOperator,
}

/// Settings for the long-statement detector.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LongStatementSettings {
    /// Maximum single-line length before a statement counts as long (default: 80)
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub continuation: Option<Continuation>,
    /// Report only the outermost qualifying fragment of a statement (default: true)
    #[serde(default)]
    pub outermost_only: Option<bool>,
}

impl LongStatementSettings {
    pub fn max_length(&self) -> usize {
        self.max_length.unwrap_or(80)
    }

    pub fn continuation(&self) -> Continuation {
        self.continuation.unwrap_or_default()
    }

    pub fn outermost_only(&self) -> bool {
        self.outermost_only.unwrap_or(true)
    }
}

/// Engine settings carried alongside the rules.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub long_statement: LongStatementSettings,
    /// Collection types whose `contains` is a linear scan
    #[serde(default)]
    pub linear_scan_types: Option<Vec<String>>,
    /// Types whose construction counts as lock usage (default: ReentrantLock)
    #[serde(default)]
    pub lock_types: Option<Vec<String>>,
    /// Types whose construction names a thread (default: Thread)
    #[serde(default)]
    pub thread_types: Option<Vec<String>>,
    /// Single-argument method that names a thread (default: setName)
    #[serde(default)]
    pub thread_name_setter: Option<String>,
    /// Logging methods whose calls are extracted (default: warn, error)
    #[serde(default)]
    pub log_methods: Option<Vec<String>>,
    /// Type-level annotation carrying the base request path (default: RequestMapping)
    #[serde(default)]
    pub base_mapping_annotation: Option<String>,
    /// Suffix of method-level path annotations (default: Mapping)
    #[serde(default)]
    pub mapping_suffix: Option<String>,
    /// Reject unknown scope tags at load time instead of ignoring them
    #[serde(default)]
    pub strict_scopes: bool,
    /// Parse files containing syntax errors instead of skipping them
    #[serde(default)]
    pub tolerate_syntax_errors: bool,
    /// Extra rule id to detector bindings, added to the built-in ones
    #[serde(default)]
    pub bindings: BTreeMap<String, Vec<String>>,
    /// Glob patterns for paths to exclude from extraction
    #[serde(default)]
    pub excluded_paths: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Settings {
    pub fn linear_scan_types(&self) -> Vec<String> {
        self.linear_scan_types.clone().unwrap_or_else(|| {
            owned(&["List", "ArrayList", "LinkedList", "CopyOnWriteArrayList"])
        })
    }

    pub fn lock_types(&self) -> Vec<String> {
        self.lock_types
            .clone()
            .unwrap_or_else(|| owned(&["ReentrantLock"]))
    }

    pub fn thread_types(&self) -> Vec<String> {
        self.thread_types
            .clone()
            .unwrap_or_else(|| owned(&["Thread"]))
    }

    pub fn thread_name_setter(&self) -> String {
        self.thread_name_setter
            .clone()
            .unwrap_or_else(|| "setName".to_string())
    }

    pub fn log_methods(&self) -> Vec<String> {
        self.log_methods
            .clone()
            .unwrap_or_else(|| owned(&["warn", "error"]))
    }

    pub fn base_mapping_annotation(&self) -> String {
        self.base_mapping_annotation
            .clone()
            .unwrap_or_else(|| "RequestMapping".to_string())
    }

    pub fn mapping_suffix(&self) -> String {
        self.mapping_suffix
            .clone()
            .unwrap_or_else(|| "Mapping".to_string())
    }

    /// Check if a path should be excluded based on excluded_paths patterns.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        if self.excluded_paths.is_empty() {
            return false;
        }
        let path_str = path.to_string_lossy();
        self.excluded_paths.iter().any(|pattern| {
            globset::Glob::new(pattern)
                .map(|g| g.compile_matcher().is_match(&*path_str))
                .unwrap_or(false)
        })
    }
}

/// Rules plus settings, loaded once per run.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RuleSet {
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub settings: Settings,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            settings: Settings::default(),
        }
    }

    /// Load a rule set, choosing the format from the file extension.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, RuleError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|source| RuleError::Io {
            path: display.clone(),
            source,
        })?;

        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        let set = if is_csv {
            Self::parse_csv(&content)
        } else {
            Self::parse_yaml(&content).map_err(|source| RuleError::Yaml {
                path: display,
                source,
            })?
        };
        set.resolved()
    }

    /// Parse YAML content. Scope tags are not resolved yet.
    fn parse_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;
        match value {
            serde_yaml::Value::Null => Ok(Self::default()),
            serde_yaml::Value::Sequence(_) => Ok(Self::new(serde_yaml::from_value(value)?)),
            _ => serde_yaml::from_value(value),
        }
    }

    /// Parse YAML content and resolve scope tags.
    pub fn from_yaml_str(content: &str) -> Result<Self, RuleError> {
        Self::parse_yaml(content)
            .map_err(|source| RuleError::Yaml {
                path: "<inline>".to_string(),
                source,
            })?
            .resolved()
    }

    /// Parse the CSV layout: a header row, then one rule per line split into
    /// at most five fields, so the context column may itself contain commas.
    pub fn parse_csv(content: &str) -> Self {
        let mut rules = Vec::new();
        let mut header_skipped = false;

        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            if !header_skipped {
                header_skipped = true;
                continue;
            }
            let parts: Vec<&str> = line.splitn(5, ',').map(str::trim).collect();
            if parts.len() < 5 {
                warn!(line = index + 1, "skipping rule row with fewer than 5 fields");
                continue;
            }
            rules.push(Rule::new(parts[0], parts[1], parts[2], parts[3], parts[4]));
        }
        Self::new(rules)
    }

    /// Resolve every rule's scope tags. Unknown tags are logged and ignored,
    /// or rejected when `strict_scopes` is set.
    fn resolved(mut self) -> Result<Self, RuleError> {
        let strict = self.settings.strict_scopes;
        for rule in &mut self.rules {
            let unknown = rule.resolve_tags();
            if let Some(tag) = unknown.first() {
                if strict {
                    return Err(RuleError::UnknownScope {
                        rule: rule.id.clone(),
                        tag: tag.clone(),
                    });
                }
                warn!(rule = %rule.id, tags = ?unknown, "ignoring unknown scope tags");
            }
            if rule.tags.is_empty() {
                warn!(rule = %rule.id, scope = %rule.scope, "rule matches no node kind");
            }
        }
        Ok(self)
    }
}

/// Validate a rule set against the detectors available to the engine.
pub fn validate(set: &RuleSet, detector_names: &[&str]) -> Result<(), RuleError> {
    for (rule, detectors) in &set.settings.bindings {
        for detector in detectors {
            if !detector_names.contains(&detector.as_str()) {
                return Err(RuleError::UnknownDetector {
                    rule: rule.clone(),
                    detector: detector.clone(),
                });
            }
        }
    }

    for pattern in &set.settings.excluded_paths {
        globset::Glob::new(pattern).map_err(|source| RuleError::Glob {
            pattern: pattern.clone(),
            source,
        })?;
    }

    if set.settings.strict_scopes {
        for rule in &set.rules {
            if rule.tags.is_empty() {
                return Err(RuleError::UnknownScope {
                    rule: rule.id.clone(),
                    tag: rule.scope.clone(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ExprKind, MethodDecl, TypeDecl};

    #[test]
    fn test_scope_tag_spellings() {
        assert_eq!(ScopeTag::parse("CLASS_DECLARATION"), Some(ScopeTag::ClassDeclaration));
        assert_eq!(ScopeTag::parse("ClassDeclaration"), Some(ScopeTag::ClassDeclaration));
        assert_eq!(ScopeTag::parse("class_declaration"), Some(ScopeTag::ClassDeclaration));
        assert_eq!(
            ScopeTag::parse("LONGSTATEMENT_DECLARATION"),
            Some(ScopeTag::LongStatementDeclaration)
        );
        assert_eq!(
            ScopeTag::parse("long_statement_declaration"),
            Some(ScopeTag::LongStatementDeclaration)
        );
        assert_eq!(ScopeTag::parse("METHOD_JAVADOC"), Some(ScopeTag::MethodJavadoc));
        assert_eq!(ScopeTag::parse("PACKAGE_DECLARATION"), None);
    }

    #[test]
    fn test_rule_scope_matching() {
        let rule = Rule::new("RULE-001", "CLASS_DECLARATION, method_declaration", "", "", "");
        assert_eq!(
            rule.tags(),
            &[ScopeTag::ClassDeclaration, ScopeTag::MethodDeclaration]
        );
        assert!(rule.applies_to(&NodeKind::Type(TypeDecl::new(TypeKind::Class))));
        assert!(rule.applies_to(&NodeKind::Method(MethodDecl::default())));
        assert!(!rule.applies_to(&NodeKind::Block));

        let inert = Rule::new("RULE-X", "", "", "", "");
        assert!(inert.tags().is_empty());
        assert!(!inert.applies_to(&NodeKind::Type(TypeDecl::new(TypeKind::Class))));
    }

    #[test]
    fn test_legacy_javadoc_tags_are_narrow() {
        let class_doc = Rule::new("RULE-004", "CLASS_JAVADOC", "", "", "");
        assert!(class_doc.applies_to(&NodeKind::Type(TypeDecl::new(TypeKind::Enum))));
        assert!(!class_doc.applies_to(&NodeKind::Method(MethodDecl::default())));

        let doc = Rule::new("RULE-004", "JAVADOC", "", "", "");
        assert!(doc.applies_to(&NodeKind::Method(MethodDecl::default())));
        assert!(!doc.applies_to(&NodeKind::Constructor(MethodDecl::default())));
    }

    #[test]
    fn test_thread_scope_kinds() {
        let rule = Rule::new("RULE-029", "THREAD_DECLARATION", "", "", "");
        assert!(rule.applies_to(&NodeKind::Expression(ExprKind::ObjectCreation {
            ty: "Thread".into(),
            args: vec![],
        })));
        assert!(!rule.applies_to(&NodeKind::Expression(ExprKind::Name)));
    }

    #[test]
    fn test_parse_yaml_rule_set() {
        let yaml = r#"
rules:
  - id: RULE-023
    scope: LONGSTATEMENT_DECLARATION
    description: Keep statements short
    criteria: No line longer than 80 characters
    context: readability
settings:
  long_statement:
    max_length: 100
    continuation: trailing-operator
  lock_types: [ReentrantLock, ReentrantReadWriteLock]
  bindings:
    RULE-100: [naming]
"#;
        let set = RuleSet::from_yaml_str(yaml).unwrap();
        assert_eq!(set.rules.len(), 1);
        assert_eq!(set.rules[0].tags(), &[ScopeTag::LongStatementDeclaration]);
        assert_eq!(set.settings.long_statement.max_length(), 100);
        assert_eq!(
            set.settings.long_statement.continuation(),
            Continuation::TrailingOperator
        );
        assert_eq!(set.settings.lock_types().len(), 2);
        assert_eq!(set.settings.thread_types(), vec!["Thread"]);
        assert_eq!(set.settings.bindings["RULE-100"], vec!["naming"]);
    }

    #[test]
    fn test_parse_yaml_bare_list() {
        let yaml = r#"
- id: RULE-001
  scope: CLASS_DECLARATION
- id: RULE-024
  scope: THROW_DECLARATION
  description: Exception messages must be meaningful
"#;
        let set = RuleSet::from_yaml_str(yaml).unwrap();
        assert_eq!(set.rules.len(), 2);
        assert_eq!(set.rules[1].description, "Exception messages must be meaningful");
        assert_eq!(set.settings.long_statement.max_length(), 80);
    }

    #[test]
    fn test_empty_yaml_is_empty_rule_set() {
        let set = RuleSet::from_yaml_str("").unwrap();
        assert!(set.rules.is_empty());
    }

    #[test]
    fn test_parse_csv() {
        let csv = "RuleID,Scope,Description,Criteria,Context\n\
                   \n\
                   RULE-010, CLASS_DECLARATION , Constructors together, Group them, see style guide, section 3\n\
                   RULE-BAD,CLASS_DECLARATION,too few\n";
        let set = RuleSet::parse_csv(csv);
        assert_eq!(set.rules.len(), 1);
        let rule = &set.rules[0];
        assert_eq!(rule.id, "RULE-010");
        assert_eq!(rule.scope, "CLASS_DECLARATION");
        assert_eq!(rule.context, "see style guide, section 3");
        assert_eq!(rule.tags(), &[ScopeTag::ClassDeclaration]);
    }

    #[test]
    fn test_strict_scopes_reject_unknown_tags() {
        let yaml = r#"
rules:
  - id: RULE-001
    scope: CLASS_DECLARATION,PACKAGE_DECLARATION
settings:
  strict_scopes: true
"#;
        let err = RuleSet::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, RuleError::UnknownScope { ref tag, .. } if tag == "PACKAGE_DECLARATION"));

        let lenient = yaml.replace("strict_scopes: true", "strict_scopes: false");
        let set = RuleSet::from_yaml_str(&lenient).unwrap();
        assert_eq!(set.rules[0].tags(), &[ScopeTag::ClassDeclaration]);
    }

    #[test]
    fn test_validate_bindings_and_globs() {
        let mut set = RuleSet::default();
        set.settings
            .bindings
            .insert("RULE-900".to_string(), vec!["nope".to_string()]);
        let err = validate(&set, &["naming"]).unwrap_err();
        assert!(matches!(err, RuleError::UnknownDetector { .. }));

        set.settings.bindings.clear();
        set.settings.excluded_paths.push("**/[bad".to_string());
        assert!(matches!(
            validate(&set, &["naming"]).unwrap_err(),
            RuleError::Glob { .. }
        ));
    }

    #[test]
    fn test_excluded_paths() {
        let settings = Settings {
            excluded_paths: vec!["**/generated/**".to_string()],
            ..Default::default()
        };
        assert!(settings.is_path_excluded(Path::new("src/generated/Foo.java")));
        assert!(!settings.is_path_excluded(Path::new("src/main/Foo.java")));
    }
}
