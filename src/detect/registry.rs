//! Rule id to detector bindings.

use std::collections::HashMap;

use super::{builtin, Detector};
use crate::rules::{RuleError, Settings};

/// Built-in bindings: which detector extracts evidence for which rule id.
pub const DEFAULT_BINDINGS: &[(&str, &str)] = &[
    ("RULE-001", "naming"),
    ("RULE-002", "naming"),
    ("RULE-003", "naming"),
    ("RULE-004", "javadoc"),
    ("RULE-005", "method-doc"),
    ("RULE-006", "method-doc"),
    ("RULE-007", "method-doc"),
    ("RULE-008", "method-doc"),
    ("RULE-009", "request-path"),
    ("RULE-010", "continuity"),
    ("RULE-011", "naming"),
    ("RULE-012", "naming"),
    ("RULE-013", "naming"),
    ("RULE-014", "interface-constants"),
    ("RULE-015", "naming"),
    ("RULE-017", "naming"),
    ("RULE-018", "accessors"),
    ("RULE-019", "accessors"),
    ("RULE-020", "naming"),
    ("RULE-021", "naming"),
    ("RULE-022", "class-outline"),
    ("RULE-023", "long-statement"),
    ("RULE-024", "throw-message"),
    ("RULE-025", "throw-message"),
    ("RULE-026", "constants"),
    ("RULE-027", "loop-contains"),
    ("RULE-028", "loop-body"),
    ("RULE-029", "thread-name"),
    ("RULE-030", "lock"),
    ("RULE-031", "log-message"),
];

/// Owns the detectors and maps rule ids to them.
///
/// Built once per engine; there is no global registration.
#[derive(Default)]
pub struct DetectorRegistry {
    detectors: Vec<Box<dyn Detector>>,
    bindings: HashMap<String, Vec<usize>>,
}

impl DetectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in detector, the default bindings and the
    /// extra bindings from `settings`.
    pub fn with_defaults(settings: &Settings) -> Result<Self, RuleError> {
        let mut registry = Self::new();
        for detector in builtin(settings) {
            registry.register(detector);
        }
        for (rule_id, detector) in DEFAULT_BINDINGS {
            registry.bind(rule_id, detector)?;
        }
        for (rule_id, detectors) in &settings.bindings {
            for detector in detectors {
                registry.bind(rule_id, detector)?;
            }
        }
        Ok(registry)
    }

    /// Add a detector. A detector with the same name replaces the old one.
    pub fn register(&mut self, detector: Box<dyn Detector>) {
        match self
            .detectors
            .iter()
            .position(|d| d.name() == detector.name())
        {
            Some(index) => self.detectors[index] = detector,
            None => self.detectors.push(detector),
        }
    }

    /// Bind a registered detector to a rule id. Binding the same pair twice
    /// is a no-op.
    pub fn bind(&mut self, rule_id: &str, detector: &str) -> Result<(), RuleError> {
        let index = self
            .detectors
            .iter()
            .position(|d| d.name() == detector)
            .ok_or_else(|| RuleError::UnknownDetector {
                rule: rule_id.to_string(),
                detector: detector.to_string(),
            })?;
        let bound = self.bindings.entry(rule_id.to_string()).or_default();
        if !bound.contains(&index) {
            bound.push(index);
        }
        Ok(())
    }

    /// Detectors bound to `rule_id`, in binding order.
    pub fn detectors_for<'a>(
        &'a self,
        rule_id: &str,
    ) -> impl Iterator<Item = &'a dyn Detector> + 'a {
        let indices = self.bindings.get(rule_id).cloned().unwrap_or_default();
        indices.into_iter().map(move |i| self.detectors[i].as_ref())
    }

    pub fn has_bindings(&self, rule_id: &str) -> bool {
        self.bindings
            .get(rule_id)
            .map(|b| !b.is_empty())
            .unwrap_or(false)
    }

    /// Names of all registered detectors, in registration order.
    pub fn detector_names(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }
}

impl std::fmt::Debug for DetectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorRegistry")
            .field("detectors", &self.detector_names())
            .field("bindings", &self.bindings.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{Finding, NodeContext};

    struct Named(&'static str);

    impl Detector for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn detect(&self, _cx: &NodeContext<'_>, _out: &mut Vec<Finding>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_default_bindings_resolve() {
        let registry = DetectorRegistry::with_defaults(&Settings::default()).unwrap();
        let names: Vec<_> = registry.detectors_for("RULE-024").map(|d| d.name()).collect();
        assert_eq!(names, vec!["throw-message"]);
        assert!(registry.has_bindings("RULE-001"));
        assert!(!registry.has_bindings("RULE-016"));
    }

    #[test]
    fn test_one_rule_many_detectors_in_binding_order() {
        let mut registry = DetectorRegistry::new();
        registry.register(Box::new(Named("first")));
        registry.register(Box::new(Named("second")));
        registry.bind("R", "second").unwrap();
        registry.bind("R", "first").unwrap();
        registry.bind("R", "second").unwrap();
        let names: Vec<_> = registry.detectors_for("R").map(|d| d.name()).collect();
        assert_eq!(names, vec!["second", "first"]);
    }

    #[test]
    fn test_unknown_detector_binding_fails() {
        let mut settings = Settings::default();
        settings
            .bindings
            .insert("RULE-900".to_string(), vec!["missing".to_string()]);
        let err = DetectorRegistry::with_defaults(&settings).unwrap_err();
        assert!(matches!(err, RuleError::UnknownDetector { .. }));
    }

    #[test]
    fn test_settings_bindings_extend_defaults() {
        let mut settings = Settings::default();
        settings
            .bindings
            .insert("RULE-001".to_string(), vec!["javadoc".to_string()]);
        let registry = DetectorRegistry::with_defaults(&settings).unwrap();
        let names: Vec<_> = registry.detectors_for("RULE-001").map(|d| d.name()).collect();
        assert_eq!(names, vec!["naming", "javadoc"]);
    }
}
