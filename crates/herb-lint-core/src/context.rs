//! Run-scoped context handed to every rule invocation.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use crate::rule::RuleDescriptor;
use crate::types::Severity;

/// Read-only data shared by all rules during a lint run.
///
/// Built once by the [`Linter`](crate::Linter); rules only ever see a shared
/// reference.
#[derive(Debug, Clone, Default)]
pub struct LintContext {
    /// Every rule name the catalog knows, enabled or not.
    pub valid_rule_names: BTreeSet<String>,
    /// Names of the rules that run in this linter.
    pub enabled_rules: BTreeSet<String>,
    /// Severity overrides from configuration.
    pub severity_overrides: HashMap<String, Severity>,
    /// File being linted, when known.
    pub file_name: Option<PathBuf>,
}

impl LintContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds known rule names.
    #[must_use]
    pub fn with_valid_rule_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.valid_rule_names
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Sets the file name.
    #[must_use]
    pub fn with_file_name(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_name = Some(path.into());
        self
    }

    /// Whether `name` refers to a rule in the catalog.
    #[must_use]
    pub fn is_valid_rule_name(&self, name: &str) -> bool {
        self.valid_rule_names.contains(name)
    }

    /// Whether the rule `name` runs in this linter.
    #[must_use]
    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled_rules.contains(name)
    }

    /// Effective severity for a rule.
    #[must_use]
    pub fn severity_for(&self, descriptor: &RuleDescriptor) -> Severity {
        self.severity_of(descriptor.name)
            .unwrap_or(descriptor.default_severity)
    }

    /// Configured severity override for `name`, if any.
    #[must_use]
    pub fn severity_of(&self, name: &str) -> Option<Severity> {
        self.severity_overrides.get(name).copied()
    }

    /// File name for display, `-` when linting anonymous input.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.file_name
            .as_deref()
            .map_or_else(|| "-".to_string(), |p| p.display().to_string())
    }
}
