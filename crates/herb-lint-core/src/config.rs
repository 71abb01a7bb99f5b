//! Configuration types for herb-lint.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Top-level configuration for herb-lint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Linter configuration.
    #[serde(default)]
    pub linter: LinterConfig,

    /// Per-rule configurations.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a rule is enabled, falling back to the rule's own default.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str, enabled_by_default: bool) -> bool {
        self.rules
            .get(rule_name)
            .and_then(|c| c.enabled)
            .unwrap_or(enabled_by_default)
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<crate::Severity> {
        self.rules.get(rule_name).and_then(|c| c.severity)
    }

    /// Enables only the given rules, disabling every other configured one.
    ///
    /// Used for `--rules` on the command line.
    pub fn restrict_to<'a>(&mut self, names: impl IntoIterator<Item = &'a str>, all: &[&str]) {
        let keep: Vec<&str> = names.into_iter().collect();
        for name in all {
            self.rules.entry((*name).to_string()).or_default().enabled =
                Some(keep.contains(name));
        }
    }
}

/// Linter-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinterConfig {
    /// Glob patterns of files to lint.
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Glob patterns to exclude from linting.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Upper bound on fix passes per file.
    #[serde(default = "default_max_fix_iterations")]
    pub max_fix_iterations: usize,
}

impl Default for LinterConfig {
    fn default() -> Self {
        Self {
            include: default_include(),
            exclude: default_exclude(),
            max_fix_iterations: default_max_fix_iterations(),
        }
    }
}

impl LinterConfig {
    /// Whether `path` matches an include pattern and no exclude pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is not a valid glob.
    pub fn is_included(&self, path: &Path) -> Result<bool, ConfigError> {
        let matches = |patterns: &[String]| -> Result<bool, ConfigError> {
            for pattern in patterns {
                let compiled =
                    glob::Pattern::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                        pattern: pattern.clone(),
                        message: e.to_string(),
                    })?;
                if compiled.matches_path(path) {
                    return Ok(true);
                }
            }
            Ok(false)
        };
        Ok(matches(&self.include)? && !matches(&self.exclude)?)
    }
}

fn default_include() -> Vec<String> {
    vec!["**/*.html.erb".to_string(), "**/*.html".to_string()]
}

fn default_exclude() -> Vec<String> {
    vec![
        "**/node_modules/**".to_string(),
        "**/vendor/**".to_string(),
    ]
}

fn default_max_fix_iterations() -> usize {
    10
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<crate::Severity>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// Two rules share a name.
    #[error("Duplicate rule name: {name}")]
    DuplicateRule {
        /// The repeated name.
        name: String,
    },

    /// Configuration references a rule the catalog does not know.
    #[error("Unknown rule in configuration: {name}")]
    UnknownRule {
        /// The unknown name.
        name: String,
    },

    /// An include or exclude pattern is not a valid glob.
    #[error("Invalid glob pattern `{pattern}`: {message}")]
    InvalidPattern {
        /// The pattern as written.
        pattern: String,
        /// Glob error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Severity;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.linter.max_fix_iterations, 10);
        assert!(config.rules.is_empty());
        assert!(config.is_rule_enabled("html-anything", true));
        assert!(!config.is_rule_enabled("html-anything", false));
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[linter]
exclude = ["**/generated/**"]
max_fix_iterations = 3

[rules.html-tag-name-lowercase]
enabled = false

[rules.herb-disable-comment-unnecessary]
severity = "error"
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.linter.max_fix_iterations, 3);
        assert_eq!(config.linter.include, default_include());
        assert!(!config.is_rule_enabled("html-tag-name-lowercase", true));
        assert_eq!(
            config.rule_severity("herb-disable-comment-unnecessary"),
            Some(Severity::Error)
        );
    }

    #[test]
    fn test_invalid_severity_is_a_parse_error() {
        let err = Config::parse("[rules.x]\nseverity = \"fatal\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_include_and_exclude() {
        let config = LinterConfig::default();
        assert!(config
            .is_included(Path::new("app/views/home/index.html.erb"))
            .unwrap());
        assert!(!config
            .is_included(Path::new("node_modules/pkg/index.html"))
            .unwrap());
        assert!(!config.is_included(Path::new("app/models/user.rb")).unwrap());

        let broken = LinterConfig {
            include: vec!["[".to_string()],
            ..LinterConfig::default()
        };
        assert!(matches!(
            broken.is_included(Path::new("a.html")),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_restrict_to() {
        let mut config = Config::default();
        config.restrict_to(["html-a"], &["html-a", "html-b"]);
        assert!(config.is_rule_enabled("html-a", false));
        assert!(!config.is_rule_enabled("html-b", true));
    }
}
