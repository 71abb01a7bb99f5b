//! Rule presets and the built-in registry.

use herb_lint_core::{AnyRule, ConfigError, RuleRegistry};

use crate::{
    HerbDisableCommentMalformed, HerbDisableCommentMissingRules,
    HerbDisableCommentNoDuplicateRules, HerbDisableCommentNoRedundantAll,
    HerbDisableCommentValidRuleName, HtmlAttributeValuesRequireQuotes,
    HtmlBooleanAttributesNoValue, HtmlNoDuplicateIds, HtmlNoNestedLinks, HtmlTagNameLowercase,
};

/// Preset configurations for herb-lint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Every built-in rule.
    Recommended,
    /// Only validation of `herb:disable` comments, for gradual adoption.
    Minimal,
}

impl Preset {
    /// Returns a registry holding the rules of this preset.
    ///
    /// # Errors
    ///
    /// Returns an error if two rules share a name.
    pub fn registry(self) -> Result<RuleRegistry, ConfigError> {
        match self {
            Self::Recommended => registry(),
            Self::Minimal => directive_registry(),
        }
    }
}

/// Registry of every built-in rule.
///
/// # Errors
///
/// Returns an error if two rules share a name.
pub fn registry() -> Result<RuleRegistry, ConfigError> {
    let mut registry = directive_registry()?;
    registry
        .register_rule(|| Box::new(HtmlTagNameLowercase::new()))?
        .register_rule(|| Box::new(HtmlAttributeValuesRequireQuotes::new()))?
        .register_rule(|| Box::new(HtmlBooleanAttributesNoValue::new()))?
        .register_rule(|| Box::new(HtmlNoDuplicateIds::new()))?
        .register_rule(|| Box::new(HtmlNoNestedLinks::new()))?;
    Ok(registry)
}

/// Registry of the `herb-disable-comment-*` validation rules.
///
/// # Errors
///
/// Returns an error if two rules share a name.
pub fn directive_registry() -> Result<RuleRegistry, ConfigError> {
    let mut registry = RuleRegistry::new();
    registry
        .register_directive_rule(|| Box::new(HerbDisableCommentMalformed::new()))?
        .register_directive_rule(|| Box::new(HerbDisableCommentMissingRules::new()))?
        .register_directive_rule(|| Box::new(HerbDisableCommentValidRuleName::new()))?
        .register_directive_rule(|| Box::new(HerbDisableCommentNoDuplicateRules::new()))?
        .register_directive_rule(|| Box::new(HerbDisableCommentNoRedundantAll::new()))?;
    Ok(registry)
}

/// Fresh instances of every built-in rule.
///
/// # Errors
///
/// Returns an error if two rules share a name.
pub fn all_rules() -> Result<Vec<AnyRule>, ConfigError> {
    Ok(registry()?.instantiate())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_names_are_unique_and_ordered() {
        let registry = registry().expect("Failed to build registry");
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names.len(), 10);
        assert_eq!(names[0], "herb-disable-comment-malformed");
        assert!(names.contains(&"html-tag-name-lowercase"));
    }

    #[test]
    fn test_preset_rules() {
        assert_eq!(Preset::Recommended.registry().unwrap().len(), 10);
        let minimal = Preset::Minimal.registry().unwrap();
        assert!(minimal
            .names()
            .all(|name| name.starts_with(herb_lint_core::DIRECTIVE_RULE_PREFIX)));
    }

    #[test]
    fn test_all_rules_are_fresh_instances() {
        assert_eq!(all_rules().unwrap().len(), 10);
    }
}
