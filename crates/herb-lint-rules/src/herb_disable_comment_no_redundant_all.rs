//! Rule reporting rule names listed next to `all`.
//!
//! `herb:disable all, html-foo` already disables `html-foo` through `all`.

use herb_lint_core::{
    DirectiveRule, DisableComment, LintContext, Offense, RuleDescriptor, Severity, ALL_RULES,
};

/// Rule name for herb-disable-comment-no-redundant-all.
pub const NAME: &str = "herb-disable-comment-no-redundant-all";

/// Descriptor for herb-disable-comment-no-redundant-all.
pub const DESCRIPTOR: RuleDescriptor =
    RuleDescriptor::new(NAME, "Forbids rule names next to `all` in herb:disable comments")
        .severity(Severity::Warning);

/// Reports names made redundant by `all`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HerbDisableCommentNoRedundantAll;

impl HerbDisableCommentNoRedundantAll {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DirectiveRule for HerbDisableCommentNoRedundantAll {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &DESCRIPTOR
    }

    fn check_directive(&mut self, comment: &DisableComment, _ctx: &LintContext) -> Vec<Offense> {
        if !comment.disables_all() {
            return Vec::new();
        }
        comment
            .rule_name_details
            .iter()
            .filter(|detail| detail.name != ALL_RULES)
            .map(|detail| {
                Offense::new(
                    NAME,
                    DESCRIPTOR.default_severity,
                    detail.location,
                    format!(
                        "Redundant rule `{}`: `all` already disables every rule.",
                        detail.name
                    ),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herb_lint_core::collect_directives;
    use herb_lint_core::syntax::{parse, ParseOptions};

    fn check_code(source: &str) -> Vec<Offense> {
        let doc = parse(source, ParseOptions::default()).expect("Failed to parse");
        let mut rule = HerbDisableCommentNoRedundantAll::new();
        collect_directives(&doc)
            .iter()
            .flat_map(|d| rule.check_directive(d, &LintContext::new()))
            .collect()
    }

    #[test]
    fn test_detects_names_next_to_all() {
        let offenses = check_code("<%# herb:disable html-a, all, html-b %>");
        assert_eq!(offenses.len(), 2);
        assert!(offenses[0].message.contains("html-a"));
        assert!(offenses[1].message.contains("html-b"));
    }

    #[test]
    fn test_allows_all_alone_and_names_alone() {
        assert!(check_code("<%# herb:disable all %><%# herb:disable html-a %>").is_empty());
    }
}
