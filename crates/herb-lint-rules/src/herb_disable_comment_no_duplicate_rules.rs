//! Rule reporting rule names listed twice in one `herb:disable` comment.

use std::collections::HashSet;

use herb_lint_core::{
    DirectiveRule, DisableComment, LintContext, Offense, RuleDescriptor, Severity,
};

/// Rule name for herb-disable-comment-no-duplicate-rules.
pub const NAME: &str = "herb-disable-comment-no-duplicate-rules";

/// Descriptor for herb-disable-comment-no-duplicate-rules.
pub const DESCRIPTOR: RuleDescriptor =
    RuleDescriptor::new(NAME, "Forbids repeated rule names in herb:disable comments")
        .severity(Severity::Warning);

/// Reports repeated rule names.
#[derive(Debug, Clone, Copy, Default)]
pub struct HerbDisableCommentNoDuplicateRules;

impl HerbDisableCommentNoDuplicateRules {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DirectiveRule for HerbDisableCommentNoDuplicateRules {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &DESCRIPTOR
    }

    fn check_directive(&mut self, comment: &DisableComment, _ctx: &LintContext) -> Vec<Offense> {
        let mut seen = HashSet::new();
        comment
            .rule_name_details
            .iter()
            .filter(|detail| !seen.insert(detail.name.as_str()))
            .map(|detail| {
                Offense::new(
                    NAME,
                    DESCRIPTOR.default_severity,
                    detail.location,
                    format!(
                        "Duplicate rule `{}` in herb:disable comment. Remove the repeated name.",
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
        let mut rule = HerbDisableCommentNoDuplicateRules::new();
        collect_directives(&doc)
            .iter()
            .flat_map(|d| rule.check_directive(d, &LintContext::new()))
            .collect()
    }

    #[test]
    fn test_reports_every_repeat_at_its_own_location() {
        let offenses = check_code("<%# herb:disable a, b, a, a %>");
        assert_eq!(offenses.len(), 2);
        assert_eq!(offenses[0].location.start.column, 23);
        assert_eq!(offenses[1].location.start.column, 26);
    }

    #[test]
    fn test_allows_distinct_names() {
        assert!(check_code("<%# herb:disable a, b %>").is_empty());
    }
}
