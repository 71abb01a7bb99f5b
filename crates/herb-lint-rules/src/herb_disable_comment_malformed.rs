//! Rule reporting `herb:disable` comments that cannot be parsed as intended.
//!
//! # Detected Patterns
//!
//! - `<%# herb:disablehtml-foo %>` (no space after the keyword)
//! - `<%# herb:disable a,,b %>` and trailing commas
//! - `<%# herb:disable a b %>` (names not separated by commas)

use herb_lint_core::{DirectiveRule, DisableComment, LintContext, Offense, RuleDescriptor};

/// Rule name for herb-disable-comment-malformed.
pub const NAME: &str = "herb-disable-comment-malformed";

/// Descriptor for herb-disable-comment-malformed.
pub const DESCRIPTOR: RuleDescriptor =
    RuleDescriptor::new(NAME, "Reports malformed herb:disable comments");

/// Reports malformed directives.
#[derive(Debug, Clone, Copy, Default)]
pub struct HerbDisableCommentMalformed;

impl HerbDisableCommentMalformed {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DirectiveRule for HerbDisableCommentMalformed {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &DESCRIPTOR
    }

    fn check_directive(&mut self, comment: &DisableComment, _ctx: &LintContext) -> Vec<Offense> {
        let severity = DESCRIPTOR.default_severity;
        if !comment.matched {
            return vec![Offense::new(
                NAME,
                severity,
                comment.location,
                "`herb:disable` must be followed by a space and a comma-separated list of rule names.",
            )];
        }

        let mut offenses = Vec::new();
        if comment.has_empty_entries() {
            offenses.push(Offense::new(
                NAME,
                severity,
                comment.content_location,
                "herb:disable comment contains an empty rule name. Remove the extra comma.",
            ));
        }
        for detail in &comment.rule_name_details {
            if detail.name.contains(char::is_whitespace) {
                offenses.push(Offense::new(
                    NAME,
                    severity,
                    detail.location,
                    format!(
                        "Rule names must be separated by commas: `{}`.",
                        detail.name.split_whitespace().collect::<Vec<_>>().join(", ")
                    ),
                ));
            }
        }
        offenses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herb_lint_core::collect_directives;
    use herb_lint_core::syntax::{parse, ParseOptions};

    fn check_code(source: &str) -> Vec<Offense> {
        let doc = parse(source, ParseOptions::default()).expect("Failed to parse");
        let mut rule = HerbDisableCommentMalformed::new();
        collect_directives(&doc)
            .iter()
            .flat_map(|d| rule.check_directive(d, &LintContext::new()))
            .collect()
    }

    #[test]
    fn test_detects_missing_separator() {
        let offenses = check_code("<%# herb:disablehtml-foo %>");
        assert_eq!(offenses.len(), 1);
        assert!(offenses[0].message.contains("must be followed by a space"));
    }

    #[test]
    fn test_detects_empty_entries() {
        assert_eq!(check_code("<%# herb:disable a,,b %>").len(), 1);
        assert_eq!(check_code("<!-- herb:disable a, -->").len(), 1);
    }

    #[test]
    fn test_detects_space_separated_names() {
        let offenses = check_code("<%# herb:disable html-a html-b %>");
        assert_eq!(offenses.len(), 1);
        assert_eq!(
            offenses[0].message,
            "Rule names must be separated by commas: `html-a, html-b`."
        );
    }

    #[test]
    fn test_allows_well_formed_directives() {
        assert!(check_code("<%# herb:disable html-a, html-b %><%# herb:disable %>").is_empty());
    }
}
