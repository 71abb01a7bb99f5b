//! Rule reporting unknown rule names in `herb:disable` comments.
//!
//! Names are checked against every rule the catalog knows, enabled or not.
//! A close match is suggested when there is one.

use herb_lint_core::{
    DirectiveRule, DisableComment, LintContext, Offense, RuleDescriptor, Severity, ALL_RULES,
};

/// Rule name for herb-disable-comment-valid-rule-name.
pub const NAME: &str = "herb-disable-comment-valid-rule-name";

/// Descriptor for herb-disable-comment-valid-rule-name.
pub const DESCRIPTOR: RuleDescriptor =
    RuleDescriptor::new(NAME, "Requires herb:disable comments to name existing rules")
        .severity(Severity::Warning);

/// Largest edit distance for which a suggestion is offered.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Reports unknown rule names.
#[derive(Debug, Clone, Copy, Default)]
pub struct HerbDisableCommentValidRuleName;

impl HerbDisableCommentValidRuleName {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DirectiveRule for HerbDisableCommentValidRuleName {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &DESCRIPTOR
    }

    fn check_directive(&mut self, comment: &DisableComment, ctx: &LintContext) -> Vec<Offense> {
        comment
            .rule_name_details
            .iter()
            .filter(|d| d.name != ALL_RULES && !d.name.contains(char::is_whitespace))
            .filter(|d| !ctx.is_valid_rule_name(&d.name))
            .map(|detail| {
                let message = match suggest(&detail.name, ctx) {
                    Some(candidate) => format!(
                        "Unknown rule `{}`. Did you mean `{candidate}`?",
                        detail.name
                    ),
                    None => format!("Unknown rule `{}`.", detail.name),
                };
                Offense::new(NAME, DESCRIPTOR.default_severity, detail.location, message)
            })
            .collect()
    }
}

fn suggest<'a>(name: &str, ctx: &'a LintContext) -> Option<&'a str> {
    ctx.valid_rule_names
        .iter()
        .map(|candidate| (edit_distance(name, candidate), candidate.as_str()))
        .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate)
}

/// Levenshtein distance over chars.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut current = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        previous = current;
    }
    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use herb_lint_core::collect_directives;
    use herb_lint_core::syntax::{parse, ParseOptions};

    fn check_code(source: &str) -> Vec<Offense> {
        let doc = parse(source, ParseOptions::default()).expect("Failed to parse");
        let ctx = LintContext::new()
            .with_valid_rule_names(["html-tag-name-lowercase", "html-no-nested-links"]);
        let mut rule = HerbDisableCommentValidRuleName::new();
        collect_directives(&doc)
            .iter()
            .flat_map(|d| rule.check_directive(d, &ctx))
            .collect()
    }

    #[test]
    fn test_detects_unknown_rule_with_suggestion() {
        let offenses = check_code("<%# herb:disable html-tag-name-lowercas, all %>");
        assert_eq!(offenses.len(), 1);
        assert_eq!(
            offenses[0].message,
            "Unknown rule `html-tag-name-lowercas`. Did you mean `html-tag-name-lowercase`?"
        );
        assert_eq!(offenses[0].location.start.column, 17);
    }

    #[test]
    fn test_detects_unknown_rule_without_suggestion() {
        let offenses = check_code("<!-- herb:disable something-else -->");
        assert_eq!(offenses[0].message, "Unknown rule `something-else`.");
    }

    #[test]
    fn test_allows_known_rules() {
        assert!(check_code("<%# herb:disable html-no-nested-links, all %>").is_empty());
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("same", "same"), 0);
    }
}
