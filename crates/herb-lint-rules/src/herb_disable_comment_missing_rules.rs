//! Rule reporting `herb:disable` comments that name no rules.

use herb_lint_core::{DirectiveRule, DisableComment, LintContext, Offense, RuleDescriptor};

/// Rule name for herb-disable-comment-missing-rules.
pub const NAME: &str = "herb-disable-comment-missing-rules";

/// Descriptor for herb-disable-comment-missing-rules.
pub const DESCRIPTOR: RuleDescriptor =
    RuleDescriptor::new(NAME, "Requires herb:disable comments to name rules");

/// Reports directives without rule names.
#[derive(Debug, Clone, Copy, Default)]
pub struct HerbDisableCommentMissingRules;

impl HerbDisableCommentMissingRules {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DirectiveRule for HerbDisableCommentMissingRules {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &DESCRIPTOR
    }

    fn check_directive(&mut self, comment: &DisableComment, _ctx: &LintContext) -> Vec<Offense> {
        if !comment.matched || !comment.rule_names.is_empty() {
            return Vec::new();
        }
        vec![Offense::new(
            NAME,
            DESCRIPTOR.default_severity,
            comment.location,
            "herb:disable comment is missing rule names. Use `herb:disable all` or list the rules to disable.",
        )]
    }
}
