//! Suppression of offenses by `herb:disable` comments and detection of
//! directives that suppress nothing.
//!
//! This is a pipeline stage, not a rule: it needs the complete raw offense
//! set, so the linter runs it after every rule has finished.

use tracing::debug;

use crate::context::LintContext;
use crate::directive::{DisableComment, ALL_RULES};
use crate::rule::RuleDescriptor;
use crate::types::{sort_offenses, LintResult, Offense, Severity};

/// Name reserved for unnecessary-directive reports.
pub const UNNECESSARY_DIRECTIVE_RULE: &str = "herb-disable-comment-unnecessary";

/// Prefix shared by every directive-validation rule.
pub const DIRECTIVE_RULE_PREFIX: &str = "herb-disable-comment-";

/// Message prefix of offenses synthesized from a faulting rule.
pub const INTERNAL_ERROR_PREFIX: &str = "internal error:";

/// Descriptor of the unnecessary-directive detector.
///
/// It is enabled and configured like any rule, but runs in this stage.
pub const UNNECESSARY_DIRECTIVE: RuleDescriptor = RuleDescriptor::new(
    UNNECESSARY_DIRECTIVE_RULE,
    "Reports herb:disable comments that do not suppress any offense",
)
.severity(Severity::Warning);

/// Whether a directive may silence `offense`.
///
/// Directive diagnostics and internal errors always stay visible.
#[must_use]
pub fn is_suppressible(offense: &Offense) -> bool {
    !offense.rule.starts_with(DIRECTIVE_RULE_PREFIX)
        && !offense.message.starts_with(INTERNAL_ERROR_PREFIX)
}

/// Applies `directives` to the raw offenses of one document.
///
/// An offense is suppressed when its start line lies on a line spanned by a
/// matched directive that names its rule or `all`. Every matched directive
/// that suppressed nothing is reported under [`UNNECESSARY_DIRECTIVE_RULE`]
/// at its own location. A directive that did suppress something still gets a
/// report for each explicitly named, enabled rule that matched nothing, at
/// that name's location.
#[must_use]
pub fn suppress(raw: Vec<Offense>, directives: &[DisableComment], ctx: &LintContext) -> LintResult {
    let mut suppressed = vec![false; raw.len()];
    let mut unnecessary = Vec::new();
    let detect = ctx.is_enabled(UNNECESSARY_DIRECTIVE_RULE);
    let severity = ctx.severity_for(&UNNECESSARY_DIRECTIVE);

    for directive in directives.iter().filter(|d| d.matched) {
        let disables_all = directive.disables_all();
        let mut hits = 0usize;
        let mut name_hits = vec![0usize; directive.rule_name_details.len()];

        for (index, offense) in raw.iter().enumerate() {
            if !is_suppressible(offense) || !directive.in_scope(&offense.location) {
                continue;
            }
            let mut covered = disables_all;
            for (detail, count) in directive.rule_name_details.iter().zip(&mut name_hits) {
                if detail.name == offense.rule {
                    *count += 1;
                    covered = true;
                }
            }
            if covered {
                suppressed[index] = true;
                hits += 1;
            }
        }
        debug!(
            "directive at {} suppressed {hits} offense(s)",
            directive.location.start
        );

        if !detect {
            continue;
        }
        if hits == 0 {
            unnecessary.push(Offense::new(
                UNNECESSARY_DIRECTIVE_RULE,
                severity,
                directive.location,
                unnecessary_message(directive),
            ));
            continue;
        }
        for (detail, count) in directive.rule_name_details.iter().zip(&name_hits) {
            if *count == 0 && detail.name != ALL_RULES && ctx.is_enabled(&detail.name) {
                unnecessary.push(Offense::new(
                    UNNECESSARY_DIRECTIVE_RULE,
                    severity,
                    detail.location,
                    format!(
                        "No `{}` offense is suppressed by this herb:disable comment",
                        detail.name
                    ),
                ));
            }
        }
    }

    let suppressed_count = suppressed.iter().filter(|s| **s).count();
    let mut offenses: Vec<Offense> = raw
        .into_iter()
        .zip(suppressed)
        .filter_map(|(offense, hidden)| (!hidden).then_some(offense))
        .collect();
    sort_offenses(&mut offenses);
    sort_offenses(&mut unnecessary);

    LintResult {
        offenses,
        suppressed_count,
        unnecessary_directives: unnecessary,
    }
}

fn unnecessary_message(directive: &DisableComment) -> String {
    match directive.rules_string.as_deref() {
        Some(rules) => format!("Unnecessary herb:disable comment: no `{rules}` offense on this line"),
        None => "Unnecessary herb:disable comment: it names no rules".to_string(),
    }
}
