//! Autofix orchestration.
//!
//! A pass walks the unsuppressed fixable offenses of one lint result in
//! location order and hands each target node to its rule. Every fix runs on a
//! clone of the working document; the clone is only kept when the rule
//! reports a change, so a failing or panicking fix leaves no partial edit.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::isolation::isolate;
use crate::rule::Rule;
use crate::suppression::INTERNAL_ERROR_PREFIX;
use crate::syntax::{Document, TreeError};
use crate::types::{FixSafety, LintResult, Offense, Severity};

/// Which fixes a run may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixMode {
    /// Only semantics-preserving fixes.
    #[default]
    Safe,
    /// Safe fixes and fixes that may change behaviour.
    SafeAndUnsafe,
}

impl FixMode {
    /// Whether a fix of the given safety may run in this mode.
    #[must_use]
    pub fn allows(self, safety: FixSafety) -> bool {
        match self {
            Self::Safe => safety == FixSafety::Safe,
            Self::SafeAndUnsafe => true,
        }
    }
}

/// Result of one fix pass.
#[derive(Debug, Clone)]
pub struct FixOutcome {
    /// The document after every accepted fix.
    pub document: Document,
    /// Number of fixes that changed the document.
    pub applied: usize,
    /// Number of fixes rejected, failed or not allowed by the mode.
    pub skipped: usize,
    /// `internal error:` offenses for fixes that failed or panicked.
    pub internal: Vec<Offense>,
}

/// Result of fixing a source text to a fixed point.
#[derive(Debug, Clone)]
pub struct FixReport {
    /// Fixed source text.
    pub source: String,
    /// Number of passes that applied at least one fix.
    pub iterations: usize,
    /// Total fixes applied across passes.
    pub applied: usize,
    /// Lint result of the fixed source.
    pub result: LintResult,
}

impl FixReport {
    /// Whether the source text changed.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.applied > 0
    }
}

/// Runs one fix pass over `document`.
///
/// `lookup` resolves a rule name to the rule instance that reported it.
pub fn apply_fixes<'r, F>(
    document: &Document,
    result: &LintResult,
    mode: FixMode,
    lookup: F,
) -> FixOutcome
where
    F: Fn(&str) -> Option<&'r dyn Rule>,
{
    let mut working = document.clone();
    let mut applied = 0;
    let mut skipped = 0;
    let mut internal = Vec::new();

    for offense in &result.offenses {
        let Some(target) = offense.fix else {
            continue;
        };
        if !mode.allows(target.safety) {
            debug!(
                "skipping {} fix for {} in {mode:?} mode",
                target.safety, offense.rule
            );
            skipped += 1;
            continue;
        }
        let Some(rule) = lookup(&offense.rule) else {
            warn!("no rule instance for fixable offense {}", offense.rule);
            skipped += 1;
            continue;
        };

        let mut candidate = working.clone();
        let attempt = isolate(|| rule.autofix(target.node, &mut candidate));
        match attempt {
            Ok(Ok(true)) => {
                debug!("{} fixed node {} at {}", offense.rule, target.node, offense.location.start);
                working = candidate;
                applied += 1;
            }
            Ok(Ok(false)) => {
                debug!("{} left node {} unchanged", offense.rule, target.node);
            }
            Ok(Err(TreeError::StaleNode(node))) => {
                debug!("{} target {node} was replaced earlier in this pass", offense.rule);
                skipped += 1;
            }
            Ok(Err(err)) => {
                warn!("{} fix rejected: {err}", offense.rule);
                skipped += 1;
                internal.push(fix_failure(offense, &format!("autofix failed: {err}")));
            }
            Err(message) => {
                warn!("{} panicked while fixing node {}", offense.rule, target.node);
                skipped += 1;
                internal.push(fix_failure(offense, &format!("autofix panicked: {message}")));
            }
        }
    }

    FixOutcome {
        document: working,
        applied,
        skipped,
        internal,
    }
}

fn fix_failure(offense: &Offense, detail: &str) -> Offense {
    Offense::new(
        offense.rule.clone(),
        Severity::Error,
        offense.location,
        format!("{INTERNAL_ERROR_PREFIX} {detail}"),
    )
}
