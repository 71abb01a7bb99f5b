//! Orchestration of one lint run: rules, suppression and autofix.

use std::collections::BTreeSet;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::autofix::{self, FixMode, FixOutcome, FixReport};
use crate::config::{Config, ConfigError};
use crate::context::LintContext;
use crate::directive::{self, DisableComment};
use crate::isolation::isolate;
use crate::registry::RuleRegistry;
use crate::rule::{AnyRule, DirectiveRule, DirectiveRuleBox, Rule, RuleBox};
use crate::suppression::{self, INTERNAL_ERROR_PREFIX, UNNECESSARY_DIRECTIVE_RULE};
use crate::syntax::{parse, print, Document, ParseError, ParseOptions};
use crate::types::{sort_offenses, LintResult, Location, Offense, Position, Severity};

/// Errors that can occur while linting.
#[derive(Debug, Error)]
pub enum LintError {
    /// Source text could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Builder for configuring a [`Linter`].
#[derive(Default)]
pub struct LinterBuilder {
    rules: Vec<AnyRule>,
    known_rule_names: BTreeSet<String>,
    config: Option<Config>,
    file_name: Option<PathBuf>,
    parse_options: ParseOptions,
}

impl LinterBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document rule.
    #[must_use]
    pub fn rule<R: Rule + 'static>(self, rule: R) -> Self {
        self.rule_box(Box::new(rule))
    }

    /// Adds a boxed document rule.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(AnyRule::Document(rule));
        self
    }

    /// Adds a directive rule.
    #[must_use]
    pub fn directive_rule<R: DirectiveRule + 'static>(self, rule: R) -> Self {
        self.directive_rule_box(Box::new(rule))
    }

    /// Adds a boxed directive rule.
    #[must_use]
    pub fn directive_rule_box(mut self, rule: DirectiveRuleBox) -> Self {
        self.rules.push(AnyRule::Directive(rule));
        self
    }

    /// Adds fresh instances of every rule in `registry`.
    #[must_use]
    pub fn registry(mut self, registry: &RuleRegistry) -> Self {
        self.known_rule_names
            .extend(registry.names().map(String::from));
        self.rules.extend(registry.instantiate());
        self
    }

    /// Declares rule names that are valid in directives and config even
    /// though no instance of them runs.
    #[must_use]
    pub fn known_rule_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_rule_names
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the name of the file being linted.
    #[must_use]
    pub fn file_name(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_name = Some(path.into());
        self
    }

    /// Sets the parser options used by [`Linter::lint_source`].
    #[must_use]
    pub fn parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    /// Builds the linter.
    ///
    /// # Errors
    ///
    /// Returns an error if two rules share a name, or if the configuration
    /// names a rule nobody knows.
    pub fn build(self) -> Result<Linter, LintError> {
        let config = self.config.unwrap_or_default();

        let mut valid = self.known_rule_names;
        valid.insert(UNNECESSARY_DIRECTIVE_RULE.to_string());
        let mut seen = BTreeSet::new();
        for rule in &self.rules {
            let name = rule.descriptor().name;
            if !seen.insert(name) || name == UNNECESSARY_DIRECTIVE_RULE {
                return Err(ConfigError::DuplicateRule {
                    name: name.to_string(),
                }
                .into());
            }
            valid.insert(name.to_string());
        }

        let mut configured: Vec<&String> = config.rules.keys().collect();
        configured.sort();
        if let Some(unknown) = configured.into_iter().find(|name| !valid.contains(*name)) {
            return Err(ConfigError::UnknownRule {
                name: unknown.clone(),
            }
            .into());
        }

        let mut context = LintContext::new().with_valid_rule_names(valid);
        context.file_name = self.file_name;
        context.severity_overrides = config
            .rules
            .iter()
            .filter_map(|(name, rule)| rule.severity.map(|s| (name.clone(), s)))
            .collect();

        let mut rules = Vec::with_capacity(self.rules.len());
        for rule in self.rules {
            let descriptor = rule.descriptor();
            if config.is_rule_enabled(descriptor.name, descriptor.enabled_by_default) {
                context.enabled_rules.insert(descriptor.name.to_string());
                rules.push(rule);
            } else {
                debug!("Skipping disabled rule: {}", descriptor.name);
            }
        }
        if config.is_rule_enabled(UNNECESSARY_DIRECTIVE_RULE, true) {
            context
                .enabled_rules
                .insert(UNNECESSARY_DIRECTIVE_RULE.to_string());
        }

        debug!("Built linter with {} enabled rules", rules.len());
        Ok(Linter {
            rules,
            context,
            max_fix_iterations: config.linter.max_fix_iterations,
            parse_options: self.parse_options,
        })
    }
}

/// Runs a set of rules over documents.
///
/// Use [`Linter::builder()`] to construct an instance. A linter owns its rule
/// instances; build one per thread when linting files in parallel.
pub struct Linter {
    rules: Vec<AnyRule>,
    context: LintContext,
    max_fix_iterations: usize,
    parse_options: ParseOptions,
}

impl Linter {
    /// Creates a new builder for configuring a linter.
    #[must_use]
    pub fn builder() -> LinterBuilder {
        LinterBuilder::new()
    }

    /// Returns the number of enabled rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Returns the run context shared with rules.
    #[must_use]
    pub fn context(&self) -> &LintContext {
        &self.context
    }

    /// Upper bound on passes in [`Linter::fix_source`].
    #[must_use]
    pub fn max_fix_iterations(&self) -> usize {
        self.max_fix_iterations
    }

    /// Lints a parsed document.
    ///
    /// Every enabled rule sees the same unmodified tree. A rule that panics is
    /// reported as an error offense attributed to it and the remaining rules
    /// still run. Suppression runs after all rules have finished.
    pub fn lint(&mut self, document: &Document) -> LintResult {
        let ctx = &self.context;
        let directives = directive::collect(document);
        let mut raw = Vec::new();

        for rule in &mut self.rules {
            let name = rule.descriptor().name;
            debug!("Running rule: {name}");
            let outcome = match rule {
                AnyRule::Document(rule) => isolate(|| {
                    rule.on_new_investigation();
                    rule.check(document, ctx)
                }),
                AnyRule::Directive(rule) => isolate(|| {
                    rule.on_new_investigation();
                    check_directives(&mut **rule, &directives, ctx)
                }),
            };
            match outcome {
                Ok(offenses) => raw.extend(apply_severity_override(ctx, name, offenses)),
                Err(message) => {
                    warn!("Rule {name} failed on {}: {message}", ctx.display_name());
                    raw.push(Offense::new(
                        name,
                        Severity::Error,
                        Location::new(Position::START, Position::START),
                        format!("{INTERNAL_ERROR_PREFIX} {message}"),
                    ));
                }
            }
        }

        let result = suppression::suppress(raw, &directives, ctx);
        debug!(
            "{}: {} offenses, {} suppressed, {} unnecessary directives",
            ctx.display_name(),
            result.offenses.len(),
            result.suppressed_count,
            result.unnecessary_directives.len()
        );
        result
    }

    /// Parses and lints source text.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be parsed.
    pub fn lint_source(&mut self, source: &str) -> Result<LintResult, LintError> {
        let document = parse(source, self.parse_options)?;
        Ok(self.lint(&document))
    }

    /// Applies one pass of fixes for the offenses in `result`.
    #[must_use]
    pub fn apply_fixes(&self, document: &Document, result: &LintResult, mode: FixMode) -> FixOutcome {
        autofix::apply_fixes(document, result, mode, |name| {
            self.rules.iter().find_map(|rule| match rule {
                AnyRule::Document(rule) if rule.name() == name => Some(&**rule),
                _ => None,
            })
        })
    }

    /// Fixes `source` until no fix applies or the iteration cap is reached.
    ///
    /// Each pass re-parses the previous output, so node ids and locations
    /// are always derived from the current text. Fixes that fail or panic
    /// are reported in the returned result as `internal error:` offenses,
    /// located where the fixed offense was found.
    ///
    /// # Errors
    ///
    /// Returns an error if the source, or a pass's output, cannot be parsed.
    pub fn fix_source(&mut self, source: &str, mode: FixMode) -> Result<FixReport, LintError> {
        let mut current = source.to_string();
        let mut iterations = 0;
        let mut applied = 0;
        let mut internal: Vec<Offense> = Vec::new();

        while iterations < self.max_fix_iterations {
            let document = parse(&current, self.parse_options)?;
            let result = self.lint(&document);
            if result.fixable_count() == 0 {
                break;
            }
            let mut outcome = self.apply_fixes(&document, &result, mode);
            for failure in outcome.internal.drain(..) {
                if !internal
                    .iter()
                    .any(|o| o.rule == failure.rule && o.message == failure.message)
                {
                    internal.push(failure);
                }
            }
            if outcome.applied == 0 {
                break;
            }
            let printed = print(&outcome.document);
            if printed == current {
                break;
            }
            iterations += 1;
            applied += outcome.applied;
            debug!(
                "Fix pass {iterations} on {}: {} applied, {} skipped",
                self.context.display_name(),
                outcome.applied,
                outcome.skipped
            );
            current = printed;
        }
        if iterations == self.max_fix_iterations && iterations > 0 {
            info!(
                "Stopped fixing {} after {iterations} passes",
                self.context.display_name()
            );
        }

        let mut result = self.lint_source(&current)?;
        result.offenses.extend(internal);
        sort_offenses(&mut result.offenses);
        Ok(FixReport {
            source: current,
            iterations,
            applied,
            result,
        })
    }
}

fn check_directives(
    rule: &mut dyn DirectiveRule,
    directives: &[DisableComment],
    ctx: &LintContext,
) -> Vec<Offense> {
    directives
        .iter()
        .flat_map(|comment| rule.check_directive(comment, ctx))
        .collect()
}

/// Applies severity overrides from configuration.
fn apply_severity_override(
    ctx: &LintContext,
    rule_name: &str,
    mut offenses: Vec<Offense>,
) -> Vec<Offense> {
    if let Some(severity) = ctx.severity_of(rule_name) {
        for o in &mut offenses {
            o.severity = severity;
        }
    }
    offenses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RuleDescriptor;
    use crate::syntax::{LiteralNode, NodeId, NodeKind, OpenTagNode, TreeError};
    use crate::visitor::{walk_document, VisitCx, Visitor, Walk};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const SHOUT: RuleDescriptor = RuleDescriptor::new("test-shout", "tag names must be upper case");
    const PANIC: RuleDescriptor = RuleDescriptor::new("test-panic", "always panics");
    const OPT_IN: RuleDescriptor =
        RuleDescriptor::new("test-opt-in", "only runs when enabled").disabled_by_default();

    /// Reports every lower-case tag name, once per distinct name.
    #[derive(Default)]
    struct Shout {
        seen: BTreeSet<String>,
        resets: Arc<AtomicUsize>,
    }

    impl Visitor for Shout {
        fn visit_open_tag(&mut self, id: NodeId, node: &OpenTagNode, cx: &mut VisitCx<'_>) -> Walk {
            let name = &node.tag_name.value;
            if name.chars().any(char::is_lowercase) && self.seen.insert(name.clone()) {
                cx.add_offense(format!("<{name}> is not shouting"), cx.location(id));
            }
            Walk::Continue
        }
    }

    impl Rule for Shout {
        fn descriptor(&self) -> &'static RuleDescriptor {
            &SHOUT
        }

        fn on_new_investigation(&mut self) {
            self.resets.fetch_add(1, Ordering::SeqCst);
            self.seen.clear();
        }

        fn check(&mut self, document: &Document, ctx: &LintContext) -> Vec<Offense> {
            walk_document(self, &SHOUT, document, ctx)
        }
    }

    struct Panics(&'static RuleDescriptor);

    impl Rule for Panics {
        fn descriptor(&self) -> &'static RuleDescriptor {
            self.0
        }

        fn check(&mut self, _: &Document, _: &LintContext) -> Vec<Offense> {
            panic!("exploded")
        }
    }

    /// Flips the case of every attribute literal, so it never converges.
    struct Flip(&'static RuleDescriptor);

    const FLIP_UP: RuleDescriptor = RuleDescriptor::new("test-flip-up", "upper").safe_autofix();
    const FLIP_DOWN: RuleDescriptor = RuleDescriptor::new("test-flip-down", "lower").safe_autofix();

    impl Flip {
        fn wants(&self, text: &str) -> String {
            if self.0.name == FLIP_UP.name {
                text.to_uppercase()
            } else {
                text.to_lowercase()
            }
        }
    }

    impl Visitor for Flip {
        fn visit_literal(&mut self, id: NodeId, node: &LiteralNode, cx: &mut VisitCx<'_>) -> Walk {
            if self.wants(&node.content.value) != node.content.value {
                cx.add_fixable_offense("wrong case", cx.location(id), id);
            }
            Walk::Continue
        }
    }

    impl Rule for Flip {
        fn descriptor(&self) -> &'static RuleDescriptor {
            self.0
        }

        fn check(&mut self, document: &Document, ctx: &LintContext) -> Vec<Offense> {
            walk_document(self, self.0, document, ctx)
        }

        fn autofix(&self, node: NodeId, document: &mut Document) -> Result<bool, TreeError> {
            let current = document.get(node).cloned().ok_or(TreeError::StaleNode(node))?;
            let NodeKind::Literal(literal) = &current.kind else {
                return Ok(false);
            };
            let content = literal.content.with_value(self.wants(&literal.content.value));
            document.replace_node(node, current.with_kind(NodeKind::Literal(LiteralNode { content })))?;
            Ok(true)
        }
    }

    #[test]
    fn test_builder_rejects_duplicate_rules() {
        let err = Linter::builder()
            .rule(Shout::default())
            .rule(Shout::default())
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, LintError::Config(ConfigError::DuplicateRule { .. })));
    }

    #[test]
    fn test_builder_rejects_unknown_configured_rules() {
        let config = Config::parse("[rules.html-nope]\nenabled = false").unwrap();
        let err = Linter::builder()
            .rule(Shout::default())
            .config(config)
            .build()
            .err()
            .unwrap();
        assert!(
            matches!(err, LintError::Config(ConfigError::UnknownRule { name }) if name == "html-nope")
        );
    }

    #[test]
    fn test_known_names_are_valid_in_config() {
        let config = Config::parse("[rules.html-elsewhere]\nenabled = false").unwrap();
        let linter = Linter::builder()
            .known_rule_names(["html-elsewhere"])
            .config(config)
            .build()
            .unwrap();
        assert!(linter.context().is_valid_rule_name("html-elsewhere"));
        assert!(linter.context().is_valid_rule_name(UNNECESSARY_DIRECTIVE_RULE));
    }

    #[test]
    fn test_disabled_by_default_rules_need_config() {
        let linter = Linter::builder().rule(Panics(&OPT_IN)).build().unwrap();
        assert_eq!(linter.rule_count(), 0);

        let config = Config::parse("[rules.test-opt-in]\nenabled = true").unwrap();
        let linter = Linter::builder()
            .rule(Panics(&OPT_IN))
            .config(config)
            .build()
            .unwrap();
        assert_eq!(linter.rule_count(), 1);
    }

    #[test]
    fn test_state_is_reset_before_every_check() {
        let resets = Arc::new(AtomicUsize::new(0));
        let rule = Shout {
            resets: Arc::clone(&resets),
            ..Shout::default()
        };
        let mut linter = Linter::builder().rule(rule).build().unwrap();

        let first = linter.lint_source("<div></div><div></div>").unwrap();
        let second = linter.lint_source("<div></div>").unwrap();
        assert_eq!(first.offenses.len(), 1);
        assert_eq!(second.offenses.len(), 1);
        assert_eq!(resets.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_panicking_rule_is_isolated() {
        let mut linter = Linter::builder()
            .rule(Panics(&PANIC))
            .rule(Shout::default())
            .build()
            .unwrap();
        let result = linter.lint_source("<p></p>").unwrap();

        assert_eq!(result.offenses.len(), 2);
        let internal = result
            .offenses
            .iter()
            .find(|o| o.rule == "test-panic")
            .unwrap();
        assert_eq!(internal.severity, Severity::Error);
        assert_eq!(internal.message, "internal error: exploded");
        assert!(result.offenses.iter().any(|o| o.rule == "test-shout"));
    }

    #[test]
    fn test_internal_errors_cannot_be_suppressed() {
        let mut linter = Linter::builder().rule(Panics(&PANIC)).build().unwrap();
        let result = linter
            .lint_source("<%# herb:disable test-panic %>")
            .unwrap();
        assert_eq!(result.offenses.len(), 1);
        assert_eq!(result.unnecessary_directives.len(), 1);
    }

    #[test]
    fn test_severity_override() {
        let config = Config::parse("[rules.test-shout]\nseverity = \"info\"").unwrap();
        let mut linter = Linter::builder()
            .rule(Shout::default())
            .config(config)
            .build()
            .unwrap();
        let result = linter.lint_source("<p></p>").unwrap();
        assert_eq!(result.offenses[0].severity, Severity::Info);
        assert!(!result.has_errors());
    }

    #[test]
    fn test_unnecessary_detector_can_be_disabled() {
        let config =
            Config::parse("[rules.herb-disable-comment-unnecessary]\nenabled = false").unwrap();
        let mut linter = Linter::builder()
            .rule(Shout::default())
            .config(config)
            .build()
            .unwrap();
        let result = linter
            .lint_source("<P></P> <%# herb:disable test-shout %>")
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_fix_source_terminates_on_oscillating_fixes() {
        let config = Config::parse("[linter]\nmax_fix_iterations = 4").unwrap();
        let mut linter = Linter::builder()
            .rule(Flip(&FLIP_UP))
            .rule(Flip(&FLIP_DOWN))
            .config(config)
            .build()
            .unwrap();

        let report = linter.fix_source("<a href=Ab>", FixMode::Safe).unwrap();
        assert_eq!(report.iterations, 4);
        assert!(report.changed());
        assert!(!report.result.is_empty());
    }

    #[test]
    fn test_fix_source_without_fixes_is_identity() {
        let source = "<p class=\"a\">\n  <%= link_to 'x', y %>\n</p>\n";
        let mut linter = Linter::builder().rule(Flip(&FLIP_DOWN)).build().unwrap();
        let report = linter.fix_source(source, FixMode::Safe).unwrap();
        assert_eq!(report.source, source);
        assert_eq!(report.iterations, 0);
        assert!(!report.changed());
    }

    const BROKEN_FIX: RuleDescriptor =
        RuleDescriptor::new("test-broken-fix", "fix always panics").safe_autofix();

    /// Flags every open tag and panics when asked to fix one.
    struct BrokenFix;

    impl Visitor for BrokenFix {
        fn visit_open_tag(&mut self, id: NodeId, _: &OpenTagNode, cx: &mut VisitCx<'_>) -> Walk {
            cx.add_fixable_offense("x", cx.location(id), id);
            Walk::Continue
        }
    }

    impl Rule for BrokenFix {
        fn descriptor(&self) -> &'static RuleDescriptor {
            &BROKEN_FIX
        }

        fn check(&mut self, document: &Document, ctx: &LintContext) -> Vec<Offense> {
            walk_document(self, &BROKEN_FIX, document, ctx)
        }

        fn autofix(&self, _: NodeId, _: &mut Document) -> Result<bool, TreeError> {
            panic!("cannot fix")
        }
    }

    #[test]
    fn test_fix_source_reports_panicking_autofix() {
        crate::install_panic_hook();
        let mut linter = Linter::builder().rule(BrokenFix).build().unwrap();
        let report = linter.fix_source("<p></p>", FixMode::Safe).unwrap();

        assert_eq!(report.source, "<p></p>");
        assert!(!report.changed());
        let messages: Vec<&str> = report
            .result
            .offenses
            .iter()
            .map(|o| o.message.as_str())
            .collect();
        assert_eq!(messages, ["x", "internal error: autofix panicked: cannot fix"]);
        assert!(report
            .result
            .offenses
            .iter()
            .all(|o| o.rule == "test-broken-fix"));
        assert!(report.result.has_errors());
    }
}
