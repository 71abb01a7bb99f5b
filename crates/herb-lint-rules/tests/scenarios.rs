//! End-to-end behaviour of the built-in rules running through the linter.

use herb_lint_core::syntax::{parse, print, ParseOptions};
use herb_lint_core::{
    Config, FixMode, LintResult, Linter, Offense, Position, Severity, UNNECESSARY_DIRECTIVE_RULE,
};
use herb_lint_rules::{
    registry, HtmlAttributeValuesRequireQuotes, HtmlNoDuplicateIds, HtmlTagNameLowercase,
};

fn linter_with_registry(config: &str) -> Linter {
    let config = Config::parse(config).expect("Failed to parse config");
    Linter::builder()
        .registry(&registry().expect("Failed to build registry"))
        .config(config)
        .build()
        .expect("Failed to build linter")
}

fn only(rules: &[&str]) -> String {
    let registry = registry().expect("Failed to build registry");
    registry
        .names()
        .map(|name| {
            format!(
                "[rules.{name}]\nenabled = {}\n",
                rules.contains(&name)
            )
        })
        .collect()
}

fn rules_of(result: &LintResult) -> Vec<&str> {
    result.all_offenses().iter().map(|o| o.rule.as_str()).collect()
}

#[test]
fn uppercase_tags_and_unquoted_values_are_reported_then_fixed() {
    let mut linter = Linter::builder()
        .rule(HtmlTagNameLowercase::new())
        .rule(HtmlAttributeValuesRequireQuotes::new())
        .build()
        .expect("Failed to build linter");
    let source = "<DIV class=foo></DIV>";

    let result = linter.lint_source(source).expect("Failed to lint");
    assert_eq!(result.offenses.len(), 3);
    assert_eq!(
        rules_of(&result),
        [
            "html-tag-name-lowercase",
            "html-attribute-values-require-quotes",
            "html-tag-name-lowercase",
        ]
    );

    let document = parse(source, ParseOptions::default()).expect("Failed to parse");
    let outcome = linter.apply_fixes(&document, &result, FixMode::Safe);
    assert_eq!(outcome.applied, 3);
    assert_eq!(outcome.skipped, 0);
    let fixed = print(&outcome.document);
    assert_eq!(fixed, r#"<div class="foo"></div>"#);

    let rerun = linter.lint_source(&fixed).expect("Failed to lint");
    assert!(rerun.offenses.is_empty());
}

#[test]
fn directive_without_violation_is_the_only_finding() {
    let mut linter = linter_with_registry(&only(&["html-tag-name-lowercase"]));
    let result = linter
        .lint_source("<div>x</div> <%# herb:disable html-tag-name-lowercase %>")
        .expect("Failed to lint");

    assert!(result.offenses.is_empty());
    assert_eq!(result.unnecessary_directives.len(), 1);
    let report = &result.unnecessary_directives[0];
    assert_eq!(report.rule, UNNECESSARY_DIRECTIVE_RULE);
    assert_eq!(report.severity, Severity::Warning);
    assert_eq!(report.location.start, Position::new(1, 13));
}

#[test]
fn empty_directive_is_unnecessary_regardless_of_other_findings() {
    let mut linter = linter_with_registry(&only(&["html-tag-name-lowercase"]));
    let result = linter
        .lint_source("<DIV>x</DIV> <%# herb:disable %>")
        .expect("Failed to lint");

    assert_eq!(result.suppressed_count, 0);
    assert_eq!(result.offenses.len(), 2);
    assert_eq!(result.unnecessary_directives.len(), 1);
}

#[test]
fn suppression_by_name_and_by_all() {
    for directive in ["html-tag-name-lowercase", "all"] {
        let mut linter = linter_with_registry(&only(&["html-tag-name-lowercase"]));
        let source = format!("<P>x</P> <%# herb:disable {directive} %>");
        let result = linter.lint_source(&source).expect("Failed to lint");
        assert!(result.is_empty(), "{directive}: {:?}", rules_of(&result));
        assert_eq!(result.suppressed_count, 2);
    }
}

#[test]
fn directive_naming_another_rule_does_not_suppress() {
    let mut linter = linter_with_registry(&only(&[
        "html-tag-name-lowercase",
        "html-no-nested-links",
    ]));
    let result = linter
        .lint_source("<P>x</P> <%# herb:disable html-no-nested-links %>")
        .expect("Failed to lint");
    assert_eq!(result.offenses.len(), 2);
    assert_eq!(result.unnecessary_directives.len(), 1);
}

#[test]
fn suppression_only_covers_the_directive_lines() {
    let mut linter = linter_with_registry(&only(&["html-tag-name-lowercase"]));
    let result = linter
        .lint_source("<B>a</B> <%# herb:disable html-tag-name-lowercase %>\n<I>b</I>")
        .expect("Failed to lint");
    assert_eq!(result.suppressed_count, 2);
    assert_eq!(result.offenses.len(), 2);
    assert!(result.offenses.iter().all(|o| o.location.start.line == 2));
}

#[test]
fn directive_diagnostics_stay_visible_under_all() {
    let mut linter = linter_with_registry("");
    let result = linter
        .lint_source("<P>x</P> <%# herb:disable all, html-tag-name-lowercase, html-tag-name-lowercase %>")
        .expect("Failed to lint");

    let mut rules = rules_of(&result);
    rules.sort_unstable();
    assert_eq!(
        rules,
        [
            "herb-disable-comment-no-duplicate-rules",
            "herb-disable-comment-no-redundant-all",
            "herb-disable-comment-no-redundant-all",
        ]
    );
    assert_eq!(result.suppressed_count, 2);
}

#[test]
fn unknown_rule_names_are_flagged_with_suggestions() {
    let mut linter = linter_with_registry("");
    let result = linter
        .lint_source("<p>x</p> <%# herb:disable html-no-nested-link %>")
        .expect("Failed to lint");
    let invalid: Vec<&Offense> = result
        .offenses
        .iter()
        .filter(|o| o.rule == "herb-disable-comment-valid-rule-name")
        .collect();
    assert_eq!(invalid.len(), 1);
    assert!(invalid[0].message.ends_with("Did you mean `html-no-nested-links`?"));
    assert_eq!(result.unnecessary_directives.len(), 1);
}

#[test]
fn stateful_rule_does_not_leak_between_files() {
    let mut linter = Linter::builder()
        .rule(HtmlNoDuplicateIds::new())
        .build()
        .expect("Failed to build linter");
    let first = linter
        .lint_source("<div id=\"main\"></div><div id=\"main\"></div>")
        .expect("Failed to lint");
    let second = linter
        .lint_source("<div id=\"main\"></div>")
        .expect("Failed to lint");
    assert_eq!(first.offenses.len(), 1);
    assert!(second.offenses.is_empty());
}

#[test]
fn fixing_a_clean_document_is_the_identity() {
    let source = "<!DOCTYPE html>\n<html>\n  <body class=\"x\">\n    <%= render 'nav' %>\n    <!-- note -->\n  </body>\n</html>\n";
    let mut linter = linter_with_registry("");
    let report = linter.fix_source(source, FixMode::SafeAndUnsafe).expect("Failed to fix");
    assert_eq!(report.source, source);
    assert_eq!(report.iterations, 0);
    assert!(report.result.is_empty());
}

#[test]
fn fixes_reach_a_fixed_point_within_the_cap() {
    let mut linter = linter_with_registry("");
    let source = "<UL>\n  <LI><INPUT type=checkbox checked=checked></LI>\n</UL>\n";
    let report = linter.fix_source(source, FixMode::Safe).expect("Failed to fix");

    assert_eq!(
        report.source,
        "<ul>\n  <li><input type=\"checkbox\" checked></li>\n</ul>\n"
    );
    assert!(report.iterations <= linter.max_fix_iterations());
    assert!(report.result.is_empty());

    let again = linter.fix_source(&report.source, FixMode::Safe).expect("Failed to fix");
    assert_eq!(again.source, report.source);
    assert!(!again.changed());
}

#[test]
fn fixes_inside_suppressed_lines_are_not_applied() {
    let mut linter = linter_with_registry("");
    let source = "<B>a</B> <%# herb:disable html-tag-name-lowercase %>\n<I>b</I>\n";
    let report = linter.fix_source(source, FixMode::Safe).expect("Failed to fix");
    assert_eq!(
        report.source,
        "<B>a</B> <%# herb:disable html-tag-name-lowercase %>\n<i>b</i>\n"
    );
}

#[test]
fn report_lines_read_top_to_bottom() {
    let mut linter = linter_with_registry("");
    let result = linter
        .lint_source("<DIV class=foo></DIV>")
        .expect("Failed to lint");
    let report: Vec<String> = result.all_offenses().iter().map(ToString::to_string).collect();
    insta::assert_snapshot!(report.join("\n"), @r#"
    1:1: error [html-tag-name-lowercase] Opening tag name `<DIV>` should be lowercase. Use `<div>` instead.
    1:11: error [html-attribute-values-require-quotes] Attribute value should be quoted: `class="foo"`. Always wrap attribute values in quotes.
    1:17: error [html-tag-name-lowercase] Closing tag name `</DIV>` should be lowercase. Use `</div>` instead.
    "#);
}
