//! Rule forbidding duplicate `id` attributes within a document.
//!
//! # Rationale
//!
//! Element ids must be unique; `getElementById`, label `for` and fragment
//! links silently pick the first match.
//!
//! # Detected Patterns
//!
//! - Two static `id="x"` attributes in one template
//!
//! # Allowed Patterns
//!
//! - Ids built with ERB, which cannot be compared statically

use std::collections::HashMap;

use herb_lint_core::syntax::{AttributeNode, Document, NodeId, NodeKind};
use herb_lint_core::{
    walk_document, LintContext, Location, Offense, Rule, RuleDescriptor, VisitCx, Visitor, Walk,
};

/// Rule name for html-no-duplicate-ids.
pub const NAME: &str = "html-no-duplicate-ids";

/// Descriptor for html-no-duplicate-ids.
pub const DESCRIPTOR: RuleDescriptor =
    RuleDescriptor::new(NAME, "Forbids duplicate id attributes in a document");

/// Forbids duplicate ids.
///
/// Keeps the ids seen so far; the set is cleared before every document.
#[derive(Debug, Clone, Default)]
pub struct HtmlNoDuplicateIds {
    seen: HashMap<String, Location>,
}

impl HtmlNoDuplicateIds {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Rule for HtmlNoDuplicateIds {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &DESCRIPTOR
    }

    fn on_new_investigation(&mut self) {
        self.seen.clear();
    }

    fn check(&mut self, document: &Document, ctx: &LintContext) -> Vec<Offense> {
        walk_document(self, &DESCRIPTOR, document, ctx)
    }
}

impl Visitor for HtmlNoDuplicateIds {
    fn visit_attribute(&mut self, _id: NodeId, node: &AttributeNode, cx: &mut VisitCx<'_>) -> Walk {
        if !node.name.value.eq_ignore_ascii_case("id") {
            return Walk::SkipChildren;
        }
        let Some(value) = node.value else {
            return Walk::SkipChildren;
        };

        let document = cx.document();
        let mut text = String::new();
        for child in document.children(value) {
            match document.get(child).map(|n| &n.kind) {
                Some(NodeKind::Literal(literal)) => text.push_str(&literal.content.value),
                _ => return Walk::SkipChildren,
            }
        }
        let text = text.trim();
        if text.is_empty() {
            return Walk::SkipChildren;
        }

        let location = cx.location(value);
        if let Some(first) = self.seen.get(text) {
            cx.add_offense(
                format!(
                    "Duplicate ID `{text}` found. IDs must be unique within a document (first defined at line {}).",
                    first.start.line
                ),
                location,
            );
        } else {
            self.seen.insert(text.to_string(), location);
        }
        Walk::SkipChildren
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herb_lint_core::syntax::{parse, ParseOptions};

    fn check_code(rule: &mut HtmlNoDuplicateIds, source: &str) -> Vec<Offense> {
        let doc = parse(source, ParseOptions::default()).expect("Failed to parse");
        rule.on_new_investigation();
        rule.check(&doc, &LintContext::new())
    }

    #[test]
    fn test_detects_duplicate_ids() {
        let mut rule = HtmlNoDuplicateIds::new();
        let offenses = check_code(
            &mut rule,
            "<div id=\"main\"></div>\n<section id=main></section>\n<p id=\"other\"></p>",
        );
        assert_eq!(offenses.len(), 1);
        assert_eq!(offenses[0].location.start.line, 2);
        assert!(offenses[0].message.contains("first defined at line 1"));
    }

    #[test]
    fn test_ignores_dynamic_ids() {
        let mut rule = HtmlNoDuplicateIds::new();
        let offenses = check_code(
            &mut rule,
            "<div id=\"item-<%= a %>\"></div><div id=\"item-<%= a %>\"></div>",
        );
        assert!(offenses.is_empty());
    }

    #[test]
    fn test_state_does_not_leak_between_documents() {
        let mut rule = HtmlNoDuplicateIds::new();
        assert!(check_code(&mut rule, "<div id=\"a\"></div>").is_empty());
        assert!(check_code(&mut rule, "<div id=\"a\"></div>").is_empty());
    }
}
