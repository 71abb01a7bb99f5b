//! Rule forbidding values on boolean attributes.
//!
//! # Rationale
//!
//! A boolean attribute is true by presence alone: `disabled="false"` still
//! disables the element. Writing the bare name avoids that trap.
//!
//! # Detected Patterns
//!
//! - `<input disabled="disabled">`
//! - `<option selected=true>`
//!
//! # Allowed Patterns
//!
//! - Values produced by ERB, which usually mean the author relies on a
//!   helper to drop the attribute
//!
//! # Autofix
//!
//! Safe: removes the `=value` part. Attributes already without a value are
//! left alone.

use herb_lint_core::syntax::{AttributeNode, Document, NodeId, NodeKind, TreeError};
use herb_lint_core::{
    walk_document, LintContext, Offense, Rule, RuleDescriptor, VisitCx, Visitor, Walk,
};

/// Rule name for html-boolean-attributes-no-value.
pub const NAME: &str = "html-boolean-attributes-no-value";

/// Descriptor for html-boolean-attributes-no-value.
pub const DESCRIPTOR: RuleDescriptor =
    RuleDescriptor::new(NAME, "Forbids values on boolean attributes").safe_autofix();

/// Boolean attributes defined by the HTML standard.
const BOOLEAN_ATTRIBUTES: &[&str] = &[
    "allowfullscreen",
    "async",
    "autofocus",
    "autoplay",
    "checked",
    "controls",
    "default",
    "defer",
    "disabled",
    "formnovalidate",
    "hidden",
    "inert",
    "ismap",
    "itemscope",
    "loop",
    "multiple",
    "muted",
    "nomodule",
    "novalidate",
    "open",
    "playsinline",
    "readonly",
    "required",
    "reversed",
    "selected",
];

/// Forbids values on boolean attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlBooleanAttributesNoValue;

impl HtmlBooleanAttributesNoValue {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn is_boolean(name: &str) -> bool {
    BOOLEAN_ATTRIBUTES
        .iter()
        .any(|b| b.eq_ignore_ascii_case(name))
}

impl Rule for HtmlBooleanAttributesNoValue {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &DESCRIPTOR
    }

    fn check(&mut self, document: &Document, ctx: &LintContext) -> Vec<Offense> {
        walk_document(self, &DESCRIPTOR, document, ctx)
    }

    fn autofix(&self, node: NodeId, document: &mut Document) -> Result<bool, TreeError> {
        let current = document.node(node)?.clone();
        let NodeKind::Attribute(attribute) = &current.kind else {
            return Ok(false);
        };
        if attribute.value.is_none() && attribute.equals.is_none() {
            tracing::debug!("{} has no value to drop", attribute.name.value);
            return Ok(false);
        }
        let bare = AttributeNode {
            name: attribute.name.clone(),
            equals: None,
            value: None,
        };
        let mut replacement = current.with_kind(NodeKind::Attribute(bare));
        replacement.location = attribute.name.location;
        document.replace_node(node, replacement)?;
        Ok(true)
    }
}

impl Visitor for HtmlBooleanAttributesNoValue {
    fn visit_attribute(&mut self, id: NodeId, node: &AttributeNode, cx: &mut VisitCx<'_>) -> Walk {
        let name = &node.name.value;
        let Some(value) = node.value else {
            return Walk::SkipChildren;
        };
        if !is_boolean(name) {
            return Walk::SkipChildren;
        }
        let document = cx.document();
        let has_erb = document.children(value).iter().any(|child| {
            matches!(
                document.get(*child).map(|n| &n.kind),
                Some(NodeKind::ErbContent(_))
            )
        });
        if !has_erb {
            cx.add_fixable_offense(
                format!(
                    "Boolean attribute `{name}` should not have a value. Use `{name}` instead of `{name}=\"{name}\"`."
                ),
                cx.location(id),
                id,
            );
        }
        Walk::SkipChildren
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herb_lint_core::syntax::{parse, print, ParseOptions};
    use herb_lint_core::{FixMode, Linter};

    fn check_code(source: &str) -> Vec<Offense> {
        let doc = parse(source, ParseOptions::default()).expect("Failed to parse");
        HtmlBooleanAttributesNoValue::new().check(&doc, &LintContext::new())
    }

    #[test]
    fn test_detects_boolean_with_value() {
        let offenses = check_code("<input disabled=\"disabled\" CHECKED=true type=\"checkbox\">");
        assert_eq!(offenses.len(), 2);
        assert!(offenses[0].message.starts_with("Boolean attribute `disabled`"));
        assert!(offenses[1].message.starts_with("Boolean attribute `CHECKED`"));
    }

    #[test]
    fn test_allows_bare_and_erb_values() {
        assert!(check_code("<input disabled required=\"<%= required? %>\" value=\"x\">").is_empty());
    }

    #[test]
    fn test_autofix_drops_value() {
        let mut linter = Linter::builder()
            .rule(HtmlBooleanAttributesNoValue::new())
            .build()
            .expect("Failed to build linter");
        let report = linter
            .fix_source("<select>\n  <option selected=\"selected\">A</option>\n</select>", FixMode::Safe)
            .expect("Failed to fix");
        assert_eq!(
            report.source,
            "<select>\n  <option selected>A</option>\n</select>"
        );
        assert!(report.result.is_empty());
    }

    #[test]
    fn test_autofix_without_value_returns_false() {
        let mut doc = parse("<input hidden>", ParseOptions::default()).expect("Failed to parse");
        let element = doc.children(doc.root())[0];
        let open = doc.children(element)[0];
        let attribute = doc.children(open)[1];
        assert_eq!(
            HtmlBooleanAttributesNoValue.autofix(attribute, &mut doc),
            Ok(false)
        );
        assert_eq!(print(&doc), "<input hidden>");
    }
}
