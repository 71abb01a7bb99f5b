//! Rule forbidding `<a>` elements inside other `<a>` elements.
//!
//! # Rationale
//!
//! Nested links are invalid HTML; browsers close the outer link early and
//! the resulting DOM differs from the template.

use herb_lint_core::syntax::{Document, ElementNode, NodeId};
use herb_lint_core::{
    walk_document, LintContext, Offense, Rule, RuleDescriptor, VisitCx, Visitor, Walk,
};

/// Rule name for html-no-nested-links.
pub const NAME: &str = "html-no-nested-links";

/// Descriptor for html-no-nested-links.
pub const DESCRIPTOR: RuleDescriptor =
    RuleDescriptor::new(NAME, "Forbids links nested inside other links");

/// Forbids nested `<a>` elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlNoNestedLinks;

impl HtmlNoNestedLinks {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for HtmlNoNestedLinks {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &DESCRIPTOR
    }

    fn check(&mut self, document: &Document, ctx: &LintContext) -> Vec<Offense> {
        walk_document(self, &DESCRIPTOR, document, ctx)
    }
}

impl Visitor for HtmlNoNestedLinks {
    fn visit_element(&mut self, id: NodeId, node: &ElementNode, cx: &mut VisitCx<'_>) -> Walk {
        let is_link = |name: &str| name.eq_ignore_ascii_case("a");
        let this_is_link = cx.document().element_tag_name(id).is_some_and(is_link);
        if this_is_link && cx.enclosing_elements().any(is_link) {
            cx.add_offense(
                "Nested `<a>` elements are not allowed. Links cannot contain other links.",
                cx.location(node.open_tag),
            );
        }
        Walk::Continue
    }
}
