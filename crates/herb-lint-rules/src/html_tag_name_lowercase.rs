//! Rule requiring lowercase HTML tag names.
//!
//! # Rationale
//!
//! HTML tag names are case-insensitive, but mixed case makes templates
//! harder to scan and to grep. Lowercase is the convention.
//!
//! # Detected Patterns
//!
//! - `<DIV>`, `<Span>` and their close tags
//!
//! # Allowed Patterns
//!
//! - Anything inside `<svg>`, where names like `foreignObject` and
//!   `linearGradient` are case-sensitive
//!
//! # Autofix
//!
//! Safe: rewrites the tag name in lowercase.

use herb_lint_core::syntax::{CloseTagNode, Document, ElementNode, NodeId, NodeKind, OpenTagNode, TreeError};
use herb_lint_core::{
    walk_document, LintContext, Offense, Rule, RuleDescriptor, VisitCx, Visitor, Walk,
};

/// Rule name for html-tag-name-lowercase.
pub const NAME: &str = "html-tag-name-lowercase";

/// Descriptor for html-tag-name-lowercase.
pub const DESCRIPTOR: RuleDescriptor =
    RuleDescriptor::new(NAME, "Requires lowercase HTML tag names").safe_autofix();

/// Requires lowercase tag names.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlTagNameLowercase;

impl HtmlTagNameLowercase {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for HtmlTagNameLowercase {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &DESCRIPTOR
    }

    fn check(&mut self, document: &Document, ctx: &LintContext) -> Vec<Offense> {
        walk_document(self, &DESCRIPTOR, document, ctx)
    }

    fn autofix(&self, node: NodeId, document: &mut Document) -> Result<bool, TreeError> {
        let current = document.node(node)?.clone();
        let kind = match &current.kind {
            NodeKind::OpenTag(tag) => {
                let Some(lower) = lowered(&tag.tag_name.value) else {
                    return Ok(false);
                };
                NodeKind::OpenTag(OpenTagNode {
                    tag_name: tag.tag_name.with_value(lower),
                    ..tag.clone()
                })
            }
            NodeKind::CloseTag(tag) => {
                let Some(lower) = lowered(&tag.tag_name.value) else {
                    return Ok(false);
                };
                NodeKind::CloseTag(CloseTagNode {
                    tag_name: tag.tag_name.with_value(lower),
                    ..tag.clone()
                })
            }
            _ => return Ok(false),
        };
        document.replace_node(node, current.with_kind(kind))?;
        Ok(true)
    }
}

/// Lowercase form of `name`, or `None` if it already is lowercase.
fn lowered(name: &str) -> Option<String> {
    let lower = name.to_lowercase();
    (lower != name).then_some(lower)
}

fn check_open_tag(id: NodeId, tag: &OpenTagNode, cx: &mut VisitCx<'_>) {
    let name = &tag.tag_name.value;
    if let Some(lower) = lowered(name) {
        cx.add_fixable_offense(
            format!("Opening tag name `<{name}>` should be lowercase. Use `<{lower}>` instead."),
            tag.tag_name.location,
            id,
        );
    }
}

fn check_close_tag(id: NodeId, tag: &CloseTagNode, cx: &mut VisitCx<'_>) {
    let name = &tag.tag_name.value;
    if let Some(lower) = lowered(name) {
        cx.add_fixable_offense(
            format!("Closing tag name `</{name}>` should be lowercase. Use `</{lower}>` instead."),
            tag.tag_name.location,
            id,
        );
    }
}

impl Visitor for HtmlTagNameLowercase {
    fn visit_element(&mut self, id: NodeId, node: &ElementNode, cx: &mut VisitCx<'_>) -> Walk {
        let is_svg = cx
            .document()
            .element_tag_name(id)
            .is_some_and(|name| name.eq_ignore_ascii_case("svg"));
        if !is_svg {
            return Walk::Continue;
        }

        // the <svg> tags themselves are still checked, their content is not
        let document = cx.document();
        if let Some(NodeKind::OpenTag(tag)) = document.get(node.open_tag).map(|n| &n.kind) {
            check_open_tag(node.open_tag, tag, cx);
        }
        if let Some(close) = node.close_tag {
            if let Some(NodeKind::CloseTag(tag)) = document.get(close).map(|n| &n.kind) {
                check_close_tag(close, tag, cx);
            }
        }
        Walk::SkipChildren
    }

    fn visit_open_tag(&mut self, id: NodeId, node: &OpenTagNode, cx: &mut VisitCx<'_>) -> Walk {
        check_open_tag(id, node, cx);
        Walk::Continue
    }

    fn visit_close_tag(&mut self, id: NodeId, node: &CloseTagNode, cx: &mut VisitCx<'_>) -> Walk {
        check_close_tag(id, node, cx);
        Walk::Continue
    }
}
