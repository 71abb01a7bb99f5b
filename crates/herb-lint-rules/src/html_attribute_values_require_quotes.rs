//! Rule requiring quoted attribute values.
//!
//! # Rationale
//!
//! Unquoted values break as soon as they contain a space, `=` or `>`, which
//! is easy to miss when the value is produced by ERB.
//!
//! # Detected Patterns
//!
//! - `<div class=foo>`
//! - `<input value=<%= value %>>`
//!
//! # Autofix
//!
//! Safe: wraps the value in double quotes, or in single quotes when the value
//! itself contains a double quote. A value holding both quote characters is
//! wrapped in double quotes with its literal `"` written as `&quot;`.

use herb_lint_core::syntax::{
    AttributeValueNode, Document, LiteralNode, NodeId, NodeKind, Token, TreeError,
};
use herb_lint_core::{
    walk_document, LintContext, Location, Offense, Rule, RuleDescriptor, VisitCx, Visitor, Walk,
};

/// Rule name for html-attribute-values-require-quotes.
pub const NAME: &str = "html-attribute-values-require-quotes";

/// Descriptor for html-attribute-values-require-quotes.
pub const DESCRIPTOR: RuleDescriptor =
    RuleDescriptor::new(NAME, "Requires attribute values to be quoted").safe_autofix();

/// Requires quoted attribute values.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlAttributeValuesRequireQuotes;

impl HtmlAttributeValuesRequireQuotes {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for HtmlAttributeValuesRequireQuotes {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &DESCRIPTOR
    }

    fn check(&mut self, document: &Document, ctx: &LintContext) -> Vec<Offense> {
        walk_document(self, &DESCRIPTOR, document, ctx)
    }

    fn autofix(&self, node: NodeId, document: &mut Document) -> Result<bool, TreeError> {
        let NodeKind::AttributeValue(value) = &document.node(node)?.kind else {
            return Ok(false);
        };
        if value.is_quoted() {
            return Ok(false);
        }

        let text = value_text(document, value);
        let quote = match (text.contains('"'), text.contains('\'')) {
            (true, false) => "'",
            (true, true) => {
                escape_double_quotes(node, document)?;
                "\""
            }
            (false, _) => "\"",
        };
        let current = document.node(node)?.clone();
        let NodeKind::AttributeValue(value) = &current.kind else {
            return Ok(false);
        };
        let Location { start, end } = current.location;
        let replacement = AttributeValueNode {
            open_quote: Some(Token::new(quote, Location::new(start, start))),
            children: value.children.clone(),
            close_quote: Some(Token::new(quote, Location::new(end, end))),
        };
        document.replace_node(node, current.with_kind(NodeKind::AttributeValue(replacement)))?;
        Ok(true)
    }
}

/// Rewrites `"` as `&quot;` in every literal child of `value`.
fn escape_double_quotes(value: NodeId, document: &mut Document) -> Result<(), TreeError> {
    for child in document.children(value) {
        let literal = document.node(child)?.clone();
        let NodeKind::Literal(LiteralNode { content }) = &literal.kind else {
            continue;
        };
        if !content.value.contains('"') {
            continue;
        }
        let escaped = LiteralNode {
            content: content.with_value(content.value.replace('"', "&quot;")),
        };
        document.replace_node(child, literal.with_kind(NodeKind::Literal(escaped)))?;
    }
    Ok(())
}

/// Literal text of a value, ERB tags excluded.
fn value_text(document: &Document, value: &AttributeValueNode) -> String {
    value
        .children
        .iter()
        .filter_map(|id| match document.get(*id).map(|n| &n.kind) {
            Some(NodeKind::Literal(literal)) => Some(literal.content.value.as_str()),
            _ => None,
        })
        .collect()
}

/// Source text of a value, ERB tags included, for messages.
fn value_source(document: &Document, value: &AttributeValueNode) -> String {
    value
        .children
        .iter()
        .filter_map(|id| document.get(*id))
        .map(|node| match &node.kind {
            NodeKind::Literal(literal) => literal.content.value.clone(),
            NodeKind::ErbContent(erb) => format!(
                "{}{}{}",
                erb.tag_opening.value, erb.content.value, erb.tag_closing.value
            ),
            _ => String::new(),
        })
        .collect()
}

impl Visitor for HtmlAttributeValuesRequireQuotes {
    fn visit_attribute_value(
        &mut self,
        id: NodeId,
        node: &AttributeValueNode,
        cx: &mut VisitCx<'_>,
    ) -> Walk {
        if node.is_quoted() || node.children.is_empty() {
            return Walk::SkipChildren;
        }
        let document = cx.document();
        let name = cx
            .parent()
            .and_then(|parent| match document.get(parent).map(|n| &n.kind) {
                Some(NodeKind::Attribute(attribute)) => Some(attribute.name.value.as_str()),
                _ => None,
            })
            .unwrap_or_default();
        let value = value_source(document, node);
        cx.add_fixable_offense(
            format!(
                "Attribute value should be quoted: `{name}=\"{value}\"`. Always wrap attribute values in quotes."
            ),
            cx.location(id),
            id,
        );
        Walk::SkipChildren
    }
}
