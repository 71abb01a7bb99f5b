//! Tree-walking dispatch for document rules.
//!
//! A rule implements [`Visitor`] and overrides only the callbacks for the
//! node kinds it cares about. The walker owns descent: after a callback
//! returns [`Walk::Continue`] it visits the node's children, so forgetting to
//! recurse is impossible. Returning [`Walk::SkipChildren`] prunes the subtree.
//!
//! Order is pre-order, depth-first, document order.

use crate::context::LintContext;
use crate::rule::RuleDescriptor;
use crate::syntax::{
    AttributeNode, AttributeValueNode, CloseTagNode, Document, DocumentNode, DoctypeNode,
    ElementNode, ErbContentNode, HtmlCommentNode, LiteralNode, Node, NodeId, NodeKind,
    OpenTagNode, TextNode, WhitespaceNode,
};
use crate::types::{Location, Offense};

/// What the walker does after a callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Walk {
    /// Visit the node's children next.
    #[default]
    Continue,
    /// Do not descend into this node.
    SkipChildren,
}

/// Per-traversal state shared with visitor callbacks.
pub struct VisitCx<'a> {
    document: &'a Document,
    context: &'a LintContext,
    descriptor: &'static RuleDescriptor,
    ancestors: Vec<NodeId>,
    offenses: Vec<Offense>,
}

impl<'a> VisitCx<'a> {
    /// Creates a traversal context for one rule over one document.
    #[must_use]
    pub fn new(
        descriptor: &'static RuleDescriptor,
        document: &'a Document,
        context: &'a LintContext,
    ) -> Self {
        Self {
            document,
            context,
            descriptor,
            ancestors: Vec::new(),
            offenses: Vec::new(),
        }
    }

    /// The document being walked.
    #[must_use]
    pub fn document(&self) -> &'a Document {
        self.document
    }

    /// The run context.
    #[must_use]
    pub fn context(&self) -> &'a LintContext {
        self.context
    }

    /// Ids from the root down to the parent of the current node.
    #[must_use]
    pub fn ancestors(&self) -> &[NodeId] {
        &self.ancestors
    }

    /// Parent of the current node.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.ancestors.last().copied()
    }

    /// Tag names of enclosing elements, innermost first.
    pub fn enclosing_elements(&self) -> impl Iterator<Item = &'a str> + '_ {
        let document = self.document;
        self.ancestors
            .iter()
            .rev()
            .filter_map(move |id| document.element_tag_name(*id))
    }

    /// Location of a node, or the empty location for unknown ids.
    #[must_use]
    pub fn location(&self, id: NodeId) -> Location {
        self.document
            .get(id)
            .map(|n| n.location)
            .unwrap_or_default()
    }

    /// Records an offense with the rule's default severity.
    pub fn add_offense(&mut self, message: impl Into<String>, location: Location) {
        self.offenses.push(Offense::new(
            self.descriptor.name,
            self.descriptor.default_severity,
            location,
            message,
        ));
    }

    /// Records an offense the rule can correct by rewriting `node`.
    ///
    /// Rules without a declared autofix get a plain offense.
    pub fn add_fixable_offense(
        &mut self,
        message: impl Into<String>,
        location: Location,
        node: NodeId,
    ) {
        let offense = Offense::new(
            self.descriptor.name,
            self.descriptor.default_severity,
            location,
            message,
        );
        let offense = match self.descriptor.fix_safety() {
            Some(safety) => offense.with_fix(node, safety),
            None => {
                tracing::debug!(
                    "{} reported a fixable offense but declares no autofix",
                    self.descriptor.name
                );
                offense
            }
        };
        self.offenses.push(offense);
    }

    /// Consumes the context and returns the recorded offenses.
    #[must_use]
    pub fn into_offenses(self) -> Vec<Offense> {
        self.offenses
    }
}

/// Sparse per-kind callbacks. Every default returns [`Walk::Continue`].
#[allow(unused_variables)]
pub trait Visitor {
    /// Root node.
    fn visit_document(&mut self, id: NodeId, node: &DocumentNode, cx: &mut VisitCx<'_>) -> Walk {
        Walk::Continue
    }

    /// Element (visited before its open tag).
    fn visit_element(&mut self, id: NodeId, node: &ElementNode, cx: &mut VisitCx<'_>) -> Walk {
        Walk::Continue
    }

    /// Open tag.
    fn visit_open_tag(&mut self, id: NodeId, node: &OpenTagNode, cx: &mut VisitCx<'_>) -> Walk {
        Walk::Continue
    }

    /// Close tag, including stray ones.
    fn visit_close_tag(&mut self, id: NodeId, node: &CloseTagNode, cx: &mut VisitCx<'_>) -> Walk {
        Walk::Continue
    }

    /// Attribute.
    fn visit_attribute(&mut self, id: NodeId, node: &AttributeNode, cx: &mut VisitCx<'_>) -> Walk {
        Walk::Continue
    }

    /// Attribute value.
    fn visit_attribute_value(
        &mut self,
        id: NodeId,
        node: &AttributeValueNode,
        cx: &mut VisitCx<'_>,
    ) -> Walk {
        Walk::Continue
    }

    /// Literal inside an attribute value.
    fn visit_literal(&mut self, id: NodeId, node: &LiteralNode, cx: &mut VisitCx<'_>) -> Walk {
        Walk::Continue
    }

    /// Body text.
    fn visit_text(&mut self, id: NodeId, node: &TextNode, cx: &mut VisitCx<'_>) -> Walk {
        Walk::Continue
    }

    /// Whitespace inside a tag.
    fn visit_whitespace(
        &mut self,
        id: NodeId,
        node: &WhitespaceNode,
        cx: &mut VisitCx<'_>,
    ) -> Walk {
        Walk::Continue
    }

    /// ERB tag.
    fn visit_erb_content(
        &mut self,
        id: NodeId,
        node: &ErbContentNode,
        cx: &mut VisitCx<'_>,
    ) -> Walk {
        Walk::Continue
    }

    /// HTML comment.
    fn visit_html_comment(
        &mut self,
        id: NodeId,
        node: &HtmlCommentNode,
        cx: &mut VisitCx<'_>,
    ) -> Walk {
        Walk::Continue
    }

    /// Doctype.
    fn visit_doctype(&mut self, id: NodeId, node: &DoctypeNode, cx: &mut VisitCx<'_>) -> Walk {
        Walk::Continue
    }
}

/// Walks the whole document from its root.
pub fn walk<V: Visitor + ?Sized>(visitor: &mut V, cx: &mut VisitCx<'_>) {
    let root = cx.document.root();
    walk_node(visitor, root, cx);
}

/// Runs `visitor` over `document` and returns what it reported.
pub fn walk_document<V: Visitor + ?Sized>(
    visitor: &mut V,
    descriptor: &'static RuleDescriptor,
    document: &Document,
    context: &LintContext,
) -> Vec<Offense> {
    let mut cx = VisitCx::new(descriptor, document, context);
    walk(visitor, &mut cx);
    cx.into_offenses()
}

fn dispatch<V: Visitor + ?Sized>(
    visitor: &mut V,
    id: NodeId,
    node: &Node,
    cx: &mut VisitCx<'_>,
) -> Walk {
    match &node.kind {
        NodeKind::Document(n) => visitor.visit_document(id, n, cx),
        NodeKind::Element(n) => visitor.visit_element(id, n, cx),
        NodeKind::OpenTag(n) => visitor.visit_open_tag(id, n, cx),
        NodeKind::CloseTag(n) => visitor.visit_close_tag(id, n, cx),
        NodeKind::Attribute(n) => visitor.visit_attribute(id, n, cx),
        NodeKind::AttributeValue(n) => visitor.visit_attribute_value(id, n, cx),
        NodeKind::Literal(n) => visitor.visit_literal(id, n, cx),
        NodeKind::Text(n) => visitor.visit_text(id, n, cx),
        NodeKind::Whitespace(n) => visitor.visit_whitespace(id, n, cx),
        NodeKind::ErbContent(n) => visitor.visit_erb_content(id, n, cx),
        NodeKind::HtmlComment(n) => visitor.visit_html_comment(id, n, cx),
        NodeKind::Doctype(n) => visitor.visit_doctype(id, n, cx),
    }
}

fn walk_node<V: Visitor + ?Sized>(visitor: &mut V, id: NodeId, cx: &mut VisitCx<'_>) {
    let document = cx.document;
    let Some(node) = document.get(id) else {
        return;
    };
    if dispatch(visitor, id, node, cx) == Walk::SkipChildren {
        return;
    }
    cx.ancestors.push(id);
    for child in node.kind.children() {
        walk_node(visitor, child, cx);
    }
    cx.ancestors.pop();
}
