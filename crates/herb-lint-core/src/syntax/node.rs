//! Arena-backed syntax tree for HTML + ERB documents.
//!
//! Every node lives in a [`Document`] arena and is addressed by a stable
//! [`NodeId`]. Nodes are never edited in place: a fix builds a new node and
//! calls [`Document::replace_node`], which retires the old id. Any later
//! attempt to replace a retired id fails with [`TreeError::StaleNode`].

use serde::{Deserialize, Serialize};

use crate::types::{Location, Position};

/// Stable identifier of a node inside a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// Returns the raw arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A slice of source text together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Exact text of the token.
    pub value: String,
    /// Source span of the token.
    pub location: Location,
}

impl Token {
    /// Creates a token.
    #[must_use]
    pub fn new(value: impl Into<String>, location: Location) -> Self {
        Self {
            value: value.into(),
            location,
        }
    }

    /// Returns a copy of this token with different text but the same location.
    #[must_use]
    pub fn with_value(&self, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            location: self.location,
        }
    }
}

/// Root of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentNode {
    /// Top-level nodes.
    pub children: Vec<NodeId>,
}

/// An element: open tag, body and optional close tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementNode {
    /// The [`OpenTagNode`] of this element.
    pub open_tag: NodeId,
    /// Child nodes between the tags.
    pub body: Vec<NodeId>,
    /// The [`CloseTagNode`], absent for void and implicitly closed elements.
    pub close_tag: Option<NodeId>,
    /// Whether this is a void element (`<br>`, `<img>`, ...).
    pub is_void: bool,
}

/// `<tag attr="value">`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTagNode {
    /// `<`
    pub tag_opening: Token,
    /// Tag name exactly as written.
    pub tag_name: Token,
    /// Attributes and the whitespace between them.
    pub children: Vec<NodeId>,
    /// `>` or `/>`
    pub tag_closing: Token,
}

impl OpenTagNode {
    /// Whether the tag is written self-closing (`/>`).
    #[must_use]
    pub fn is_self_closing(&self) -> bool {
        self.tag_closing.value == "/>"
    }
}

/// `</tag>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseTagNode {
    /// `</`
    pub tag_opening: Token,
    /// Tag name exactly as written.
    pub tag_name: Token,
    /// Whitespace between the name and `>`, if any.
    pub trailing: Option<Token>,
    /// `>`
    pub tag_closing: Token,
}

/// `name`, `name=value` or `name="value"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeNode {
    /// Attribute name as written.
    pub name: Token,
    /// `=`, absent for value-less attributes.
    pub equals: Option<Token>,
    /// The [`AttributeValueNode`], absent for value-less attributes.
    pub value: Option<NodeId>,
}

/// Attribute value, quoted or not. Content is literals and ERB tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeValueNode {
    /// Opening quote.
    pub open_quote: Option<Token>,
    /// [`LiteralNode`] and [`ErbContentNode`] children.
    pub children: Vec<NodeId>,
    /// Closing quote.
    pub close_quote: Option<Token>,
}

impl AttributeValueNode {
    /// Whether the value is wrapped in quotes.
    #[must_use]
    pub fn is_quoted(&self) -> bool {
        self.open_quote.is_some()
    }
}

/// Literal text inside an attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralNode {
    /// The text.
    pub content: Token,
}

/// Text in element bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
    /// The text.
    pub content: Token,
}

/// Whitespace between attributes inside a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitespaceNode {
    /// The whitespace.
    pub value: Token,
}

/// `<% ... %>`, `<%= ... %>`, `<%# ... %>` and friends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErbContentNode {
    /// `<%`, `<%=`, `<%#`, `<%-` or `<%==`.
    pub tag_opening: Token,
    /// Everything between the delimiters.
    pub content: Token,
    /// `%>` or `-%>`.
    pub tag_closing: Token,
}

impl ErbContentNode {
    /// Whether this is an ERB comment tag (`<%#`).
    #[must_use]
    pub fn is_comment(&self) -> bool {
        self.tag_opening.value == "<%#"
    }
}

/// `<!-- ... -->`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlCommentNode {
    /// `<!--`
    pub comment_start: Token,
    /// Comment body.
    pub content: Token,
    /// `-->`
    pub comment_end: Token,
}

/// `<!DOCTYPE html>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctypeNode {
    /// `<!`
    pub tag_opening: Token,
    /// `DOCTYPE html`
    pub content: Token,
    /// `>`
    pub tag_closing: Token,
}

/// Closed set of node kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Root.
    Document(DocumentNode),
    /// Element.
    Element(ElementNode),
    /// Open tag.
    OpenTag(OpenTagNode),
    /// Close tag.
    CloseTag(CloseTagNode),
    /// Attribute.
    Attribute(AttributeNode),
    /// Attribute value.
    AttributeValue(AttributeValueNode),
    /// Attribute-value literal.
    Literal(LiteralNode),
    /// Body text.
    Text(TextNode),
    /// In-tag whitespace.
    Whitespace(WhitespaceNode),
    /// ERB tag.
    ErbContent(ErbContentNode),
    /// HTML comment.
    HtmlComment(HtmlCommentNode),
    /// Doctype.
    Doctype(DoctypeNode),
}

impl NodeKind {
    /// Short kind name, used in logs and error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Document(_) => "document",
            Self::Element(_) => "element",
            Self::OpenTag(_) => "open-tag",
            Self::CloseTag(_) => "close-tag",
            Self::Attribute(_) => "attribute",
            Self::AttributeValue(_) => "attribute-value",
            Self::Literal(_) => "literal",
            Self::Text(_) => "text",
            Self::Whitespace(_) => "whitespace",
            Self::ErbContent(_) => "erb-content",
            Self::HtmlComment(_) => "html-comment",
            Self::Doctype(_) => "doctype",
        }
    }

    /// Child ids in document order.
    #[must_use]
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Self::Document(node) => node.children.clone(),
            Self::Element(node) => {
                let mut ids = Vec::with_capacity(node.body.len() + 2);
                ids.push(node.open_tag);
                ids.extend(node.body.iter().copied());
                ids.extend(node.close_tag);
                ids
            }
            Self::OpenTag(node) => node.children.clone(),
            Self::Attribute(node) => node.value.into_iter().collect(),
            Self::AttributeValue(node) => node.children.clone(),
            Self::CloseTag(_)
            | Self::Literal(_)
            | Self::Text(_)
            | Self::Whitespace(_)
            | Self::ErbContent(_)
            | Self::HtmlComment(_)
            | Self::Doctype(_) => Vec::new(),
        }
    }

    /// Redirects every reference to `old` onto `new`. Returns whether one was found.
    fn redirect_child(&mut self, old: NodeId, new: NodeId) -> bool {
        let swap = |slot: &mut NodeId| {
            if *slot == old {
                *slot = new;
                true
            } else {
                false
            }
        };
        match self {
            Self::Document(node) => node.children.iter_mut().any(swap),
            Self::Element(node) => {
                swap(&mut node.open_tag)
                    || node.body.iter_mut().any(swap)
                    || node.close_tag.as_mut().is_some_and(swap)
            }
            Self::OpenTag(node) => node.children.iter_mut().any(swap),
            Self::Attribute(node) => node.value.as_mut().is_some_and(swap),
            Self::AttributeValue(node) => node.children.iter_mut().any(swap),
            _ => false,
        }
    }
}

/// A node: its kind-specific data plus its source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Span in the source the tree was parsed from.
    pub location: Location,
    /// Kind-specific payload.
    pub kind: NodeKind,
}

impl Node {
    /// Creates a node.
    #[must_use]
    pub fn new(location: Location, kind: NodeKind) -> Self {
        Self { location, kind }
    }

    /// Returns a node with the same location and a different payload.
    #[must_use]
    pub fn with_kind(&self, kind: NodeKind) -> Self {
        Self {
            location: self.location,
            kind,
        }
    }
}

/// Errors raised by structural tree edits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The id was never allocated in this document.
    #[error("node {0} does not exist in this document")]
    UnknownNode(NodeId),

    /// The node was already replaced or detached.
    #[error("node {0} is stale: it was replaced earlier in this pass")]
    StaleNode(NodeId),

    /// A replacement referenced a node outside the replaced subtree.
    #[error("replacement for {old} references {child}, which is not one of its children")]
    ForeignChild {
        /// Node being replaced.
        old: NodeId,
        /// Offending child reference.
        child: NodeId,
    },

    /// The document root cannot be replaced.
    #[error("the document root cannot be replaced")]
    RootReplacement,
}

#[derive(Debug, Clone)]
struct Slot {
    node: Node,
    parent: Option<NodeId>,
    live: bool,
}

/// A parsed document: an arena of nodes rooted at a [`DocumentNode`].
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
    root: NodeId,
}

impl Document {
    /// Starts an empty arena. The root is added with [`Document::finish`].
    pub(crate) fn builder() -> DocumentBuilder {
        DocumentBuilder { slots: Vec::new() }
    }

    /// Id of the root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Looks up a live node.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.live)
            .map(|slot| &slot.node)
    }

    /// Looks up a node, distinguishing retired ids from unknown ones.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleNode`] if `id` was replaced, [`TreeError::UnknownNode`]
    /// if it never belonged to this document.
    pub fn node(&self, id: NodeId) -> Result<&Node, TreeError> {
        match self.slots.get(id.index()) {
            Some(slot) if slot.live => Ok(&slot.node),
            Some(_) => Err(TreeError::StaleNode(id)),
            None => Err(TreeError::UnknownNode(id)),
        }
    }

    /// Whether `id` refers to a node that is still part of the tree.
    #[must_use]
    pub fn is_live(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Parent of a live node, `None` for the root.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.live)
            .and_then(|slot| slot.parent)
    }

    /// Children of a live node, in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id).map(|n| n.kind.children()).unwrap_or_default()
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.live).count()
    }

    /// Whether the document has nothing but its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    /// Adds a detached node to the arena and returns its id.
    ///
    /// The node only becomes part of the tree once it is referenced by a
    /// replacement passed to [`Document::replace_node`].
    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId(u32::try_from(self.slots.len()).unwrap_or(u32::MAX));
        self.slots.push(Slot {
            node,
            parent: None,
            live: true,
        });
        id
    }

    /// Tag name of an element, read from its open tag.
    #[must_use]
    pub fn element_tag_name(&self, element: NodeId) -> Option<&str> {
        let NodeKind::Element(el) = &self.get(element)?.kind else {
            return None;
        };
        match &self.get(el.open_tag)?.kind {
            NodeKind::OpenTag(tag) => Some(tag.tag_name.value.as_str()),
            _ => None,
        }
    }

    /// Structurally replaces `old` with `new`.
    ///
    /// `new` may reuse children of `old`; every other child id it references
    /// must be a detached node added with [`Document::insert`]. `old` and any
    /// of its children not carried over are retired, and the parent's
    /// reference is redirected to the new id.
    ///
    /// # Errors
    ///
    /// Fails without modifying the document when `old` is unknown, retired,
    /// the root, or when `new` references a node outside the replaced subtree.
    pub fn replace_node(&mut self, old: NodeId, new: Node) -> Result<NodeId, TreeError> {
        let slot = self
            .slots
            .get(old.index())
            .ok_or(TreeError::UnknownNode(old))?;
        if !slot.live {
            return Err(TreeError::StaleNode(old));
        }
        let parent = slot.parent.ok_or(TreeError::RootReplacement)?;

        let old_children = slot.node.kind.children();
        let new_children = new.kind.children();
        for child in &new_children {
            let child_slot = self
                .slots
                .get(child.index())
                .ok_or(TreeError::UnknownNode(*child))?;
            if !child_slot.live {
                return Err(TreeError::StaleNode(*child));
            }
            let detached = child_slot.parent.is_none() && *child != self.root;
            if !old_children.contains(child) && !detached {
                return Err(TreeError::ForeignChild { old, child: *child });
            }
        }

        let new_id = self.insert(new);
        for child in &new_children {
            self.slots[child.index()].parent = Some(new_id);
        }
        self.slots[new_id.index()].parent = Some(parent);

        for child in old_children {
            if !new_children.contains(&child) {
                self.retire(child);
            }
        }
        self.slots[old.index()].live = false;
        self.slots[parent.index()]
            .node
            .kind
            .redirect_child(old, new_id);

        Ok(new_id)
    }

    fn retire(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(slot) = self.slots.get_mut(current.index()) {
                slot.live = false;
                stack.extend(slot.node.kind.children());
            }
        }
    }
}

/// Incremental constructor used by the parser.
pub(crate) struct DocumentBuilder {
    slots: Vec<Slot>,
}

impl DocumentBuilder {
    pub(crate) fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(u32::try_from(self.slots.len()).unwrap_or(u32::MAX));
        for child in node.kind.children() {
            if let Some(slot) = self.slots.get_mut(child.index()) {
                slot.parent = Some(id);
            }
        }
        self.slots.push(Slot {
            node,
            parent: None,
            live: true,
        });
        id
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.index()).map(|s| &s.node)
    }

    pub(crate) fn finish(mut self, children: Vec<NodeId>, end: Position) -> Document {
        let location = Location::new(Position::START, end);
        let root = self.push(Node::new(
            location,
            NodeKind::Document(DocumentNode { children }),
        ));
        Document {
            slots: self.slots,
            root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{parse, ParseOptions};

    fn first_open_tag(doc: &Document) -> (NodeId, OpenTagNode) {
        let element = doc.children(doc.root())[0];
        let NodeKind::Element(el) = doc.node_kind(element) else {
            panic!("expected element");
        };
        let NodeKind::OpenTag(tag) = doc.node_kind(el.open_tag) else {
            panic!("expected open tag");
        };
        (el.open_tag, tag)
    }

    impl Document {
        fn node_kind(&self, id: NodeId) -> NodeKind {
            self.get(id).map(|n| n.kind.clone()).unwrap()
        }
    }

    #[test]
    fn replace_node_retires_old_id() {
        let mut doc = parse("<DIV id=x></DIV>", ParseOptions::default()).unwrap();
        let (id, tag) = first_open_tag(&doc);
        let old = doc.get(id).unwrap().clone();

        let mut renamed = tag.clone();
        renamed.tag_name = tag.tag_name.with_value("div");
        let new_id = doc
            .replace_node(id, old.with_kind(NodeKind::OpenTag(renamed)))
            .unwrap();

        assert!(!doc.is_live(id));
        assert!(doc.is_live(new_id));
        // attribute children are carried over, not retired
        for child in doc.children(new_id) {
            assert!(doc.is_live(child));
            assert_eq!(doc.parent(child), Some(new_id));
        }
    }

    #[test]
    fn replacing_stale_node_is_rejected() {
        let mut doc = parse("<p></p>", ParseOptions::default()).unwrap();
        let (id, tag) = first_open_tag(&doc);
        let node = doc.get(id).unwrap().clone();
        doc.replace_node(id, node.with_kind(NodeKind::OpenTag(tag.clone())))
            .unwrap();

        let err = doc
            .replace_node(id, node.with_kind(NodeKind::OpenTag(tag)))
            .unwrap_err();
        assert_eq!(err, TreeError::StaleNode(id));
        assert_eq!(doc.node(id).unwrap_err(), TreeError::StaleNode(id));
    }

    #[test]
    fn replacement_cannot_adopt_foreign_children() {
        let mut doc = parse("<a href=x></a><b></b>", ParseOptions::default()).unwrap();
        let top = doc.children(doc.root());
        let NodeKind::Element(second) = doc.node_kind(top[1]) else {
            panic!("expected element");
        };
        let (first_tag_id, _) = first_open_tag(&doc);
        let attribute = doc.children(first_tag_id)[0];

        let NodeKind::OpenTag(mut tag) = doc.node_kind(second.open_tag) else {
            panic!("expected open tag");
        };
        tag.children.push(attribute);
        let node = doc.get(second.open_tag).unwrap().with_kind(NodeKind::OpenTag(tag));

        let err = doc.replace_node(second.open_tag, node).unwrap_err();
        assert!(matches!(err, TreeError::ForeignChild { .. }));
        assert!(doc.is_live(second.open_tag));
    }

    #[test]
    fn root_cannot_be_replaced() {
        let mut doc = parse("text", ParseOptions::default()).unwrap();
        let root = doc.root();
        let node = doc.get(root).unwrap().clone();
        assert_eq!(
            doc.replace_node(root, node).unwrap_err(),
            TreeError::RootReplacement
        );
    }
}
