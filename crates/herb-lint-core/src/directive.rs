//! Parsing of `herb:disable` suppression comments.
//!
//! A directive is an ERB comment (`<%# herb:disable a, b %>`) or an HTML
//! comment (`<!-- herb:disable a -->`) whose trimmed content starts with
//! [`DIRECTIVE_KEYWORD`]. The keyword must be followed by whitespace or by the
//! end of the comment; anything else yields a directive with
//! `matched == false` and no rule names.

use crate::syntax::{Document, NodeId, NodeKind, Token};
use crate::types::Location;

/// Keyword that starts a suppression comment.
pub const DIRECTIVE_KEYWORD: &str = "herb:disable";

/// Rule-name sentinel that disables every rule.
pub const ALL_RULES: &str = "all";

/// One comma-separated name inside a directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleNameDetail {
    /// Trimmed rule name.
    pub name: String,
    /// Exact span of the name in the source.
    pub location: Location,
}

/// A parsed `herb:disable` comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisableComment {
    /// Comment node the directive was read from.
    pub node: NodeId,
    /// Span of the whole comment, delimiters included.
    pub location: Location,
    /// Span of the comment content between the delimiters.
    pub content_location: Location,
    /// Whether the keyword was followed by a valid separator.
    pub matched: bool,
    /// Text after the keyword, trimmed; `None` when empty or unmatched.
    pub rules_string: Option<String>,
    /// Rule names in source order, duplicates kept.
    pub rule_names: Vec<String>,
    /// Rule names with their locations, parallel to `rule_names`.
    pub rule_name_details: Vec<RuleNameDetail>,
    has_empty_entries: bool,
}

impl DisableComment {
    /// Parses the content of a comment node.
    ///
    /// Returns `None` when the content does not start with the keyword.
    #[must_use]
    pub fn parse(node: NodeId, location: Location, content: &Token) -> Option<Self> {
        let text = content.value.as_str();
        let body = text.trim_start();
        let leading = text.len() - body.len();
        let after = body.strip_prefix(DIRECTIVE_KEYWORD)?;

        let mut comment = Self {
            node,
            location,
            content_location: content.location,
            matched: after.is_empty() || after.starts_with(char::is_whitespace),
            rules_string: None,
            rule_names: Vec::new(),
            rule_name_details: Vec::new(),
            has_empty_entries: false,
        };
        if !comment.matched {
            return Some(comment);
        }

        let rules = after.trim();
        if rules.is_empty() {
            return Some(comment);
        }
        comment.rules_string = Some(rules.to_string());

        let mut offset = leading + DIRECTIVE_KEYWORD.len();
        for piece in after.split(',') {
            let name = piece.trim();
            if name.is_empty() {
                comment.has_empty_entries = true;
            } else {
                let lead = piece.len() - piece.trim_start().len();
                let start = content.location.start.advance(&text[..offset + lead]);
                comment.rule_names.push(name.to_string());
                comment.rule_name_details.push(RuleNameDetail {
                    name: name.to_string(),
                    location: Location::spanning(start, name),
                });
            }
            offset += piece.len() + 1;
        }
        Some(comment)
    }

    /// Whether the directive lists the `all` sentinel.
    #[must_use]
    pub fn disables_all(&self) -> bool {
        self.rule_names.iter().any(|name| name == ALL_RULES)
    }

    /// Whether the directive names `rule`, directly or through `all`.
    #[must_use]
    pub fn disables(&self, rule: &str) -> bool {
        self.matched && (self.disables_all() || self.rule_names.iter().any(|name| name == rule))
    }

    /// Whether an offense at `location` falls inside this directive's scope.
    ///
    /// The scope is every line the comment itself spans; an offense is in
    /// scope when its start line is one of them.
    #[must_use]
    pub fn in_scope(&self, location: &Location) -> bool {
        self.location.touches_line(location.start.line)
    }

    /// Whether the rule list contained blank entries such as `a,,b` or `a,`.
    #[must_use]
    pub fn has_empty_entries(&self) -> bool {
        self.has_empty_entries
    }
}

/// Collects every directive in `document`, in document order.
#[must_use]
pub fn collect(document: &Document) -> Vec<DisableComment> {
    let mut directives = Vec::new();
    let mut stack = vec![document.root()];
    while let Some(id) = stack.pop() {
        let Some(node) = document.get(id) else {
            continue;
        };
        let content = match &node.kind {
            NodeKind::ErbContent(erb) if erb.is_comment() => Some(&erb.content),
            NodeKind::HtmlComment(comment) => Some(&comment.content),
            _ => None,
        };
        if let Some(comment) = content.and_then(|c| DisableComment::parse(id, node.location, c)) {
            directives.push(comment);
        }
        let mut children = node.kind.children();
        children.reverse();
        stack.extend(children);
    }
    tracing::debug!("collected {} herb:disable directives", directives.len());
    directives
}
