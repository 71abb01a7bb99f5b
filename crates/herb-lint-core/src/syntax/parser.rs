//! Forgiving HTML + ERB parser.
//!
//! Every byte of the input ends up in exactly one token so that
//! [`print`](super::print) can reproduce the source. Mismatched close tags
//! never fail the parse: open elements are closed implicitly and stray close
//! tags become standalone [`CloseTagNode`]s. Only unterminated constructs
//! (tags, ERB, comments, quoted values) are errors.

use crate::syntax::node::{
    AttributeNode, AttributeValueNode, CloseTagNode, Document, DocumentBuilder, DoctypeNode,
    ElementNode, ErbContentNode, HtmlCommentNode, LiteralNode, Node, NodeId, NodeKind,
    OpenTagNode, TextNode, Token, WhitespaceNode,
};
use crate::types::{Location, Position};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

const ERB_OPENINGS: &[&str] = &["<%==", "<%=", "<%#", "<%-", "<%"];

/// Parser options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Keep whitespace between attributes as [`WhitespaceNode`]s.
    ///
    /// Required for identity-preserving printing.
    pub track_whitespace: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            track_whitespace: true,
        }
    }
}

/// Error for input the parser cannot recover from.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
#[error("{message} at line {}, column {}", position.line, position.column)]
#[diagnostic(code(herb_lint::parse))]
pub struct ParseError {
    /// What went wrong.
    pub message: String,
    /// Where the unterminated construct starts.
    pub position: Position,
}

/// Parses `source` into a [`Document`].
///
/// # Errors
///
/// Returns [`ParseError`] for unterminated tags, ERB tags, comments and
/// quoted attribute values.
pub fn parse(source: &str, options: ParseOptions) -> Result<Document, ParseError> {
    Parser {
        scanner: Scanner {
            source,
            offset: 0,
            pos: Position::START,
        },
        builder: Document::builder(),
        options,
    }
    .parse_document()
}

struct Scanner<'s> {
    source: &'s str,
    offset: usize,
    pos: Position,
}

impl<'s> Scanner<'s> {
    fn rest(&self) -> &'s str {
        &self.source[self.offset..]
    }

    fn is_eof(&self) -> bool {
        self.offset >= self.source.len()
    }

    fn take(&mut self, len: usize) -> Token {
        let len = len.min(self.source.len() - self.offset);
        let text = &self.source[self.offset..self.offset + len];
        let start = self.pos;
        self.offset += len;
        self.pos = start.advance(text);
        Token::new(text, Location::new(start, self.pos))
    }

    /// Consumes characters until `stop` matches the remaining input.
    fn take_until(&mut self, stop: impl Fn(&str) -> bool) -> Token {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|(i, _)| stop(&rest[*i..]))
            .map_or(rest.len(), |(i, _)| i);
        self.take(len)
    }

    fn take_while(&mut self, accept: impl Fn(char) -> bool) -> Token {
        self.take_until(|rest| rest.chars().next().is_some_and(|c| !accept(c)))
    }
}

struct Frame {
    name: String,
    open_tag: NodeId,
    start: Position,
    body: Vec<NodeId>,
    raw: bool,
}

struct Parser<'s> {
    scanner: Scanner<'s>,
    builder: DocumentBuilder,
    options: ParseOptions,
}

fn starts_with_alpha_after(rest: &str, prefix: &str) -> bool {
    rest.strip_prefix(prefix)
        .and_then(|r| r.chars().next())
        .is_some_and(|c| c.is_ascii_alphabetic())
}

fn starts_construct(rest: &str) -> bool {
    rest.starts_with("<%")
        || rest.starts_with("<!")
        || starts_with_alpha_after(rest, "</")
        || starts_with_alpha_after(rest, "<")
}

fn is_tag_name_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '>' | '/' | '<')
}

fn is_attribute_name_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '=' | '>' | '/' | '<')
}

impl Parser<'_> {
    fn error(&self, message: &str, position: Position) -> ParseError {
        ParseError {
            message: message.to_string(),
            position,
        }
    }

    fn push(&mut self, location: Location, kind: NodeKind) -> NodeId {
        self.builder.push(Node::new(location, kind))
    }

    fn location_of(&self, id: NodeId) -> Location {
        self.builder.node(id).map(|n| n.location).unwrap_or_default()
    }

    fn parse_document(mut self) -> Result<Document, ParseError> {
        let mut frames: Vec<Frame> = Vec::new();
        let mut top: Vec<NodeId> = Vec::new();

        while !self.scanner.is_eof() {
            let in_raw_text = frames.last().is_some_and(|f| f.raw);
            if in_raw_text && self.scan_raw_text(&mut frames) {
                continue;
            }

            let rest = self.scanner.rest();
            if rest.starts_with("<%") {
                let id = self.parse_erb()?;
                attach(&mut frames, &mut top, id);
            } else if rest.starts_with("<!--") {
                let id = self.parse_comment()?;
                attach(&mut frames, &mut top, id);
            } else if rest.starts_with("<!") {
                let id = self.parse_doctype()?;
                attach(&mut frames, &mut top, id);
            } else if starts_with_alpha_after(rest, "</") {
                let (id, name) = self.parse_close_tag()?;
                self.close_element(&mut frames, &mut top, id, &name);
            } else if starts_with_alpha_after(rest, "<") {
                let start = self.scanner.pos;
                let (open_tag, name, self_closing) = self.parse_open_tag()?;
                let lower = name.to_ascii_lowercase();
                let is_void = VOID_ELEMENTS.contains(&lower.as_str());
                if is_void || self_closing {
                    let location = self.location_of(open_tag);
                    let id = self.push(
                        location,
                        NodeKind::Element(ElementNode {
                            open_tag,
                            body: Vec::new(),
                            close_tag: None,
                            is_void,
                        }),
                    );
                    attach(&mut frames, &mut top, id);
                } else {
                    frames.push(Frame {
                        raw: RAW_TEXT_ELEMENTS.contains(&lower.as_str()),
                        name: lower,
                        open_tag,
                        start,
                        body: Vec::new(),
                    });
                }
            } else {
                let id = self.parse_text();
                attach(&mut frames, &mut top, id);
            }
        }

        while let Some(frame) = frames.pop() {
            let id = self.finish_element(frame, None);
            attach(&mut frames, &mut top, id);
        }

        let end = self.scanner.pos;
        Ok(self.builder.finish(top, end))
    }

    /// Consumes raw text inside `<script>`/`<style>`. Returns false when the
    /// input continues with an ERB tag or the closing tag instead.
    fn scan_raw_text(&mut self, frames: &mut [Frame]) -> bool {
        let Some(frame) = frames.last_mut() else {
            return false;
        };
        let closing = format!("</{}", frame.name);
        let token = self.scanner.take_until(|rest| {
            rest.starts_with("<%")
                || rest
                    .get(..closing.len())
                    .is_some_and(|head| head.eq_ignore_ascii_case(&closing))
        });
        if token.value.is_empty() {
            return false;
        }
        let id = self.builder.push(Node::new(
            token.location,
            NodeKind::Text(TextNode { content: token }),
        ));
        frame.body.push(id);
        true
    }

    fn parse_text(&mut self) -> NodeId {
        // the first character is never a construct start, or we would not be here
        let first = self.scanner.rest().chars().next().map_or(0, char::len_utf8);
        let head = self.scanner.take(first);
        let tail = self.scanner.take_until(starts_construct);
        let content = Token::new(
            format!("{}{}", head.value, tail.value),
            head.location.join(tail.location),
        );
        self.push(content.location, NodeKind::Text(TextNode { content }))
    }

    fn parse_erb(&mut self) -> Result<NodeId, ParseError> {
        let start = self.scanner.pos;
        let rest = self.scanner.rest();
        let opening = ERB_OPENINGS
            .iter()
            .find(|o| rest.starts_with(**o))
            .map_or(2, |o| o.len());
        let tag_opening = self.scanner.take(opening);

        let rest = self.scanner.rest();
        let close = rest
            .find("%>")
            .ok_or_else(|| self.error("unterminated ERB tag", start))?;
        let content_len = if rest[..close].ends_with('-') {
            close - 1
        } else {
            close
        };
        let content = self.scanner.take(content_len);
        let tag_closing = self.scanner.take(close - content_len + 2);

        let location = Location::new(start, tag_closing.location.end);
        Ok(self.push(
            location,
            NodeKind::ErbContent(ErbContentNode {
                tag_opening,
                content,
                tag_closing,
            }),
        ))
    }

    fn parse_comment(&mut self) -> Result<NodeId, ParseError> {
        let start = self.scanner.pos;
        let comment_start = self.scanner.take(4);
        let close = self
            .scanner
            .rest()
            .find("-->")
            .ok_or_else(|| self.error("unterminated HTML comment", start))?;
        let content = self.scanner.take(close);
        let comment_end = self.scanner.take(3);
        let location = Location::new(start, comment_end.location.end);
        Ok(self.push(
            location,
            NodeKind::HtmlComment(HtmlCommentNode {
                comment_start,
                content,
                comment_end,
            }),
        ))
    }

    fn parse_doctype(&mut self) -> Result<NodeId, ParseError> {
        let start = self.scanner.pos;
        let tag_opening = self.scanner.take(2);
        let close = self
            .scanner
            .rest()
            .find('>')
            .ok_or_else(|| self.error("unterminated doctype", start))?;
        let content = self.scanner.take(close);
        let tag_closing = self.scanner.take(1);
        let location = Location::new(start, tag_closing.location.end);
        Ok(self.push(
            location,
            NodeKind::Doctype(DoctypeNode {
                tag_opening,
                content,
                tag_closing,
            }),
        ))
    }

    fn parse_close_tag(&mut self) -> Result<(NodeId, String), ParseError> {
        let start = self.scanner.pos;
        let tag_opening = self.scanner.take(2);
        let tag_name = self.scanner.take_while(is_tag_name_char);
        let trailing = self.scanner.take_while(char::is_whitespace);
        if !self.scanner.rest().starts_with('>') {
            return Err(self.error("unterminated close tag", start));
        }
        let tag_closing = self.scanner.take(1);
        let name = tag_name.value.clone();
        let location = Location::new(start, tag_closing.location.end);
        let id = self.push(
            location,
            NodeKind::CloseTag(CloseTagNode {
                tag_opening,
                tag_name,
                trailing: (!trailing.value.is_empty()).then_some(trailing),
                tag_closing,
            }),
        );
        Ok((id, name))
    }

    fn parse_open_tag(&mut self) -> Result<(NodeId, String, bool), ParseError> {
        let start = self.scanner.pos;
        let tag_opening = self.scanner.take(1);
        let tag_name = self.scanner.take_while(is_tag_name_char);
        let mut children = Vec::new();

        let tag_closing = loop {
            let rest = self.scanner.rest();
            if rest.is_empty() {
                return Err(self.error("unterminated open tag", start));
            }
            if rest.starts_with("/>") {
                break self.scanner.take(2);
            }
            if rest.starts_with('>') {
                break self.scanner.take(1);
            }
            if rest.starts_with("<%") {
                children.push(self.parse_erb()?);
                continue;
            }
            if rest.starts_with(char::is_whitespace) {
                let value = self.scanner.take_while(char::is_whitespace);
                if self.options.track_whitespace {
                    children.push(self.push(
                        value.location,
                        NodeKind::Whitespace(WhitespaceNode { value }),
                    ));
                }
                continue;
            }
            children.push(self.parse_attribute()?);
        };

        let name = tag_name.value.clone();
        let self_closing = tag_closing.value == "/>";
        let location = Location::new(start, tag_closing.location.end);
        let id = self.push(
            location,
            NodeKind::OpenTag(OpenTagNode {
                tag_opening,
                tag_name,
                children,
                tag_closing,
            }),
        );
        Ok((id, name, self_closing))
    }

    fn parse_attribute(&mut self) -> Result<NodeId, ParseError> {
        let mut name = self.scanner.take_while(is_attribute_name_char);
        if name.value.is_empty() {
            // stray `/`, `=` or `<`; keep it as a nameless attribute so no byte is lost
            let len = self.scanner.rest().chars().next().map_or(0, char::len_utf8);
            name = self.scanner.take(len);
        }

        let mut location = name.location;
        let (equals, value) = if self.scanner.rest().starts_with('=') {
            let equals = self.scanner.take(1);
            let value = self.parse_attribute_value()?;
            location = location.join(self.location_of(value));
            (Some(equals), Some(value))
        } else {
            (None, None)
        };

        Ok(self.push(
            location,
            NodeKind::Attribute(AttributeNode {
                name,
                equals,
                value,
            }),
        ))
    }

    fn parse_attribute_value(&mut self) -> Result<NodeId, ParseError> {
        let start = self.scanner.pos;
        let quote = self
            .scanner
            .rest()
            .chars()
            .next()
            .filter(|c| matches!(c, '"' | '\''));

        let mut children = Vec::new();
        let (open_quote, close_quote) = if let Some(quote) = quote {
            let open = self.scanner.take(1);
            loop {
                let rest = self.scanner.rest();
                if rest.is_empty() {
                    return Err(self.error("unterminated attribute value", start));
                }
                if rest.starts_with(quote) {
                    break;
                }
                if rest.starts_with("<%") {
                    children.push(self.parse_erb()?);
                    continue;
                }
                let content = self
                    .scanner
                    .take_until(|r| r.starts_with(quote) || r.starts_with("<%"));
                children.push(self.push(
                    content.location,
                    NodeKind::Literal(LiteralNode { content }),
                ));
            }
            (Some(open), Some(self.scanner.take(1)))
        } else {
            loop {
                let rest = self.scanner.rest();
                if rest.is_empty() || rest.starts_with(char::is_whitespace) || rest.starts_with('>')
                {
                    break;
                }
                if rest.starts_with("<%") {
                    children.push(self.parse_erb()?);
                    continue;
                }
                let content = self.scanner.take_until(|r| {
                    r.starts_with(char::is_whitespace) || r.starts_with('>') || r.starts_with("<%")
                });
                children.push(self.push(
                    content.location,
                    NodeKind::Literal(LiteralNode { content }),
                ));
            }
            (None, None)
        };

        let location = Location::new(start, self.scanner.pos);
        Ok(self.push(
            location,
            NodeKind::AttributeValue(AttributeValueNode {
                open_quote,
                children,
                close_quote,
            }),
        ))
    }

    fn close_element(
        &mut self,
        frames: &mut Vec<Frame>,
        top: &mut Vec<NodeId>,
        close_tag: NodeId,
        name: &str,
    ) {
        let Some(index) = frames
            .iter()
            .rposition(|f| f.name.eq_ignore_ascii_case(name))
        else {
            attach(frames, top, close_tag);
            return;
        };

        while frames.len() > index + 1 {
            if let Some(frame) = frames.pop() {
                let id = self.finish_element(frame, None);
                attach(frames, top, id);
            }
        }
        if let Some(frame) = frames.pop() {
            let id = self.finish_element(frame, Some(close_tag));
            attach(frames, top, id);
        }
    }

    fn finish_element(&mut self, frame: Frame, close_tag: Option<NodeId>) -> NodeId {
        let end = close_tag
            .or_else(|| frame.body.last().copied())
            .map_or_else(
                || self.location_of(frame.open_tag).end,
                |id| self.location_of(id).end,
            );
        self.push(
            Location::new(frame.start, end),
            NodeKind::Element(ElementNode {
                open_tag: frame.open_tag,
                body: frame.body,
                close_tag,
                is_void: false,
            }),
        )
    }
}

fn attach(frames: &mut [Frame], top: &mut Vec<NodeId>, id: NodeId) {
    match frames.last_mut() {
        Some(frame) => frame.body.push(id),
        None => top.push(id),
    }
}
