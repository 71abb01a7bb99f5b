//! Identity-preserving printer.
//!
//! Emits the tokens of every live node in document order. Untouched nodes
//! still hold their original text, so output only differs from the parsed
//! source inside subtrees that were replaced.

use crate::syntax::node::{Document, NodeId, NodeKind, Token};

/// Serializes `document` back to source text.
#[must_use]
pub fn print(document: &Document) -> String {
    let mut out = String::new();
    print_node(document, document.root(), &mut out);
    out
}

fn push(out: &mut String, token: &Token) {
    out.push_str(&token.value);
}

fn print_node(document: &Document, id: NodeId, out: &mut String) {
    let Some(node) = document.get(id) else {
        return;
    };
    match &node.kind {
        NodeKind::Document(_) | NodeKind::Element(_) => {
            for child in node.kind.children() {
                print_node(document, child, out);
            }
        }
        NodeKind::AttributeValue(value) => {
            if let Some(quote) = &value.open_quote {
                push(out, quote);
            }
            for child in &value.children {
                print_node(document, *child, out);
            }
            if let Some(quote) = &value.close_quote {
                push(out, quote);
            }
        }
        NodeKind::OpenTag(tag) => {
            push(out, &tag.tag_opening);
            push(out, &tag.tag_name);
            for child in &tag.children {
                print_node(document, *child, out);
            }
            push(out, &tag.tag_closing);
        }
        NodeKind::CloseTag(tag) => {
            push(out, &tag.tag_opening);
            push(out, &tag.tag_name);
            if let Some(trailing) = &tag.trailing {
                push(out, trailing);
            }
            push(out, &tag.tag_closing);
        }
        NodeKind::Attribute(attribute) => {
            push(out, &attribute.name);
            if let Some(equals) = &attribute.equals {
                push(out, equals);
            }
            if let Some(value) = attribute.value {
                print_node(document, value, out);
            }
        }
        NodeKind::Literal(literal) => push(out, &literal.content),
        NodeKind::Text(text) => push(out, &text.content),
        NodeKind::Whitespace(whitespace) => push(out, &whitespace.value),
        NodeKind::ErbContent(erb) => {
            push(out, &erb.tag_opening);
            push(out, &erb.content);
            push(out, &erb.tag_closing);
        }
        NodeKind::HtmlComment(comment) => {
            push(out, &comment.comment_start);
            push(out, &comment.content);
            push(out, &comment.comment_end);
        }
        NodeKind::Doctype(doctype) => {
            push(out, &doctype.tag_opening);
            push(out, &doctype.content);
            push(out, &doctype.tag_closing);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::node::{LiteralNode, Node};
    use crate::syntax::{parse, ParseOptions};

    #[test]
    fn replaced_subtree_is_the_only_change() {
        let source = "<p title=old>\n  keep me\n</p>";
        let mut doc = parse(source, ParseOptions::default()).unwrap();
        let p = doc.children(doc.root())[0];
        let open_tag = doc.children(p)[0];
        let attribute = doc.children(open_tag)[1];
        let value = doc.children(attribute)[0];
        let literal = doc.children(value)[0];

        let node = doc.get(literal).unwrap().clone();
        let NodeKind::Literal(lit) = &node.kind else {
            panic!("expected literal");
        };
        let replacement = node.with_kind(NodeKind::Literal(LiteralNode {
            content: lit.content.with_value("new"),
        }));
        doc.replace_node(literal, replacement).unwrap();

        insta::assert_snapshot!(print(&doc), @r"
        <p title=new>
          keep me
        </p>
        ");
    }

    #[test]
    fn detached_nodes_are_not_printed() {
        let mut doc = parse("<b>x</b>", ParseOptions::default()).unwrap();
        let location = doc.get(doc.root()).unwrap().location;
        doc.insert(Node::new(
            location,
            NodeKind::Literal(LiteralNode {
                content: Token::new("orphan", location),
            }),
        ));
        assert_eq!(print(&doc), "<b>x</b>");
    }
}
