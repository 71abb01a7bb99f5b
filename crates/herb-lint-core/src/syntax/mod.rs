//! Syntax tree, parser and printer for HTML + ERB templates.

mod node;
mod parser;
mod printer;

pub use node::{
    AttributeNode, AttributeValueNode, CloseTagNode, Document, DocumentNode, DoctypeNode,
    ElementNode, ErbContentNode, HtmlCommentNode, LiteralNode, Node, NodeId, NodeKind,
    OpenTagNode, TextNode, Token, TreeError, WhitespaceNode,
};
pub use parser::{parse, ParseError, ParseOptions};
pub use printer::print;
