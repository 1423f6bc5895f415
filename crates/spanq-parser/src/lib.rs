//! spanq parser: event-based recursive descent producing a rowan CST.
//!
//! The tree is lossless. Whitespace and comments are kept as tokens, so
//! every node's text range is a byte range of the original script. The
//! synthesizer and the reference host key call sites by those ranges.

pub mod ast;
pub mod cst;
pub mod error;
mod parser;
pub mod syntax_kind;

use spanq_lexer::Lexer;

pub use ast::AstNode;
pub use cst::{SyntaxElement, SyntaxNode, SyntaxToken};
pub use error::ParseError;
pub use syntax_kind::SyntaxKind;

/// Result of parsing a script.
///
/// Holds the green tree and every error found. Lexer errors come first,
/// then at most one parse error per statement.
#[derive(Debug, Clone)]
pub struct Parse {
    green: rowan::GreenNode,
    errors: Vec<ParseError>,
}

impl Parse {
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    /// The typed root.
    pub fn tree(&self) -> ast::stmt::SourceFile {
        ast::stmt::SourceFile {
            syntax: self.syntax(),
        }
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Lex and parse a whole script.
pub fn parse(source: &str) -> Parse {
    let (tokens, lex_errors) = Lexer::tokenize_with_errors(source);
    let mut p = parser::Parser::new(tokens, source);
    parser::parse_source_file(&mut p);
    let (green, parse_errors) = p.build_tree();

    let mut errors: Vec<ParseError> = lex_errors.into_iter().map(ParseError::from).collect();
    errors.extend(parse_errors);
    errors.sort_by_key(|e| e.span.start);

    Parse { green, errors }
}

/// Indented dump of a tree, one `KIND@start..end` line per node and
/// `KIND@start..end "text"` per token. Trivia is omitted.
pub fn debug_tree(node: &SyntaxNode) -> String {
    let mut out = String::new();
    write_node(node, 0, &mut out);
    out
}

fn write_node(node: &SyntaxNode, depth: usize, out: &mut String) {
    let range = node.text_range();
    out.push_str(&format!(
        "{:indent$}{:?}@{}..{}\n",
        "",
        node.kind(),
        u32::from(range.start()),
        u32::from(range.end()),
        indent = depth * 2
    ));
    for child in node.children_with_tokens() {
        match child {
            rowan::NodeOrToken::Node(n) => write_node(&n, depth + 1, out),
            rowan::NodeOrToken::Token(t) => {
                if t.kind().is_trivia() {
                    continue;
                }
                let range = t.text_range();
                out.push_str(&format!(
                    "{:indent$}{:?}@{}..{} {:?}\n",
                    "",
                    t.kind(),
                    u32::from(range.start()),
                    u32::from(range.end()),
                    t.text(),
                    indent = (depth + 1) * 2
                ));
            }
        }
    }
}
