use serde::Serialize;

use crate::span::Span;

/// A token produced by the query-script lexer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, start: u32, end: u32) -> Self {
        Self {
            kind,
            span: Span::new(start, end),
        }
    }
}

/// Every kind of token in a query script.
///
/// Whitespace and comments are kept as trivia tokens so the syntax tree is
/// lossless and node ranges line up with byte offsets in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    // ── Keywords ───────────────────────────────────────────────────────
    Let,
    True,
    False,

    // ── Operators ──────────────────────────────────────────────────────
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,
    /// `&&`
    AmpAmp,
    /// `||`
    PipePipe,
    /// `!`
    Bang,
    /// `|` (closure parameter delimiter)
    Bar,
    /// `=`
    Eq,
    /// `->`
    Arrow,

    // ── Delimiters ─────────────────────────────────────────────────────
    LParen,
    RParen,
    LBracket,
    RBracket,

    // ── Punctuation ────────────────────────────────────────────────────
    Comma,
    Dot,
    Colon,
    Semicolon,

    // ── Literals and names ─────────────────────────────────────────────
    /// Decimal integer literal, e.g. `42` or `1_000`.
    IntLiteral,
    Ident,

    // ── Trivia ─────────────────────────────────────────────────────────
    /// Spaces, tabs and newlines.
    Whitespace,
    /// `# ...` up to the end of the line.
    Comment,

    // ── Special ────────────────────────────────────────────────────────
    Eof,
    /// Invalid input, kept for error recovery.
    Error,
}

impl TokenKind {
    /// Whether the parser should skip this token during lookahead.
    pub fn is_trivia(&self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }
}

/// Look up a keyword from its spelling.
pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
    match s {
        "let" => Some(TokenKind::Let),
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_round_trip() {
        assert_eq!(keyword_from_str("let"), Some(TokenKind::Let));
        assert_eq!(keyword_from_str("true"), Some(TokenKind::True));
        assert_eq!(keyword_from_str("false"), Some(TokenKind::False));
    }

    #[test]
    fn non_keywords_are_rejected() {
        assert_eq!(keyword_from_str("Let"), None);
        assert_eq!(keyword_from_str("Select"), None);
        assert_eq!(keyword_from_str(""), None);
    }

    #[test]
    fn trivia_kinds() {
        assert!(TokenKind::Whitespace.is_trivia());
        assert!(TokenKind::Comment.is_trivia());
        assert!(!TokenKind::Ident.is_trivia());
    }

    #[test]
    fn token_new_sets_span() {
        let tok = Token::new(TokenKind::Ident, 3, 7);
        assert_eq!(tok.span, Span::new(3, 7));
    }
}
