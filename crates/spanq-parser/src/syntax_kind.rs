//! SyntaxKind enum for the query-script CST.
//!
//! Token kinds (leaves) map 1:1 from [`TokenKind`]; composite kinds are the
//! nodes the parser builds. The first two values are sentinels used by the
//! event-based parser.

use spanq_common::token::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // ── Sentinels ──────────────────────────────────────────────────────
    /// Placeholder for parser events whose kind is not known yet.
    TOMBSTONE = 0,
    /// Wrapper for input that could not be parsed.
    ERROR_NODE,

    // ── Keywords ───────────────────────────────────────────────────────
    LET_KW,
    TRUE_KW,
    FALSE_KW,

    // ── Operators ──────────────────────────────────────────────────────
    PLUS,
    MINUS,
    STAR,
    SLASH,
    PERCENT,
    EQ_EQ,
    NOT_EQ,
    LT,
    GT,
    LT_EQ,
    GT_EQ,
    AMP_AMP,
    PIPE_PIPE,
    BANG,
    BAR,
    EQ,
    ARROW,

    // ── Delimiters and punctuation ─────────────────────────────────────
    L_PAREN,
    R_PAREN,
    L_BRACKET,
    R_BRACKET,
    COMMA,
    DOT,
    COLON,
    SEMICOLON,

    // ── Literals, names, trivia ────────────────────────────────────────
    INT_LITERAL,
    IDENT,
    WHITESPACE,
    COMMENT,
    EOF,
    /// A token the lexer could not classify.
    ERROR,

    // ── Statements ─────────────────────────────────────────────────────
    SOURCE_FILE,
    LET_STMT,
    EXPR_STMT,
    NAME,

    // ── Types ──────────────────────────────────────────────────────────
    TYPE_ANNOTATION,
    /// `Name` or `Name<Args>`.
    PATH_TYPE,
    GENERIC_ARG_LIST,
    /// `Fn(A, B) -> R`.
    FN_TYPE,
    RET_TYPE,

    // ── Expressions ────────────────────────────────────────────────────
    LITERAL,
    NAME_REF,
    BINARY_EXPR,
    UNARY_EXPR,
    PAREN_EXPR,
    ARRAY_EXPR,
    CLOSURE_EXPR,
    PARAM_LIST,
    PARAM,
    /// `receiver.Name(args)`.
    METHOD_CALL_EXPR,
    ARG_LIST,

    #[doc(hidden)]
    __LAST,
}

impl SyntaxKind {
    pub fn is_trivia(self) -> bool {
        matches!(self, SyntaxKind::WHITESPACE | SyntaxKind::COMMENT)
    }
}

impl From<TokenKind> for SyntaxKind {
    fn from(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Let => SyntaxKind::LET_KW,
            TokenKind::True => SyntaxKind::TRUE_KW,
            TokenKind::False => SyntaxKind::FALSE_KW,
            TokenKind::Plus => SyntaxKind::PLUS,
            TokenKind::Minus => SyntaxKind::MINUS,
            TokenKind::Star => SyntaxKind::STAR,
            TokenKind::Slash => SyntaxKind::SLASH,
            TokenKind::Percent => SyntaxKind::PERCENT,
            TokenKind::EqEq => SyntaxKind::EQ_EQ,
            TokenKind::NotEq => SyntaxKind::NOT_EQ,
            TokenKind::Lt => SyntaxKind::LT,
            TokenKind::Gt => SyntaxKind::GT,
            TokenKind::LtEq => SyntaxKind::LT_EQ,
            TokenKind::GtEq => SyntaxKind::GT_EQ,
            TokenKind::AmpAmp => SyntaxKind::AMP_AMP,
            TokenKind::PipePipe => SyntaxKind::PIPE_PIPE,
            TokenKind::Bang => SyntaxKind::BANG,
            TokenKind::Bar => SyntaxKind::BAR,
            TokenKind::Eq => SyntaxKind::EQ,
            TokenKind::Arrow => SyntaxKind::ARROW,
            TokenKind::LParen => SyntaxKind::L_PAREN,
            TokenKind::RParen => SyntaxKind::R_PAREN,
            TokenKind::LBracket => SyntaxKind::L_BRACKET,
            TokenKind::RBracket => SyntaxKind::R_BRACKET,
            TokenKind::Comma => SyntaxKind::COMMA,
            TokenKind::Dot => SyntaxKind::DOT,
            TokenKind::Colon => SyntaxKind::COLON,
            TokenKind::Semicolon => SyntaxKind::SEMICOLON,
            TokenKind::IntLiteral => SyntaxKind::INT_LITERAL,
            TokenKind::Ident => SyntaxKind::IDENT,
            TokenKind::Whitespace => SyntaxKind::WHITESPACE,
            TokenKind::Comment => SyntaxKind::COMMENT,
            TokenKind::Eof => SyntaxKind::EOF,
            TokenKind::Error => SyntaxKind::ERROR,
        }
    }
}
