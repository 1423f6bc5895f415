//! Parse error types.

use std::fmt;

use spanq_common::error::LexError;
use spanq_common::span::Span;

/// A parse error with a primary span and an optional related span
/// (e.g. "opened here" for an unclosed delimiter).
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
    pub related: Option<(String, Span)>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            related: None,
        }
    }

    pub fn with_related(
        message: impl Into<String>,
        span: Span,
        related_message: impl Into<String>,
        related_span: Span,
    ) -> Self {
        Self {
            message: message.into(),
            span,
            related: Some((related_message.into(), related_span)),
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::new(err.to_string(), err.span)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;
    use spanq_common::error::LexErrorKind;

    #[test]
    fn with_related_keeps_both_spans() {
        let err = ParseError::with_related(
            "expected `)`",
            Span::new(20, 21),
            "argument list opened here",
            Span::new(8, 9),
        );
        assert_eq!(err.span, Span::new(20, 21));
        let (msg, span) = err.related.unwrap();
        assert_eq!(msg, "argument list opened here");
        assert_eq!(span, Span::new(8, 9));
    }

    #[test]
    fn from_lex_error() {
        let lex = LexError::new(LexErrorKind::UnexpectedCharacter('$'), Span::new(2, 3));
        let err = ParseError::from(lex);
        assert_eq!(err.to_string(), "unexpected character: '$'");
        assert_eq!(err.span, Span::new(2, 3));
    }
}
