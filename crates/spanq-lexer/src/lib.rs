// spanq lexer -- tokenizer for query scripts.

mod cursor;

use cursor::Cursor;
use spanq_common::error::{LexError, LexErrorKind};
use spanq_common::span::Span;
use spanq_common::token::{keyword_from_str, Token, TokenKind};

/// Converts script text into tokens, trivia included.
///
/// Implements `Iterator<Item = Token>`; the last token is always `Eof`.
/// Bad input becomes an `Error` token plus an entry in [`Lexer::errors`].
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    emitted_eof: bool,
    errors: Vec<LexError>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            emitted_eof: false,
            errors: Vec::new(),
        }
    }

    /// Tokenize the entire source, including the final `Eof`.
    pub fn tokenize(source: &str) -> Vec<Token> {
        Lexer::new(source).collect()
    }

    /// Tokenize the entire source and return the lexical errors alongside.
    pub fn tokenize_with_errors(source: &str) -> (Vec<Token>, Vec<LexError>) {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.by_ref().collect();
        (tokens, lexer.errors)
    }

    /// Errors found so far.
    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    fn next_token(&mut self) -> Token {
        let start = self.cursor.pos();

        let Some(c) = self.cursor.peek() else {
            return Token::new(TokenKind::Eof, start, start);
        };

        match c {
            ' ' | '\t' | '\r' | '\n' => {
                self.cursor.eat_while(|c| matches!(c, ' ' | '\t' | '\r' | '\n'));
                Token::new(TokenKind::Whitespace, start, self.cursor.pos())
            }
            '#' => {
                self.cursor.eat_while(|c| c != '\n');
                Token::new(TokenKind::Comment, start, self.cursor.pos())
            }

            // ── Single-character tokens ──────────────────────────────────
            '(' => self.single(TokenKind::LParen, start),
            ')' => self.single(TokenKind::RParen, start),
            '[' => self.single(TokenKind::LBracket, start),
            ']' => self.single(TokenKind::RBracket, start),
            ',' => self.single(TokenKind::Comma, start),
            '.' => self.single(TokenKind::Dot, start),
            ':' => self.single(TokenKind::Colon, start),
            ';' => self.single(TokenKind::Semicolon, start),
            '+' => self.single(TokenKind::Plus, start),
            '*' => self.single(TokenKind::Star, start),
            '/' => self.single(TokenKind::Slash, start),
            '%' => self.single(TokenKind::Percent, start),

            // ── One- or two-character operators ──────────────────────────
            '=' => self.one_or_two(start, '=', TokenKind::EqEq, TokenKind::Eq),
            '!' => self.one_or_two(start, '=', TokenKind::NotEq, TokenKind::Bang),
            '<' => self.one_or_two(start, '=', TokenKind::LtEq, TokenKind::Lt),
            '>' => self.one_or_two(start, '=', TokenKind::GtEq, TokenKind::Gt),
            '|' => self.one_or_two(start, '|', TokenKind::PipePipe, TokenKind::Bar),
            '-' => self.one_or_two(start, '>', TokenKind::Arrow, TokenKind::Minus),
            '&' => {
                self.cursor.advance();
                if self.cursor.eat('&') {
                    Token::new(TokenKind::AmpAmp, start, self.cursor.pos())
                } else {
                    self.error(LexErrorKind::LoneAmpersand, start)
                }
            }

            '0'..='9' => self.lex_number(start),

            c if is_ident_start(c) => self.lex_ident(start),

            other => {
                self.cursor.advance();
                self.error(LexErrorKind::UnexpectedCharacter(other), start)
            }
        }
    }

    fn single(&mut self, kind: TokenKind, start: u32) -> Token {
        self.cursor.advance();
        Token::new(kind, start, self.cursor.pos())
    }

    /// Consume one character, then `second` if present.
    fn one_or_two(&mut self, start: u32, second: char, two: TokenKind, one: TokenKind) -> Token {
        self.cursor.advance();
        let kind = if self.cursor.eat(second) { two } else { one };
        Token::new(kind, start, self.cursor.pos())
    }

    fn error(&mut self, kind: LexErrorKind, start: u32) -> Token {
        let end = self.cursor.pos();
        self.errors.push(LexError::new(kind, Span::new(start, end)));
        Token::new(TokenKind::Error, start, end)
    }

    /// Decimal integer literal; `_` separators are allowed after the first digit.
    fn lex_number(&mut self, start: u32) -> Token {
        self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
        let text = self.cursor.slice(start, self.cursor.pos());
        if text.replace('_', "").parse::<i64>().is_err() {
            return self.error(LexErrorKind::InvalidNumberLiteral(text.to_string()), start);
        }
        Token::new(TokenKind::IntLiteral, start, self.cursor.pos())
    }

    fn lex_ident(&mut self, start: u32) -> Token {
        self.cursor.eat_while(is_ident_continue);
        let text = self.cursor.slice(start, self.cursor.pos());
        let kind = keyword_from_str(text).unwrap_or(TokenKind::Ident);
        Token::new(kind, start, self.cursor.pos())
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.emitted_eof {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.emitted_eof = true;
        }
        Some(token)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn significant_kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source)
            .into_iter()
            .map(|t| t.kind)
            .filter(|k| !k.is_trivia())
            .collect()
    }

    #[test]
    fn lex_let_binding() {
        assert_eq!(
            significant_kinds("let x = 42;"),
            vec![
                TokenKind::Let,
                TokenKind::Ident,
                TokenKind::Eq,
                TokenKind::IntLiteral,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_closure_delimiters() {
        assert_eq!(
            significant_kinds("|x| x || y"),
            vec![
                TokenKind::Bar,
                TokenKind::Ident,
                TokenKind::Bar,
                TokenKind::Ident,
                TokenKind::PipePipe,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn trivia_is_kept_and_spans_are_contiguous() {
        let source = "xs # views\n.Count()";
        let tokens = Lexer::tokenize(source);
        let mut expected_start = 0;
        for tok in &tokens {
            assert_eq!(tok.span.start, expected_start);
            expected_start = tok.span.end;
        }
        assert_eq!(expected_start as usize, source.len());
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Comment));
    }

    #[test]
    fn errors_are_collected() {
        let (tokens, errors) = Lexer::tokenize_with_errors("a @ b & c");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].kind, LexErrorKind::UnexpectedCharacter('@'));
        assert_eq!(errors[1].kind, LexErrorKind::LoneAmpersand);
        assert_eq!(
            tokens.iter().filter(|t| t.kind == TokenKind::Error).count(),
            2
        );
    }

    #[test]
    fn oversized_literal_is_an_error() {
        let (_, errors) = Lexer::tokenize_with_errors("99999999999999999999");
        assert!(matches!(
            errors[0].kind,
            LexErrorKind::InvalidNumberLiteral(_)
        ));
    }
}
