//! Event-based parser for query scripts.
//!
//! Parse functions call `open()` to start a node, `advance()` to consume
//! tokens and `close()` to give the node its kind. Events are collected into
//! a flat `Vec<Event>` and turned into a rowan `GreenNode` by `build_tree()`.
//! `open_before()` wraps an already completed node (turning `xs` into
//! `xs.Count()`) through a forward-parent link instead of moving events.
//!
//! Whitespace and comments never reach lookahead. `open()` flushes pending
//! trivia first, so it lands in the parent and node ranges start at their
//! first significant token.

pub(crate) mod expressions;
pub(crate) mod types;

use spanq_common::span::Span;
use spanq_common::token::Token;

use crate::error::ParseError;
use crate::syntax_kind::SyntaxKind;

#[derive(Debug)]
enum Event {
    /// Start a node. `kind` stays TOMBSTONE until `close()` patches it.
    Open {
        kind: SyntaxKind,
        forward_parent: Option<usize>,
    },
    Close,
    /// Consume exactly one token.
    Advance,
}

/// A started but not yet closed node.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkOpened {
    index: usize,
}

/// A completed node, usable with `open_before()`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkClosed {
    index: usize,
}

pub(crate) struct Parser<'src> {
    /// Every token from the lexer, trivia included.
    tokens: Vec<Token>,
    /// Index of the next unconsumed token.
    pos: usize,
    events: Vec<Event>,
    /// Script text, for token text and end-of-input spans.
    source: &'src str,
    errors: Vec<ParseError>,
    /// Set by the first error in the current statement; cleared on recovery.
    has_error: bool,
}

impl<'src> Parser<'src> {
    /// Create a parser over a token stream and the text it came from.
    pub(crate) fn new(tokens: Vec<Token>, source: &'src str) -> Self {
        Self {
            tokens,
            pos: 0,
            events: Vec::new(),
            source,
            errors: Vec::new(),
            has_error: false,
        }
    }

    // ── Lookahead ──────────────────────────────────────────────────────

    /// Kind of the current significant token, or `EOF` past the end.
    pub(crate) fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    /// Kind of the `n`th significant token ahead, or `EOF` past the end.
    ///
    /// `nth(0)` is `current()`.
    pub(crate) fn nth(&self, n: usize) -> SyntaxKind {
        self.tokens[self.pos..]
            .iter()
            .filter(|t| !t.kind.is_trivia())
            .nth(n)
            .map(|t| SyntaxKind::from(t.kind.clone()))
            .unwrap_or(SyntaxKind::EOF)
    }

    /// Text of the current significant token.
    pub(crate) fn current_text(&self) -> &str {
        let pos = self.skip_to_significant(self.pos);
        match self.tokens.get(pos) {
            Some(token) => &self.source[token.span.to_range()],
            None => "",
        }
    }

    /// Span of the current significant token. At end of input this is an
    /// empty span at the end of the source.
    pub(crate) fn current_span(&self) -> Span {
        let pos = self.skip_to_significant(self.pos);
        match self.tokens.get(pos) {
            Some(token) => token.span,
            None => Span::empty_at(self.source.len() as u32),
        }
    }

    /// Whether the current significant token is `kind`.
    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    /// Whether the current significant token is any of `kinds`.
    pub(crate) fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.current())
    }

    // ── Mutation: node management ──────────────────────────────────────

    /// Start a node. Pass the marker to `close()` to finish it.
    ///
    /// Pending trivia is consumed first so it belongs to the parent.
    pub(crate) fn open(&mut self) -> MarkOpened {
        if !self.events.is_empty() {
            self.eat_trivia();
        }
        let mark = MarkOpened {
            index: self.events.len(),
        };
        self.events.push(Event::Open {
            kind: SyntaxKind::TOMBSTONE,
            forward_parent: None,
        });
        mark
    }

    /// Start a node that will become the parent of `completed`.
    ///
    /// Used once the receiver of a call is already closed: after `xs` is
    /// parsed, the `.Count()` that follows wraps it. The completed node's
    /// Open event gets a `forward_parent` link instead of events being
    /// moved.
    pub(crate) fn open_before(&mut self, completed: MarkClosed) -> MarkOpened {
        let mark = MarkOpened {
            index: self.events.len(),
        };
        self.events.push(Event::Open {
            kind: SyntaxKind::TOMBSTONE,
            forward_parent: None,
        });
        if let Event::Open { forward_parent, .. } = &mut self.events[completed.index] {
            *forward_parent = Some(mark.index);
        }
        mark
    }

    /// Close a node, patching its Open event with `kind`.
    pub(crate) fn close(&mut self, m: MarkOpened, kind: SyntaxKind) -> MarkClosed {
        if let Event::Open {
            kind: slot_kind, ..
        } = &mut self.events[m.index]
        {
            *slot_kind = kind;
        }
        self.events.push(Event::Close);
        MarkClosed { index: m.index }
    }

    // ── Mutation: token consumption ────────────────────────────────────

    /// Consume the next significant token together with the trivia before it.
    pub(crate) fn advance(&mut self) {
        self.eat_trivia();
        if self.pos < self.tokens.len() {
            self.events.push(Event::Advance);
            self.pos += 1;
        }
    }

    /// Consume a `kind` token and return true, or record an error and
    /// return false.
    pub(crate) fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            self.error(&format!("expected {}", describe(kind)));
            false
        }
    }

    /// Consume a `kind` token if it is next. No error otherwise.
    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_trivia(&mut self) {
        while self.pos < self.tokens.len() && self.tokens[self.pos].kind.is_trivia() {
            self.events.push(Event::Advance);
            self.pos += 1;
        }
    }

    fn skip_to_significant(&self, mut pos: usize) -> usize {
        while pos < self.tokens.len() && self.tokens[pos].kind.is_trivia() {
            pos += 1;
        }
        pos
    }

    // ── Error reporting ────────────────────────────────────────────────

    /// Record an error at the current token. Only the first error of a
    /// statement is kept; later ones are usually follow-on noise.
    pub(crate) fn error(&mut self, message: &str) {
        if self.has_error {
            return;
        }
        let span = self.current_span();
        self.errors.push(ParseError::new(message, span));
        self.has_error = true;
    }

    /// Like `error()`, with a second labelled span such as the opening
    /// delimiter of an unclosed list.
    pub(crate) fn error_with_related(&mut self, message: &str, related_span: Span, related: &str) {
        if self.has_error {
            return;
        }
        let span = self.current_span();
        self.errors
            .push(ParseError::with_related(message, span, related, related_span));
        self.has_error = true;
    }

    /// Whether the current statement already failed. Parse functions
    /// check this and bail out early.
    pub(crate) fn has_error(&self) -> bool {
        self.has_error
    }

    /// Mark the statement as broken without a message of its own. Used for
    /// lexer error tokens, which are already reported.
    pub(crate) fn mark_error(&mut self) {
        self.has_error = true;
    }

    /// Skip to the end of the broken statement and resume parsing.
    fn recover_statement(&mut self) {
        if !self.at_any(&[SyntaxKind::SEMICOLON, SyntaxKind::EOF]) {
            let m = self.open();
            while !self.at_any(&[SyntaxKind::SEMICOLON, SyntaxKind::EOF]) {
                self.advance();
            }
            self.close(m, SyntaxKind::ERROR_NODE);
        }
        self.eat(SyntaxKind::SEMICOLON);
        self.has_error = false;
    }

    // ── Tree building ──────────────────────────────────────────────────

    /// Convert the events into a green tree. Forward-parent chains are
    /// opened outermost first, and the wrapper events are tombstoned so they
    /// are skipped when reached later.
    pub(crate) fn build_tree(mut self) -> (rowan::GreenNode, Vec<ParseError>) {
        let mut builder = rowan::GreenNodeBuilder::new();
        let mut token_pos = 0usize;
        let mut chain: Vec<SyntaxKind> = Vec::new();

        for i in 0..self.events.len() {
            match self.events[i] {
                Event::Open {
                    kind,
                    forward_parent: None,
                } => {
                    if kind != SyntaxKind::TOMBSTONE {
                        builder.start_node(rowan::SyntaxKind(kind as u16));
                    }
                }
                Event::Open {
                    forward_parent: Some(_),
                    ..
                } => {
                    chain.clear();
                    let mut current = Some(i);
                    while let Some(idx) = current {
                        let Event::Open {
                            kind,
                            forward_parent,
                        } = &mut self.events[idx]
                        else {
                            break;
                        };
                        chain.push(*kind);
                        current = forward_parent.take();
                        if idx != i {
                            *kind = SyntaxKind::TOMBSTONE;
                        }
                    }
                    for kind in chain.iter().rev() {
                        if *kind != SyntaxKind::TOMBSTONE {
                            builder.start_node(rowan::SyntaxKind(*kind as u16));
                        }
                    }
                }
                Event::Close => builder.finish_node(),
                Event::Advance => {
                    if let Some(token) = self.tokens.get(token_pos) {
                        let kind = SyntaxKind::from(token.kind.clone());
                        builder.token(
                            rowan::SyntaxKind(kind as u16),
                            &self.source[token.span.to_range()],
                        );
                        token_pos += 1;
                    }
                }
            }
        }

        (builder.finish(), self.errors)
    }
}

/// Human-readable name of a token kind for "expected ..." messages.
pub(crate) fn describe(kind: SyntaxKind) -> &'static str {
    match kind {
        SyntaxKind::SEMICOLON => "`;`",
        SyntaxKind::COLON => "`:`",
        SyntaxKind::COMMA => "`,`",
        SyntaxKind::EQ => "`=`",
        SyntaxKind::ARROW => "`->`",
        SyntaxKind::BAR => "`|`",
        SyntaxKind::L_PAREN => "`(`",
        SyntaxKind::R_PAREN => "`)`",
        SyntaxKind::R_BRACKET => "`]`",
        SyntaxKind::GT => "`>`",
        SyntaxKind::IDENT => "identifier",
        _ => "token",
    }
}

// ── Top-level parsing ──────────────────────────────────────────────────

/// Parse a whole script: statements terminated by `;` (optional after the
/// last one). A broken statement becomes an ERROR_NODE and parsing resumes
/// after its `;`.
pub(crate) fn parse_source_file(p: &mut Parser) {
    let root = p.open();

    loop {
        if p.at(SyntaxKind::EOF) {
            break;
        }
        if p.eat(SyntaxKind::SEMICOLON) {
            continue;
        }

        parse_stmt(p);

        if p.has_error() {
            p.recover_statement();
        }
    }

    p.advance(); // EOF, with any trailing trivia
    p.close(root, SyntaxKind::SOURCE_FILE);
}

fn parse_stmt(p: &mut Parser) {
    let m = p.open();
    let kind = if p.at(SyntaxKind::LET_KW) {
        parse_let_body(p);
        SyntaxKind::LET_STMT
    } else {
        expressions::expr(p);
        SyntaxKind::EXPR_STMT
    };
    if !p.has_error() && !p.at(SyntaxKind::EOF) {
        p.expect(SyntaxKind::SEMICOLON);
    }
    p.close(m, kind);
}

/// `let name (: Type)? = expr`
fn parse_let_body(p: &mut Parser) {
    p.advance(); // let

    let name = p.open();
    p.expect(SyntaxKind::IDENT);
    p.close(name, SyntaxKind::NAME);
    if p.has_error() {
        return;
    }

    if p.at(SyntaxKind::COLON) {
        let ann = p.open();
        p.advance(); // :
        types::parse_type(p);
        p.close(ann, SyntaxKind::TYPE_ANNOTATION);
        if p.has_error() {
            return;
        }
    }

    if p.expect(SyntaxKind::EQ) {
        expressions::expr(p);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spanq_lexer::Lexer;

    fn parser(source: &str) -> Parser<'_> {
        Parser::new(Lexer::tokenize(source), source)
    }

    #[test]
    fn lookahead_skips_trivia() {
        let p = parser("xs # comment\n . Count");
        assert_eq!(p.current(), SyntaxKind::IDENT);
        assert_eq!(p.nth(1), SyntaxKind::DOT);
        assert_eq!(p.nth(2), SyntaxKind::IDENT);
        assert_eq!(p.nth(3), SyntaxKind::EOF);
        assert_eq!(p.nth(10), SyntaxKind::EOF);
    }

    #[test]
    fn current_text_and_span() {
        let p = parser("   hello");
        assert_eq!(p.current_text(), "hello");
        assert_eq!(p.current_span(), Span::new(3, 8));
    }

    #[test]
    fn expect_records_only_first_error() {
        let mut p = parser("let");
        let root = p.open();
        assert!(!p.expect(SyntaxKind::IDENT));
        assert!(!p.expect(SyntaxKind::EQ));
        assert_eq!(p.errors.len(), 1);
        assert_eq!(p.errors[0].message, "expected identifier");
        p.advance();
        p.advance();
        p.close(root, SyntaxKind::SOURCE_FILE);
        let (_, errors) = p.build_tree();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn open_before_wraps_completed_node() {
        let mut p = parser("xs.Count()");
        let root = p.open();
        let recv = p.open();
        p.advance(); // xs
        let recv = p.close(recv, SyntaxKind::NAME_REF);
        let call = p.open_before(recv);
        p.advance(); // .
        p.advance(); // Count
        let args = p.open();
        p.advance(); // (
        p.advance(); // )
        p.close(args, SyntaxKind::ARG_LIST);
        p.close(call, SyntaxKind::METHOD_CALL_EXPR);
        p.advance(); // EOF
        p.close(root, SyntaxKind::SOURCE_FILE);

        let (green, errors) = p.build_tree();
        assert!(errors.is_empty());
        let root = crate::cst::SyntaxNode::new_root(green);
        let call = root.first_child().unwrap();
        assert_eq!(call.kind(), SyntaxKind::METHOD_CALL_EXPR);
        assert_eq!(call.first_child().unwrap().kind(), SyntaxKind::NAME_REF);
        assert_eq!(root.text().to_string(), "xs.Count()");
    }

    #[test]
    fn trivia_lands_outside_nodes() {
        let mut p = parser("  xs  ");
        let root = p.open();
        let name = p.open();
        p.advance();
        p.close(name, SyntaxKind::NAME_REF);
        p.advance(); // EOF
        p.close(root, SyntaxKind::SOURCE_FILE);
        let (green, _) = p.build_tree();
        let root = crate::cst::SyntaxNode::new_root(green);
        let name = root.first_child().unwrap();
        assert_eq!(u32::from(name.text_range().start()), 2);
        assert_eq!(u32::from(name.text_range().end()), 4);
        assert_eq!(root.text().to_string(), "  xs  ");
    }
}
