/// Character iterator over a script with byte-offset tracking.
///
/// Positions are byte offsets into the UTF-8 source, so they can be used
/// directly as token spans.
pub struct Cursor<'src> {
    source: &'src str,
    pos: u32,
    chars: std::str::Chars<'src>,
}

impl<'src> Cursor<'src> {
    /// Create a cursor at the start of `source`.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            chars: source.chars(),
        }
    }

    /// The current character, without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    /// Consume the current character and move past it.
    ///
    /// Returns the consumed character, or `None` at end of input.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos += c.len_utf8() as u32;
        Some(c)
    }

    /// Consume the current character if it equals `expected`.
    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Current byte position.
    pub fn pos(&self) -> u32 {
        self.pos
    }

    /// Consume characters while `predicate` holds for the current one.
    pub fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.advance();
        }
    }

    /// Source text between two byte offsets previously returned by `pos()`.
    ///
    /// # Panics
    ///
    /// Panics if an offset is out of bounds or not on a char boundary.
    pub fn slice(&self, start: u32, end: u32) -> &'src str {
        &self.source[start as usize..end as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_tracks_bytes() {
        let mut cursor = Cursor::new("a\u{00E9}b");
        assert_eq!(cursor.advance(), Some('a'));
        assert_eq!(cursor.advance(), Some('\u{00E9}'));
        assert_eq!(cursor.pos(), 3);
        assert_eq!(cursor.advance(), Some('b'));
        assert_eq!(cursor.peek(), None);
    }

    #[test]
    fn eat_only_on_match() {
        let mut cursor = Cursor::new("=>");
        assert!(!cursor.eat('>'));
        assert!(cursor.eat('='));
        assert!(cursor.eat('>'));
        assert_eq!(cursor.peek(), None);
    }

    #[test]
    fn eat_while_and_slice() {
        let mut cursor = Cursor::new("count42 rest");
        cursor.eat_while(|c| c.is_alphanumeric());
        assert_eq!(cursor.pos(), 7);
        assert_eq!(cursor.slice(0, 7), "count42");
    }
}
