//! Byte cursor over the source text.
//!
//! The cursor advances through the UTF-8 source byte-by-byte, with a
//! code-point decode for the occasional non-ASCII character (Latin-1
//! letters, U+00A0, and anything illegal). Positions are byte offsets
//! stored as `u32`.

use memchr::memchr;

/// Cheap, copyable read position over a source string.
///
/// Token boundaries produced by the scanner always lie on character
/// boundaries, so [`slice`](Self::slice) stays within safe `&str`
/// indexing.
#[derive(Clone, Copy, Debug)]
pub struct Cursor<'a> {
    src: &'a str,
    pos: u32,
}

impl<'a> Cursor<'a> {
    /// Create a cursor at position 0.
    ///
    /// # Panics
    ///
    /// Panics if the source exceeds `u32::MAX` bytes.
    #[must_use]
    pub fn new(src: &'a str) -> Self {
        assert!(
            u32::try_from(src.len()).is_ok(),
            "source exceeds u32::MAX bytes"
        );
        Cursor { src, pos: 0 }
    }

    /// The byte at the current position, or `0` at end of input.
    #[inline]
    #[must_use]
    pub fn current(&self) -> u8 {
        self.src.as_bytes().get(self.pos as usize).copied().unwrap_or(0)
    }

    /// The byte one position ahead, or `0` past end of input.
    #[inline]
    #[must_use]
    pub fn peek(&self) -> u8 {
        self.src
            .as_bytes()
            .get(self.pos as usize + 1)
            .copied()
            .unwrap_or(0)
    }

    /// The byte directly before `offset`, or `0` at offset 0.
    ///
    /// Used for the escape-line rule: `%` only opens an escape line when
    /// the preceding byte is `\n` (or the line is the first one).
    #[inline]
    #[must_use]
    pub fn byte_before(&self, offset: u32) -> u8 {
        if offset == 0 {
            0
        } else {
            self.src.as_bytes()[offset as usize - 1]
        }
    }

    /// Decode the character at the current position.
    ///
    /// Returns `None` at end of input. The scanner only needs this for
    /// bytes ≥ 0x80; ASCII dispatch goes through [`current`](Self::current).
    #[inline]
    #[must_use]
    pub fn current_char(&self) -> Option<char> {
        self.src[self.pos as usize..].chars().next()
    }

    /// Advance by `n` bytes.
    #[inline]
    pub fn advance(&mut self, n: u32) {
        debug_assert!(self.pos + n <= self.source_len(), "advance past end");
        self.pos += n;
    }

    /// `true` once every source byte has been consumed.
    #[inline]
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.pos as usize >= self.src.len()
    }

    /// Current byte offset.
    #[inline]
    #[must_use]
    pub fn pos(&self) -> u32 {
        self.pos
    }

    /// Total source length in bytes.
    #[inline]
    #[must_use]
    pub fn source_len(&self) -> u32 {
        // Length was validated in `new`.
        self.src.len() as u32
    }

    /// Source text between two byte offsets.
    ///
    /// Both offsets must lie on character boundaries, which holds for
    /// every token boundary the scanner produces.
    #[inline]
    #[must_use]
    pub fn slice(&self, start: u32, end: u32) -> &'a str {
        &self.src[start as usize..end as usize]
    }

    /// Offset of the next `\n` at or after the current position, or the
    /// end of input. memchr-backed.
    #[inline]
    #[must_use]
    pub fn find_line_end(&self) -> u32 {
        match memchr(b'\n', &self.src.as_bytes()[self.pos as usize..]) {
            Some(rel) => self.pos + rel as u32,
            None => self.source_len(),
        }
    }

    /// Offset just past the next `}` at or after the current position,
    /// or the end of input if the comment never closes. memchr-backed.
    #[inline]
    #[must_use]
    pub fn find_brace_close(&self) -> Option<u32> {
        memchr(b'}', &self.src.as_bytes()[self.pos as usize..]).map(|rel| self.pos + rel as u32 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_is_eof() {
        let cursor = Cursor::new("");
        assert!(cursor.is_eof());
        assert_eq!(cursor.current(), 0);
        assert_eq!(cursor.peek(), 0);
        assert_eq!(cursor.current_char(), None);
    }

    #[test]
    fn current_and_peek() {
        let mut cursor = Cursor::new("ab");
        assert_eq!(cursor.current(), b'a');
        assert_eq!(cursor.peek(), b'b');
        cursor.advance(1);
        assert_eq!(cursor.current(), b'b');
        assert_eq!(cursor.peek(), 0);
        cursor.advance(1);
        assert!(cursor.is_eof());
    }

    #[test]
    fn byte_before_at_start_is_zero() {
        let cursor = Cursor::new("x\n%");
        assert_eq!(cursor.byte_before(0), 0);
        assert_eq!(cursor.byte_before(1), b'x');
        assert_eq!(cursor.byte_before(2), b'\n');
    }

    #[test]
    fn decodes_multibyte_characters() {
        let mut cursor = Cursor::new("é4");
        assert_eq!(cursor.current_char(), Some('é'));
        cursor.advance('é'.len_utf8() as u32);
        assert_eq!(cursor.current_char(), Some('4'));
    }

    #[test]
    fn find_line_end_stops_at_newline() {
        let cursor = Cursor::new("; comment\nrest");
        assert_eq!(cursor.find_line_end(), 9);
    }

    #[test]
    fn find_line_end_runs_to_eof() {
        let cursor = Cursor::new("; trailing");
        assert_eq!(cursor.find_line_end(), 10);
    }

    #[test]
    fn find_brace_close_includes_brace() {
        let cursor = Cursor::new("{ comment } tail");
        assert_eq!(cursor.find_brace_close(), Some(11));
    }

    #[test]
    fn find_brace_close_missing() {
        let cursor = Cursor::new("{ open");
        assert_eq!(cursor.find_brace_close(), None);
    }

    #[test]
    fn slice_returns_source_text() {
        let cursor = Cursor::new("[Event \"X\"]");
        assert_eq!(cursor.slice(1, 6), "Event");
    }
}
