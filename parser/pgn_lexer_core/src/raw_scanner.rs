//! Hand-written raw scanner producing `(RawTag, len)` pairs.
//!
//! The scanner walks the source once and hands out [`RawToken`] values
//! with zero heap allocation and zero diagnostics. String contents, NAG
//! values, and error reporting are deferred to the cooking layer in
//! `pgn_parse`; this layer only finds token boundaries.
//!
//! Dispatch is character-class driven: whitespace and symbol runs are
//! maximal over their classes, the special characters each open their
//! own sub-lexer (string literal, end-of-line comment, brace comment,
//! escape line, NAG), and anything else is a one-character illegal
//! token. Token lengths always sum to the source length.

use crate::automaton::{Classification, SymbolAutomaton};
use crate::char_class::{classify, CharClass};
use crate::cursor::Cursor;

/// Raw token kind produced by the low-level tokenizer.
///
/// Error conditions are encoded as tags (`UnterminatedTagValue`,
/// `UnterminatedBraceComment`, `Unrecognized`, `IllegalChar`), not as
/// `Result::Err` — the cooking layer turns them into diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RawTag {
    /// Maximal whitespace run (`\t \n \x0B \r ' '`, U+00A0).
    Whitespace,
    /// `%` at the start of a line through the end of the line
    /// (terminating newline excluded, as is a `\r` directly before it).
    EscapeLine,
    /// Exactly one character no class claims. Multi-byte aware.
    IllegalChar,
    /// `;` through the end of the line (terminator excluded).
    EolComment,
    /// `{` through `}`, inclusive.
    BraceComment,
    /// `{` that never closes; runs to end of input.
    UnterminatedBraceComment,
    /// `"` through the next unescaped `"`, inclusive. `\x` pairs are
    /// skipped blindly; decoding happens in the cooking layer.
    TagValue,
    /// `"` that never closes; runs to end of input.
    UnterminatedTagValue,
    /// `$` plus a maximal ASCII digit run. May be `$` alone.
    Nag,
    /// `[`
    BracketOpen,
    /// `]`
    BracketClose,
    /// `(`
    ParenOpen,
    /// `)`
    ParenClose,
    /// `.`
    Period,
    /// `*`
    Asterisk,
    /// Digit-run symbol.
    MoveNumber,
    /// Move-shaped symbol (including castling). `is_valid_tag_name` is
    /// set when the same characters also form a valid tag name.
    Move {
        /// The lexeme is also a letter-led letters/digits/underscore run.
        is_valid_tag_name: bool,
    },
    /// Tag-name-shaped symbol that is not move-shaped.
    TagName,
    /// `1-0`
    WhiteWins,
    /// `0-1`
    BlackWins,
    /// `1/2-1/2`
    Draw,
    /// Symbol run the automaton did not classify.
    Unrecognized,
    /// End of input. Zero length; repeats forever.
    Eof,
}

/// Raw token: a tag and a byte length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawToken {
    /// What kind of token this is.
    pub tag: RawTag,
    /// Length of the token in bytes.
    pub len: u32,
}

/// Pure, allocation-free scanner. Produces one token at a time.
#[derive(Debug)]
pub struct RawScanner<'a> {
    cursor: Cursor<'a>,
}

impl<'a> RawScanner<'a> {
    /// Create a scanner at the start of `src`.
    ///
    /// # Panics
    ///
    /// Panics if the source exceeds `u32::MAX` bytes.
    #[must_use]
    pub fn new(src: &'a str) -> Self {
        RawScanner {
            cursor: Cursor::new(src),
        }
    }

    /// Produce the next raw token.
    ///
    /// Returns [`RawTag::Eof`] with `len == 0` once the source is
    /// exhausted; further calls keep returning it.
    pub fn next_token(&mut self) -> RawToken {
        let start = self.cursor.pos();
        let Some(c) = self.cursor.current_char() else {
            return RawToken {
                tag: RawTag::Eof,
                len: 0,
            };
        };
        let class = classify(c);
        if class.is_whitespace() {
            self.whitespace(start)
        } else if class.is_symbol() {
            self.symbol(start, class, c)
        } else if class == CharClass::Special {
            self.special(start)
        } else {
            self.illegal(start, c)
        }
    }

    fn token(&self, tag: RawTag, start: u32) -> RawToken {
        RawToken {
            tag,
            len: self.cursor.pos() - start,
        }
    }

    // ─── Whitespace ──────────────────────────────────────────────────

    fn whitespace(&mut self, start: u32) -> RawToken {
        while let Some(c) = self.cursor.current_char() {
            if !classify(c).is_whitespace() {
                break;
            }
            self.cursor.advance(c.len_utf8() as u32);
        }
        self.token(RawTag::Whitespace, start)
    }

    // ─── Symbol runs ─────────────────────────────────────────────────

    fn symbol(&mut self, start: u32, first: CharClass, c: char) -> RawToken {
        let mut machine = SymbolAutomaton::start(first);
        self.cursor.advance(c.len_utf8() as u32);
        while let Some(c) = self.cursor.current_char() {
            let class = classify(c);
            if !class.is_symbol() {
                break;
            }
            machine.step(class);
            self.cursor.advance(c.len_utf8() as u32);
        }
        let tag = match machine.classification() {
            Some(Classification::MoveNumber) => RawTag::MoveNumber,
            Some(Classification::Move { is_valid_tag_name }) => {
                RawTag::Move { is_valid_tag_name }
            }
            Some(Classification::TagName) => RawTag::TagName,
            Some(Classification::WhiteWinMarker) => RawTag::WhiteWins,
            Some(Classification::BlackWinMarker) => RawTag::BlackWins,
            Some(Classification::DrawMarker) => RawTag::Draw,
            None => RawTag::Unrecognized,
        };
        self.token(tag, start)
    }

    // ─── Specials ────────────────────────────────────────────────────

    fn special(&mut self, start: u32) -> RawToken {
        match self.cursor.current() {
            b'*' => self.single(RawTag::Asterisk, start),
            b'[' => self.single(RawTag::BracketOpen, start),
            b']' => self.single(RawTag::BracketClose, start),
            b'(' => self.single(RawTag::ParenOpen, start),
            b')' => self.single(RawTag::ParenClose, start),
            b'.' => self.single(RawTag::Period, start),
            b'"' => self.string(start),
            b';' => self.eol_comment(start),
            b'{' => self.brace_comment(start),
            b'$' => self.nag(start),
            b'%' => self.escape_line(start),
            b => unreachable!("byte {b:#04x} dispatched as special"),
        }
    }

    fn single(&mut self, tag: RawTag, start: u32) -> RawToken {
        self.cursor.advance(1);
        self.token(tag, start)
    }

    // ─── String literals ─────────────────────────────────────────────

    fn string(&mut self, start: u32) -> RawToken {
        self.cursor.advance(1); // opening quote
        loop {
            let Some(c) = self.cursor.current_char() else {
                return self.token(RawTag::UnterminatedTagValue, start);
            };
            match c {
                '"' => {
                    self.cursor.advance(1);
                    return self.token(RawTag::TagValue, start);
                }
                '\\' => {
                    self.cursor.advance(1);
                    // Skip whatever the backslash escapes; validation is
                    // the cooking layer's job.
                    if let Some(escaped) = self.cursor.current_char() {
                        self.cursor.advance(escaped.len_utf8() as u32);
                    }
                }
                _ => self.cursor.advance(c.len_utf8() as u32),
            }
        }
    }

    // ─── Comments and escape lines ───────────────────────────────────

    /// End of the current line for line-shaped tokens: the next `\n`
    /// (excluded), also excluding a `\r` directly before it.
    fn line_token_end(&self) -> u32 {
        let line_end = self.cursor.find_line_end();
        if line_end < self.cursor.source_len() && self.cursor.byte_before(line_end) == b'\r' {
            line_end - 1
        } else {
            line_end
        }
    }

    fn eol_comment(&mut self, start: u32) -> RawToken {
        self.cursor.advance(1); // ';'
        let end = self.line_token_end();
        self.cursor.advance(end - self.cursor.pos());
        self.token(RawTag::EolComment, start)
    }

    fn brace_comment(&mut self, start: u32) -> RawToken {
        self.cursor.advance(1); // '{'
        match self.cursor.find_brace_close() {
            Some(end) => {
                self.cursor.advance(end - self.cursor.pos());
                self.token(RawTag::BraceComment, start)
            }
            None => {
                self.cursor.advance(self.cursor.source_len() - self.cursor.pos());
                self.token(RawTag::UnterminatedBraceComment, start)
            }
        }
    }

    fn escape_line(&mut self, start: u32) -> RawToken {
        // '%' opens an escape line only at the start of a line.
        if start != 0 && self.cursor.byte_before(start) != b'\n' {
            return self.single(RawTag::IllegalChar, start);
        }
        self.cursor.advance(1); // '%'
        let end = self.line_token_end();
        self.cursor.advance(end - self.cursor.pos());
        self.token(RawTag::EscapeLine, start)
    }

    // ─── NAGs ────────────────────────────────────────────────────────

    fn nag(&mut self, start: u32) -> RawToken {
        self.cursor.advance(1); // '$'
        while self.cursor.current().is_ascii_digit() {
            self.cursor.advance(1);
        }
        self.token(RawTag::Nag, start)
    }

    // ─── Illegal characters ──────────────────────────────────────────

    fn illegal(&mut self, start: u32, c: char) -> RawToken {
        self.cursor.advance(c.len_utf8() as u32);
        self.token(RawTag::IllegalChar, start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Scan a source string and collect all tokens (excluding Eof).
    fn scan(source: &str) -> Vec<RawToken> {
        let mut scanner = RawScanner::new(source);
        let mut tokens = Vec::new();
        loop {
            let tok = scanner.next_token();
            if tok.tag == RawTag::Eof {
                break;
            }
            tokens.push(tok);
        }
        tokens
    }

    /// Scan and return tags only.
    fn scan_tags(source: &str) -> Vec<RawTag> {
        scan(source).iter().map(|t| t.tag).collect()
    }

    fn assert_tiles(source: &str) {
        let total: u32 = scan(source).iter().map(|t| t.len).sum();
        assert_eq!(total as usize, source.len(), "token lengths must tile {source:?}");
    }

    #[test]
    fn empty_input_is_eof_only() {
        let mut scanner = RawScanner::new("");
        let tok = scanner.next_token();
        assert_eq!(tok.tag, RawTag::Eof);
        assert_eq!(tok.len, 0);
        // Eof repeats.
        assert_eq!(scanner.next_token().tag, RawTag::Eof);
    }

    #[test]
    fn whitespace_runs_are_maximal() {
        let tokens = scan(" \t\r\n  x");
        assert_eq!(tokens[0].tag, RawTag::Whitespace);
        assert_eq!(tokens[0].len, 6);
    }

    #[test]
    fn nbsp_joins_whitespace_runs() {
        let tokens = scan(" \u{A0} ");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].tag, RawTag::Whitespace);
        assert_eq!(tokens[0].len, 4); // U+00A0 is two bytes in UTF-8
    }

    #[test]
    fn tag_pair_tokens() {
        assert_eq!(
            scan_tags("[Event \"X\"]"),
            vec![
                RawTag::BracketOpen,
                RawTag::TagName,
                RawTag::Whitespace,
                RawTag::TagValue,
                RawTag::BracketClose,
            ]
        );
    }

    #[test]
    fn move_text_tokens() {
        assert_eq!(
            scan_tags("1. e4 e5 *"),
            vec![
                RawTag::MoveNumber,
                RawTag::Period,
                RawTag::Whitespace,
                RawTag::Move {
                    is_valid_tag_name: true
                },
                RawTag::Whitespace,
                RawTag::Move {
                    is_valid_tag_name: true
                },
                RawTag::Whitespace,
                RawTag::Asterisk,
            ]
        );
    }

    #[test]
    fn castling_and_results() {
        assert_eq!(
            scan_tags("O-O O-O-O 1-0 0-1 1/2-1/2"),
            vec![
                RawTag::Move {
                    is_valid_tag_name: false
                },
                RawTag::Whitespace,
                RawTag::Move {
                    is_valid_tag_name: false
                },
                RawTag::Whitespace,
                RawTag::WhiteWins,
                RawTag::Whitespace,
                RawTag::BlackWins,
                RawTag::Whitespace,
                RawTag::Draw,
            ]
        );
    }

    #[test]
    fn string_skips_escaped_quotes() {
        let tokens = scan(r#""a\"b" x"#);
        assert_eq!(tokens[0].tag, RawTag::TagValue);
        assert_eq!(tokens[0].len, 6);
    }

    #[test]
    fn string_with_trailing_backslash_at_eof() {
        let tokens = scan("\"abc\\");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].tag, RawTag::UnterminatedTagValue);
        assert_eq!(tokens[0].len, 5);
    }

    #[test]
    fn unterminated_string_runs_to_eof() {
        let tokens = scan("\"no close");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].tag, RawTag::UnterminatedTagValue);
        assert_eq!(tokens[0].len, 9);
    }

    #[test]
    fn eol_comment_excludes_terminator() {
        let tokens = scan("; note\nx");
        assert_eq!(tokens[0].tag, RawTag::EolComment);
        assert_eq!(tokens[0].len, 6);
        assert_eq!(tokens[1].tag, RawTag::Whitespace);
    }

    #[test]
    fn eol_comment_excludes_carriage_return_before_newline() {
        let tokens = scan("; note\r\nx");
        assert_eq!(tokens[0].tag, RawTag::EolComment);
        assert_eq!(tokens[0].len, 6);
        assert_eq!(tokens[1].len, 2); // \r\n
    }

    #[test]
    fn eol_comment_at_eof_is_still_a_comment() {
        let tokens = scan("; trailing");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].tag, RawTag::EolComment);
        assert_eq!(tokens[0].len, 10);
    }

    #[test]
    fn brace_comment_includes_close() {
        let tokens = scan("{ note } x");
        assert_eq!(tokens[0].tag, RawTag::BraceComment);
        assert_eq!(tokens[0].len, 8);
    }

    #[test]
    fn brace_comment_may_span_lines() {
        let tokens = scan("{ a\nb }");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].tag, RawTag::BraceComment);
    }

    #[test]
    fn unterminated_brace_comment() {
        let tokens = scan("{ unterminated");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].tag, RawTag::UnterminatedBraceComment);
        assert_eq!(tokens[0].len, 14);
    }

    #[test]
    fn escape_line_at_start_of_input() {
        let tokens = scan("% import x\nrest");
        assert_eq!(tokens[0].tag, RawTag::EscapeLine);
        assert_eq!(tokens[0].len, 10);
    }

    #[test]
    fn escape_line_after_newline() {
        let tags = scan_tags("x\n% esc\ny");
        assert_eq!(
            tags,
            vec![
                RawTag::TagName, // bare 'x' is a capture-led name
                RawTag::Whitespace,
                RawTag::EscapeLine,
                RawTag::Whitespace,
                RawTag::TagName,
            ]
        );
    }

    #[test]
    fn escape_line_excludes_crlf() {
        let tokens = scan("% esc\r\nx");
        assert_eq!(tokens[0].tag, RawTag::EscapeLine);
        assert_eq!(tokens[0].len, 5);
    }

    #[test]
    fn percent_mid_line_is_illegal() {
        let tags = scan_tags("a %");
        assert_eq!(
            tags,
            vec![RawTag::TagName, RawTag::Whitespace, RawTag::IllegalChar]
        );
    }

    #[test]
    fn percent_after_carriage_return_only_is_illegal() {
        // A lone \r does not start a new line.
        let tokens = scan("x\r%");
        assert_eq!(tokens[2].tag, RawTag::IllegalChar);
    }

    #[test]
    fn nag_tokens() {
        let tokens = scan("$ $0 $7 $999");
        let tags: Vec<RawTag> = tokens.iter().map(|t| t.tag).collect();
        assert_eq!(
            tags,
            vec![
                RawTag::Nag,
                RawTag::Whitespace,
                RawTag::Nag,
                RawTag::Whitespace,
                RawTag::Nag,
                RawTag::Whitespace,
                RawTag::Nag,
            ]
        );
        assert_eq!(tokens[0].len, 1); // bare '$'
        assert_eq!(tokens[6].len, 4); // $999
    }

    #[test]
    fn illegal_characters_are_one_token_each() {
        let tokens = scan("~~");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].tag, RawTag::IllegalChar);
        assert_eq!(tokens[0].len, 1);
    }

    #[test]
    fn astral_illegal_character_is_four_bytes() {
        let tokens = scan("\u{1F600}");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].tag, RawTag::IllegalChar);
        assert_eq!(tokens[0].len, 4);
    }

    #[test]
    fn stray_close_brace_is_illegal() {
        let tokens = scan("}");
        assert_eq!(tokens[0].tag, RawTag::IllegalChar);
    }

    #[test]
    fn unrecognized_symbol_run() {
        let tokens = scan("e4$"); // '$' breaks the run: e4 then a NAG
        assert_eq!(tokens.len(), 2);
        let tokens = scan("O-O-O-O");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].tag, RawTag::Unrecognized);
    }

    #[test]
    fn token_lengths_tile_the_source() {
        for source in [
            "",
            "[Event \"X\"]\n1. e4 e5 *\n",
            "{ unterminated",
            "1. e4 (1... e5 1-0",
            "$ $0 $7 $999",
            "[ \"only a value\" ]",
            "%esc\n; comment\n\u{A0}é€\u{1F600}",
            "\"\\\"\\\\\" \"\\n\"",
        ] {
            assert_tiles(source);
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn tokens_always_tile(source in "(?s).{0,200}") {
                assert_tiles(&source);
            }

            #[test]
            fn non_eof_tokens_are_nonempty(source in "(?s).{0,200}") {
                for tok in scan(&source) {
                    prop_assert!(tok.len > 0, "zero-length {:?}", tok.tag);
                }
            }

            #[test]
            fn scanning_is_deterministic(source in "(?s).{0,100}") {
                prop_assert_eq!(scan(&source), scan(&source));
            }
        }
    }
}
