//! Token cooking: raw tags to green terminals.
//!
//! The raw scanner only finds boundaries; this layer attaches payloads
//! and reports the lexical diagnostics:
//!
//! - tag values are unescaped into a reused buffer (`\"` and `\\` only;
//!   anything else is flagged and kept verbatim),
//! - NAGs are parsed and range-checked,
//! - illegal characters get a quotable display form,
//! - unterminated comments and strings get their warnings/errors.
//!
//! Every raw token maps to exactly one green terminal of the same
//! length, so cooking never disturbs the round-trip invariant.

use std::sync::Arc;

use pgn_diagnostic::{Diagnostic, ErrorCode, Span};
use pgn_lexer_core::{RawTag, RawToken};
use pgn_syntax::{GreenToken, Payload, TokenCache, TokenKind};

/// Largest NAG value.
const NAG_MAX: u32 = 255;

/// Cooks raw tokens into green terminals, pushing lexical diagnostics
/// into the parse-wide sink. Owns the reused string-decode buffer.
#[derive(Debug, Default)]
pub(crate) struct TokenCooker {
    buf: String,
}

impl TokenCooker {
    /// Cook one raw token.
    ///
    /// `offset` is the token's absolute byte offset and `lexeme` its
    /// source text.
    pub(crate) fn cook(
        &mut self,
        raw: RawToken,
        offset: u32,
        lexeme: &str,
        cache: &TokenCache,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Arc<GreenToken> {
        let span = Span::new(offset, offset + raw.len);
        match raw.tag {
            RawTag::Whitespace => cache.token(TokenKind::Whitespace, raw.len),
            RawTag::EscapeLine => cache.token(TokenKind::Escape, raw.len),
            RawTag::IllegalChar => {
                let form = lexeme.chars().next().map_or_else(String::new, display_form);
                diagnostics.push(Diagnostic::new(ErrorCode::IllegalCharacter, span).with_parameter(form));
                cache.token(TokenKind::IllegalCharacter, raw.len)
            }
            RawTag::EolComment | RawTag::BraceComment => cache.token(TokenKind::Comment, raw.len),
            RawTag::UnterminatedBraceComment => {
                diagnostics.push(Diagnostic::new(ErrorCode::UnterminatedMultiLineComment, span));
                cache.token(TokenKind::UnterminatedComment, raw.len)
            }
            RawTag::TagValue => self.tag_value(offset, lexeme, true, diagnostics),
            RawTag::UnterminatedTagValue => {
                diagnostics.push(Diagnostic::new(ErrorCode::UnterminatedTagValue, span));
                self.tag_value(offset, lexeme, false, diagnostics)
            }
            RawTag::Nag => self.nag(span, lexeme, cache, diagnostics),
            RawTag::BracketOpen => cache.token(TokenKind::BracketOpen, raw.len),
            RawTag::BracketClose => cache.token(TokenKind::BracketClose, raw.len),
            RawTag::ParenOpen => cache.token(TokenKind::ParenthesisOpen, raw.len),
            RawTag::ParenClose => cache.token(TokenKind::ParenthesisClose, raw.len),
            RawTag::Period => cache.token(TokenKind::Period, raw.len),
            RawTag::Asterisk => cache.token(TokenKind::Asterisk, raw.len),
            RawTag::MoveNumber => cache.token(TokenKind::MoveNumber, raw.len),
            RawTag::Move { is_valid_tag_name } => Arc::new(GreenToken::new(
                TokenKind::Move,
                raw.len,
                Payload::Move { is_valid_tag_name },
            )),
            RawTag::TagName => cache.token(TokenKind::TagName, raw.len),
            RawTag::WhiteWins => cache.token(TokenKind::WhiteWinMarker, raw.len),
            RawTag::BlackWins => cache.token(TokenKind::BlackWinMarker, raw.len),
            RawTag::Draw => cache.token(TokenKind::DrawMarker, raw.len),
            RawTag::Unrecognized => Arc::new(GreenToken::new(
                TokenKind::UnrecognizedMove,
                raw.len,
                Payload::Literal(Arc::from(lexeme)),
            )),
            RawTag::Eof => unreachable!("Eof is never cooked"),
        }
    }

    /// Decode a string literal. `lexeme` includes the opening quote and,
    /// when `terminated`, the closing quote.
    fn tag_value(
        &mut self,
        offset: u32,
        lexeme: &str,
        terminated: bool,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Arc<GreenToken> {
        let len = lexeme.len() as u32;
        let inner_end = if terminated {
            lexeme.len() - 1
        } else {
            lexeme.len()
        };
        let inner = &lexeme[1..inner_end];

        self.buf.clear();
        let mut clean = terminated;
        let mut chars = inner.char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some((_, escaped @ ('"' | '\\'))) => self.buf.push(escaped),
                    Some((j, escaped)) => {
                        // The escaped character stands for itself; only
                        // the backslash was wrong.
                        let escape_span = Span::new(
                            offset + 1 + i as u32,
                            offset + 1 + j as u32 + escaped.len_utf8() as u32,
                        );
                        diagnostics.push(
                            Diagnostic::new(ErrorCode::UnrecognizedEscapeSequence, escape_span)
                                .with_parameter(format!("\\{escaped}")),
                        );
                        self.buf.push(escaped);
                        clean = false;
                    }
                    // Trailing backslash: the string is unterminated and
                    // already reported as such.
                    None => clean = false,
                },
                c if c.is_control() => {
                    let char_span = Span::new(
                        offset + 1 + i as u32,
                        offset + 1 + i as u32 + c.len_utf8() as u32,
                    );
                    diagnostics.push(Diagnostic::new(
                        ErrorCode::IllegalControlCharacterInTagValue,
                        char_span,
                    ));
                    self.buf.push(c);
                    clean = false;
                }
                c => self.buf.push(c),
            }
        }

        let kind = if clean {
            TokenKind::TagValue
        } else {
            TokenKind::ErrorTagValue
        };
        Arc::new(GreenToken::new(
            kind,
            len,
            Payload::Value(Arc::from(self.buf.as_str())),
        ))
    }

    /// Classify a `$…` token into empty / in-range / overflowing.
    fn nag(
        &self,
        span: Span,
        lexeme: &str,
        cache: &TokenCache,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Arc<GreenToken> {
        let digits = &lexeme[1..];
        if digits.is_empty() {
            diagnostics.push(Diagnostic::new(ErrorCode::EmptyNag, span));
            return cache.token(TokenKind::EmptyNag, 1);
        }
        let mut value: u32 = 0;
        for b in digits.bytes() {
            value = value
                .saturating_mul(10)
                .saturating_add(u32::from(b - b'0'));
        }
        if value > NAG_MAX {
            diagnostics.push(
                Diagnostic::new(ErrorCode::OverflowNag, span).with_parameter(lexeme),
            );
            Arc::new(GreenToken::new(
                TokenKind::OverflowNag,
                span.len(),
                Payload::Literal(Arc::from(lexeme)),
            ))
        } else {
            Arc::new(GreenToken::new(
                TokenKind::Nag,
                span.len(),
                Payload::Nag(value as u8),
            ))
        }
    }
}

/// Quotable display form of an illegal character: `\\` and `\"` for
/// those two, `\uXXXX` for control characters, the character itself
/// otherwise.
fn display_form(c: char) -> String {
    match c {
        '\\' => "\\\\".to_owned(),
        '"' => "\\\"".to_owned(),
        c if c.is_control() => format!("\\u{:04x}", c as u32),
        c => c.to_string(),
    }
}
