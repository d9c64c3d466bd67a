//! Token and node kinds.
//!
//! [`TokenKind`] is the closed set of terminal kinds. The first five are
//! background/trivia material; everything else is foreground and drives
//! the parser. [`NodeKind`] names the composite green nodes terminals
//! aggregate into.

/// Terminal kind.
///
/// # Representation
///
/// `#[repr(u8)]`, one byte. Background kinds come first, then the two
/// comment kinds, then foreground; the predicate helpers lean on that
/// grouping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenKind {
    // === Background ===
    /// Whitespace run.
    Whitespace,
    /// `%` escape line.
    Escape,
    /// One character no class claims.
    IllegalCharacter,

    // === Comments (close a trivia element) ===
    /// `;` or `{ }` comment.
    Comment,
    /// `{` comment that never closed.
    UnterminatedComment,

    // === Foreground ===
    /// `[`
    BracketOpen,
    /// `]`
    BracketClose,
    /// Tag name symbol.
    TagName,
    /// String literal with a cleanly decoded value.
    TagValue,
    /// String literal that contained lexical errors.
    ErrorTagValue,
    /// Digit run.
    MoveNumber,
    /// `.`
    Period,
    /// Recognized move (including castling).
    Move,
    /// Symbol in move position with no recognized shape.
    UnrecognizedMove,
    /// `$n` with `n` in 0..=255.
    Nag,
    /// `$` with no digits.
    EmptyNag,
    /// `$n` with `n` above 255.
    OverflowNag,
    /// `(`
    ParenthesisOpen,
    /// `)`
    ParenthesisClose,
    /// `)` with no open variation.
    OrphanParenthesisClose,
    /// `*`
    Asterisk,
    /// `1/2-1/2`
    DrawMarker,
    /// `1-0`
    WhiteWinMarker,
    /// `0-1`
    BlackWinMarker,
}

impl TokenKind {
    /// Background material: whitespace, escape lines, illegal characters.
    #[inline]
    #[must_use]
    pub fn is_background(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::Escape | TokenKind::IllegalCharacter
        )
    }

    /// Comment kinds. A comment closes the current trivia element.
    #[inline]
    #[must_use]
    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::Comment | TokenKind::UnterminatedComment)
    }

    /// Foreground kinds drive the parser; background and comments never
    /// switch parser modes.
    #[inline]
    #[must_use]
    pub fn is_foreground(self) -> bool {
        !self.is_background() && !self.is_comment()
    }

    /// The NAG super-type.
    #[inline]
    #[must_use]
    pub fn is_nag(self) -> bool {
        matches!(
            self,
            TokenKind::Nag | TokenKind::EmptyNag | TokenKind::OverflowNag
        )
    }

    /// Game-termination markers.
    #[inline]
    #[must_use]
    pub fn is_game_result(self) -> bool {
        matches!(
            self,
            TokenKind::Asterisk
                | TokenKind::DrawMarker
                | TokenKind::WhiteWinMarker
                | TokenKind::BlackWinMarker
        )
    }
}

/// Composite node kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NodeKind {
    /// Background run closed by one comment.
    TriviaElement,
    /// Leading-trivia block: trivia elements plus a background tail.
    Trivia,
    /// A trivia block paired with one foreground terminal.
    WithTrivia,
    /// Leading float items paired with one ply element.
    WithFloats,
    /// Half-move: optional move number, optional move, NAGs, variations.
    Ply,
    /// Plies plus trailing float items.
    PlyList,
    /// Parenthesized side line.
    Variation,
    /// `[ TagName TagValue ]`, possibly malformed; never empty.
    TagPair,
    /// Ordered tag pairs.
    TagSection,
    /// Tag section, ply list, optional result.
    Game,
    /// Root: games plus trailing trivia.
    GameList,
}

const _: () = assert!(std::mem::size_of::<TokenKind>() == 1);
const _: () = assert!(std::mem::size_of::<NodeKind>() == 1);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_and_comment_partition_trivia() {
        for kind in [
            TokenKind::Whitespace,
            TokenKind::Escape,
            TokenKind::IllegalCharacter,
        ] {
            assert!(kind.is_background(), "{kind:?}");
            assert!(!kind.is_foreground(), "{kind:?}");
        }
        for kind in [TokenKind::Comment, TokenKind::UnterminatedComment] {
            assert!(kind.is_comment(), "{kind:?}");
            assert!(!kind.is_background(), "{kind:?}");
            assert!(!kind.is_foreground(), "{kind:?}");
        }
    }

    #[test]
    fn foreground_kinds() {
        for kind in [
            TokenKind::BracketOpen,
            TokenKind::TagName,
            TokenKind::ErrorTagValue,
            TokenKind::MoveNumber,
            TokenKind::Move,
            TokenKind::OrphanParenthesisClose,
            TokenKind::Asterisk,
        ] {
            assert!(kind.is_foreground(), "{kind:?}");
        }
    }

    #[test]
    fn nag_super_type() {
        assert!(TokenKind::Nag.is_nag());
        assert!(TokenKind::EmptyNag.is_nag());
        assert!(TokenKind::OverflowNag.is_nag());
        assert!(!TokenKind::Move.is_nag());
    }

    #[test]
    fn game_results() {
        assert!(TokenKind::Asterisk.is_game_result());
        assert!(TokenKind::DrawMarker.is_game_result());
        assert!(TokenKind::WhiteWinMarker.is_game_result());
        assert!(TokenKind::BlackWinMarker.is_game_result());
        assert!(!TokenKind::MoveNumber.is_game_result());
    }
}
