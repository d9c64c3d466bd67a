//! Per-parse interning of small green terminals.
//!
//! Green nodes are position-free, so every `(` in a file can share one
//! terminal. The cache pre-builds the single-byte punctuation terminals,
//! the fixed-length game-result markers, short whitespace runs, and the
//! empty trivia node. It is owned by one parse — nothing global.

use std::sync::Arc;

use crate::green::{GreenNode, GreenToken, Payload};
use crate::kind::{NodeKind, TokenKind};

/// Longest whitespace run served from the cache, in bytes.
const WHITESPACE_CACHE_LEN: u32 = 8;

/// Interned singletons for payload-free terminals.
#[derive(Debug)]
pub struct TokenCache {
    whitespace: Vec<Arc<GreenToken>>,
    bracket_open: Arc<GreenToken>,
    bracket_close: Arc<GreenToken>,
    paren_open: Arc<GreenToken>,
    paren_close: Arc<GreenToken>,
    orphan_paren_close: Arc<GreenToken>,
    period: Arc<GreenToken>,
    asterisk: Arc<GreenToken>,
    empty_nag: Arc<GreenToken>,
    white_win: Arc<GreenToken>,
    black_win: Arc<GreenToken>,
    draw: Arc<GreenToken>,
    empty_trivia: Arc<GreenNode>,
}

fn single(kind: TokenKind, len: u32) -> Arc<GreenToken> {
    Arc::new(GreenToken::new(kind, len, Payload::None))
}

impl TokenCache {
    /// Build the cache. A few dozen small allocations, once per parse.
    #[must_use]
    pub fn new() -> Self {
        TokenCache {
            whitespace: (1..=WHITESPACE_CACHE_LEN)
                .map(|len| single(TokenKind::Whitespace, len))
                .collect(),
            bracket_open: single(TokenKind::BracketOpen, 1),
            bracket_close: single(TokenKind::BracketClose, 1),
            paren_open: single(TokenKind::ParenthesisOpen, 1),
            paren_close: single(TokenKind::ParenthesisClose, 1),
            orphan_paren_close: single(TokenKind::OrphanParenthesisClose, 1),
            period: single(TokenKind::Period, 1),
            asterisk: single(TokenKind::Asterisk, 1),
            empty_nag: single(TokenKind::EmptyNag, 1),
            white_win: single(TokenKind::WhiteWinMarker, 3),
            black_win: single(TokenKind::BlackWinMarker, 3),
            draw: single(TokenKind::DrawMarker, 7),
            empty_trivia: Arc::new(GreenNode::new(NodeKind::Trivia, Vec::new())),
        }
    }

    /// A payload-free terminal, interned where possible.
    ///
    /// Must not be used for kinds that carry payloads (`Move`, `Nag`,
    /// tag values, quotable literals).
    #[must_use]
    pub fn token(&self, kind: TokenKind, len: u32) -> Arc<GreenToken> {
        match kind {
            TokenKind::Whitespace if len <= WHITESPACE_CACHE_LEN => {
                Arc::clone(&self.whitespace[len as usize - 1])
            }
            TokenKind::BracketOpen => Arc::clone(&self.bracket_open),
            TokenKind::BracketClose => Arc::clone(&self.bracket_close),
            TokenKind::ParenthesisOpen => Arc::clone(&self.paren_open),
            TokenKind::ParenthesisClose => Arc::clone(&self.paren_close),
            TokenKind::OrphanParenthesisClose => Arc::clone(&self.orphan_paren_close),
            TokenKind::Period => Arc::clone(&self.period),
            TokenKind::Asterisk => Arc::clone(&self.asterisk),
            TokenKind::EmptyNag => Arc::clone(&self.empty_nag),
            TokenKind::WhiteWinMarker => Arc::clone(&self.white_win),
            TokenKind::BlackWinMarker => Arc::clone(&self.black_win),
            TokenKind::DrawMarker => Arc::clone(&self.draw),
            _ => {
                debug_assert!(
                    !matches!(
                        kind,
                        TokenKind::Move
                            | TokenKind::Nag
                            | TokenKind::TagValue
                            | TokenKind::ErrorTagValue
                            | TokenKind::UnrecognizedMove
                            | TokenKind::OverflowNag
                    ),
                    "{kind:?} carries a payload"
                );
                single(kind, len)
            }
        }
    }

    /// The shared empty trivia node.
    #[must_use]
    pub fn empty_trivia(&self) -> Arc<GreenNode> {
        Arc::clone(&self.empty_trivia)
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        TokenCache::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn punctuation_is_interned() {
        let cache = TokenCache::new();
        let a = cache.token(TokenKind::Period, 1);
        let b = cache.token(TokenKind::Period, 1);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn short_whitespace_is_interned() {
        let cache = TokenCache::new();
        let a = cache.token(TokenKind::Whitespace, 3);
        let b = cache.token(TokenKind::Whitespace, 3);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn long_whitespace_is_fresh() {
        let cache = TokenCache::new();
        let a = cache.token(TokenKind::Whitespace, 40);
        let b = cache.token(TokenKind::Whitespace, 40);
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a, b);
    }

    #[test]
    fn result_markers_have_fixed_lengths() {
        let cache = TokenCache::new();
        assert_eq!(cache.token(TokenKind::WhiteWinMarker, 3).len(), 3);
        assert_eq!(cache.token(TokenKind::BlackWinMarker, 3).len(), 3);
        assert_eq!(cache.token(TokenKind::DrawMarker, 7).len(), 7);
    }

    #[test]
    fn empty_trivia_is_shared() {
        let cache = TokenCache::new();
        assert!(Arc::ptr_eq(&cache.empty_trivia(), &cache.empty_trivia()));
        assert!(cache.empty_trivia().is_empty());
    }
}
