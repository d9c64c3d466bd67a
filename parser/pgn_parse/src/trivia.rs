//! Trivia assembly.
//!
//! Background terminals (whitespace, escape lines, illegal characters)
//! accumulate until a comment closes them into a trivia element, or a
//! foreground terminal drains everything into the leading-trivia block
//! of its with-trivia wrapper.

use std::sync::Arc;

use pgn_syntax::{GreenElement, GreenNode, GreenToken, NodeKind, TokenCache};

/// Accumulates background runs and comment-closed trivia elements.
#[derive(Debug, Default)]
pub(crate) struct TriviaBuilder {
    /// Background terminals since the last comment or foreground.
    background: Vec<GreenElement>,
    /// Finished `TriviaElement` nodes since the last foreground.
    elements: Vec<GreenElement>,
}

impl TriviaBuilder {
    /// Append a background terminal.
    pub(crate) fn push_background(&mut self, token: Arc<GreenToken>) {
        self.background.push(token.into());
    }

    /// Close the pending background run with a comment, forming one
    /// trivia element.
    pub(crate) fn push_comment(&mut self, token: Arc<GreenToken>) {
        let mut children = std::mem::take(&mut self.background);
        children.push(token.into());
        self.elements
            .push(Arc::new(GreenNode::new(NodeKind::TriviaElement, children)).into());
    }

    /// Drain everything into a trivia block: the comment-closed elements
    /// plus the trailing background run. Empty accumulation yields the
    /// shared empty trivia node.
    pub(crate) fn take(&mut self, cache: &TokenCache) -> Arc<GreenNode> {
        if self.elements.is_empty() && self.background.is_empty() {
            return cache.empty_trivia();
        }
        let mut children = std::mem::take(&mut self.elements);
        children.append(&mut self.background);
        Arc::new(GreenNode::new(NodeKind::Trivia, children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgn_syntax::{Payload, TokenKind};
    use pretty_assertions::assert_eq;

    fn token(kind: TokenKind, len: u32) -> Arc<GreenToken> {
        Arc::new(GreenToken::new(kind, len, Payload::None))
    }

    #[test]
    fn empty_accumulation_is_the_shared_singleton() {
        let cache = TokenCache::new();
        let mut builder = TriviaBuilder::default();
        let a = builder.take(&cache);
        let b = builder.take(&cache);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.is_empty());
    }

    #[test]
    fn background_tail_without_comment() {
        let cache = TokenCache::new();
        let mut builder = TriviaBuilder::default();
        builder.push_background(token(TokenKind::Whitespace, 2));
        builder.push_background(token(TokenKind::IllegalCharacter, 1));
        let trivia = builder.take(&cache);
        assert_eq!(trivia.kind(), NodeKind::Trivia);
        assert_eq!(trivia.child_count(), 2);
        assert_eq!(trivia.len(), 3);
    }

    #[test]
    fn comment_closes_an_element() {
        let cache = TokenCache::new();
        let mut builder = TriviaBuilder::default();
        builder.push_background(token(TokenKind::Whitespace, 1));
        builder.push_comment(token(TokenKind::Comment, 5));
        builder.push_background(token(TokenKind::Whitespace, 2));
        let trivia = builder.take(&cache);
        // One TriviaElement (ws + comment) plus the background tail.
        assert_eq!(trivia.child_count(), 2);
        assert_eq!(trivia.len(), 8);
        let element = trivia.child(0).as_node().map(|n| n.kind());
        assert_eq!(element, Some(NodeKind::TriviaElement));
    }

    #[test]
    fn take_resets_the_builder() {
        let cache = TokenCache::new();
        let mut builder = TriviaBuilder::default();
        builder.push_comment(token(TokenKind::Comment, 4));
        let first = builder.take(&cache);
        assert_eq!(first.len(), 4);
        let second = builder.take(&cache);
        assert!(second.is_empty());
    }
}
