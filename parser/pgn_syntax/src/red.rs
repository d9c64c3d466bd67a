//! Lazy, parent-linked red overlay.
//!
//! Green nodes know only lengths. A [`SyntaxNode`] pairs a green element
//! with its absolute start offset, computed when the node is
//! materialized — never stored in the green tree. Children materialize
//! at most once per slot through a `OnceLock` (first writer wins,
//! every later reader observes the same node), so the overlay supports
//! concurrent readers without locks.
//!
//! Ownership points strictly downward: a red node owns its realized
//! children and holds only a `Weak` back-reference to its parent. The
//! caller's root handle is the sole owner of the overlay; dropping it
//! frees every materialized node not otherwise referenced.

use std::sync::{Arc, OnceLock, Weak};

use pgn_diagnostic::Span;

use crate::green::{GreenElement, GreenNode, GreenToken};
use crate::kind::{NodeKind, TokenKind};

struct NodeData {
    green: GreenElement,
    offset: u32,
    parent: Option<Weak<NodeData>>,
    slots: Box<[OnceLock<Arc<NodeData>>]>,
}

fn slots_for(element: &GreenElement) -> Box<[OnceLock<Arc<NodeData>>]> {
    let count = match element {
        GreenElement::Node(node) => node.child_count(),
        GreenElement::Token(_) => 0,
    };
    (0..count).map(|_| OnceLock::new()).collect()
}

/// Red node handle. Cheap to clone; all clones share the same slot.
#[derive(Clone)]
pub struct SyntaxNode {
    data: Arc<NodeData>,
}

impl SyntaxNode {
    /// Materialize the root of an overlay at offset 0.
    ///
    /// Every call builds an independent overlay over the shared green
    /// tree; offsets computed through any of them agree.
    #[must_use]
    pub fn new_root(green: Arc<GreenNode>) -> Self {
        let green = GreenElement::Node(green);
        let slots = slots_for(&green);
        SyntaxNode {
            data: Arc::new(NodeData {
                green,
                offset: 0,
                parent: None,
                slots,
            }),
        }
    }

    /// The underlying green element.
    #[must_use]
    pub fn green(&self) -> &GreenElement {
        &self.data.green
    }

    /// `true` when this red node wraps a terminal.
    #[must_use]
    pub fn is_token(&self) -> bool {
        matches!(self.data.green, GreenElement::Token(_))
    }

    /// The terminal, when this is a token node.
    #[must_use]
    pub fn token(&self) -> Option<&Arc<GreenToken>> {
        self.data.green.as_token()
    }

    /// Composite kind, when this is a composite.
    #[must_use]
    pub fn node_kind(&self) -> Option<NodeKind> {
        self.data.green.as_node().map(|node| node.kind())
    }

    /// Terminal kind, when this is a token.
    #[must_use]
    pub fn token_kind(&self) -> Option<TokenKind> {
        self.data.green.as_token().map(|token| token.kind())
    }

    /// Absolute start offset in bytes.
    #[must_use]
    pub fn start(&self) -> u32 {
        self.data.offset
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> u32 {
        self.data.green.len()
    }

    /// `true` for zero-length composites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Covered byte range.
    #[must_use]
    pub fn span(&self) -> Span {
        Span::new(self.start(), self.start() + self.len())
    }

    /// Parent node. `None` for the root, and for orphans whose overlay
    /// above was dropped.
    #[must_use]
    pub fn parent(&self) -> Option<SyntaxNode> {
        let weak = self.data.parent.as_ref()?;
        weak.upgrade().map(|data| SyntaxNode { data })
    }

    /// Number of children. Zero for tokens.
    #[must_use]
    pub fn child_count(&self) -> usize {
        match &self.data.green {
            GreenElement::Node(node) => node.child_count(),
            GreenElement::Token(_) => 0,
        }
    }

    /// Absolute start offset of the child at `index`, without
    /// materializing it.
    ///
    /// # Panics
    ///
    /// Panics if this is a token or `index` is out of bounds.
    #[must_use]
    pub fn child_start(&self, index: usize) -> u32 {
        let GreenElement::Node(green) = &self.data.green else {
            panic!("child_start() on a terminal");
        };
        self.data.offset + green.child_offset(index)
    }

    /// Materialize the child at `index` (at most once per slot).
    ///
    /// # Panics
    ///
    /// Panics if this is a token or `index` is out of bounds.
    #[must_use]
    pub fn child(&self, index: usize) -> SyntaxNode {
        let GreenElement::Node(green) = &self.data.green else {
            panic!("child() on a terminal");
        };
        let data = self.data.slots[index].get_or_init(|| {
            let element = green.child(index).clone();
            let slots = slots_for(&element);
            Arc::new(NodeData {
                offset: self.data.offset + green.child_offset(index),
                green: element,
                parent: Some(Arc::downgrade(&self.data)),
                slots,
            })
        });
        SyntaxNode {
            data: Arc::clone(data),
        }
    }

    /// The child containing the absolute offset, if any. Binary search
    /// over [`child_start`](Self::child_start); zero-length children
    /// never contain an offset.
    #[must_use]
    pub fn find_child_at(&self, offset: u32) -> Option<SyntaxNode> {
        let green = self.data.green.as_node()?;
        let rel = offset.checked_sub(self.data.offset)?;
        let index = green.child_index_at(rel)?;
        Some(self.child(index))
    }

    /// Iterate materialized children in order.
    pub fn children(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        (0..self.child_count()).map(|index| self.child(index))
    }

    /// Lazily enumerate the terminals overlapping `[start, start + len)`,
    /// in tree order. Only subtrees overlapping the range are descended
    /// or materialized.
    #[must_use]
    pub fn tokens_in_range(&self, start: u32, len: u32) -> TokensInRange {
        TokensInRange {
            range_start: start,
            range_end: start.saturating_add(len),
            stack: vec![(self.clone(), 0)],
        }
    }

    /// Every terminal under this node, in tree order.
    #[must_use]
    pub fn tokens(&self) -> TokensInRange {
        self.tokens_in_range(self.start(), self.len())
    }
}

impl std::fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.data.green {
            GreenElement::Node(node) => {
                write!(f, "{:?}@{:?}", node.kind(), self.span())
            }
            GreenElement::Token(token) => {
                write!(f, "{:?}@{:?}", token.kind(), self.span())
            }
        }
    }
}

/// Lazy terminal enumeration; see [`SyntaxNode::tokens_in_range`].
///
/// Descends with an explicit stack bounded by tree depth; siblings
/// outside the range are skipped by offset before materialization.
pub struct TokensInRange {
    range_start: u32,
    range_end: u32,
    stack: Vec<(SyntaxNode, usize)>,
}

impl Iterator for TokensInRange {
    type Item = SyntaxNode;

    fn next(&mut self) -> Option<SyntaxNode> {
        loop {
            let (node, cursor) = self.stack.last_mut()?;
            if node.is_token() {
                // Tokens reach the stack only as the initial node.
                let token = node.clone();
                self.stack.pop();
                let overlaps =
                    token.start() < self.range_end && token.start() + token.len() > self.range_start;
                if overlaps {
                    return Some(token);
                }
                continue;
            }
            let count = node.child_count();
            let mut found = None;
            while *cursor < count {
                let index = *cursor;
                *cursor += 1;
                let child_start = node.child_start(index);
                if child_start >= self.range_end {
                    // Children are ordered; nothing later overlaps.
                    *cursor = count;
                    break;
                }
                let child_len = match &node.data.green {
                    GreenElement::Node(green) => green.child(index).len(),
                    GreenElement::Token(_) => 0,
                };
                if child_start + child_len <= self.range_start {
                    continue;
                }
                found = Some(node.child(index));
                break;
            }
            match found {
                Some(child) => {
                    if child.is_token() {
                        return Some(child);
                    }
                    self.stack.push((child, 0));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::green::Payload;
    use pretty_assertions::assert_eq;

    fn token(kind: TokenKind, len: u32) -> GreenElement {
        Arc::new(GreenToken::new(kind, len, Payload::None)).into()
    }

    fn node(kind: NodeKind, children: Vec<GreenElement>) -> GreenElement {
        Arc::new(GreenNode::new(kind, children)).into()
    }

    /// `Trivia[ ws(2) Comment(4) ] MoveNumber(1) Period(1)` under a root.
    fn sample_root() -> SyntaxNode {
        let trivia = node(
            NodeKind::Trivia,
            vec![token(TokenKind::Whitespace, 2), token(TokenKind::Comment, 4)],
        );
        let root = Arc::new(GreenNode::new(
            NodeKind::GameList,
            vec![
                trivia,
                token(TokenKind::MoveNumber, 1),
                token(TokenKind::Period, 1),
            ],
        ));
        SyntaxNode::new_root(root)
    }

    #[test]
    fn root_starts_at_zero() {
        let root = sample_root();
        assert_eq!(root.start(), 0);
        assert_eq!(root.len(), 8);
        assert_eq!(root.span(), Span::new(0, 8));
        assert!(root.parent().is_none());
        assert!(!root.is_token());
    }

    #[test]
    fn child_offsets_chain_absolutely() {
        let root = sample_root();
        assert_eq!(root.child_start(0), 0);
        assert_eq!(root.child_start(1), 6);
        assert_eq!(root.child_start(2), 7);

        let trivia = root.child(0);
        assert_eq!(trivia.node_kind(), Some(NodeKind::Trivia));
        assert_eq!(trivia.child_start(1), 2);
        let comment = trivia.child(1);
        assert_eq!(comment.token_kind(), Some(TokenKind::Comment));
        assert_eq!(comment.span(), Span::new(2, 6));
    }

    #[test]
    fn children_materialize_once() {
        let root = sample_root();
        let a = root.child(0);
        let b = root.child(0);
        assert!(Arc::ptr_eq(&a.data, &b.data));
    }

    #[test]
    fn parent_links_point_back() {
        let root = sample_root();
        let trivia = root.child(0);
        let comment = trivia.child(1);
        let up = comment.parent().map(|p| p.node_kind());
        assert_eq!(up, Some(Some(NodeKind::Trivia)));
        let up2 = trivia.parent().map(|p| p.node_kind());
        assert_eq!(up2, Some(Some(NodeKind::GameList)));
    }

    #[test]
    fn find_child_at_binary_searches() {
        let root = sample_root();
        assert_eq!(root.find_child_at(0).map(|n| n.start()), Some(0));
        assert_eq!(
            root.find_child_at(5).and_then(|n| n.node_kind()),
            Some(NodeKind::Trivia)
        );
        assert_eq!(
            root.find_child_at(6).and_then(|n| n.token_kind()),
            Some(TokenKind::MoveNumber)
        );
        assert_eq!(
            root.find_child_at(7).and_then(|n| n.token_kind()),
            Some(TokenKind::Period)
        );
        assert!(root.find_child_at(8).is_none());
    }

    #[test]
    fn tokens_in_range_is_ordered_and_bounded() {
        let root = sample_root();
        let kinds: Vec<TokenKind> = root
            .tokens_in_range(0, 8)
            .filter_map(|t| t.token_kind())
            .collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Whitespace,
                TokenKind::Comment,
                TokenKind::MoveNumber,
                TokenKind::Period,
            ]
        );

        let kinds: Vec<TokenKind> = root
            .tokens_in_range(3, 4)
            .filter_map(|t| t.token_kind())
            .collect();
        assert_eq!(kinds, vec![TokenKind::Comment, TokenKind::MoveNumber]);

        assert_eq!(root.tokens_in_range(8, 4).count(), 0);
        assert_eq!(root.tokens_in_range(0, 0).count(), 0);
    }

    #[test]
    fn tokens_reconstruct_lengths() {
        let root = sample_root();
        let total: u32 = root.tokens().map(|t| t.len()).sum();
        assert_eq!(total, root.len());
    }

    #[test]
    fn lazy_and_eager_offsets_agree() {
        // Materialize one overlay eagerly, another lazily through a
        // range query; offsets must match.
        let eager = sample_root();
        let mut eager_offsets = Vec::new();
        for child in eager.children() {
            if child.is_token() {
                eager_offsets.push(child.start());
            } else {
                for grandchild in child.children() {
                    eager_offsets.push(grandchild.start());
                }
            }
        }

        let lazy = sample_root();
        let lazy_offsets: Vec<u32> = lazy.tokens().map(|t| t.start()).collect();
        assert_eq!(eager_offsets, lazy_offsets);
    }
}
