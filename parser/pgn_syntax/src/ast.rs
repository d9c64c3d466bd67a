//! Typed, read-only views over the red tree.
//!
//! Each view wraps a [`SyntaxNode`] of one [`NodeKind`]; `cast` returns
//! `None` on a kind mismatch. Views are as cheap as the handles they
//! wrap — materialization stays lazy underneath.

use crate::kind::{NodeKind, TokenKind};
use crate::red::SyntaxNode;

macro_rules! ast_view {
    ($(#[$doc:meta])* $name:ident, $kind:expr) => {
        $(#[$doc])*
        #[derive(Clone, Debug)]
        pub struct $name {
            syntax: SyntaxNode,
        }

        impl $name {
            /// Wrap a node of the matching kind.
            #[must_use]
            pub fn cast(syntax: SyntaxNode) -> Option<Self> {
                (syntax.node_kind() == Some($kind)).then_some($name { syntax })
            }

            /// The underlying red node.
            #[must_use]
            pub fn syntax(&self) -> &SyntaxNode {
                &self.syntax
            }
        }
    };
}

ast_view!(
    /// Root view: games plus trailing trivia.
    GameList,
    NodeKind::GameList
);
ast_view!(
    /// One game: tag section, ply list, optional result.
    Game,
    NodeKind::Game
);
ast_view!(
    /// Ordered tag pairs.
    TagSection,
    NodeKind::TagSection
);
ast_view!(
    /// `[ TagName TagValue ]`, possibly malformed; never empty.
    TagPair,
    NodeKind::TagPair
);
ast_view!(
    /// Plies plus trailing float items.
    PlyList,
    NodeKind::PlyList
);
ast_view!(
    /// Half-move and its attachments.
    Ply,
    NodeKind::Ply
);
ast_view!(
    /// Parenthesized side line.
    Variation,
    NodeKind::Variation
);
ast_view!(
    /// Leading float items plus one ply element.
    WithFloats,
    NodeKind::WithFloats
);
ast_view!(
    /// Leading trivia plus one foreground terminal.
    WithTrivia,
    NodeKind::WithTrivia
);

fn children(syntax: &SyntaxNode) -> impl Iterator<Item = SyntaxNode> + '_ {
    syntax.children()
}

impl GameList {
    /// Games in source order.
    pub fn games(&self) -> impl Iterator<Item = Game> + '_ {
        children(&self.syntax).filter_map(Game::cast)
    }

    /// The trailing trivia block (always the last child).
    #[must_use]
    pub fn trailing_trivia(&self) -> SyntaxNode {
        self.syntax.child(self.syntax.child_count() - 1)
    }
}

impl Game {
    /// The tag section (possibly empty).
    #[must_use]
    pub fn tag_section(&self) -> TagSection {
        children(&self.syntax)
            .find_map(TagSection::cast)
            .unwrap_or_else(|| unreachable!("games always carry a tag section"))
    }

    /// The ply list (possibly empty).
    #[must_use]
    pub fn ply_list(&self) -> PlyList {
        children(&self.syntax)
            .find_map(PlyList::cast)
            .unwrap_or_else(|| unreachable!("games always carry a ply list"))
    }

    /// The game-termination marker with its leading trivia, if present.
    #[must_use]
    pub fn result(&self) -> Option<WithTrivia> {
        children(&self.syntax).find_map(WithTrivia::cast)
    }
}

impl TagSection {
    /// Tag pairs in source order.
    pub fn pairs(&self) -> impl Iterator<Item = TagPair> + '_ {
        children(&self.syntax).filter_map(TagPair::cast)
    }

    /// `true` when the section holds no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.syntax.child_count() == 0
    }
}

impl TagPair {
    /// Every element of the pair, well-formed or not.
    pub fn elements(&self) -> impl Iterator<Item = WithTrivia> + '_ {
        children(&self.syntax).filter_map(WithTrivia::cast)
    }

    /// The tag-name terminal, if the pair has one.
    #[must_use]
    pub fn name_token(&self) -> Option<SyntaxNode> {
        self.elements()
            .find(|element| element.token_kind() == Some(TokenKind::TagName))
            .map(|element| element.token())
    }

    /// The tag-value terminal (clean or error), if the pair has one.
    #[must_use]
    pub fn value_token(&self) -> Option<SyntaxNode> {
        self.elements()
            .find(|element| {
                matches!(
                    element.token_kind(),
                    Some(TokenKind::TagValue | TokenKind::ErrorTagValue)
                )
            })
            .map(|element| element.token())
    }
}

impl PlyList {
    /// Plies in source order.
    pub fn plies(&self) -> impl Iterator<Item = Ply> + '_ {
        children(&self.syntax).filter_map(Ply::cast)
    }

    /// Float items not absorbed by any ply.
    pub fn trailing_floats(&self) -> impl Iterator<Item = WithTrivia> + '_ {
        children(&self.syntax).filter_map(WithTrivia::cast)
    }
}

impl Ply {
    fn elements(&self) -> impl Iterator<Item = WithFloats> + '_ {
        children(&self.syntax).filter_map(WithFloats::cast)
    }

    /// The move-number element, if present.
    #[must_use]
    pub fn move_number(&self) -> Option<WithFloats> {
        self.elements()
            .find(|element| element.content_token_kind() == Some(TokenKind::MoveNumber))
    }

    /// The move element, if present. Unrecognized moves count.
    #[must_use]
    pub fn ply_move(&self) -> Option<WithFloats> {
        self.elements().find(|element| {
            matches!(
                element.content_token_kind(),
                Some(TokenKind::Move | TokenKind::UnrecognizedMove)
            )
        })
    }

    /// NAG elements in source order.
    pub fn nags(&self) -> impl Iterator<Item = WithFloats> + '_ {
        self.elements()
            .filter(|element| element.content_token_kind().is_some_and(TokenKind::is_nag))
    }

    /// Variation elements in source order.
    pub fn variations(&self) -> impl Iterator<Item = WithFloats> + '_ {
        self.elements().filter(|element| element.variation().is_some())
    }
}

impl Variation {
    /// The opening parenthesis with its trivia.
    #[must_use]
    pub fn open_paren(&self) -> WithTrivia {
        children(&self.syntax)
            .find_map(WithTrivia::cast)
            .unwrap_or_else(|| unreachable!("variations always open with a parenthesis"))
    }

    /// The nested ply list.
    #[must_use]
    pub fn ply_list(&self) -> PlyList {
        children(&self.syntax)
            .find_map(PlyList::cast)
            .unwrap_or_else(|| unreachable!("variations always carry a ply list"))
    }

    /// The closing parenthesis, absent when the variation never closed.
    #[must_use]
    pub fn close_paren(&self) -> Option<WithTrivia> {
        children(&self.syntax).filter_map(WithTrivia::cast).nth(1)
    }
}

impl WithFloats {
    /// Leading float items in source order.
    pub fn floats(&self) -> impl Iterator<Item = WithTrivia> + '_ {
        let count = self.syntax.child_count();
        children(&self.syntax)
            .take(count.saturating_sub(1))
            .filter_map(WithTrivia::cast)
    }

    /// The wrapped content: a `WithTrivia` terminal wrapper or a
    /// `Variation` (always the last child).
    #[must_use]
    pub fn content(&self) -> SyntaxNode {
        self.syntax.child(self.syntax.child_count() - 1)
    }

    /// The content as a terminal wrapper, when it is one.
    #[must_use]
    pub fn content_with_trivia(&self) -> Option<WithTrivia> {
        WithTrivia::cast(self.content())
    }

    /// The content terminal kind, when the content wraps a terminal.
    #[must_use]
    pub fn content_token_kind(&self) -> Option<TokenKind> {
        self.content_with_trivia()?.token_kind()
    }

    /// The content as a variation, when it is one.
    #[must_use]
    pub fn variation(&self) -> Option<Variation> {
        Variation::cast(self.content())
    }
}

impl WithTrivia {
    /// The leading trivia block (always the first child).
    #[must_use]
    pub fn trivia(&self) -> SyntaxNode {
        self.syntax.child(0)
    }

    /// The foreground terminal (always the second child).
    #[must_use]
    pub fn token(&self) -> SyntaxNode {
        self.syntax.child(1)
    }

    /// Kind of the foreground terminal.
    #[must_use]
    pub fn token_kind(&self) -> Option<TokenKind> {
        self.token().token_kind()
    }

    /// Absolute start of the terminal, past the leading trivia.
    #[must_use]
    pub fn content_start(&self) -> u32 {
        self.syntax.child_start(1)
    }
}
