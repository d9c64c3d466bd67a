//! Two-mode, single-pass parser.
//!
//! Foreground terminals arrive bundled with their leading trivia and
//! dispatch on the current mode. Tag-section mode runs a tag-pair
//! builder; move-tree mode runs a ply builder per variation level with
//! an explicit level stack. Recovery never discards a token: terminals
//! that fit nowhere are demoted (orphan parentheses, unrecognized
//! moves) or buffered as float items, and every malformed structure is
//! reported when it closes, spanning from its first element's content
//! (past floats and trivia) to its end.

use std::sync::Arc;

use pgn_diagnostic::{Diagnostic, ErrorCode, Span};
use pgn_lexer_core::{RawScanner, RawTag};
use pgn_syntax::{
    GreenElement, GreenNode, GreenToken, NodeKind, Payload, TokenCache, TokenKind,
};
use tracing::debug;

use crate::cook::TokenCooker;
use crate::trivia::TriviaBuilder;


/// Parser mode, switched only by foreground terminals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    InTagSection,
    InMoveTree,
}

/// One foreground terminal with its leading trivia already attached.
struct Symbol {
    kind: TokenKind,
    /// The `WithTrivia` green node.
    node: Arc<GreenNode>,
    token: Arc<GreenToken>,
    /// Absolute start of the terminal itself, past the trivia.
    content_start: u32,
}

impl Symbol {
    fn content_end(&self) -> u32 {
        self.content_start + self.token.len()
    }

    fn content_span(&self) -> Span {
        Span::new(self.content_start, self.content_end())
    }

    fn element(&self) -> GreenElement {
        GreenElement::Node(Arc::clone(&self.node))
    }
}

/// Rebuild a symbol under a different kind, keeping its trivia and
/// length. Reclassification never changes what the source says, only
/// what the tree calls it.
fn retag(sym: &Symbol, kind: TokenKind, payload: Payload) -> Symbol {
    let token = Arc::new(GreenToken::new(kind, sym.token.len(), payload));
    let trivia = sym.node.child(0).clone();
    let node = Arc::new(GreenNode::new(
        NodeKind::WithTrivia,
        vec![trivia, GreenElement::Token(Arc::clone(&token))],
    ));
    Symbol {
        kind,
        node,
        token,
        content_start: sym.content_start,
    }
}

/// Running state of one tag pair.
#[derive(Default)]
struct TagPairBuilder {
    elements: Vec<GreenElement>,
    has_open: bool,
    has_name: bool,
    has_value: bool,
    /// Content start of the first element.
    content_start: u32,
    /// End of the last element.
    end: u32,
}

impl TagPairBuilder {
    fn in_progress(&self) -> bool {
        !self.elements.is_empty()
    }

    fn push(&mut self, sym: &Symbol) {
        if self.elements.is_empty() {
            self.content_start = sym.content_start;
        }
        self.elements.push(sym.element());
        self.end = sym.content_end();
    }
}

/// Running state of one ply.
#[derive(Default)]
struct PlyBuilder {
    /// Move-number element (`WithFloats`).
    number: Option<GreenElement>,
    /// Move element (`WithFloats`).
    mv: Option<GreenElement>,
    /// NAG elements (`WithFloats`).
    nags: Vec<GreenElement>,
    /// Variation elements (`WithFloats`).
    variations: Vec<GreenElement>,
    /// Content start of the first element, past floats and trivia.
    content_start: u32,
    /// End of the last element.
    end: u32,
    /// One period is expected right after the move number.
    period_expected: bool,
}

impl PlyBuilder {
    fn is_active(&self) -> bool {
        self.number.is_some()
            || self.mv.is_some()
            || !self.nags.is_empty()
            || !self.variations.is_empty()
    }
}

/// One variation nesting level. The top level has no opening
/// parenthesis.
#[derive(Default)]
struct Level {
    /// Saved `(` with trivia, plus its content start.
    open_paren: Option<(GreenElement, u32)>,
    /// Float items that preceded the `(` at the outer level; they become
    /// the variation element's leading floats when it completes.
    leading_floats: Vec<GreenElement>,
    /// Finished plies.
    plies: Vec<GreenElement>,
    /// The pending ply.
    ply: PlyBuilder,
    /// Float buffer: periods, orphans, floated markers (`WithTrivia`).
    floats: Vec<GreenElement>,
}

impl Level {
    fn nested(open_paren: GreenElement, content_start: u32, leading_floats: Vec<GreenElement>) -> Self {
        Level {
            open_paren: Some((open_paren, content_start)),
            leading_floats,
            ..Level::default()
        }
    }
}

/// Parser state for one `parse()` call.
struct Parser<'src> {
    src: &'src str,
    cache: TokenCache,
    cooker: TokenCooker,
    trivia: TriviaBuilder,
    diagnostics: Vec<Diagnostic>,
    mode: Mode,
    tag_pair: TagPairBuilder,
    /// Finished tag pairs of the current game.
    tag_pairs: Vec<GreenElement>,
    /// Innermost variation level.
    level: Level,
    /// Outer levels, outermost first.
    stack: Vec<Level>,
    /// Finished games.
    games: Vec<GreenElement>,
    /// Content start of the current game's move text.
    move_text_start: Option<u32>,
    /// Content end of the last terminal appended to the current game.
    last_end: u32,
}

/// Parse `source` into a green `GameList` plus diagnostics.
pub(crate) fn parse_source(source: &str) -> (Arc<GreenNode>, Vec<Diagnostic>) {
    let mut parser = Parser {
        src: source,
        cache: TokenCache::new(),
        cooker: TokenCooker::default(),
        trivia: TriviaBuilder::default(),
        diagnostics: Vec::new(),
        mode: Mode::InTagSection,
        tag_pair: TagPairBuilder::default(),
        tag_pairs: Vec::new(),
        level: Level::default(),
        stack: Vec::new(),
        games: Vec::new(),
        move_text_start: None,
        last_end: 0,
    };
    parser.run();
    parser.into_tree()
}

impl<'src> Parser<'src> {
    fn run(&mut self) {
        let mut scanner = RawScanner::new(self.src);
        let mut offset = 0u32;
        loop {
            let raw = scanner.next_token();
            if raw.tag == RawTag::Eof {
                break;
            }
            let lexeme = &self.src[offset as usize..(offset + raw.len) as usize];
            let token = self
                .cooker
                .cook(raw, offset, lexeme, &self.cache, &mut self.diagnostics);
            let kind = token.kind();
            if kind.is_background() {
                self.trivia.push_background(token);
            } else if kind.is_comment() {
                self.trivia.push_comment(token);
            } else {
                let trivia = self.trivia.take(&self.cache);
                let node = Arc::new(GreenNode::new(
                    NodeKind::WithTrivia,
                    vec![GreenElement::Node(trivia), GreenElement::Token(Arc::clone(&token))],
                ));
                let sym = Symbol {
                    kind,
                    node,
                    token,
                    content_start: offset,
                };
                self.on_foreground(sym);
            }
            offset += raw.len;
        }
        self.finish();
    }

    fn on_foreground(&mut self, sym: Symbol) {
        match self.mode {
            Mode::InTagSection => self.tag_section_symbol(sym),
            Mode::InMoveTree => self.move_tree_symbol(sym),
        }
    }

    // ─── Tag-section mode ────────────────────────────────────────────

    fn tag_section_symbol(&mut self, sym: Symbol) {
        // A move-shaped symbol that is also a valid tag name fills the
        // name slot here.
        let sym = if sym.kind == TokenKind::Move && sym.token.is_valid_tag_name() {
            retag(&sym, TokenKind::TagName, Payload::None)
        } else {
            sym
        };
        match sym.kind {
            TokenKind::BracketOpen => {
                self.last_end = sym.content_end();
                if self.tag_pair.in_progress() {
                    self.close_tag_pair(false);
                }
                self.tag_pair.push(&sym);
                self.tag_pair.has_open = true;
            }
            TokenKind::BracketClose => {
                self.last_end = sym.content_end();
                self.tag_pair.push(&sym);
                self.close_tag_pair(true);
            }
            TokenKind::TagName => {
                self.last_end = sym.content_end();
                if self.tag_pair.has_name || self.tag_pair.has_value {
                    self.close_tag_pair(false);
                }
                self.tag_pair.push(&sym);
                self.tag_pair.has_name = true;
            }
            TokenKind::TagValue | TokenKind::ErrorTagValue => {
                self.last_end = sym.content_end();
                if self.tag_pair.has_value {
                    self.diagnostics
                        .push(Diagnostic::new(ErrorCode::MultipleTagValues, sym.content_span()));
                }
                self.tag_pair.push(&sym);
                self.tag_pair.has_value = true;
            }
            // Everything else is move-tree-native and ends the section.
            _ => {
                if self.tag_pair.in_progress() {
                    self.close_tag_pair(false);
                }
                debug!(offset = sym.content_start, "entering move text");
                self.mode = Mode::InMoveTree;
                self.move_text_start = Some(sym.content_start);
                self.move_tree_symbol(sym);
            }
        }
    }

    /// Close the running tag pair, reporting what it is missing.
    fn close_tag_pair(&mut self, has_close: bool) {
        let builder = std::mem::take(&mut self.tag_pair);
        debug_assert!(!builder.elements.is_empty(), "closing an empty tag pair");
        let span = Span::new(builder.content_start, builder.end);
        if !builder.has_open {
            self.diagnostics
                .push(Diagnostic::new(ErrorCode::MissingTagBracketOpen, span));
        }
        match (builder.has_name, builder.has_value) {
            (false, false) => self
                .diagnostics
                .push(Diagnostic::new(ErrorCode::EmptyTag, span)),
            (false, true) => self
                .diagnostics
                .push(Diagnostic::new(ErrorCode::MissingTagName, span)),
            (true, false) => self
                .diagnostics
                .push(Diagnostic::new(ErrorCode::MissingTagValue, span)),
            (true, true) => {}
        }
        if !has_close {
            self.diagnostics
                .push(Diagnostic::new(ErrorCode::MissingTagBracketClose, span));
        }
        self.tag_pairs
            .push(GreenElement::Node(Arc::new(GreenNode::new(
                NodeKind::TagPair,
                builder.elements,
            ))));
    }

    // ─── Move-tree mode ──────────────────────────────────────────────

    fn move_tree_symbol(&mut self, sym: Symbol) {
        // Tag-section symbols end the game. Tag names do not: a
        // tag-name-shaped symbol in move text is kept as an
        // unrecognized move of the same length.
        if matches!(
            sym.kind,
            TokenKind::BracketOpen
                | TokenKind::BracketClose
                | TokenKind::TagValue
                | TokenKind::ErrorTagValue
        ) {
            self.flush_open_variations();
            self.publish_game(None);
            self.mode = Mode::InTagSection;
            self.tag_section_symbol(sym);
            return;
        }

        let sym = if sym.kind == TokenKind::TagName {
            let lexeme =
                &self.src[sym.content_start as usize..sym.content_end() as usize];
            let payload = Payload::Literal(Arc::from(lexeme));
            retag(&sym, TokenKind::UnrecognizedMove, payload)
        } else {
            sym
        };

        self.last_end = sym.content_end();
        match sym.kind {
            TokenKind::MoveNumber => {
                self.close_ply();
                self.note_ply_span(sym.content_start, sym.content_end());
                let element = self.wrap_with_floats(&sym);
                self.level.ply.number = Some(element);
                self.level.ply.period_expected = true;
            }
            TokenKind::Period => {
                if self.level.ply.period_expected {
                    self.level.ply.period_expected = false;
                } else {
                    self.diagnostics
                        .push(Diagnostic::new(ErrorCode::OrphanPeriod, sym.content_span()));
                }
                self.level.floats.push(sym.element());
            }
            TokenKind::Move | TokenKind::UnrecognizedMove => {
                if self.level.ply.mv.is_some()
                    || !self.level.ply.nags.is_empty()
                    || !self.level.ply.variations.is_empty()
                {
                    self.close_ply();
                }
                if sym.kind == TokenKind::UnrecognizedMove {
                    let mut diagnostic =
                        Diagnostic::new(ErrorCode::UnrecognizedMove, sym.content_span());
                    if let Some(text) = sym.token.literal() {
                        diagnostic = diagnostic.with_parameter(text);
                    }
                    self.diagnostics.push(diagnostic);
                }
                self.note_ply_span(sym.content_start, sym.content_end());
                let element = self.wrap_with_floats(&sym);
                self.level.ply.mv = Some(element);
                self.level.ply.period_expected = false;
            }
            kind if kind.is_nag() => {
                if !self.level.ply.variations.is_empty() {
                    self.close_ply();
                }
                self.note_ply_span(sym.content_start, sym.content_end());
                let element = self.wrap_with_floats(&sym);
                self.level.ply.nags.push(element);
                self.level.ply.period_expected = false;
            }
            TokenKind::ParenthesisOpen => {
                let leading = std::mem::take(&mut self.level.floats);
                let nested = Level::nested(sym.element(), sym.content_start, leading);
                let outer = std::mem::replace(&mut self.level, nested);
                self.stack.push(outer);
            }
            TokenKind::ParenthesisClose => {
                if self.stack.is_empty() {
                    self.diagnostics.push(Diagnostic::new(
                        ErrorCode::OrphanParenthesisClose,
                        sym.content_span(),
                    ));
                    let orphan = retag(&sym, TokenKind::OrphanParenthesisClose, Payload::None);
                    self.level.floats.push(orphan.element());
                } else {
                    self.close_variation(Some(&sym));
                }
            }
            kind if kind.is_game_result() => {
                if self.stack.is_empty() {
                    self.publish_game(Some(&sym));
                    self.mode = Mode::InTagSection;
                } else {
                    // Inside an open variation the marker cannot end the
                    // game; it floats and the game later closes without
                    // a result.
                    self.level.floats.push(sym.element());
                }
            }
            kind => unreachable!("{kind:?} cannot reach the move-tree dispatcher"),
        }
    }

    /// Record the ply-span bookkeeping for a new canonical element.
    fn note_ply_span(&mut self, content_start: u32, end: u32) {
        if !self.level.ply.is_active() {
            self.level.ply.content_start = content_start;
        }
        self.level.ply.end = end;
    }

    /// Drain the float buffer into a `WithFloats` wrapper around `sym`.
    fn wrap_with_floats(&mut self, sym: &Symbol) -> GreenElement {
        let mut children = std::mem::take(&mut self.level.floats);
        children.push(sym.element());
        GreenElement::Node(Arc::new(GreenNode::new(NodeKind::WithFloats, children)))
    }

    /// Close the pending ply, if any, reporting its missing parts.
    fn close_ply(&mut self) {
        if !self.level.ply.is_active() {
            return;
        }
        let ply = std::mem::take(&mut self.level.ply);
        let span = Span::new(ply.content_start, ply.end);
        if ply.number.is_none() {
            self.diagnostics
                .push(Diagnostic::new(ErrorCode::MissingMoveNumber, span));
        }
        if ply.mv.is_none() {
            self.diagnostics
                .push(Diagnostic::new(ErrorCode::MissingMove, span));
        }
        let mut children = Vec::new();
        children.extend(ply.number);
        children.extend(ply.mv);
        children.extend(ply.nags);
        children.extend(ply.variations);
        self.level
            .plies
            .push(GreenElement::Node(Arc::new(GreenNode::new(
                NodeKind::Ply,
                children,
            ))));
    }

    /// Close the innermost variation. `close` carries the `)` when the
    /// variation closes properly; `None` when it is flushed.
    fn close_variation(&mut self, close: Option<&Symbol>) {
        self.close_ply();
        let Some(outer) = self.stack.pop() else {
            unreachable!("close_variation with no open level");
        };
        let inner = std::mem::replace(&mut self.level, outer);
        let Some((open_paren, open_content_start)) = inner.open_paren else {
            unreachable!("nested level without an opening parenthesis");
        };

        let produced_plies = !inner.plies.is_empty();
        let mut ply_list_children = inner.plies;
        ply_list_children.extend(inner.floats);
        let ply_list = GreenElement::Node(Arc::new(GreenNode::new(
            NodeKind::PlyList,
            ply_list_children,
        )));

        let mut children = vec![open_paren, ply_list];
        let end = match close {
            Some(sym) => {
                children.push(sym.element());
                sym.content_end()
            }
            None => self.last_end,
        };
        if !produced_plies {
            self.diagnostics.push(Diagnostic::new(
                ErrorCode::EmptyVariation,
                Span::new(open_content_start, end),
            ));
        }
        let variation = Arc::new(GreenNode::new(NodeKind::Variation, children));

        let mut wrapper_children = inner.leading_floats;
        wrapper_children.push(GreenElement::Node(variation));
        let wrapped = GreenElement::Node(Arc::new(GreenNode::new(
            NodeKind::WithFloats,
            wrapper_children,
        )));

        self.note_ply_span(open_content_start, end);
        self.level.ply.variations.push(wrapped);
        self.level.ply.period_expected = false;
    }

    /// Flush every open variation, reporting `MissingParenthesisClose`
    /// once, on the innermost.
    fn flush_open_variations(&mut self) {
        if self.stack.is_empty() {
            return;
        }
        if let Some((_, open_content_start)) = &self.level.open_paren {
            self.diagnostics.push(Diagnostic::new(
                ErrorCode::MissingParenthesisClose,
                Span::new(*open_content_start, self.last_end),
            ));
        }
        debug!(depth = self.stack.len(), "flushing open variations");
        while !self.stack.is_empty() {
            self.close_variation(None);
        }
    }

    /// Close the current game, if it has any substance.
    fn publish_game(&mut self, result: Option<&Symbol>) {
        debug_assert!(self.stack.is_empty(), "games close at nesting depth zero");
        self.close_ply();
        let level = std::mem::take(&mut self.level);
        let mut ply_list_children = level.plies;
        ply_list_children.extend(level.floats);
        let tag_pairs = std::mem::take(&mut self.tag_pairs);
        let move_text_start = self.move_text_start.take();

        if tag_pairs.is_empty() && ply_list_children.is_empty() && result.is_none() {
            return;
        }
        if tag_pairs.is_empty() {
            let at = move_text_start.unwrap_or(self.last_end);
            self.diagnostics
                .push(Diagnostic::new(ErrorCode::MissingTagSection, Span::point(at)));
        }

        let tag_section =
            GreenElement::Node(Arc::new(GreenNode::new(NodeKind::TagSection, tag_pairs)));
        let ply_list = GreenElement::Node(Arc::new(GreenNode::new(
            NodeKind::PlyList,
            ply_list_children,
        )));
        let mut children = vec![tag_section, ply_list];
        match result {
            Some(sym) => children.push(sym.element()),
            None => self.diagnostics.push(Diagnostic::new(
                ErrorCode::MissingGameTerminationMarker,
                Span::point(self.last_end),
            )),
        }
        self.games
            .push(GreenElement::Node(Arc::new(GreenNode::new(
                NodeKind::Game,
                children,
            ))));
        debug!(games = self.games.len(), "game published");
    }

    /// End of input: close whatever is open and seal the root.
    fn finish(&mut self) {
        match self.mode {
            Mode::InTagSection => {
                if self.tag_pair.in_progress() {
                    self.close_tag_pair(false);
                }
                self.publish_game(None);
            }
            Mode::InMoveTree => {
                self.flush_open_variations();
                self.publish_game(None);
            }
        }
    }

    fn into_tree(mut self) -> (Arc<GreenNode>, Vec<Diagnostic>) {
        let trailing = self.trivia.take(&self.cache);
        let mut children = self.games;
        children.push(GreenElement::Node(trailing));
        let root = Arc::new(GreenNode::new(NodeKind::GameList, children));
        (root, self.diagnostics)
    }
}
