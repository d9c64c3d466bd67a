//! Lossless, recovering parser for Portable Game Notation.
//!
//! [`parse`] is the single entry point: it consumes a source string and
//! produces a [`Parse`] — an immutable green tree whose terminals
//! reproduce the input byte-for-byte, plus a flat list of positioned
//! diagnostics. Parsing is total: malformed input degrades into error
//! terminals, float items, and diagnostics, never into a failure.
//!
//! ```
//! use pgn_parse::parse;
//!
//! let parse = parse("[Event \"X\"]\n1. e4 e5 *\n");
//! let games: Vec<_> = parse.game_list().games().collect();
//! assert_eq!(games.len(), 1);
//! assert!(parse.diagnostics().iter().all(|d| !d.is_error()));
//! ```
//!
//! # Pipeline
//!
//! `pgn_lexer_core` finds raw token boundaries; the cooking layer
//! attaches payloads and lexical diagnostics; trivia is bundled onto the
//! following foreground terminal; the two-mode parser assembles games,
//! tag pairs, plies, and variations, recovering from malformed input by
//! demoting or floating tokens.

mod cook;
mod parser;
mod trivia;

use std::sync::Arc;

use pgn_diagnostic::Diagnostic;
use pgn_syntax::{ast, GreenNode, SyntaxNode};

/// Result of one [`parse`] call.
///
/// Owns the green root and the diagnostics. Red overlays are
/// materialized on demand by [`syntax`](Parse::syntax); every overlay
/// over the same green tree computes the same offsets.
#[derive(Debug)]
pub struct Parse {
    green: Arc<GreenNode>,
    diagnostics: Vec<Diagnostic>,
}

impl Parse {
    /// The green root (a `GameList` node).
    #[must_use]
    pub fn green(&self) -> &Arc<GreenNode> {
        &self.green
    }

    /// Materialize a fresh red root over the green tree.
    #[must_use]
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(Arc::clone(&self.green))
    }

    /// Typed view of the root.
    #[must_use]
    pub fn game_list(&self) -> ast::GameList {
        ast::GameList::cast(self.syntax())
            .unwrap_or_else(|| unreachable!("the root is always a game list"))
    }

    /// Diagnostics in emission order (left to right in the source).
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the parse, keeping only the diagnostics.
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// Parse PGN source into a lossless tree plus diagnostics.
///
/// Pure and deterministic: equal inputs produce equal green trees and
/// identical diagnostic sequences.
///
/// # Panics
///
/// Panics if the source exceeds `u32::MAX` bytes.
#[must_use]
pub fn parse(source: &str) -> Parse {
    let (green, diagnostics) = parser::parse_source(source);
    Parse { green, diagnostics }
}
