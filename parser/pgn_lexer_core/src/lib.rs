//! Low-level tokenizer for Portable Game Notation.
//!
//! This crate is a standalone, pure tokenizer with **zero `pgn_*`
//! dependencies**, usable by external tools (highlighters, import
//! filters) without pulling in the whole parser.
//!
//! # Architecture
//!
//! `pgn_lexer_core` is the "raw" half of a two-layer lexer (modeled
//! after the `rustc_lexer` / `rustc_parse::lexer` separation):
//!
//! - **`pgn_lexer_core`** (this crate): produces `(RawTag, len)` pairs
//!   from source text. No spans, no payloads, no diagnostics.
//! - **`pgn_parse`**: "cooks" raw tokens into green terminals with
//!   decoded tag values, NAG values, and diagnostics.
//!
//! Three pieces cooperate: a character classifier ([`classify`]) maps
//! each code point to one of the PGN character classes, the symbol
//! automaton ([`SymbolAutomaton`]) classifies maximal symbol runs, and
//! the scanner ([`RawScanner`]) drives both plus the sub-lexers for
//! strings, comments, escape lines, and NAGs.
//!
//! # Usage
//!
//! ```
//! use pgn_lexer_core::{RawScanner, RawTag};
//!
//! let mut scanner = RawScanner::new("1. e4 *");
//! let first = scanner.next_token();
//! assert_eq!(first.tag, RawTag::MoveNumber);
//! assert_eq!(first.len, 1);
//! ```

mod automaton;
mod char_class;
mod cursor;
mod raw_scanner;

pub use automaton::{Classification, SymbolAutomaton};
pub use char_class::{classify, CharClass, SYMBOL_MASK};
pub use cursor::Cursor;
pub use raw_scanner::{RawScanner, RawTag, RawToken};
