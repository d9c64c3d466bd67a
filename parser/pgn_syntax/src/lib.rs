//! Lossless syntax tree for Portable Game Notation.
//!
//! The tree is dual-representation:
//!
//! - **Green** ([`GreenToken`], [`GreenNode`]): immutable, bottom-up,
//!   position-free. Nodes carry lengths and child offsets relative to
//!   their own start, so identical subtrees are freely shared —
//!   [`TokenCache`] interns the common small terminals.
//! - **Red** ([`SyntaxNode`]): a lazily materialized, parent-linked
//!   overlay computing absolute offsets on demand. Children realize at
//!   most once per slot and the overlay is safe for concurrent readers.
//!
//! The [`ast`] module layers typed views (games, tag pairs, plies,
//! variations) over red nodes.
//!
//! Concatenating every terminal's source text in tree order reproduces
//! the parsed input byte-for-byte; nothing — whitespace, comments,
//! escape lines, illegal characters — is dropped.

pub mod ast;
mod cache;
mod green;
mod kind;
mod red;

pub use cache::TokenCache;
pub use green::{GreenElement, GreenNode, GreenToken, Payload};
pub use kind::{NodeKind, TokenKind};
pub use red::{SyntaxNode, TokensInRange};
