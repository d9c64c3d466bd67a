//! Diagnostic system for the PGN parser.
//!
//! Every anomaly the parser finds — lexical or structural — is a
//! [`Diagnostic`]: an [`ErrorCode`], the [`Severity`] that code maps
//! to, a byte [`Span`] into the source, and optional parameter strings
//! for messages that quote the offending text. Parsing is total;
//! diagnostics are the only error channel.

mod diagnostic;
mod error_code;
mod span;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::ErrorCode;
pub use span::Span;
