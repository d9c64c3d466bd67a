//! Positioned, severity-tagged diagnostics.

use std::fmt;

use crate::{ErrorCode, Span};

/// Severity level for diagnostics.
///
/// Ordered from most to least severe: parsing never aborts, so even
/// `Error` means "malformed but fully recovered".
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Message,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Message => write!(f, "message"),
        }
    }
}

/// One reported anomaly: code, severity, span, and the quotable
/// parameter strings some codes carry (the offending lexeme for
/// unrecognized moves and overflowing NAGs, the display form of an
/// illegal character).
///
/// Severity always derives from the code, so equal codes never disagree
/// on severity.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub span: Span,
    pub parameters: Vec<String>,
}

impl Diagnostic {
    /// Create a diagnostic; severity comes from the code's severity map.
    pub fn new(code: ErrorCode, span: Span) -> Self {
        Diagnostic {
            code,
            severity: code.severity(),
            span,
            parameters: Vec::new(),
        }
    }

    /// Attach a quotable parameter string.
    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameters.push(parameter.into());
        self
    }

    /// `true` for `Severity::Error`.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} at {:?}", self.severity, self.code, self.span)?;
        for parameter in &self.parameters {
            write!(f, " ({parameter})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn severity_derives_from_code() {
        let diag = Diagnostic::new(ErrorCode::MissingMove, Span::new(3, 5));
        assert_eq!(diag.severity, Severity::Error);
        let diag = Diagnostic::new(ErrorCode::OrphanPeriod, Span::point(7));
        assert_eq!(diag.severity, Severity::Message);
        assert!(!diag.is_error());
    }

    #[test]
    fn parameters_accumulate_in_order() {
        let diag = Diagnostic::new(ErrorCode::UnrecognizedMove, Span::new(0, 4))
            .with_parameter("Zf9!");
        assert_eq!(diag.parameters, vec!["Zf9!".to_owned()]);
    }

    #[test]
    fn display_is_compact() {
        let diag = Diagnostic::new(ErrorCode::OverflowNag, Span::new(2, 6)).with_parameter("$999");
        assert_eq!(diag.to_string(), "message P0007 at 2..6 ($999)");
    }
}
