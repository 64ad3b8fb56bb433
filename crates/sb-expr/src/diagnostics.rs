use std::fmt;

use crate::error::ExprError;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The expression cannot be evaluated; its condition fails closed.
    Error,
    /// Suspicious but evaluable.
    Warning,
}

/// A diagnostic message with source location, suitable for authoring tools.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// How severe the problem is.
    pub severity: Severity,
    /// Byte range of the offending input within the expression.
    pub span: std::ops::Range<usize>,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(span: std::ops::Range<usize>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            span,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{prefix}: {}", self.message)
    }
}

impl From<&ExprError> for Diagnostic {
    fn from(err: &ExprError) -> Self {
        Diagnostic::error(err.span().unwrap_or(0..0), err.to_string())
    }
}

/// Render a diagnostic against its (single-line) expression source with a
/// caret marker:
///
/// ```text
/// flag === true
///      ^^ unexpected character: "="
/// ```
pub fn render_diagnostic(source: &str, diag: &Diagnostic) -> String {
    let start = diag.span.start.min(source.len());
    let end = diag.span.end.clamp(start, source.len());
    let carets = "^".repeat((end - start).max(1));
    format!("{source}\n{}{carets} {}", " ".repeat(start), diag.message)
}
