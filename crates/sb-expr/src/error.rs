use std::ops::Range;

/// Alias for `Result<T, ExprError>`.
pub type ExprResult<T> = Result<T, ExprError>;

/// Errors from lexing, parsing, or evaluating a condition expression.
///
/// These never cross the interpreter's public boundary: the fail-closed
/// [`evaluate`](crate::evaluate) wrapper turns them into `false`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExprError {
    /// The expression contains characters outside the language.
    #[error("lex error at {}..{}: {message}", span.start, span.end)]
    Lex {
        /// Byte range of the offending input.
        span: Range<usize>,
        /// What went wrong.
        message: String,
    },

    /// The token stream does not match the grammar.
    #[error("parse error at {}..{}: {message}", span.start, span.end)]
    Parse {
        /// Byte range of the offending input.
        span: Range<usize>,
        /// What went wrong.
        message: String,
    },

    /// A relational operator was applied to non-numeric operands.
    #[error("cannot compare {lhs} {op} {rhs}: relational operators require numbers")]
    Relational {
        /// The operator's source form.
        op: &'static str,
        /// Type name of the left operand.
        lhs: &'static str,
        /// Type name of the right operand.
        rhs: &'static str,
    },
}

impl ExprError {
    /// Byte range the error points at, where one exists.
    pub fn span(&self) -> Option<Range<usize>> {
        match self {
            ExprError::Lex { span, .. } | ExprError::Parse { span, .. } => Some(span.clone()),
            ExprError::Relational { .. } => None,
        }
    }
}
