//! Condition expression language for Spielbuch story graphs.
//!
//! Edge conditions and choice-visibility conditions are small boolean
//! expressions over a scalar variable store: `gold >= 100`,
//! `route == 'mara' and not betrayed`. The grammar permits variable
//! references, literals, comparison, equality, and boolean operators —
//! nothing callable. That restriction is a safety boundary enforced by
//! construction: the parser has no production for anything else, so
//! authored content cannot become a code-execution surface.
//!
//! The public entry point [`evaluate`] fails closed: an empty condition is
//! `true`, and any lex/parse/evaluation error is `false`. Use
//! [`try_evaluate`] when the error itself is wanted (diagnostics, `check`
//! tooling).

/// Expression AST and operators.
pub mod ast;
/// Diagnostics for authoring tools.
pub mod diagnostics;
/// Error types used throughout the crate.
pub mod error;
/// Expression evaluation against a variable store.
pub mod eval;
/// Token stream produced by the logos lexer.
pub mod lexer;
/// Recursive-descent parser over the restricted grammar.
pub mod parser;
/// Scalar values and the variable store trait.
pub mod value;

/// Re-export AST types.
pub use ast::{BinaryOp, Expr};
/// Re-export diagnostic types.
pub use diagnostics::{Diagnostic, Severity, render_diagnostic};
/// Re-export error types.
pub use error::{ExprError, ExprResult};
/// Re-export value types.
pub use value::{Value, Variables};

/// Evaluate a condition expression, returning its value.
///
/// An empty or whitespace-only expression is the explicit "no condition"
/// case and evaluates to `Value::Bool(true)`.
pub fn try_evaluate(expression: &str, variables: &impl Variables) -> ExprResult<Value> {
    if expression.trim().is_empty() {
        return Ok(Value::Bool(true));
    }
    let expr = parser::parse(expression)?;
    eval::eval(&expr, variables)
}

/// Evaluate a condition expression as a boolean, failing closed.
///
/// Empty ⇒ `true`; any error ⇒ `false`. Never panics, never propagates an
/// error into the caller's control flow.
pub fn evaluate(expression: &str, variables: &impl Variables) -> bool {
    match try_evaluate(expression, variables) {
        Ok(value) => value.is_truthy(),
        Err(_) => false,
    }
}
