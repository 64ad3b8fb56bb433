use crate::value::Value;

/// A binary operator in the condition language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `||` / `or`
    Or,
    /// `&&` / `and`
    And,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl BinaryOp {
    /// Source form of the operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }
}

/// A parsed condition expression.
///
/// The grammar is restricted by construction: there is no AST node for
/// calls, assignment, indexing, or iteration, so no input can evaluate
/// anything beyond variable lookups and these operators.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value (`true`, `false`, `null`, `undefined`, numbers, strings).
    Literal(Value),
    /// A variable lookup against the store.
    Var(String),
    /// Boolean negation.
    Not(Box<Expr>),
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
}
