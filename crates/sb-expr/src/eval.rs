use crate::ast::{BinaryOp, Expr};
use crate::error::{ExprError, ExprResult};
use crate::value::{Value, Variables};

/// Evaluate a parsed expression against a variable store.
///
/// Boolean operators short-circuit and return `Value::Bool` (not the
/// operand value). Relational operators require numeric operands and fail
/// with [`ExprError::Relational`] otherwise; the caller's fail-closed
/// wrapper turns that into `false`.
pub fn eval(expr: &Expr, vars: &impl Variables) -> ExprResult<Value> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Var(name) => Ok(vars.get(name)),
        Expr::Not(inner) => Ok(Value::Bool(!eval(inner, vars)?.is_truthy())),
        Expr::Binary { op, lhs, rhs } => match op {
            BinaryOp::Or => {
                let left = eval(lhs, vars)?;
                if left.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(eval(rhs, vars)?.is_truthy()))
            }
            BinaryOp::And => {
                let left = eval(lhs, vars)?;
                if !left.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(eval(rhs, vars)?.is_truthy()))
            }
            BinaryOp::Eq => Ok(Value::Bool(eval(lhs, vars)?.loose_eq(&eval(rhs, vars)?))),
            BinaryOp::Ne => Ok(Value::Bool(!eval(lhs, vars)?.loose_eq(&eval(rhs, vars)?))),
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                let left = eval(lhs, vars)?;
                let right = eval(rhs, vars)?;
                let (Some(a), Some(b)) = (left.as_number(), right.as_number()) else {
                    return Err(ExprError::Relational {
                        op: op.symbol(),
                        lhs: left.type_name(),
                        rhs: right.type_name(),
                    });
                };
                Ok(Value::Bool(match op {
                    BinaryOp::Lt => a < b,
                    BinaryOp::Le => a <= b,
                    BinaryOp::Gt => a > b,
                    BinaryOp::Ge => a >= b,
                    _ => unreachable!(),
                }))
            }
        },
    }
}
