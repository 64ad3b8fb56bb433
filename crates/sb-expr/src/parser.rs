use std::ops::Range;

use crate::ast::{BinaryOp, Expr};
use crate::error::{ExprError, ExprResult};
use crate::lexer::{Token, lex};
use crate::value::Value;

/// Parse a condition expression into an [`Expr`].
///
/// Recursive descent over a restricted grammar, lowest precedence first:
///
/// ```text
/// expr       := or
/// or         := and   ( ("||" | "or")  and )*
/// and        := equal ( ("&&" | "and") equal )*
/// equal      := rel   ( ("==" | "!=") rel )*
/// rel        := unary ( ("<" | "<=" | ">" | ">=") unary )*
/// unary      := ("!" | "not") unary | primary
/// primary    := number | string | "true" | "false" | "null" | "undefined"
///             | identifier | "(" expr ")"
/// ```
///
/// There is deliberately no production for calls, assignment, or indexing;
/// the injection-safety of the condition language rests on this grammar,
/// not on sanitizing input.
pub fn parse(source: &str) -> ExprResult<Expr> {
    let tokens = lex(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        len: source.len(),
    };
    let expr = parser.or_expr()?;
    if let Some((token, span)) = parser.peek() {
        return Err(ExprError::Parse {
            span: span.clone(),
            message: format!("unexpected trailing input: {token}"),
        });
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<(Token, Range<usize>)>,
    pos: usize,
    len: usize,
}

impl Parser {
    fn peek(&self) -> Option<&(Token, Range<usize>)> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<(Token, Range<usize>)> {
        let item = self.tokens.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn eof_span(&self) -> Range<usize> {
        self.len..self.len
    }

    /// Consume the next token if it matches the given word keyword.
    fn eat_word(&mut self, word: &str) -> bool {
        if matches!(self.peek(), Some((Token::Word(w), _)) if w == word) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn eat(&mut self, token: &Token) -> bool {
        if matches!(self.peek(), Some((t, _)) if t == token) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn or_expr(&mut self) -> ExprResult<Expr> {
        let mut lhs = self.and_expr()?;
        while self.eat(&Token::OrOr) || self.eat_word("or") {
            let rhs = self.and_expr()?;
            lhs = Expr::Binary {
                op: BinaryOp::Or,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> ExprResult<Expr> {
        let mut lhs = self.equality_expr()?;
        while self.eat(&Token::AndAnd) || self.eat_word("and") {
            let rhs = self.equality_expr()?;
            lhs = Expr::Binary {
                op: BinaryOp::And,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn equality_expr(&mut self) -> ExprResult<Expr> {
        let mut lhs = self.relational_expr()?;
        loop {
            let op = if self.eat(&Token::EqEq) {
                BinaryOp::Eq
            } else if self.eat(&Token::BangEq) {
                BinaryOp::Ne
            } else {
                break;
            };
            let rhs = self.relational_expr()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn relational_expr(&mut self) -> ExprResult<Expr> {
        let mut lhs = self.unary_expr()?;
        loop {
            let op = if self.eat(&Token::Le) {
                BinaryOp::Le
            } else if self.eat(&Token::Ge) {
                BinaryOp::Ge
            } else if self.eat(&Token::Lt) {
                BinaryOp::Lt
            } else if self.eat(&Token::Gt) {
                BinaryOp::Gt
            } else {
                break;
            };
            let rhs = self.unary_expr()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn unary_expr(&mut self) -> ExprResult<Expr> {
        if self.eat(&Token::Bang) || self.eat_word("not") {
            let inner = self.unary_expr()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.primary()
    }

    fn primary(&mut self) -> ExprResult<Expr> {
        let Some((token, span)) = self.bump() else {
            return Err(ExprError::Parse {
                span: self.eof_span(),
                message: "unexpected end of expression".to_string(),
            });
        };
        match token {
            Token::Number(n) => Ok(Expr::Literal(Value::Number(n))),
            Token::Str(s) => Ok(Expr::Literal(Value::Str(s))),
            Token::Word(word) => Ok(match word.as_str() {
                // Reserved words are literals, not lookups.
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" => Expr::Literal(Value::Null),
                "undefined" => Expr::Literal(Value::Undefined),
                _ => Expr::Var(word),
            }),
            Token::LParen => {
                let inner = self.or_expr()?;
                if !self.eat(&Token::RParen) {
                    let span = self
                        .peek()
                        .map(|(_, s)| s.clone())
                        .unwrap_or_else(|| self.eof_span());
                    return Err(ExprError::Parse {
                        span,
                        message: "expected closing ')'".to_string(),
                    });
                }
                Ok(inner)
            }
            other => Err(ExprError::Parse {
                span,
                message: format!("unexpected token: {other}"),
            }),
        }
    }
}
