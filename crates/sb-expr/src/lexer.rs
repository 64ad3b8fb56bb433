use logos::Logos;
use std::fmt;
use std::ops::Range;

use crate::error::{ExprError, ExprResult};

/// Token type for the condition language.
///
/// The lexer is deliberately simple — word-form keywords (`and`, `or`,
/// `not`, `true`, `false`, `null`, `undefined`) all lex as `Token::Word`
/// and are disambiguated by the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Left parenthesis `(`.
    LParen,
    /// Right parenthesis `)`.
    RParen,
    /// Boolean AND `&&`.
    AndAnd,
    /// Boolean OR `||`.
    OrOr,
    /// Boolean NOT `!`.
    Bang,
    /// Equality `==`.
    EqEq,
    /// Inequality `!=`.
    BangEq,
    /// Less-than `<`.
    Lt,
    /// Less-than-or-equal `<=`.
    Le,
    /// Greater-than `>`.
    Gt,
    /// Greater-than-or-equal `>=`.
    Ge,
    /// Number literal.
    Number(f64),
    /// String literal (single- or double-quoted).
    Str(String),
    /// Bare word: identifier or keyword, disambiguated by the parser.
    Word(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::AndAnd => write!(f, "&&"),
            Token::OrOr => write!(f, "||"),
            Token::Bang => write!(f, "!"),
            Token::EqEq => write!(f, "=="),
            Token::BangEq => write!(f, "!="),
            Token::Lt => write!(f, "<"),
            Token::Le => write!(f, "<="),
            Token::Gt => write!(f, ">"),
            Token::Ge => write!(f, ">="),
            Token::Number(n) => write!(f, "{n}"),
            Token::Str(s) => write!(f, "\"{s}\""),
            Token::Word(w) => write!(f, "{w}"),
        }
    }
}

/// Internal logos token — converted to an owned, spanned [`Token`] stream.
#[derive(Logos, Debug)]
#[logos(skip r"[ \t\r\n]+")]
enum RawToken {
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("&&")]
    AndAnd,

    #[token("||")]
    OrOr,

    #[token("==")]
    EqEq,

    #[token("!=")]
    BangEq,

    // Order matters: two-char operators before their one-char prefixes.
    #[token("<=")]
    Le,

    #[token(">=")]
    Ge,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token("!")]
    Bang,

    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,

    #[regex(r#""[^"]*""#)]
    DoubleStr,

    #[regex(r"'[^']*'")]
    SingleStr,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Word,
}

/// Lex a condition expression into a sequence of `(Token, Span)` pairs.
///
/// Unlike a file-oriented lexer, conditions are single short strings, so
/// lexing stops at the first error.
pub fn lex(source: &str) -> ExprResult<Vec<(Token, Range<usize>)>> {
    let mut tokens = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let token = match result {
            Ok(RawToken::LParen) => Token::LParen,
            Ok(RawToken::RParen) => Token::RParen,
            Ok(RawToken::AndAnd) => Token::AndAnd,
            Ok(RawToken::OrOr) => Token::OrOr,
            Ok(RawToken::EqEq) => Token::EqEq,
            Ok(RawToken::BangEq) => Token::BangEq,
            Ok(RawToken::Le) => Token::Le,
            Ok(RawToken::Ge) => Token::Ge,
            Ok(RawToken::Lt) => Token::Lt,
            Ok(RawToken::Gt) => Token::Gt,
            Ok(RawToken::Bang) => Token::Bang,
            Ok(RawToken::Number) => {
                let raw = lexer.slice();
                match raw.parse::<f64>() {
                    Ok(n) => Token::Number(n),
                    Err(_) => {
                        return Err(ExprError::Lex {
                            span,
                            message: format!("invalid number literal: {raw}"),
                        });
                    }
                }
            }
            Ok(RawToken::DoubleStr | RawToken::SingleStr) => {
                let slice = lexer.slice();
                Token::Str(slice[1..slice.len() - 1].to_string())
            }
            Ok(RawToken::Word) => Token::Word(lexer.slice().to_string()),
            Err(()) => {
                return Err(ExprError::Lex {
                    span: span.clone(),
                    message: format!("unexpected character: {:?}", &source[span]),
                });
            }
        };
        tokens.push((token, span));
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<String> {
        lex(source)
            .unwrap()
            .into_iter()
            .map(|(t, _)| t.to_string())
            .collect()
    }

    #[test]
    fn lex_comparison() {
        assert_eq!(kinds("gold >= 100"), vec!["gold", ">=", "100"]);
    }

    #[test]
    fn lex_symbolic_boolean_operators() {
        assert_eq!(
            kinds("a && !b || c"),
            vec!["a", "&&", "!", "b", "||", "c"]
        );
    }

    #[test]
    fn lex_word_operators_as_words() {
        // Keyword recognition happens in the parser.
        let tokens = lex("a and not b").unwrap();
        assert!(matches!(&tokens[1].0, Token::Word(w) if w == "and"));
        assert!(matches!(&tokens[2].0, Token::Word(w) if w == "not"));
    }

    #[test]
    fn lex_two_char_operators_before_one_char() {
        assert_eq!(kinds("a <= b < c"), vec!["a", "<=", "b", "<", "c"]);
        assert_eq!(kinds("a != b"), vec!["a", "!=", "b"]);
    }

    #[test]
    fn lex_string_literals_both_quote_styles() {
        let tokens = lex(r#"name == "Mara" || name == 'Elba'"#).unwrap();
        assert!(matches!(&tokens[2].0, Token::Str(s) if s == "Mara"));
        assert!(matches!(&tokens[6].0, Token::Str(s) if s == "Elba"));
    }

    #[test]
    fn lex_float_literal() {
        let tokens = lex("0.5").unwrap();
        assert!(matches!(&tokens[0].0, Token::Number(n) if (*n - 0.5).abs() < f64::EPSILON));
    }

    #[test]
    fn lex_unexpected_character_fails() {
        assert!(lex("gold ≥ 3").is_err());
        assert!(lex("a = b").is_err());
    }

    #[test]
    fn lex_preserves_spans() {
        let tokens = lex("ab cd").unwrap();
        assert_eq!(tokens[0].1, 0..2);
        assert_eq!(tokens[1].1, 3..5);
    }

    #[test]
    fn lex_empty_source() {
        assert!(lex("").unwrap().is_empty());
        assert!(lex("   ").unwrap().is_empty());
    }
}
