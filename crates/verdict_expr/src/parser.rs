//! Recursive descent parser for the expression grammar.
//!
//! ```text
//! expr       := or
//! or         := and ("||" and)*
//! and        := unary ("&&" unary)*
//! unary      := "!" unary | comparison
//! comparison := primary (("=="|"!="|"<"|"<="|">"|">="|"in") primary)?
//! primary    := "true" | "false" | int | string | list | "(" expr ")"
//! list       := "[" (primary ("," primary)*)? "]"
//! ```

use crate::error::ExprError;
use crate::lexer::{Spanned, Token, tokenize};
use crate::value::Value;

/// Nesting bound; deeper expressions are rejected rather than risking the
/// evaluator's stack.
const MAX_DEPTH: usize = 128;

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
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
    /// `in` membership / containment
    In,
}

impl CompareOp {
    /// Source form of the operator, for diagnostics
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::In => "in",
        }
    }
}

/// Parsed expression tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A literal value
    Literal(Value),
    /// Logical negation
    Not(Box<Expr>),
    /// Short-circuit conjunction
    And(Box<Expr>, Box<Expr>),
    /// Short-circuit disjunction
    Or(Box<Expr>, Box<Expr>),
    /// Binary comparison
    Compare {
        /// The operator
        op: CompareOp,
        /// Left operand
        lhs: Box<Expr>,
        /// Right operand
        rhs: Box<Expr>,
    },
}

/// Parse an expression source string into a tree
///
/// # Errors
///
/// Returns an error when tokenization fails, the token stream does not fit
/// the grammar, input remains after a complete expression, or nesting
/// exceeds the depth bound.
pub fn parse(source: &str) -> Result<Expr, ExprError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expr(0)?;
    if let Some(spanned) = parser.peek() {
        return Err(ExprError::TrailingInput {
            offset: spanned.offset,
        });
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let spanned = self.tokens.get(self.pos).cloned();
        if spanned.is_some() {
            self.pos += 1;
        }
        spanned
    }

    fn expect(&mut self, token: &Token) -> Result<(), ExprError> {
        match self.advance() {
            Some(spanned) if spanned.token == *token => Ok(()),
            Some(spanned) => Err(ExprError::UnexpectedToken {
                found: spanned.token.to_string(),
                offset: spanned.offset,
            }),
            None => Err(ExprError::UnexpectedEnd),
        }
    }

    fn expr(&mut self, depth: usize) -> Result<Expr, ExprError> {
        if depth > MAX_DEPTH {
            return Err(ExprError::TooDeep);
        }
        self.or(depth)
    }

    fn or(&mut self, depth: usize) -> Result<Expr, ExprError> {
        let mut lhs = self.and(depth)?;
        while matches!(self.peek(), Some(s) if s.token == Token::OrOr) {
            self.pos += 1;
            let rhs = self.and(depth)?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and(&mut self, depth: usize) -> Result<Expr, ExprError> {
        let mut lhs = self.unary(depth)?;
        while matches!(self.peek(), Some(s) if s.token == Token::AndAnd) {
            self.pos += 1;
            let rhs = self.unary(depth)?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self, depth: usize) -> Result<Expr, ExprError> {
        if depth > MAX_DEPTH {
            return Err(ExprError::TooDeep);
        }
        if matches!(self.peek(), Some(s) if s.token == Token::Bang) {
            self.pos += 1;
            let inner = self.unary(depth + 1)?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.comparison(depth)
    }

    fn comparison(&mut self, depth: usize) -> Result<Expr, ExprError> {
        let lhs = self.primary(depth)?;
        let op = match self.peek().map(|s| &s.token) {
            Some(Token::EqEq) => CompareOp::Eq,
            Some(Token::NotEq) => CompareOp::Ne,
            Some(Token::Lt) => CompareOp::Lt,
            Some(Token::Le) => CompareOp::Le,
            Some(Token::Gt) => CompareOp::Gt,
            Some(Token::Ge) => CompareOp::Ge,
            Some(Token::In) => CompareOp::In,
            _ => return Ok(lhs),
        };
        self.pos += 1;
        let rhs = self.primary(depth)?;
        Ok(Expr::Compare {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    fn primary(&mut self, depth: usize) -> Result<Expr, ExprError> {
        match self.advance() {
            Some(spanned) => match spanned.token {
                Token::True => Ok(Expr::Literal(Value::Bool(true))),
                Token::False => Ok(Expr::Literal(Value::Bool(false))),
                Token::Int(n) => Ok(Expr::Literal(Value::Int(n))),
                Token::Str(s) => Ok(Expr::Literal(Value::Str(s))),
                Token::LParen => {
                    let inner = self.expr(depth + 1)?;
                    self.expect(&Token::RParen)?;
                    Ok(inner)
                }
                Token::LBracket => Ok(Expr::Literal(self.list(depth)?)),
                token => Err(ExprError::UnexpectedToken {
                    found: token.to_string(),
                    offset: spanned.offset,
                }),
            },
            None => Err(ExprError::UnexpectedEnd),
        }
    }

    // List elements are literals only: scalars or nested lists.
    fn list(&mut self, depth: usize) -> Result<Value, ExprError> {
        if depth > MAX_DEPTH {
            return Err(ExprError::TooDeep);
        }
        let mut elements = Vec::new();
        if matches!(self.peek(), Some(s) if s.token == Token::RBracket) {
            self.pos += 1;
            return Ok(Value::List(elements));
        }
        loop {
            match self.advance() {
                Some(spanned) => match spanned.token {
                    Token::True => elements.push(Value::Bool(true)),
                    Token::False => elements.push(Value::Bool(false)),
                    Token::Int(n) => elements.push(Value::Int(n)),
                    Token::Str(s) => elements.push(Value::Str(s)),
                    Token::LBracket => elements.push(self.list(depth + 1)?),
                    token => {
                        return Err(ExprError::UnexpectedToken {
                            found: token.to_string(),
                            offset: spanned.offset,
                        });
                    }
                },
                None => return Err(ExprError::UnexpectedEnd),
            }
            match self.advance() {
                Some(spanned) if spanned.token == Token::Comma => {}
                Some(spanned) if spanned.token == Token::RBracket => {
                    return Ok(Value::List(elements));
                }
                Some(spanned) => {
                    return Err(ExprError::UnexpectedToken {
                        found: spanned.token.to_string(),
                        offset: spanned.offset,
                    });
                }
                None => return Err(ExprError::UnexpectedEnd),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_literal() {
        assert_eq!(parse("true").unwrap(), Expr::Literal(Value::Bool(true)));
    }

    #[test]
    fn test_parse_comparison() {
        let expr = parse("\"doctor\" == \"doctor\"").unwrap();
        assert_eq!(expr, Expr::Compare {
            op: CompareOp::Eq,
            lhs: Box::new(Expr::Literal(Value::from("doctor"))),
            rhs: Box::new(Expr::Literal(Value::from("doctor"))),
        });
    }

    #[test]
    fn test_parse_precedence_and_over_or() {
        // a || b && c parses as a || (b && c)
        let expr = parse("true || false && false").unwrap();
        match expr {
            Expr::Or(lhs, rhs) => {
                assert_eq!(*lhs, Expr::Literal(Value::Bool(true)));
                assert!(matches!(*rhs, Expr::And(_, _)));
            }
            other => panic!("expected Or at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_not_binds_tighter_than_and() {
        let expr = parse("!true && false").unwrap();
        match expr {
            Expr::And(lhs, _) => assert!(matches!(*lhs, Expr::Not(_))),
            other => panic!("expected And at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_double_negation() {
        let expr = parse("!!false").unwrap();
        assert!(matches!(expr, Expr::Not(_)));
    }

    #[test]
    fn test_parse_parenthesized() {
        let expr = parse("(true || false) && true").unwrap();
        assert!(matches!(expr, Expr::And(_, _)));
    }

    #[test]
    fn test_parse_membership() {
        let expr = parse("\"a\" in [\"a\", \"b\"]").unwrap();
        match expr {
            Expr::Compare { op, rhs, .. } => {
                assert_eq!(op, CompareOp::In);
                assert_eq!(
                    *rhs,
                    Expr::Literal(Value::List(vec![Value::from("a"), Value::from("b")]))
                );
            }
            other => panic!("expected Compare, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_list() {
        let expr = parse("1 in []").unwrap();
        match expr {
            Expr::Compare { rhs, .. } => {
                assert_eq!(*rhs, Expr::Literal(Value::List(Vec::new())));
            }
            other => panic!("expected Compare, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_input() {
        assert_eq!(parse("").unwrap_err(), ExprError::UnexpectedEnd);
        assert_eq!(parse("   ").unwrap_err(), ExprError::UnexpectedEnd);
    }

    #[test]
    fn test_parse_trailing_input() {
        assert!(matches!(
            parse("true false").unwrap_err(),
            ExprError::TrailingInput { .. }
        ));
    }

    #[test]
    fn test_parse_unbalanced_paren() {
        assert_eq!(parse("(true").unwrap_err(), ExprError::UnexpectedEnd);
    }

    #[test]
    fn test_parse_chained_comparison_rejected() {
        // Comparisons do not associate; 1 < 2 < 3 is a grammar error.
        assert!(matches!(
            parse("1 < 2 < 3").unwrap_err(),
            ExprError::TrailingInput { .. }
        ));
    }

    #[test]
    fn test_parse_depth_bound() {
        let mut source = String::new();
        for _ in 0..200 {
            source.push('(');
        }
        source.push_str("true");
        for _ in 0..200 {
            source.push(')');
        }
        assert_eq!(parse(&source).unwrap_err(), ExprError::TooDeep);
    }

    #[test]
    fn test_parse_deep_but_within_bound() {
        let mut source = String::new();
        for _ in 0..100 {
            source.push('(');
        }
        source.push_str("true");
        for _ in 0..100 {
            source.push(')');
        }
        assert!(parse(&source).is_ok());
    }
}
