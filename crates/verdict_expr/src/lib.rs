//! VERDICT.GATE Safe Expression Evaluator
//!
//! Evaluates ground boolean expressions over a fixed, enumerated operator
//! set: equality and ordering comparisons, boolean and/or/not, and membership
//! tests. Expressions are ground: every operand is a literal, so there are no
//! identifiers, no function calls, and no access to ambient state. Any lex,
//! parse, or evaluation fault is a returned error value, never a panic.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod value;

// Re-exports
pub use error::ExprError;
pub use eval::evaluate;
pub use lexer::{Spanned, Token, tokenize};
pub use parser::{CompareOp, Expr, parse};
pub use value::Value;
