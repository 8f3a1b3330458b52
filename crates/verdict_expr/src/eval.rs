//! Evaluation of parsed expressions.

use crate::error::ExprError;
use crate::parser::{CompareOp, Expr, parse};
use crate::value::Value;

/// Parse and evaluate a ground expression source string.
///
/// The boolean operators are strict: `&&`, `||`, and `!` fault on non-boolean
/// operands. Callers that need a boolean out of an arbitrary result coerce it
/// through [`Value::is_truthy`] instead.
///
/// # Errors
///
/// Returns an error for any lex, parse, or type fault. Evaluation itself
/// never panics.
pub fn evaluate(source: &str) -> Result<Value, ExprError> {
    let expr = parse(source)?;
    eval_expr(&expr)
}

fn eval_expr(expr: &Expr) -> Result<Value, ExprError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Not(inner) => match eval_expr(inner)? {
            Value::Bool(b) => Ok(Value::Bool(!b)),
            other => Err(ExprError::TypeMismatch {
                op: "!",
                lhs: other.type_name(),
                rhs: "bool",
            }),
        },
        Expr::And(lhs, rhs) => {
            // Short-circuit: the right side is not evaluated when the left
            // side already decides.
            if !eval_bool(lhs, "&&")? {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(eval_bool(rhs, "&&")?))
        }
        Expr::Or(lhs, rhs) => {
            if eval_bool(lhs, "||")? {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(eval_bool(rhs, "||")?))
        }
        Expr::Compare { op, lhs, rhs } => {
            let lhs = eval_expr(lhs)?;
            let rhs = eval_expr(rhs)?;
            eval_compare(*op, &lhs, &rhs)
        }
    }
}

fn eval_bool(expr: &Expr, op: &'static str) -> Result<bool, ExprError> {
    match eval_expr(expr)? {
        Value::Bool(b) => Ok(b),
        other => Err(ExprError::TypeMismatch {
            op,
            lhs: other.type_name(),
            rhs: "bool",
        }),
    }
}

fn eval_compare(op: CompareOp, lhs: &Value, rhs: &Value) -> Result<Value, ExprError> {
    let result = match op {
        CompareOp::Eq | CompareOp::Ne => {
            if lhs.type_name() != rhs.type_name() {
                return Err(mismatch(op, lhs, rhs));
            }
            let equal = lhs == rhs;
            if op == CompareOp::Eq { equal } else { !equal }
        }
        CompareOp::Lt | CompareOp::Le | CompareOp::Gt | CompareOp::Ge => {
            let ordering = match (lhs, rhs) {
                (Value::Int(l), Value::Int(r)) => l.cmp(r),
                (Value::Str(l), Value::Str(r)) => l.cmp(r),
                _ => return Err(mismatch(op, lhs, rhs)),
            };
            match op {
                CompareOp::Lt => ordering.is_lt(),
                CompareOp::Le => ordering.is_le(),
                CompareOp::Gt => ordering.is_gt(),
                CompareOp::Ge => ordering.is_ge(),
                CompareOp::Eq | CompareOp::Ne | CompareOp::In => {
                    return Err(mismatch(op, lhs, rhs));
                }
            }
        }
        CompareOp::In => match (lhs, rhs) {
            (needle, Value::List(haystack)) => haystack.contains(needle),
            (Value::Str(needle), Value::Str(haystack)) => haystack.contains(needle.as_str()),
            _ => return Err(mismatch(op, lhs, rhs)),
        },
    };
    Ok(Value::Bool(result))
}

fn mismatch(op: CompareOp, lhs: &Value, rhs: &Value) -> ExprError {
    ExprError::TypeMismatch {
        op: op.symbol(),
        lhs: lhs.type_name(),
        rhs: rhs.type_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_ok(source: &str) -> Value {
        evaluate(source).unwrap()
    }

    #[test]
    fn test_eval_literals() {
        assert_eq!(eval_ok("true"), Value::Bool(true));
        assert_eq!(eval_ok("42"), Value::Int(42));
        assert_eq!(eval_ok("\"abc\""), Value::from("abc"));
    }

    #[test]
    fn test_eval_equality() {
        assert_eq!(eval_ok("\"doctor\" == \"doctor\""), Value::Bool(true));
        assert_eq!(eval_ok("\"doctor\" == \"nurse\""), Value::Bool(false));
        assert_eq!(eval_ok("1 != 2"), Value::Bool(true));
    }

    #[test]
    fn test_eval_ordering() {
        assert_eq!(eval_ok("1 < 2"), Value::Bool(true));
        assert_eq!(eval_ok("2 <= 2"), Value::Bool(true));
        assert_eq!(eval_ok("3 > 4"), Value::Bool(false));
        assert_eq!(eval_ok("\"a\" < \"b\""), Value::Bool(true));
    }

    #[test]
    fn test_eval_boolean_operators() {
        assert_eq!(eval_ok("true && false"), Value::Bool(false));
        assert_eq!(eval_ok("true || false"), Value::Bool(true));
        assert_eq!(eval_ok("!false"), Value::Bool(true));
        assert_eq!(eval_ok("!(1 == 2)"), Value::Bool(true));
    }

    #[test]
    fn test_eval_membership_in_list() {
        assert_eq!(eval_ok("\"b\" in [\"a\", \"b\"]"), Value::Bool(true));
        assert_eq!(eval_ok("\"c\" in [\"a\", \"b\"]"), Value::Bool(false));
        assert_eq!(eval_ok("2 in [1, 2, 3]"), Value::Bool(true));
        assert_eq!(eval_ok("4 in []"), Value::Bool(false));
    }

    #[test]
    fn test_eval_substring_containment() {
        assert_eq!(eval_ok("\"ell\" in \"hello\""), Value::Bool(true));
        assert_eq!(eval_ok("\"xyz\" in \"hello\""), Value::Bool(false));
    }

    #[test]
    fn test_eval_cross_type_equality_faults() {
        assert!(matches!(
            evaluate("1 == \"1\"").unwrap_err(),
            ExprError::TypeMismatch { op: "==", .. }
        ));
    }

    #[test]
    fn test_eval_ordering_on_bools_faults() {
        assert!(matches!(
            evaluate("true < false").unwrap_err(),
            ExprError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn test_eval_membership_in_int_faults() {
        assert!(matches!(
            evaluate("1 in 2").unwrap_err(),
            ExprError::TypeMismatch { op: "in", .. }
        ));
    }

    #[test]
    fn test_eval_and_requires_bools() {
        assert!(matches!(
            evaluate("1 && true").unwrap_err(),
            ExprError::TypeMismatch { op: "&&", .. }
        ));
    }

    #[test]
    fn test_eval_short_circuit_skips_rhs_fault() {
        // The right side would fault, but the left side decides first.
        assert_eq!(eval_ok("false && (1 < \"a\")"), Value::Bool(false));
        assert_eq!(eval_ok("true || (1 < \"a\")"), Value::Bool(true));
    }

    #[test]
    fn test_eval_non_boolean_result_is_returned_as_is() {
        // Coercion to truthiness is the caller's decision.
        assert_eq!(eval_ok("[1, 2]"), Value::List(vec![
            Value::Int(1),
            Value::Int(2)
        ]));
    }

    #[test]
    fn test_eval_never_panics_on_garbage() {
        for source in ["", "((", "1 +", "== ==", "\"open", "a b c", "&&"] {
            assert!(evaluate(source).is_err());
        }
    }

    #[test]
    fn test_eval_list_equality() {
        assert_eq!(eval_ok("[1, 2] == [1, 2]"), Value::Bool(true));
        assert_eq!(eval_ok("[1, 2] == [2, 1]"), Value::Bool(false));
    }

    use proptest::prelude::*;

    fn any_scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Int),
            "[ -~]{0,16}".prop_map(Value::Str),
        ]
    }

    proptest! {
        // Display renders parseable literals, so a rendered value evaluates
        // back to itself. The bridge relies on this when substituting
        // attribute values into templates.
        #[test]
        fn prop_rendered_values_roundtrip(value in any_scalar()) {
            prop_assert_eq!(evaluate(&value.to_string()).unwrap(), value);
        }

        #[test]
        fn prop_rendered_lists_roundtrip(
            values in proptest::collection::vec(any_scalar(), 0..4)
        ) {
            let list = Value::List(values);
            prop_assert_eq!(evaluate(&list.to_string()).unwrap(), list);
        }

        #[test]
        fn prop_membership_of_rendered_element(
            values in proptest::collection::vec(any_scalar(), 1..4),
            index in 0usize..3
        ) {
            let needle = values[index % values.len()].clone();
            let source = format!("{} in {}", needle, Value::List(values));
            prop_assert_eq!(evaluate(&source).unwrap(), Value::Bool(true));
        }
    }
}
