//! Operator semantics over [`Value`].
//!
//! `&&` and `||` are short-circuited by the context before operands reach
//! this module; everything else is strict.

use lumen_core::Value;

use crate::ast::{BinaryOp, UnaryOp};
use crate::errors::{EvalError, EvalResult};

/// Apply an infix operator to two evaluated operands.
pub fn binary(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    match op {
        BinaryOp::Or => Ok(if left.is_truthy() {
            left.clone()
        } else {
            right.clone()
        }),
        BinaryOp::And => Ok(if left.is_truthy() {
            right.clone()
        } else {
            left.clone()
        }),
        BinaryOp::Eq => Ok(Value::Bool(left == right)),
        BinaryOp::NotEq => Ok(Value::Bool(left != right)),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => compare(op, left, right),
        BinaryOp::Add => add(left, right),
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod | BinaryOp::Pow => {
            arithmetic(op, left, right)
        }
    }
}

/// Apply a prefix operator.
pub fn unary(op: UnaryOp, operand: &Value) -> EvalResult {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
        UnaryOp::Neg => match operand {
            Value::Number(n) => Ok(Value::Number(-n)),
            other => Err(EvalError::evaluation(format!(
                "cannot negate {}",
                other.type_name()
            ))),
        },
    }
}

fn add(left: &Value, right: &Value) -> EvalResult {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
        (Value::Text(a), Value::Text(b)) => Ok(Value::Text(format!("{a}{b}"))),
        (Value::Sequence(a), Value::Sequence(b)) => {
            let mut out = a.clone();
            out.extend(b.iter().cloned());
            Ok(Value::Sequence(out))
        }
        (a, b) => Err(EvalError::evaluation(format!(
            "cannot add {} and {}",
            a.type_name(),
            b.type_name()
        ))),
    }
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    // Text repetition is the one non-numeric arithmetic shape.
    if let (BinaryOp::Mul, Value::Text(s), Value::Number(n)) = (op, left, right) {
        return repeat_text(s, *n);
    }
    let (Value::Number(a), Value::Number(b)) = (left, right) else {
        return Err(EvalError::evaluation(format!(
            "cannot apply `{}` to {} and {}",
            op.symbol(),
            left.type_name(),
            right.type_name()
        )));
    };
    match op {
        BinaryOp::Sub => Ok(Value::Number(a - b)),
        BinaryOp::Mul => Ok(Value::Number(a * b)),
        BinaryOp::Div => {
            if *b == 0.0 {
                Err(EvalError::evaluation("divided by 0"))
            } else {
                Ok(Value::Number(a / b))
            }
        }
        BinaryOp::Mod => {
            if *b == 0.0 {
                Err(EvalError::evaluation("divided by 0"))
            } else {
                Ok(Value::Number(a % b))
            }
        }
        BinaryOp::Pow => Ok(Value::Number(a.powf(*b))),
        other => Err(EvalError::evaluation(format!(
            "`{}` is not an arithmetic operator",
            other.symbol()
        ))),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn repeat_text(s: &str, count: f64) -> EvalResult {
    if count < 0.0 || count.fract() != 0.0 {
        return Err(EvalError::evaluation("negative or fractional repeat count"));
    }
    Ok(Value::Text(s.repeat(count as usize)))
}

fn compare(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    let ordering = match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        _ => None,
    };
    let Some(ordering) = ordering else {
        return Err(EvalError::evaluation(format!(
            "comparison of {} with {} failed",
            left.type_name(),
            right.type_name()
        )));
    };
    let result = match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::LtEq => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        BinaryOp::GtEq => ordering.is_ge(),
        other => {
            return Err(EvalError::evaluation(format!(
                "`{}` is not a comparison operator",
                other.symbol()
            )));
        }
    };
    Ok(Value::Bool(result))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
