//! Operator semantics over runtime values.
//!
//! Integer arithmetic is checked. Division of two integers stays an integer
//! only when it is exact; otherwise the quotient is a decimal. Modulo
//! truncates toward zero for both kinds, so the result takes the sign of the
//! dividend.

use std::cmp::Ordering;

use crate::ast::{BinaryOp, Span};
use crate::error::RuntimeError;
use crate::interpreter::value::Value;

/// Apply a binary operator to two already evaluated operands.
///
/// The logical operators are accepted for completeness and combine the
/// operands' truthiness; the interpreter short-circuits them before getting
/// here.
pub fn evaluate_binary(
    op: BinaryOp,
    left: Value,
    right: Value,
    span: Span,
) -> Result<Value, RuntimeError> {
    match op {
        BinaryOp::Addition
        | BinaryOp::Subtraction
        | BinaryOp::Multiplication
        | BinaryOp::Division
        | BinaryOp::Modulo => arithmetic(op, left, right, span),
        BinaryOp::Equality => Ok(Value::Bool(left.is_equal(&right))),
        BinaryOp::Inequality => Ok(Value::Bool(!left.is_equal(&right))),
        BinaryOp::GreaterThan
        | BinaryOp::LessThan
        | BinaryOp::GreaterOrEqual
        | BinaryOp::LessOrEqual => compare(op, &left, &right, span),
        BinaryOp::LogicalAnd => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
        BinaryOp::LogicalOr => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
    }
}

fn arithmetic(op: BinaryOp, left: Value, right: Value, span: Span) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => integer_arithmetic(op, a, b, span),
        (Value::Str(a), Value::Str(b)) if op == BinaryOp::Addition => Ok(Value::Str(a + &b)),
        (left, right) => match (left.as_decimal(), right.as_decimal()) {
            (Some(a), Some(b)) => decimal_arithmetic(op, a, b, span),
            _ => Err(operand_mismatch(op, &left, &right, span)),
        },
    }
}

fn integer_arithmetic(op: BinaryOp, a: i64, b: i64, span: Span) -> Result<Value, RuntimeError> {
    let checked = |result: Option<i64>, operation: &'static str| {
        result
            .map(Value::Integer)
            .ok_or_else(|| RuntimeError::integer_overflow(operation, span))
    };
    match op {
        BinaryOp::Addition => checked(a.checked_add(b), "addition"),
        BinaryOp::Subtraction => checked(a.checked_sub(b), "subtraction"),
        BinaryOp::Multiplication => checked(a.checked_mul(b), "multiplication"),
        BinaryOp::Division => {
            if b == 0 {
                return Err(RuntimeError::division_by_zero(span));
            }
            if a.wrapping_rem(b) == 0 {
                checked(a.checked_div(b), "division")
            } else {
                Ok(Value::Decimal(a as f64 / b as f64))
            }
        }
        BinaryOp::Modulo => {
            if b == 0 {
                return Err(RuntimeError::division_by_zero(span));
            }
            Ok(Value::Integer(a.wrapping_rem(b)))
        }
        _ => unreachable!("{op} is not an arithmetic operator"),
    }
}

fn decimal_arithmetic(op: BinaryOp, a: f64, b: f64, span: Span) -> Result<Value, RuntimeError> {
    let result = match op {
        BinaryOp::Addition => a + b,
        BinaryOp::Subtraction => a - b,
        BinaryOp::Multiplication => a * b,
        BinaryOp::Division | BinaryOp::Modulo if b == 0.0 => {
            return Err(RuntimeError::division_by_zero(span));
        }
        BinaryOp::Division => a / b,
        BinaryOp::Modulo => a % b,
        _ => unreachable!("{op} is not an arithmetic operator"),
    };
    Ok(Value::Decimal(result))
}

fn compare(op: BinaryOp, left: &Value, right: &Value, span: Span) -> Result<Value, RuntimeError> {
    // NaN is unordered, so every ordering comparison with it is false
    let holds = order_values(op, left, right, span)?.is_some_and(|ord| match op {
        BinaryOp::GreaterThan => ord == Ordering::Greater,
        BinaryOp::LessThan => ord == Ordering::Less,
        BinaryOp::GreaterOrEqual => ord != Ordering::Less,
        BinaryOp::LessOrEqual => ord != Ordering::Greater,
        _ => unreachable!("{op} is not an ordering operator"),
    });
    Ok(Value::Bool(holds))
}

/// Order two values of compatible kinds. Lists order lexicographically by
/// element, a shorter prefix first.
fn order_values(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    span: Span,
) -> Result<Option<Ordering>, RuntimeError> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
        (Value::Bool(a), Value::Bool(b)) => Ok(Some(a.cmp(b))),
        (Value::Null, Value::Null) => Ok(Some(Ordering::Equal)),
        (Value::List(a), Value::List(b)) => {
            for (x, y) in a.iter().zip(b) {
                match order_values(op, x, y, span)? {
                    Some(Ordering::Equal) => {}
                    other => return Ok(other),
                }
            }
            Ok(Some(a.len().cmp(&b.len())))
        }
        (a, b) if a.is_numeric() && b.is_numeric() => Ok(a.numeric_cmp(b)),
        _ => Err(operand_mismatch(op, left, right, span)),
    }
}

pub fn negate(value: Value, span: Span) -> Result<Value, RuntimeError> {
    match value {
        Value::Integer(n) => n
            .checked_neg()
            .map(Value::Integer)
            .ok_or_else(|| RuntimeError::integer_overflow("negation", span)),
        Value::Decimal(n) => Ok(Value::Decimal(-n)),
        other => Err(RuntimeError::type_mismatch(
            format!("cannot negate a {}", other.kind_name()),
            span,
        )),
    }
}

/// Add `delta` to a numeric value, as done by `++` and `--`.
pub fn offset(value: &Value, delta: i64, span: Span) -> Result<Value, RuntimeError> {
    match value {
        Value::Integer(n) => n
            .checked_add(delta)
            .map(Value::Integer)
            .ok_or_else(|| RuntimeError::integer_overflow("increment", span)),
        Value::Decimal(n) => Ok(Value::Decimal(n + delta as f64)),
        other => Err(RuntimeError::type_mismatch(
            format!("cannot increment or decrement a {}", other.kind_name()),
            span,
        )),
    }
}

fn operand_mismatch(op: BinaryOp, left: &Value, right: &Value, span: Span) -> RuntimeError {
    RuntimeError::type_mismatch(
        format!(
            "cannot apply '{op}' to {} and {}",
            left.kind_name(),
            right.kind_name()
        ),
        span,
    )
}
