use std::cmp::Ordering;
use std::fmt;

use crate::ast::{LiteralValue, TypeTag};

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Integer(i64),
    Decimal(f64),
    Str(String),
    Bool(bool),
    Null,
    List(Vec<Value>),
}

impl Value {
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Integer(n) => *n != 0,
            Self::Decimal(n) => *n != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::List(items) => !items.is_empty(),
        }
    }

    /// Language-level equality. Integers and decimals compare numerically;
    /// any other mismatch of kinds is simply unequal.
    pub fn is_equal(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.is_equal(y))
            }
            (a, b) if a.is_numeric() && b.is_numeric() => {
                a.numeric_cmp(b) == Some(Ordering::Equal)
            }
            _ => false,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Decimal(_))
    }

    /// Order two numbers exactly, without rounding large integers through
    /// `f64`. `None` when either side is NaN or not a number.
    pub fn numeric_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Decimal(a), Self::Decimal(b)) => a.partial_cmp(b),
            (Self::Integer(a), Self::Decimal(b)) => cmp_integer_decimal(*a, *b),
            (Self::Decimal(a), Self::Integer(b)) => {
                cmp_integer_decimal(*b, *a).map(Ordering::reverse)
            }
            _ => None,
        }
    }

    /// Numeric value promoted to a decimal, `None` for non-numeric kinds.
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Decimal(n) => Some(*n),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Decimal(_) => "decimal",
            Self::Str(_) => "string",
            Self::Bool(_) => "boolean",
            Self::Null => "null",
            Self::List(_) => "list",
        }
    }

    /// Check the value against a declared parameter type, promoting integers
    /// where a decimal is expected.
    pub fn coerce_to(self, ty: TypeTag) -> Option<Self> {
        match (ty, self) {
            (TypeTag::Any, v) => Some(v),
            (TypeTag::Integer, v @ Self::Integer(_)) => Some(v),
            (TypeTag::Decimal, Self::Integer(n)) => Some(Self::Decimal(n as f64)),
            (TypeTag::Decimal, v @ Self::Decimal(_)) => Some(v),
            (TypeTag::String, v @ Self::Str(_)) => Some(v),
            (TypeTag::Boolean, v @ Self::Bool(_)) => Some(v),
            (TypeTag::List, v @ Self::List(_)) => Some(v),
            _ => None,
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s:?}"),
            other => write!(f, "{other}"),
        }
    }
}

fn cmp_integer_decimal(int: i64, dec: f64) -> Option<Ordering> {
    // 2^63, exactly representable
    const BOUND: f64 = 9_223_372_036_854_775_808.0;
    if dec.is_nan() {
        return None;
    }
    if dec >= BOUND {
        return Some(Ordering::Less);
    }
    if dec < -BOUND {
        return Some(Ordering::Greater);
    }
    let whole = dec.trunc();
    match int.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(dec - whole)),
        ord => Some(ord),
    }
}

impl From<&LiteralValue> for Value {
    fn from(literal: &LiteralValue) -> Self {
        match literal {
            LiteralValue::Integer(n) => Self::Integer(*n),
            LiteralValue::Decimal(n) => Self::Decimal(*n),
            LiteralValue::String(s) => Self::Str(s.clone()),
            LiteralValue::Bool(b) => Self::Bool(*b),
            LiteralValue::Null => Self::Null,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Decimal(n) => {
                // keep a trailing ".0" so decimals stay distinguishable from integers
                if n.is_finite() && n.fract() == 0.0 {
                    write!(f, "{n:.1}")
                } else {
                    write!(f, "{n}")
                }
            }
            Self::Str(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Null => write!(f, "null"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.fmt_nested(f)?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Value::Null, false)]
    #[case(Value::Bool(false), false)]
    #[case(Value::Bool(true), true)]
    #[case(Value::Integer(0), false)]
    #[case(Value::Integer(-3), true)]
    #[case(Value::Decimal(0.0), false)]
    #[case(Value::Decimal(0.5), true)]
    #[case(Value::Str(String::new()), false)]
    #[case(Value::Str("a".into()), true)]
    #[case(Value::List(vec![]), false)]
    #[case(Value::List(vec![Value::Null]), true)]
    fn truthiness(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(value.is_truthy(), expected);
    }

    #[rstest]
    #[case(Value::Integer(42), "42")]
    #[case(Value::Decimal(2.0), "2.0")]
    #[case(Value::Decimal(2.5), "2.5")]
    #[case(Value::Decimal(-0.25), "-0.25")]
    #[case(Value::Str("hi".into()), "hi")]
    #[case(Value::Bool(true), "true")]
    #[case(Value::Null, "null")]
    #[case(
        Value::List(vec![Value::Integer(1), Value::Str("a".into()), Value::List(vec![])]),
        "[1, \"a\", []]"
    )]
    fn display(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(value.to_string(), expected);
    }

    #[test]
    fn mixed_numeric_equality() {
        assert!(Value::Integer(2).is_equal(&Value::Decimal(2.0)));
        assert!(!Value::Integer(2).is_equal(&Value::Decimal(2.5)));
    }

    #[rstest]
    #[case(Value::Integer(9_007_199_254_740_993), Value::Decimal(9_007_199_254_740_992.0), Some(Ordering::Greater))]
    #[case(Value::Decimal(2.5), Value::Integer(2), Some(Ordering::Greater))]
    #[case(Value::Integer(-3), Value::Decimal(-2.5), Some(Ordering::Less))]
    #[case(Value::Integer(i64::MAX), Value::Decimal(f64::INFINITY), Some(Ordering::Less))]
    #[case(Value::Integer(i64::MIN), Value::Decimal(-9_223_372_036_854_775_808.0), Some(Ordering::Equal))]
    #[case(Value::Integer(1), Value::Decimal(f64::NAN), None)]
    #[case(Value::Integer(1), Value::Str("1".into()), None)]
    fn numeric_ordering_is_exact(
        #[case] left: Value,
        #[case] right: Value,
        #[case] expected: Option<Ordering>,
    ) {
        assert_eq!(left.numeric_cmp(&right), expected);
    }

    #[test]
    fn large_integers_are_not_rounded_for_equality() {
        let big = Value::Integer(9_007_199_254_740_993);
        assert!(!big.is_equal(&Value::Decimal(9_007_199_254_740_992.0)));
        assert!(Value::Decimal(9_007_199_254_740_992.0).is_equal(&Value::Integer(9_007_199_254_740_992)));
    }

    #[test]
    fn mismatched_kinds_are_unequal() {
        assert!(!Value::Integer(1).is_equal(&Value::Str("1".into())));
        assert!(!Value::Null.is_equal(&Value::Bool(false)));
        assert!(!Value::List(vec![]).is_equal(&Value::Null));
    }

    #[test]
    fn lists_compare_elementwise() {
        let a = Value::List(vec![Value::Integer(1), Value::Decimal(2.0)]);
        let b = Value::List(vec![Value::Decimal(1.0), Value::Integer(2)]);
        assert!(a.is_equal(&b));
        assert!(!a.is_equal(&Value::List(vec![Value::Integer(1)])));
    }

    #[rstest]
    #[case(TypeTag::Any, Value::Null, Some(Value::Null))]
    #[case(TypeTag::Integer, Value::Integer(3), Some(Value::Integer(3)))]
    #[case(TypeTag::Integer, Value::Decimal(3.0), None)]
    #[case(TypeTag::Decimal, Value::Integer(3), Some(Value::Decimal(3.0)))]
    #[case(TypeTag::String, Value::Str("s".into()), Some(Value::Str("s".into())))]
    #[case(TypeTag::String, Value::Integer(1), None)]
    #[case(TypeTag::Boolean, Value::Bool(false), Some(Value::Bool(false)))]
    #[case(TypeTag::List, Value::Null, None)]
    fn coercion(#[case] ty: TypeTag, #[case] value: Value, #[case] expected: Option<Value>) {
        assert_eq!(value.coerce_to(ty), expected);
    }
}
