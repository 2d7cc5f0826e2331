//! Typed table cells.

use serde::{Deserialize, Serialize};

/// A single cell of a case table: integer, float or string.
///
/// Numeric tokens are narrowed to [`Value::Int`] whenever the parsed float has
/// no fractional part, so `100`, `100.0` and `100,0` all read as `Int(100)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
}

// 2^63 as f64; anything at or beyond stays a float.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

impl Value {
    /// Numeric-else-string inference for one source token.
    ///
    /// `,` is accepted as an alternate decimal separator.
    pub fn infer(token: &str) -> Value {
        let normalized = token.replace(',', ".");
        match normalized.parse::<f64>() {
            Ok(f) => Value::from_f64(f),
            Err(_) => Value::Str(token.to_string()),
        }
    }

    /// Narrow a float to an integer when it has no fractional part.
    pub fn from_f64(f: f64) -> Value {
        if f.is_finite() && f.fract() == 0.0 && f.abs() < I64_BOUND {
            Value::Int(f as i64)
        } else {
            Value::Float(f)
        }
    }

    pub fn nan() -> Value {
        Value::Float(f64::NAN)
    }

    /// Numeric view of the cell; strings yield `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Str(_) => None,
        }
    }

    /// Integer view of the cell. Floats qualify only when integral.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < I64_BOUND => {
                Some(*f as i64)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Float(f) if f.is_nan())
    }

    /// Cell equality that treats two NaNs as equal.
    pub fn same(&self, other: &Value) -> bool {
        (self.is_nan() && other.is_nan()) || self == other
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

/// One parsed row of a field.
pub type Row = Vec<Value>;
