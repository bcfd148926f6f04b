//! Scalar variant type for options and attribute maps.
//!
//! Construction options and node metadata are key/value maps whose values
//! come from a small closed set of scalars. Keeping the set closed keeps
//! filtering and serialization well-typed without losing the flexibility of
//! a free-form dictionary.

use serde::{Deserialize, Serialize};

/// One scalar value in an options or attribute map.
///
/// Serializes untagged, so JSON stays the plain
/// `{"channels": 6, "role": "sidecar", "hidden": false}` shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    /// Boolean flag.
    Bool(bool),
    /// Numeric value. All numbers are carried as `f64`.
    Num(f64),
    /// String value.
    Str(String),
}

impl ScalarValue {
    /// Returns the numeric value, if this is a number.
    pub fn as_num(&self) -> Option<f64> {
        match self {
            ScalarValue::Num(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string value, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScalarValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        ScalarValue::Num(v)
    }
}

impl From<u32> for ScalarValue {
    fn from(v: u32) -> Self {
        ScalarValue::Num(f64::from(v))
    }
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        ScalarValue::Bool(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::Str(v.to_owned())
    }
}

impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        ScalarValue::Str(v)
    }
}
