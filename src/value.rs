//! Typed setting values and the codec between them and their stored form
//!
//! Settings are persisted as a raw string plus a [`ValueType`] tag. This module
//! converts in both directions:
//!
//! - [`encode`] turns a [`SettingValue`] into `(raw, tag)`
//! - [`decode`] turns `(raw, tag)` back into a [`SettingValue`]
//! - [`validate`] is the strict pre-save check applied by every store
//!
//! Boolean decoding is lenient (anything other than a case-insensitive
//! `"true"` reads as `false`) while validation only accepts `"true"` or
//! `"false"`. Both behaviours are kept as they are.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Type tag stored alongside every raw setting value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Boolean
    Bool,
    /// 64-bit float
    Float,
    /// 64-bit signed integer
    Int,
    /// Plain string (default)
    #[default]
    Str,
}

impl ValueType {
    /// Short name used in storage (`bool`, `float`, `int`, `str`)
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::Float => "float",
            ValueType::Int => "int",
            ValueType::Str => "str",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bool" => Ok(ValueType::Bool),
            "float" => Ok(ValueType::Float),
            "int" => Ok(ValueType::Int),
            "str" => Ok(ValueType::Str),
            other => Err(Error::UnsupportedType {
                type_name: other.to_string(),
            }),
        }
    }
}

/// A decoded setting value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum SettingValue {
    Bool(bool),
    Float(f64),
    Int(i64),
    Str(String),
}

impl SettingValue {
    /// The tag this value is stored under
    pub fn value_type(&self) -> ValueType {
        match self {
            SettingValue::Bool(_) => ValueType::Bool,
            SettingValue::Float(_) => ValueType::Float,
            SettingValue::Int(_) => ValueType::Int,
            SettingValue::Str(_) => ValueType::Str,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view. Floats are not truncated.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SettingValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Float view. Integers widen to `f64`.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SettingValue::Float(n) => Some(*n),
            SettingValue::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Plain JSON form (`true`, `1.5`, `3`, `"text"`) for serde-based retrieval.
    ///
    /// Non-finite floats become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            SettingValue::Bool(b) => Value::Bool(*b),
            SettingValue::Float(n) => Value::from(*n),
            SettingValue::Int(n) => Value::from(*n),
            SettingValue::Str(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self).0)
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        SettingValue::Float(value)
    }
}

impl From<f32> for SettingValue {
    fn from(value: f32) -> Self {
        SettingValue::Float(f64::from(value))
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Int(value)
    }
}

impl From<i32> for SettingValue {
    fn from(value: i32) -> Self {
        SettingValue::Int(i64::from(value))
    }
}

impl From<u32> for SettingValue {
    fn from(value: u32) -> Self {
        SettingValue::Int(i64::from(value))
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Str(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Str(value.to_string())
    }
}

impl TryFrom<Value> for SettingValue {
    type Error = Error;

    /// Accepts JSON booleans, numbers and strings.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedType` for `null`, arrays and objects.
    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(SettingValue::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(SettingValue::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(SettingValue::Float(f))
                } else {
                    Err(Error::UnsupportedType {
                        type_name: format!("number {n}"),
                    })
                }
            }
            Value::String(s) => Ok(SettingValue::Str(s)),
            Value::Null => Err(Error::UnsupportedType {
                type_name: "null".into(),
            }),
            Value::Array(_) => Err(Error::UnsupportedType {
                type_name: "array".into(),
            }),
            Value::Object(_) => Err(Error::UnsupportedType {
                type_name: "object".into(),
            }),
        }
    }
}

// =============================================================================
// Codec
// =============================================================================

/// Serialize a value into its stored `(raw, tag)` form.
///
/// Floats keep a fractional part or exponent (`1.0`, `1e20`) so that the raw
/// text always reads back as a float.
pub fn encode(value: &SettingValue) -> (String, ValueType) {
    let raw = match value {
        SettingValue::Bool(b) => b.to_string(),
        SettingValue::Float(n) => format!("{n:?}"),
        SettingValue::Int(n) => n.to_string(),
        SettingValue::Str(s) => s.clone(),
    };
    (raw, value.value_type())
}

/// Convert a stored raw string back into a typed value.
///
/// # Errors
///
/// Returns `Error::InvalidValue` when a float or integer does not parse.
pub fn decode(raw: &str, value_type: ValueType) -> Result<SettingValue> {
    match value_type {
        ValueType::Bool => Ok(SettingValue::Bool(raw.eq_ignore_ascii_case("true"))),
        ValueType::Float => raw
            .trim()
            .parse::<f64>()
            .map(SettingValue::Float)
            .map_err(|e| invalid(raw, value_type, &e)),
        ValueType::Int => raw
            .trim()
            .parse::<i64>()
            .map(SettingValue::Int)
            .map_err(|e| invalid(raw, value_type, &e)),
        ValueType::Str => Ok(SettingValue::Str(raw.to_string())),
    }
}

/// Strict check run before a raw value is persisted.
///
/// # Errors
///
/// Returns `Error::Validation` naming `key` when:
/// - a boolean is not `true`/`false` (case-insensitive)
/// - a float or integer does not parse
pub fn validate(key: &str, raw: &str, value_type: ValueType) -> Result<()> {
    let reason = match value_type {
        ValueType::Bool => {
            if raw.eq_ignore_ascii_case("true") || raw.eq_ignore_ascii_case("false") {
                return Ok(());
            }
            "For boolean type available case-insensitive values: true, false"
        }
        ValueType::Float => {
            if raw.trim().parse::<f64>().is_ok() {
                return Ok(());
            }
            "Incorrect float value"
        }
        ValueType::Int => {
            if raw.trim().parse::<i64>().is_ok() {
                return Ok(());
            }
            "Incorrect integer value"
        }
        ValueType::Str => return Ok(()),
    };

    Err(Error::Validation {
        key: key.to_string(),
        reason: reason.to_string(),
    })
}

fn invalid(raw: &str, value_type: ValueType, err: &dyn fmt::Display) -> Error {
    Error::InvalidValue {
        value_type: value_type.to_string(),
        raw: raw.to_string(),
        reason: err.to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================
