//! Value module for docquery
//!
//! This module defines the Value enum, the payload carried by constant
//! nodes of an expression tree.

use std::fmt;
use serde_json::Value as JsonValue;

/// The different kinds of constants an expression can carry
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
    /// Enum constant, lowered by its symbolic name
    Enum {
        type_name: String,
        variant: String,
        ordinal: u32,
    },
    /// Collection of values
    List(Vec<Value>),
}

impl Value {
    /// Create an enum constant
    pub fn enumeration(type_name: impl Into<String>, variant: impl Into<String>, ordinal: u32) -> Self {
        Value::Enum {
            type_name: type_name.into(),
            variant: variant.into(),
            ordinal,
        }
    }

    /// Get the integer if this is an integer value
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the elements if this is a collection
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get a string representation of the value's type
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Enum { .. } => "enum",
            Value::List(_) => "list",
        }
    }

    /// Plain text form, used when a constant is spliced into a field name
    /// or a regular expression.
    ///
    /// Only scalars have one; `None` for null and lists.
    pub fn to_literal(&self) -> Option<String> {
        match self {
            Value::Null | Value::List(_) => None,
            Value::String(s) => Some(s.clone()),
            Value::Enum { variant, .. } => Some(variant.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Lower the value into its wire representation
    ///
    /// `None` if the value, or any element of a list, is a NaN or infinite
    /// float, which have no wire form.
    pub fn to_json(&self) -> Option<JsonValue> {
        match self {
            Value::Null => Some(JsonValue::Null),
            Value::Boolean(b) => Some(JsonValue::Bool(*b)),
            Value::Integer(i) => Some(JsonValue::from(*i)),
            Value::Float(f) => serde_json::Number::from_f64(*f).map(JsonValue::Number),
            Value::String(s) => Some(JsonValue::String(s.clone())),
            Value::Enum { variant, .. } => Some(JsonValue::String(variant.clone())),
            Value::List(items) => items
                .iter()
                .map(Value::to_json)
                .collect::<Option<Vec<_>>>()
                .map(JsonValue::Array),
        }
    }
}

/// Format a Value as a string
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Enum { type_name, variant, .. } => write!(f, "{}::{}", type_name, variant),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Convert from common types to Value
impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}
