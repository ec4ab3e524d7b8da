use serde::{Deserialize, Serialize};
use std::fmt;

use super::cursor::Cursor;
use crate::error::{CellError, Result};

/// The discriminant of a [`Value`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    Null,
    Bool,
    Integer,
    Float,
    String,
    Array,
    Error,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tag::Null => "null",
            Tag::Bool => "bool",
            Tag::Integer => "integer",
            Tag::Float => "float",
            Tag::String => "string",
            Tag::Array => "array",
            Tag::Error => "error",
        };
        f.write_str(name)
    }
}

/// Spreadsheet error class carried by an error value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum XlError {
    Null,
    Div0,
    Value,
    Ref,
    Name,
    Num,
    NA,
}

impl XlError {
    pub fn as_str(&self) -> &'static str {
        match self {
            XlError::Null => "#NULL!",
            XlError::Div0 => "#DIV/0!",
            XlError::Value => "#VALUE!",
            XlError::Ref => "#REF!",
            XlError::Name => "#NAME?",
            XlError::Num => "#NUM!",
            XlError::NA => "#N/A",
        }
    }
}

impl fmt::Display for XlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured failure carried by [`Value::Error`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Spreadsheet-visible error class.
    pub kind: XlError,
    /// Numeric code of the underlying failure (server or adapter defined).
    pub code: u32,
    /// Optional human readable description.
    pub description: Option<String>,
}

impl ErrorInfo {
    pub fn new(kind: XlError, code: u32) -> Self {
        ErrorInfo {
            kind,
            code,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A generic cell value.
///
/// Values form a tree: an array exclusively owns its elements. A value never
/// changes its tag; converting produces a new value.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    /// A missing argument or result.
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Error(ErrorInfo),
}

impl Value {
    pub fn tag(&self) -> Tag {
        match self {
            Value::Null => Tag::Null,
            Value::Bool(_) => Tag::Bool,
            Value::Integer(_) => Tag::Integer,
            Value::Float(_) => Tag::Float,
            Value::String(_) => Tag::String,
            Value::Array(_) => Tag::Array,
            Value::Error(_) => Tag::Error,
        }
    }

    /// True only for [`Value::Null`].
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for null, the empty string, and arrays holding an empty element.
    ///
    /// A zero-length array holds no empty element and is not empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Array(items) => items.iter().any(Value::is_empty),
            Value::Bool(_) | Value::Integer(_) | Value::Float(_) | Value::Error(_) => false,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn as_error(&self) -> Option<&ErrorInfo> {
        match self {
            Value::Error(info) => Some(info),
            _ => None,
        }
    }

    /// Number of elements if this is an array.
    pub fn array_len(&self) -> Option<usize> {
        match self {
            Value::Array(items) => Some(items.len()),
            _ => None,
        }
    }

    /// Start a fresh traversal over the elements of an array value.
    pub fn as_array(&self) -> Result<Cursor<'_>> {
        match self {
            Value::Array(items) => Ok(Cursor::new(items)),
            other => Err(CellError::mismatch("array", other.tag())),
        }
    }

    pub fn into_array(self) -> Result<Vec<Value>> {
        match self {
            Value::Array(items) => Ok(items),
            other => Err(CellError::mismatch("array", other.tag())),
        }
    }

    /// Borrow the string payload. Only string values qualify.
    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(CellError::mismatch("string", other.tag())),
        }
    }

    /// Read as a string. Numbers are rendered; other tags are rejected.
    pub fn as_string(&self) -> Result<String> {
        match self {
            Value::String(s) => Ok(s.clone()),
            Value::Integer(i) => Ok(i.to_string()),
            Value::Float(n) => Ok(float_to_string(*n)),
            other => Err(CellError::mismatch("string", other.tag())),
        }
    }

    /// Read as a signed integer. Floats are truncated toward zero.
    pub fn as_integer(&self) -> Result<i64> {
        match self {
            Value::Integer(i) => Ok(*i),
            Value::Float(n) => truncate(*n).ok_or(CellError::mismatch("integer", Tag::Float)),
            Value::Bool(b) => Ok(i64::from(*b)),
            other => Err(CellError::mismatch("integer", other.tag())),
        }
    }

    /// Read as an unsigned integer. Negative numbers are rejected.
    pub fn as_unsigned(&self) -> Result<u64> {
        let n = self
            .as_integer()
            .map_err(|_| CellError::mismatch("unsigned integer", self.tag()))?;
        u64::try_from(n).map_err(|_| CellError::mismatch("unsigned integer", self.tag()))
    }

    pub fn as_float(&self) -> Result<f64> {
        match self {
            Value::Float(n) => Ok(*n),
            Value::Integer(i) => Ok(*i as f64),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            other => Err(CellError::mismatch("float", other.tag())),
        }
    }

    /// Read as a boolean. Numbers are truthy when nonzero and the strings
    /// TRUE/FALSE/1/0 are accepted in any case.
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Integer(i) => Ok(*i != 0),
            Value::Float(n) => Ok(*n != 0.0),
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.eq_ignore_ascii_case("TRUE") || trimmed == "1" {
                    Ok(true)
                } else if trimmed.eq_ignore_ascii_case("FALSE") || trimmed == "0" {
                    Ok(false)
                } else {
                    Err(CellError::mismatch("bool", Tag::String))
                }
            }
            other => Err(CellError::mismatch("bool", other.tag())),
        }
    }

    /// Read a matrix encoded as `[rows, cols, data...]`.
    ///
    /// Returns the dimensions and a cursor positioned on the first data slot.
    pub fn as_matrix(&self) -> Result<(usize, usize, Cursor<'_>)> {
        let mut cursor = self.as_array()?;
        let rows = to_usize(cursor.next_value()?.as_unsigned()?)?;
        let cols = to_usize(cursor.next_value()?.as_unsigned()?)?;
        let needed = rows.checked_mul(cols).ok_or(CellError::MatrixShape)?;
        if cursor.remaining() < needed {
            return Err(CellError::MatrixShape);
        }
        Ok((rows, cols, cursor))
    }
}

fn truncate(n: f64) -> Option<i64> {
    if !n.is_finite() {
        return None;
    }
    let t = n.trunc();
    // i64::MAX is not representable as f64; 2^63 is the first value out of range.
    if t >= -9_223_372_036_854_775_808.0 && t < 9_223_372_036_854_775_808.0 {
        Some(t as i64)
    } else {
        None
    }
}

fn to_usize(n: u64) -> Result<usize> {
    usize::try_from(n).map_err(|_| CellError::MatrixShape)
}

fn float_to_string(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        // Lengths beyond i64::MAX cannot occur for in-memory collections.
        Value::Integer(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<ErrorInfo> for Value {
    fn from(info: ErrorInfo) -> Self {
        Value::Error(info)
    }
}
