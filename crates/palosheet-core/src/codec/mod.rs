//! Conversions between [`Value`] trees and typed domain records.
//!
//! - [`Encode`] - build the canonical array value for a record
//! - [`Decode`] - read a record back with positional cursor reads
//! - [`decode_list`] - array-of-record decoding with null and scalar promotion

mod cube;
mod element;
mod primitives;
mod server;
mod subset;

use palosheet_cell::{ArrayBuilder, Cursor, Value};

use crate::error::{PaloError, Result};

pub use primitives::{int_array, string_array, string_array_array};

/// Produce the exchange representation of a value.
pub trait Encode {
    fn encode(&self) -> Result<Value>;
}

/// Read a typed value from its exchange representation.
pub trait Decode: Sized {
    fn decode(value: &Value) -> Result<Self>;
}

/// Decode a collection.
///
/// Null yields an empty collection and a non-array value is promoted to a
/// single element. With `suppress_empty`, null and empty elements are skipped.
pub fn decode_list<T: Decode>(value: &Value, suppress_empty: bool) -> Result<Vec<T>> {
    if value.is_missing() {
        return Ok(Vec::new());
    }
    if !value.is_array() {
        return Ok(vec![T::decode(value)?]);
    }
    let cursor = value.as_array()?;
    let mut out = Vec::with_capacity(cursor.remaining());
    for item in cursor {
        if suppress_empty && item.is_empty() {
            continue;
        }
        out.push(T::decode(item)?);
    }
    Ok(out)
}

pub fn encode_list<T: Encode>(items: &[T]) -> Result<Value> {
    let mut builder = ArrayBuilder::new(items.len());
    for item in items {
        builder.append(item.encode()?)?;
    }
    Ok(builder.finish()?)
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self) -> Result<Value> {
        encode_list(self)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(value: &Value) -> Result<Self> {
        decode_list(value, false)
    }
}

/// Open a fixed-arity record for positional reads.
pub(crate) fn record<'a>(
    value: &'a Value,
    name: &'static str,
    expected: usize,
) -> Result<Cursor<'a>> {
    record_between(value, name, expected, expected)
}

/// Open a record that may carry trailing optional fields.
pub(crate) fn record_between<'a>(
    value: &'a Value,
    name: &'static str,
    min: usize,
    max: usize,
) -> Result<Cursor<'a>> {
    let cursor = value.as_array()?;
    let found = cursor.remaining();
    if found < min || found > max {
        return Err(PaloError::RecordArity {
            record: name,
            expected: if found < min { min } else { max },
            found,
        });
    }
    Ok(cursor)
}

/// Read the next field of a record.
pub(crate) fn field<T: Decode>(cursor: &mut Cursor<'_>) -> Result<T> {
    T::decode(cursor.next_value()?)
}

/// Read a trailing optional field, if present and not null.
pub(crate) fn optional_field<T: Decode>(cursor: &mut Cursor<'_>) -> Result<Option<T>> {
    match cursor.next() {
        Some(value) if !value.is_missing() => Ok(Some(T::decode(value)?)),
        _ => Ok(None),
    }
}
