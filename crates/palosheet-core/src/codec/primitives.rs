use palosheet_cell::{CellError, Value};

use super::{Decode, Encode, decode_list};
use crate::error::Result;

impl Encode for Value {
    fn encode(&self) -> Result<Value> {
        Ok(self.clone())
    }
}

impl Decode for Value {
    fn decode(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

impl Encode for String {
    fn encode(&self) -> Result<Value> {
        Ok(Value::from(self.as_str()))
    }
}

impl Decode for String {
    fn decode(value: &Value) -> Result<Self> {
        Ok(value.as_string()?)
    }
}

impl Encode for bool {
    fn encode(&self) -> Result<Value> {
        Ok(Value::Bool(*self))
    }
}

impl Decode for bool {
    fn decode(value: &Value) -> Result<Self> {
        Ok(value.as_bool()?)
    }
}

impl Encode for i64 {
    fn encode(&self) -> Result<Value> {
        Ok(Value::Integer(*self))
    }
}

impl Decode for i64 {
    fn decode(value: &Value) -> Result<Self> {
        Ok(value.as_integer()?)
    }
}

impl Encode for u32 {
    fn encode(&self) -> Result<Value> {
        Ok(Value::from(*self))
    }
}

impl Decode for u32 {
    fn decode(value: &Value) -> Result<Self> {
        let n = value.as_unsigned()?;
        u32::try_from(n).map_err(|_| {
            CellError::TypeMismatch {
                expected: "32-bit unsigned integer",
                found: value.tag(),
            }
            .into()
        })
    }
}

impl Encode for f64 {
    fn encode(&self) -> Result<Value> {
        Ok(Value::Float(*self))
    }
}

impl Decode for f64 {
    fn decode(value: &Value) -> Result<Self> {
        Ok(value.as_float()?)
    }
}

/// Decode a list of strings. See [`decode_list`] for the promotion rules.
pub fn string_array(value: &Value, suppress_empty: bool) -> Result<Vec<String>> {
    decode_list(value, suppress_empty)
}

/// Decode a list of integers. Null and empty elements are always skipped.
pub fn int_array(value: &Value) -> Result<Vec<i64>> {
    decode_list(value, true)
}

/// Decode an array of string lists, one per element.
pub fn string_array_array(value: &Value, suppress_empty: bool) -> Result<Vec<Vec<String>>> {
    let cursor = value.as_array()?;
    let mut out = Vec::with_capacity(cursor.remaining());
    for item in cursor {
        out.push(string_array(item, suppress_empty)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PaloError;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_string_array_suppresses_empty() {
        let v = Value::Array(vec![
            Value::from("a"),
            Value::Null,
            Value::from(""),
            Value::from("b"),
        ]);
        assert_eq!(string_array(&v, true).unwrap(), strings(&["a", "b"]));
        assert!(string_array(&v, false).is_err());
    }

    #[test]
    fn test_scalar_promotion_matches_single_element_array() {
        let scalar = Value::from("Desktop L");
        let wrapped = Value::Array(vec![scalar.clone()]);
        assert_eq!(
            string_array(&scalar, false).unwrap(),
            string_array(&wrapped, false).unwrap()
        );
    }

    #[test]
    fn test_null_decodes_to_empty() {
        assert!(string_array(&Value::Null, false).unwrap().is_empty());
        assert!(int_array(&Value::Null).unwrap().is_empty());
        assert!(Vec::<f64>::decode(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_int_array_skips_empty_and_truncates() {
        let v = Value::Array(vec![Value::Float(1.7), Value::from(""), Value::Integer(-4)]);
        assert_eq!(int_array(&v).unwrap(), vec![1, -4]);
    }

    #[test]
    fn test_string_array_array() {
        let v = Value::Array(vec![
            Value::Array(vec![Value::from("a"), Value::from("b")]),
            Value::from("c"),
            Value::Null,
        ]);
        assert_eq!(
            string_array_array(&v, false).unwrap(),
            vec![strings(&["a", "b"]), strings(&["c"]), vec![]]
        );
    }

    #[test]
    fn test_u32_range() {
        assert_eq!(u32::decode(&Value::Integer(7)).unwrap(), 7);
        let err = u32::decode(&Value::Integer(1 << 40)).unwrap_err();
        assert!(matches!(err, PaloError::Cell(CellError::TypeMismatch { .. })));
    }
}
