use super::value::Value;
use crate::error::{CellError, Result};

/// Forward-only, single-pass traversal over the elements of an array value.
///
/// A cursor cannot be rewound or cloned; request a new one from
/// [`Value::as_array`] to scan again.
#[derive(Debug)]
pub struct Cursor<'a> {
    items: &'a [Value],
    position: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(items: &'a [Value]) -> Self {
        Cursor { items, position: 0 }
    }

    pub fn at_end(&self) -> bool {
        self.position >= self.items.len()
    }

    /// The element under the cursor, or `None` when exhausted.
    pub fn current(&self) -> Option<&'a Value> {
        self.items.get(self.position)
    }

    /// Move to the next element. Advancing past the end is a no-op.
    pub fn advance(&mut self) {
        if !self.at_end() {
            self.position += 1;
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of elements not yet visited.
    pub fn remaining(&self) -> usize {
        self.items.len().saturating_sub(self.position)
    }

    /// Read the current element and advance past it.
    pub fn next_value(&mut self) -> Result<&'a Value> {
        let value = self.current().ok_or(CellError::Exhausted {
            position: self.position,
        })?;
        self.position += 1;
        Ok(value)
    }

    /// True when the current slot holds an unset field (null) or the array is
    /// exhausted. Does not advance.
    pub fn peek_missing(&self) -> bool {
        self.current().is_none_or(Value::is_missing)
    }

    /// Skip `count` elements, failing if fewer remain.
    pub fn skip_values(&mut self, count: usize) -> Result<()> {
        for _ in 0..count {
            self.next_value()?;
        }
        Ok(())
    }
}

impl<'a> Iterator for Cursor<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.current()?;
        self.position += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Cursor<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Value {
        Value::Array(vec![Value::Integer(1), Value::Null, Value::from("c")])
    }

    #[test]
    fn test_walks_in_order() {
        let v = sample();
        let mut cursor = v.as_array().unwrap();
        assert_eq!(cursor.remaining(), 3);
        assert_eq!(cursor.current(), Some(&Value::Integer(1)));
        cursor.advance();
        assert!(cursor.peek_missing());
        cursor.advance();
        assert_eq!(cursor.current(), Some(&Value::from("c")));
        cursor.advance();
        assert!(cursor.at_end());
        cursor.advance();
        assert_eq!(cursor.position(), 3);
    }

    #[test]
    fn test_next_value_exhausts() {
        let v = sample();
        let mut cursor = v.as_array().unwrap();
        cursor.skip_values(3).unwrap();
        assert_eq!(
            cursor.next_value().unwrap_err(),
            CellError::Exhausted { position: 3 }
        );
        assert!(cursor.peek_missing());
    }

    #[test]
    fn test_fresh_cursor_rescans() {
        let v = sample();
        let first: Vec<_> = v.as_array().unwrap().collect();
        let second: Vec<_> = v.as_array().unwrap().collect();
        assert_eq!(first, second);
        assert_eq!(v.as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_empty_array_is_at_end() {
        let v = Value::Array(vec![]);
        let cursor = v.as_array().unwrap();
        assert!(cursor.at_end());
        assert_eq!(cursor.remaining(), 0);
    }
}
