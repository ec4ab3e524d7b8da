use super::value::Value;
use crate::error::{CellError, Result};

/// Append-only constructor for array values of a declared length.
///
/// Exactly `declared` elements must be appended before [`finish`](Self::finish).
/// Appending more, finishing with fewer, or touching the builder after it has
/// been sealed are all errors.
#[derive(Debug)]
pub struct ArrayBuilder {
    declared: usize,
    items: Vec<Value>,
    sealed: bool,
}

impl ArrayBuilder {
    pub fn new(declared: usize) -> Self {
        ArrayBuilder {
            declared,
            items: Vec::with_capacity(declared),
            sealed: false,
        }
    }

    /// Builder for a `rows` x `cols` matrix.
    ///
    /// The array holds `rows * cols + 2` slots; the row and column counts are
    /// appended up front, leaving the data slots to the caller.
    pub fn matrix(rows: usize, cols: usize) -> Result<Self> {
        let declared = rows
            .checked_mul(cols)
            .and_then(|n| n.checked_add(2))
            .ok_or(CellError::MatrixShape)?;
        let mut builder = ArrayBuilder::new(declared);
        builder.append(rows)?.append(cols)?;
        Ok(builder)
    }

    pub fn declared(&self) -> usize {
        self.declared
    }

    pub fn filled(&self) -> usize {
        self.items.len()
    }

    pub fn remaining(&self) -> usize {
        self.declared - self.items.len()
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn append(&mut self, value: impl Into<Value>) -> Result<&mut Self> {
        if self.sealed {
            return Err(CellError::BuilderSealed);
        }
        if self.items.len() >= self.declared {
            return Err(CellError::BuilderOverflow {
                declared: self.declared,
            });
        }
        self.items.push(value.into());
        Ok(self)
    }

    /// Same as [`append`](Self::append); the name only documents the slot.
    pub fn append_named(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self> {
        tracing::trace!(field = name, slot = self.items.len(), "append");
        self.append(value)
    }

    pub fn extend<I, V>(&mut self, values: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        for value in values {
            self.append(value)?;
        }
        Ok(self)
    }

    /// Seal the builder and produce the array value.
    pub fn finish(&mut self) -> Result<Value> {
        if self.sealed {
            return Err(CellError::BuilderSealed);
        }
        self.sealed = true;
        if self.items.len() != self.declared {
            return Err(CellError::BuilderUnderfilled {
                declared: self.declared,
                filled: self.items.len(),
            });
        }
        Ok(Value::Array(std::mem::take(&mut self.items)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_fill_finishes() {
        let mut b = ArrayBuilder::new(3);
        b.append(1).unwrap().append("two").unwrap().append(3.0).unwrap();
        let v = b.finish().unwrap();
        assert_eq!(v.array_len(), Some(3));
    }

    #[test]
    fn test_single_slot_record() {
        let mut b = ArrayBuilder::new(1);
        b.append_named("identifier", 7).unwrap();
        assert_eq!(
            b.append(8).unwrap_err(),
            CellError::BuilderOverflow { declared: 1 }
        );
        assert_eq!(b.finish().unwrap(), Value::Array(vec![Value::Integer(7)]));
    }

    #[test]
    fn test_underfill_is_rejected() {
        let mut b = ArrayBuilder::new(2);
        b.append(1).unwrap();
        assert_eq!(
            b.finish().unwrap_err(),
            CellError::BuilderUnderfilled {
                declared: 2,
                filled: 1
            }
        );
        assert!(b.is_sealed());
    }

    #[test]
    fn test_sealed_rejects_everything() {
        let mut b = ArrayBuilder::new(0);
        assert_eq!(b.finish().unwrap(), Value::Array(vec![]));
        assert_eq!(b.append(1).unwrap_err(), CellError::BuilderSealed);
        assert_eq!(b.finish().unwrap_err(), CellError::BuilderSealed);
    }

    #[test]
    fn test_matrix_header() {
        let mut b = ArrayBuilder::matrix(2, 3).unwrap();
        assert_eq!(b.declared(), 8);
        assert_eq!(b.remaining(), 6);
        b.extend((0..6).map(|i: i64| i * 10)).unwrap();
        let v = b.finish().unwrap();
        let items = v.into_array().unwrap();
        assert_eq!(items.len(), 8);
        assert_eq!(items[0], Value::Integer(2));
        assert_eq!(items[1], Value::Integer(3));
        assert_eq!(items[7], Value::Integer(50));
    }

    #[test]
    fn test_matrix_overflow_is_caught() {
        assert!(ArrayBuilder::matrix(usize::MAX, 2).is_err());
    }
}
