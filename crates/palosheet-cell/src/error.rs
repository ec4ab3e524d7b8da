//! Error types for the generic cell model.

use thiserror::Error;

use crate::cell::Tag;

/// Errors raised while reading or building cell values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CellError {
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: &'static str, found: Tag },

    #[error("Array builder overflow: declared {declared} elements")]
    BuilderOverflow { declared: usize },

    #[error("Array builder underfilled: declared {declared} elements, filled {filled}")]
    BuilderUnderfilled { declared: usize, filled: usize },

    #[error("Array builder is already sealed")]
    BuilderSealed,

    #[error("Array exhausted at position {position}")]
    Exhausted { position: usize },

    #[error("Matrix header does not match its data")]
    MatrixShape,
}

impl CellError {
    pub(crate) fn mismatch(expected: &'static str, found: Tag) -> Self {
        CellError::TypeMismatch { expected, found }
    }

    /// True for errors caused by misuse of an [`ArrayBuilder`](crate::ArrayBuilder).
    pub fn is_builder_precondition(&self) -> bool {
        matches!(
            self,
            CellError::BuilderOverflow { .. }
                | CellError::BuilderUnderfilled { .. }
                | CellError::BuilderSealed
        )
    }
}

pub type Result<T> = std::result::Result<T, CellError>;
