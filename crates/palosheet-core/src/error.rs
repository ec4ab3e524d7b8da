//! Error types for Palosheet core.

use thiserror::Error;

use palosheet_cell::{CellError, ErrorInfo, XlError};

use crate::domain::DomainError;

/// Classification of failures, independent of where they were raised.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    TypeMismatch,
    InvalidEnumSpecification,
    InvalidArity,
    BuilderPrecondition,
    UnknownValueTag,
    DomainFailure,
}

/// Errors raised while decoding arguments, encoding results or calling the
/// domain boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PaloError {
    #[error(transparent)]
    Cell(#[from] CellError),

    #[error("Invalid dimension element type: {0}")]
    InvalidDimensionElementType(String),

    #[error("Invalid splash mode specification")]
    InvalidSplashMode,

    #[error("Invalid {what}: {found}")]
    InvalidKeyword { what: &'static str, found: String },

    #[error("Invalid consolidation element specification: expected 2 fields, found {found}")]
    InvalidConsolidationElement { found: usize },

    #[error("{record} expects {expected} fields, found {found}")]
    RecordArity {
        record: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Axis element selector selects no members")]
    InvalidAxisSelector,

    #[error("Unknown cell value type {code}")]
    UnknownCellValueType { code: u32 },

    #[error("Invalid argument value: {0}")]
    InvalidArgumentValue(String),

    #[error("Invalid argument format: {0}")]
    InvalidArgumentFormat(String),

    #[error("Wrong parameter count: {found}")]
    WrongParamCount { found: usize },

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

impl PaloError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PaloError::Cell(err) if err.is_builder_precondition() => ErrorKind::BuilderPrecondition,
            PaloError::Cell(CellError::Exhausted { .. }) => ErrorKind::InvalidArity,
            PaloError::Cell(_) | PaloError::InvalidAxisSelector => ErrorKind::TypeMismatch,
            PaloError::InvalidDimensionElementType(_)
            | PaloError::InvalidSplashMode
            | PaloError::InvalidKeyword { .. }
            | PaloError::InvalidArgumentValue(_)
            | PaloError::UnknownFunction(_) => ErrorKind::InvalidEnumSpecification,
            PaloError::InvalidConsolidationElement { .. }
            | PaloError::RecordArity { .. }
            | PaloError::InvalidArgumentFormat(_)
            | PaloError::WrongParamCount { .. } => ErrorKind::InvalidArity,
            PaloError::UnknownCellValueType { .. } => ErrorKind::UnknownValueTag,
            PaloError::Domain(_) => ErrorKind::DomainFailure,
        }
    }

    /// Defects in the adapter itself rather than bad input or server failures.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::UnknownValueTag | ErrorKind::BuilderPrecondition
        )
    }

    /// Adapter-local error code; domain failures keep the server's code.
    pub fn code(&self) -> u32 {
        match self {
            PaloError::Domain(err) => err.code,
            PaloError::Cell(_) => 1,
            PaloError::InvalidDimensionElementType(_) => 2,
            PaloError::InvalidSplashMode => 3,
            PaloError::InvalidKeyword { .. } => 4,
            PaloError::InvalidConsolidationElement { .. } => 5,
            PaloError::RecordArity { .. } => 6,
            PaloError::InvalidAxisSelector => 7,
            PaloError::UnknownCellValueType { .. } => 8,
            PaloError::InvalidArgumentValue(_) => 9,
            PaloError::InvalidArgumentFormat(_) => 10,
            PaloError::WrongParamCount { .. } => 11,
            PaloError::UnknownFunction(_) => 12,
        }
    }

    /// The error value handed back to the spreadsheet.
    pub fn to_error_info(&self) -> ErrorInfo {
        let kind = match self {
            PaloError::Domain(err) if err.is_not_found() => XlError::Ref,
            PaloError::UnknownFunction(_) => XlError::Name,
            _ => XlError::Value,
        };
        let description = match self {
            PaloError::Domain(err) => err.description.clone(),
            other => other.to_string(),
        };
        ErrorInfo::new(kind, self.code()).with_description(description)
    }
}

pub type Result<T> = std::result::Result<T, PaloError>;
