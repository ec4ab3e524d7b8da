//! palosheet-cell - the generic cell model shared by spreadsheet call sites.
//!
//! A [`Value`] is a self-describing tagged variant. Arrays are read with a
//! single-pass [`Cursor`] and written with a fixed-arity [`ArrayBuilder`].

pub mod cell;
pub mod error;
mod format;

pub use cell::{ArrayBuilder, Cursor, ErrorInfo, Tag, Value, XlError};
pub use error::{CellError, Result};
pub use format::format_number;
