//! Cell data structures.
//!
//! - [`Value`] - the tagged variant (null, bool, integer, float, string, array, error)
//! - [`Cursor`] - forward-only traversal over an array value
//! - [`ArrayBuilder`] - append-only constructor that enforces the declared length

mod builder;
mod cursor;
mod value;

pub use builder::ArrayBuilder;
pub use cursor::Cursor;
pub use value::{ErrorInfo, Tag, Value, XlError};
