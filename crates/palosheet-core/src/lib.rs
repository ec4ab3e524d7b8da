//! Palosheet core: OLAP domain records and their exchange encoding.
//!
//! - [`types`] - typed records (element, database, cube and subset info)
//! - [`codec`] - [`Encode`] and [`Decode`] between records and [`Value`] trees
//! - [`domain`] - traits implemented by a server client, and [`DomainError`]
//! - [`pool`] - named connections
//! - [`memory`] - in-memory backend

pub mod codec;
pub mod domain;
pub mod error;
pub mod memory;
pub mod pool;
pub mod types;

pub use codec::{Decode, Encode, decode_list, encode_list};
pub use domain::{Cube, Database, Dimension, DomainError, DomainResult, Server};
pub use error::{ErrorKind, PaloError, Result};
pub use palosheet_cell::{ArrayBuilder, CellError, Cursor, ErrorInfo, Tag, Value, XlError};
pub use pool::ServerPool;
