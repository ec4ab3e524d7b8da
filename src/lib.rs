//! palosheet - Palo spreadsheet functions over the generic cell model.
//!
//! - [`funcs`] - the `PALO.*` function table and [`invoke`]
//! - [`config`] - user settings (`palosheet.toml`)
//! - [`script`] - Rhai bridge for formula scripts

pub mod config;
pub mod error;
pub mod funcs;
pub mod script;

pub use config::{Settings, load_settings};
pub use error::{PalosheetError, Result};
pub use funcs::{Args, FunctionContext, PaloFunction, functions, invoke, lookup};
pub use script::register_palo_functions;

pub use palosheet_core::{ErrorInfo, PaloError, Value, XlError};
