//! `PALO.*` spreadsheet functions and their metadata.
//!
//! Conventions:
//! - Names are stored without the `PALO.` prefix; lookup accepts either.
//! - `connection` marks the argument holding `server/database`, which is split
//!   in place before the arity check, so `min_args`/`max_args` count the
//!   split arguments.
//! - Recoverable failures come back as error values; only adapter defects
//!   are returned as `Err` from [`invoke`].

mod cube;
mod element;
mod server;
mod subset;

use std::sync::Arc;

use palosheet_core::{
    Database, Decode, ErrorInfo, PaloError, Result, Server, ServerPool, Value,
};

use crate::config::Settings;

static MISSING: Value = Value::Null;

/// Argument values of one call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Args {
    values: Vec<Value>,
}

impl Args {
    pub fn new(values: Vec<Value>) -> Self {
        Args { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The argument at `index`; past the end reads as Null.
    pub fn get(&self, index: usize) -> &Value {
        self.values.get(index).unwrap_or(&MISSING)
    }

    pub fn is_missing(&self, index: usize) -> bool {
        self.get(index).is_missing()
    }

    pub fn check_count(&self, count: usize) -> Result<()> {
        self.check_range(count, count)
    }

    pub fn check_range(&self, min: usize, max: usize) -> Result<()> {
        if (min..=max).contains(&self.len()) {
            Ok(())
        } else {
            Err(PaloError::WrongParamCount { found: self.len() })
        }
    }

    /// Split a `server/database` argument into two arguments.
    ///
    /// A bare database name is prefixed with `default_server` when one is
    /// given; anything else is left alone.
    pub fn fix_connection(&mut self, index: usize, default_server: Option<&str>) {
        let Some(Value::String(connection)) = self.values.get(index) else {
            return;
        };
        if let Some((server, database)) = connection.split_once('/') {
            let (server, database) = (server.to_string(), database.to_string());
            self.values[index] = Value::String(server);
            self.values.insert(index + 1, Value::String(database));
        } else if let Some(server) = default_server {
            self.values.insert(index, Value::from(server));
        }
    }

    /// Fold the arguments from `from` onwards into one array argument.
    ///
    /// A single array argument is already in shape and stays as it is.
    pub fn collapse_to_array(&mut self, from: usize) {
        if from >= self.values.len() {
            return;
        }
        if self.values.len() == from + 1 && self.values[from].is_array() {
            return;
        }
        let rest = self.values.split_off(from);
        self.values.push(Value::Array(rest));
    }

    pub fn string(&self, index: usize) -> Result<String> {
        Ok(self.get(index).as_string()?)
    }

    pub fn decode<T: Decode>(&self, index: usize) -> Result<T> {
        T::decode(self.get(index))
    }

    /// Decode the argument unless it is missing.
    pub fn optional<T: Decode>(&self, index: usize) -> Result<Option<T>> {
        if self.is_missing(index) {
            Ok(None)
        } else {
            self.decode(index).map(Some)
        }
    }

    pub fn rest(&self, from: usize) -> &[Value] {
        self.values.get(from..).unwrap_or(&[])
    }

    /// Resolve the server named by the argument. Anything after a `/` is ignored.
    pub fn server(&self, index: usize, pool: &ServerPool) -> Result<Arc<dyn Server>> {
        let name = self.string(index)?;
        let server = name.split_once('/').map_or(name.as_str(), |(server, _)| server);
        Ok(pool.get(server)?)
    }

    /// Resolve the database named by the arguments at `index` and `index + 1`.
    pub fn connection(&self, index: usize, pool: &ServerPool) -> Result<Arc<dyn Database>> {
        let server = self.server(index, pool)?;
        Ok(server.database(&self.string(index + 1)?)?)
    }
}

/// Everything a function needs besides its arguments.
#[derive(Clone, Debug, Default)]
pub struct FunctionContext {
    pub pool: Arc<ServerPool>,
    pub settings: Settings,
}

impl FunctionContext {
    pub fn new(pool: Arc<ServerPool>, settings: Settings) -> Self {
        FunctionContext { pool, settings }
    }

    pub fn call(&self, name: &str, args: Vec<Value>) -> Result<Value> {
        invoke(name, args, self)
    }

    fn error_value(&self, err: &PaloError) -> ErrorInfo {
        let mut info = err.to_error_info();
        if !self.settings.error_descriptions {
            info.description = None;
        }
        info
    }
}

pub type PaloFn = fn(&mut Args, &FunctionContext) -> Result<Value>;

pub struct PaloFunction {
    pub name: &'static str,
    /// Index of the `server/database` argument, if the function takes one.
    pub connection: Option<usize>,
    pub min_args: usize,
    pub max_args: usize,
    pub call: PaloFn,
    pub description: &'static str,
}

impl PaloFunction {
    /// Spreadsheet-facing name, e.g. `PALO.ETYPE`.
    pub fn sheet_name(&self) -> String {
        format!("PALO.{}", self.name)
    }

    /// Name registered with the script engine, e.g. `PALO_ETYPE`.
    pub fn script_name(&self) -> String {
        format!("PALO_{}", self.name)
    }
}

const VARIADIC: usize = usize::MAX;

pub const PALO_FUNCTIONS: &[PaloFunction] = &[
    PaloFunction {
        name: "PING",
        connection: None,
        min_args: 1,
        max_args: 1,
        call: server::ping,
        description: "Check that a server answers",
    },
    PaloFunction {
        name: "SERVER_INFO",
        connection: None,
        min_args: 1,
        max_args: 1,
        call: server::server_info,
        description: "Server version and features",
    },
    PaloFunction {
        name: "LICENSE_INFO",
        connection: None,
        min_args: 1,
        max_args: 1,
        call: server::license_info,
        description: "Licenses installed on a server",
    },
    PaloFunction {
        name: "ROOT_LIST_DATABASES",
        connection: None,
        min_args: 1,
        max_args: 1,
        call: server::list_databases,
        description: "Names of the databases on a server",
    },
    PaloFunction {
        name: "DATABASE_INFO",
        connection: Some(0),
        min_args: 2,
        max_args: 2,
        call: server::database_info,
        description: "Database record",
    },
    PaloFunction {
        name: "DATABASE_LIST_DIMENSIONS",
        connection: Some(0),
        min_args: 2,
        max_args: 2,
        call: server::list_dimensions,
        description: "Names of the dimensions in a database",
    },
    PaloFunction {
        name: "DATABASE_LIST_CUBES",
        connection: Some(0),
        min_args: 2,
        max_args: 2,
        call: server::list_cubes,
        description: "Names of the cubes in a database",
    },
    PaloFunction {
        name: "DIMENSION_INFO",
        connection: Some(0),
        min_args: 3,
        max_args: 3,
        call: element::dimension_info,
        description: "Dimension record",
    },
    PaloFunction {
        name: "DIMENSION_LIST_ELEMENTS",
        connection: Some(0),
        min_args: 3,
        max_args: 3,
        call: element::list_elements,
        description: "Name, type and identifier of every element",
    },
    PaloFunction {
        name: "ECOUNT",
        connection: Some(0),
        min_args: 3,
        max_args: 3,
        call: element::count,
        description: "Number of elements in a dimension",
    },
    PaloFunction {
        name: "ETYPE",
        connection: Some(0),
        min_args: 4,
        max_args: 4,
        call: element::element_type,
        description: "Type of an element",
    },
    PaloFunction {
        name: "EINFO",
        connection: Some(0),
        min_args: 4,
        max_args: 4,
        call: element::element_info,
        description: "Full element record",
    },
    PaloFunction {
        name: "EADD",
        connection: Some(0),
        min_args: 5,
        max_args: 6,
        call: element::add,
        description: "Add an element, optionally with its children",
    },
    PaloFunction {
        name: "EUPDATE",
        connection: Some(0),
        min_args: 6,
        max_args: 7,
        call: element::update,
        description: "Change an element's type and children",
    },
    PaloFunction {
        name: "ELEMENT_LIST_CONSOLIDATION_ELEMENTS",
        connection: Some(0),
        min_args: 4,
        max_args: 4,
        call: element::consolidation_elements,
        description: "Children of a consolidated element with their weights",
    },
    PaloFunction {
        name: "CUBE_INFO",
        connection: Some(0),
        min_args: 3,
        max_args: 3,
        call: cube::cube_info,
        description: "Cube record",
    },
    PaloFunction {
        name: "DATA",
        connection: Some(0),
        min_args: 4,
        max_args: VARIADIC,
        call: cube::data,
        description: "Value of one cell",
    },
    PaloFunction {
        name: "DATAV",
        connection: Some(0),
        min_args: 5,
        max_args: VARIADIC,
        call: cube::data_with_properties,
        description: "Value of one cell with the requested properties",
    },
    PaloFunction {
        name: "SETDATA",
        connection: Some(2),
        min_args: 6,
        max_args: VARIADIC,
        call: cube::set_data,
        description: "Write one cell, splashing into base cells as requested",
    },
    PaloFunction {
        name: "CUBE_RULES",
        connection: Some(0),
        min_args: 3,
        max_args: 3,
        call: cube::rules,
        description: "Rules defined on a cube",
    },
    PaloFunction {
        name: "CUBE_RULE_CREATE",
        connection: Some(0),
        min_args: 4,
        max_args: 7,
        call: cube::create_rule,
        description: "Define a rule on a cube",
    },
    PaloFunction {
        name: "CUBE_LOCKS",
        connection: Some(0),
        min_args: 3,
        max_args: 3,
        call: cube::locks,
        description: "Locked areas of a cube",
    },
    PaloFunction {
        name: "CUBE_LOCK",
        connection: Some(0),
        min_args: 3,
        max_args: 5,
        call: cube::lock,
        description: "Lock an area of a cube",
    },
    PaloFunction {
        name: "SUBSET",
        connection: Some(0),
        min_args: 3,
        max_args: VARIADIC,
        call: subset::subset,
        description: "Evaluate a subset of a dimension",
    },
    PaloFunction {
        name: "SUBSET_SIZE",
        connection: Some(0),
        min_args: 3,
        max_args: VARIADIC,
        call: subset::subset_size,
        description: "Number of elements in a subset",
    },
    PaloFunction {
        name: "SUBSET_BASIC_FILTER",
        connection: None,
        min_args: 1,
        max_args: 2,
        call: subset::basic_filter,
        description: "Pick list filter",
    },
    PaloFunction {
        name: "SUBSET_TEXT_FILTER",
        connection: None,
        min_args: 1,
        max_args: 2,
        call: subset::text_filter,
        description: "Name pattern filter",
    },
    PaloFunction {
        name: "SUBSET_SORTING_FILTER",
        connection: None,
        min_args: 0,
        max_args: 10,
        call: subset::sorting_filter,
        description: "Sort order and limits",
    },
    PaloFunction {
        name: "SUBSET_STRUCTURAL_FILTER",
        connection: None,
        min_args: 0,
        max_args: 9,
        call: subset::structural_filter,
        description: "Hierarchy position filter",
    },
    PaloFunction {
        name: "SUBSET_ALIAS_FILTER",
        connection: None,
        min_args: 1,
        max_args: 1,
        call: subset::alias_filter,
        description: "Attribute expressions, one attribute per column",
    },
    PaloFunction {
        name: "SUBSET_DATA_FILTER",
        connection: None,
        min_args: 1,
        max_args: 7,
        call: subset::data_filter,
        description: "Filter on cube values",
    },
    PaloFunction {
        name: "SUBCUBE",
        connection: None,
        min_args: 1,
        max_args: VARIADIC,
        call: subset::subcube,
        description: "Cube area argument of a data filter",
    },
];

fn strip_prefix_ignore_case<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    let head = name.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &name[prefix.len()..])
}

/// Find a function by name, with or without its `PALO.` prefix.
pub fn lookup(name: &str) -> Option<&'static PaloFunction> {
    let name = name.trim();
    let bare = strip_prefix_ignore_case(name, "PALO.")
        .or_else(|| strip_prefix_ignore_case(name, "PALO_"))
        .unwrap_or(name);
    PALO_FUNCTIONS
        .iter()
        .find(|f| f.name.eq_ignore_ascii_case(bare))
}

pub fn functions() -> &'static [PaloFunction] {
    PALO_FUNCTIONS
}

/// Call a function by name.
///
/// Bad arguments, unknown names and server failures are returned as an
/// error value. `Err` is reserved for [`PaloError::is_fatal`] failures.
pub fn invoke(name: &str, args: Vec<Value>, ctx: &FunctionContext) -> Result<Value> {
    match dispatch(name, args, ctx) {
        Ok(value) => Ok(value),
        Err(err) if err.is_fatal() => Err(err),
        Err(err) => {
            tracing::warn!(function = name, code = err.code(), error = %err, "call failed");
            Ok(Value::Error(ctx.error_value(&err)))
        }
    }
}

fn dispatch(name: &str, args: Vec<Value>, ctx: &FunctionContext) -> Result<Value> {
    let function = lookup(name).ok_or_else(|| PaloError::UnknownFunction(name.to_string()))?;
    let mut args = Args::new(args);
    if let Some(index) = function.connection {
        args.fix_connection(index, ctx.settings.default_server.as_deref());
    }
    args.check_range(function.min_args, function.max_args)?;
    tracing::debug!(function = function.name, args = args.len(), "dispatch");
    (function.call)(&mut args, ctx)
}

#[cfg(test)]
pub(crate) mod fixture {
    use std::sync::Arc;

    use palosheet_core::memory::MemoryServer;
    use palosheet_core::types::{ConsolidationElement, DimensionElementType};
    use palosheet_core::{Cube, Dimension, ServerPool};

    use super::FunctionContext;
    use crate::config::Settings;

    /// `localhost/Demo` with a Products and a Months dimension and a Sales cube.
    pub(crate) fn context() -> FunctionContext {
        context_with(Settings::default())
    }

    pub(crate) fn context_with(settings: Settings) -> FunctionContext {
        let server = Arc::new(MemoryServer::new());
        let demo = server.add_database("Demo");
        let products = demo.add_dimension("Products");
        for name in ["Desktop L", "Desktop M"] {
            products
                .add_element(name, DimensionElementType::Numeric, &[])
                .unwrap();
        }
        products
            .add_element(
                "Desktops",
                DimensionElementType::Consolidated,
                &[
                    ConsolidationElement::new("Desktop L", 1.0),
                    ConsolidationElement::new("Desktop M", 1.0),
                ],
            )
            .unwrap();
        let months = demo.add_dimension("Months");
        for name in ["Jan", "Feb"] {
            months
                .add_element(name, DimensionElementType::Numeric, &[])
                .unwrap();
        }
        let sales = demo.add_cube("Sales", &["Products", "Months"]).unwrap();
        sales
            .set_cell_value(
                &["Desktop L".to_string(), "Jan".to_string()],
                &palosheet_core::types::CellValue::Numeric(10.0),
                palosheet_core::types::SplashMode::Default,
            )
            .unwrap();

        let pool = ServerPool::new();
        pool.register("localhost", server);
        FunctionContext::new(Arc::new(pool), settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palosheet_core::XlError;

    fn strings(items: &[&str]) -> Vec<Value> {
        items.iter().map(|s| Value::from(*s)).collect()
    }

    #[test]
    fn test_get_past_end_is_null() {
        let args = Args::new(strings(&["a"]));
        assert_eq!(args.get(0), &Value::from("a"));
        assert_eq!(args.get(5), &Value::Null);
        assert!(args.is_missing(5));
    }

    #[test]
    fn test_check_range() {
        let args = Args::new(strings(&["a", "b"]));
        assert!(args.check_range(1, 3).is_ok());
        assert!(args.check_count(2).is_ok());
        assert_eq!(
            args.check_count(3).unwrap_err(),
            PaloError::WrongParamCount { found: 2 }
        );
    }

    #[test]
    fn test_fix_connection_splits_in_place() {
        let mut args = Args::new(strings(&["localhost/Demo", "Products"]));
        args.fix_connection(0, None);
        assert_eq!(args, Args::new(strings(&["localhost", "Demo", "Products"])));

        let mut args = Args::new(strings(&["1", "1", "localhost/Demo", "Sales"]));
        args.fix_connection(2, None);
        assert_eq!(args.len(), 5);
        assert_eq!(args.get(3), &Value::from("Demo"));
    }

    #[test]
    fn test_fix_connection_default_server() {
        let mut args = Args::new(strings(&["Demo", "Products"]));
        args.fix_connection(0, Some("localhost"));
        assert_eq!(args, Args::new(strings(&["localhost", "Demo", "Products"])));

        let mut untouched = Args::new(strings(&["Demo"]));
        untouched.fix_connection(0, None);
        assert_eq!(untouched.len(), 1);
    }

    #[test]
    fn test_collapse_to_array() {
        let mut args = Args::new(strings(&["srv", "Jan", "Feb"]));
        args.collapse_to_array(1);
        assert_eq!(args.len(), 2);
        assert_eq!(args.get(1), &Value::Array(strings(&["Jan", "Feb"])));

        let mut already = Args::new(vec![Value::from("srv"), Value::Array(strings(&["Jan"]))]);
        already.collapse_to_array(1);
        assert_eq!(already.get(1), &Value::Array(strings(&["Jan"])));
    }

    #[test]
    fn test_lookup_ignores_prefix_and_case() {
        assert_eq!(lookup("PALO.ETYPE").map(|f| f.name), Some("ETYPE"));
        assert_eq!(lookup("palo.etype").map(|f| f.name), Some("ETYPE"));
        assert_eq!(lookup("PALO_DATA").map(|f| f.name), Some("DATA"));
        assert_eq!(lookup("ecount").map(|f| f.name), Some("ECOUNT"));
        assert!(lookup("PALO.NOPE").is_none());
    }

    #[test]
    fn test_unknown_function_is_name_error() {
        let ctx = fixture::context();
        let value = invoke("PALO.NOPE", Vec::new(), &ctx).unwrap();
        assert_eq!(value.as_error().map(|e| e.kind), Some(XlError::Name));
    }

    #[test]
    fn test_arity_counts_split_connection() {
        let ctx = fixture::context();
        let value = invoke("PALO.ECOUNT", strings(&["localhost/Demo", "Products"]), &ctx).unwrap();
        assert_eq!(value, Value::from(3usize));

        let short = invoke("PALO.ECOUNT", strings(&["localhost/Demo"]), &ctx).unwrap();
        let info = short.as_error().unwrap();
        assert_eq!(info.code, PaloError::WrongParamCount { found: 2 }.code());
    }

    #[test]
    fn test_error_descriptions_setting() {
        let quiet = fixture::context();
        let value =
            invoke("PALO.ECOUNT", strings(&["localhost/Nope", "Products"]), &quiet).unwrap();
        let info = value.as_error().unwrap();
        assert_eq!(info.kind, XlError::Ref);
        assert_eq!(info.description, None);

        let verbose = fixture::context_with(Settings {
            error_descriptions: true,
            ..Settings::default()
        });
        let value =
            invoke("PALO.ECOUNT", strings(&["localhost/Nope", "Products"]), &verbose).unwrap();
        assert!(value.as_error().unwrap().description.is_some());
    }

    #[test]
    fn test_table_names_are_unique() {
        let mut names: Vec<&str> = functions().iter().map(|f| f.name).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(names.len(), before);
        assert!(functions().iter().all(|f| f.min_args <= f.max_args));
    }
}
