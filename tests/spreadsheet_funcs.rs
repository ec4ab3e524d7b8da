//! Integration tests driving the `PALO.*` functions against the in-memory backend.

use std::io::Write;
use std::sync::Arc;

use palosheet::{FunctionContext, Settings, Value, XlError, invoke, load_settings};
use palosheet_core::memory::MemoryServer;
use palosheet_core::types::{DimensionElementInfo, SubsetResult};
use palosheet_core::{Decode, ServerPool, decode_list};

fn s(text: &str) -> Value {
    Value::from(text)
}

fn child(name: &str, weight: f64) -> Value {
    Value::Array(vec![s(name), Value::Float(weight)])
}

/// `olap/Finance` with empty Accounts and Years dimensions and a PnL cube over
/// them; the tests add elements through calls.
fn context(settings: Settings) -> FunctionContext {
    let server = Arc::new(MemoryServer::new());
    let finance = server.add_database("Finance");
    finance.add_dimension("Accounts");
    finance.add_dimension("Years");
    finance.add_cube("PnL", &["Accounts", "Years"]).unwrap();
    let pool = ServerPool::new();
    pool.register("olap", server);
    FunctionContext::new(Arc::new(pool), settings)
}

fn call(ctx: &FunctionContext, name: &str, args: Vec<Value>) -> Value {
    invoke(name, args, ctx).unwrap()
}

fn build_accounts(ctx: &FunctionContext) {
    for name in ["Revenue", "Costs"] {
        call(ctx, "PALO.EADD", vec![s("olap/Finance"), s("Accounts"), s("N"), s(name)]);
    }
    call(
        ctx,
        "PALO.EADD",
        vec![
            s("olap/Finance"),
            s("Accounts"),
            s("C"),
            s("Profit"),
            Value::Array(vec![child("Revenue", 1.0), child("Costs", -1.0)]),
        ],
    );
    call(ctx, "PALO.EADD", vec![s("olap/Finance"), s("Accounts"), s("S"), s("Note")]);
    for year in ["2025", "2026"] {
        call(ctx, "PALO.EADD", vec![s("olap/Finance"), s("Years"), s("N"), s(year)]);
    }
}

fn setdata(ctx: &FunctionContext, value: Value, coords: &[&str]) -> Value {
    let mut args = vec![value, Value::Bool(true), s("olap/Finance"), s("PnL")];
    args.extend(coords.iter().map(|c| s(c)));
    call(ctx, "PALO.SETDATA", args)
}

fn data(ctx: &FunctionContext, coords: &[&str]) -> Value {
    let mut args = vec![s("olap/Finance"), s("PnL")];
    args.extend(coords.iter().map(|c| s(c)));
    call(ctx, "PALO.DATA", args)
}

#[test]
fn test_consolidation_weights_flow_into_data() {
    let ctx = context(Settings::default());
    build_accounts(&ctx);

    assert_eq!(setdata(&ctx, Value::Float(100.0), &["Revenue", "2026"]), Value::Float(100.0));
    setdata(&ctx, Value::Integer(30), &["Costs", "2026"]);
    assert_eq!(data(&ctx, &["Profit", "2026"]), Value::Float(70.0));

    let info = call(
        &ctx,
        "PALO.EINFO",
        vec![s("olap/Finance"), s("Accounts"), s("Profit")],
    );
    let info = DimensionElementInfo::decode(&info).unwrap();
    assert_eq!(info.children.len(), 2);
    assert_eq!(info.level, 1);
}

#[test]
fn test_string_cells() {
    let ctx = context(Settings::default());
    build_accounts(&ctx);

    setdata(&ctx, s("reviewed"), &["Note", "2025"]);
    assert_eq!(data(&ctx, &["Note", "2025"]), s("reviewed"));

    let rejected = setdata(&ctx, s("lots"), &["Revenue", "2025"]);
    assert_eq!(rejected.as_error().map(|e| e.kind), Some(XlError::Value));
}

#[test]
fn test_default_server_setting() {
    let ctx = context(Settings {
        default_server: Some("olap".to_string()),
        ..Settings::default()
    });
    build_accounts(&ctx);
    let count = call(&ctx, "PALO.ECOUNT", vec![s("Finance"), s("Accounts")]);
    assert_eq!(count, Value::Integer(4));
}

#[test]
fn test_settings_file_controls_splashing() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"splashing_allowed = false\nerror_descriptions = true\n")
        .unwrap();
    let (settings, warnings) = load_settings(Some(&file.path().to_path_buf()));
    assert!(warnings.is_empty());

    let ctx = context(settings);
    build_accounts(&ctx);
    let value = setdata(&ctx, Value::Float(5.0), &["Profit", "2026"]);
    let info = value.as_error().unwrap();
    assert_eq!(info.kind, XlError::Value);
    assert!(info.description.is_some());

    // Base cells are still writable.
    assert_eq!(setdata(&ctx, Value::Float(5.0), &["Revenue", "2026"]), Value::Float(5.0));
}

#[test]
fn test_subset_with_builders() {
    let ctx = context(Settings::default());
    build_accounts(&ctx);

    let structural = call(
        &ctx,
        "PALO.SUBSET_STRUCTURAL_FILTER",
        vec![s("Profit"), Value::Bool(false), Value::Bool(true)],
    );
    let sorting = call(
        &ctx,
        "PALO.SUBSET_SORTING_FILTER",
        vec![Value::Null, Value::Integer(2)],
    );
    let value = call(
        &ctx,
        "PALO.SUBSET",
        vec![
            s("olap/Finance"),
            s("Accounts"),
            Value::Integer(2),
            Value::Null,
            structural,
            sorting,
        ],
    );
    let results: Vec<SubsetResult> = decode_list(&value, false).unwrap();
    let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Costs", "Revenue"]);
    assert!(results.iter().all(|r| r.indent == 2 && r.depth == 1));
}

#[test]
fn test_lock_then_blocked_write() {
    let ctx = context(Settings::default());
    build_accounts(&ctx);

    let area = Value::Array(vec![
        Value::Array(vec![s("Profit")]),
        Value::Array(vec![s("2026")]),
    ]);
    call(
        &ctx,
        "PALO.CUBE_LOCK",
        vec![s("olap/Finance"), s("PnL"), area, s("alice")],
    );
    let blocked = setdata(&ctx, Value::Float(1.0), &["Costs", "2026"]);
    assert!(blocked.is_error());
    assert_eq!(setdata(&ctx, Value::Float(1.0), &["Costs", "2025"]), Value::Float(1.0));
}

#[test]
fn test_results_serialize() {
    let ctx = context(Settings::default());
    build_accounts(&ctx);
    let value = call(
        &ctx,
        "PALO.DIMENSION_LIST_ELEMENTS",
        vec![s("olap/Finance"), s("Years")],
    );
    let json = serde_json::to_string(&value).unwrap();
    let back: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(back, value);
}

#[test]
fn test_rhai_formula_over_cube() {
    let ctx = Arc::new(context(Settings::default()));
    build_accounts(&ctx);
    setdata(&ctx, Value::Float(80.0), &["Revenue", "2025"]);
    setdata(&ctx, Value::Float(20.0), &["Costs", "2025"]);

    let mut engine = rhai::Engine::new();
    palosheet::register_palo_functions(&mut engine, Arc::clone(&ctx));
    let margin: f64 = engine
        .eval(
            r#"
            let profit = PALO_DATA(["olap/Finance", "PnL", "Profit", "2025"]);
            let revenue = PALO_DATA(["olap/Finance", "PnL", "Revenue", "2025"]);
            profit / revenue
            "#,
        )
        .unwrap();
    assert_eq!(margin, 0.75);
}
