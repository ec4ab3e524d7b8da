//! Rhai bridge: exposes the `PALO.*` functions to formula scripts.
//!
//! Each function is registered as `PALO_<NAME>` taking one array of
//! arguments, e.g. `PALO_ETYPE(["localhost/Demo", "Products", "Desktop L"])`.
//! Error values reach the script as their display string (`#REF!`).

use std::sync::Arc;

use palosheet_core::Value;
use rhai::{Array, Dynamic, Engine, EvalAltResult, Position};

use crate::funcs::{FunctionContext, functions, invoke};

fn invalid_arg(message: &str) -> Box<EvalAltResult> {
    EvalAltResult::ErrorRuntime(message.into(), Position::NONE).into()
}

pub fn to_dynamic(value: &Value) -> Dynamic {
    match value {
        Value::Null => Dynamic::UNIT,
        Value::Bool(b) => Dynamic::from(*b),
        Value::Integer(i) => Dynamic::from(*i),
        Value::Float(n) => Dynamic::from(*n),
        Value::String(s) => Dynamic::from(s.clone()),
        Value::Array(items) => Dynamic::from_array(items.iter().map(to_dynamic).collect()),
        Value::Error(info) => Dynamic::from(info.kind.as_str().to_string()),
    }
}

/// Convert a script value. Types without a cell counterpart are passed as
/// their display string.
pub fn from_dynamic(value: &Dynamic) -> Value {
    if value.is_unit() {
        return Value::Null;
    }
    if let Ok(b) = value.as_bool() {
        return Value::Bool(b);
    }
    if let Ok(i) = value.as_int() {
        return Value::Integer(i);
    }
    if let Ok(n) = value.as_float() {
        return Value::Float(n);
    }
    if value.is_array() {
        let items = value.clone().into_array().unwrap_or_default();
        return Value::Array(items.iter().map(from_dynamic).collect());
    }
    match value.clone().into_string() {
        Ok(s) => Value::String(s),
        Err(_) => Value::String(value.to_string()),
    }
}

/// Register every `PALO.*` function into the Rhai engine.
pub fn register_palo_functions(engine: &mut Engine, ctx: Arc<FunctionContext>) {
    for function in functions() {
        let ctx = Arc::clone(&ctx);
        let name = function.name;
        engine.register_fn(
            function.script_name(),
            move |args: Array| -> Result<Dynamic, Box<EvalAltResult>> {
                let args = args.iter().map(from_dynamic).collect();
                match invoke(name, args, &ctx) {
                    Ok(value) => Ok(to_dynamic(&value)),
                    Err(err) => Err(invalid_arg(&err.to_string())),
                }
            },
        );
    }
    tracing::debug!(count = functions().len(), "registered palo functions");
}
