use palosheet_core::{Encode, Result, Value};

use super::{Args, FunctionContext};

pub(super) fn ping(args: &mut Args, ctx: &FunctionContext) -> Result<Value> {
    args.server(0, &ctx.pool)?.ping()?;
    Ok(Value::Bool(true))
}

pub(super) fn server_info(args: &mut Args, ctx: &FunctionContext) -> Result<Value> {
    args.server(0, &ctx.pool)?.info()?.encode()
}

pub(super) fn license_info(args: &mut Args, ctx: &FunctionContext) -> Result<Value> {
    args.server(0, &ctx.pool)?.license_info()?.encode()
}

pub(super) fn list_databases(args: &mut Args, ctx: &FunctionContext) -> Result<Value> {
    args.server(0, &ctx.pool)?.database_names()?.encode()
}

pub(super) fn database_info(args: &mut Args, ctx: &FunctionContext) -> Result<Value> {
    args.connection(0, &ctx.pool)?.info()?.encode()
}

pub(super) fn list_dimensions(args: &mut Args, ctx: &FunctionContext) -> Result<Value> {
    args.connection(0, &ctx.pool)?.dimension_names()?.encode()
}

pub(super) fn list_cubes(args: &mut Args, ctx: &FunctionContext) -> Result<Value> {
    args.connection(0, &ctx.pool)?.cube_names()?.encode()
}

#[cfg(test)]
mod tests {
    use super::super::{fixture, invoke};
    use palosheet_core::types::ServerInfo;
    use palosheet_core::{Decode, Value, XlError};

    #[test]
    fn test_ping_and_info() {
        let ctx = fixture::context();
        assert_eq!(
            invoke("PALO.PING", vec![Value::from("localhost")], &ctx).unwrap(),
            Value::Bool(true)
        );
        let info = invoke("PALO.SERVER_INFO", vec![Value::from("localhost")], &ctx).unwrap();
        let info = ServerInfo::decode(&info).unwrap();
        assert_eq!(info.major_version, 5);
    }

    #[test]
    fn test_server_name_ignores_database_part() {
        let ctx = fixture::context();
        let value = invoke("PALO.PING", vec![Value::from("LocalHost/Demo")], &ctx).unwrap();
        assert_eq!(value, Value::Bool(true));
    }

    #[test]
    fn test_unknown_server_is_ref() {
        let ctx = fixture::context();
        let value = invoke("PALO.PING", vec![Value::from("remote")], &ctx).unwrap();
        assert_eq!(value.as_error().map(|e| e.kind), Some(XlError::Ref));
    }

    #[test]
    fn test_list_dimensions_and_cubes() {
        let ctx = fixture::context();
        let dims = invoke(
            "PALO.DATABASE_LIST_DIMENSIONS",
            vec![Value::from("localhost/Demo")],
            &ctx,
        )
        .unwrap();
        assert_eq!(
            dims,
            Value::Array(vec![Value::from("Products"), Value::from("Months")])
        );
        let cubes = invoke("PALO.DATABASE_LIST_CUBES", vec![Value::from("localhost/Demo")], &ctx)
            .unwrap();
        assert_eq!(cubes, Value::Array(vec![Value::from("Sales")]));
        let dbs = invoke("PALO.ROOT_LIST_DATABASES", vec![Value::from("localhost")], &ctx).unwrap();
        assert_eq!(dbs, Value::Array(vec![Value::from("Demo")]));
    }
}
