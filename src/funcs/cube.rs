use std::sync::Arc;

use palosheet_core::codec::{string_array, string_array_array};
use palosheet_core::types::{CellValue, CellValueWithProperties, SplashMode};
use palosheet_core::{Cube, Decode, Encode, Result, Value};

use super::{Args, FunctionContext};

fn cube(args: &Args, ctx: &FunctionContext) -> Result<Arc<dyn Cube>> {
    let database = args.connection(0, &ctx.pool)?;
    Ok(database.cube(&args.string(2)?)?)
}

/// Coordinates from `from` onwards, either spread out or as one array.
fn coordinates(args: &mut Args, from: usize) -> Result<Vec<String>> {
    args.collapse_to_array(from);
    string_array(args.get(from), false)
}

pub(super) fn cube_info(args: &mut Args, ctx: &FunctionContext) -> Result<Value> {
    cube(args, ctx)?.info()?.encode()
}

/// `server, database, cube, coordinates...`
pub(super) fn data(args: &mut Args, ctx: &FunctionContext) -> Result<Value> {
    let path = coordinates(args, 3)?;
    let cell = cube(args, ctx)?.cell_value(&path, &[])?;
    Ok(CellValue::from_data(&cell)?.encode_with(ctx.settings.error_descriptions))
}

/// `server, database, cube, properties, coordinates...`
pub(super) fn data_with_properties(args: &mut Args, ctx: &FunctionContext) -> Result<Value> {
    let properties = string_array(args.get(3), true)?;
    let path = coordinates(args, 4)?;
    let cell = cube(args, ctx)?.cell_value(&path, &properties)?;
    CellValueWithProperties::from_data(&cell)?.encode_with(ctx.settings.error_descriptions)
}

/// `value, splash, server, database, cube, coordinates...`
pub(super) fn set_data(args: &mut Args, ctx: &FunctionContext) -> Result<Value> {
    let value = CellValue::decode(args.get(0))?;
    let requested = args.optional::<SplashMode>(1)?.unwrap_or(SplashMode::Default);
    let splash = if ctx.settings.splashing_allowed {
        requested
    } else {
        SplashMode::None
    };
    let path = coordinates(args, 5)?;
    let database = args.connection(2, &ctx.pool)?;
    let cube = database.cube(&args.string(4)?)?;
    cube.set_cell_value(&path, &value, splash)?;
    Ok(value.encode_with(ctx.settings.error_descriptions))
}

pub(super) fn rules(args: &mut Args, ctx: &FunctionContext) -> Result<Value> {
    cube(args, ctx)?.rules()?.encode()
}

/// `server, database, cube, definition, [extern_id], [comment], [activate]`
pub(super) fn create_rule(args: &mut Args, ctx: &FunctionContext) -> Result<Value> {
    let definition = args.string(3)?;
    let extern_id = args.optional::<String>(4)?.unwrap_or_default();
    let comment = args.optional::<String>(5)?.unwrap_or_default();
    let activate = args.optional::<bool>(6)?.unwrap_or(true);
    cube(args, ctx)?
        .create_rule(&definition, &extern_id, &comment, activate)?
        .encode()
}

pub(super) fn locks(args: &mut Args, ctx: &FunctionContext) -> Result<Value> {
    cube(args, ctx)?.locks()?.encode()
}

/// `server, database, cube, [area], [user]`
pub(super) fn lock(args: &mut Args, ctx: &FunctionContext) -> Result<Value> {
    let area = if args.is_missing(3) {
        Vec::new()
    } else {
        string_array_array(args.get(3), false)?
    };
    let user = args.optional::<String>(4)?.unwrap_or_default();
    cube(args, ctx)?.lock(&area, &user)?.encode()
}

#[cfg(test)]
mod tests {
    use super::super::{fixture, invoke};
    use crate::config::Settings;
    use palosheet_core::domain::codes;
    use palosheet_core::types::{CubeInfo, LockInfo, RuleInfo};
    use palosheet_core::{Decode, Value, XlError, decode_list};

    fn args(items: &[&str]) -> Vec<Value> {
        items.iter().map(|s| Value::from(*s)).collect()
    }

    #[test]
    fn test_data_spread_and_array_coordinates() {
        let ctx = fixture::context();
        let spread = invoke(
            "PALO.DATA",
            args(&["localhost/Demo", "Sales", "Desktop L", "Jan"]),
            &ctx,
        )
        .unwrap();
        assert_eq!(spread, Value::Float(10.0));

        let mut call = args(&["localhost/Demo", "Sales"]);
        call.push(Value::Array(args(&["Desktops", "Jan"])));
        assert_eq!(invoke("PALO.DATA", call, &ctx).unwrap(), Value::Float(10.0));
    }

    #[test]
    fn test_data_wrong_coordinate_count() {
        let ctx = fixture::context();
        let value = invoke("PALO.DATA", args(&["localhost/Demo", "Sales", "Jan"]), &ctx).unwrap();
        let info = value.as_error().unwrap();
        assert_eq!(info.kind, XlError::Ref);
        assert_eq!(info.code, codes::INVALID_COORDINATES);
    }

    #[test]
    fn test_datav_returns_properties() {
        let ctx = fixture::context();
        let mut call = args(&["localhost/Demo", "Sales"]);
        call.push(Value::Array(args(&["RIGHTS"])));
        call.extend(args(&["Desktop L", "Jan"]));
        let value = invoke("PALO.DATAV", call, &ctx).unwrap();
        assert_eq!(
            value,
            Value::Array(vec![Value::Float(10.0), Value::from("")])
        );
    }

    #[test]
    fn test_setdata_then_data() {
        let ctx = fixture::context();
        let mut call = vec![Value::Float(4.0), Value::Bool(true)];
        call.extend(args(&["localhost/Demo", "Sales", "Desktop M", "Feb"]));
        assert_eq!(invoke("PALO.SETDATA", call, &ctx).unwrap(), Value::Float(4.0));

        let total = invoke(
            "PALO.DATA",
            args(&["localhost/Demo", "Sales", "Desktops", "Feb"]),
            &ctx,
        )
        .unwrap();
        assert_eq!(total, Value::Float(4.0));
    }

    #[test]
    fn test_setdata_splash_add() {
        let ctx = fixture::context();
        let mut call = vec![Value::Float(1.0), Value::from("SPLASH_MODE_ADD")];
        call.extend(args(&["localhost/Demo", "Sales", "Desktops", "Jan"]));
        invoke("PALO.SETDATA", call, &ctx).unwrap();

        let total = invoke(
            "PALO.DATA",
            args(&["localhost/Demo", "Sales", "Desktops", "Jan"]),
            &ctx,
        )
        .unwrap();
        assert_eq!(total, Value::Float(12.0));
    }

    #[test]
    fn test_setdata_splashing_disallowed() {
        let ctx = fixture::context_with(Settings {
            splashing_allowed: false,
            ..Settings::default()
        });
        let mut call = vec![Value::Float(5.0), Value::Bool(true)];
        call.extend(args(&["localhost/Demo", "Sales", "Desktops", "Jan"]));
        let value = invoke("PALO.SETDATA", call, &ctx).unwrap();
        let info = value.as_error().unwrap();
        assert_eq!(info.kind, XlError::Value);
        assert_eq!(info.code, codes::SPLASH_DISABLED);
    }

    #[test]
    fn test_cube_info() {
        let ctx = fixture::context();
        let value = invoke("PALO.CUBE_INFO", args(&["localhost/Demo", "Sales"]), &ctx).unwrap();
        let info = CubeInfo::decode(&value).unwrap();
        assert_eq!(info.name, "Sales");
        assert_eq!(info.dimensions.len(), 2);
        assert_eq!(info.number_filled_cells, 1);
    }

    #[test]
    fn test_rule_create_and_list() {
        let ctx = fixture::context();
        let created = invoke(
            "PALO.CUBE_RULE_CREATE",
            args(&["localhost/Demo", "Sales", "['Jan'] = 1", "", "first rule"]),
            &ctx,
        )
        .unwrap();
        let rule = RuleInfo::decode(&created).unwrap();
        assert!(rule.activated);
        assert_eq!(rule.comment, "first rule");

        let listed = invoke("PALO.CUBE_RULES", args(&["localhost/Demo", "Sales"]), &ctx).unwrap();
        let rules: Vec<RuleInfo> = decode_list(&listed, false).unwrap();
        assert_eq!(rules, vec![rule]);
    }

    #[test]
    fn test_lock_whole_cube_blocks_writes() {
        let ctx = fixture::context();
        let locked = invoke("PALO.CUBE_LOCK", args(&["localhost/Demo", "Sales"]), &ctx).unwrap();
        let lock = LockInfo::decode(&locked).unwrap();
        assert_eq!(lock.area.len(), 2);

        let locks = invoke("PALO.CUBE_LOCKS", args(&["localhost/Demo", "Sales"]), &ctx).unwrap();
        assert_eq!(locks.array_len(), Some(1));

        let mut call = vec![Value::Float(1.0), Value::Bool(true)];
        call.extend(args(&["localhost/Demo", "Sales", "Desktop L", "Jan"]));
        let value = invoke("PALO.SETDATA", call, &ctx).unwrap();
        assert_eq!(value.as_error().unwrap().code, codes::CUBE_BLOCKED_BY_LOCK);
    }
}
