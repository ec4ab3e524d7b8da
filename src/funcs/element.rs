use std::sync::Arc;

use palosheet_core::types::{ConsolidationElement, DimensionElementType};
use palosheet_core::{Decode, Dimension, Encode, Result, Value, decode_list};

use super::{Args, FunctionContext};

/// The dimension named by argument 2 of a `server, database, dimension` call.
pub(super) fn dimension(args: &Args, ctx: &FunctionContext) -> Result<Arc<dyn Dimension>> {
    let database = args.connection(0, &ctx.pool)?;
    Ok(database.dimension(&args.string(2)?)?)
}

fn children(value: &Value) -> Result<Vec<ConsolidationElement>> {
    decode_list(value, true)
}

pub(super) fn dimension_info(args: &mut Args, ctx: &FunctionContext) -> Result<Value> {
    dimension(args, ctx)?.info()?.encode()
}

pub(super) fn list_elements(args: &mut Args, ctx: &FunctionContext) -> Result<Value> {
    let elements = dimension(args, ctx)?.elements()?;
    elements
        .iter()
        .map(|e| e.simple())
        .collect::<Vec<_>>()
        .encode()
}

pub(super) fn count(args: &mut Args, ctx: &FunctionContext) -> Result<Value> {
    Ok(Value::from(dimension(args, ctx)?.element_count()?))
}

pub(super) fn element_type(args: &mut Args, ctx: &FunctionContext) -> Result<Value> {
    let element = dimension(args, ctx)?.element(&args.string(3)?)?;
    element.element_type.encode()
}

pub(super) fn element_info(args: &mut Args, ctx: &FunctionContext) -> Result<Value> {
    dimension(args, ctx)?.element(&args.string(3)?)?.encode()
}

/// `server, database, dimension, type, name, [children]`
pub(super) fn add(args: &mut Args, ctx: &FunctionContext) -> Result<Value> {
    let element_type = DimensionElementType::decode(args.get(3))?;
    let name = args.string(4)?;
    if name.is_empty() {
        return Ok(Value::Null);
    }
    let children = children(args.get(5))?;
    let added = dimension(args, ctx)?.add_element(&name, element_type, &children)?;
    Ok(Value::from(added.name))
}

/// `server, database, dimension, name, type, children, [append]`
pub(super) fn update(args: &mut Args, ctx: &FunctionContext) -> Result<Value> {
    let name = args.string(3)?;
    if name.is_empty() {
        return Ok(Value::Null);
    }
    let element_type = DimensionElementType::decode(args.get(4))?;
    let children = children(args.get(5))?;
    let append = args.optional::<bool>(6)?.unwrap_or(false);
    dimension(args, ctx)?.update_element(&name, element_type, &children, append)?;
    Ok(Value::Bool(true))
}

pub(super) fn consolidation_elements(args: &mut Args, ctx: &FunctionContext) -> Result<Value> {
    dimension(args, ctx)?
        .consolidation_elements(&args.string(3)?)?
        .encode()
}

#[cfg(test)]
mod tests {
    use super::super::{fixture, invoke};
    use palosheet_core::types::{ConsolidationElementInfo, DimensionElementInfo};
    use palosheet_core::{Decode, Value, XlError, decode_list};

    fn args(items: &[&str]) -> Vec<Value> {
        items.iter().map(|s| Value::from(*s)).collect()
    }

    fn child(name: &str, weight: f64) -> Value {
        Value::Array(vec![Value::from(name), Value::Float(weight)])
    }

    #[test]
    fn test_etype_and_ecount() {
        let ctx = fixture::context();
        let kind = invoke("PALO.ETYPE", args(&["localhost/Demo", "Products", "Desktops"]), &ctx)
            .unwrap();
        assert_eq!(kind, Value::from("consolidated"));
        let count = invoke("PALO.ECOUNT", args(&["localhost/Demo", "Months"]), &ctx).unwrap();
        assert_eq!(count, Value::Integer(2));
    }

    #[test]
    fn test_einfo_decodes() {
        let ctx = fixture::context();
        let value = invoke("PALO.EINFO", args(&["localhost/Demo", "Products", "Desktop L"]), &ctx)
            .unwrap();
        let info = DimensionElementInfo::decode(&value).unwrap();
        assert_eq!(info.name, "Desktop L");
        assert_eq!(info.parents.len(), 1);
    }

    #[test]
    fn test_missing_element_is_ref() {
        let ctx = fixture::context();
        let value = invoke("PALO.ETYPE", args(&["localhost/Demo", "Products", "Laptop"]), &ctx)
            .unwrap();
        assert_eq!(value.as_error().map(|e| e.kind), Some(XlError::Ref));
    }

    #[test]
    fn test_eadd_with_children() {
        let ctx = fixture::context();
        let mut call = args(&["localhost/Demo", "Months", "C", "Qtr1"]);
        call.push(Value::Array(vec![child("Jan", 1.0), child("Feb", 1.0)]));
        let value = invoke("PALO.EADD", call, &ctx).unwrap();
        assert_eq!(value, Value::from("Qtr1"));

        let listed = invoke(
            "PALO.ELEMENT_LIST_CONSOLIDATION_ELEMENTS",
            args(&["localhost/Demo", "Months", "Qtr1"]),
            &ctx,
        )
        .unwrap();
        let children: Vec<ConsolidationElementInfo> = decode_list(&listed, false).unwrap();
        let names: Vec<&str> = children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Jan", "Feb"]);
    }

    #[test]
    fn test_eadd_empty_name_is_null() {
        let ctx = fixture::context();
        let value =
            invoke("PALO.EADD", args(&["localhost/Demo", "Months", "N", ""]), &ctx).unwrap();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn test_eadd_bad_type_is_value_error() {
        let ctx = fixture::context();
        let value = invoke("PALO.EADD", args(&["localhost/Demo", "Months", "X", "Mar"]), &ctx)
            .unwrap();
        assert_eq!(value.as_error().map(|e| e.kind), Some(XlError::Value));
    }

    #[test]
    fn test_eupdate_appends() {
        let ctx = fixture::context();
        let mut call = args(&["localhost/Demo", "Months", "C", "Qtr1"]);
        call.push(Value::Array(vec![child("Jan", 1.0)]));
        invoke("PALO.EADD", call, &ctx).unwrap();

        let mut update = args(&["localhost/Demo", "Months", "Qtr1", "C"]);
        update.push(Value::Array(vec![child("Feb", 2.0)]));
        update.push(Value::Bool(true));
        assert_eq!(invoke("PALO.EUPDATE", update, &ctx).unwrap(), Value::Bool(true));

        let value =
            invoke("PALO.EINFO", args(&["localhost/Demo", "Months", "Qtr1"]), &ctx).unwrap();
        let info = DimensionElementInfo::decode(&value).unwrap();
        assert_eq!(info.children.len(), 2);
    }
}
