use palosheet_core::codec::string_array;
use palosheet_core::types::filter_flags::{data, pick_list, sorting, structural, text};
use palosheet_core::types::{
    BasicFilter, CellValue, DataComparison, DataFilter, ElementList, FieldFilter, SortingFilter,
    StructuralFilter, SubsetDefinition, TextFilter,
};
use palosheet_core::{ArrayBuilder, CellError, Decode, Encode, PaloError, Result, Value};

use super::element::dimension;
use super::{Args, FunctionContext};

/// Null or the empty string.
fn blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// An enumerated argument, `None` when left blank.
fn choice(args: &Args, index: usize) -> Result<Option<u32>> {
    if blank(args.get(index)) {
        Ok(None)
    } else {
        args.decode(index).map(Some)
    }
}

fn out_of_range(what: &str, found: u32) -> PaloError {
    PaloError::InvalidArgumentValue(format!("{what} {found}"))
}

fn flag_if(args: &Args, index: usize, flag: u32) -> Result<u32> {
    Ok(match args.optional::<bool>(index)? {
        Some(true) => flag,
        _ => 0,
    })
}

fn definition(args: &Args) -> Result<SubsetDefinition> {
    let indent = if args.is_missing(3) {
        1
    } else {
        args.get(3).as_integer()?
    };
    SubsetDefinition::from_arguments(indent, args.get(4), args.rest(5))
}

/// `server, database, dimension, [indent], [alias], filters...`
pub(super) fn subset(args: &mut Args, ctx: &FunctionContext) -> Result<Value> {
    let definition = definition(args)?;
    dimension(args, ctx)?.subset(&definition)?.encode()
}

pub(super) fn subset_size(args: &mut Args, ctx: &FunctionContext) -> Result<Value> {
    let definition = definition(args)?;
    Ok(Value::from(dimension(args, ctx)?.subset(&definition)?.len()))
}

/// `[pick list], [pick type]`
///
/// The pick list is either a list of names or two rows: names, then paths.
pub(super) fn basic_filter(args: &mut Args, _ctx: &FunctionContext) -> Result<Value> {
    let flags = match choice(args, 1)? {
        None => 0,
        Some(0) => pick_list::INSERT_FRONT,
        Some(1) => pick_list::INSERT_BACK,
        Some(2) => pick_list::MERGE,
        Some(3) => pick_list::SUB,
        Some(other) => return Err(out_of_range("pick type", other)),
    };
    let (manual_subset, manual_paths) = match args.get(0) {
        Value::Null => (None, None),
        Value::Array(rows) if rows.first().is_some_and(Value::is_array) => (
            Some(string_array(&rows[0], true)?),
            rows.get(1).map(|row| string_array(row, true)).transpose()?,
        ),
        other => (Some(string_array(other, true)?), None),
    };
    BasicFilter {
        flags,
        manual_subset,
        manual_paths,
    }
    .encode()
}

/// `regexps, [extended]`
pub(super) fn text_filter(args: &mut Args, _ctx: &FunctionContext) -> Result<Value> {
    let flags = match args.get(1) {
        Value::Null => 0,
        Value::Bool(true) => text::EXTENDED,
        Value::Bool(false) => 0,
        other => {
            return Err(CellError::TypeMismatch {
                expected: "bool",
                found: other.tag(),
            }
            .into());
        }
    };
    TextFilter {
        flags,
        regexps: string_array(args.get(0), true)?,
    }
    .encode()
}

/// `[whole], [criteria], [attribute], [type limitation], [level], [reverse],
/// [show duplicates], [limit count], [limit start], [path]`
pub(super) fn sorting_filter(args: &mut Args, _ctx: &FunctionContext) -> Result<Value> {
    let mut flags = match choice(args, 0)? {
        None | Some(0) => 0,
        Some(1) => sorting::WHOLE,
        Some(2) => sorting::WHOLE | sorting::NO_CHILDREN,
        Some(other) => return Err(out_of_range("sorting scope", other)),
    };
    flags |= match choice(args, 1)? {
        None => 0,
        Some(0) => sorting::POSITION,
        Some(1) => sorting::NUMERIC,
        Some(2) => sorting::TEXT,
        Some(3) => sorting::USE_ALIAS,
        Some(4) => sorting::CONSOLIDATION_ORDER,
        Some(other) => return Err(out_of_range("sorting criteria", other)),
    };
    let attribute = args.optional::<String>(2)?.unwrap_or_default();
    flags |= match choice(args, 3)? {
        None | Some(0) => 0,
        Some(1) => sorting::LEAVES_ONLY,
        Some(2) => sorting::CONSOLIDATED_ONLY,
        Some(other) => return Err(out_of_range("type limitation", other)),
    };
    let level = choice(args, 4)?;
    flags |= match choice(args, 5)? {
        None | Some(0) => 0,
        Some(1) => sorting::REVERSE_ORDER,
        Some(2) => sorting::REVERSE_TOTAL,
        Some(3) => sorting::REVERSE_TOTAL | sorting::REVERSE_ORDER,
        Some(4) => sorting::REVERSE_TOTAL_EX,
        Some(5) => sorting::REVERSE_TOTAL | sorting::REVERSE_TOTAL_EX,
        Some(6) => sorting::REVERSE_TOTAL | sorting::REVERSE_ORDER | sorting::REVERSE_TOTAL_EX,
        Some(other) => return Err(out_of_range("reverse mode", other)),
    };
    if choice(args, 6)? == Some(1) {
        flags |= sorting::SHOW_DUPLICATES;
    }

    let mut limit_count = u32::MAX;
    let mut limit_start = 0;
    if let Some(count) = choice(args, 7)? {
        flags |= sorting::LIMIT;
        limit_count = count;
        limit_start = choice(args, 8)?.unwrap_or(0);
    }
    flags |= flag_if(args, 9, sorting::PATH)?;

    SortingFilter {
        attribute,
        level,
        limit_count,
        limit_start,
        flags,
    }
    .encode()
}

/// `[bound], [above], [exclusive], [hide], [revolve element], [revolve count],
/// [revolve add], [level start], [level end]`
pub(super) fn structural_filter(args: &mut Args, _ctx: &FunctionContext) -> Result<Value> {
    let bound = args.optional::<String>(0)?.unwrap_or_default();
    let above = args.optional::<bool>(1)?.unwrap_or(false);
    let exclusive = args.optional::<bool>(2)?.unwrap_or(false);

    let mut flags = match (bound.is_empty(), above, exclusive) {
        (true, _, _) => 0,
        (false, true, true) => structural::ABOVE_EXCLUSIVE,
        (false, true, false) => structural::ABOVE_INCLUSIVE,
        (false, false, true) => structural::BELOW_EXCLUSIVE,
        (false, false, false) => structural::BELOW_INCLUSIVE,
    };
    flags |= match choice(args, 3)? {
        None | Some(0) => 0,
        Some(1) => structural::HIDE_LEAVES,
        Some(2) => structural::HIDE_CONSOLIDATED,
        Some(other) => return Err(out_of_range("hide mode", other)),
    };
    flags |= match choice(args, 6)? {
        None | Some(0) => 0,
        Some(1) => structural::REVOLVE_ADD_BELOW,
        Some(2) => structural::REVOLVE_ADD_ABOVE,
        Some(other) => return Err(out_of_range("revolve mode", other)),
    };

    let revolve = if args.len() >= 6 && !blank(args.get(5)) {
        let element = if blank(args.get(4)) {
            String::new()
        } else {
            args.string(4)?
        };
        Some((element, args.get(5).as_integer()?))
    } else {
        None
    };
    let level = if args.len() >= 9 && !blank(args.get(7)) {
        Some((args.get(7).as_integer()?, args.get(8).as_integer()?))
    } else {
        None
    };

    StructuralFilter {
        flags,
        bound,
        revolve,
        level,
    }
    .encode()
}

/// A `[rows, cols, data...]` matrix, one attribute per column.
pub(super) fn alias_filter(args: &mut Args, _ctx: &FunctionContext) -> Result<Value> {
    let (rows, cols, cursor) = args.get(0).as_matrix()?;
    if rows == 0 && cols > 0 {
        return Err(PaloError::InvalidArgumentFormat(format!(
            "alias matrix has {cols} columns but no rows"
        )));
    }
    let cells = cursor
        .take(rows * cols)
        .map(|cell| {
            if cell.is_missing() {
                Ok(String::new())
            } else {
                cell.as_string()
            }
        })
        .collect::<std::result::Result<Vec<String>, CellError>>()?;
    let columns = (0..cols)
        .map(|col| (0..rows).map(|row| cells[row * cols + col].clone()).collect())
        .collect();
    FieldFilter { columns }.encode()
}

fn comparison(op: &Value, operand: &Value) -> Result<DataComparison> {
    Ok(DataComparison {
        op: op.as_string()?,
        operand: CellValue::decode(operand)?,
    })
}

/// `subcube, [operators], [top], [upper percentage], [lower percentage],
/// [cell operator], [ignore rules]`
pub(super) fn data_filter(args: &mut Args, _ctx: &FunctionContext) -> Result<Value> {
    if args.is_missing(0) {
        return Err(CellError::TypeMismatch {
            expected: "subcube",
            found: args.get(0).tag(),
        }
        .into());
    }
    let mut subcube = args.get(0).as_array()?;
    let cube = subcube.next_value()?.as_string()?;
    let count = subcube.next_value()?.as_unsigned()?;
    let coords = if count > 0 {
        let mut lists = Vec::new();
        for _ in 0..count {
            let list = subcube.next_value()?;
            lists.push(if list.is_missing() {
                ElementList::All
            } else {
                ElementList::decode(list)?
            });
        }
        Some(lists)
    } else {
        None
    };

    let (first, second) = if blank(args.get(1)) {
        (None, None)
    } else {
        let operators: Vec<&Value> = args.get(1).as_array()?.collect();
        match operators.as_slice() {
            [op, par] => (Some(comparison(op, par)?), None),
            [op1, par1, op2, par2] => (
                Some(comparison(op1, par1)?),
                Some(comparison(op2, par2)?),
            ),
            other => {
                return Err(PaloError::InvalidArgumentFormat(format!(
                    "data filter operators need 2 or 4 entries, found {}",
                    other.len()
                )));
            }
        }
    };

    let flags = match choice(args, 5)? {
        None | Some(0) => data::DATA_SUM,
        Some(1) => data::DATA_ALL,
        Some(2) => data::DATA_AVERAGE,
        Some(3) => data::DATA_MAX,
        Some(4) => data::DATA_ANY,
        Some(5) => data::DATA_MIN,
        Some(6) => data::DATA_STRING,
        Some(other) => return Err(out_of_range("cell operator", other)),
    };

    DataFilter {
        cube,
        coords,
        first,
        second,
        top: args.optional(2)?,
        upper_percentage: args.optional(3)?,
        lower_percentage: args.optional(4)?,
        use_rules: !args.optional::<bool>(6)?.unwrap_or(false),
        flags,
    }
    .encode()
}

/// `cube, element lists...`; a missing list stands for every element.
pub(super) fn subcube(args: &mut Args, _ctx: &FunctionContext) -> Result<Value> {
    let lists = args.rest(1);
    let mut a = ArrayBuilder::new(2 + lists.len());
    a.append_named("cube", args.string(0)?)?
        .append_named("coords_count", lists.len())?;
    for list in lists {
        let coord = if list.is_missing() {
            Value::Null
        } else {
            ElementList::decode(list)?.encode()?
        };
        a.append_named("coord", coord)?;
    }
    Ok(a.finish()?)
}

#[cfg(test)]
mod tests {
    use super::super::{fixture, invoke};
    use super::*;
    use palosheet_core::types::SubsetResult;
    use palosheet_core::{XlError, decode_list};

    fn strings(items: &[&str]) -> Vec<Value> {
        items.iter().map(|s| Value::from(*s)).collect()
    }

    fn call(name: &str, args: Vec<Value>) -> Value {
        invoke(name, args, &fixture::context()).unwrap()
    }

    fn names(value: &Value) -> Vec<String> {
        let results: Vec<SubsetResult> = decode_list(value, false).unwrap();
        results.into_iter().map(|r| r.name).collect()
    }

    fn subset_call(filters: Vec<Value>) -> Vec<Value> {
        let mut args = strings(&["localhost/Demo", "Products"]);
        args.push(Value::Integer(1));
        args.push(Value::Null);
        args.extend(filters);
        args
    }

    #[test]
    fn test_subset_without_filters() {
        let value = call("PALO.SUBSET", strings(&["localhost/Demo", "Products"]));
        assert_eq!(names(&value), vec!["Desktop L", "Desktop M", "Desktops"]);
        let size = call("PALO.SUBSET_SIZE", strings(&["localhost/Demo", "Products"]));
        assert_eq!(size, Value::Integer(3));
    }

    #[test]
    fn test_structural_filter_below_hiding_consolidated() {
        let filter = call(
            "PALO.SUBSET_STRUCTURAL_FILTER",
            vec![
                Value::from("Desktops"),
                Value::Bool(false),
                Value::Bool(false),
                Value::Integer(2),
            ],
        );
        let flags = &filter.as_array().unwrap().nth(1).cloned();
        assert_eq!(
            flags,
            &Some(Value::from(structural::BELOW_INCLUSIVE | structural::HIDE_CONSOLIDATED))
        );
        let value = call("PALO.SUBSET", subset_call(vec![filter]));
        assert_eq!(names(&value), vec!["Desktop L", "Desktop M"]);
    }

    #[test]
    fn test_sorting_filter_reverse_text() {
        let filter = call(
            "PALO.SUBSET_SORTING_FILTER",
            vec![
                Value::Null,
                Value::Integer(2),
                Value::Null,
                Value::Null,
                Value::Null,
                Value::Integer(1),
            ],
        );
        let value = call("PALO.SUBSET", subset_call(vec![filter]));
        assert_eq!(names(&value), vec!["Desktops", "Desktop M", "Desktop L"]);
    }

    #[test]
    fn test_sorting_limit() {
        let mut args = vec![Value::Null, Value::Integer(2)];
        args.extend(std::iter::repeat_n(Value::Null, 5));
        args.push(Value::Integer(2));
        args.push(Value::Integer(1));
        let filter = call("PALO.SUBSET_SORTING_FILTER", args);
        let value = call("PALO.SUBSET", subset_call(vec![filter]));
        assert_eq!(names(&value), vec!["Desktop M", "Desktops"]);
    }

    #[test]
    fn test_text_and_basic_filters() {
        let text = call("PALO.SUBSET_TEXT_FILTER", vec![Value::from("desktop ?")]);
        let value = call("PALO.SUBSET", subset_call(vec![text]));
        assert_eq!(names(&value), vec!["Desktop L", "Desktop M"]);

        let basic = call(
            "PALO.SUBSET_BASIC_FILTER",
            vec![Value::Array(strings(&["Desktops", "Desktop L"]))],
        );
        let value = call("PALO.SUBSET", subset_call(vec![basic]));
        assert_eq!(names(&value), vec!["Desktops", "Desktop L"]);
    }

    #[test]
    fn test_text_filter_extended_must_be_bool() {
        let value = call(
            "PALO.SUBSET_TEXT_FILTER",
            vec![Value::from("^D"), Value::from("yes")],
        );
        assert_eq!(value.as_error().map(|e| e.kind), Some(XlError::Value));
    }

    #[test]
    fn test_basic_filter_rejects_pick_type() {
        let value = call(
            "PALO.SUBSET_BASIC_FILTER",
            vec![Value::from("Desktops"), Value::Integer(7)],
        );
        let info = value.as_error().unwrap();
        assert_eq!(info.code, PaloError::InvalidArgumentValue(String::new()).code());
    }

    #[test]
    fn test_basic_filter_two_rows() {
        let rows = Value::Array(vec![
            Value::Array(strings(&["Desktop L"])),
            Value::Array(strings(&["2/0"])),
        ]);
        let filter = call("PALO.SUBSET_BASIC_FILTER", vec![rows, Value::Integer(1)]);
        let definition = SubsetDefinition::from_arguments(1, &Value::Null, &[filter]).unwrap();
        let basic = definition.basic.unwrap();
        assert_eq!(basic.flags, pick_list::INSERT_BACK);
        assert_eq!(basic.manual_paths, Some(vec!["2/0".to_string()]));
    }

    #[test]
    fn test_alias_filter_builds_field_columns() {
        let matrix = Value::Array(vec![
            Value::Integer(2),
            Value::Integer(2),
            Value::from("a1"),
            Value::from("b1"),
            Value::from("a2"),
            Value::Null,
        ]);
        let filter = call("PALO.SUBSET_ALIAS_FILTER", vec![matrix]);
        let definition = SubsetDefinition::from_arguments(1, &Value::Null, &[filter]).unwrap();
        assert_eq!(
            definition.field.unwrap().columns,
            vec![
                vec!["a1".to_string(), "a2".to_string()],
                vec!["b1".to_string(), String::new()],
            ]
        );
    }

    #[test]
    fn test_alias_filter_rejects_header_without_data() {
        for (rows, cols) in [(0, 1_i64 << 40), (2, 1_i64 << 40)] {
            let matrix = Value::Array(vec![Value::Integer(rows), Value::Integer(cols)]);
            let filter = call("PALO.SUBSET_ALIAS_FILTER", vec![matrix]);
            assert_eq!(filter.as_error().map(|e| e.kind), Some(XlError::Value));
        }
    }

    #[test]
    fn test_data_filter_from_subcube() {
        let subcube = call(
            "PALO.SUBCUBE",
            vec![Value::from("Sales"), Value::Null, Value::Array(strings(&["Jan"]))],
        );
        let operators = Value::Array(vec![Value::from(">"), Value::Integer(5)]);
        let filter = call(
            "PALO.SUBSET_DATA_FILTER",
            vec![subcube, operators, Value::Integer(3)],
        );
        let definition = SubsetDefinition::from_arguments(1, &Value::Null, &[filter]).unwrap();
        let data = definition.data.unwrap();
        assert_eq!(data.cube, "Sales");
        assert_eq!(
            data.coords,
            Some(vec![ElementList::All, ElementList::Names(vec!["Jan".to_string()])])
        );
        assert_eq!(data.first.unwrap().operand, CellValue::Numeric(5.0));
        assert_eq!(data.top, Some(3));
        assert!(data.use_rules);
        assert_eq!(data.flags, data::DATA_SUM);
    }

    #[test]
    fn test_data_filter_operator_count() {
        let subcube = call("PALO.SUBCUBE", vec![Value::from("Sales")]);
        let operators = Value::Array(vec![Value::from(">")]);
        let value = call("PALO.SUBSET_DATA_FILTER", vec![subcube, operators]);
        let info = value.as_error().unwrap();
        assert_eq!(info.code, PaloError::InvalidArgumentFormat(String::new()).code());
    }

    #[test]
    fn test_data_filter_is_ignored_by_memory_subset() {
        let subcube = call("PALO.SUBCUBE", vec![Value::from("Sales")]);
        let filter = call("PALO.SUBSET_DATA_FILTER", vec![subcube]);
        let value = call("PALO.SUBSET_SIZE", subset_call(vec![filter]));
        assert_eq!(value, Value::Integer(3));
    }
}
