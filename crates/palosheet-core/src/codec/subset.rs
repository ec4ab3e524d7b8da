//! Subset filter descriptors.
//!
//! A descriptor is an array whose first slot names the filter type. Optional
//! fields are written as null ("unset") so every descriptor of a given filter
//! type has the same layout.

use palosheet_cell::{ArrayBuilder, Cursor, Value};

use super::{Decode, Encode, field, record, string_array};
use crate::error::{PaloError, Result};
use crate::types::{
    AliasFilter, BasicFilter, CellValue, DataComparison, DataFilter, ElementList, FieldFilter,
    SortingFilter, StructuralFilter, SubsetDefinition, SubsetResult, TextFilter,
};

/// Consume an unset slot. Returns false, without advancing, if the slot is set.
fn take_unset(cursor: &mut Cursor<'_>, width: usize) -> Result<bool> {
    if cursor.peek_missing() {
        cursor.skip_values(width)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

fn optional<T: Encode>(value: &Option<T>) -> Result<Value> {
    match value {
        Some(v) => v.encode(),
        None => Ok(Value::Null),
    }
}

impl Encode for BasicFilter {
    fn encode(&self) -> Result<Value> {
        let mut a = ArrayBuilder::new(4);
        a.append_named("filter_type", "Basic")?
            .append_named("flags", self.flags)?
            .append_named("manual_subset", optional(&self.manual_subset)?)?
            .append_named("manual_paths", optional(&self.manual_paths)?)?;
        Ok(a.finish()?)
    }
}

fn decode_basic(c: &mut Cursor<'_>) -> Result<BasicFilter> {
    let flags = field(c)?;
    let manual_subset = if take_unset(c, 1)? {
        None
    } else {
        Some(string_array(c.next_value()?, false)?)
    };
    let manual_paths = if take_unset(c, 1)? {
        None
    } else {
        Some(string_array(c.next_value()?, false)?)
    };
    Ok(BasicFilter {
        flags,
        manual_subset,
        manual_paths,
    })
}

impl Encode for TextFilter {
    fn encode(&self) -> Result<Value> {
        let mut a = ArrayBuilder::new(3);
        a.append_named("filter_type", "Text")?
            .append_named("flags", self.flags)?
            .append_named("regexps", self.regexps.encode()?)?;
        Ok(a.finish()?)
    }
}

fn decode_text(c: &mut Cursor<'_>) -> Result<TextFilter> {
    Ok(TextFilter {
        flags: field(c)?,
        regexps: string_array(c.next_value()?, false)?,
    })
}

impl Encode for SortingFilter {
    fn encode(&self) -> Result<Value> {
        let mut a = ArrayBuilder::new(6);
        a.append_named("filter_type", "Sorting")?
            .append_named("attribute", &self.attribute)?
            .append_named("level", optional(&self.level)?)?
            .append_named("limit_count", self.limit_count)?
            .append_named("limit_start", self.limit_start)?
            .append_named("flags", self.flags)?;
        Ok(a.finish()?)
    }
}

fn decode_sorting(c: &mut Cursor<'_>) -> Result<SortingFilter> {
    let attribute = field(c)?;
    let level = if take_unset(c, 1)? {
        None
    } else {
        Some(field(c)?)
    };
    Ok(SortingFilter {
        attribute,
        level,
        limit_count: field(c)?,
        limit_start: field(c)?,
        flags: field(c)?,
    })
}

impl Encode for StructuralFilter {
    fn encode(&self) -> Result<Value> {
        let (revolve_element, revolve_count) = match &self.revolve {
            Some((element, count)) => (Value::from(element.as_str()), Value::Integer(*count)),
            None => (Value::Null, Value::Null),
        };
        let (level_start, level_end) = match self.level {
            Some((start, end)) => (Value::Integer(start), Value::Integer(end)),
            None => (Value::Null, Value::Null),
        };
        let mut a = ArrayBuilder::new(7);
        a.append_named("filter_type", "Structural")?
            .append_named("flags", self.flags)?
            .append_named("bound", &self.bound)?
            .append_named("revolve_element", revolve_element)?
            .append_named("revolve_count", revolve_count)?
            .append_named("level_start", level_start)?
            .append_named("level_end", level_end)?;
        Ok(a.finish()?)
    }
}

fn decode_structural(c: &mut Cursor<'_>) -> Result<StructuralFilter> {
    let flags = field(c)?;
    let bound = field(c)?;
    let revolve = if take_unset(c, 2)? {
        None
    } else {
        Some((field(c)?, field(c)?))
    };
    let level = if take_unset(c, 2)? {
        None
    } else {
        Some((field(c)?, field(c)?))
    };
    Ok(StructuralFilter {
        flags,
        bound,
        revolve,
        level,
    })
}

fn comparison_slots(cmp: &Option<DataComparison>) -> Result<(Value, Value)> {
    match cmp {
        Some(cmp) => Ok((Value::from(cmp.op.as_str()), cmp.operand.encode()?)),
        None => Ok((Value::Null, Value::Null)),
    }
}

impl Encode for DataFilter {
    fn encode(&self) -> Result<Value> {
        let coord_slots = self.coords.as_ref().map_or(1, |coords| coords.len() + 1);
        let mut a = ArrayBuilder::new(11 + coord_slots);
        a.append_named("filter_type", "Data")?
            .append_named("cube", &self.cube)?;
        match &self.coords {
            Some(coords) => {
                a.append_named("coords_count", coords.len())?;
                for coord in coords {
                    a.append_named("coord", coord.encode()?)?;
                }
            }
            None => {
                a.append_named("coords", Value::Null)?;
            }
        }
        let (op1, par1) = comparison_slots(&self.first)?;
        let (op2, par2) = comparison_slots(&self.second)?;
        a.append_named("op1", op1)?
            .append_named("par1", par1)?
            .append_named("op2", op2)?
            .append_named("par2", par2)?
            .append_named("top", optional(&self.top)?)?
            .append_named("upper_percentage", optional(&self.upper_percentage)?)?
            .append_named("lower_percentage", optional(&self.lower_percentage)?)?
            .append_named("use_rules", self.use_rules)?
            .append_named("flags", self.flags)?;
        Ok(a.finish()?)
    }
}

fn decode_comparison(c: &mut Cursor<'_>) -> Result<Option<DataComparison>> {
    if take_unset(c, 2)? {
        return Ok(None);
    }
    Ok(Some(DataComparison {
        op: field(c)?,
        operand: field::<CellValue>(c)?,
    }))
}

fn decode_optional<T: Decode>(c: &mut Cursor<'_>) -> Result<Option<T>> {
    if take_unset(c, 1)? {
        Ok(None)
    } else {
        Ok(Some(field(c)?))
    }
}

fn decode_data(c: &mut Cursor<'_>) -> Result<DataFilter> {
    let cube = field(c)?;
    let coords = if take_unset(c, 1)? {
        None
    } else {
        let count: u32 = field(c)?;
        let mut coords = Vec::with_capacity((count as usize).min(c.remaining()));
        for _ in 0..count {
            coords.push(field::<ElementList>(c)?);
        }
        Some(coords)
    };
    Ok(DataFilter {
        cube,
        coords,
        first: decode_comparison(c)?,
        second: decode_comparison(c)?,
        top: decode_optional(c)?,
        upper_percentage: decode_optional(c)?,
        lower_percentage: decode_optional(c)?,
        use_rules: field(c)?,
        flags: field(c)?,
    })
}

impl Encode for FieldFilter {
    /// Written as a row-major matrix with one column per attribute.
    fn encode(&self) -> Result<Value> {
        let rows = self.columns.iter().map(Vec::len).max().unwrap_or(0);
        // Columns without any rows carry no data.
        let cols = if rows == 0 { 0 } else { self.columns.len() };
        let mut a = ArrayBuilder::new(3 + rows * cols);
        a.append_named("filter_type", "Field")?
            .append_named("rows", rows)?
            .append_named("cols", cols)?;
        for row in 0..rows {
            for column in &self.columns {
                let cell = column.get(row).map(String::as_str).unwrap_or("");
                a.append_named("data", cell)?;
            }
        }
        Ok(a.finish()?)
    }
}

fn decode_field(c: &mut Cursor<'_>) -> Result<FieldFilter> {
    let rows: u32 = field(c)?;
    let cols: u32 = field(c)?;
    let (rows, cols) = (rows as usize, cols as usize);
    if rows == 0 && cols > 0 {
        return Err(PaloError::InvalidArgumentValue(format!(
            "field filter has {cols} columns but no rows"
        )));
    }
    let count = rows
        .checked_mul(cols)
        .filter(|&count| count <= c.remaining())
        .ok_or_else(|| {
            PaloError::InvalidArgumentValue(format!(
                "field filter header {rows}x{cols} exceeds its data"
            ))
        })?;
    let mut cells: Vec<String> = Vec::with_capacity(count);
    for _ in 0..count {
        cells.push(field(c)?);
    }
    let columns = (0..cols)
        .map(|col| (0..rows).map(|row| cells[row * cols + col].clone()).collect())
        .collect();
    Ok(FieldFilter { columns })
}

impl Decode for AliasFilter {
    /// One or two attribute names.
    fn decode(value: &Value) -> Result<Self> {
        let mut names = string_array(value, false)?.into_iter();
        match (names.next(), names.next(), names.next()) {
            (Some(attribute1), attribute2, None) => Ok(AliasFilter {
                attribute1,
                attribute2,
            }),
            _ => Err(PaloError::InvalidArgumentFormat(
                "alias filter takes one or two attributes".to_string(),
            )),
        }
    }
}

impl Encode for AliasFilter {
    fn encode(&self) -> Result<Value> {
        let mut names = vec![self.attribute1.clone()];
        names.extend(self.attribute2.clone());
        names.encode()
    }
}

impl SubsetDefinition {
    /// Assemble a definition from the spreadsheet arguments of a subset call.
    ///
    /// `alias` may be null. Null filters and unknown filter types are skipped;
    /// only the first basic, structural and data filter is used.
    pub fn from_arguments(indent: i64, alias: &Value, filters: &[Value]) -> Result<Self> {
        let mut definition = SubsetDefinition {
            indent,
            alias: if alias.is_missing() {
                None
            } else {
                Some(AliasFilter::decode(alias)?)
            },
            ..SubsetDefinition::default()
        };

        for filter in filters.iter().filter(|f| !f.is_missing()) {
            let mut c = filter.as_array()?;
            let filter_type: String = field(&mut c)?;
            match filter_type.as_str() {
                "Basic" => {
                    let basic = decode_basic(&mut c)?;
                    definition.basic.get_or_insert(basic);
                }
                "Text" => definition.text = Some(decode_text(&mut c)?),
                "Sorting" => definition.sorting = Some(decode_sorting(&mut c)?),
                "Structural" => {
                    let structural = decode_structural(&mut c)?;
                    definition.structural.get_or_insert(structural);
                }
                "Data" => {
                    let data = decode_data(&mut c)?;
                    definition.data.get_or_insert(data);
                }
                "Field" => definition.field = Some(decode_field(&mut c)?),
                other => tracing::debug!(filter_type = other, "skipping unknown subset filter"),
            }
        }
        Ok(definition)
    }
}

impl Encode for SubsetResult {
    fn encode(&self) -> Result<Value> {
        let mut a = ArrayBuilder::new(12);
        a.append_named("name", &self.name)?
            .append_named("alias", &self.alias)?
            .append_named("indent", self.indent)?
            .append_named("path", &self.path)?
            .append_named("identifier", self.identifier)?
            .append_named("position", self.position)?
            .append_named("level", self.level)?
            .append_named("element_indent", self.element_indent)?
            .append_named("depth", self.depth)?
            .append_named("type", self.element_type.encode()?)?
            .append_named("number_parents", self.number_parents)?
            .append_named("number_children", self.number_children)?;
        Ok(a.finish()?)
    }
}

impl Decode for SubsetResult {
    fn decode(value: &Value) -> Result<Self> {
        let mut c = record(value, "SubsetResult", 12)?;
        Ok(SubsetResult {
            name: field(&mut c)?,
            alias: field(&mut c)?,
            indent: field(&mut c)?,
            path: field(&mut c)?,
            identifier: field(&mut c)?,
            position: field(&mut c)?,
            level: field(&mut c)?,
            element_indent: field(&mut c)?,
            depth: field(&mut c)?,
            element_type: field(&mut c)?,
            number_parents: field(&mut c)?,
            number_children: field(&mut c)?,
        })
    }
}
