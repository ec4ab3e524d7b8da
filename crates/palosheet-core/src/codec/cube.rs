use palosheet_cell::{ArrayBuilder, Value};

use super::{Decode, Encode, field, optional_field, record, record_between, string_array_array};
use crate::error::{PaloError, Result};
use crate::types::{CellValue, CellValueWithProperties, CubeInfo, LockInfo, RuleInfo, SplashMode};

impl Encode for CubeInfo {
    fn encode(&self) -> Result<Value> {
        let mut a = ArrayBuilder::new(8 + usize::from(self.permission.is_some()));
        a.append_named("identifier", self.identifier)?
            .append_named("name", &self.name)?
            .append_named("number_dimensions", self.dimensions.len())?
            .append_named("dimensions", self.dimensions.encode()?)?
            .append_named("number_cells", self.number_cells)?
            .append_named("number_filled_cells", self.number_filled_cells)?
            .append_named("status", self.status.encode()?)?
            .append_named("type", self.cube_type.encode()?)?;
        if let Some(permission) = &self.permission {
            a.append_named("permission", permission)?;
        }
        Ok(a.finish()?)
    }
}

impl Decode for CubeInfo {
    fn decode(value: &Value) -> Result<Self> {
        let mut c = record_between(value, "CubeInfo", 8, 9)?;
        let identifier = field(&mut c)?;
        let name = field(&mut c)?;
        c.skip_values(1)?;
        Ok(CubeInfo {
            identifier,
            name,
            dimensions: field(&mut c)?,
            number_cells: field(&mut c)?,
            number_filled_cells: field(&mut c)?,
            status: field(&mut c)?,
            cube_type: field(&mut c)?,
            permission: optional_field(&mut c)?,
        })
    }
}

impl Encode for RuleInfo {
    fn encode(&self) -> Result<Value> {
        let mut a = ArrayBuilder::new(6);
        a.append_named("identifier", self.identifier)?
            .append_named("definition", &self.definition)?
            .append_named("extern_id", &self.extern_id)?
            .append_named("comment", &self.comment)?
            .append_named("timestamp", self.timestamp)?
            .append_named("activated", self.activated)?;
        Ok(a.finish()?)
    }
}

impl Decode for RuleInfo {
    fn decode(value: &Value) -> Result<Self> {
        let mut c = record(value, "RuleInfo", 6)?;
        Ok(RuleInfo {
            identifier: field(&mut c)?,
            definition: field(&mut c)?,
            extern_id: field(&mut c)?,
            comment: field(&mut c)?,
            timestamp: field(&mut c)?,
            activated: field(&mut c)?,
        })
    }
}

impl Encode for LockInfo {
    fn encode(&self) -> Result<Value> {
        let mut a = ArrayBuilder::new(4);
        a.append_named("identifier", self.identifier)?
            .append_named("area", self.area.encode()?)?
            .append_named("user", &self.user)?
            .append_named("steps", self.steps)?;
        Ok(a.finish()?)
    }
}

impl Decode for LockInfo {
    fn decode(value: &Value) -> Result<Self> {
        let mut c = record(value, "LockInfo", 4)?;
        Ok(LockInfo {
            identifier: field(&mut c)?,
            area: string_array_array(c.next_value()?, false)?,
            user: field(&mut c)?,
            steps: field(&mut c)?,
        })
    }
}

/// The accepted shapes of a splash mode argument.
enum SplashInput<'a> {
    Keyword(&'a str),
    Ordinal(&'a Value),
    Truthy(&'a Value),
}

impl<'a> SplashInput<'a> {
    fn classify(value: &'a Value) -> Self {
        match value {
            Value::String(s) => SplashInput::Keyword(s),
            Value::Integer(_) | Value::Float(_) => SplashInput::Ordinal(value),
            other => SplashInput::Truthy(other),
        }
    }
}

impl Encode for SplashMode {
    fn encode(&self) -> Result<Value> {
        Ok(Value::from(self.as_str()))
    }
}

impl Decode for SplashMode {
    fn decode(value: &Value) -> Result<Self> {
        match SplashInput::classify(value) {
            SplashInput::Keyword(s) => {
                SplashMode::from_keyword(s).ok_or(PaloError::InvalidSplashMode)
            }
            SplashInput::Ordinal(n) => n
                .as_integer()
                .ok()
                .and_then(SplashMode::from_ordinal)
                .ok_or(PaloError::InvalidSplashMode),
            SplashInput::Truthy(v) => Ok(if v.as_bool()? {
                SplashMode::Default
            } else {
                SplashMode::None
            }),
        }
    }
}

impl CellValue {
    /// Encode, optionally dropping error descriptions.
    pub fn encode_with(&self, error_descriptions: bool) -> Value {
        match self {
            CellValue::Numeric(n) => Value::Float(*n),
            CellValue::String(s) => Value::from(s.as_str()),
            CellValue::Error(info) => {
                let mut info = info.clone();
                if !error_descriptions {
                    info.description = None;
                }
                Value::Error(info)
            }
        }
    }
}

impl Encode for CellValue {
    fn encode(&self) -> Result<Value> {
        Ok(self.encode_with(true))
    }
}

impl Decode for CellValue {
    /// Null reads as the empty string; every non-string tag must be numeric.
    fn decode(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(CellValue::String(String::new())),
            Value::String(s) => Ok(CellValue::String(s.clone())),
            other => Ok(CellValue::Numeric(other.as_float()?)),
        }
    }
}

impl CellValueWithProperties {
    /// `[value, properties...]` when properties were requested, else the bare value.
    pub fn encode_with(&self, error_descriptions: bool) -> Result<Value> {
        let value = self.value.encode_with(error_descriptions);
        if self.properties.is_empty() || matches!(self.value, CellValue::Error(_)) {
            return Ok(value);
        }
        let mut a = ArrayBuilder::new(self.properties.len() + 1);
        a.append_named("value", value)?;
        for property in &self.properties {
            a.append_named("property", property)?;
        }
        Ok(a.finish()?)
    }
}

impl Encode for CellValueWithProperties {
    fn encode(&self) -> Result<Value> {
        self.encode_with(true)
    }
}

impl Decode for CellValueWithProperties {
    fn decode(value: &Value) -> Result<Self> {
        let Value::Array(_) = value else {
            return Ok(CellValueWithProperties {
                value: CellValue::decode(value)?,
                properties: Vec::new(),
            });
        };
        let mut c = value.as_array()?;
        let cell = field(&mut c)?;
        let properties = c.map(String::decode).collect::<Result<Vec<_>>>()?;
        Ok(CellValueWithProperties {
            value: cell,
            properties,
        })
    }
}
