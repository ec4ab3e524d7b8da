use serde::{Deserialize, Serialize};

use palosheet_cell::{ErrorInfo, XlError};

use crate::error::PaloError;

keyword_enum! {
    CubeType, "cube type" {
        Normal => "normal",
        System => "system",
        Attribute => "attribute",
        UserInfo => "user_info",
        Gpu => "gpu",
    }
}

keyword_enum! {
    CubeStatus, "cube status" {
        Unloaded => "unloaded",
        Loaded => "loaded",
        Changed => "changed",
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CubeInfo {
    pub identifier: u32,
    pub name: String,
    /// Identifiers of the cube's dimensions, in axis order.
    pub dimensions: Vec<u32>,
    pub number_cells: i64,
    pub number_filled_cells: i64,
    pub status: CubeStatus,
    pub cube_type: CubeType,
    pub permission: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleInfo {
    pub identifier: u32,
    pub definition: String,
    pub extern_id: String,
    pub comment: String,
    pub timestamp: i64,
    pub activated: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LockInfo {
    pub identifier: u32,
    /// Locked element names, one list per dimension.
    pub area: Vec<Vec<String>>,
    pub user: String,
    pub steps: u32,
}

/// How a value written to a consolidated cell is distributed to its base cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SplashMode {
    None,
    Default,
    Set,
    Add,
}

impl SplashMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplashMode::None => "SPLASH_MODE_NONE",
            SplashMode::Default => "SPLASH_MODE_DEFAULT",
            SplashMode::Set => "SPLASH_MODE_SET",
            SplashMode::Add => "SPLASH_MODE_ADD",
        }
    }

    pub fn from_ordinal(n: i64) -> Option<Self> {
        match n {
            0 => Some(SplashMode::None),
            1 => Some(SplashMode::Default),
            2 => Some(SplashMode::Set),
            3 => Some(SplashMode::Add),
            _ => None,
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SPLASH_MODE_NONE" | "FALSE" => Some(SplashMode::None),
            "SPLASH_MODE_DEFAULT" | "TRUE" => Some(SplashMode::Default),
            "SPLASH_MODE_SET" => Some(SplashMode::Set),
            "SPLASH_MODE_ADD" => Some(SplashMode::Add),
            _ => None,
        }
    }
}

/// A cell value as seen by the spreadsheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Numeric(f64),
    String(String),
    Error(ErrorInfo),
}

/// Raw cell as returned by the domain boundary, tagged by a numeric type code.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CellData {
    pub type_code: u32,
    pub numeric: f64,
    pub string: String,
    pub error_code: u32,
    pub error_description: String,
    /// Values of the requested cell properties, in request order.
    pub properties: Vec<String>,
}

impl CellData {
    pub const NUMERIC: u32 = 1;
    pub const STRING: u32 = 2;
    pub const ERROR: u32 = 99;

    pub fn numeric(n: f64) -> Self {
        CellData {
            type_code: Self::NUMERIC,
            numeric: n,
            ..CellData::default()
        }
    }

    pub fn string(s: impl Into<String>) -> Self {
        CellData {
            type_code: Self::STRING,
            string: s.into(),
            ..CellData::default()
        }
    }

    pub fn error(code: u32, description: impl Into<String>) -> Self {
        CellData {
            type_code: Self::ERROR,
            error_code: code,
            error_description: description.into(),
            ..CellData::default()
        }
    }
}

impl CellValue {
    /// Interpret raw cell data. Unknown type codes are a defect, not bad input.
    pub fn from_data(data: &CellData) -> Result<Self, PaloError> {
        match data.type_code {
            CellData::NUMERIC => Ok(CellValue::Numeric(data.numeric)),
            CellData::STRING => Ok(CellValue::String(data.string.clone())),
            CellData::ERROR => Ok(CellValue::Error(
                ErrorInfo::new(XlError::Value, data.error_code)
                    .with_description(data.error_description.clone()),
            )),
            code => Err(PaloError::UnknownCellValueType { code }),
        }
    }
}

impl From<&CellValue> for CellData {
    fn from(value: &CellValue) -> Self {
        match value {
            CellValue::Numeric(n) => CellData::numeric(*n),
            CellValue::String(s) => CellData::string(s.clone()),
            CellValue::Error(info) => {
                CellData::error(info.code, info.description.clone().unwrap_or_default())
            }
        }
    }
}

/// A cell value together with the requested property values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellValueWithProperties {
    pub value: CellValue,
    pub properties: Vec<String>,
}

impl CellValueWithProperties {
    pub fn from_data(data: &CellData) -> Result<Self, PaloError> {
        Ok(CellValueWithProperties {
            value: CellValue::from_data(data)?,
            properties: data.properties.clone(),
        })
    }
}
