use serde::{Deserialize, Serialize};

/// Marker string meaning "every element of the dimension".
pub const ELEMENTS_ALL: &str = "*";

/// Kind of a dimension element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DimensionElementType {
    Numeric,
    String,
    Consolidated,
}

impl DimensionElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DimensionElementType::Numeric => "numeric",
            DimensionElementType::String => "string",
            DimensionElementType::Consolidated => "consolidated",
        }
    }

    /// Accepts the short forms N/S/C and the full names, in any case.
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "N" | "NUMERIC" => Some(DimensionElementType::Numeric),
            "S" | "STRING" => Some(DimensionElementType::String),
            "C" | "CONSOLIDATED" => Some(DimensionElementType::Consolidated),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParentElementInfo {
    pub identifier: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChildElementInfo {
    pub identifier: u32,
    pub weight: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DimensionElementInfoSimple {
    pub name: String,
    pub element_type: DimensionElementType,
    pub identifier: u32,
}

/// A child of a consolidated element as reported by the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationElementInfo {
    pub name: String,
    pub element_type: DimensionElementType,
    pub identifier: u32,
    pub weight: f64,
}

/// Full element description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DimensionElementInfo {
    pub identifier: u32,
    pub name: String,
    pub element_type: DimensionElementType,
    pub level: u32,
    pub indent: u32,
    pub depth: u32,
    pub position: u32,
    pub children: Vec<ChildElementInfo>,
    pub parents: Vec<ParentElementInfo>,
    /// Permission string, only reported when the caller asked for rights.
    pub permission: Option<String>,
}

impl DimensionElementInfo {
    pub fn simple(&self) -> DimensionElementInfoSimple {
        DimensionElementInfoSimple {
            name: self.name.clone(),
            element_type: self.element_type,
            identifier: self.identifier,
        }
    }
}

/// A `(name, weight)` pair used to define consolidations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationElement {
    pub name: String,
    pub weight: f64,
}

impl ConsolidationElement {
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        ConsolidationElement {
            name: name.into(),
            weight,
        }
    }
}

/// Either every element of a dimension or an explicit list of names.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ElementList {
    All,
    Names(Vec<String>),
}

impl ElementList {
    pub fn is_all(&self) -> bool {
        matches!(self, ElementList::All)
    }
}

/// One row or column member of a view axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisElement {
    pub name: String,
    pub element_type: DimensionElementType,
    pub alias: String,
    pub has_children: bool,
    pub has_parents: bool,
    pub axis: u32,
    pub indent: u32,
    pub line: u32,
}

impl AxisElement {
    /// The alias, or the name when the alias is blank.
    pub fn display_alias(&self) -> &str {
        if self.alias.trim().is_empty() {
            &self.name
        } else {
            &self.alias
        }
    }
}

/// Bit set choosing which [`AxisElement`] members are encoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxisSelector(pub u32);

impl AxisSelector {
    pub const NAME: AxisSelector = AxisSelector(0x01);
    pub const TYPE: AxisSelector = AxisSelector(0x02);
    pub const ALIAS: AxisSelector = AxisSelector(0x04);
    pub const HAS_CHILDREN: AxisSelector = AxisSelector(0x08);
    pub const HAS_PARENTS: AxisSelector = AxisSelector(0x10);
    pub const AXIS: AxisSelector = AxisSelector(0x20);
    pub const INDENT: AxisSelector = AxisSelector(0x40);
    pub const LINE: AxisSelector = AxisSelector(0x80);

    const ALL: u32 = 0xff;

    pub fn contains(&self, other: AxisSelector) -> bool {
        self.0 & other.0 == other.0
    }

    /// Number of known members selected.
    pub fn count(&self) -> usize {
        (self.0 & Self::ALL).count_ones() as usize
    }
}

impl std::ops::BitOr for AxisSelector {
    type Output = AxisSelector;

    fn bitor(self, rhs: AxisSelector) -> AxisSelector {
        AxisSelector(self.0 | rhs.0)
    }
}
