//! Subset definitions: the filters applied when listing dimension elements.

use serde::{Deserialize, Serialize};

use super::cube::CellValue;
use super::element::{DimensionElementType, ElementList};

/// Flag bits understood by the server's subset engine.
pub mod filter_flags {
    pub mod alias {
        pub const SEARCH_ONE: u32 = 0x1;
        pub const SEARCH_TWO: u32 = 0x2;
        pub const HIDE_DOUBLE: u32 = 0x4;
        pub const DISPLAY_ALIAS: u32 = 0x8;
        pub const USE_FILTEREXP: u32 = 0x10;
    }

    pub mod pick_list {
        pub const INSERT_BACK: u32 = 0x1;
        pub const MERGE: u32 = 0x2;
        pub const SUB: u32 = 0x4;
        pub const INSERT_FRONT: u32 = 0x8;
    }

    pub mod text {
        pub const ADDITIONAL_FIELDS: u32 = 0x1;
        pub const EXTENDED: u32 = 0x2;
    }

    pub mod sorting {
        pub const TEXT: u32 = 0x1;
        pub const NUMERIC: u32 = 0x2;
        pub const USE_ATTRIBUTE: u32 = 0x4;
        pub const USE_ALIAS: u32 = 0x8;
        pub const REVERSE_ORDER: u32 = 0x10;
        pub const LEAVES_ONLY: u32 = 0x20;
        pub const STANDARD_ORDER: u32 = 0x40;
        pub const WHOLE: u32 = 0x80;
        pub const POSITION: u32 = 0x100;
        pub const REVERSE_TOTAL: u32 = 0x200;
        pub const SORT_ONE_LEVEL: u32 = 0x400;
        pub const FLAT_HIERARCHY: u32 = 0x800;
        pub const NO_CHILDREN: u32 = 0x1000;
        pub const CONSOLIDATED_ONLY: u32 = 0x2000;
        pub const SORT_NOT_ONE_LEVEL: u32 = 0x4000;
        pub const SHOW_DUPLICATES: u32 = 0x8000;
        pub const REVERSE_TOTAL_EX: u32 = 0x10000;
        pub const LIMIT: u32 = 0x20000;
        pub const CONSOLIDATION_ORDER: u32 = 0x40000;
        pub const PATH: u32 = 0x80000;
    }

    pub mod structural {
        pub const BELOW_INCLUSIVE: u32 = 0x1;
        pub const BELOW_EXCLUSIVE: u32 = 0x2;
        pub const HIDE_CONSOLIDATED: u32 = 0x4;
        pub const HIDE_LEAVES: u32 = 0x8;
        pub const HIERARCHIAL_LEVEL: u32 = 0x10;
        pub const AGGREGATED_LEVEL: u32 = 0x20;
        pub const REVOLVING: u32 = 0x40;
        pub const REVOLVE_ADD_ABOVE: u32 = 0x80;
        pub const REVOLVE_ADD_BELOW: u32 = 0x100;
        pub const ABOVE_EXCLUSIVE: u32 = 0x200;
        pub const ABOVE_INCLUSIVE: u32 = 0x400;
        pub const CYCLIC: u32 = 0x800;
    }

    pub mod data {
        pub const DATA_MIN: u32 = 0x1;
        pub const DATA_MAX: u32 = 0x2;
        pub const DATA_SUM: u32 = 0x4;
        pub const DATA_AVERAGE: u32 = 0x8;
        pub const DATA_ANY: u32 = 0x10;
        pub const DATA_ALL: u32 = 0x20;
        pub const DATA_STRING: u32 = 0x40;
        pub const ONLY_CONSOLIDATED: u32 = 0x80;
        pub const ONLY_LEAVES: u32 = 0x100;
        pub const UPPER_PERCENTAGE: u32 = 0x200;
        pub const LOWER_PERCENTAGE: u32 = 0x400;
        pub const MID_PERCENTAGE: u32 = 0x800;
        pub const TOP: u32 = 0x1000;
        pub const NORULES: u32 = 0x2000;
    }
}

use filter_flags::{alias, data, sorting};

/// Search one or two alias attributes instead of element names.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AliasFilter {
    pub attribute1: String,
    pub attribute2: Option<String>,
}

impl AliasFilter {
    pub fn flags(&self) -> u32 {
        if self.attribute2.is_some() {
            alias::SEARCH_TWO
        } else {
            alias::SEARCH_ONE
        }
    }
}

/// Attribute filter expressions, one list per attribute column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldFilter {
    pub columns: Vec<Vec<String>>,
}

impl FieldFilter {
    pub fn flags(&self) -> u32 {
        alias::USE_FILTEREXP
    }
}

/// Manual pick list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BasicFilter {
    pub flags: u32,
    pub manual_subset: Option<Vec<String>>,
    pub manual_paths: Option<Vec<String>>,
}

impl BasicFilter {
    pub fn is_active(&self) -> bool {
        self.manual_subset.as_ref().is_some_and(|s| !s.is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextFilter {
    pub flags: u32,
    pub regexps: Vec<String>,
}

impl TextFilter {
    pub fn is_active(&self) -> bool {
        !self.regexps.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SortingFilter {
    pub attribute: String,
    /// Restrict sorting to one level of the hierarchy.
    pub level: Option<u32>,
    pub limit_count: u32,
    pub limit_start: u32,
    pub flags: u32,
}

impl SortingFilter {
    pub fn effective_flags(&self) -> u32 {
        if self.level.is_some() {
            self.flags | sorting::SORT_ONE_LEVEL
        } else {
            self.flags
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructuralFilter {
    pub flags: u32,
    pub bound: String,
    /// Revolve element and count.
    pub revolve: Option<(String, i64)>,
    /// Level range, start and end.
    pub level: Option<(i64, i64)>,
}

/// Comparison operator and operand of a data filter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataComparison {
    pub op: String,
    pub operand: CellValue,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataFilter {
    pub cube: String,
    /// Element lists per cube dimension; `None` leaves coordinates unset.
    pub coords: Option<Vec<ElementList>>,
    pub first: Option<DataComparison>,
    pub second: Option<DataComparison>,
    pub top: Option<u32>,
    pub upper_percentage: Option<f64>,
    pub lower_percentage: Option<f64>,
    pub use_rules: bool,
    pub flags: u32,
}

impl DataFilter {
    /// Flags as sent to the server, including the ones implied by set fields.
    pub fn effective_flags(&self) -> u32 {
        let mut flags = self.flags;
        if !self.use_rules {
            flags |= data::NORULES;
        }
        if self.top.is_some() {
            flags |= data::TOP;
        }
        match (self.upper_percentage, self.lower_percentage) {
            (Some(_), Some(_)) => flags |= data::MID_PERCENTAGE,
            (None, Some(_)) => flags |= data::LOWER_PERCENTAGE,
            (Some(_), None) => flags |= data::UPPER_PERCENTAGE,
            (None, None) => {}
        }
        flags
    }

    /// String comparisons are used when the data filter compares strings.
    pub fn uses_strings(&self) -> bool {
        self.flags & data::DATA_STRING != 0
    }
}

/// Everything needed to evaluate a subset on a dimension.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct SubsetDefinition {
    pub indent: i64,
    pub alias: Option<AliasFilter>,
    pub field: Option<FieldFilter>,
    pub basic: Option<BasicFilter>,
    pub text: Option<TextFilter>,
    pub sorting: Option<SortingFilter>,
    pub structural: Option<StructuralFilter>,
    pub data: Option<DataFilter>,
}

/// One element of an evaluated subset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubsetResult {
    pub name: String,
    pub alias: String,
    pub indent: u32,
    pub path: String,
    pub identifier: u32,
    pub position: u32,
    pub level: u32,
    pub element_indent: u32,
    pub depth: u32,
    pub element_type: DimensionElementType,
    pub number_parents: u32,
    pub number_children: u32,
}
