//! Typed domain records exchanged with the OLAP boundary.
//!
//! Each record has one canonical array encoding, implemented in
//! [`crate::codec`].

/// Closed set of lowercase keywords with a string encoding.
macro_rules! keyword_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $what:literal {
            $($(#[$vmeta:meta])* $variant:ident => $keyword:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $keyword),+
                }
            }

            pub fn from_keyword(s: &str) -> Option<Self> {
                let s = s.trim();
                $(
                    if s.eq_ignore_ascii_case($keyword) {
                        return Some($name::$variant);
                    }
                )+
                None
            }
        }

        impl crate::codec::Encode for $name {
            fn encode(&self) -> crate::error::Result<palosheet_cell::Value> {
                Ok(palosheet_cell::Value::from(self.as_str()))
            }
        }

        impl crate::codec::Decode for $name {
            fn decode(value: &palosheet_cell::Value) -> crate::error::Result<Self> {
                let s = value.as_str()?;
                Self::from_keyword(s).ok_or_else(|| crate::error::PaloError::InvalidKeyword {
                    what: $what,
                    found: s.to_string(),
                })
            }
        }
    };
}

mod cube;
mod element;
mod server;
mod subset;

pub use cube::{
    CellData, CellValue, CellValueWithProperties, CubeInfo, CubeStatus, CubeType, LockInfo,
    RuleInfo, SplashMode,
};
pub use element::{
    AxisElement, AxisSelector, ChildElementInfo, ConsolidationElement, ConsolidationElementInfo,
    DimensionElementInfo, DimensionElementInfoSimple, DimensionElementType, ELEMENTS_ALL,
    ElementList, ParentElementInfo,
};
pub use server::{
    DatabaseInfo, DatabaseStatus, DatabaseType, DimensionInfo, DimensionType, License,
    LicenseInfo, ServerInfo, UserInfo,
};
pub use subset::{
    AliasFilter, BasicFilter, DataComparison, DataFilter, FieldFilter, SortingFilter,
    StructuralFilter, SubsetDefinition, SubsetResult, TextFilter, filter_flags,
};
