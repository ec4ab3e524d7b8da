//! OLAP domain boundary.
//!
//! The traits here are implemented by whatever client talks to the server
//! (see [`crate::memory`] for an in-memory implementation). Every method
//! reports failures as a [`DomainError`] carrying the server's own code.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{
    CellData, CellValue, ConsolidationElement, ConsolidationElementInfo, CubeInfo, DatabaseInfo,
    DimensionElementInfo, DimensionElementType, DimensionInfo, LicenseInfo, LockInfo, RuleInfo,
    ServerInfo, SplashMode, SubsetDefinition, SubsetResult,
};

/// Well-known server error codes.
pub mod codes {
    pub const INVALID_TYPE: u32 = 1005;
    pub const INVALID_COORDINATES: u32 = 1006;
    pub const SERVER_NOT_FOUND: u32 = 1014;
    pub const INVALID_STRING: u32 = 1026;
    pub const DATABASE_NOT_FOUND: u32 = 2001;
    pub const DIMENSION_NOT_FOUND: u32 = 3002;
    pub const ELEMENT_EXISTS: u32 = 4000;
    pub const ELEMENT_CIRCULAR_REFERENCE: u32 = 4001;
    pub const ELEMENT_NOT_FOUND: u32 = 4004;
    pub const CUBE_NOT_FOUND: u32 = 5000;
    pub const SPLASH_DISABLED: u32 = 5005;
    pub const CUBE_NAME_IN_USE: u32 = 5008;
    pub const CUBE_BLOCKED_BY_LOCK: u32 = 5016;
    pub const PARSING_RULE: u32 = 8001;
}

/// Failure reported by the domain boundary.
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[error("{description} (code {code})")]
pub struct DomainError {
    pub code: u32,
    pub description: String,
}

impl DomainError {
    pub fn new(code: u32, description: impl Into<String>) -> Self {
        DomainError {
            code,
            description: description.into(),
        }
    }

    /// True for codes that report a missing object or an invalid reference.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.code,
            codes::INVALID_COORDINATES
                | codes::DATABASE_NOT_FOUND
                | codes::DIMENSION_NOT_FOUND
                | codes::ELEMENT_NOT_FOUND
                | codes::CUBE_NOT_FOUND
                | codes::SERVER_NOT_FOUND
        )
    }
}

pub type DomainResult<T> = std::result::Result<T, DomainError>;

pub trait Server: Send + Sync {
    fn info(&self) -> DomainResult<ServerInfo>;
    fn license_info(&self) -> DomainResult<LicenseInfo>;
    fn ping(&self) -> DomainResult<()>;
    fn database_names(&self) -> DomainResult<Vec<String>>;
    fn database(&self, name: &str) -> DomainResult<Arc<dyn Database>>;
}

pub trait Database: Send + Sync {
    fn info(&self) -> DomainResult<DatabaseInfo>;
    fn dimension_names(&self) -> DomainResult<Vec<String>>;
    fn cube_names(&self) -> DomainResult<Vec<String>>;
    fn dimension(&self, name: &str) -> DomainResult<Arc<dyn Dimension>>;
    fn cube(&self, name: &str) -> DomainResult<Arc<dyn Cube>>;
}

pub trait Dimension: Send + Sync {
    fn info(&self) -> DomainResult<DimensionInfo>;
    fn element_count(&self) -> DomainResult<usize>;
    fn elements(&self) -> DomainResult<Vec<DimensionElementInfo>>;
    fn element(&self, name: &str) -> DomainResult<DimensionElementInfo>;
    fn add_element(
        &self,
        name: &str,
        element_type: DimensionElementType,
        children: &[ConsolidationElement],
    ) -> DomainResult<DimensionElementInfo>;
    /// Change an element's type and consolidation. With `append` the children
    /// are added to the existing ones instead of replacing them.
    fn update_element(
        &self,
        name: &str,
        element_type: DimensionElementType,
        children: &[ConsolidationElement],
        append: bool,
    ) -> DomainResult<DimensionElementInfo>;
    fn consolidation_elements(&self, name: &str) -> DomainResult<Vec<ConsolidationElementInfo>>;
    fn subset(&self, definition: &SubsetDefinition) -> DomainResult<Vec<SubsetResult>>;
}

pub trait Cube: Send + Sync {
    fn info(&self) -> DomainResult<CubeInfo>;
    fn cell_value(&self, path: &[String], properties: &[String]) -> DomainResult<CellData>;
    fn set_cell_value(
        &self,
        path: &[String],
        value: &CellValue,
        splash: SplashMode,
    ) -> DomainResult<()>;
    fn rules(&self) -> DomainResult<Vec<RuleInfo>>;
    fn create_rule(
        &self,
        definition: &str,
        extern_id: &str,
        comment: &str,
        activate: bool,
    ) -> DomainResult<RuleInfo>;
    fn locks(&self) -> DomainResult<Vec<LockInfo>>;
    /// Lock an area, one element list per dimension. An empty area locks the
    /// whole cube.
    fn lock(&self, area: &[Vec<String>], user: &str) -> DomainResult<LockInfo>;
}
