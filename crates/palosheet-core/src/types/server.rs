use serde::{Deserialize, Serialize};

keyword_enum! {
    DatabaseType, "database type" {
        Normal => "normal",
        System => "system",
        UserInfo => "user_info",
    }
}

keyword_enum! {
    DatabaseStatus, "database status" {
        Unloaded => "unloaded",
        Loaded => "loaded",
        Changed => "changed",
        Loading => "loading",
    }
}

keyword_enum! {
    DimensionType, "dimension type" {
        Normal => "normal",
        System => "system",
        Attribute => "attribute",
        UserInfo => "user_info",
        SystemId => "system_id",
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub major_version: u32,
    pub minor_version: u32,
    pub bugfix_version: u32,
    pub build_number: u32,
    pub encryption: u32,
    pub https_port: u32,
    pub data_sequence_number: u32,
    pub sid: String,
    pub ttl: u32,
}

/// One installed license.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub key: String,
    pub customer: String,
    pub version: i64,
    pub license_count: i64,
    pub named_count: i64,
    /// Unix timestamp; rendered in `ctime` layout when encoded.
    pub start: u64,
    /// Unix timestamp; rendered in `ctime` layout when encoded.
    pub expiration: u64,
    pub sharing_limit: i64,
    pub gpu_count: i64,
    pub features: String,
}

impl License {
    /// Timestamp value meaning "never expires".
    pub const UNLIMITED: u64 = u64::MAX;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LicenseInfo {
    pub hw_key: String,
    pub licenses: Vec<License>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,
    pub identifier: u32,
    pub group_ids: Vec<u32>,
    pub groups: Vec<String>,
    pub ttl: u32,
    /// `(right object, permission)` pairs.
    pub permissions: Vec<(String, String)>,
    pub license_key: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub name: String,
    pub database_type: DatabaseType,
    pub status: DatabaseStatus,
    pub dimension_count: u32,
    pub cube_count: u32,
    pub permission: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DimensionInfo {
    pub name: String,
    pub dimension_type: DimensionType,
    pub permission: Option<String>,
}
