use chrono::{DateTime, NaiveDateTime};
use palosheet_cell::{ArrayBuilder, Value};

use super::{Decode, Encode, field, optional_field, record, record_between};
use crate::error::Result;
use crate::types::{DatabaseInfo, DimensionInfo, License, LicenseInfo, ServerInfo, UserInfo};

/// `ctime` layout, including the trailing newline.
const CTIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y\n";
const UNLIMITED: &str = "Unlimited\n";

fn format_license_time(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .filter(|_| timestamp != License::UNLIMITED)
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|t| t.format(CTIME_FORMAT).to_string())
        .unwrap_or_else(|| UNLIMITED.to_string())
}

fn parse_license_time(value: &Value) -> Result<u64> {
    let text = value.as_string()?;
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case(UNLIMITED.trim()) {
        return Ok(License::UNLIMITED);
    }
    let parsed = NaiveDateTime::parse_from_str(trimmed, CTIME_FORMAT.trim_end())
        .ok()
        .and_then(|t| u64::try_from(t.and_utc().timestamp()).ok());
    match parsed {
        Some(secs) => Ok(secs),
        None => Ok(value.as_unsigned()?),
    }
}

impl Encode for ServerInfo {
    fn encode(&self) -> Result<Value> {
        let mut a = ArrayBuilder::new(9);
        a.append_named("major_version", self.major_version)?
            .append_named("minor_version", self.minor_version)?
            .append_named("bugfix_version", self.bugfix_version)?
            .append_named("build_number", self.build_number)?
            .append_named("encryption", self.encryption)?
            .append_named("https_port", self.https_port)?
            .append_named("data_sequence_number", self.data_sequence_number)?
            .append_named("sid", &self.sid)?
            .append_named("ttl", self.ttl)?;
        Ok(a.finish()?)
    }
}

impl Decode for ServerInfo {
    fn decode(value: &Value) -> Result<Self> {
        let mut c = record(value, "ServerInfo", 9)?;
        Ok(ServerInfo {
            major_version: field(&mut c)?,
            minor_version: field(&mut c)?,
            bugfix_version: field(&mut c)?,
            build_number: field(&mut c)?,
            encryption: field(&mut c)?,
            https_port: field(&mut c)?,
            data_sequence_number: field(&mut c)?,
            sid: field(&mut c)?,
            ttl: field(&mut c)?,
        })
    }
}

impl Encode for License {
    fn encode(&self) -> Result<Value> {
        let mut a = ArrayBuilder::new(10);
        a.append_named("key", &self.key)?
            .append_named("customer", &self.customer)?
            .append_named("version", self.version)?
            .append_named("license_count", self.license_count)?
            .append_named("named_count", self.named_count)?
            .append_named("start", format_license_time(self.start))?
            .append_named("expiration", format_license_time(self.expiration))?
            .append_named("sharing_limit", self.sharing_limit)?
            .append_named("gpu_count", self.gpu_count)?
            .append_named("features", &self.features)?;
        Ok(a.finish()?)
    }
}

impl Decode for License {
    fn decode(value: &Value) -> Result<Self> {
        let mut c = record(value, "License", 10)?;
        Ok(License {
            key: field(&mut c)?,
            customer: field(&mut c)?,
            version: field(&mut c)?,
            license_count: field(&mut c)?,
            named_count: field(&mut c)?,
            start: parse_license_time(c.next_value()?)?,
            expiration: parse_license_time(c.next_value()?)?,
            sharing_limit: field(&mut c)?,
            gpu_count: field(&mut c)?,
            features: field(&mut c)?,
        })
    }
}

impl Encode for LicenseInfo {
    fn encode(&self) -> Result<Value> {
        let mut a = ArrayBuilder::new(2);
        a.append_named("hw_key", &self.hw_key)?
            .append_named("licenses", self.licenses.encode()?)?;
        Ok(a.finish()?)
    }
}

impl Decode for LicenseInfo {
    fn decode(value: &Value) -> Result<Self> {
        let mut c = record(value, "LicenseInfo", 2)?;
        Ok(LicenseInfo {
            hw_key: field(&mut c)?,
            licenses: field(&mut c)?,
        })
    }
}

impl Encode for UserInfo {
    fn encode(&self) -> Result<Value> {
        let mut permissions = ArrayBuilder::new(self.permissions.len());
        for (object, right) in &self.permissions {
            let mut pair = ArrayBuilder::new(2);
            pair.append_named("object", object)?
                .append_named("right", right)?;
            permissions.append(pair.finish()?)?;
        }

        let mut a = ArrayBuilder::new(7);
        a.append_named("name", &self.name)?
            .append_named("identifier", self.identifier)?
            .append_named("group_ids", self.group_ids.encode()?)?
            .append_named("groups", self.groups.encode()?)?
            .append_named("ttl", self.ttl)?
            .append_named("permissions", permissions.finish()?)?
            .append_named("license_key", &self.license_key)?;
        Ok(a.finish()?)
    }
}

impl Decode for UserInfo {
    fn decode(value: &Value) -> Result<Self> {
        let mut c = record(value, "UserInfo", 7)?;
        let name = field(&mut c)?;
        let identifier = field(&mut c)?;
        let group_ids = field(&mut c)?;
        let groups = field(&mut c)?;
        let ttl = field(&mut c)?;
        let mut permissions = Vec::new();
        for pair in c.next_value()?.as_array()? {
            let mut p = record(pair, "UserInfo permission", 2)?;
            permissions.push((field(&mut p)?, field(&mut p)?));
        }
        Ok(UserInfo {
            name,
            identifier,
            group_ids,
            groups,
            ttl,
            permissions,
            license_key: field(&mut c)?,
        })
    }
}

impl Encode for DatabaseInfo {
    fn encode(&self) -> Result<Value> {
        let mut a = ArrayBuilder::new(5 + usize::from(self.permission.is_some()));
        a.append_named("name", &self.name)?
            .append_named("type", self.database_type.encode()?)?
            .append_named("status", self.status.encode()?)?
            .append_named("dimension_count", self.dimension_count)?
            .append_named("cube_count", self.cube_count)?;
        if let Some(permission) = &self.permission {
            a.append_named("permission", permission)?;
        }
        Ok(a.finish()?)
    }
}

impl Decode for DatabaseInfo {
    fn decode(value: &Value) -> Result<Self> {
        let mut c = record_between(value, "DatabaseInfo", 5, 6)?;
        Ok(DatabaseInfo {
            name: field(&mut c)?,
            database_type: field(&mut c)?,
            status: field(&mut c)?,
            dimension_count: field(&mut c)?,
            cube_count: field(&mut c)?,
            permission: optional_field(&mut c)?,
        })
    }
}

impl Encode for DimensionInfo {
    fn encode(&self) -> Result<Value> {
        let mut a = ArrayBuilder::new(2 + usize::from(self.permission.is_some()));
        a.append_named("name", &self.name)?
            .append_named("type", self.dimension_type.encode()?)?;
        if let Some(permission) = &self.permission {
            a.append_named("permission", permission)?;
        }
        Ok(a.finish()?)
    }
}

impl Decode for DimensionInfo {
    fn decode(value: &Value) -> Result<Self> {
        let mut c = record_between(value, "DimensionInfo", 2, 3)?;
        Ok(DimensionInfo {
            name: field(&mut c)?,
            dimension_type: field(&mut c)?,
            permission: optional_field(&mut c)?,
        })
    }
}
