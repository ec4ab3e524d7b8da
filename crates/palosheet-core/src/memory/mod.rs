//! In-memory implementation of the domain boundary.
//!
//! Used by the test suites and for embedding without a server. Objects are
//! created through the `add_*` methods and then served through the
//! [`Server`], [`Database`], [`Dimension`] and [`Cube`] traits. Names are
//! matched case-insensitively, as the server does.

mod cube;
mod dimension;
mod subset;

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::{Cube, Database, Dimension, DomainError, DomainResult, Server, codes};
use crate::types::{DatabaseInfo, DatabaseStatus, DatabaseType, LicenseInfo, ServerInfo};

pub use cube::MemoryCube;
pub use dimension::MemoryDimension;

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn find_named<T>(items: &[Arc<T>], name: &str, item_name: impl Fn(&T) -> &str) -> Option<Arc<T>> {
    let name = name.trim();
    items
        .iter()
        .find(|item| item_name(item).eq_ignore_ascii_case(name))
        .cloned()
}

pub struct MemoryServer {
    info: ServerInfo,
    license: LicenseInfo,
    databases: RwLock<Vec<Arc<MemoryDatabase>>>,
}

impl Default for MemoryServer {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryServer {
    pub fn new() -> Self {
        MemoryServer {
            info: ServerInfo {
                major_version: 5,
                minor_version: 1,
                bugfix_version: 0,
                build_number: 0,
                encryption: 0,
                https_port: 0,
                data_sequence_number: 0,
                sid: String::new(),
                ttl: 0,
            },
            license: LicenseInfo {
                hw_key: String::new(),
                licenses: Vec::new(),
            },
            databases: RwLock::new(Vec::new()),
        }
    }

    pub fn with_license(mut self, license: LicenseInfo) -> Self {
        self.license = license;
        self
    }

    /// Create a database, or return the existing one with that name.
    pub fn add_database(&self, name: &str) -> Arc<MemoryDatabase> {
        let mut databases = write(&self.databases);
        if let Some(existing) = find_named(databases.as_slice(), name, MemoryDatabase::name) {
            return existing;
        }
        let db = Arc::new(MemoryDatabase::new(databases.len() as u32, name));
        databases.push(Arc::clone(&db));
        db
    }
}

impl Server for MemoryServer {
    fn info(&self) -> DomainResult<ServerInfo> {
        Ok(self.info.clone())
    }

    fn license_info(&self) -> DomainResult<LicenseInfo> {
        Ok(self.license.clone())
    }

    fn ping(&self) -> DomainResult<()> {
        Ok(())
    }

    fn database_names(&self) -> DomainResult<Vec<String>> {
        Ok(read(&self.databases)
            .iter()
            .map(|db| db.name.clone())
            .collect())
    }

    fn database(&self, name: &str) -> DomainResult<Arc<dyn Database>> {
        find_named(read(&self.databases).as_slice(), name, MemoryDatabase::name)
            .map(|db| db as Arc<dyn Database>)
            .ok_or_else(|| {
                DomainError::new(
                    codes::DATABASE_NOT_FOUND,
                    format!("database {name} not found"),
                )
            })
    }
}

pub struct MemoryDatabase {
    identifier: u32,
    name: String,
    dimensions: RwLock<Vec<Arc<MemoryDimension>>>,
    cubes: RwLock<Vec<Arc<MemoryCube>>>,
}

impl MemoryDatabase {
    fn new(identifier: u32, name: &str) -> Self {
        MemoryDatabase {
            identifier,
            name: name.trim().to_string(),
            dimensions: RwLock::new(Vec::new()),
            cubes: RwLock::new(Vec::new()),
        }
    }

    pub fn identifier(&self) -> u32 {
        self.identifier
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create a dimension, or return the existing one with that name.
    pub fn add_dimension(&self, name: &str) -> Arc<MemoryDimension> {
        let mut dimensions = write(&self.dimensions);
        if let Some(existing) = find_named(dimensions.as_slice(), name, MemoryDimension::name) {
            return existing;
        }
        let dim = Arc::new(MemoryDimension::new(dimensions.len() as u32, name));
        dimensions.push(Arc::clone(&dim));
        dim
    }

    /// Create a cube over existing dimensions, given in axis order.
    pub fn add_cube(&self, name: &str, dimensions: &[&str]) -> DomainResult<Arc<MemoryCube>> {
        let axes = dimensions
            .iter()
            .map(|dim| self.find_dimension(dim))
            .collect::<DomainResult<Vec<_>>>()?;
        let mut cubes = write(&self.cubes);
        if find_named(cubes.as_slice(), name, MemoryCube::name).is_some() {
            return Err(DomainError::new(
                codes::CUBE_NAME_IN_USE,
                format!("cube {name} already exists"),
            ));
        }
        let cube = Arc::new(MemoryCube::new(cubes.len() as u32, name, axes));
        cubes.push(Arc::clone(&cube));
        Ok(cube)
    }

    fn find_dimension(&self, name: &str) -> DomainResult<Arc<MemoryDimension>> {
        find_named(read(&self.dimensions).as_slice(), name, MemoryDimension::name).ok_or_else(|| {
            DomainError::new(
                codes::DIMENSION_NOT_FOUND,
                format!("dimension {name} not found"),
            )
        })
    }
}

impl Database for MemoryDatabase {
    fn info(&self) -> DomainResult<DatabaseInfo> {
        Ok(DatabaseInfo {
            name: self.name.clone(),
            database_type: DatabaseType::Normal,
            status: DatabaseStatus::Loaded,
            dimension_count: read(&self.dimensions).len() as u32,
            cube_count: read(&self.cubes).len() as u32,
            permission: None,
        })
    }

    fn dimension_names(&self) -> DomainResult<Vec<String>> {
        Ok(read(&self.dimensions)
            .iter()
            .map(|dim| dim.name().to_string())
            .collect())
    }

    fn cube_names(&self) -> DomainResult<Vec<String>> {
        Ok(read(&self.cubes)
            .iter()
            .map(|cube| cube.name().to_string())
            .collect())
    }

    fn dimension(&self, name: &str) -> DomainResult<Arc<dyn Dimension>> {
        Ok(self.find_dimension(name)? as Arc<dyn Dimension>)
    }

    fn cube(&self, name: &str) -> DomainResult<Arc<dyn Cube>> {
        find_named(read(&self.cubes).as_slice(), name, MemoryCube::name)
            .map(|cube| cube as Arc<dyn Cube>)
            .ok_or_else(|| {
                DomainError::new(codes::CUBE_NOT_FOUND, format!("cube {name} not found"))
            })
    }
}
