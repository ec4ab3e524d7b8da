use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use super::dimension::Coordinate;
use super::{MemoryDimension, read, write};
use crate::domain::{Cube, Dimension, DomainError, DomainResult, codes};
use crate::types::{
    CellData, CellValue, CubeInfo, CubeStatus, CubeType, DimensionElementType, LockInfo, RuleInfo,
    SplashMode,
};

#[derive(Clone, Debug, PartialEq)]
enum Stored {
    Numeric(f64),
    String(String),
}

struct Lock {
    info: LockInfo,
    /// Base element identifiers covered by the lock, per dimension.
    cells: Vec<HashSet<u32>>,
}

impl Lock {
    fn covers(&self, path: &[u32]) -> bool {
        self.cells.iter().zip(path).all(|(ids, id)| ids.contains(id))
    }

    fn overlaps(&self, other: &[HashSet<u32>]) -> bool {
        self.cells
            .iter()
            .zip(other)
            .all(|(a, b)| !a.is_disjoint(b))
    }
}

pub struct MemoryCube {
    identifier: u32,
    name: String,
    dimensions: Vec<Arc<MemoryDimension>>,
    cells: RwLock<HashMap<Vec<u32>, Stored>>,
    rules: RwLock<Vec<RuleInfo>>,
    locks: RwLock<Vec<Lock>>,
}

fn invalid_coordinates(description: impl Into<String>) -> DomainError {
    DomainError::new(codes::INVALID_COORDINATES, description)
}

/// Every combination of base elements below the given coordinates, with the
/// product of the consolidation weights.
fn base_paths(coords: &[Coordinate]) -> Vec<(Vec<u32>, f64)> {
    coords.iter().fold(vec![(Vec::new(), 1.0)], |acc, coord| {
        acc.iter()
            .flat_map(|(path, weight)| {
                coord.leaves.iter().map(move |&(leaf, w)| {
                    let mut next = path.clone();
                    next.push(leaf);
                    (next, weight * w)
                })
            })
            .collect()
    })
}

impl MemoryCube {
    pub(super) fn new(identifier: u32, name: &str, dimensions: Vec<Arc<MemoryDimension>>) -> Self {
        MemoryCube {
            identifier,
            name: name.trim().to_string(),
            dimensions,
            cells: RwLock::new(HashMap::new()),
            rules: RwLock::new(Vec::new()),
            locks: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn resolve(&self, path: &[String]) -> DomainResult<Vec<Coordinate>> {
        if path.len() != self.dimensions.len() {
            return Err(invalid_coordinates(format!(
                "cube {} has {} dimensions, got {} coordinates",
                self.name,
                self.dimensions.len(),
                path.len()
            )));
        }
        self.dimensions
            .iter()
            .zip(path)
            .map(|(dim, name)| dim.coordinate(name))
            .collect()
    }

    fn check_unlocked(&self, paths: &[(Vec<u32>, f64)]) -> DomainResult<()> {
        let locks = read(&self.locks);
        match locks
            .iter()
            .find(|lock| paths.iter().any(|(path, _)| lock.covers(path)))
        {
            Some(lock) => Err(DomainError::new(
                codes::CUBE_BLOCKED_BY_LOCK,
                format!("cell is locked by {}", lock.info.user),
            )),
            None => Ok(()),
        }
    }
}

impl Cube for MemoryCube {
    fn info(&self) -> DomainResult<CubeInfo> {
        let mut number_cells: i64 = 1;
        for dim in &self.dimensions {
            number_cells = number_cells.saturating_mul(dim.element_count()? as i64);
        }
        Ok(CubeInfo {
            identifier: self.identifier,
            name: self.name.clone(),
            dimensions: self.dimensions.iter().map(|d| d.identifier()).collect(),
            number_cells,
            number_filled_cells: read(&self.cells).len() as i64,
            status: CubeStatus::Loaded,
            cube_type: CubeType::Normal,
            permission: None,
        })
    }

    fn cell_value(&self, path: &[String], properties: &[String]) -> DomainResult<CellData> {
        let coords = self.resolve(path)?;
        let is_string = coords
            .iter()
            .any(|c| c.element_type == DimensionElementType::String);
        let paths = base_paths(&coords);
        let cells = read(&self.cells);

        let mut data = if is_string {
            let text = match paths.as_slice() {
                [(base, _)] => match cells.get(base) {
                    Some(Stored::String(s)) => s.clone(),
                    Some(Stored::Numeric(n)) => n.to_string(),
                    None => String::new(),
                },
                _ => String::new(),
            };
            CellData::string(text)
        } else {
            let sum = paths
                .iter()
                .map(|(base, weight)| match cells.get(base) {
                    Some(Stored::Numeric(n)) => n * weight,
                    _ => 0.0,
                })
                .sum();
            CellData::numeric(sum)
        };
        data.properties = properties.iter().map(|_| String::new()).collect();
        Ok(data)
    }

    fn set_cell_value(
        &self,
        path: &[String],
        value: &CellValue,
        splash: SplashMode,
    ) -> DomainResult<()> {
        let coords = self.resolve(path)?;
        let consolidated = coords.iter().any(|c| {
            c.element_type == DimensionElementType::Consolidated || c.leaves.len() != 1
        });
        let is_string = coords
            .iter()
            .any(|c| c.element_type == DimensionElementType::String);
        let paths = base_paths(&coords);
        self.check_unlocked(&paths)?;

        let stored = match (value, is_string) {
            (CellValue::String(s), true) => Stored::String(s.clone()),
            (CellValue::Numeric(n), true) => Stored::String(n.to_string()),
            (CellValue::Numeric(n), false) => Stored::Numeric(*n),
            (CellValue::String(s), false) => match s.trim().parse::<f64>() {
                Ok(n) => Stored::Numeric(n),
                Err(_) => {
                    return Err(DomainError::new(
                        codes::INVALID_TYPE,
                        format!("{s:?} is not a number"),
                    ));
                }
            },
            (CellValue::Error(_), _) => {
                return Err(DomainError::new(
                    codes::INVALID_TYPE,
                    "error values cannot be stored",
                ));
            }
        };

        if consolidated && splash == SplashMode::None {
            return Err(DomainError::new(
                codes::SPLASH_DISABLED,
                "splashing is disabled for this write",
            ));
        }

        let mut cells = write(&self.cells);
        for (base, _) in paths {
            match (&stored, splash) {
                (Stored::Numeric(add), SplashMode::Add) => {
                    let current = match cells.get(&base) {
                        Some(Stored::Numeric(n)) => *n,
                        _ => 0.0,
                    };
                    cells.insert(base, Stored::Numeric(current + add));
                }
                _ => {
                    cells.insert(base, stored.clone());
                }
            }
        }
        tracing::debug!(cube = %self.name, ?splash, "cell written");
        Ok(())
    }

    fn rules(&self) -> DomainResult<Vec<RuleInfo>> {
        Ok(read(&self.rules).clone())
    }

    fn create_rule(
        &self,
        definition: &str,
        extern_id: &str,
        comment: &str,
        activate: bool,
    ) -> DomainResult<RuleInfo> {
        if definition.trim().is_empty() {
            return Err(DomainError::new(codes::PARSING_RULE, "empty rule definition"));
        }
        let mut rules = write(&self.rules);
        let rule = RuleInfo {
            identifier: rules.len() as u32,
            definition: definition.to_string(),
            extern_id: extern_id.to_string(),
            comment: comment.to_string(),
            timestamp: chrono::Utc::now().timestamp(),
            activated: activate,
        };
        rules.push(rule.clone());
        Ok(rule)
    }

    fn locks(&self) -> DomainResult<Vec<LockInfo>> {
        Ok(read(&self.locks).iter().map(|l| l.info.clone()).collect())
    }

    fn lock(&self, area: &[Vec<String>], user: &str) -> DomainResult<LockInfo> {
        let whole: Vec<Vec<String>>;
        let area = if area.is_empty() {
            whole = self
                .dimensions
                .iter()
                .map(|dim| {
                    dim.elements()
                        .map(|elements| elements.into_iter().map(|e| e.name).collect())
                })
                .collect::<DomainResult<_>>()?;
            whole.as_slice()
        } else {
            area
        };
        if area.len() != self.dimensions.len() {
            return Err(invalid_coordinates(format!(
                "lock area needs {} element lists, got {}",
                self.dimensions.len(),
                area.len()
            )));
        }
        let mut cells = Vec::with_capacity(area.len());
        for (dim, names) in self.dimensions.iter().zip(area) {
            let mut ids = HashSet::new();
            for name in names {
                ids.extend(dim.coordinate(name)?.leaves.into_iter().map(|(id, _)| id));
            }
            cells.push(ids);
        }

        let mut locks = write(&self.locks);
        if let Some(other) = locks
            .iter()
            .find(|l| l.info.user != user && l.overlaps(&cells))
        {
            return Err(DomainError::new(
                codes::CUBE_BLOCKED_BY_LOCK,
                format!("area overlaps a lock held by {}", other.info.user),
            ));
        }
        let info = LockInfo {
            identifier: locks.len() as u32,
            area: area.to_vec(),
            user: user.to_string(),
            steps: 0,
        };
        locks.push(Lock {
            info: info.clone(),
            cells,
        });
        Ok(info)
    }
}
