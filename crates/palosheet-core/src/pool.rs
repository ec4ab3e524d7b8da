//! Registry of live server connections.

use std::sync::Arc;

use dashmap::DashMap;

use crate::domain::{DomainError, DomainResult, Server, codes};

/// Servers keyed by connection name. Names are matched case-insensitively.
#[derive(Default)]
pub struct ServerPool {
    servers: DashMap<String, Arc<dyn Server>>,
}

fn key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

impl ServerPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a server, replacing any previous one with the same name.
    pub fn register(&self, name: &str, server: Arc<dyn Server>) {
        tracing::debug!(connection = name, "register server");
        self.servers.insert(key(name), server);
    }

    pub fn get(&self, name: &str) -> DomainResult<Arc<dyn Server>> {
        match self.servers.get(&key(name)) {
            Some(entry) => Ok(Arc::clone(entry.value())),
            None => {
                tracing::debug!(connection = name, "server not found");
                Err(DomainError::new(
                    codes::SERVER_NOT_FOUND,
                    format!("server {name} not found"),
                ))
            }
        }
    }

    pub fn remove(&self, name: &str) -> Option<Arc<dyn Server>> {
        self.servers.remove(&key(name)).map(|(_, server)| server)
    }

    /// Registered connection names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.servers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}

impl std::fmt::Debug for ServerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerPool")
            .field("servers", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryServer;

    #[test]
    fn test_register_and_get() {
        let pool = ServerPool::new();
        pool.register("LocalHost", Arc::new(MemoryServer::new()));
        assert!(pool.get("localhost").is_ok());
        assert_eq!(pool.names(), vec!["localhost".to_string()]);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_missing_server_code() {
        let pool = ServerPool::new();
        let err = pool.get("nowhere").err().unwrap();
        assert_eq!(err.code, codes::SERVER_NOT_FOUND);
        assert!(err.is_not_found());
    }

    #[test]
    fn test_remove() {
        let pool = ServerPool::new();
        pool.register("a", Arc::new(MemoryServer::new()));
        assert!(pool.remove("A").is_some());
        assert!(pool.is_empty());
        assert!(pool.remove("a").is_none());
    }
}
