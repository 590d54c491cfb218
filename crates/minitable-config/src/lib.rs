//! # Cluster Configuration
//!
//! Shared key/value configuration for the minitable cluster.
//!
//! A single [`ClusterConfig`] instance is created per cluster lifetime and
//! shared by reference across the filesystem, coordination, and table-store
//! services. Launchers write into it sequentially during startup; services
//! read from it when they come up.
//!
//! ## Protected Keys
//!
//! The network identity policy may mark individual keys as *protected*.
//! A protected key keeps the value it was given at protection time: any
//! later [`ClusterConfig::set`] on that key is silently ignored. This is a
//! standing overlay, not a one-time default - the underlying services would
//! otherwise force their own bind addresses back onto these keys while they
//! come up.

pub mod keys;

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;

use parking_lot::RwLock;
use thiserror::Error;

/// Configuration errors surfaced by the typed accessors.
///
/// These correspond to malformed address/port settings and are detected at
/// launch time; no service retries a bad configuration value.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required key has no value.
    #[error("missing required configuration key '{key}'")]
    Missing { key: String },

    /// A value did not parse as `host:port`.
    #[error("invalid socket address for '{key}': '{value}'")]
    InvalidAddress { key: String, value: String },

    /// A value did not parse as a port number.
    #[error("invalid port for '{key}': '{value}'")]
    InvalidPort { key: String, value: String },

    /// A value did not parse as an unsigned count.
    #[error("invalid count for '{key}': '{value}'")]
    InvalidCount { key: String, value: String },
}

#[derive(Default)]
struct Inner {
    values: HashMap<String, String>,
    protected: HashSet<String>,
}

/// Mutable key/value configuration shared across all launched services.
#[derive(Default)]
pub struct ClusterConfig {
    inner: RwLock<Inner>,
}

impl ClusterConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value by key.
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.read().values.get(key).cloned()
    }

    /// Get a value by key, falling back to `default` when unset.
    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Set a value. Writes to protected keys are silently ignored.
    pub fn set(&self, key: &str, value: impl Into<String>) {
        let mut inner = self.inner.write();
        if inner.protected.contains(key) {
            return;
        }
        inner.values.insert(key.to_string(), value.into());
    }

    /// Set a value and mark the key protected against later [`set`] calls.
    ///
    /// [`set`]: ClusterConfig::set
    pub fn set_protected(&self, key: &str, value: impl Into<String>) {
        let mut inner = self.inner.write();
        inner.values.insert(key.to_string(), value.into());
        inner.protected.insert(key.to_string());
    }

    /// Remove a key. Protected keys are not removable.
    pub fn remove(&self, key: &str) {
        let mut inner = self.inner.write();
        if inner.protected.contains(key) {
            return;
        }
        inner.values.remove(key);
    }

    /// Whether a key is protected.
    pub fn is_protected(&self, key: &str) -> bool {
        self.inner.read().protected.contains(key)
    }

    /// Get a value parsed as a socket address.
    pub fn get_socket_addr(&self, key: &str) -> Result<Option<SocketAddr>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .parse::<SocketAddr>()
                .map(Some)
                .map_err(|_| ConfigError::InvalidAddress {
                    key: key.to_string(),
                    value,
                }),
        }
    }

    /// Get a value parsed as a socket address, requiring it to be present.
    pub fn require_socket_addr(&self, key: &str) -> Result<SocketAddr, ConfigError> {
        self.get_socket_addr(key)?.ok_or_else(|| ConfigError::Missing {
            key: key.to_string(),
        })
    }

    /// Get a value parsed as a port number.
    pub fn get_port(&self, key: &str) -> Result<Option<u16>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .parse::<u16>()
                .map(Some)
                .map_err(|_| ConfigError::InvalidPort {
                    key: key.to_string(),
                    value,
                }),
        }
    }

    /// Get a value parsed as an unsigned count.
    pub fn get_count(&self, key: &str) -> Result<Option<usize>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .parse::<usize>()
                .map(Some)
                .map_err(|_| ConfigError::InvalidCount {
                    key: key.to_string(),
                    value,
                }),
        }
    }

    /// Whether a boolean-valued key is enabled. Unset falls back to `default`.
    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(value) => matches!(value.as_str(), "true" | "1"),
            None => default,
        }
    }

    /// Snapshot of all current key/value pairs, sorted by key.
    pub fn snapshot(&self) -> Vec<(String, String)> {
        let inner = self.inner.read();
        let mut pairs: Vec<_> = inner
            .values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        pairs.sort();
        pairs
    }
}

impl std::fmt::Debug for ClusterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("ClusterConfig")
            .field("values", &inner.values.len())
            .field("protected", &inner.protected.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let config = ClusterConfig::new();
        config.set("a.b", "1");
        assert_eq!(config.get("a.b").as_deref(), Some("1"));
        assert_eq!(config.get_or("a.c", "2"), "2");
    }

    #[test]
    fn test_protected_key_ignores_later_writes() {
        let config = ClusterConfig::new();
        config.set_protected(keys::DFS_METADATA_RPC_ADDRESS, "10.0.0.5:18020");
        config.set(keys::DFS_METADATA_RPC_ADDRESS, "127.0.0.1:18020");
        assert_eq!(
            config.get(keys::DFS_METADATA_RPC_ADDRESS).as_deref(),
            Some("10.0.0.5:18020")
        );
        assert!(config.is_protected(keys::DFS_METADATA_RPC_ADDRESS));
    }

    #[test]
    fn test_protected_key_not_removable() {
        let config = ClusterConfig::new();
        config.set_protected("x", "1");
        config.remove("x");
        assert_eq!(config.get("x").as_deref(), Some("1"));
    }

    #[test]
    fn test_remove_unprotected() {
        let config = ClusterConfig::new();
        config.set(keys::TABLESTORE_MIN_WORKERS_TO_START, "1");
        config.remove(keys::TABLESTORE_MIN_WORKERS_TO_START);
        assert!(config.get(keys::TABLESTORE_MIN_WORKERS_TO_START).is_none());
    }

    #[test]
    fn test_socket_addr_parsing() {
        let config = ClusterConfig::new();
        config.set("addr", "127.0.0.1:18020");
        assert_eq!(
            config.require_socket_addr("addr").unwrap(),
            "127.0.0.1:18020".parse().unwrap()
        );

        config.set("addr", "not-an-address");
        assert!(matches!(
            config.require_socket_addr("addr"),
            Err(ConfigError::InvalidAddress { .. })
        ));
        assert!(matches!(
            config.require_socket_addr("unset"),
            Err(ConfigError::Missing { .. })
        ));
    }

    #[test]
    fn test_port_parsing() {
        let config = ClusterConfig::new();
        config.set("port", "2181");
        assert_eq!(config.get_port("port").unwrap(), Some(2181));
        config.set("port", "70000");
        assert!(config.get_port("port").is_err());
    }

    #[test]
    fn test_bool_defaults() {
        let config = ClusterConfig::new();
        assert!(config.get_bool_or("flag", true));
        config.set("flag", "false");
        assert!(!config.get_bool_or("flag", true));
        config.set("flag", "1");
        assert!(config.get_bool_or("flag", false));
    }
}
