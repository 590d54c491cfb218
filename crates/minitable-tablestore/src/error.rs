//! Table store errors.

use minitable_config::ConfigError;
use thiserror::Error;

/// Errors raised by the embedded table store.
#[derive(Debug, Error)]
pub enum TableStoreError {
    /// A table with this name already exists. Idempotent creators treat
    /// this as success when it races a concurrent create.
    #[error("table '{name}' already exists")]
    TableExists { name: String },

    /// No table with this name.
    #[error("table '{name}' does not exist")]
    TableNotFound { name: String },

    /// Column references a family the table was not created with.
    #[error("table '{table}' has no column family '{family}'")]
    UnknownColumnFamily { table: String, family: String },

    /// Column is not of the form `family:qualifier`.
    #[error("invalid column '{column}', expected family:qualifier")]
    InvalidColumn { column: String },

    /// No online worker serves this table's region yet.
    #[error("no online worker is serving table '{table}'")]
    RegionOffline { table: String },

    /// A second coordinator was started without shutting the first down.
    #[error("coordinator is already running")]
    CoordinatorAlreadyRunning,

    /// A worker was started before any coordinator.
    #[error("worker started before coordinator")]
    NoCoordinator,

    /// More workers started than the configured maximum.
    #[error("already at the configured maximum of {max} workers")]
    TooManyWorkers { max: usize },

    /// The coordination endpoint is not available in configuration.
    #[error("coordination endpoint unset or zero under '{key}'")]
    MissingQuorumEndpoint { key: &'static str },

    /// A listener could not be bound.
    #[error("failed to bind {role} listener on {addr}: {source}")]
    Bind {
        role: &'static str,
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed or missing configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Underlying I/O failure.
    #[error("table store I/O error: {0}")]
    Io(#[from] std::io::Error),
}
