//! Runtime errors.
//!
//! Service failures propagate unmodified inside their stage variant; the
//! orchestrator never retries and never converts one failure into another.

use std::path::PathBuf;
use std::time::Duration;

use minitable_config::ConfigError;
use minitable_dfs::DfsError;
use minitable_quorum::QuorumError;
use minitable_tablestore::TableStoreError;
use thiserror::Error;

/// Errors surfaced by the cluster runtime.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// `startup()` was called while the cluster is already up.
    #[error("startup() called while the cluster is already up")]
    AlreadyUp,

    /// `shutdown()` was called while the cluster is already down.
    #[error("shutdown() called while the cluster is already down")]
    AlreadyDown,

    /// A readiness wait expired before the probed condition held.
    #[error("{stage} not ready within {timeout:?}")]
    ReadinessTimeout {
        stage: &'static str,
        timeout: Duration,
    },

    /// Update requested for a dataset that was never created.
    #[error("dataset '{name}' does not exist")]
    DatasetNotFound { name: String },

    /// A schema file could not be read.
    #[error("failed to read schema file {}: {source}", path.display())]
    SchemaFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A schema file did not parse.
    #[error("failed to parse schema file {}: {source}", path.display())]
    SchemaParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A schema could not be encoded for storage.
    #[error("failed to encode schema for dataset '{name}': {source}")]
    SchemaEncode {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// A stored schema entry could not be decoded.
    #[error("failed to decode stored schema for dataset '{name}': {source}")]
    SchemaDecode {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// Filesystem service failure.
    #[error("filesystem service: {0}")]
    Dfs(#[from] DfsError),

    /// Coordination service failure.
    #[error("coordination service: {0}")]
    Quorum(#[from] QuorumError),

    /// Table store failure.
    #[error("table store: {0}")]
    TableStore(#[from] TableStoreError),

    /// Malformed or missing configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
