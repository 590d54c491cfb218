//! Filesystem service errors.

use std::path::PathBuf;

use minitable_config::ConfigError;
use thiserror::Error;

/// Errors raised while launching or using the embedded filesystem.
#[derive(Debug, Error)]
pub enum DfsError {
    /// The state directory exists but carries no format marker. Reuse is
    /// decided on directory existence alone, so a corrupted or foreign
    /// directory surfaces here, at launch, as a fatal error.
    #[error("state directory {} is not a formatted filesystem image", path.display())]
    UnformattedStateDir { path: PathBuf },

    /// A listener could not be bound.
    #[error("failed to bind {role} listener on {addr}: {source}")]
    Bind {
        role: &'static str,
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// A node that should be serving did not accept a connection.
    #[error("{role} at {addr} is not serving: {source}")]
    NotServing {
        role: &'static str,
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// A data node advertised a hostname inconsistent with its bind address.
    #[error("data node hostname '{advertised}' does not match bind address '{bound}'")]
    HostnameMismatch { advertised: String, bound: String },

    /// Reverse DNS cannot resolve the joining data node's host. Restricted
    /// network environments must disable the check instead.
    #[error("reverse DNS lookup unavailable for data node host '{host}'")]
    ReverseDnsUnavailable { host: String },

    /// A namespace path component is a file where a directory is required.
    #[error("path '{path}' exists and is not a directory")]
    NotADirectory { path: String },

    /// Malformed or missing configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Underlying I/O failure.
    #[error("filesystem I/O error: {0}")]
    Io(#[from] std::io::Error),
}
