//! Coordination service errors.

use minitable_config::ConfigError;
use thiserror::Error;

/// Errors raised while launching the embedded coordination service.
#[derive(Debug, Error)]
pub enum QuorumError {
    /// The client listener could not be bound.
    #[error("failed to bind client listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed or missing configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Underlying I/O failure.
    #[error("coordination service I/O error: {0}")]
    Io(#[from] std::io::Error),
}
