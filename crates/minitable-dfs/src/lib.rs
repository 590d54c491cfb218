//! # Embedded Distributed Filesystem
//!
//! A minimal in-process rendition of a distributed filesystem: one metadata
//! node plus N data nodes, all living inside the host process. It exists to
//! give the cluster runtime a real service lifecycle to manage - real TCP
//! listeners, a persisted state directory gated by a format marker, and a
//! client handle the table store builds its root directory on.
//!
//! It is deliberately not a storage engine: file contents live in an
//! in-memory namespace, and only the format marker and per-node directories
//! are persisted.
//!
//! ## Lifecycle
//!
//! ```ignore
//! let cluster = DfsCluster::start(config, DfsClusterOptions::default()).await?;
//! cluster.await_cluster_up().await?;
//! let client = cluster.client();
//! client.mkdirs("/user/minitable/tablestore")?;
//! cluster.shutdown().await;
//! ```

pub mod cluster;
pub mod error;
pub mod namespace;

pub use cluster::{DataNode, DfsClient, DfsCluster, DfsClusterOptions, MetadataNode};
pub use error::DfsError;
pub use namespace::Namespace;

/// Name of the format marker written into a freshly formatted state
/// directory. Its presence is what makes a reused directory acceptable.
pub const FORMAT_MARKER: &str = "VERSION";
