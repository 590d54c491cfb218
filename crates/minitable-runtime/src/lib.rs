//! # minitable Runtime
//!
//! Orchestrates an ephemeral, in-process cluster of three dependent
//! services for hermetic test and demo environments:
//!
//! 1. a distributed filesystem (`minitable-dfs`),
//! 2. a coordination service (`minitable-quorum`) on top of it,
//! 3. a table store (`minitable-tablestore`) on top of both,
//!
//! then bootstraps the management table the application layer needs and
//! hands back a ready dataset-repository handle.
//!
//! ## Startup Sequence
//!
//! ```text
//! StateLayout::resolve ── format or reuse <base>/dfs, <base>/zk
//!        │
//! BindPolicy::apply ───── restricted-network overlay, protected keys
//!        │
//! filesystem service ──── 1 metadata node + 1 data node, await up
//!        │
//! coordination service ── resolved client port into configuration
//!        │
//! table store ─────────── 0-process cluster, +1 coordinator, +1 worker,
//!        │                poll online, full catalog scan
//! schema bootstrap ────── managed_schemas (meta / schema / _s)
//! ```
//!
//! Shutdown runs the reverse order with a blocking wait at each step.
//! Every wait in both directions is bounded by [`ReadinessConfig`].
//!
//! ## Usage
//!
//! ```ignore
//! use minitable_runtime::{ClusterOptions, MiniCluster};
//!
//! let mut cluster = MiniCluster::new(ClusterOptions::new("./data/minitable"));
//! cluster.startup().await?;
//! let repo = cluster.repository().unwrap();
//! // ... application layer works against the repository ...
//! cluster.shutdown().await?;
//! ```

pub mod bootstrap;
pub mod datasets;
pub mod error;
pub mod launcher;
pub mod network;
pub mod orchestrator;
pub mod readiness;
pub mod state;

pub use datasets::{DatasetRepository, DatasetSchema, FieldSchema};
pub use error::ClusterError;
pub use network::{
    BindPolicy, ConfigHostnameResolver, HostnameResolver, StaticHostnameResolver,
    BIND_ADDRESS_ENV, DEFAULT_BIND_ADDRESS,
};
pub use orchestrator::{ClusterOptions, MiniCluster};
pub use readiness::ReadinessConfig;
pub use state::StateLayout;
