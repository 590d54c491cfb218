//! # Embedded Table Store
//!
//! An in-process distributed table store: one coordinator owning the table
//! registry and the internal catalog, plus workers that serve table
//! regions. The cluster object is constructed with zero pre-launched
//! processes so that all address and port configuration can be finalized
//! before any socket binds; processes are then started explicitly with
//! [`TableStoreCluster::start_coordinator`] and
//! [`TableStoreCluster::start_worker`].
//!
//! A worker only reports online after it has connected to the coordination
//! service and registered with the coordinator; the catalog comes online
//! once the configured minimum number of workers has registered. Data
//! operations (put/get/scan) require the catalog to be online - a scan of
//! [`CATALOG_TABLE`] is therefore a stronger liveness signal than worker
//! online status alone.

pub mod admin;
pub mod cluster;
pub mod error;
pub mod state;
pub mod table;

pub use admin::{TableStoreAdmin, TableStoreClient};
pub use cluster::{Coordinator, TableStoreCluster, Worker};
pub use error::TableStoreError;
pub use table::{Row, TableDescriptor};

/// Name of the store's internal catalog table.
pub const CATALOG_TABLE: &str = "system.catalog";

/// Column family of the catalog table.
pub const CATALOG_FAMILY: &str = "info";
