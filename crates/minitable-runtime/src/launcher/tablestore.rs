//! Table store launcher.
//!
//! Readiness is proven in two stages. Stage one constructs the cluster
//! object with zero pre-launched processes, finalizes all address, port,
//! and root-directory configuration, then explicitly starts one
//! coordinator and one worker. Stage two polls the worker's online status
//! under the startup deadline, and once online performs one full forward
//! scan of the internal catalog table: online status alone does not prove
//! the store can serve a metadata lookup.

use std::sync::Arc;

use minitable_config::{keys, ClusterConfig};
use minitable_dfs::DfsClient;
use minitable_tablestore::{TableStoreCluster, Worker, CATALOG_TABLE};
use tracing::{debug, info};

use crate::error::ClusterError;
use crate::readiness::{self, ReadinessConfig};

/// Directory created for the table store under the filesystem home dir.
const TABLESTORE_DIR: &str = "tablestore";

/// Marker file written into a fresh table-store root.
const VERSION_FILE: &str = ".version";

/// Start the table store on top of the running filesystem and
/// coordination services.
pub(crate) async fn start(
    config: &Arc<ClusterConfig>,
    dfs: &DfsClient,
    readiness: &ReadinessConfig,
) -> Result<TableStoreCluster, ClusterError> {
    // Root directory lives inside the distributed filesystem.
    let root_path = format!("{}/{}", dfs.home_dir(), TABLESTORE_DIR);
    dfs.mkdirs(&root_path)?;
    dfs.create_file(&format!("{root_path}/{VERSION_FILE}"), b"1\n")?;
    config.set(keys::TABLESTORE_ROOT_DIR, dfs.make_qualified(&root_path));

    // Finalize process configuration before anything binds a socket: no
    // embedded web consoles, and exactly one worker must check in before
    // the catalog comes online.
    config.set(keys::TABLESTORE_COORDINATOR_INFO_PORT, keys::INFO_PORT_DISABLED);
    config.set(keys::TABLESTORE_WORKER_INFO_PORT, keys::INFO_PORT_DISABLED);
    if config.get(keys::TABLESTORE_MIN_WORKERS_TO_START).is_none() {
        config.set(keys::TABLESTORE_MIN_WORKERS_TO_START, "1");
    }
    if config.get(keys::TABLESTORE_MAX_WORKERS_TO_START).is_none() {
        config.set(keys::TABLESTORE_MAX_WORKERS_TO_START, "1");
    }

    info!(root = %config.get_or(keys::TABLESTORE_ROOT_DIR, ""), "[runtime] starting table store");

    let mut cluster = TableStoreCluster::new(Arc::clone(config), 0, 0).await?;
    cluster.start_coordinator().await?;
    cluster.start_worker().await?;

    readiness::wait_until("table store worker online", readiness, || {
        cluster.worker(0).is_some_and(Worker::is_online)
    })
    .await?;

    // Full forward scan of the catalog as the end-to-end liveness proof.
    let rows = cluster.client().scan(CATALOG_TABLE)?;
    debug!(rows = rows.len(), "[runtime] catalog scan complete");
    info!("[runtime] table store ready");

    Ok(cluster)
}
