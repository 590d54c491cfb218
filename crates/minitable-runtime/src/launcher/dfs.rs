//! Filesystem service launcher.

use std::sync::Arc;

use minitable_config::{keys, ClusterConfig};
use minitable_dfs::{DfsCluster, DfsClusterOptions};
use tracing::info;

use crate::error::ClusterError;
use crate::network::HostnameResolver;
use crate::readiness::{self, ReadinessConfig};
use crate::state::StateLayout;

/// Start one metadata node and one data node against the resolved state
/// layout, wait for the cluster to report up, and publish the resolved
/// filesystem URI into the shared configuration.
pub(crate) async fn start(
    config: &Arc<ClusterConfig>,
    layout: &StateLayout,
    resolver: &dyn HostnameResolver,
    readiness: &ReadinessConfig,
) -> Result<DfsCluster, ClusterError> {
    config.set(keys::DFS_STATE_DIR, layout.dfs_dir().to_string_lossy());
    config.set(keys::DFS_DATANODE_HOSTNAME, resolver.hostname());

    info!(
        state_dir = %layout.dfs_dir().display(),
        format = layout.should_format(),
        "[runtime] starting filesystem service"
    );

    let options = DfsClusterOptions {
        num_data_nodes: 1,
        format: layout.should_format(),
        check_data_node_addr: true,
        check_data_node_host: true,
    };
    let cluster = DfsCluster::start(Arc::clone(config), options).await?;

    readiness::bounded("filesystem cluster up", readiness, cluster.await_cluster_up()).await?;

    config.set(keys::DFS_DEFAULT_URI, cluster.client().uri());
    info!(uri = %cluster.client().uri(), "[runtime] filesystem service ready");

    Ok(cluster)
}
