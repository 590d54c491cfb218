//! Coordination service launcher.

use std::sync::Arc;

use minitable_config::{keys, ClusterConfig};
use minitable_quorum::QuorumServer;
use tracing::info;

use crate::error::ClusterError;
use crate::state::StateLayout;

/// Start the single-node coordination service and publish its resolved
/// client port under the key the table store reads to find it.
pub(crate) async fn start(
    config: &Arc<ClusterConfig>,
    layout: &StateLayout,
    client_port: u16,
) -> Result<(QuorumServer, u16), ClusterError> {
    info!(
        state_dir = %layout.quorum_dir().display(),
        requested_port = client_port,
        "[runtime] starting coordination service"
    );

    let server = QuorumServer::start(Arc::clone(config), layout.quorum_dir(), client_port).await?;
    let resolved_port = server.client_port();

    config.set(keys::QUORUM_CLIENT_PORT, resolved_port.to_string());
    info!(client_port = resolved_port, "[runtime] coordination service ready");

    Ok((server, resolved_port))
}
