//! Single-node coordination server.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use minitable_config::{keys, ClusterConfig};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::QuorumError;
use crate::EPOCH_FILE;

/// A running single-node coordination service.
#[derive(Debug)]
pub struct QuorumServer {
    client_addr: SocketAddr,
    epoch: u64,
    data_dir: PathBuf,
    shutdown_tx: watch::Sender<bool>,
    accept_task: Option<JoinHandle<()>>,
}

impl QuorumServer {
    /// Start the server, persisting state under `data_dir` and binding the
    /// client port on the configured bind address. `client_port` 0 selects
    /// an ephemeral port; the resolved port is available from
    /// [`client_port`](QuorumServer::client_port).
    pub async fn start(
        config: Arc<ClusterConfig>,
        data_dir: &Path,
        client_port: u16,
    ) -> Result<Self, QuorumError> {
        std::fs::create_dir_all(data_dir)?;
        let epoch = bump_epoch(data_dir)?;

        let bind_host = config.get_or(keys::QUORUM_BIND_ADDRESS, "127.0.0.1");
        let requested = format!("{bind_host}:{client_port}");
        let listener =
            TcpListener::bind(requested.as_str())
                .await
                .map_err(|source| QuorumError::Bind {
                    addr: requested.clone(),
                    source,
                })?;
        let client_addr = listener.local_addr()?;

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let accept_task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    accepted = listener.accept() => match accepted {
                        Ok((stream, _)) => drop(stream),
                        Err(_) => break,
                    },
                }
            }
        });

        info!(addr = %client_addr, epoch, "[quorum] server up");

        Ok(Self {
            client_addr,
            epoch,
            data_dir: data_dir.to_path_buf(),
            shutdown_tx,
            accept_task: Some(accept_task),
        })
    }

    /// Resolved client port.
    pub fn client_port(&self) -> u16 {
        self.client_addr.port()
    }

    /// Resolved client address.
    pub fn client_addr(&self) -> SocketAddr {
        self.client_addr
    }

    /// Epoch of this incarnation; increments on every reuse of the same
    /// state directory.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// State directory this server persists into.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Stop the server and wait for the accept loop to finish.
    pub async fn shutdown(&mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.accept_task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "[quorum] accept loop ended abnormally");
                }
            }
        }
        info!("[quorum] server shut down");
    }
}

/// Read, increment, and persist the epoch marker.
fn bump_epoch(data_dir: &Path) -> Result<u64, QuorumError> {
    let path = data_dir.join(EPOCH_FILE);
    let previous = match std::fs::read_to_string(&path) {
        Ok(contents) => contents.trim().parse::<u64>().unwrap_or(0),
        Err(_) => 0,
    };
    let epoch = previous + 1;
    std::fs::write(&path, format!("{epoch}\n"))?;
    Ok(epoch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpStream;

    #[tokio::test]
    async fn test_ephemeral_port_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let config = Arc::new(ClusterConfig::new());

        let mut server = QuorumServer::start(config, dir.path(), 0).await.unwrap();
        assert_ne!(server.client_port(), 0);

        // The resolved endpoint must accept connections.
        TcpStream::connect(server.client_addr()).await.unwrap();

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_epoch_increments_on_reuse() {
        let dir = tempfile::tempdir().unwrap();
        let config = Arc::new(ClusterConfig::new());

        let mut first = QuorumServer::start(Arc::clone(&config), dir.path(), 0)
            .await
            .unwrap();
        assert_eq!(first.epoch(), 1);
        first.shutdown().await;

        let mut second = QuorumServer::start(config, dir.path(), 0).await.unwrap();
        assert_eq!(second.epoch(), 2);
        second.shutdown().await;
    }

    #[tokio::test]
    async fn test_bind_conflict_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = Arc::new(ClusterConfig::new());

        let mut first = QuorumServer::start(Arc::clone(&config), dir.path(), 0)
            .await
            .unwrap();
        let taken = first.client_port();

        let err = QuorumServer::start(config, dir.path(), taken)
            .await
            .unwrap_err();
        assert!(matches!(err, QuorumError::Bind { .. }));

        first.shutdown().await;
    }
}
