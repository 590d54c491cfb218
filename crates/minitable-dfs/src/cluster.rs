//! In-process filesystem cluster: one metadata node, N data nodes.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use minitable_config::{keys, ClusterConfig, ConfigError};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::DfsError;
use crate::namespace::Namespace;
use crate::FORMAT_MARKER;

/// Home directory created for clients on a fresh namespace.
const HOME_DIR: &str = "/user/minitable";

/// Launch options for [`DfsCluster::start`].
#[derive(Debug, Clone)]
pub struct DfsClusterOptions {
    /// Number of data nodes to launch.
    pub num_data_nodes: usize,
    /// Format the state directory before starting.
    pub format: bool,
    /// Validate the configured data-node addresses instead of defaulting
    /// to loopback ephemeral ports.
    pub check_data_node_addr: bool,
    /// Validate the advertised data-node hostname against the bind address.
    pub check_data_node_host: bool,
}

impl Default for DfsClusterOptions {
    fn default() -> Self {
        Self {
            num_data_nodes: 1,
            format: true,
            check_data_node_addr: true,
            check_data_node_host: true,
        }
    }
}

/// The metadata node: owns the namespace, serves RPC and HTTP endpoints.
#[derive(Debug)]
pub struct MetadataNode {
    rpc_addr: SocketAddr,
    http_addr: SocketAddr,
    tasks: Vec<JoinHandle<()>>,
}

/// A data node serving block transfer, HTTP, and IPC endpoints.
#[derive(Debug)]
pub struct DataNode {
    id: usize,
    addr: SocketAddr,
    http_addr: SocketAddr,
    ipc_addr: SocketAddr,
    hostname: String,
    tasks: Vec<JoinHandle<()>>,
}

impl DataNode {
    /// Node index within the cluster.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Transfer address this node is bound on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Hostname the node advertised at registration.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }
}

/// Client handle onto a running cluster's namespace.
#[derive(Debug, Clone)]
pub struct DfsClient {
    uri: String,
    namespace: Arc<Namespace>,
}

impl DfsClient {
    /// Filesystem URI, e.g. `dfs://127.0.0.1:18020`.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Home directory for cluster clients.
    pub fn home_dir(&self) -> &'static str {
        HOME_DIR
    }

    /// Qualify a namespace path with the filesystem URI.
    pub fn make_qualified(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.uri, path)
    }

    /// Create a directory and any missing parents.
    pub fn mkdirs(&self, path: &str) -> Result<(), DfsError> {
        self.namespace.mkdirs(path)
    }

    /// Create or overwrite a file.
    pub fn create_file(&self, path: &str, bytes: &[u8]) -> Result<(), DfsError> {
        self.namespace.create_file(path, bytes)
    }

    /// Read a file, if it exists.
    pub fn read_file(&self, path: &str) -> Option<Vec<u8>> {
        self.namespace.read_file(path)
    }

    /// Whether a path exists.
    pub fn exists(&self, path: &str) -> bool {
        self.namespace.exists(path)
    }

    /// Whether a path is a directory.
    pub fn is_dir(&self, path: &str) -> bool {
        self.namespace.is_dir(path)
    }
}

/// A running in-process filesystem cluster.
#[derive(Debug)]
pub struct DfsCluster {
    namespace: Arc<Namespace>,
    metadata: MetadataNode,
    data_nodes: Vec<DataNode>,
    state_dir: PathBuf,
    shutdown_tx: watch::Sender<bool>,
}

impl DfsCluster {
    /// Start the cluster against the shared configuration.
    ///
    /// Reads the state directory from [`keys::DFS_STATE_DIR`], formats it
    /// when requested, binds the metadata and data-node listeners, and
    /// writes the resolved metadata addresses back into the configuration.
    pub async fn start(
        config: Arc<ClusterConfig>,
        options: DfsClusterOptions,
    ) -> Result<Self, DfsError> {
        let state_dir = PathBuf::from(config.get(keys::DFS_STATE_DIR).ok_or(
            ConfigError::Missing {
                key: keys::DFS_STATE_DIR.to_string(),
            },
        )?);

        if options.format {
            Self::format(&state_dir)?;
        } else if !state_dir.join(FORMAT_MARKER).is_file() {
            return Err(DfsError::UnformattedStateDir { path: state_dir });
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let metadata = Self::start_metadata_node(&config, &shutdown_rx).await?;
        info!(
            rpc = %metadata.rpc_addr,
            http = %metadata.http_addr,
            "[dfs] metadata node up"
        );

        let mut data_nodes = Vec::with_capacity(options.num_data_nodes);
        for id in 0..options.num_data_nodes {
            let node =
                Self::start_data_node(&config, id, &options, &state_dir, &shutdown_rx).await?;
            info!(id, addr = %node.addr, hostname = %node.hostname, "[dfs] data node up");
            data_nodes.push(node);
        }

        let namespace = Namespace::new();
        namespace.mkdirs(HOME_DIR)?;

        Ok(Self {
            namespace,
            metadata,
            data_nodes,
            state_dir,
            shutdown_tx,
        })
    }

    /// Format the state directory: wipe it and write a fresh marker.
    fn format(dir: &Path) -> Result<(), DfsError> {
        if dir.exists() {
            std::fs::remove_dir_all(dir)?;
        }
        std::fs::create_dir_all(dir)?;
        let formatted = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        std::fs::write(
            dir.join(FORMAT_MARKER),
            format!("layout=1\nformatted={formatted}\n"),
        )?;
        info!(dir = %dir.display(), "[dfs] formatted state directory");
        Ok(())
    }

    async fn start_metadata_node(
        config: &ClusterConfig,
        shutdown_rx: &watch::Receiver<bool>,
    ) -> Result<MetadataNode, DfsError> {
        let rpc_requested = config
            .get_socket_addr(keys::DFS_METADATA_RPC_ADDRESS)?
            .unwrap_or_else(loopback_ephemeral);
        let http_requested = config
            .get_socket_addr(keys::DFS_METADATA_HTTP_ADDRESS)?
            .unwrap_or_else(loopback_ephemeral);

        let (rpc_listener, rpc_addr) = bind("metadata rpc", rpc_requested).await?;
        let (http_listener, http_addr) = bind("metadata http", http_requested).await?;

        // Resolved addresses go back into the shared configuration; when the
        // keys are protected the overlay value already matches the bind.
        config.set(keys::DFS_METADATA_RPC_ADDRESS, rpc_addr.to_string());
        config.set(keys::DFS_METADATA_HTTP_ADDRESS, http_addr.to_string());

        Ok(MetadataNode {
            rpc_addr,
            http_addr,
            tasks: vec![
                spawn_accept_loop(rpc_listener, shutdown_rx.clone()),
                spawn_accept_loop(http_listener, shutdown_rx.clone()),
            ],
        })
    }

    async fn start_data_node(
        config: &ClusterConfig,
        id: usize,
        options: &DfsClusterOptions,
        state_dir: &Path,
        shutdown_rx: &watch::Receiver<bool>,
    ) -> Result<DataNode, DfsError> {
        let storage_dir = state_dir.join(format!("data{}", id + 1));
        std::fs::create_dir_all(&storage_dir)?;

        let fallback = loopback_ephemeral();
        let (addr_requested, http_requested, ipc_requested) = if options.check_data_node_addr {
            (
                config
                    .get_socket_addr(keys::DFS_DATANODE_ADDRESS)?
                    .unwrap_or(fallback),
                config
                    .get_socket_addr(keys::DFS_DATANODE_HTTP_ADDRESS)?
                    .unwrap_or(fallback),
                config
                    .get_socket_addr(keys::DFS_DATANODE_IPC_ADDRESS)?
                    .unwrap_or(fallback),
            )
        } else {
            (fallback, fallback, fallback)
        };

        let hostname = config.get_or(keys::DFS_DATANODE_HOSTNAME, "localhost");
        if options.check_data_node_host && !hostname_matches(&hostname, &addr_requested) {
            return Err(DfsError::HostnameMismatch {
                advertised: hostname,
                bound: addr_requested.ip().to_string(),
            });
        }

        // Registration-time reverse DNS: only loopback resolves inside the
        // embedded cluster. Restricted environments disable the check.
        if config.get_bool_or(keys::DFS_REVERSE_DNS_CHECK, true)
            && !addr_requested.ip().is_loopback()
        {
            return Err(DfsError::ReverseDnsUnavailable {
                host: addr_requested.ip().to_string(),
            });
        }

        let (listener, addr) = bind("data node", addr_requested).await?;
        let (http_listener, http_addr) = bind("data node http", http_requested).await?;
        let (ipc_listener, ipc_addr) = bind("data node ipc", ipc_requested).await?;

        Ok(DataNode {
            id,
            addr,
            http_addr,
            ipc_addr,
            hostname,
            tasks: vec![
                spawn_accept_loop(listener, shutdown_rx.clone()),
                spawn_accept_loop(http_listener, shutdown_rx.clone()),
                spawn_accept_loop(ipc_listener, shutdown_rx.clone()),
            ],
        })
    }

    /// Resolve once every node in the cluster is accepting connections.
    pub async fn await_cluster_up(&self) -> Result<(), DfsError> {
        probe("metadata rpc", self.metadata.rpc_addr).await?;
        probe("metadata http", self.metadata.http_addr).await?;
        for node in &self.data_nodes {
            probe("data node", node.addr).await?;
            probe("data node http", node.http_addr).await?;
            probe("data node ipc", node.ipc_addr).await?;
        }
        Ok(())
    }

    /// Client handle sharing this cluster's namespace.
    pub fn client(&self) -> DfsClient {
        DfsClient {
            uri: format!("dfs://{}", self.metadata.rpc_addr),
            namespace: Arc::clone(&self.namespace),
        }
    }

    /// Resolved metadata RPC address.
    pub fn metadata_rpc_addr(&self) -> SocketAddr {
        self.metadata.rpc_addr
    }

    /// Data nodes currently registered.
    pub fn data_nodes(&self) -> &[DataNode] {
        &self.data_nodes
    }

    /// State directory this cluster persists into.
    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// Stop all nodes and wait for their listener tasks to finish.
    pub async fn shutdown(&mut self) {
        let _ = self.shutdown_tx.send(true);
        for task in self
            .metadata
            .tasks
            .drain(..)
            .chain(self.data_nodes.iter_mut().flat_map(|n| n.tasks.drain(..)))
        {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "[dfs] listener task ended abnormally");
                }
            }
        }
        info!("[dfs] cluster shut down");
    }
}

fn loopback_ephemeral() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 0))
}

fn hostname_matches(hostname: &str, addr: &SocketAddr) -> bool {
    if hostname == addr.ip().to_string() {
        return true;
    }
    hostname == "localhost" && addr.ip().is_loopback()
}

async fn bind(role: &'static str, addr: SocketAddr) -> Result<(TcpListener, SocketAddr), DfsError> {
    let listener = TcpListener::bind(addr).await.map_err(|source| DfsError::Bind {
        role,
        addr: addr.to_string(),
        source,
    })?;
    let resolved = listener.local_addr().map_err(DfsError::Io)?;
    Ok((listener, resolved))
}

async fn probe(role: &'static str, addr: SocketAddr) -> Result<(), DfsError> {
    TcpStream::connect(addr)
        .await
        .map(drop)
        .map_err(|source| DfsError::NotServing {
            role,
            addr: addr.to_string(),
            source,
        })
}

fn spawn_accept_loop(listener: TcpListener, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, _)) => drop(stream),
                    Err(_) => break,
                },
            }
        }
    })
}
