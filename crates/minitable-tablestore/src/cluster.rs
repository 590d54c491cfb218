//! Table store cluster: coordinator and worker processes.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use minitable_config::{keys, ClusterConfig, ConfigError};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::admin::{TableStoreAdmin, TableStoreClient};
use crate::error::TableStoreError;
use crate::state::StoreState;

/// Delay between a worker's attempts to reach the coordination service.
const REGISTER_RETRY_DELAY: Duration = Duration::from_millis(25);

/// The coordinator process: owns the registry, serves the IPC endpoint,
/// and optionally an embedded info console.
pub struct Coordinator {
    addr: SocketAddr,
    info_addr: Option<SocketAddr>,
    min_workers: usize,
    max_workers: usize,
    tasks: Vec<JoinHandle<()>>,
}

impl Coordinator {
    /// Resolved IPC address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Resolved info-console address, unless the console is disabled.
    pub fn info_addr(&self) -> Option<SocketAddr> {
        self.info_addr
    }
}

/// A worker process serving table regions.
pub struct Worker {
    id: usize,
    addr: SocketAddr,
    online: Arc<AtomicBool>,
    tasks: Vec<JoinHandle<()>>,
}

impl Worker {
    /// Worker index within the cluster.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Resolved IPC address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Whether this worker has registered and is serving. False until the
    /// worker reaches the coordination service, and false again after
    /// shutdown.
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

/// A running (or not-yet-populated) table store cluster.
pub struct TableStoreCluster {
    config: Arc<ClusterConfig>,
    state: Arc<StoreState>,
    coordinator: Option<Coordinator>,
    workers: Vec<Worker>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl TableStoreCluster {
    /// Create a cluster and start the requested number of processes.
    ///
    /// Passing `0, 0` creates the cluster object without binding a single
    /// socket, leaving configuration open until processes are started
    /// explicitly.
    pub async fn new(
        config: Arc<ClusterConfig>,
        num_coordinators: usize,
        num_workers: usize,
    ) -> Result<Self, TableStoreError> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut cluster = Self {
            config,
            state: Arc::new(StoreState::default()),
            coordinator: None,
            workers: Vec::new(),
            shutdown_tx,
            shutdown_rx,
        };
        for _ in 0..num_coordinators {
            cluster.start_coordinator().await?;
        }
        for _ in 0..num_workers {
            cluster.start_worker().await?;
        }
        Ok(cluster)
    }

    /// Start the coordinator. Requires the root directory and filesystem
    /// URI to be finalized in configuration; fails if one is already
    /// running.
    pub async fn start_coordinator(&mut self) -> Result<(), TableStoreError> {
        if self.coordinator.is_some() {
            return Err(TableStoreError::CoordinatorAlreadyRunning);
        }

        // The store persists beneath the distributed filesystem; both keys
        // must be in place before any process starts.
        let root_dir = self
            .config
            .get(keys::TABLESTORE_ROOT_DIR)
            .ok_or(ConfigError::Missing {
                key: keys::TABLESTORE_ROOT_DIR.to_string(),
            })?;
        self.config
            .get(keys::DFS_DEFAULT_URI)
            .ok_or(ConfigError::Missing {
                key: keys::DFS_DEFAULT_URI.to_string(),
            })?;

        let bind_host = self
            .config
            .get_or(keys::TABLESTORE_COORDINATOR_BIND_ADDRESS, "127.0.0.1");
        let port = self
            .config
            .get_port(keys::TABLESTORE_COORDINATOR_PORT)?
            .unwrap_or(0);
        let (listener, addr) = bind("coordinator", &bind_host, port).await?;

        let info_addr = match self.info_port(keys::TABLESTORE_COORDINATOR_INFO_PORT)? {
            Some(info_port) => {
                let (info_listener, info_addr) =
                    bind("coordinator info", &bind_host, info_port).await?;
                Some((info_listener, info_addr))
            }
            None => None,
        };

        let min_workers = self
            .config
            .get_count(keys::TABLESTORE_MIN_WORKERS_TO_START)?
            .unwrap_or(0);
        let max_workers = self
            .config
            .get_count(keys::TABLESTORE_MAX_WORKERS_TO_START)?
            .unwrap_or(usize::MAX);

        self.state.install_catalog();
        if min_workers == 0 {
            // No worker requirement: the catalog region is assigned
            // immediately.
            self.state.set_catalog_online(true);
        }

        let mut tasks = vec![spawn_accept_loop(listener, self.shutdown_rx.clone())];
        let info_addr = match info_addr {
            Some((info_listener, info_addr)) => {
                tasks.push(spawn_accept_loop(info_listener, self.shutdown_rx.clone()));
                Some(info_addr)
            }
            None => None,
        };

        info!(
            %addr,
            root_dir = %root_dir,
            min_workers,
            "[tablestore] coordinator up"
        );

        self.coordinator = Some(Coordinator {
            addr,
            info_addr,
            min_workers,
            max_workers,
            tasks,
        });
        Ok(())
    }

    /// Start one worker. The worker binds its IPC endpoint immediately but
    /// only reports online after it has connected to the coordination
    /// service and registered with the coordinator.
    pub async fn start_worker(&mut self) -> Result<(), TableStoreError> {
        let coordinator = self
            .coordinator
            .as_ref()
            .ok_or(TableStoreError::NoCoordinator)?;
        if self.workers.len() >= coordinator.max_workers {
            return Err(TableStoreError::TooManyWorkers {
                max: coordinator.max_workers,
            });
        }
        let min_workers = coordinator.min_workers;

        let quorum_port = self
            .config
            .get_port(keys::QUORUM_CLIENT_PORT)?
            .filter(|port| *port != 0)
            .ok_or(TableStoreError::MissingQuorumEndpoint {
                key: keys::QUORUM_CLIENT_PORT,
            })?;
        let quorum_host = self.config.get_or(keys::QUORUM_BIND_ADDRESS, "127.0.0.1");
        let quorum_endpoint = format!("{quorum_host}:{quorum_port}");

        let bind_host = self
            .config
            .get_or(keys::TABLESTORE_WORKER_BIND_ADDRESS, "127.0.0.1");
        let port = self
            .config
            .get_port(keys::TABLESTORE_WORKER_PORT)?
            .unwrap_or(0);
        let (listener, addr) = bind("worker", &bind_host, port).await?;

        // Info console for the worker, unless disabled.
        let mut tasks = vec![spawn_accept_loop(listener, self.shutdown_rx.clone())];
        if let Some(info_port) = self.info_port(keys::TABLESTORE_WORKER_INFO_PORT)? {
            let (info_listener, _) = bind("worker info", &bind_host, info_port).await?;
            tasks.push(spawn_accept_loop(info_listener, self.shutdown_rx.clone()));
        }

        let id = self.workers.len();
        let online = Arc::new(AtomicBool::new(false));
        tasks.push(spawn_registration(
            id,
            quorum_endpoint,
            Arc::clone(&self.state),
            Arc::clone(&online),
            min_workers,
            self.shutdown_rx.clone(),
        ));

        info!(id, %addr, "[tablestore] worker starting");

        self.workers.push(Worker {
            id,
            addr,
            online,
            tasks,
        });
        Ok(())
    }

    fn info_port(&self, key: &str) -> Result<Option<u16>, TableStoreError> {
        match self.config.get(key) {
            Some(value) if value == keys::INFO_PORT_DISABLED => Ok(None),
            Some(value) => value
                .parse::<u16>()
                .map(Some)
                .map_err(|_| {
                    TableStoreError::Config(ConfigError::InvalidPort {
                        key: key.to_string(),
                        value,
                    })
                }),
            // The console defaults on; suppress it explicitly before
            // starting processes.
            None => Ok(Some(0)),
        }
    }

    /// Worker by index.
    pub fn worker(&self, index: usize) -> Option<&Worker> {
        self.workers.get(index)
    }

    /// The coordinator, if started.
    pub fn coordinator(&self) -> Option<&Coordinator> {
        self.coordinator.as_ref()
    }

    /// Number of workers that completed registration.
    pub fn registered_workers(&self) -> usize {
        self.state.registered_workers()
    }

    /// Administrative handle.
    pub fn admin(&self) -> TableStoreAdmin {
        TableStoreAdmin::new(Arc::clone(&self.state))
    }

    /// Data-path handle.
    pub fn client(&self) -> TableStoreClient {
        TableStoreClient::new(Arc::clone(&self.state))
    }

    /// Signal every process to stop and mark the store offline.
    pub async fn shutdown(&mut self) {
        let _ = self.shutdown_tx.send(true);
        self.state.set_catalog_online(false);
        for worker in &self.workers {
            worker.online.store(false, Ordering::SeqCst);
        }
        info!("[tablestore] shutdown signalled");
    }

    /// Block until every coordinator and worker task has finished.
    pub async fn await_shutdown(&mut self) {
        let coordinator_tasks = self
            .coordinator
            .take()
            .map(|c| c.tasks)
            .unwrap_or_default();
        let worker_tasks = self
            .workers
            .drain(..)
            .flat_map(|w| w.tasks)
            .collect::<Vec<_>>();
        for task in coordinator_tasks.into_iter().chain(worker_tasks) {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "[tablestore] task ended abnormally");
                }
            }
        }
        info!("[tablestore] fully stopped");
    }
}

async fn bind(
    role: &'static str,
    host: &str,
    port: u16,
) -> Result<(TcpListener, SocketAddr), TableStoreError> {
    let requested = format!("{host}:{port}");
    let listener = TcpListener::bind(requested.as_str())
        .await
        .map_err(|source| TableStoreError::Bind {
            role,
            addr: requested,
            source,
        })?;
    let addr = listener.local_addr()?;
    Ok((listener, addr))
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

/// Background registration: reach the coordination service, register with
/// the coordinator, then flip the online flag.
fn spawn_registration(
    worker_id: usize,
    quorum_endpoint: String,
    state: Arc<StoreState>,
    online: Arc<AtomicBool>,
    min_workers: usize,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if *shutdown.borrow() {
                return;
            }
            match TcpStream::connect(quorum_endpoint.as_str()).await {
                Ok(stream) => {
                    drop(stream);
                    state.register_worker(worker_id, min_workers);
                    online.store(true, Ordering::SeqCst);
                    info!(worker_id, "[tablestore] worker online");
                    return;
                }
                Err(_) => {
                    tokio::select! {
                        _ = shutdown.changed() => return,
                        _ = tokio::time::sleep(REGISTER_RETRY_DELAY) => {}
                    }
                }
            }
        }
    })
}
