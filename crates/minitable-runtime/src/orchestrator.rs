//! The cluster orchestrator facade.
//!
//! [`MiniCluster`] is a two-state machine, **Down** and **Up**, with two
//! transitions:
//!
//! - [`startup`](MiniCluster::startup): resolve state locations, apply the
//!   bind policy, then launch filesystem, coordination service, and table
//!   store strictly in that order, each behind a readiness gate; bootstrap
//!   the management table; build the dataset repository handle. Any
//!   failure tears down the services that did start, in reverse order, and
//!   leaves the facade Down.
//! - [`shutdown`](MiniCluster::shutdown): release everything in reverse
//!   dependency order, blocking until the table store has fully stopped.
//!
//! Calling a transition from the wrong state fails fast. Both transitions
//! take `&mut self`, so a second in-flight transition on the same facade
//! is unrepresentable.

use std::path::PathBuf;
use std::sync::Arc;

use minitable_config::{keys, ClusterConfig};
use minitable_dfs::{DfsClient, DfsCluster};
use minitable_quorum::QuorumServer;
use minitable_tablestore::{TableStoreAdmin, TableStoreClient, TableStoreCluster};
use tracing::{error, info};
use uuid::Uuid;

use crate::bootstrap;
use crate::datasets::DatasetRepository;
use crate::error::ClusterError;
use crate::launcher;
use crate::network::{BindPolicy, ConfigHostnameResolver};
use crate::readiness::ReadinessConfig;
use crate::state::StateLayout;

/// Constructor-level configuration for [`MiniCluster`].
#[derive(Debug, Clone)]
pub struct ClusterOptions {
    /// Base directory for all persisted state.
    pub base_dir: PathBuf,
    /// Coordination service client port; 0 selects an ephemeral port.
    pub quorum_client_port: u16,
    /// Delete all prior state before starting.
    pub clean: bool,
    /// Readiness poll cadence and startup deadline.
    pub readiness: ReadinessConfig,
    /// Bind policy override; `None` reads the environment.
    pub bind_policy: Option<BindPolicy>,
}

impl ClusterOptions {
    /// Options with defaults: ephemeral quorum port, keep prior state,
    /// default readiness budget, bind policy from the environment.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            quorum_client_port: 0,
            clean: false,
            readiness: ReadinessConfig::default(),
            bind_policy: None,
        }
    }

    /// Use a fixed coordination service client port.
    pub fn with_quorum_client_port(mut self, port: u16) -> Self {
        self.quorum_client_port = port;
        self
    }

    /// Wipe prior state before starting.
    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    /// Override the readiness budget.
    pub fn with_readiness(mut self, readiness: ReadinessConfig) -> Self {
        self.readiness = readiness;
        self
    }

    /// Pin the bind policy instead of reading the environment.
    pub fn with_bind_policy(mut self, policy: BindPolicy) -> Self {
        self.bind_policy = Some(policy);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Down,
    Up,
}

/// An in-process cluster of filesystem, coordination service, and table
/// store, with datasets bootstrapped for the application layer.
pub struct MiniCluster {
    options: ClusterOptions,
    lifecycle: Lifecycle,
    instance_id: Option<Uuid>,
    config: Option<Arc<ClusterConfig>>,
    dfs: Option<DfsCluster>,
    quorum: Option<QuorumServer>,
    tablestore: Option<TableStoreCluster>,
    repository: Option<DatasetRepository>,
}

impl MiniCluster {
    /// A new facade in the Down state. Nothing runs until
    /// [`startup`](MiniCluster::startup).
    pub fn new(options: ClusterOptions) -> Self {
        Self {
            options,
            lifecycle: Lifecycle::Down,
            instance_id: None,
            config: None,
            dfs: None,
            quorum: None,
            tablestore: None,
            repository: None,
        }
    }

    /// Bring the cluster up: Down -> Up.
    pub async fn startup(&mut self) -> Result<(), ClusterError> {
        if self.lifecycle == Lifecycle::Up {
            return Err(ClusterError::AlreadyUp);
        }

        let instance_id = Uuid::new_v4();
        info!(
            %instance_id,
            base = %self.options.base_dir.display(),
            clean = self.options.clean,
            "[runtime] cluster starting"
        );

        match self.run_startup().await {
            Ok(()) => {
                self.lifecycle = Lifecycle::Up;
                self.instance_id = Some(instance_id);
                info!(%instance_id, "[runtime] cluster up");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "[runtime] startup failed, rolling back started services");
                self.rollback().await;
                Err(e)
            }
        }
    }

    async fn run_startup(&mut self) -> Result<(), ClusterError> {
        let layout = StateLayout::resolve(&self.options.base_dir, self.options.clean);

        // One fresh configuration per cluster lifetime.
        let config = Arc::new(ClusterConfig::new());
        let policy = self
            .options
            .bind_policy
            .clone()
            .unwrap_or_else(BindPolicy::from_env);
        policy.apply(&config);
        let resolver = ConfigHostnameResolver::new(Arc::clone(&config));
        self.config = Some(Arc::clone(&config));

        let dfs = launcher::dfs::start(&config, &layout, &resolver, &self.options.readiness).await?;
        let dfs_client = dfs.client();
        self.dfs = Some(dfs);

        let (quorum, _client_port) =
            launcher::quorum::start(&config, &layout, self.options.quorum_client_port).await?;
        self.quorum = Some(quorum);

        let tablestore =
            launcher::tablestore::start(&config, &dfs_client, &self.options.readiness).await?;
        let admin = tablestore.admin();
        let client = tablestore.client();
        self.tablestore = Some(tablestore);

        bootstrap::ensure_management_table(&admin)?;
        self.repository = Some(DatasetRepository::new(admin, client));

        Ok(())
    }

    /// Tear down whatever started, reverse order, best effort. The facade
    /// stays Down.
    async fn rollback(&mut self) {
        if let Some(mut tablestore) = self.tablestore.take() {
            tablestore.shutdown().await;
            tablestore.await_shutdown().await;
        }
        if let Some(mut quorum) = self.quorum.take() {
            quorum.shutdown().await;
        }
        if let Some(mut dfs) = self.dfs.take() {
            dfs.shutdown().await;
        }
        self.repository = None;
        self.config = None;
        self.instance_id = None;
    }

    /// Bring the cluster down: Up -> Down.
    ///
    /// Order: lift the worker-wait requirement so a future restart is not
    /// held waiting for workers that no longer exist, stop the table store
    /// and block until fully stopped, stop the coordination service, stop
    /// the filesystem, release the repository handle.
    pub async fn shutdown(&mut self) -> Result<(), ClusterError> {
        if self.lifecycle == Lifecycle::Down {
            return Err(ClusterError::AlreadyDown);
        }

        info!("[runtime] cluster shutting down");

        if let Some(config) = &self.config {
            config.remove(keys::TABLESTORE_MIN_WORKERS_TO_START);
            config.remove(keys::TABLESTORE_MAX_WORKERS_TO_START);
        }

        if let Some(mut tablestore) = self.tablestore.take() {
            tablestore.shutdown().await;
            tablestore.await_shutdown().await;
        }
        if let Some(mut quorum) = self.quorum.take() {
            quorum.shutdown().await;
        }
        if let Some(mut dfs) = self.dfs.take() {
            dfs.shutdown().await;
        }

        self.repository = None;
        self.config = None;
        self.instance_id = None;
        self.lifecycle = Lifecycle::Down;

        info!("[runtime] cluster down");
        Ok(())
    }

    /// Whether the cluster is Up.
    pub fn is_up(&self) -> bool {
        self.lifecycle == Lifecycle::Up
    }

    /// Instance id of the current incarnation, while Up.
    pub fn instance_id(&self) -> Option<Uuid> {
        self.instance_id
    }

    /// The shared configuration, while Up.
    pub fn config(&self) -> Option<Arc<ClusterConfig>> {
        self.config.clone()
    }

    /// Dataset repository for the application layer, while Up.
    pub fn repository(&self) -> Option<&DatasetRepository> {
        self.repository.as_ref()
    }

    /// Filesystem client handle, while Up.
    pub fn dfs_client(&self) -> Option<DfsClient> {
        self.dfs.as_ref().map(DfsCluster::client)
    }

    /// Table store admin handle, while Up.
    pub fn table_admin(&self) -> Option<TableStoreAdmin> {
        self.tablestore.as_ref().map(TableStoreCluster::admin)
    }

    /// Table store data-path handle, while Up.
    pub fn table_client(&self) -> Option<TableStoreClient> {
        self.tablestore.as_ref().map(TableStoreCluster::client)
    }
}
