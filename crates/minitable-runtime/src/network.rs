//! Network identity policy.
//!
//! Decides, from the hosting environment, which address every service must
//! bind. Restricted-networking hosts only permit binding one specific
//! non-loopback address; that address arrives through the
//! [`BIND_ADDRESS_ENV`] environment variable and is spread across every
//! per-service address key as a configuration overlay. The metadata-node
//! address keys are write-once after the overlay: the filesystem service
//! would otherwise force them back to loopback while it comes up.
//!
//! Without the override, everything defaults to loopback with ephemeral
//! ports.

use std::sync::Arc;

use minitable_config::{keys, ClusterConfig};
use tracing::info;

/// Environment variable supplying the restricted-network bind address.
pub const BIND_ADDRESS_ENV: &str = "MINITABLE_BIND_ADDRESS";

/// Bind address used when no override is present.
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";

/// Fixed ports used in restricted mode, where ephemeral ports cannot be
/// advertised ahead of time.
pub mod ports {
    /// Metadata-node RPC port.
    pub const METADATA_RPC: u16 = 18020;
    /// Metadata-node HTTP port.
    pub const METADATA_HTTP: u16 = 15070;
    /// Data-node transfer port.
    pub const DATA_NODE: u16 = 15010;
    /// Data-node HTTP port.
    pub const DATA_NODE_HTTP: u16 = 15075;
    /// Data-node IPC port.
    pub const DATA_NODE_IPC: u16 = 15020;
    /// Table-store coordinator IPC port.
    pub const COORDINATOR: u16 = 16000;
    /// Table-store worker IPC port.
    pub const WORKER: u16 = 16020;
}

/// The bind policy in force for one cluster lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindPolicy {
    /// No override: loopback defaults, no protected keys.
    Default,
    /// Restricted networking: bind only the given address.
    Restricted { bind_address: String },
}

impl BindPolicy {
    /// Read the policy from the environment.
    pub fn from_env() -> Self {
        Self::from_override(std::env::var(BIND_ADDRESS_ENV).ok())
    }

    /// Build the policy from an explicit override value. Empty counts as
    /// absent.
    pub fn from_override(value: Option<String>) -> Self {
        match value {
            Some(bind_address) if !bind_address.is_empty() => Self::Restricted { bind_address },
            _ => Self::Default,
        }
    }

    /// Whether restricted-networking mode is active.
    pub fn is_restricted(&self) -> bool {
        matches!(self, Self::Restricted { .. })
    }

    /// The address services must bind.
    pub fn bind_address(&self) -> &str {
        match self {
            Self::Default => DEFAULT_BIND_ADDRESS,
            Self::Restricted { bind_address } => bind_address,
        }
    }

    /// Apply the overlay to a freshly built configuration.
    ///
    /// In default mode nothing is written and the services' own defaults
    /// stand. In restricted mode every address-governing key is pinned to
    /// the bind address, the metadata-node keys become write-once, and the
    /// reverse-DNS check for joining data nodes is disabled (restricted
    /// networks cannot reverse-resolve).
    pub fn apply(&self, config: &ClusterConfig) {
        let Self::Restricted { bind_address } = self else {
            return;
        };

        config.set_protected(
            keys::DFS_METADATA_RPC_ADDRESS,
            format!("{bind_address}:{}", ports::METADATA_RPC),
        );
        config.set_protected(
            keys::DFS_METADATA_HTTP_ADDRESS,
            format!("{bind_address}:{}", ports::METADATA_HTTP),
        );

        config.set(
            keys::DFS_DATANODE_ADDRESS,
            format!("{bind_address}:{}", ports::DATA_NODE),
        );
        config.set(
            keys::DFS_DATANODE_HTTP_ADDRESS,
            format!("{bind_address}:{}", ports::DATA_NODE_HTTP),
        );
        config.set(
            keys::DFS_DATANODE_IPC_ADDRESS,
            format!("{bind_address}:{}", ports::DATA_NODE_IPC),
        );
        config.set(keys::DFS_REVERSE_DNS_CHECK, "false");

        config.set(
            keys::TABLESTORE_COORDINATOR_PORT,
            ports::COORDINATOR.to_string(),
        );
        config.set(keys::TABLESTORE_WORKER_PORT, ports::WORKER.to_string());
        config.set(keys::TABLESTORE_COORDINATOR_BIND_ADDRESS, bind_address.clone());
        config.set(keys::TABLESTORE_WORKER_BIND_ADDRESS, bind_address.clone());
        config.set(keys::QUORUM_BIND_ADDRESS, bind_address.clone());

        // The hostname the service layer resolves for itself must agree
        // with the bind address or peers fail to connect back.
        config.set(keys::NET_HOSTNAME_OVERRIDE, bind_address.clone());

        info!(bind_address = %bind_address, "[runtime] restricted networking mode active");
    }
}

/// Hostname resolution capability injected into the service launchers.
///
/// Replaces reaching into a networking utility's internals: the override
/// travels through configuration and this narrow interface instead.
pub trait HostnameResolver: Send + Sync {
    /// Hostname the local services should advertise.
    fn hostname(&self) -> String;
}

/// Resolver honoring the configured hostname override.
pub struct ConfigHostnameResolver {
    config: Arc<ClusterConfig>,
}

impl ConfigHostnameResolver {
    /// Resolver reading [`keys::NET_HOSTNAME_OVERRIDE`] from `config`.
    pub fn new(config: Arc<ClusterConfig>) -> Self {
        Self { config }
    }
}

impl HostnameResolver for ConfigHostnameResolver {
    fn hostname(&self) -> String {
        self.config.get_or(keys::NET_HOSTNAME_OVERRIDE, "localhost")
    }
}

/// Fixed-hostname resolver for tests.
pub struct StaticHostnameResolver(pub String);

impl HostnameResolver for StaticHostnameResolver {
    fn hostname(&self) -> String {
        self.0.clone()
    }
}
