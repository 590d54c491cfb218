//! Well-known configuration keys shared by the services and the runtime.
//!
//! Every address-valued key holds a `host:port` string; port `0` means an
//! ephemeral port chosen by the OS at bind time. Resolved addresses are
//! written back under the same key once the service is up.

/// Metadata-node RPC address of the distributed filesystem.
pub const DFS_METADATA_RPC_ADDRESS: &str = "dfs.metadata.rpc-address";

/// Metadata-node HTTP address of the distributed filesystem.
pub const DFS_METADATA_HTTP_ADDRESS: &str = "dfs.metadata.http-address";

/// Data-node transfer address.
pub const DFS_DATANODE_ADDRESS: &str = "dfs.datanode.address";

/// Data-node HTTP address.
pub const DFS_DATANODE_HTTP_ADDRESS: &str = "dfs.datanode.http-address";

/// Data-node IPC address.
pub const DFS_DATANODE_IPC_ADDRESS: &str = "dfs.datanode.ipc-address";

/// Hostname a data node advertises when registering with the metadata node.
pub const DFS_DATANODE_HOSTNAME: &str = "dfs.datanode.hostname";

/// Whether the metadata node reverse-resolves the hostname of a joining
/// data node. Restricted network environments cannot satisfy this check.
pub const DFS_REVERSE_DNS_CHECK: &str = "dfs.metadata.reverse-dns-check";

/// Local directory holding the filesystem's persisted state.
pub const DFS_STATE_DIR: &str = "dfs.state.dir";

/// URI of the running filesystem, e.g. `dfs://127.0.0.1:18020`.
pub const DFS_DEFAULT_URI: &str = "dfs.default.uri";

/// Client port of the coordination service. Written by the coordination
/// launcher once the port is resolved; read by table-store workers.
pub const QUORUM_CLIENT_PORT: &str = "quorum.client-port";

/// Bind address of the coordination service.
pub const QUORUM_BIND_ADDRESS: &str = "quorum.bind-address";

/// Root directory of the table store inside the distributed filesystem.
pub const TABLESTORE_ROOT_DIR: &str = "tablestore.root.dir";

/// Table-store coordinator IPC port.
pub const TABLESTORE_COORDINATOR_PORT: &str = "tablestore.coordinator.port";

/// Table-store worker IPC port.
pub const TABLESTORE_WORKER_PORT: &str = "tablestore.worker.port";

/// Table-store coordinator IPC bind address.
pub const TABLESTORE_COORDINATOR_BIND_ADDRESS: &str = "tablestore.coordinator.bind-address";

/// Table-store worker IPC bind address.
pub const TABLESTORE_WORKER_BIND_ADDRESS: &str = "tablestore.worker.bind-address";

/// Embedded web-console port of the coordinator. Set to
/// [`INFO_PORT_DISABLED`] to suppress the console entirely.
pub const TABLESTORE_COORDINATOR_INFO_PORT: &str = "tablestore.coordinator.info-port";

/// Embedded web-console port of the worker.
pub const TABLESTORE_WORKER_INFO_PORT: &str = "tablestore.worker.info-port";

/// Minimum number of workers that must register before the coordinator
/// brings the catalog online. Unset means no requirement.
pub const TABLESTORE_MIN_WORKERS_TO_START: &str = "tablestore.workers.min-to-start";

/// Maximum number of workers the coordinator waits for at startup.
/// Unset means no requirement.
pub const TABLESTORE_MAX_WORKERS_TO_START: &str = "tablestore.workers.max-to-start";

/// Process-wide hostname override consumed by the hostname resolver.
pub const NET_HOSTNAME_OVERRIDE: &str = "net.hostname-override";

/// Sentinel value disabling an embedded web console.
pub const INFO_PORT_DISABLED: &str = "disabled";
