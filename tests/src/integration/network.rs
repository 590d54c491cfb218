//! # Network Policy Integration Tests
//!
//! Restricted-network overlays and readiness gates. Full cluster launches
//! cannot bind a non-loopback address inside the test environment, so the
//! overlay is exercised at the configuration level - exactly the surface
//! generic configuration code writes through.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use minitable_config::{keys, ClusterConfig};
    use minitable_runtime::{readiness, BindPolicy, ClusterError, ReadinessConfig};
    use minitable_tablestore::{TableStoreCluster, TableStoreError, Worker, CATALOG_TABLE};
    use tokio::net::TcpListener;

    #[test]
    fn test_overlay_survives_spurious_generic_writes() {
        let config = ClusterConfig::new();
        BindPolicy::from_override(Some("10.0.0.5".to_string())).apply(&config);

        // A service coming up tries to force its defaults back.
        config.set(keys::DFS_METADATA_RPC_ADDRESS, "127.0.0.1:18020");
        config.set(keys::DFS_METADATA_HTTP_ADDRESS, "0.0.0.0:15070");

        assert_eq!(
            config.get(keys::DFS_METADATA_RPC_ADDRESS).as_deref(),
            Some("10.0.0.5:18020")
        );
        assert_eq!(
            config.get(keys::DFS_METADATA_HTTP_ADDRESS).as_deref(),
            Some("10.0.0.5:15070")
        );
    }

    #[test]
    fn test_overlay_reaches_every_service() {
        let config = ClusterConfig::new();
        BindPolicy::from_override(Some("10.0.0.5".to_string())).apply(&config);

        for key in [
            keys::DFS_DATANODE_ADDRESS,
            keys::DFS_DATANODE_HTTP_ADDRESS,
            keys::DFS_DATANODE_IPC_ADDRESS,
        ] {
            assert!(config.get(key).unwrap().starts_with("10.0.0.5:"));
        }
        for key in [
            keys::QUORUM_BIND_ADDRESS,
            keys::TABLESTORE_COORDINATOR_BIND_ADDRESS,
            keys::TABLESTORE_WORKER_BIND_ADDRESS,
            keys::NET_HOSTNAME_OVERRIDE,
        ] {
            assert_eq!(config.get(key).as_deref(), Some("10.0.0.5"));
        }
        assert_eq!(
            config.get(keys::DFS_REVERSE_DNS_CHECK).as_deref(),
            Some("false")
        );
    }

    #[test]
    fn test_default_policy_applies_no_overrides() {
        let config = ClusterConfig::new();
        BindPolicy::from_override(None).apply(&config);
        assert!(config.snapshot().is_empty());
        assert!(!config.is_protected(keys::DFS_METADATA_RPC_ADDRESS));
    }

    /// A worker that can never reach the coordination service must fail
    /// the startup with a readiness timeout - and the catalog must never
    /// have been scannable along the way.
    #[tokio::test]
    async fn test_unreachable_quorum_times_out_readiness() {
        // Reserve a port, then free it: nothing listens there.
        let dead_port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let config = Arc::new(ClusterConfig::new());
        config.set(keys::DFS_DEFAULT_URI, "dfs://127.0.0.1:1");
        config.set(
            keys::TABLESTORE_ROOT_DIR,
            "dfs://127.0.0.1:1/user/minitable/tablestore",
        );
        config.set(keys::TABLESTORE_COORDINATOR_INFO_PORT, keys::INFO_PORT_DISABLED);
        config.set(keys::TABLESTORE_WORKER_INFO_PORT, keys::INFO_PORT_DISABLED);
        config.set(keys::TABLESTORE_MIN_WORKERS_TO_START, "1");
        config.set(keys::QUORUM_CLIENT_PORT, dead_port.to_string());

        let mut cluster = TableStoreCluster::new(config, 0, 0).await.unwrap();
        cluster.start_coordinator().await.unwrap();
        cluster.start_worker().await.unwrap();

        let readiness = ReadinessConfig {
            poll_interval: Duration::from_millis(10),
            startup_timeout: Duration::from_millis(250),
        };
        let err = readiness::wait_until("table store worker online", &readiness, || {
            cluster.worker(0).is_some_and(Worker::is_online)
        })
        .await
        .unwrap_err();
        assert!(matches!(err, ClusterError::ReadinessTimeout { .. }));

        // The readiness gate held: the catalog region never came online,
        // so the stronger liveness scan cannot falsely succeed.
        let err = cluster.client().scan(CATALOG_TABLE).unwrap_err();
        assert!(matches!(err, TableStoreError::RegionOffline { .. }));

        cluster.shutdown().await;
        cluster.await_shutdown().await;
    }
}
