//! # Lifecycle Integration Tests
//!
//! Full startup/shutdown cycles of the in-process cluster:
//!
//! 1. **Dependency order**: filesystem, then coordination service, then
//!    table store, each behind its readiness gate.
//! 2. **State reuse**: a second cycle against the same base directory must
//!    not reformat; a clean start must discard everything.
//! 3. **Rollback**: a failed startup tears down whatever started and
//!    leaves the facade Down.
//! 4. **Misuse**: transitions from the wrong state fail fast.

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::path::Path;

    use minitable_config::keys;
    use minitable_dfs::FORMAT_MARKER;
    use minitable_quorum::EPOCH_FILE;
    use minitable_runtime::{
        bootstrap::MANAGEMENT_TABLE, BindPolicy, ClusterError, ClusterOptions, MiniCluster,
        StateLayout,
    };
    use minitable_tablestore::CATALOG_TABLE;

    /// Options pinned to default (loopback) networking so the suite is
    /// immune to a restricted-network environment variable.
    fn options(base: &Path) -> ClusterOptions {
        ClusterOptions::new(base).with_bind_policy(BindPolicy::Default)
    }

    #[tokio::test]
    async fn test_full_startup_shutdown_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("cluster");
        let mut cluster = MiniCluster::new(options(&base));

        cluster.startup().await.unwrap();
        assert!(cluster.is_up());

        // Ordering invariant: the resolved coordination port is recorded
        // and non-zero.
        let config = cluster.config().unwrap();
        let quorum_port = config.get_port(keys::QUORUM_CLIENT_PORT).unwrap().unwrap();
        assert_ne!(quorum_port, 0);

        // The table store serves metadata lookups end to end.
        let client = cluster.table_client().unwrap();
        client.scan(CATALOG_TABLE).unwrap();

        // Schema bootstrap happened with the fixed column groupings.
        let admin = cluster.table_admin().unwrap();
        assert!(admin.table_exists(MANAGEMENT_TABLE));
        assert_eq!(
            admin.table_families(MANAGEMENT_TABLE).unwrap(),
            vec!["meta", "schema", "_s"]
        );

        cluster.shutdown().await.unwrap();
        assert!(!cluster.is_up());

        // All handles are released; only on-disk state survives.
        assert!(cluster.repository().is_none());
        assert!(cluster.config().is_none());
        assert!(cluster.table_admin().is_none());
        assert!(cluster.dfs_client().is_none());
        assert!(base.join("dfs").is_dir());
        assert!(base.join("zk").is_dir());
    }

    #[tokio::test]
    async fn test_restart_reuses_persisted_state() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("cluster");

        let mut first = MiniCluster::new(options(&base));
        first.startup().await.unwrap();
        first.shutdown().await.unwrap();
        let marker = std::fs::read_to_string(base.join("dfs").join(FORMAT_MARKER)).unwrap();

        // The surviving filesystem directory is the reuse signal.
        let layout = StateLayout::resolve(&base, false);
        assert!(!layout.should_format());

        let mut second = MiniCluster::new(options(&base));
        second.startup().await.unwrap();
        second.shutdown().await.unwrap();

        // No reformat: the original marker survived both cycles, and the
        // coordination service advanced its epoch on the same state.
        assert_eq!(
            std::fs::read_to_string(base.join("dfs").join(FORMAT_MARKER)).unwrap(),
            marker
        );
        assert_eq!(
            std::fs::read_to_string(base.join("zk").join(EPOCH_FILE))
                .unwrap()
                .trim(),
            "2"
        );
    }

    #[tokio::test]
    async fn test_clean_start_discards_prior_state() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("cluster");

        let mut first = MiniCluster::new(options(&base));
        first.startup().await.unwrap();
        first.shutdown().await.unwrap();
        std::fs::write(base.join("junk"), b"left behind").unwrap();

        let mut second = MiniCluster::new(options(&base).with_clean(true));
        second.startup().await.unwrap();

        // Nothing pre-existing survived the delete step.
        assert!(!base.join("junk").exists());
        assert_eq!(
            std::fs::read_to_string(base.join("zk").join(EPOCH_FILE))
                .unwrap()
                .trim(),
            "1"
        );

        second.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_transitions_from_wrong_state_fail_fast() {
        let dir = tempfile::tempdir().unwrap();
        let mut cluster = MiniCluster::new(options(&dir.path().join("cluster")));

        let err = cluster.shutdown().await.unwrap_err();
        assert!(matches!(err, ClusterError::AlreadyDown));

        cluster.startup().await.unwrap();
        let err = cluster.startup().await.unwrap_err();
        assert!(matches!(err, ClusterError::AlreadyUp));

        cluster.shutdown().await.unwrap();
        let err = cluster.shutdown().await.unwrap_err();
        assert!(matches!(err, ClusterError::AlreadyDown));
    }

    #[tokio::test]
    async fn test_failed_startup_rolls_back_to_down() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("cluster");

        // Occupy the requested coordination port so the second launch
        // stage fails after the filesystem service has started.
        let blocker = TcpListener::bind("127.0.0.1:0").unwrap();
        let taken_port = blocker.local_addr().unwrap().port();

        let mut cluster =
            MiniCluster::new(options(&base).with_quorum_client_port(taken_port));
        let err = cluster.startup().await.unwrap_err();
        assert!(matches!(err, ClusterError::Quorum(_)));

        // Rollback left the facade Down with no live handles.
        assert!(!cluster.is_up());
        assert!(cluster.config().is_none());
        assert!(cluster.dfs_client().is_none());

        // Freeing the port lets the same facade come up cleanly.
        drop(blocker);
        cluster.startup().await.unwrap();
        cluster.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_each_incarnation_gets_fresh_handles() {
        let dir = tempfile::tempdir().unwrap();
        let mut cluster = MiniCluster::new(options(&dir.path().join("cluster")));

        cluster.startup().await.unwrap();
        let first_id = cluster.instance_id().unwrap();
        cluster.shutdown().await.unwrap();
        assert!(cluster.instance_id().is_none());

        cluster.startup().await.unwrap();
        let second_id = cluster.instance_id().unwrap();
        assert_ne!(first_id, second_id);
        cluster.shutdown().await.unwrap();
    }
}
