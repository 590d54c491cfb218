//! Schema bootstrapper.
//!
//! The application layer tracks registered dataset schemas in a
//! fixed-name management table. The bootstrapper creates that table if it
//! does not already exist; creation is idempotent, and a racing concurrent
//! creator is treated as success.

use minitable_tablestore::{TableDescriptor, TableStoreAdmin, TableStoreError};
use tracing::{debug, info};

use crate::error::ClusterError;

/// Name of the management table the application layer relies on.
pub const MANAGEMENT_TABLE: &str = "managed_schemas";

/// Column families of the management table. `_s` is the internal system
/// grouping.
pub const MANAGEMENT_FAMILIES: [&str; 3] = ["meta", "schema", "_s"];

/// Create the management table unless it already exists.
pub fn ensure_management_table(admin: &TableStoreAdmin) -> Result<(), ClusterError> {
    if admin.table_exists(MANAGEMENT_TABLE) {
        debug!(table = MANAGEMENT_TABLE, "[runtime] management table present");
        return Ok(());
    }

    let descriptor = MANAGEMENT_FAMILIES
        .iter()
        .fold(TableDescriptor::new(MANAGEMENT_TABLE), |d, family| {
            d.with_family(*family)
        });

    match admin.create_table(descriptor) {
        Ok(()) => {
            info!(table = MANAGEMENT_TABLE, "[runtime] management table created");
            Ok(())
        }
        // A concurrent creator won the race after our existence check
        // returned absent; the table exists either way.
        Err(TableStoreError::TableExists { .. }) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minitable_config::{keys, ClusterConfig};
    use minitable_tablestore::TableStoreCluster;
    use std::sync::Arc;

    async fn coordinator_only_admin() -> TableStoreAdmin {
        let config = Arc::new(ClusterConfig::new());
        config.set(keys::TABLESTORE_ROOT_DIR, "dfs://127.0.0.1:1/user/minitable/tablestore");
        config.set(keys::DFS_DEFAULT_URI, "dfs://127.0.0.1:1");
        config.set(keys::TABLESTORE_COORDINATOR_INFO_PORT, keys::INFO_PORT_DISABLED);
        let cluster = TableStoreCluster::new(config, 1, 0).await.unwrap();
        cluster.admin()
    }

    #[tokio::test]
    async fn test_creates_with_three_families() {
        let admin = coordinator_only_admin().await;
        ensure_management_table(&admin).unwrap();

        assert!(admin.table_exists(MANAGEMENT_TABLE));
        assert_eq!(
            admin.table_families(MANAGEMENT_TABLE).unwrap(),
            vec!["meta", "schema", "_s"]
        );
    }

    #[tokio::test]
    async fn test_idempotent_across_calls() {
        let admin = coordinator_only_admin().await;
        ensure_management_table(&admin).unwrap();
        ensure_management_table(&admin).unwrap();

        let management_tables = admin
            .list_tables()
            .into_iter()
            .filter(|name| name == MANAGEMENT_TABLE)
            .count();
        assert_eq!(management_tables, 1);
    }

    #[tokio::test]
    async fn test_lost_create_race_counts_as_success() {
        let admin = coordinator_only_admin().await;

        // Another creator slips in between existence check and create.
        let descriptor = MANAGEMENT_FAMILIES
            .iter()
            .fold(TableDescriptor::new(MANAGEMENT_TABLE), |d, family| {
                d.with_family(*family)
            });
        admin.create_table(descriptor).unwrap();

        ensure_management_table(&admin).unwrap();
    }
}
