//! # Dataset Repository Integration Tests
//!
//! The handle the orchestrator gives the application layer after startup:
//! dataset existence, creation from schema files, and schema updates.

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};

    use minitable_runtime::{BindPolicy, ClusterError, ClusterOptions, DatasetSchema, MiniCluster};

    fn options(base: &Path) -> ClusterOptions {
        ClusterOptions::new(base).with_bind_policy(BindPolicy::Default)
    }

    fn write_schema(dir: &Path, file: &str, json: &str) -> PathBuf {
        let path = dir.join(file);
        std::fs::write(&path, json).unwrap();
        path
    }

    #[tokio::test]
    async fn test_create_or_update_from_schema_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut cluster = MiniCluster::new(options(&dir.path().join("cluster")));
        cluster.startup().await.unwrap();

        let schemas = dir.path().join("schemas");
        std::fs::create_dir_all(&schemas).unwrap();
        let pages = write_schema(
            &schemas,
            "pages.json",
            r#"{"name": "pages", "column_families": ["content", "meta"],
                "fields": [{"name": "url", "type": "string"}]}"#,
        );
        let links = write_schema(&schemas, "links.json", r#"{"name": "links"}"#);

        let mut entries = BTreeMap::new();
        entries.insert("pages".to_string(), pages);
        entries.insert("links".to_string(), links.clone());

        let repo = cluster.repository().unwrap();
        let applied = repo.create_or_update(&entries).unwrap();
        assert_eq!(applied, vec!["links", "pages"]);
        assert!(repo.exists("pages"));
        assert!(repo.exists("links"));
        assert!(!repo.exists("missing"));

        // Each dataset got a backing table with its declared families.
        let admin = cluster.table_admin().unwrap();
        assert_eq!(
            admin.table_families("pages").unwrap(),
            vec!["content", "meta"]
        );
        assert_eq!(admin.table_families("links").unwrap(), vec!["d"]);

        // A second pass updates in place rather than recreating.
        write_schema(
            &schemas,
            "links.json",
            r#"{"name": "links", "fields": [{"name": "target", "type": "string"}]}"#,
        );
        let mut update = BTreeMap::new();
        update.insert("links".to_string(), links);
        repo.create_or_update(&update).unwrap();

        let schema = repo.schema("links").unwrap().unwrap();
        assert_eq!(schema.fields.len(), 1);
        assert_eq!(schema.fields[0].name, "target");

        cluster.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_update_of_unknown_dataset_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut cluster = MiniCluster::new(options(&dir.path().join("cluster")));
        cluster.startup().await.unwrap();

        let schema = DatasetSchema {
            name: "never_created".to_string(),
            column_families: vec!["d".to_string()],
            fields: Vec::new(),
        };
        let err = cluster.repository().unwrap().update(&schema).unwrap_err();
        assert!(matches!(err, ClusterError::DatasetNotFound { .. }));

        cluster.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_datasets_survive_restart_without_reformat() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("cluster");

        let schema = DatasetSchema {
            name: "events".to_string(),
            column_families: vec!["d".to_string()],
            fields: Vec::new(),
        };

        let mut cluster = MiniCluster::new(options(&base));
        cluster.startup().await.unwrap();
        cluster.repository().unwrap().create(&schema).unwrap();
        cluster.shutdown().await.unwrap();

        // The table store's in-memory registry does not persist, but the
        // reused filesystem state must come back without a reformat and
        // the management table must be rebootstrapped cleanly.
        cluster.startup().await.unwrap();
        let repo = cluster.repository().unwrap();
        assert!(!repo.exists("events"));
        repo.create(&schema).unwrap();
        assert!(repo.exists("events"));
        cluster.shutdown().await.unwrap();
    }
}
