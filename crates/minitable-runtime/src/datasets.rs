//! Dataset repository handed to the application layer after startup.
//!
//! A dataset is a named table plus a schema entry in the management
//! table. The repository exposes existence checks, creation from a schema
//! descriptor, schema updates, and a batch create-or-update over schema
//! files on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use minitable_tablestore::{TableDescriptor, TableStoreAdmin, TableStoreClient};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bootstrap::MANAGEMENT_TABLE;
use crate::error::ClusterError;

fn default_families() -> Vec<String> {
    vec!["d".to_string()]
}

/// One field of a dataset schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Field name.
    pub name: String,
    /// Field type, as named by the application layer.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Schema descriptor for one dataset, typically loaded from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSchema {
    /// Dataset name; doubles as the backing table name.
    pub name: String,
    /// Column families of the backing table.
    #[serde(default = "default_families")]
    pub column_families: Vec<String>,
    /// Declared fields.
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

impl DatasetSchema {
    /// Load a schema descriptor from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ClusterError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ClusterError::SchemaFile {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ClusterError::SchemaParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Handle onto the table store for dataset management.
#[derive(Clone)]
pub struct DatasetRepository {
    admin: TableStoreAdmin,
    client: TableStoreClient,
}

impl DatasetRepository {
    pub(crate) fn new(admin: TableStoreAdmin, client: TableStoreClient) -> Self {
        Self { admin, client }
    }

    /// Whether a dataset with this name has been registered.
    pub fn exists(&self, name: &str) -> bool {
        matches!(
            self.client.get(MANAGEMENT_TABLE, name, "meta:name"),
            Ok(Some(_))
        )
    }

    /// Create a dataset: its backing table plus its management entry.
    pub fn create(&self, schema: &DatasetSchema) -> Result<(), ClusterError> {
        let descriptor = schema
            .column_families
            .iter()
            .fold(TableDescriptor::new(&schema.name), |d, family| {
                d.with_family(family.clone())
            });
        self.admin.create_table(descriptor)?;
        self.record_schema(schema)?;
        info!(dataset = %schema.name, "[runtime] dataset created");
        Ok(())
    }

    /// Replace the schema of an existing dataset.
    pub fn update(&self, schema: &DatasetSchema) -> Result<(), ClusterError> {
        if !self.exists(&schema.name) {
            return Err(ClusterError::DatasetNotFound {
                name: schema.name.clone(),
            });
        }
        self.record_schema(schema)?;
        info!(dataset = %schema.name, "[runtime] dataset schema updated");
        Ok(())
    }

    /// The stored schema of a dataset, if registered.
    pub fn schema(&self, name: &str) -> Result<Option<DatasetSchema>, ClusterError> {
        let Some(json) = self.client.get(MANAGEMENT_TABLE, name, "schema:json")? else {
            return Ok(None);
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|source| ClusterError::SchemaDecode {
                name: name.to_string(),
                source,
            })
    }

    /// Create or update each dataset in a name-to-schema-file map.
    /// Returns the dataset names applied, in map order.
    pub fn create_or_update(
        &self,
        entries: &BTreeMap<String, PathBuf>,
    ) -> Result<Vec<String>, ClusterError> {
        let mut applied = Vec::with_capacity(entries.len());
        for (name, path) in entries {
            let mut schema = DatasetSchema::from_file(path)?;
            // The map key names the dataset; the file's own name loses.
            schema.name = name.clone();
            if self.exists(name) {
                self.update(&schema)?;
            } else {
                self.create(&schema)?;
            }
            applied.push(name.clone());
        }
        Ok(applied)
    }

    fn record_schema(&self, schema: &DatasetSchema) -> Result<(), ClusterError> {
        let json =
            serde_json::to_string(schema).map_err(|source| ClusterError::SchemaEncode {
                name: schema.name.clone(),
                source,
            })?;
        self.client
            .put(MANAGEMENT_TABLE, &schema.name, "meta:name", &schema.name)?;
        self.client
            .put(MANAGEMENT_TABLE, &schema.name, "schema:json", &json)?;
        Ok(())
    }
}
