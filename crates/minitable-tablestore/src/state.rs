//! Shared store state: the table registry and region/worker bookkeeping.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::RwLock;
use tracing::info;

use crate::error::TableStoreError;
use crate::table::{Table, TableDescriptor};
use crate::{CATALOG_FAMILY, CATALOG_TABLE};

/// State shared between the coordinator, workers, and client handles.
#[derive(Debug, Default)]
pub(crate) struct StoreState {
    tables: RwLock<BTreeMap<String, Table>>,
    /// True once enough workers registered for the catalog region to be
    /// assigned. Data operations are refused while this is false.
    catalog_online: AtomicBool,
    registered_workers: AtomicUsize,
}

impl StoreState {
    /// Install the internal catalog table. Called once at coordinator start.
    pub(crate) fn install_catalog(&self) {
        let descriptor = TableDescriptor::new(CATALOG_TABLE).with_family(CATALOG_FAMILY);
        self.tables
            .write()
            .insert(CATALOG_TABLE.to_string(), Table::new(descriptor));
    }

    /// Record a worker registration; assigns the catalog region once
    /// `min_workers` registrations have arrived.
    pub(crate) fn register_worker(&self, worker_id: usize, min_workers: usize) {
        let registered = self.registered_workers.fetch_add(1, Ordering::SeqCst) + 1;
        info!(worker_id, registered, "[tablestore] worker registered");
        if registered >= min_workers {
            self.set_catalog_online(true);
        }
    }

    pub(crate) fn set_catalog_online(&self, online: bool) {
        let was = self.catalog_online.swap(online, Ordering::SeqCst);
        if online && !was {
            info!("[tablestore] catalog region online");
        }
    }

    pub(crate) fn catalog_online(&self) -> bool {
        self.catalog_online.load(Ordering::SeqCst)
    }

    pub(crate) fn registered_workers(&self) -> usize {
        self.registered_workers.load(Ordering::SeqCst)
    }

    /// Whether a table exists in the registry. Registry-level, usable
    /// before the catalog region is online.
    pub(crate) fn table_exists(&self, name: &str) -> bool {
        self.tables.read().contains_key(name)
    }

    /// Create a table and record its region in the catalog.
    pub(crate) fn create_table(&self, descriptor: TableDescriptor) -> Result<(), TableStoreError> {
        let mut tables = self.tables.write();
        if tables.contains_key(descriptor.name()) {
            return Err(TableStoreError::TableExists {
                name: descriptor.name().to_string(),
            });
        }
        let name = descriptor.name().to_string();
        tables.insert(name.clone(), Table::new(descriptor));
        if let Some(catalog) = tables.get_mut(CATALOG_TABLE) {
            catalog.put(&name, &format!("{CATALOG_FAMILY}:state"), "open")?;
        }
        Ok(())
    }

    pub(crate) fn list_tables(&self) -> Vec<String> {
        self.tables.read().keys().cloned().collect()
    }

    fn check_serving(&self, table: &str) -> Result<(), TableStoreError> {
        if !self.catalog_online() {
            return Err(TableStoreError::RegionOffline {
                table: table.to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn put(
        &self,
        table: &str,
        row: &str,
        column: &str,
        value: &str,
    ) -> Result<(), TableStoreError> {
        self.check_serving(table)?;
        let mut tables = self.tables.write();
        let t = tables
            .get_mut(table)
            .ok_or_else(|| TableStoreError::TableNotFound {
                name: table.to_string(),
            })?;
        t.put(row, column, value)
    }

    pub(crate) fn get(
        &self,
        table: &str,
        row: &str,
        column: &str,
    ) -> Result<Option<String>, TableStoreError> {
        self.check_serving(table)?;
        let tables = self.tables.read();
        let t = tables
            .get(table)
            .ok_or_else(|| TableStoreError::TableNotFound {
                name: table.to_string(),
            })?;
        t.get(row, column)
    }

    pub(crate) fn delete_row(&self, table: &str, row: &str) -> Result<(), TableStoreError> {
        self.check_serving(table)?;
        let mut tables = self.tables.write();
        let t = tables
            .get_mut(table)
            .ok_or_else(|| TableStoreError::TableNotFound {
                name: table.to_string(),
            })?;
        t.delete_row(row);
        Ok(())
    }

    pub(crate) fn scan(&self, table: &str) -> Result<Vec<crate::table::Row>, TableStoreError> {
        self.check_serving(table)?;
        let tables = self.tables.read();
        let t = tables
            .get(table)
            .ok_or_else(|| TableStoreError::TableNotFound {
                name: table.to_string(),
            })?;
        Ok(t.scan())
    }

    pub(crate) fn table_families(&self, table: &str) -> Result<Vec<String>, TableStoreError> {
        let tables = self.tables.read();
        let t = tables
            .get(table)
            .ok_or_else(|| TableStoreError::TableNotFound {
                name: table.to_string(),
            })?;
        Ok(t.descriptor().families().to_vec())
    }
}
