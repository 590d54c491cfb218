//! Administrative and data-path handles onto a running table store.

use std::sync::Arc;

use crate::error::TableStoreError;
use crate::state::StoreState;
use crate::table::{Row, TableDescriptor};

/// Administrative handle: table DDL against the coordinator's registry.
///
/// Registry operations do not require the catalog region to be online,
/// matching stores where DDL goes through the coordinator directly.
#[derive(Clone)]
pub struct TableStoreAdmin {
    state: Arc<StoreState>,
}

impl TableStoreAdmin {
    pub(crate) fn new(state: Arc<StoreState>) -> Self {
        Self { state }
    }

    /// Whether a table with this name exists.
    pub fn table_exists(&self, name: &str) -> bool {
        self.state.table_exists(name)
    }

    /// Create a table. Fails with [`TableStoreError::TableExists`] when the
    /// name is taken; idempotent callers treat that as success.
    pub fn create_table(&self, descriptor: TableDescriptor) -> Result<(), TableStoreError> {
        self.state.create_table(descriptor)
    }

    /// Names of all tables, including the internal catalog.
    pub fn list_tables(&self) -> Vec<String> {
        self.state.list_tables()
    }

    /// Column families of an existing table.
    pub fn table_families(&self, name: &str) -> Result<Vec<String>, TableStoreError> {
        self.state.table_families(name)
    }
}

/// Data-path handle: row operations served by online workers.
#[derive(Clone)]
pub struct TableStoreClient {
    state: Arc<StoreState>,
}

impl TableStoreClient {
    pub(crate) fn new(state: Arc<StoreState>) -> Self {
        Self { state }
    }

    /// Write one cell.
    pub fn put(
        &self,
        table: &str,
        row: &str,
        column: &str,
        value: &str,
    ) -> Result<(), TableStoreError> {
        self.state.put(table, row, column, value)
    }

    /// Read one cell.
    pub fn get(
        &self,
        table: &str,
        row: &str,
        column: &str,
    ) -> Result<Option<String>, TableStoreError> {
        self.state.get(table, row, column)
    }

    /// Delete a whole row.
    pub fn delete_row(&self, table: &str, row: &str) -> Result<(), TableStoreError> {
        self.state.delete_row(table, row)
    }

    /// Full forward scan of a table.
    pub fn scan(&self, table: &str) -> Result<Vec<Row>, TableStoreError> {
        self.state.scan(table)
    }
}
