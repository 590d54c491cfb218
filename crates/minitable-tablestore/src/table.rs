//! Tables, descriptors, and rows.

use std::collections::BTreeMap;

use crate::error::TableStoreError;

/// A scanned row: key plus its cells, keyed by `family:qualifier`.
pub type Row = (String, BTreeMap<String, String>);

/// Describes a table to create: name plus its column families.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    name: String,
    families: Vec<String>,
}

impl TableDescriptor {
    /// Descriptor with no families yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            families: Vec::new(),
        }
    }

    /// Add a column family.
    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.families.push(family.into());
        self
    }

    /// Table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column families, in declaration order.
    pub fn families(&self) -> &[String] {
        &self.families
    }
}

/// A table's descriptor and row data. Rows are kept sorted by key so scans
/// are forward scans.
#[derive(Debug)]
pub(crate) struct Table {
    descriptor: TableDescriptor,
    rows: BTreeMap<String, BTreeMap<String, String>>,
}

impl Table {
    pub(crate) fn new(descriptor: TableDescriptor) -> Self {
        Self {
            descriptor,
            rows: BTreeMap::new(),
        }
    }

    pub(crate) fn descriptor(&self) -> &TableDescriptor {
        &self.descriptor
    }

    fn check_column(&self, column: &str) -> Result<(), TableStoreError> {
        let family = column
            .split_once(':')
            .map(|(family, _)| family)
            .ok_or_else(|| TableStoreError::InvalidColumn {
                column: column.to_string(),
            })?;
        if !self.descriptor.families.iter().any(|f| f == family) {
            return Err(TableStoreError::UnknownColumnFamily {
                table: self.descriptor.name.clone(),
                family: family.to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn put(
        &mut self,
        row: &str,
        column: &str,
        value: impl Into<String>,
    ) -> Result<(), TableStoreError> {
        self.check_column(column)?;
        self.rows
            .entry(row.to_string())
            .or_default()
            .insert(column.to_string(), value.into());
        Ok(())
    }

    pub(crate) fn get(&self, row: &str, column: &str) -> Result<Option<String>, TableStoreError> {
        self.check_column(column)?;
        Ok(self
            .rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .cloned())
    }

    pub(crate) fn delete_row(&mut self, row: &str) {
        self.rows.remove(row);
    }

    pub(crate) fn scan(&self) -> Vec<Row> {
        self.rows
            .iter()
            .map(|(key, cells)| (key.clone(), cells.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::new(
            TableDescriptor::new("t")
                .with_family("meta")
                .with_family("schema"),
        )
    }

    #[test]
    fn test_put_get_roundtrip() {
        let mut t = table();
        t.put("row1", "meta:name", "row one").unwrap();
        assert_eq!(t.get("row1", "meta:name").unwrap().as_deref(), Some("row one"));
        assert_eq!(t.get("row1", "meta:other").unwrap(), None);
    }

    #[test]
    fn test_unknown_family_rejected() {
        let mut t = table();
        let err = t.put("row1", "nope:q", "v").unwrap_err();
        assert!(matches!(err, TableStoreError::UnknownColumnFamily { .. }));
    }

    #[test]
    fn test_bare_column_rejected() {
        let t = table();
        let err = t.get("row1", "meta").unwrap_err();
        assert!(matches!(err, TableStoreError::InvalidColumn { .. }));
    }

    #[test]
    fn test_scan_is_forward_ordered() {
        let mut t = table();
        t.put("b", "meta:v", "2").unwrap();
        t.put("a", "meta:v", "1").unwrap();
        t.put("c", "meta:v", "3").unwrap();
        let keys: Vec<_> = t.scan().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }
}
