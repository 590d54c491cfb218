//! In-memory filesystem namespace.
//!
//! The metadata node owns one [`Namespace`]; every [`DfsClient`] handed out
//! by the cluster shares it. Paths are absolute, `/`-separated, and
//! normalized on entry.
//!
//! [`DfsClient`]: crate::cluster::DfsClient

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::DfsError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Directory,
    File(Vec<u8>),
}

/// Shared namespace of directories and files.
#[derive(Debug, Default)]
pub struct Namespace {
    entries: RwLock<BTreeMap<String, Entry>>,
}

impl Namespace {
    /// Create a namespace containing only the root directory.
    pub fn new() -> Arc<Self> {
        let ns = Self::default();
        ns.entries.write().insert("/".to_string(), Entry::Directory);
        Arc::new(ns)
    }

    fn normalize(path: &str) -> String {
        let mut out = String::from("/");
        for component in path.split('/').filter(|c| !c.is_empty()) {
            if !out.ends_with('/') {
                out.push('/');
            }
            out.push_str(component);
        }
        out
    }

    /// Create a directory and any missing parents.
    pub fn mkdirs(&self, path: &str) -> Result<(), DfsError> {
        let path = Self::normalize(path);
        let mut entries = self.entries.write();
        let mut current = String::from("/");
        for component in path.split('/').filter(|c| !c.is_empty()) {
            if !current.ends_with('/') {
                current.push('/');
            }
            current.push_str(component);
            match entries.get(&current) {
                Some(Entry::File(_)) => {
                    return Err(DfsError::NotADirectory { path: current });
                }
                Some(Entry::Directory) => {}
                None => {
                    entries.insert(current.clone(), Entry::Directory);
                }
            }
        }
        Ok(())
    }

    /// Create or overwrite a file, creating missing parent directories.
    pub fn create_file(&self, path: &str, bytes: &[u8]) -> Result<(), DfsError> {
        let path = Self::normalize(path);
        if let Some(parent) = path.rsplit_once('/').map(|(p, _)| p) {
            if !parent.is_empty() {
                self.mkdirs(parent)?;
            }
        }
        let mut entries = self.entries.write();
        if entries.get(&path) == Some(&Entry::Directory) {
            return Err(DfsError::NotADirectory { path });
        }
        entries.insert(path, Entry::File(bytes.to_vec()));
        Ok(())
    }

    /// Read a file's contents, if it exists.
    pub fn read_file(&self, path: &str) -> Option<Vec<u8>> {
        let path = Self::normalize(path);
        match self.entries.read().get(&path) {
            Some(Entry::File(bytes)) => Some(bytes.clone()),
            _ => None,
        }
    }

    /// Whether a path exists at all.
    pub fn exists(&self, path: &str) -> bool {
        self.entries.read().contains_key(&Self::normalize(path))
    }

    /// Whether a path exists and is a directory.
    pub fn is_dir(&self, path: &str) -> bool {
        self.entries.read().get(&Self::normalize(path)) == Some(&Entry::Directory)
    }
}
