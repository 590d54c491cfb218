//! On-disk state locations for the cluster's persisted services.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

/// Subdirectory holding the filesystem service's persisted state.
pub const DFS_SUBDIR: &str = "dfs";

/// Subdirectory holding the coordination service's persisted state.
pub const QUORUM_SUBDIR: &str = "zk";

/// Resolved state locations plus the format decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateLayout {
    base: PathBuf,
    dfs_dir: PathBuf,
    quorum_dir: PathBuf,
    should_format: bool,
}

impl StateLayout {
    /// Resolve the layout under `base`.
    ///
    /// With `clean` set, the entire base directory is deleted first; the
    /// delete is best-effort and a failure only logs a warning. The
    /// filesystem subdirectory's existence is then the sole signal for
    /// reuse: present as a directory means do not format. The contents are
    /// not validated - a corrupted image is accepted here and fails later,
    /// fatally, when the filesystem service starts.
    pub fn resolve(base: &Path, clean: bool) -> Self {
        if clean && base.exists() {
            info!(base = %base.display(), "[runtime] cleaning cluster state, starting fresh");
            if let Err(e) = std::fs::remove_dir_all(base) {
                warn!(base = %base.display(), error = %e, "[runtime] clean delete failed");
            }
        }

        let dfs_dir = base.join(DFS_SUBDIR);
        let quorum_dir = base.join(QUORUM_SUBDIR);
        let should_format = !dfs_dir.is_dir();

        Self {
            base: base.to_path_buf(),
            dfs_dir,
            quorum_dir,
            should_format,
        }
    }

    /// Base directory of all persisted state.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Filesystem service state directory.
    pub fn dfs_dir(&self) -> &Path {
        &self.dfs_dir
    }

    /// Coordination service state directory.
    pub fn quorum_dir(&self) -> &Path {
        &self.quorum_dir
    }

    /// Whether the filesystem service must format its state directory.
    pub fn should_format(&self) -> bool {
        self.should_format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_base_formats() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("cluster");

        let layout = StateLayout::resolve(&base, false);
        assert!(layout.should_format());
        assert_eq!(layout.dfs_dir(), base.join("dfs"));
        assert_eq!(layout.quorum_dir(), base.join("zk"));
    }

    #[test]
    fn test_existing_dfs_dir_reused() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("cluster");
        std::fs::create_dir_all(base.join("dfs")).unwrap();

        let layout = StateLayout::resolve(&base, false);
        assert!(!layout.should_format());
    }

    #[test]
    fn test_dfs_path_as_file_still_formats() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("cluster");
        std::fs::create_dir_all(&base).unwrap();
        std::fs::write(base.join("dfs"), b"junk").unwrap();

        let layout = StateLayout::resolve(&base, false);
        assert!(layout.should_format());
    }

    #[test]
    fn test_clean_wipes_prior_state() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("cluster");
        std::fs::create_dir_all(base.join("dfs")).unwrap();
        std::fs::write(base.join("dfs").join("junk"), b"old").unwrap();

        let layout = StateLayout::resolve(&base, true);
        assert!(layout.should_format());
        assert!(!base.exists());
    }
}
