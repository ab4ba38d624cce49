//! Temporary directory trees for resolution and lookup tests.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory populated with module files.
///
/// The directory is removed when the tree is dropped.
#[derive(Debug)]
pub struct ModuleTree {
    dir: TempDir,
}

impl ModuleTree {
    /// Create an empty tree.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    /// Write `contents` to `rel`, creating parent directories.
    ///
    /// # Panics
    ///
    /// Panics on I/O failure.
    #[must_use]
    pub fn with_file(self, rel: &str, contents: &str) -> Self {
        self.write(rel, contents);
        self
    }

    /// Create the directory `rel` and its parents.
    ///
    /// # Panics
    ///
    /// Panics on I/O failure.
    #[must_use]
    pub fn with_dir(self, rel: &str) -> Self {
        std::fs::create_dir_all(self.join(rel)).expect("failed to create dir");
        self
    }

    /// Write `contents` to `rel`, creating parent directories. Returns the
    /// absolute path of the file.
    ///
    /// # Panics
    ///
    /// Panics on I/O failure.
    pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        std::fs::write(&path, contents).expect("failed to write file");
        path
    }

    /// The tree's root directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// `root/rel`.
    #[must_use]
    pub fn join(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }
}

impl Default for ModuleTree {
    fn default() -> Self {
        Self::new()
    }
}
