use std::fs::Metadata;
use std::path::{Path, PathBuf};

use crate::ancestors::Ancestors;
use crate::path::{absolute, lexical_normalize, root_of};

/// What kind of filesystem entry a lookup is searching for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LookupKind {
    /// A regular file (symlinks are followed).
    #[default]
    File,
    /// A directory (symlinks are followed).
    Directory,
}

impl LookupKind {
    /// Whether `metadata` describes an entry of this kind.
    #[must_use]
    pub fn matches(self, metadata: &Metadata) -> bool {
        match self {
            Self::File => metadata.is_file(),
            Self::Directory => metadata.is_dir(),
        }
    }
}

/// Options for [`look_up`](crate::look_up) and
/// [`look_up_sync`](crate::look_up_sync).
///
/// - `cwd`: where to start searching (defaults to the process working directory).
/// - `kind`: whether to look for a file or a directory (defaults to [`LookupKind::File`]).
/// - `stop_at`: directory where the search stops (defaults to the filesystem
///   root of `cwd`). A relative `stop_at` is resolved against `cwd`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupOptions {
    /// Starting directory.
    pub cwd: Option<PathBuf>,
    /// Entry kind to match.
    pub kind: LookupKind,
    /// Stop boundary (inclusive).
    pub stop_at: Option<PathBuf>,
}

impl LookupOptions {
    /// Options with every field defaulted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the starting directory.
    #[must_use]
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Set the entry kind to match.
    #[must_use]
    pub fn with_kind(mut self, kind: LookupKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the stop boundary.
    #[must_use]
    pub fn with_stop_at(mut self, stop_at: impl Into<PathBuf>) -> Self {
        self.stop_at = Some(stop_at.into());
        self
    }

    /// The absolute, normalized starting directory.
    #[must_use]
    pub fn start_dir(&self) -> PathBuf {
        absolute(self.cwd.as_deref().unwrap_or_else(|| Path::new(".")))
    }

    /// The directories these options would probe, nearest first.
    #[must_use]
    pub fn ancestors(&self) -> Ancestors {
        let start = self.start_dir();
        let root = root_of(&start);
        let stop_at = match &self.stop_at {
            Some(stop) => lexical_normalize(&start.join(stop)),
            None => root.clone(),
        };
        Ancestors::new(start, stop_at, root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = LookupOptions::new();
        assert_eq!(options.kind, LookupKind::File);
        assert_eq!(options.start_dir(), std::env::current_dir().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_relative_stop_at_resolves_against_cwd() {
        let walk = LookupOptions::new()
            .with_cwd("/a/b/c")
            .with_stop_at("..")
            .ancestors();
        assert_eq!(walk.stop_at(), Path::new("/a/b"));
        assert_eq!(walk.root(), Path::new("/"));
        assert_eq!(walk.count(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_stop_at_is_kept() {
        let walk = LookupOptions::new()
            .with_cwd("/a/b/c")
            .with_stop_at("/a")
            .ancestors();
        assert_eq!(walk.stop_at(), Path::new("/a"));
    }

    #[test]
    fn test_kind_matches_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        std::fs::write(&file, "x").unwrap();

        let dir_meta = std::fs::metadata(dir.path()).unwrap();
        let file_meta = std::fs::metadata(&file).unwrap();
        assert!(LookupKind::Directory.matches(&dir_meta));
        assert!(!LookupKind::File.matches(&dir_meta));
        assert!(LookupKind::File.matches(&file_meta));
        assert!(!LookupKind::Directory.matches(&file_meta));
    }
}
