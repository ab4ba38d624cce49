use std::path::{Path, PathBuf};

/// Lazy, restartable sequence of directories from a start directory up to a
/// stop boundary or the filesystem root.
///
/// The start directory is always yielded first. After yielding a directory
/// the sequence ends if that directory equals the stop boundary, equals the
/// root, or has no distinct parent. A stop boundary that is not an ancestor
/// of the start is never matched, so the walk then runs to the root.
///
/// Cloning forks the walk at its current position; build a new one from the
/// same inputs to replay it from the start.
#[derive(Debug, Clone)]
pub struct Ancestors {
    next: Option<PathBuf>,
    stop_at: PathBuf,
    root: PathBuf,
}

impl Ancestors {
    /// Create a walk from `start` that ends at `stop_at` or `root`.
    #[must_use]
    pub fn new(
        start: impl Into<PathBuf>,
        stop_at: impl Into<PathBuf>,
        root: impl Into<PathBuf>,
    ) -> Self {
        let start = start.into();
        Self {
            next: (!start.as_os_str().is_empty()).then_some(start),
            stop_at: stop_at.into(),
            root: root.into(),
        }
    }

    /// The directory at which the walk halts.
    #[must_use]
    pub fn stop_at(&self) -> &Path {
        &self.stop_at
    }

    /// The filesystem root of the start directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Iterator for Ancestors {
    type Item = PathBuf;

    fn next(&mut self) -> Option<Self::Item> {
        let dir = self.next.take()?;
        if dir != self.stop_at && dir != self.root {
            self.next = dir
                .parent()
                .filter(|parent| *parent != dir && !parent.as_os_str().is_empty())
                .map(Path::to_path_buf);
        }
        Some(dir)
    }
}

impl std::iter::FusedIterator for Ancestors {}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(start: &str, stop_at: &str) -> Vec<PathBuf> {
        Ancestors::new(start, stop_at, "/").collect()
    }

    #[test]
    fn test_walks_to_root() {
        assert_eq!(
            collect("/a/b/c", "/"),
            vec![
                PathBuf::from("/a/b/c"),
                PathBuf::from("/a/b"),
                PathBuf::from("/a"),
                PathBuf::from("/"),
            ]
        );
    }

    #[test]
    fn test_stop_boundary_is_inclusive() {
        assert_eq!(
            collect("/a/b/c", "/a/b"),
            vec![PathBuf::from("/a/b/c"), PathBuf::from("/a/b")]
        );
    }

    #[test]
    fn test_start_equal_to_stop_yields_once() {
        assert_eq!(collect("/a/b", "/a/b"), vec![PathBuf::from("/a/b")]);
    }

    #[test]
    fn test_unrelated_stop_runs_to_root() {
        assert_eq!(collect("/a/b", "/x/y").last(), Some(&PathBuf::from("/")));
        assert_eq!(collect("/a/b", "/x/y").len(), 3);
    }

    #[test]
    fn test_root_start_yields_root_only() {
        assert_eq!(collect("/", "/"), vec![PathBuf::from("/")]);
    }

    #[test]
    fn test_empty_start_yields_nothing() {
        assert!(collect("", "/").is_empty());
    }

    #[test]
    fn test_relative_start_stops_at_fixed_point() {
        let dirs: Vec<PathBuf> = Ancestors::new("a/b", "/", "").collect();
        assert_eq!(dirs, vec![PathBuf::from("a/b"), PathBuf::from("a")]);
    }
}
