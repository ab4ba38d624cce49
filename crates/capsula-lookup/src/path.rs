//! Lexical path helpers.

use std::path::{Component, Path, PathBuf};

/// Make `path` absolute against the process working directory and normalize
/// it lexically.
///
/// Symlinks are not resolved and the path does not need to exist.
#[must_use]
pub fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        lexical_normalize(path)
    } else {
        let cwd = std::env::current_dir().unwrap_or_default();
        lexical_normalize(&cwd.join(path))
    }
}

/// Lexically normalize a path (resolve `.` and `..` without filesystem access).
///
/// A `..` never climbs above the root: `/..` normalizes to `/`.
#[must_use]
pub fn lexical_normalize(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                if matches!(components.last(), Some(Component::Normal(_))) {
                    components.pop();
                } else if !path.has_root() {
                    components.push(component);
                }
            },
            Component::CurDir => {},
            other => components.push(other),
        }
    }
    components.iter().collect()
}

/// The filesystem root of `path` (`/` on Unix, `C:\` on Windows).
///
/// Returns an empty path for relative input.
#[must_use]
pub fn root_of(path: &Path) -> PathBuf {
    path.components()
        .take_while(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
        .collect()
}
