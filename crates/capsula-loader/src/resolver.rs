//! Module specifier resolution.
//!
//! [`FsResolver`] maps a specifier to a module file using the same lookup
//! order for every search path:
//!
//! 1. Path specifiers (absolute, `./x`, `../x`) are joined onto the search
//!    path. Bare specifiers (`pkg`, `pkg/sub`, `@scope/pkg/sub`) are looked
//!    up as `<modules-dir>/<pkg>` in the search path and each of its
//!    ancestors, nearest first. A package directory that does not contain
//!    the requested module is skipped and the walk continues outward.
//! 2. The candidate is accepted as an existing file, then with each
//!    configured extension appended.
//! 3. A directory resolves to its manifest's `component.entrypoint`, then
//!    to `<index-file>` with each extension.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use capsula_lookup::{LookupOptions, absolute};
use tracing::{debug, warn};

use crate::config::LoaderConfig;
use crate::error::ResolveError;
use crate::manifest::PackageManifest;

/// Maps a module specifier to an absolute file path.
#[async_trait]
pub trait ModuleResolver: Send + Sync {
    /// Resolve `specifier`, searching from each of `search_paths` in order.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] if no search path yields a module file.
    async fn resolve(
        &self,
        specifier: &str,
        search_paths: &[PathBuf],
    ) -> Result<PathBuf, ResolveError>;

    /// Resolve a filesystem path directly, with the same file, extension
    /// and directory expansion a path specifier gets. Relative paths are
    /// taken against the process working directory.
    ///
    /// The default forwards the path to [`resolve`](Self::resolve) as an
    /// absolute specifier, so it cannot handle paths that are not UTF-8.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] if the path names no module.
    async fn resolve_path(&self, path: &Path) -> Result<PathBuf, ResolveError> {
        let path = absolute(path);
        match path.to_str() {
            Some(specifier) => self.resolve(specifier, &[]).await,
            None => Err(ResolveError::NotFound {
                specifier: path.display().to_string(),
            }),
        }
    }
}

/// Filesystem-backed resolver.
#[derive(Debug, Clone, Default)]
pub struct FsResolver {
    config: LoaderConfig,
}

impl FsResolver {
    /// Create a resolver with the given configuration.
    #[must_use]
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// The resolver's configuration.
    #[must_use]
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    async fn resolve_in(
        &self,
        specifier: &str,
        search_path: &Path,
    ) -> Result<Option<PathBuf>, ResolveError> {
        if is_path_specifier(specifier) {
            return self
                .resolve_candidate(&absolute(&search_path.join(specifier)))
                .await;
        }

        let (package, subpath) = split_bare(specifier);
        let package_name = Path::new(&self.config.modules_dir).join(package);
        let options = LookupOptions::new().with_cwd(search_path);

        for dir in options.ancestors() {
            let package_dir = dir.join(&package_name);
            if !is_dir(&package_dir).await {
                continue;
            }

            let candidate = match subpath {
                Some(sub) => absolute(&package_dir.join(sub)),
                None => package_dir,
            };
            if let Some(found) = self.resolve_candidate(&candidate).await? {
                return Ok(Some(found));
            }
            debug!(
                specifier,
                candidate = %candidate.display(),
                "Package directory has no such module, trying outer directories"
            );
        }

        Ok(None)
    }

    async fn resolve_candidate(&self, candidate: &Path) -> Result<Option<PathBuf>, ResolveError> {
        if let Some(file) = self.resolve_file(candidate).await {
            return Ok(Some(file));
        }
        self.resolve_directory(candidate).await
    }

    async fn resolve_file(&self, candidate: &Path) -> Option<PathBuf> {
        if is_file(candidate).await {
            return Some(candidate.to_path_buf());
        }
        for ext in &self.config.extensions {
            let with_ext = append_extension(candidate, ext);
            if is_file(&with_ext).await {
                return Some(with_ext);
            }
        }
        None
    }

    async fn resolve_directory(&self, dir: &Path) -> Result<Option<PathBuf>, ResolveError> {
        if !is_dir(dir).await {
            return Ok(None);
        }

        let manifest_path = dir.join(&self.config.manifest_file_name);
        if is_file(&manifest_path).await {
            let manifest = PackageManifest::load(&manifest_path).await?;
            if let Some(entry) = manifest.entrypoint(dir) {
                if let Some(file) = self.resolve_file(&entry).await {
                    return Ok(Some(file));
                }
                warn!(
                    manifest = %manifest_path.display(),
                    entrypoint = %entry.display(),
                    "Manifest entry point does not exist, falling back to index file"
                );
            }
        }

        Ok(self.resolve_file(&dir.join(&self.config.index_file)).await)
    }
}

#[async_trait]
impl ModuleResolver for FsResolver {
    async fn resolve(
        &self,
        specifier: &str,
        search_paths: &[PathBuf],
    ) -> Result<PathBuf, ResolveError> {
        if !specifier.is_empty() {
            let default_root = [PathBuf::from(".")];
            let roots = if search_paths.is_empty() {
                &default_root[..]
            } else {
                search_paths
            };

            for root in roots {
                if let Some(path) = self.resolve_in(specifier, &absolute(root)).await? {
                    debug!(specifier, path = %path.display(), "Resolved module");
                    return Ok(path);
                }
            }
        }

        Err(ResolveError::NotFound {
            specifier: specifier.to_owned(),
        })
    }

    async fn resolve_path(&self, path: &Path) -> Result<PathBuf, ResolveError> {
        let candidate = absolute(path);
        match self.resolve_candidate(&candidate).await? {
            Some(found) => {
                debug!(path = %found.display(), "Resolved module path");
                Ok(found)
            },
            None => Err(ResolveError::NotFound {
                specifier: path.display().to_string(),
            }),
        }
    }
}

fn is_path_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || Path::new(specifier).is_absolute()
}

/// Split a bare specifier into its package name and optional sub path.
/// Scoped names (`@scope/name`) keep both segments in the package name.
fn split_bare(specifier: &str) -> (&str, Option<&str>) {
    let package_end = if specifier.starts_with('@') {
        specifier
            .match_indices('/')
            .nth(1)
            .map(|(i, _)| i)
    } else {
        specifier.find('/')
    };

    match package_end {
        Some(end) => {
            let (package, rest) = specifier.split_at(end);
            let sub = rest.trim_start_matches('/');
            (package, (!sub.is_empty()).then_some(sub))
        },
        None => (specifier, None),
    }
}

fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|metadata| metadata.is_file())
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|metadata| metadata.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, contents: &str) -> PathBuf {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, contents).unwrap();
        path
    }

    const WEATHER_MANIFEST: &str = r#"
        [package]
        name = "weather"
        version = "0.1.0"

        [component]
        entrypoint = "lib/main"
    "#;

    #[test]
    fn test_split_bare() {
        assert_eq!(split_bare("pkg"), ("pkg", None));
        assert_eq!(split_bare("pkg/sub/file"), ("pkg", Some("sub/file")));
        assert_eq!(split_bare("@acme/tools"), ("@acme/tools", None));
        assert_eq!(split_bare("@acme/tools/x"), ("@acme/tools", Some("x")));
        assert_eq!(split_bare("pkg/"), ("pkg", None));
    }

    #[test]
    fn test_path_specifiers() {
        assert!(is_path_specifier("./a"));
        assert!(is_path_specifier("../a"));
        assert!(is_path_specifier("."));
        assert!(is_path_specifier("/abs/a"));
        assert!(!is_path_specifier("a/b"));
        assert!(!is_path_specifier(".hidden"));
    }

    #[tokio::test]
    async fn test_relative_specifier_with_extension_probe() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(dir.path(), "plugins/greeter.toml", "x = 1");
        let resolver = FsResolver::default();

        let resolved = resolver
            .resolve("./plugins/greeter", &[dir.path().to_path_buf()])
            .await
            .unwrap();
        assert_eq!(resolved, file);

        let exact = resolver
            .resolve("./plugins/greeter.toml", &[dir.path().to_path_buf()])
            .await
            .unwrap();
        assert_eq!(exact, file);
    }

    #[tokio::test]
    async fn test_absolute_specifier_ignores_search_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(dir.path(), "mod.json", "{}");
        let resolver = FsResolver::default();

        let resolved = resolver
            .resolve(file.to_str().unwrap(), &[PathBuf::from("/")])
            .await
            .unwrap();
        assert_eq!(resolved, file);
    }

    #[tokio::test]
    async fn test_directory_index() {
        let dir = tempfile::tempdir().unwrap();
        let index = write(dir.path(), "plugins/tools/index.yaml", "a: 1");
        let resolver = FsResolver::default();

        let resolved = resolver
            .resolve("./plugins/tools", &[dir.path().to_path_buf()])
            .await
            .unwrap();
        assert_eq!(resolved, index);
    }

    #[tokio::test]
    async fn test_directory_manifest_entrypoint() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "plugins/weather/Capsule.toml", WEATHER_MANIFEST);
        write(dir.path(), "plugins/weather/index.toml", "ignored = true");
        let main = write(dir.path(), "plugins/weather/lib/main.json", "{}");
        let resolver = FsResolver::default();

        let resolved = resolver
            .resolve("./plugins/weather", &[dir.path().to_path_buf()])
            .await
            .unwrap();
        assert_eq!(resolved, main);
    }

    #[tokio::test]
    async fn test_missing_entrypoint_falls_back_to_index() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "plugins/weather/Capsule.toml", WEATHER_MANIFEST);
        let index = write(dir.path(), "plugins/weather/index.toml", "fallback = true");
        let resolver = FsResolver::default();

        let resolved = resolver
            .resolve("./plugins/weather", &[dir.path().to_path_buf()])
            .await
            .unwrap();
        assert_eq!(resolved, index);
    }

    #[tokio::test]
    async fn test_malformed_manifest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "plugins/broken/Capsule.toml", "not = [valid");
        let resolver = FsResolver::default();

        let err = resolver
            .resolve("./plugins/broken", &[dir.path().to_path_buf()])
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Manifest { .. }));
    }

    #[tokio::test]
    async fn test_bare_specifier_walks_ancestors() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "capsules/weather/Capsule.toml", WEATHER_MANIFEST);
        let main = write(dir.path(), "capsules/weather/lib/main.toml", "x = 1");
        let extra = write(dir.path(), "capsules/weather/extra.yml", "y: 2");
        let deep = dir.path().join("app").join("src");
        std::fs::create_dir_all(&deep).unwrap();
        let resolver = FsResolver::default();

        assert_eq!(resolver.resolve("weather", &[deep.clone()]).await.unwrap(), main);
        assert_eq!(resolver.resolve("weather/extra", &[deep]).await.unwrap(), extra);
    }

    #[tokio::test]
    async fn test_bare_specifier_skips_package_without_module() {
        let dir = tempfile::tempdir().unwrap();
        let outer = write(dir.path(), "capsules/weather/alerts.yaml", "- storm");
        let inner = write(dir.path(), "app/capsules/weather/index.toml", "x = 1");
        let deep = dir.path().join("app").join("src");
        std::fs::create_dir_all(&deep).unwrap();
        let resolver = FsResolver::default();

        // The nearer package wins when it has the module.
        assert_eq!(resolver.resolve("weather", &[deep.clone()]).await.unwrap(), inner);
        // Otherwise the walk moves on to the outer package.
        assert_eq!(
            resolver.resolve("weather/alerts", &[deep.clone()]).await.unwrap(),
            outer
        );
        assert!(resolver.resolve("weather/radar", &[deep]).await.is_err());
    }

    #[tokio::test]
    async fn test_scoped_bare_specifier() {
        let dir = tempfile::tempdir().unwrap();
        let index = write(dir.path(), "capsules/@acme/tools/index.json", "{}");
        let resolver = FsResolver::default();

        let resolved = resolver
            .resolve("@acme/tools", &[dir.path().to_path_buf()])
            .await
            .unwrap();
        assert_eq!(resolved, index);
    }

    #[tokio::test]
    async fn test_custom_modules_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(dir.path(), "vendor/thing.json", "{}");
        let config = LoaderConfig {
            modules_dir: "vendor".into(),
            ..LoaderConfig::default()
        };
        let resolver = FsResolver::new(config);

        let resolved = resolver
            .resolve("thing.json", &[dir.path().to_path_buf()])
            .await;
        // `thing.json` is a package directory name, not a file.
        assert!(resolved.is_err());

        std::fs::create_dir_all(dir.path().join("vendor/pkg")).unwrap();
        std::fs::rename(&file, dir.path().join("vendor/pkg/index.json")).unwrap();
        assert!(
            resolver
                .resolve("pkg", &[dir.path().to_path_buf()])
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_unresolvable_specifiers() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = FsResolver::default();
        let roots = [dir.path().to_path_buf()];

        for specifier in ["./missing", "missing-package", ""] {
            let err = resolver.resolve(specifier, &roots).await.unwrap_err();
            assert!(
                matches!(&err, ResolveError::NotFound { specifier: s } if s == specifier),
                "unexpected error for {specifier:?}: {err}"
            );
        }
    }

    #[tokio::test]
    async fn test_first_search_path_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let a = write(first.path(), "m.toml", "");
        write(second.path(), "m.toml", "");
        let resolver = FsResolver::default();

        let resolved = resolver
            .resolve(
                "./m",
                &[first.path().to_path_buf(), second.path().to_path_buf()],
            )
            .await
            .unwrap();
        assert_eq!(resolved, a);
    }
}
