use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use capsula_lookup::absolute;
use tracing::debug;

use super::ModuleImporter;
use crate::error::ImportError;
use crate::namespace::ModuleNamespace;

/// Evaluates a native module, producing a fresh namespace per import or the
/// reason evaluation failed.
pub type ModuleFactory = Arc<dyn Fn() -> Result<ModuleNamespace, String> + Send + Sync>;

/// Host-registered modules implemented in Rust.
///
/// Each module is bound to a path. Paths are normalized to absolute form on
/// registration and on lookup, so the path a resolver produces for the
/// module's on-disk stub matches the registered key. The factory runs on
/// every import; nothing is cached.
#[derive(Clone, Default)]
pub struct NativeModules {
    modules: HashMap<PathBuf, ModuleFactory>,
}

impl NativeModules {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with_module<F>(mut self, path: impl AsRef<Path>, factory: F) -> Self
    where
        F: Fn() -> Result<ModuleNamespace, String> + Send + Sync + 'static,
    {
        self.register(path, factory);
        self
    }

    /// Bind `factory` to `path`, replacing any earlier binding.
    pub fn register<F>(&mut self, path: impl AsRef<Path>, factory: F)
    where
        F: Fn() -> Result<ModuleNamespace, String> + Send + Sync + 'static,
    {
        self.modules
            .insert(absolute(path.as_ref()), Arc::new(factory));
    }

    /// Whether a module is bound to `path`.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.modules.contains_key(&absolute(path))
    }

    /// Number of registered modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl std::fmt::Debug for NativeModules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeModules")
            .field("modules", &self.modules.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait]
impl ModuleImporter for NativeModules {
    fn supports(&self, path: &Path) -> bool {
        self.contains(path)
    }

    async fn import(&self, path: &Path) -> Result<ModuleNamespace, ImportError> {
        let factory = self
            .modules
            .get(&absolute(path))
            .ok_or_else(|| ImportError::Unregistered {
                path: path.to_path_buf(),
            })?;

        let namespace = factory().map_err(|message| ImportError::Evaluation {
            path: path.to_path_buf(),
            message,
        })?;
        debug!(path = %path.display(), exports = namespace.len(), "Imported native module");
        Ok(namespace)
    }
}
