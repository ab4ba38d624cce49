//! Dynamic import of resolved module files.
//!
//! A [`ModuleImporter`] turns an absolute module path into a
//! [`ModuleNamespace`]. Several importers can be combined with
//! [`CompositeImporter`], which hands each path to the first importer that
//! [supports](ModuleImporter::supports) it.

mod data;
mod native;

pub use data::{DataFormat, DataImporter};
pub use native::{ModuleFactory, NativeModules};

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ImportError;
use crate::namespace::ModuleNamespace;

/// Evaluates a module file and returns its exports.
#[async_trait]
pub trait ModuleImporter: Send + Sync {
    /// Whether this importer can handle `path`. Defaults to accepting all.
    fn supports(&self, _path: &Path) -> bool {
        true
    }

    /// Import the module at `path`.
    ///
    /// # Errors
    ///
    /// Returns an [`ImportError`] if the module cannot be read, parsed or
    /// evaluated.
    async fn import(&self, path: &Path) -> Result<ModuleNamespace, ImportError>;
}

/// Routes each path to the first registered importer that supports it.
#[derive(Clone, Default)]
pub struct CompositeImporter {
    importers: Vec<Arc<dyn ModuleImporter>>,
}

impl CompositeImporter {
    /// Create an empty composite importer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an importer; earlier importers take precedence.
    #[must_use]
    pub fn with_importer(mut self, importer: impl ModuleImporter + 'static) -> Self {
        self.add_importer(Arc::new(importer));
        self
    }

    /// Append a shared importer; earlier importers take precedence.
    pub fn add_importer(&mut self, importer: Arc<dyn ModuleImporter>) {
        self.importers.push(importer);
    }

    /// Number of registered importers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.importers.len()
    }

    /// Whether no importers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.importers.is_empty()
    }
}

impl std::fmt::Debug for CompositeImporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeImporter")
            .field("importers", &self.importers.len())
            .finish()
    }
}

#[async_trait]
impl ModuleImporter for CompositeImporter {
    fn supports(&self, path: &Path) -> bool {
        self.importers.iter().any(|importer| importer.supports(path))
    }

    async fn import(&self, path: &Path) -> Result<ModuleNamespace, ImportError> {
        let importer = self
            .importers
            .iter()
            .find(|importer| importer.supports(path))
            .ok_or_else(|| ImportError::Unsupported {
                path: path.to_path_buf(),
            })?;
        importer.import(path).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::export::Export;

    #[tokio::test]
    async fn test_routes_by_support() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("settings.json");
        std::fs::write(&data, r#"{"level": 3}"#).unwrap();
        let native = dir.path().join("plugin.native");

        let importer = CompositeImporter::new()
            .with_importer(NativeModules::new().with_module(&native, || {
                Ok(ModuleNamespace::new().with_default(json!("native")))
            }))
            .with_importer(DataImporter::new());
        assert_eq!(importer.len(), 2);

        let ns = importer.import(&native).await.unwrap();
        assert!(matches!(ns.default_export(), Some(Export::Value(v)) if v == "native"));

        let ns = importer.import(&data).await.unwrap();
        assert!(matches!(ns.get("level"), Some(Export::Value(v)) if *v == json!(3)));
    }

    #[tokio::test]
    async fn test_unsupported_path() {
        let importer = CompositeImporter::new().with_importer(DataImporter::new());
        let err = importer.import(Path::new("/tmp/lib.so")).await.unwrap_err();
        assert!(matches!(err, ImportError::Unsupported { .. }));
        assert!(!importer.supports(Path::new("/tmp/lib.so")));
    }
}
