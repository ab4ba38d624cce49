use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::ModuleImporter;
use crate::error::ImportError;
use crate::export::Export;
use crate::namespace::{DEFAULT_EXPORT, ModuleNamespace};

/// Document formats understood by [`DataImporter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataFormat {
    /// `.json`
    Json,
    /// `.toml`
    Toml,
    /// `.yaml` / `.yml`
    Yaml,
}

impl DataFormat {
    /// Pick a format from the path's extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Parse `source` into a JSON value tree.
    ///
    /// # Errors
    ///
    /// Returns the parser's message if `source` is malformed.
    pub fn parse(self, source: &str) -> Result<Value, String> {
        match self {
            Self::Json => serde_json::from_str(source).map_err(|e| e.to_string()),
            Self::Toml => toml::from_str(source).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_str(source).map_err(|e| e.to_string()),
        }
    }
}

/// Imports JSON, TOML and YAML documents as data modules.
///
/// The whole document becomes the `default` export. When the document is a
/// table, each top-level key also becomes a named export; a top-level
/// `default` key does not replace the whole-document default.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataImporter;

impl DataImporter {
    /// Create a data importer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Build the namespace for a parsed document.
fn document_namespace(document: Value) -> ModuleNamespace {
    let mut namespace = ModuleNamespace::new();
    if let Value::Object(table) = &document {
        for (key, value) in table {
            if key != DEFAULT_EXPORT {
                namespace.insert(key.clone(), Export::Value(value.clone()));
            }
        }
    }
    namespace.insert(DEFAULT_EXPORT, Export::Value(document));
    namespace
}

#[async_trait]
impl ModuleImporter for DataImporter {
    fn supports(&self, path: &Path) -> bool {
        DataFormat::from_path(path).is_some()
    }

    async fn import(&self, path: &Path) -> Result<ModuleNamespace, ImportError> {
        let format = DataFormat::from_path(path).ok_or_else(|| ImportError::Unsupported {
            path: path.to_path_buf(),
        })?;
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ImportError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
        let document = format.parse(&source).map_err(|message| ImportError::Parse {
            path: path.to_path_buf(),
            message,
        })?;

        let namespace = document_namespace(document);
        debug!(path = %path.display(), exports = namespace.len(), "Imported data module");
        Ok(namespace)
    }
}
