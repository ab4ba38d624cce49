//! Package manifest types.
//!
//! A package manifest (`Capsule.toml`) marks the root of a capsule package
//! and may name the module file that a directory specifier resolves to.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

/// Standard package manifest file name.
pub const MANIFEST_FILE_NAME: &str = "Capsule.toml";

/// A package manifest loaded from `Capsule.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageManifest {
    /// The package definition including name and version.
    pub package: PackageDef,
    /// The package's main module.
    pub component: Option<ComponentDef>,
}

/// Package identity metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageDef {
    /// The package's name.
    pub name: String,
    /// The semantic version.
    pub version: String,
    /// Optional description of the package.
    pub description: Option<String>,
}

/// Defines the package's main module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentDef {
    /// Path to the main module, relative to the package directory.
    pub entrypoint: PathBuf,
}

impl PackageManifest {
    /// Parse a manifest from TOML source. `path` is used for error context.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Manifest`] if the source is not a valid manifest.
    pub fn from_toml_str(source: &str, path: &Path) -> Result<Self, ResolveError> {
        toml::from_str(source).map_err(|e| ResolveError::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read and parse a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Manifest`] if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self, ResolveError> {
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ResolveError::Manifest {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Self::from_toml_str(&source, path)
    }

    /// The main module's path inside `package_dir`, if declared.
    #[must_use]
    pub fn entrypoint(&self, package_dir: &Path) -> Option<PathBuf> {
        self.component
            .as_ref()
            .map(|component| package_dir.join(&component.entrypoint))
    }
}
