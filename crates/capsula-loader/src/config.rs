//! Loader configuration.
//!
//! Controls how [`FsResolver`](crate::FsResolver) turns specifiers into
//! files. Every field has a default, so an empty TOML document is a valid
//! configuration:
//!
//! ```toml
//! extensions = ["toml", "json", "yaml", "yml"]
//! index-file = "index"
//! modules-dir = "capsules"
//! manifest-file-name = "Capsule.toml"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::manifest::MANIFEST_FILE_NAME;

/// Settings for module resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct LoaderConfig {
    /// Extensions appended to a specifier that does not name a file as-is,
    /// tried in order. Written without the leading dot.
    pub extensions: Vec<String>,
    /// File stem used when a directory has no manifest entry point.
    pub index_file: String,
    /// Directory searched for bare specifiers in every ancestor of the
    /// search path.
    pub modules_dir: String,
    /// Package manifest file name.
    pub manifest_file_name: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            extensions: ["toml", "json", "yaml", "yml"]
                .into_iter()
                .map(String::from)
                .collect(),
            index_file: "index".to_owned(),
            modules_dir: "capsules".to_owned(),
            manifest_file_name: MANIFEST_FILE_NAME.to_owned(),
        }
    }
}

impl LoaderConfig {
    /// Parse and validate a configuration from TOML source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys and
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        Self::parse(source, "<inline>")
    }

    /// Read, parse and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn load_file(path: &Path) -> ConfigResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = Self::parse(&source, &path.display().to_string())?;
        debug!(path = %path.display(), "Loaded loader config");
        Ok(config)
    }

    fn parse(source: &str, origin: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse {
            path: origin.to_owned(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every field can work.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> ConfigResult<()> {
        for ext in &self.extensions {
            if ext.is_empty() || ext.starts_with('.') {
                return Err(ConfigError::Invalid {
                    field: "extensions",
                    message: format!(
                        "extension must be non-empty and have no leading dot, got {ext:?}"
                    ),
                });
            }
        }
        require_file_name("index-file", &self.index_file)?;
        require_file_name("modules-dir", &self.modules_dir)?;
        require_file_name("manifest-file-name", &self.manifest_file_name)?;
        Ok(())
    }
}

fn require_file_name(field: &'static str, value: &str) -> ConfigResult<()> {
    if value.is_empty() || value.contains(['/', '\\']) {
        return Err(ConfigError::Invalid {
            field,
            message: format!("must be a single non-empty path segment, got {value:?}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = LoaderConfig::from_toml_str("").unwrap();
        assert_eq!(config, LoaderConfig::default());
        assert_eq!(config.manifest_file_name, "Capsule.toml");
        assert_eq!(config.extensions, vec!["toml", "json", "yaml", "yml"]);
    }

    #[test]
    fn test_partial_override() {
        let config = LoaderConfig::from_toml_str(
            r#"
            extensions = ["json"]
            modules-dir = "vendor"
            "#,
        )
        .unwrap();
        assert_eq!(config.extensions, vec!["json"]);
        assert_eq!(config.modules_dir, "vendor");
        assert_eq!(config.index_file, "index");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = LoaderConfig::from_toml_str("colour = \"blue\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_leading_dot_extension_rejected() {
        let err = LoaderConfig::from_toml_str("extensions = [\".json\"]").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "extensions",
                ..
            }
        ));
    }

    #[test]
    fn test_nested_modules_dir_rejected() {
        let err = LoaderConfig::from_toml_str("modules-dir = \"a/b\"").unwrap_err();
        assert!(err.to_string().contains("modules-dir"));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capsula.toml");
        std::fs::write(&path, "index-file = \"main\"\n").unwrap();

        let config = LoaderConfig::load_file(&path).unwrap();
        assert_eq!(config.index_file, "main");

        let missing = LoaderConfig::load_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
