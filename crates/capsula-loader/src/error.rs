//! Error types for resolution, import, validation and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// A module specifier could not be mapped to a file.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Nothing on disk matched the specifier.
    #[error("Cannot find module '{specifier}'")]
    NotFound {
        /// The specifier as given by the caller.
        specifier: String,
    },
    /// A package manifest on the resolution path is malformed.
    #[error("Failed to parse manifest at {path}: {message}")]
    Manifest {
        /// Path to the invalid manifest.
        path: PathBuf,
        /// The parse error message.
        message: String,
    },
}

/// A resolved module could not be imported.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The module file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// The module path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The module source is syntactically invalid.
    #[error("Failed to parse {path}: {message}")]
    Parse {
        /// The module path.
        path: PathBuf,
        /// The parser's message.
        message: String,
    },
    /// Evaluating the module failed.
    #[error("Module {path} failed to evaluate: {message}")]
    Evaluation {
        /// The module path.
        path: PathBuf,
        /// The reason given by the module.
        message: String,
    },
    /// No native module is registered for the path.
    #[error("No native module registered at {path}")]
    Unregistered {
        /// The module path.
        path: PathBuf,
    },
    /// No importer accepts the path.
    #[error("No importer for {path}")]
    Unsupported {
        /// The module path.
        path: PathBuf,
    },
}

/// A candidate export does not satisfy a capsule's rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    /// Create a validation error with a human-readable reason.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The reason the export was rejected.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors surfaced by [`Capsule`](crate::Capsule) operations.
#[derive(Debug, Error)]
pub enum CapsuleError {
    /// The specifier could not be resolved.
    #[error("Failed to resolve module path for {specifier}: {source}")]
    Resolve {
        /// The specifier as given by the caller.
        specifier: String,
        /// Why resolution failed.
        #[source]
        source: ResolveError,
    },
    /// The resolved module could not be imported.
    #[error("Failed to load capsule {0}")]
    Load(#[from] ImportError),
    /// The candidate export failed validation.
    #[error("Failed to validate capsule export {0}")]
    Validate(#[from] ValidationError),
}

/// A specialized Result type for capsule operations.
pub type CapsuleResult<T> = Result<T, CapsuleError>;

/// Errors raised while loading a [`LoaderConfig`](crate::LoaderConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path to the config file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid TOML or has unknown keys.
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        /// Path to the config file, or a placeholder for inline sources.
        path: String,
        /// The TOML error.
        #[source]
        source: toml::de::Error,
    },
    /// A field holds a value that cannot work.
    #[error("Invalid config field `{field}`: {message}")]
    Invalid {
        /// Field name.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

/// A specialized Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
