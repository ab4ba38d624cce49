//! Capsula Loader - validated dynamic loading of capsule modules.
//!
//! A [`Capsule`] is a reusable loading policy. Given a module specifier or a
//! directory, it resolves the module to a file, imports it through a
//! [`ModuleImporter`], selects the candidate export and checks it against an
//! [`ExportRule`] before handing it back:
//!
//! - [`ExportRule::Function`]: the export must be callable.
//! - [`ExportRule::Class`]: the export must be a given class or a subclass of it.
//! - [`ExportRule::Object`]: the export must be an instance of a given class.
//! - [`ExportRule::Module`]: the export is handed to a caller-supplied validator.
//!
//! # Example
//!
//! ```rust,no_run
//! use capsula_loader::{Capsule, CapsuleOptions, ClassRef};
//!
//! # async fn run() -> Result<(), capsula_loader::CapsuleError> {
//! let plugin = ClassRef::new("Plugin");
//! let capsule = Capsule::class(
//!     plugin,
//!     CapsuleOptions::new()
//!         .with_default_file_name("plugin.toml")
//!         .with_use_default(true),
//! );
//!
//! let export = capsule.load("./plugins/weather", None).await?;
//! # let _ = export;
//! # Ok(())
//! # }
//! ```
//!
//! Resolution and import are pluggable: see [`ModuleResolver`] and
//! [`ModuleImporter`]. Nothing is cached between calls; a capsule holds only
//! immutable configuration and may be shared across tasks.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod capsule;
pub mod config;
pub mod error;
pub mod export;
pub mod importer;
pub mod manifest;
pub mod namespace;
pub mod resolver;
pub mod rule;

pub use capsule::{Capsule, CapsuleOptions};
pub use config::LoaderConfig;
pub use error::{
    CapsuleError, CapsuleResult, ConfigError, ConfigResult, ImportError, ResolveError,
    ValidationError,
};
pub use export::{ClassRef, Export, FunctionRef, Instance};
pub use importer::{CompositeImporter, DataFormat, DataImporter, ModuleImporter, NativeModules};
pub use manifest::{MANIFEST_FILE_NAME, PackageManifest};
pub use namespace::{DEFAULT_EXPORT, ModuleNamespace};
pub use resolver::{FsResolver, ModuleResolver};
pub use rule::{CapsuleType, ExportRule, Validator};
