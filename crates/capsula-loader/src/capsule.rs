//! The capsule loading policy and its resolve → import → validate pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use capsula_lookup::{LookupKind, LookupOptions, absolute, look_up};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::LoaderConfig;
use crate::error::{CapsuleError, CapsuleResult, ResolveError, ValidationError};
use crate::export::{ClassRef, Export};
use crate::importer::{DataImporter, ModuleImporter};
use crate::resolver::{FsResolver, ModuleResolver};
use crate::rule::{CapsuleType, ExportRule};

/// Loading options shared by every capsule variant.
///
/// Deserializable from TOML with kebab-case keys:
///
/// ```toml
/// default-file-name = "plugin.toml"
/// use-default = true
/// allow-void = false
/// skip-validation = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct CapsuleOptions {
    /// File name assumed by [`Capsule::load`] when none is given. Empty means
    /// callers must always name the file.
    pub default_file_name: String,
    /// Validate and return the module's `default` export instead of its
    /// whole namespace.
    pub use_default: bool,
    /// Accept an absent export without validating it.
    pub allow_void: bool,
    /// Never validate.
    pub skip_validation: bool,
}

impl CapsuleOptions {
    /// Options with every field defaulted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default file name.
    #[must_use]
    pub fn with_default_file_name(mut self, name: impl Into<String>) -> Self {
        self.default_file_name = name.into();
        self
    }

    /// Select the `default` export rather than the whole namespace.
    #[must_use]
    pub fn with_use_default(mut self, use_default: bool) -> Self {
        self.use_default = use_default;
        self
    }

    /// Accept absent exports.
    #[must_use]
    pub fn with_allow_void(mut self, allow_void: bool) -> Self {
        self.allow_void = allow_void;
        self
    }

    /// Bypass validation entirely.
    #[must_use]
    pub fn with_skip_validation(mut self, skip_validation: bool) -> Self {
        self.skip_validation = skip_validation;
        self
    }
}

/// A reusable loading policy: resolve a module, import it, and check its
/// export against a fixed [`ExportRule`].
///
/// A capsule holds only immutable configuration and shared collaborators.
/// Cloning is cheap and one instance may serve many concurrent loads.
#[derive(Clone)]
pub struct Capsule {
    capsule_type: CapsuleType,
    rule: ExportRule,
    options: CapsuleOptions,
    config: LoaderConfig,
    cwd: Option<PathBuf>,
    resolver: Arc<dyn ModuleResolver>,
    importer: Arc<dyn ModuleImporter>,
}

impl Capsule {
    /// Create a capsule enforcing `rule`.
    ///
    /// Modules are resolved with an [`FsResolver`] using the default
    /// [`LoaderConfig`] and imported with a [`DataImporter`] until replaced
    /// with [`with_resolver`](Self::with_resolver) and
    /// [`with_importer`](Self::with_importer).
    #[must_use]
    pub fn new(rule: ExportRule, options: CapsuleOptions) -> Self {
        let config = LoaderConfig::default();
        Self {
            capsule_type: rule.capsule_type(),
            rule,
            options,
            resolver: Arc::new(FsResolver::new(config.clone())),
            config,
            cwd: None,
            importer: Arc::new(DataImporter::new()),
        }
    }

    /// A capsule whose export must be callable.
    #[must_use]
    pub fn function(options: CapsuleOptions) -> Self {
        Self::new(ExportRule::Function, options)
    }

    /// A capsule whose export must be `base` or a subclass of it.
    #[must_use]
    pub fn class(base: ClassRef, options: CapsuleOptions) -> Self {
        Self::new(ExportRule::Class(base), options)
    }

    /// A capsule whose export must be an instance of `ty`.
    #[must_use]
    pub fn object(ty: ClassRef, options: CapsuleOptions) -> Self {
        Self::new(ExportRule::Object(ty), options)
    }

    /// A capsule whose export is checked by `validator`, which returns
    /// `None` to accept or `Some(first_error)` to reject.
    #[must_use]
    pub fn module<F>(options: CapsuleOptions, validator: F) -> Self
    where
        F: Fn(Option<&Export>) -> Option<String> + Send + Sync + 'static,
    {
        Self::new(ExportRule::module(validator), options)
    }

    /// Resolve modules relative to `cwd` instead of the process working
    /// directory.
    #[must_use]
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Use `config` for manifest lookup and a fresh [`FsResolver`].
    #[must_use]
    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.resolver = Arc::new(FsResolver::new(config.clone()));
        self.config = config;
        self
    }

    /// Replace the module resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: impl ModuleResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Replace the module importer.
    #[must_use]
    pub fn with_importer(mut self, importer: impl ModuleImporter + 'static) -> Self {
        self.importer = Arc::new(importer);
        self
    }

    /// Share an existing importer between capsules.
    #[must_use]
    pub fn with_shared_importer(mut self, importer: Arc<dyn ModuleImporter>) -> Self {
        self.importer = importer;
        self
    }

    /// Which rule this capsule applies.
    #[must_use]
    pub fn capsule_type(&self) -> CapsuleType {
        self.capsule_type
    }

    /// The rule itself.
    #[must_use]
    pub fn rule(&self) -> &ExportRule {
        &self.rule
    }

    /// The loading options.
    #[must_use]
    pub fn options(&self) -> &CapsuleOptions {
        &self.options
    }

    /// The absolute directory resolution starts from. A relative `cwd` is
    /// taken against the process working directory.
    #[must_use]
    pub fn search_root(&self) -> PathBuf {
        absolute(self.cwd.as_deref().unwrap_or_else(|| Path::new(".")))
    }

    /// Resolve a specifier to a module file, searching from
    /// [`search_root`](Self::search_root).
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] if the specifier names no module.
    pub async fn resolve_module_path(&self, specifier: &str) -> Result<PathBuf, ResolveError> {
        self.resolver
            .resolve(specifier, &[self.search_root()])
            .await
    }

    /// Find the package directory that contains a module: the nearest
    /// ancestor of the module file holding a package manifest.
    ///
    /// Returns `Ok(None)` when no manifest exists up to the filesystem root.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] if the specifier itself cannot be resolved.
    pub async fn resolve_package_path(
        &self,
        specifier: &str,
    ) -> Result<Option<PathBuf>, ResolveError> {
        let module_path = self.resolve_module_path(specifier).await?;
        let options = LookupOptions::new()
            .with_cwd(&module_path)
            .with_kind(LookupKind::File);
        let manifest = look_up(&self.config.manifest_file_name, &options).await;
        Ok(manifest.and_then(|path| path.parent().map(Path::to_path_buf)))
    }

    /// Whether `from_dir/file_name` exists. Falls back to the default file
    /// name when `file_name` is `None`. Nothing is resolved or imported.
    #[must_use]
    pub fn can_be_found_at(&self, from_dir: impl AsRef<Path>, file_name: Option<&str>) -> bool {
        let file_name = file_name.unwrap_or(&self.options.default_file_name);
        from_dir.as_ref().join(file_name).exists()
    }

    /// Resolve, import and validate a module.
    ///
    /// Returns the candidate export: the `default` export when
    /// [`use_default`](CapsuleOptions::use_default) is set, otherwise the
    /// whole namespace. `None` means the module has no `default` export and
    /// the capsule accepted that through `allow_void` or `skip_validation`.
    ///
    /// # Errors
    ///
    /// - [`CapsuleError::Resolve`] if the specifier cannot be resolved.
    /// - [`CapsuleError::Load`] if the module cannot be imported.
    /// - [`CapsuleError::Validate`] if the export breaks the rule.
    pub async fn import(&self, specifier: &str) -> CapsuleResult<Option<Export>> {
        let module_path = self
            .resolve_module_path(specifier)
            .await
            .map_err(|source| CapsuleError::Resolve {
                specifier: specifier.to_owned(),
                source,
            })?;
        self.import_resolved(&module_path).await
    }

    /// Import an already resolved module file, select the candidate export
    /// and validate it.
    async fn import_resolved(&self, module_path: &Path) -> CapsuleResult<Option<Export>> {
        let namespace = self.importer.import(module_path).await?;

        let candidate = if self.options.use_default {
            namespace.into_default_export()
        } else {
            Some(Export::Namespace(namespace))
        };

        let skip_validation =
            self.options.skip_validation || (candidate.is_none() && self.options.allow_void);

        if !skip_validation
            && let Err(e) = self.rule.validate(candidate.as_ref())
        {
            warn!(
                capsule_type = %self.capsule_type,
                path = %module_path.display(),
                error = %e,
                "Capsule export failed validation"
            );
            return Err(e.into());
        }

        debug!(
            capsule_type = %self.capsule_type,
            path = %module_path.display(),
            validated = !skip_validation,
            "Loaded capsule"
        );
        Ok(candidate)
    }

    /// [`import`](Self::import), then convert the export into a concrete type.
    ///
    /// # Errors
    ///
    /// As [`import`](Self::import), plus [`CapsuleError::Validate`] if the
    /// export is absent or not convertible to `T`.
    pub async fn import_as<T>(&self, specifier: &str) -> CapsuleResult<T>
    where
        T: TryFrom<Export, Error = ValidationError>,
    {
        let export = self
            .import(specifier)
            .await?
            .ok_or_else(|| ValidationError::new("Capsule export is undefined"))?;
        Ok(T::try_from(export)?)
    }

    /// Load `file_name` (or the default file name) from `from_dir`.
    ///
    /// A relative `from_dir` is taken relative to
    /// [`search_root`](Self::search_root). Validation is identical to
    /// [`import`](Self::import).
    ///
    /// # Errors
    ///
    /// As [`import`](Self::import).
    pub async fn load(
        &self,
        from_dir: impl AsRef<Path>,
        file_name: Option<&str>,
    ) -> CapsuleResult<Option<Export>> {
        let file_name = file_name.unwrap_or(&self.options.default_file_name);
        let path = self.search_root().join(from_dir).join(file_name);
        let module_path = self
            .resolver
            .resolve_path(&path)
            .await
            .map_err(|source| CapsuleError::Resolve {
                specifier: path.display().to_string(),
                source,
            })?;
        self.import_resolved(&module_path).await
    }
}

impl std::fmt::Debug for Capsule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capsule")
            .field("capsule_type", &self.capsule_type)
            .field("rule", &self.rule)
            .field("options", &self.options)
            .field("cwd", &self.cwd)
            .finish_non_exhaustive()
    }
}
