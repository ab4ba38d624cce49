//! Module namespaces: the full set of bindings a module exports.

use std::collections::BTreeMap;

use crate::export::Export;

/// Name of the primary export.
pub const DEFAULT_EXPORT: &str = "default";

/// Mapping of export name to value produced by importing a module.
#[derive(Debug, Clone, Default)]
pub struct ModuleNamespace {
    exports: BTreeMap<String, Export>,
}

impl ModuleNamespace {
    /// An empty namespace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with_export(mut self, name: impl Into<String>, value: impl Into<Export>) -> Self {
        self.insert(name, value);
        self
    }

    /// Builder shorthand for setting the `default` export.
    #[must_use]
    pub fn with_default(self, value: impl Into<Export>) -> Self {
        self.with_export(DEFAULT_EXPORT, value)
    }

    /// Add or replace an export, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Export>) -> Option<Export> {
        self.exports.insert(name.into(), value.into())
    }

    /// Look up an export by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Export> {
        self.exports.get(name)
    }

    /// The primary export, if the module has one.
    #[must_use]
    pub fn default_export(&self) -> Option<&Export> {
        self.get(DEFAULT_EXPORT)
    }

    /// Consume the namespace, keeping only the primary export.
    #[must_use]
    pub fn into_default_export(mut self) -> Option<Export> {
        self.exports.remove(DEFAULT_EXPORT)
    }

    /// Export names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.exports.keys().map(String::as_str)
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Export)> {
        self.exports.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of exports, including `default`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.exports.len()
    }

    /// Whether the module exports nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Export)> for ModuleNamespace {
    fn from_iter<I: IntoIterator<Item = (K, Export)>>(iter: I) -> Self {
        Self {
            exports: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
