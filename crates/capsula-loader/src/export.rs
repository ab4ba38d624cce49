//! Dynamically typed values exported by an imported module.
//!
//! A module's exports are not known at compile time, so they are carried as
//! [`Export`] values and inspected at runtime by an
//! [`ExportRule`](crate::ExportRule). Classes form single-inheritance chains
//! through [`ClassRef`]; identity is pointer identity, so two classes with
//! the same name are still distinct.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ValidationError;
use crate::namespace::ModuleNamespace;

/// A single exported binding.
#[derive(Debug, Clone)]
pub enum Export {
    /// Plain data (numbers, strings, arrays, tables, null).
    Value(Value),
    /// A callable.
    Function(FunctionRef),
    /// A class (a callable constructor with an inheritance chain).
    Class(ClassRef),
    /// An instance of a class.
    Object(Instance),
    /// A nested module namespace.
    Namespace(ModuleNamespace),
}

impl Export {
    /// A `typeof`-style name for the value, used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Value(Value::Null) => "null",
            Self::Value(Value::Bool(_)) => "boolean",
            Self::Value(Value::Number(_)) => "number",
            Self::Value(Value::String(_)) => "string",
            Self::Value(Value::Array(_) | Value::Object(_)) | Self::Object(_) | Self::Namespace(_) => {
                "object"
            },
            Self::Function(_) | Self::Class(_) => "function",
        }
    }

    /// [`type_name`](Self::type_name) for a candidate that may be absent.
    #[must_use]
    pub fn type_name_of(candidate: Option<&Self>) -> &'static str {
        candidate.map_or("undefined", Self::type_name)
    }

    /// Whether the value can be called (functions and classes).
    #[must_use]
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Function(_) | Self::Class(_))
    }
}

impl From<Value> for Export {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<FunctionRef> for Export {
    fn from(function: FunctionRef) -> Self {
        Self::Function(function)
    }
}

impl From<ClassRef> for Export {
    fn from(class: ClassRef) -> Self {
        Self::Class(class)
    }
}

impl From<Instance> for Export {
    fn from(instance: Instance) -> Self {
        Self::Object(instance)
    }
}

impl From<ModuleNamespace> for Export {
    fn from(namespace: ModuleNamespace) -> Self {
        Self::Namespace(namespace)
    }
}

fn mismatch(expected: &str, found: &Export) -> ValidationError {
    ValidationError::new(format!(
        "expected {expected}, found {}",
        found.type_name()
    ))
}

impl TryFrom<Export> for Value {
    type Error = ValidationError;

    fn try_from(export: Export) -> Result<Self, Self::Error> {
        match export {
            Export::Value(value) => Ok(value),
            other => Err(mismatch("plain data", &other)),
        }
    }
}

impl TryFrom<Export> for FunctionRef {
    type Error = ValidationError;

    fn try_from(export: Export) -> Result<Self, Self::Error> {
        match export {
            Export::Function(function) => Ok(function),
            other => Err(mismatch("a function", &other)),
        }
    }
}

impl TryFrom<Export> for ClassRef {
    type Error = ValidationError;

    fn try_from(export: Export) -> Result<Self, Self::Error> {
        match export {
            Export::Class(class) => Ok(class),
            other => Err(mismatch("a class", &other)),
        }
    }
}

impl TryFrom<Export> for Instance {
    type Error = ValidationError;

    fn try_from(export: Export) -> Result<Self, Self::Error> {
        match export {
            Export::Object(instance) => Ok(instance),
            other => Err(mismatch("an object instance", &other)),
        }
    }
}

impl TryFrom<Export> for ModuleNamespace {
    type Error = ValidationError;

    fn try_from(export: Export) -> Result<Self, Self::Error> {
        match export {
            Export::Namespace(namespace) => Ok(namespace),
            other => Err(mismatch("a module namespace", &other)),
        }
    }
}

type NativeFn = dyn Fn(&[Export]) -> Result<Export, String> + Send + Sync;

/// A named callable exported by a module.
#[derive(Clone)]
pub struct FunctionRef {
    name: String,
    func: Arc<NativeFn>,
}

impl FunctionRef {
    /// Wrap a closure as an exported function.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Export]) -> Result<Export, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// The function's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the function.
    ///
    /// # Errors
    ///
    /// Returns whatever error message the function itself produced.
    pub fn call(&self, args: &[Export]) -> Result<Export, String> {
        (self.func)(args)
    }
}

impl fmt::Debug for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRef")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct ClassDef {
    name: String,
    parent: Option<ClassRef>,
}

/// Shared handle to a class definition.
///
/// Equality is identity: two handles are equal only if they point at the
/// same definition.
#[derive(Clone)]
pub struct ClassRef(Arc<ClassDef>);

impl ClassRef {
    /// Define a root class.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Arc::new(ClassDef {
            name: name.into(),
            parent: None,
        }))
    }

    /// Define a class that extends `parent`.
    #[must_use]
    pub fn extending(name: impl Into<String>, parent: &Self) -> Self {
        Self(Arc::new(ClassDef {
            name: name.into(),
            parent: Some(parent.clone()),
        }))
    }

    /// The class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The direct superclass, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&Self> {
        self.0.parent.as_ref()
    }

    /// Superclasses from the direct parent up to the root class.
    pub fn superclasses(&self) -> impl Iterator<Item = &Self> {
        std::iter::successors(self.parent(), |class| class.parent())
    }

    /// Whether `self` is a strict subclass of `base`.
    #[must_use]
    pub fn extends(&self, base: &Self) -> bool {
        self.superclasses().any(|class| class == base)
    }

    /// Whether `self` is `base` or a subclass of it.
    #[must_use]
    pub fn is_or_extends(&self, base: &Self) -> bool {
        self == base || self.extends(base)
    }

    /// Create an instance of this class carrying `fields`.
    #[must_use]
    pub fn instantiate(&self, fields: Value) -> Instance {
        Instance {
            class: self.clone(),
            fields,
        }
    }
}

impl PartialEq for ClassRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ClassRef {}

impl fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRef")
            .field("name", &self.0.name)
            .field("parent", &self.parent().map(ClassRef::name))
            .finish()
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

/// An object created from a [`ClassRef`].
#[derive(Debug, Clone)]
pub struct Instance {
    class: ClassRef,
    fields: Value,
}

impl Instance {
    /// The class this object was created from.
    #[must_use]
    pub fn class(&self) -> &ClassRef {
        &self.class
    }

    /// The object's data.
    #[must_use]
    pub fn fields(&self) -> &Value {
        &self.fields
    }

    /// Runtime type membership: true if the object's class is `ty` or
    /// extends it.
    #[must_use]
    pub fn is_instance_of(&self, ty: &ClassRef) -> bool {
        self.class.is_or_extends(ty)
    }
}
