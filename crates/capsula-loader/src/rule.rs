//! Validation rules applied to candidate exports.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::export::{ClassRef, Export};

/// Tag identifying which validation rule a capsule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapsuleType {
    /// Caller-supplied validator.
    Module,
    /// Callable export.
    Function,
    /// Class equal to or extending a base.
    Class,
    /// Instance of a type.
    Object,
}

impl fmt::Display for CapsuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Module => "module",
            Self::Function => "function",
            Self::Class => "class",
            Self::Object => "object",
        })
    }
}

/// Caller-supplied predicate for [`ExportRule::Module`].
///
/// Returns `None` when the export is acceptable, or `Some(first_error)`
/// describing the first problem found.
pub type Validator = Arc<dyn Fn(Option<&Export>) -> Option<String> + Send + Sync>;

/// The shape a candidate export must have.
#[derive(Clone)]
pub enum ExportRule {
    /// The export must be callable (a function or a class).
    Function,
    /// The export must be this class or a subclass of it.
    Class(ClassRef),
    /// The export must be an instance of this class.
    Object(ClassRef),
    /// The export is accepted or rejected by a caller predicate.
    Module(Validator),
}

impl ExportRule {
    /// Build a [`Module`](Self::Module) rule from a closure.
    pub fn module<F>(validator: F) -> Self
    where
        F: Fn(Option<&Export>) -> Option<String> + Send + Sync + 'static,
    {
        Self::Module(Arc::new(validator))
    }

    /// The type tag of this rule.
    #[must_use]
    pub fn capsule_type(&self) -> CapsuleType {
        match self {
            Self::Function => CapsuleType::Function,
            Self::Class(_) => CapsuleType::Class,
            Self::Object(_) => CapsuleType::Object,
            Self::Module(_) => CapsuleType::Module,
        }
    }

    /// Check `candidate` against the rule. `None` stands for an absent export.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming why the candidate was rejected.
    pub fn validate(&self, candidate: Option<&Export>) -> Result<(), ValidationError> {
        match self {
            Self::Function => match candidate {
                Some(export) if export.is_callable() => Ok(()),
                other => Err(ValidationError::new(format!(
                    "Capsule export is not a function: {}",
                    Export::type_name_of(other)
                ))),
            },
            Self::Class(base) => match candidate {
                Some(Export::Class(class)) if class.is_or_extends(base) => Ok(()),
                Some(export) if export.is_callable() => Err(ValidationError::new(format!(
                    "Capsule export does not extend {base}"
                ))),
                _ => Err(ValidationError::new("Capsule export is not a function")),
            },
            Self::Object(ty) => match candidate {
                Some(Export::Object(instance)) if instance.is_instance_of(ty) => Ok(()),
                _ => Err(ValidationError::new(format!(
                    "Capsule export is not an instance of intended class {ty}"
                ))),
            },
            Self::Module(validator) => match validator(candidate) {
                None => Ok(()),
                Some(first_error) => Err(ValidationError::new(format!(
                    "Invalid schema exported {first_error}"
                ))),
            },
        }
    }
}

impl fmt::Debug for ExportRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function => f.write_str("Function"),
            Self::Class(base) => f.debug_tuple("Class").field(base).finish(),
            Self::Object(ty) => f.debug_tuple("Object").field(ty).finish(),
            Self::Module(_) => f.debug_tuple("Module").field(&"<validator>").finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::export::FunctionRef;
    use crate::namespace::ModuleNamespace;

    fn noop() -> Export {
        FunctionRef::new("noop", |_| Ok(json!(null).into())).into()
    }

    #[test]
    fn test_function_rule() {
        let rule = ExportRule::Function;
        assert!(rule.validate(Some(&noop())).is_ok());
        assert!(rule.validate(Some(&ClassRef::new("Ctor").into())).is_ok());

        let err = rule.validate(Some(&json!(5).into())).unwrap_err();
        assert_eq!(err.message(), "Capsule export is not a function: number");

        let err = rule.validate(None).unwrap_err();
        assert_eq!(err.message(), "Capsule export is not a function: undefined");
    }

    #[test]
    fn test_class_rule() {
        let base = ClassRef::new("Base");
        let sub = ClassRef::extending("Sub", &base);
        let sup = ClassRef::new("Super");
        let base_with_super = ClassRef::extending("Base2", &sup);
        let unrelated = ClassRef::new("Unrelated");
        let rule = ExportRule::Class(base.clone());

        assert!(rule.validate(Some(&base.into())).is_ok());
        assert!(rule.validate(Some(&sub.into())).is_ok());

        let err = rule.validate(Some(&unrelated.into())).unwrap_err();
        assert_eq!(err.message(), "Capsule export does not extend Base");

        // A superclass of the base is not accepted.
        let rule = ExportRule::Class(base_with_super);
        assert!(rule.validate(Some(&sup.into())).is_err());
    }

    #[test]
    fn test_class_rule_rejects_non_classes() {
        let rule = ExportRule::Class(ClassRef::new("Base"));

        let err = rule.validate(Some(&json!({"a": 1}).into())).unwrap_err();
        assert_eq!(err.message(), "Capsule export is not a function");
        assert!(rule.validate(None).is_err());

        // Callable, but a plain function has no inheritance chain.
        let err = rule.validate(Some(&noop())).unwrap_err();
        assert_eq!(err.message(), "Capsule export does not extend Base");
    }

    #[test]
    fn test_object_rule() {
        let ty = ClassRef::new("Service");
        let derived = ClassRef::extending("HttpService", &ty);
        let unrelated = ClassRef::new("Other");
        let rule = ExportRule::Object(ty.clone());

        assert!(rule.validate(Some(&ty.instantiate(json!({})).into())).is_ok());
        assert!(rule.validate(Some(&derived.instantiate(json!({})).into())).is_ok());

        let err = rule
            .validate(Some(&unrelated.instantiate(json!({})).into()))
            .unwrap_err();
        assert_eq!(
            err.message(),
            "Capsule export is not an instance of intended class Service"
        );
        assert!(rule.validate(Some(&json!({"plain": true}).into())).is_err());
        // The class itself is not an instance of the class.
        assert!(rule.validate(Some(&ty.into())).is_err());
    }

    #[test]
    fn test_module_rule() {
        let rule = ExportRule::module(|candidate| match candidate {
            Some(Export::Namespace(ns)) if ns.get("name").is_some() => None,
            _ => Some("missing required export `name`".to_string()),
        });

        let good = ModuleNamespace::new().with_export("name", json!("x"));
        assert!(rule.validate(Some(&good.into())).is_ok());

        let err = rule.validate(Some(&ModuleNamespace::new().into())).unwrap_err();
        assert_eq!(
            err.message(),
            "Invalid schema exported missing required export `name`"
        );
    }

    #[test]
    fn test_capsule_type_tags_are_distinct() {
        let ty = ClassRef::new("T");
        assert_eq!(ExportRule::Function.capsule_type(), CapsuleType::Function);
        assert_eq!(ExportRule::Class(ty.clone()).capsule_type(), CapsuleType::Class);
        assert_eq!(ExportRule::Object(ty).capsule_type(), CapsuleType::Object);
        assert_eq!(ExportRule::module(|_| None).capsule_type(), CapsuleType::Module);
        assert_eq!(CapsuleType::Object.to_string(), "object");
    }
}
