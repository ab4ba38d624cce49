//! Test fixtures: a small class hierarchy and native modules exporting it.

use capsula_loader::{ClassRef, Export, FunctionRef, ModuleNamespace, NativeModules};
use serde_json::json;

use crate::tree::ModuleTree;

/// Manifest for a `weather` package whose entry point is `lib/main`.
pub const WEATHER_MANIFEST: &str = r#"[package]
name = "weather"
version = "0.1.0"
description = "Forecast provider"

[component]
entrypoint = "lib/main"
"#;

/// A class hierarchy for rule tests.
///
/// ```text
/// Animal
/// └── Dog
///     └── Puppy
/// Mineral
/// ```
#[derive(Debug, Clone)]
pub struct Zoo {
    /// Root class.
    pub animal: ClassRef,
    /// `Dog extends Animal`.
    pub dog: ClassRef,
    /// `Puppy extends Dog`.
    pub puppy: ClassRef,
    /// Unrelated root class.
    pub mineral: ClassRef,
}

impl Zoo {
    /// Define the hierarchy.
    #[must_use]
    pub fn new() -> Self {
        let animal = ClassRef::new("Animal");
        let dog = ClassRef::extending("Dog", &animal);
        let puppy = ClassRef::extending("Puppy", &dog);
        Self {
            animal,
            dog,
            puppy,
            mineral: ClassRef::new("Mineral"),
        }
    }

    /// Write stub files under `zoo/` in `tree` and bind a native module to
    /// each:
    ///
    /// | file | default export | named exports |
    /// |---|---|---|
    /// | `animal.native` | `Animal` | |
    /// | `dog.native` | `Dog` | |
    /// | `puppy.native` | `Puppy` | |
    /// | `rock.native` | `Mineral` | |
    /// | `rex.native` | `Dog` instance | `bark` |
    /// | `pebble.native` | `Mineral` instance | |
    /// | `feed.native` | function `feed` | |
    /// | `nothing.native` | none | `version` |
    /// | `crash.native` | evaluation fails | |
    #[must_use]
    pub fn native_modules(&self, tree: &ModuleTree) -> NativeModules {
        let mut modules = NativeModules::new();

        for (file, class) in [
            ("animal", &self.animal),
            ("dog", &self.dog),
            ("puppy", &self.puppy),
            ("rock", &self.mineral),
        ] {
            let class = class.clone();
            modules.register(tree.write(&format!("zoo/{file}.native"), ""), move || {
                Ok(ModuleNamespace::new().with_default(class.clone()))
            });
        }

        let dog = self.dog.clone();
        modules.register(tree.write("zoo/rex.native", ""), move || {
            Ok(ModuleNamespace::new()
                .with_default(dog.instantiate(json!({"name": "Rex"})))
                .with_export("bark", bark()))
        });

        let mineral = self.mineral.clone();
        modules.register(tree.write("zoo/pebble.native", ""), move || {
            Ok(ModuleNamespace::new().with_default(mineral.instantiate(json!({"weight": 3}))))
        });

        modules.register(tree.write("zoo/feed.native", ""), || {
            Ok(ModuleNamespace::new().with_default(FunctionRef::new("feed", |args| {
                Ok(Export::Value(json!(format!("fed {} animals", args.len()))))
            })))
        });

        modules.register(tree.write("zoo/nothing.native", ""), || {
            Ok(ModuleNamespace::new().with_export("version", json!("1.0.0")))
        });

        modules.register(tree.write("zoo/crash.native", ""), || {
            Err("module threw during evaluation".to_owned())
        });

        modules
    }
}

impl Default for Zoo {
    fn default() -> Self {
        Self::new()
    }
}

fn bark() -> FunctionRef {
    FunctionRef::new("bark", |_| Ok(Export::Value(json!("woof"))))
}
