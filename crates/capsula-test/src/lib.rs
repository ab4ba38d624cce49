//! Capsula Test - shared test utilities for the capsula crates.
//!
//! Provides temporary module trees, a small class hierarchy with matching
//! native modules, and log setup for tests.
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! capsula-test.workspace = true
//! ```
//!
//! Then use in integration tests:
//!
//! ```rust,ignore
//! use capsula_test::{ModuleTree, Zoo};
//!
//! #[tokio::test]
//! async fn test_loads_animal() {
//!     let zoo = Zoo::new();
//!     let tree = ModuleTree::new().with_file("dog.native", "");
//!     let importer = zoo.native_modules(&tree);
//!     // ...
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod tree;

pub use fixtures::*;
pub use tree::ModuleTree;

use tracing_subscriber::EnvFilter;

/// Install a test-friendly `tracing` subscriber once per process.
///
/// Honors `RUST_LOG`, defaulting to `warn`. Output goes through the test
/// harness's captured writer. Later calls are no-ops.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
