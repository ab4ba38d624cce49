//! Capsula Lookup - ancestor-directory search.
//!
//! Finds the nearest file or directory with a given name by walking from a
//! starting directory towards the filesystem root, optionally halting at a
//! stop boundary. The walk is strictly child-to-ancestor and the first match
//! wins.
//!
//! # Example
//!
//! ```rust,no_run
//! use capsula_lookup::{LookupKind, LookupOptions, look_up_sync};
//!
//! let options = LookupOptions::new()
//!     .with_cwd("/home/user/project/src")
//!     .with_kind(LookupKind::File);
//!
//! if let Some(manifest) = look_up_sync("Capsule.toml", &options) {
//!     println!("package root: {}", manifest.parent().unwrap().display());
//! }
//! ```
//!
//! Both [`look_up`] (non-blocking probes via `tokio::fs`) and
//! [`look_up_sync`] (blocking probes via `std::fs`) implement identical
//! logic. A probe that fails for any reason (missing path, permission
//! denied) counts as "absent at this level" and the walk continues.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod ancestors;
mod options;
mod path;
mod search;

pub use ancestors::Ancestors;
pub use options::{LookupKind, LookupOptions};
pub use path::{absolute, lexical_normalize, root_of};
pub use search::{look_up, look_up_sync};
