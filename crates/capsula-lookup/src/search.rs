//! The lookup walk itself, in non-blocking and blocking forms.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::options::{LookupKind, LookupOptions};
use crate::path::lexical_normalize;

/// Walk up directories to find the first entry named `name`.
///
/// Returns the lexically normalized path of the nearest match, or `None` if
/// nothing matched before the stop boundary or the root. An absolute `name`
/// is probed once, without traversal and regardless of `cwd`.
///
/// Probes are issued one at a time, nearest directory first.
pub async fn look_up(name: impl AsRef<Path>, options: &LookupOptions) -> Option<PathBuf> {
    let name = name.as_ref();

    if name.is_absolute() {
        return probe(name, options.kind)
            .await
            .then(|| lexical_normalize(name));
    }

    for dir in options.ancestors() {
        let candidate = dir.join(name);
        if probe(&candidate, options.kind).await {
            debug!(path = %candidate.display(), "Lookup matched");
            return Some(lexical_normalize(&candidate));
        }
    }

    trace!(name = %name.display(), "Lookup found no match");
    None
}

/// Synchronous variant of [`look_up`].
///
/// Blocks the calling thread for each filesystem probe.
#[must_use]
pub fn look_up_sync(name: impl AsRef<Path>, options: &LookupOptions) -> Option<PathBuf> {
    let name = name.as_ref();

    if name.is_absolute() {
        return probe_sync(name, options.kind).then(|| lexical_normalize(name));
    }

    for dir in options.ancestors() {
        let candidate = dir.join(name);
        if probe_sync(&candidate, options.kind) {
            debug!(path = %candidate.display(), "Lookup matched");
            return Some(lexical_normalize(&candidate));
        }
    }

    trace!(name = %name.display(), "Lookup found no match");
    None
}

async fn probe(path: &Path, kind: LookupKind) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => kind.matches(&metadata),
        Err(e) => {
            // ENOENT, EACCES and friends all mean "not here".
            trace!(path = %path.display(), error = %e, "Lookup probe missed");
            false
        },
    }
}

fn probe_sync(path: &Path, kind: LookupKind) -> bool {
    match std::fs::metadata(path) {
        Ok(metadata) => kind.matches(&metadata),
        Err(e) => {
            trace!(path = %path.display(), error = %e, "Lookup probe missed");
            false
        },
    }
}
