use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure modes a glob call can surface to its caller.
///
/// There is deliberately no `NOSPACE` variant: the C `glob(3)` contract
/// returns it on allocation failure, but Rust's global allocator aborts the
/// process rather than handing back an error, so that result code has no
/// reachable caller-visible analogue here.
#[derive(Debug, Error)]
pub enum GlobError {
    /// A directory couldn't be opened or read, and either no error callback
    /// was installed with a non-aborting answer, or the `ERR` flag demanded
    /// abort.
    #[error("glob aborted while reading {path}: {source}")]
    Aborted { path: PathBuf, source: io::Error },

    /// The pattern produced no matches and `NOCHECK`/`NOMAGIC` did not
    /// apply.
    #[error("no matches found for pattern")]
    NoMatch,
}
