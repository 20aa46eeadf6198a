//! Gitignore-aware directory pruning (`GITIGNORE` flag).
//!
//! The gitignore parser itself is out of scope for this crate (per
//! `SPEC_FULL.md`'s collaborator list) -- the traversal engine only ever
//! calls the two predicates below. `posix-glob-cli` supplies a concrete
//! implementation backed by the `ignore` crate's gitignore matcher.

use std::path::Path;

pub trait GitIgnoreFilter {
    /// Whether `path` itself (a file or directory about to be reported as a
    /// match) is ignored.
    fn is_ignored(&self, path: &Path, is_dir: bool) -> bool;

    /// Whether traversal should not descend into directory `path` at all.
    fn should_skip_directory(&self, path: &Path) -> bool;
}
