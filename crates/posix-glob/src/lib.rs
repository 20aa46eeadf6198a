#![doc = include_str!("../README.md")]

mod aggregator;
mod analyzer;
mod brace;
mod dirfunc;
mod error;
mod flags;
mod gitignore;
mod path_matcher;
mod tilde;
mod traversal;

pub use aggregator::{GlobResult, ResultsAggregator};
pub use analyzer::{PatternInfo, analyze};
pub use brace::{BraceExpander, BraceExpansion, BracedComponent, BracedPattern};
pub use dirfunc::{DirEntry, DirFunc, EntryKind, StdDirFunc};
pub use error::GlobError;
pub use flags::Flags;
pub use gitignore::GitIgnoreFilter;
pub use path_matcher::PathMatcher;
pub use tilde::{EnvHomeDirLookup, HomeDirLookup};

use std::io;
use std::path::Path;

use traversal::TraversalContext;

/// Every collaborator a [`glob_with`] call may be driven through, with
/// filesystem-backed defaults for everything optional.
pub struct GlobOptions<'a> {
    pub dir_func: Box<dyn DirFunc + 'a>,
    pub home_lookup: Box<dyn HomeDirLookup + 'a>,
    pub gitignore: Option<Box<dyn GitIgnoreFilter + 'a>>,
    pub error_callback: Option<Box<dyn FnMut(&Path, &io::Error) -> bool + 'a>>,
    /// `DOOFFS` leading reserved slots.
    pub offs: usize,
    /// `APPEND`: merge this call's matches into an existing result.
    pub append_to: Option<GlobResult>,
}

impl<'a> Default for GlobOptions<'a> {
    fn default() -> Self {
        Self {
            dir_func: Box::new(StdDirFunc),
            home_lookup: Box::new(EnvHomeDirLookup),
            gitignore: None,
            error_callback: None,
            offs: 0,
            append_to: None,
        }
    }
}

/// Expand `pattern` against the real filesystem, starting from the current
/// directory (or `/` for an absolute pattern), using default collaborators.
///
/// # Errors
/// Returns [`GlobError::NoMatch`] when nothing matched and `NOCHECK` was not
/// set, or [`GlobError::Aborted`] when a directory-read failure could not be
/// silently skipped.
pub fn glob(pattern: &str, flags: Flags) -> Result<GlobResult, GlobError> {
    glob_with(pattern, flags, GlobOptions::default())
}

/// As [`glob`], but with full control over directory access, home-directory
/// lookup, gitignore filtering, the per-directory error callback, the
/// `DOOFFS` reservation, and `APPEND` merging.
///
/// # Errors
/// See [`glob`].
pub fn glob_with(
    pattern: &str,
    flags: Flags,
    mut options: GlobOptions<'_>,
) -> Result<GlobResult, GlobError> {
    tracing::debug!(pattern, ?flags, "starting glob");

    let resolved = if flags.contains(Flags::TILDE) {
        let tilde_check = flags.contains(Flags::TILDE_CHECK);
        match tilde::expand_tilde(pattern, options.home_lookup.as_ref(), tilde_check) {
            Some(resolved) => resolved,
            None => {
                tracing::debug!("tilde lookup failed, falling through to no-match handling");
                return finish_empty(pattern, flags, options);
            }
        }
    } else {
        pattern.to_string()
    };

    let root = Path::new(if resolved.starts_with('/') { "/" } else { "." });
    let mut agg = ResultsAggregator::new();

    {
        let mut ctx = TraversalContext {
            flags,
            dir_func: options.dir_func.as_ref(),
            gitignore: options.gitignore.as_deref(),
            error_callback: options.error_callback.as_deref_mut(),
        };

        if flags.contains(Flags::BRACE) {
            match brace::BraceExpander::expand(&resolved) {
                BraceExpansion::SingleWalk(braced) => {
                    tracing::trace!("brace expansion chose single-walk");
                    traversal::traverse(&braced, root, &mut ctx, &mut agg)?;
                }
                BraceExpansion::Fallback(patterns) => {
                    tracing::trace!(count = patterns.len(), "brace expansion chose fallback");
                    for expanded in patterns {
                        let braced = brace::literal_components(&expanded);
                        traversal::traverse(&braced, root, &mut ctx, &mut agg)?;
                    }
                }
            }
        } else {
            let braced = brace::literal_components(&resolved);
            traversal::traverse(&braced, root, &mut ctx, &mut agg)?;
        }
    }

    if agg.is_empty() {
        return finish_empty_with(agg, pattern, flags, options);
    }

    let sort = !flags.contains(Flags::NOSORT);
    Ok(match options.append_to.take() {
        Some(existing) => agg.finalize_append(existing, sort),
        None => agg.finalize(options.offs, sort),
    })
}

/// Resolve the "no matches" outcome for a traversal that produced nothing,
/// honoring `NOCHECK` and `APPEND` (§7 "No match").
fn finish_empty_with(
    mut agg: ResultsAggregator,
    pattern: &str,
    flags: Flags,
    mut options: GlobOptions<'_>,
) -> Result<GlobResult, GlobError> {
    let nomagic_applies = flags.contains(Flags::NOMAGIC) && !agg.magic_char_seen();
    if flags.contains(Flags::NOCHECK) || nomagic_applies {
        agg.append(pattern.to_string());
        let sort = !flags.contains(Flags::NOSORT);
        return Ok(match options.append_to.take() {
            Some(existing) => agg.finalize_append(existing, sort),
            None => agg.finalize(options.offs, sort),
        });
    }
    if let Some(existing) = options.append_to.take() {
        return Ok(existing);
    }
    Err(GlobError::NoMatch)
}

/// Same as [`finish_empty_with`], for a call that never got as far as
/// running a traversal at all (tilde lookup failure).
fn finish_empty(
    pattern: &str,
    flags: Flags,
    options: GlobOptions<'_>,
) -> Result<GlobResult, GlobError> {
    finish_empty_with(ResultsAggregator::new(), pattern, flags, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("a.txt"), b"").unwrap();
        std::fs::write(dir.path().join("b.rs"), b"").unwrap();
        dir
    }

    #[test]
    fn no_match_without_nocheck_errors() {
        let dir = setup();
        let pattern = dir.path().join("nope.*").to_string_lossy().into_owned();
        let result = glob(&pattern, Flags::NONE);
        assert!(matches!(result, Err(GlobError::NoMatch)));
    }

    #[test]
    fn nocheck_returns_pattern_verbatim() {
        let dir = setup();
        let pattern = dir.path().join("nope.*").to_string_lossy().into_owned();
        let result = glob(&pattern, Flags::NOCHECK).expect("nocheck result");
        assert_eq!(result.paths(), [pattern]);
    }

    #[test]
    fn simple_extension_match() {
        let dir = setup();
        let pattern = dir.path().join("*.rs").to_string_lossy().into_owned();
        let result = glob(&pattern, Flags::NONE).expect("match");
        assert_eq!(result.pathc(), 1);
        assert!(result.paths()[0].ends_with("b.rs"));
    }

    #[test]
    fn dooffs_reserves_slots() {
        let dir = setup();
        let pattern = dir.path().join("*.rs").to_string_lossy().into_owned();
        let options = GlobOptions {
            offs: 2,
            ..GlobOptions::default()
        };
        let result = glob_with(&pattern, Flags::DOOFFS, options).expect("match");
        assert_eq!(result.offs(), 2);
        assert_eq!(result.pathv().len(), 2 + 1 + 1);
    }

    #[test]
    fn append_merges_into_existing_result() {
        let dir = setup();
        let first_pattern = dir.path().join("a.txt").to_string_lossy().into_owned();
        let first = glob(&first_pattern, Flags::NONE).expect("first match");

        let second_pattern = dir.path().join("b.rs").to_string_lossy().into_owned();
        let options = GlobOptions {
            append_to: Some(first),
            ..GlobOptions::default()
        };
        let combined = glob_with(&second_pattern, Flags::APPEND, options).expect("append match");
        assert_eq!(combined.pathc(), 2);
    }

    #[test]
    fn magchar_set_only_when_wildcard_used() {
        let dir = setup();
        let literal = dir.path().join("a.txt").to_string_lossy().into_owned();
        let literal_result = glob(&literal, Flags::NONE).expect("literal match");
        assert!(!literal_result.magic_char_seen());

        let wildcard = dir.path().join("*.txt").to_string_lossy().into_owned();
        let wildcard_result = glob(&wildcard, Flags::NONE).expect("wildcard match");
        assert!(wildcard_result.magic_char_seen());
    }
}
