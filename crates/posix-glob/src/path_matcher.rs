//! The in-memory variant (`SPEC_FULL.md` §2 `PathMatcher`): the same
//! pattern engine driven over a caller-supplied path list instead of a live
//! filesystem, with a required-last-byte pre-filter ahead of the full
//! fnmatch call.

use crate::brace::{BraceExpander, BraceExpansion, BracedPattern, is_extglob};
use crate::flags::Flags;

const MAX_EXPANSIONS: usize = 4096;

/// Matches a single (possibly brace-alternated) pattern against whole path
/// strings, without touching the filesystem.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    patterns: Vec<String>,
    required_last_chars: Vec<Option<u8>>,
    extglob: bool,
    escapes: bool,
}

impl PathMatcher {
    #[must_use]
    pub fn new(pattern: &str, flags: Flags) -> Self {
        let mut patterns = if flags.contains(Flags::BRACE) {
            match BraceExpander::expand(pattern) {
                BraceExpansion::Fallback(v) => v,
                BraceExpansion::SingleWalk(p) => flatten(&p),
            }
        } else {
            vec![pattern.to_string()]
        };
        if !flags.contains(Flags::DOUBLESTAR_RECURSIVE) {
            for p in &mut patterns {
                *p = degrade_doublestar(p);
            }
        }
        let extglob = flags.contains(Flags::EXTGLOB);
        let required_last_chars = patterns
            .iter()
            .map(|p| {
                if extglob && is_extglob(p) {
                    // An extglob construct's closing `)` is not a literal
                    // required last byte -- the group can match any of its
                    // alternatives, so the pre-filter must be skipped.
                    None
                } else {
                    glob_matcher::PatternContext::new(p.as_bytes()).required_last_char()
                }
            })
            .collect();

        Self {
            patterns,
            required_last_chars,
            extglob,
            escapes: !flags.contains(Flags::NOESCAPE),
        }
    }

    /// Test a single candidate path against the (possibly multi-alternative)
    /// pattern this matcher was built from.
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        let last_byte = path.as_bytes().last().copied();
        self.patterns
            .iter()
            .zip(&self.required_last_chars)
            .any(|(pattern, required)| {
                if let Some(required) = required
                    && last_byte != Some(*required)
                {
                    return false;
                }
                if self.extglob && is_extglob(pattern) {
                    glob_matcher::glob_match_extglob_opts(pattern, path, !self.escapes)
                } else {
                    glob_matcher::glob_match_opts(pattern, path, !self.escapes)
                }
            })
    }

    /// Filter a caller-supplied path list down to the matching subset,
    /// preserving input order.
    #[must_use]
    pub fn filter<'p>(&self, paths: impl IntoIterator<Item = &'p str>) -> Vec<&'p str> {
        paths.into_iter().filter(|p| self.is_match(p)).collect()
    }
}

/// Without `DOUBLESTAR_RECURSIVE`, `**` is just an ordinary wildcard
/// component, same as `traversal.rs`'s non-recursive path: replace each
/// standalone `/`-delimited `**` with `*` so it no longer crosses
/// directory boundaries.
fn degrade_doublestar(pattern: &str) -> String {
    pattern
        .split('/')
        .map(|part| if part == "**" { "*" } else { part })
        .collect::<Vec<_>>()
        .join("/")
}

fn flatten(pattern: &BracedPattern) -> Vec<String> {
    let mut results = vec![String::new()];
    for (i, component) in pattern.components().iter().enumerate() {
        let pieces: Vec<String> = match component.alternatives() {
            Some(alts) => alts.to_vec(),
            None => vec![component.text().to_string()],
        };
        let mut next = Vec::with_capacity((results.len() * pieces.len().max(1)).min(MAX_EXPANSIONS));
        'outer: for r in &results {
            for p in &pieces {
                let mut s = r.clone();
                if i > 0 {
                    s.push('/');
                }
                s.push_str(p);
                next.push(s);
                if next.len() >= MAX_EXPANSIONS {
                    break 'outer;
                }
            }
        }
        results = next;
    }
    if pattern.is_absolute() {
        for s in &mut results {
            *s = format!("/{s}");
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_simple_extension() {
        let m = PathMatcher::new("*.rs", Flags::NONE);
        assert!(m.is_match("main.rs"));
        assert!(!m.is_match("main.toml"));
        assert!(!m.is_match("src/main.rs"));
    }

    #[test]
    fn matches_recursive_pattern() {
        let m = PathMatcher::new("src/**/*.rs", Flags::DOUBLESTAR_RECURSIVE);
        assert!(m.is_match("src/a/b/main.rs"));
        assert!(!m.is_match("lib/main.rs"));
    }

    #[test]
    fn doublestar_without_flag_does_not_cross_directories() {
        let m = PathMatcher::new("src/**/*.rs", Flags::NONE);
        assert!(!m.is_match("src/a/b/main.rs"));
        assert!(m.is_match("src/a/main.rs"));
    }

    #[test]
    fn brace_alternatives_match_either_branch() {
        let m = PathMatcher::new("*.{rs,toml}", Flags::BRACE);
        assert!(m.is_match("main.rs"));
        assert!(m.is_match("Cargo.toml"));
        assert!(!m.is_match("main.js"));
    }

    #[test]
    fn brace_disabled_treats_braces_literally() {
        let m = PathMatcher::new("*.{rs,toml}", Flags::NONE);
        assert!(!m.is_match("main.rs"));
    }

    #[test]
    fn filter_preserves_order() {
        let m = PathMatcher::new("*.rs", Flags::NONE);
        let candidates = ["b.rs", "a.toml", "a.rs"];
        assert_eq!(m.filter(candidates), ["b.rs", "a.rs"]);
    }

    #[test]
    fn extglob_pattern_matches() {
        let m = PathMatcher::new("file.+(txt|md)", Flags::EXTGLOB);
        assert!(m.is_match("file.txt"));
        assert!(m.is_match("file.md"));
        assert!(!m.is_match("file.rs"));
    }
}
