//! Extglob matching: `?(...)  *(...)  +(...)  @(...)  !(...)`.
//!
//! Layered on top of the base [`crate::glob_match`] kernel rather than
//! replacing it: a pattern is split into a flat run of literal/wildcard
//! segments and extglob groups (one level deep -- an alternative's own text
//! may contain `*`, `?`, `[...]` but not a nested extglob group), and the
//! segments are matched against the candidate with backtracking. `+()` and
//! `*()` use a visited-position set to avoid re-exploring the same split
//! point twice, which keeps matching linear in the candidate length instead
//! of exponential.

use alloc::vec::Vec;

const MAX_ALTERNATIVES: usize = 32;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum GroupKind {
    /// `?(...)` -- zero or one.
    ZeroOrOne,
    /// `*(...)` -- zero or more.
    ZeroOrMore,
    /// `+(...)` -- one or more.
    OneOrMore,
    /// `@(...)` -- exactly one.
    ExactlyOne,
    /// `!(...)` -- anything that isn't one of the alternatives.
    Not,
}

enum Atom<'a> {
    Literal(&'a [u8]),
    Group {
        kind: GroupKind,
        alternatives: Vec<&'a [u8]>,
    },
}

/// Match `path` against `pattern`, honoring extglob constructs. Falls back to
/// the plain fnmatch kernel for the literal segments between groups.
#[must_use]
pub fn glob_match_extglob(pattern: &str, path: &str) -> bool {
    glob_match_extglob_opts(pattern, path, false)
}

/// As [`glob_match_extglob`], but when `no_escape` is set, `\` is an
/// ordinary character rather than an escape introducer (the `NOESCAPE`
/// flag) in both the group syntax and the literal segments between groups.
#[must_use]
pub fn glob_match_extglob_opts(pattern: &str, path: &str, no_escape: bool) -> bool {
    let atoms = parse_atoms(pattern.as_bytes(), no_escape);
    match_atoms(&atoms, 0, path.as_bytes(), 0, no_escape)
}

fn parse_atoms(pattern: &[u8], no_escape: bool) -> Vec<Atom<'_>> {
    let mut atoms = Vec::new();
    let mut i = 0;
    let mut lit_start = 0;
    while i < pattern.len() {
        let kind = match pattern[i] {
            b'?' => Some(GroupKind::ZeroOrOne),
            b'*' => Some(GroupKind::ZeroOrMore),
            b'+' => Some(GroupKind::OneOrMore),
            b'@' => Some(GroupKind::ExactlyOne),
            b'!' => Some(GroupKind::Not),
            _ => None,
        };
        if let Some(kind) = kind {
            if pattern.get(i + 1) == Some(&b'(') {
                if lit_start < i {
                    atoms.push(Atom::Literal(&pattern[lit_start..i]));
                }
                let (alternatives, end) = parse_group(pattern, i + 2, no_escape);
                atoms.push(Atom::Group { kind, alternatives });
                i = end;
                lit_start = i;
                continue;
            }
        }
        if !no_escape && pattern[i] == b'\\' && i + 1 < pattern.len() {
            i += 1;
        }
        i += 1;
    }
    if lit_start < pattern.len() {
        atoms.push(Atom::Literal(&pattern[lit_start..]));
    }
    atoms
}

/// `pattern[start..]` is the content immediately after a group's opening
/// `(`. Returns the `|`-split alternatives (capped at 32, extras dropped)
/// and the index just past the closing `)`.
fn parse_group(pattern: &[u8], start: usize, no_escape: bool) -> (Vec<&[u8]>, usize) {
    let mut alternatives = Vec::new();
    let mut depth = 0u32;
    let mut seg_start = start;
    let mut i = start;
    while i < pattern.len() {
        match pattern[i] {
            b'(' => depth += 1,
            b')' if depth == 0 => {
                if alternatives.len() < MAX_ALTERNATIVES {
                    alternatives.push(&pattern[seg_start..i]);
                }
                return (alternatives, i + 1);
            }
            b')' => depth -= 1,
            b'|' if depth == 0 => {
                if alternatives.len() < MAX_ALTERNATIVES {
                    alternatives.push(&pattern[seg_start..i]);
                }
                seg_start = i + 1;
            }
            b'\\' if !no_escape && i + 1 < pattern.len() => i += 1,
            _ => {}
        }
        i += 1;
    }
    // Unterminated group: treat the remainder as a single alternative.
    if alternatives.len() < MAX_ALTERNATIVES {
        alternatives.push(&pattern[seg_start..]);
    }
    (alternatives, pattern.len())
}

fn core_match(pattern: &[u8], candidate: &[u8], no_escape: bool) -> bool {
    match (core::str::from_utf8(pattern), core::str::from_utf8(candidate)) {
        (Ok(p), Ok(c)) => crate::glob_match_opts(p, c, no_escape),
        _ => pattern == candidate,
    }
}

fn match_atoms(atoms: &[Atom<'_>], ai: usize, path: &[u8], pi: usize, no_escape: bool) -> bool {
    let Some(atom) = atoms.get(ai) else {
        return pi == path.len();
    };
    match atom {
        Atom::Literal(seg) => {
            if !seg.iter().any(|&b| matches!(b, b'*' | b'?' | b'[')) {
                let end = pi + seg.len();
                if end <= path.len() && &path[pi..end] == *seg {
                    return match_atoms(atoms, ai + 1, path, end, no_escape);
                }
                return false;
            }
            for end in pi..=path.len() {
                if core_match(seg, &path[pi..end], no_escape)
                    && match_atoms(atoms, ai + 1, path, end, no_escape)
                {
                    return true;
                }
            }
            false
        }
        Atom::Group {
            kind: GroupKind::Not,
            alternatives,
        } => {
            for end in pi..=path.len() {
                let excluded = alternatives
                    .iter()
                    .any(|alt| core_match(alt, &path[pi..end], no_escape));
                if !excluded && match_atoms(atoms, ai + 1, path, end, no_escape) {
                    return true;
                }
            }
            false
        }
        Atom::Group {
            kind: GroupKind::ZeroOrOne,
            alternatives,
        } => {
            if match_atoms(atoms, ai + 1, path, pi, no_escape) {
                return true;
            }
            one_rep_ends(alternatives, path, pi, no_escape)
                .into_iter()
                .any(|end| match_atoms(atoms, ai + 1, path, end, no_escape))
        }
        Atom::Group {
            kind: GroupKind::ExactlyOne,
            alternatives,
        } => one_rep_ends(alternatives, path, pi, no_escape)
            .into_iter()
            .any(|end| match_atoms(atoms, ai + 1, path, end, no_escape)),
        Atom::Group {
            kind: GroupKind::ZeroOrMore,
            alternatives,
        } => {
            let reachable = reachable_positions(alternatives, path, &[pi], no_escape);
            reachable
                .into_iter()
                .any(|end| match_atoms(atoms, ai + 1, path, end, no_escape))
        }
        Atom::Group {
            kind: GroupKind::OneOrMore,
            alternatives,
        } => {
            let seeds = one_rep_ends(alternatives, path, pi, no_escape);
            let reachable = reachable_positions(alternatives, path, &seeds, no_escape);
            reachable
                .into_iter()
                .any(|end| match_atoms(atoms, ai + 1, path, end, no_escape))
        }
    }
}

fn one_rep_ends(alternatives: &[&[u8]], path: &[u8], pi: usize, no_escape: bool) -> Vec<usize> {
    let mut ends = Vec::new();
    for end in pi..=path.len() {
        if alternatives.iter().any(|alt| core_match(alt, &path[pi..end], no_escape)) {
            ends.push(end);
        }
    }
    ends
}

/// Every position reachable from `seeds` by repeatedly matching one of the
/// alternatives, visited at most once each -- the memoization that keeps
/// `+()`/`*()` from re-exploring the same split point exponentially.
fn reachable_positions(
    alternatives: &[&[u8]],
    path: &[u8],
    seeds: &[usize],
    no_escape: bool,
) -> Vec<usize> {
    let mut visited = alloc::vec![false; path.len() + 1];
    let mut frontier: Vec<usize> = Vec::new();
    let mut out = Vec::new();
    for &s in seeds {
        if !visited[s] {
            visited[s] = true;
            frontier.push(s);
            out.push(s);
        }
    }
    let mut head = 0;
    while head < frontier.len() {
        let p = frontier[head];
        head += 1;
        for end in p..=path.len() {
            if !visited[end]
                && alternatives
                    .iter()
                    .any(|alt| core_match(alt, &path[p..end], no_escape))
            {
                visited[end] = true;
                frontier.push(end);
                out.push(end);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_group() {
        assert!(glob_match_extglob("*.!(js)", "foo.css"));
        assert!(glob_match_extglob("*.!(js)", "foo.ts"));
        assert!(!glob_match_extglob("*.!(js)", "foo.js"));
    }

    #[test]
    fn exactly_one() {
        assert!(glob_match_extglob("@(foo|bar).txt", "foo.txt"));
        assert!(glob_match_extglob("@(foo|bar).txt", "bar.txt"));
        assert!(!glob_match_extglob("@(foo|bar).txt", "baz.txt"));
    }

    #[test]
    fn zero_or_one() {
        assert!(glob_match_extglob("foo?(bar).txt", "foo.txt"));
        assert!(glob_match_extglob("foo?(bar).txt", "foobar.txt"));
        assert!(!glob_match_extglob("foo?(bar).txt", "foobarbar.txt"));
    }

    #[test]
    fn zero_or_more() {
        assert!(glob_match_extglob("foo*(bar).txt", "foo.txt"));
        assert!(glob_match_extglob("foo*(bar).txt", "foobar.txt"));
        assert!(glob_match_extglob("foo*(bar).txt", "foobarbarbar.txt"));
    }

    #[test]
    fn one_or_more() {
        assert!(!glob_match_extglob("foo+(bar).txt", "foo.txt"));
        assert!(glob_match_extglob("foo+(bar).txt", "foobar.txt"));
        assert!(glob_match_extglob("foo+(bar).txt", "foobarbarbar.txt"));
    }

    #[test]
    fn plus_terminates_on_long_input() {
        let path = "a".repeat(1024);
        assert!(glob_match_extglob("+(a)", &path));
    }

    #[test]
    fn alternatives_capped_at_32() {
        let many: Vec<String> = (0..40).map(|i| format!("opt{i}")).collect();
        let pattern = alloc::format!("@({})", many.join("|"));
        // The 33rd+ alternatives are dropped, so they never match.
        assert!(!glob_match_extglob(&pattern, "opt35"));
        assert!(glob_match_extglob(&pattern, "opt5"));
    }
}
