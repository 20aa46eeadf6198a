//! Core traversal engine (`SPEC_FULL.md` §4.6): dispatches a brace-resolved
//! pattern to the cheapest applicable strategy and walks the filesystem (or
//! a caller's [`DirFunc`]), applying hidden-file, `MARK`, directories-only,
//! `ONLYDIR`, and gitignore rules as it accumulates matches.

use std::io;
use std::path::Path;

use crate::aggregator::ResultsAggregator;
use crate::brace::BracedPattern;
use crate::dirfunc::{DirEntry, DirFunc, EntryKind};
use crate::error::GlobError;
use crate::flags::Flags;
use crate::gitignore::GitIgnoreFilter;

/// Recursive `**` traversal gives up silently past this many directory
/// levels below the starting root (§4.6 "Depth cap").
const MAX_RECURSION_DEPTH: usize = 100;

/// Everything a traversal needs beyond the pattern itself: flags, the
/// directory-access strategy, an optional gitignore filter, and an
/// optional error callback for per-directory I/O failures.
pub struct TraversalContext<'a> {
    pub flags: Flags,
    pub dir_func: &'a dyn DirFunc,
    pub gitignore: Option<&'a dyn GitIgnoreFilter>,
    pub error_callback: Option<&'a mut dyn FnMut(&Path, &io::Error) -> bool>,
}

impl TraversalContext<'_> {
    fn extglob(&self) -> bool {
        self.flags.contains(Flags::EXTGLOB)
    }

    fn escapes(&self) -> bool {
        !self.flags.contains(Flags::NOESCAPE)
    }

    fn period(&self) -> bool {
        self.flags.contains(Flags::PERIOD)
    }

    fn onlydir(&self) -> bool {
        self.flags.contains(Flags::ONLYDIR)
    }

    fn mark(&self) -> bool {
        self.flags.contains(Flags::MARK)
    }

    fn hidden_excluded(&self, name: &str, allow_dot: bool) -> bool {
        name.starts_with('.') && !self.period() && !allow_dot
    }

    fn passes_kind_filters(&self, kind: EntryKind) -> bool {
        !self.onlydir() || kind == EntryKind::Directory
    }

    /// Reads a directory's entries, routing any failure through the error
    /// callback. `Ok(None)` means "skip this directory, not an error";
    /// `Err` means the whole call aborts.
    fn read_dir(&mut self, dir: &Path) -> Result<Option<Vec<DirEntry>>, GlobError> {
        match self.dir_func.read_dir(dir) {
            Ok(entries) => Ok(Some(entries)),
            Err(source) => {
                let mut aborted = self.flags.contains(Flags::ERR);
                if let Some(cb) = &mut self.error_callback {
                    aborted = cb(dir, &source) || aborted;
                }
                if aborted {
                    Err(GlobError::Aborted {
                        path: dir.to_path_buf(),
                        source,
                    })
                } else {
                    Ok(None)
                }
            }
        }
    }

    fn emit(&self, agg: &mut ResultsAggregator, path: &Path, is_dir: bool) {
        if let Some(gi) = self.gitignore
            && gi.is_ignored(path, is_dir)
        {
            return;
        }
        let mut s = path.to_string_lossy().into_owned();
        if self.mark() && is_dir && !s.ends_with('/') {
            s.push('/');
        }
        agg.append(s);
    }
}

/// Walk `root` under `pattern`, accumulating matches into `agg`.
pub fn traverse(
    pattern: &BracedPattern,
    root: &Path,
    ctx: &mut TraversalContext<'_>,
    agg: &mut ResultsAggregator,
) -> Result<(), GlobError> {
    let components = pattern.components();
    let escapes = ctx.escapes();

    if components.iter().any(|c| !c.is_literal(escapes)) {
        agg.note_magic_char();
    }

    if components.is_empty() {
        // The pattern reduced to just the root itself (e.g. "/" or ".").
        return literal_stat(pattern, root, ctx, agg);
    }

    if !pattern.has_recursive() && components.iter().all(|c| c.is_literal(escapes)) {
        return literal_stat(pattern, root, ctx, agg);
    }

    walk_components(pattern, root, 0, 0, ctx, agg)
}

/// Resolve a pattern with no wildcards, brackets, braces, or extglob: a
/// single directory listing (through `dir_func`, so `ALTDIRFUNC` applies
/// here too) to find the last component and test its kind, rather than a
/// direct filesystem stat.
fn literal_stat(
    pattern: &BracedPattern,
    root: &Path,
    ctx: &mut TraversalContext<'_>,
    agg: &mut ResultsAggregator,
) -> Result<(), GlobError> {
    let components = pattern.components();
    let Some((last, parent_components)) = components.split_last() else {
        // Only "/" itself reduces to zero components.
        if ctx.read_dir(root)?.is_some() {
            ctx.emit(agg, root, true);
        }
        return Ok(());
    };

    let mut parent = root.to_path_buf();
    for component in parent_components {
        parent.push(component.text());
    }
    let name = last.text();

    let Some(entries) = ctx.read_dir(&parent)? else {
        return Ok(());
    };
    let Some(entry) = entries.iter().find(|e| e.name == name) else {
        return Ok(());
    };
    let is_dir = entry.kind == EntryKind::Directory;
    if (pattern.directories_only() || ctx.onlydir()) && !is_dir {
        return Ok(());
    }
    ctx.emit(agg, &parent.join(name), is_dir);
    Ok(())
}

fn walk_components(
    pattern: &BracedPattern,
    dir: &Path,
    idx: usize,
    depth: usize,
    ctx: &mut TraversalContext<'_>,
    agg: &mut ResultsAggregator,
) -> Result<(), GlobError> {
    let components = pattern.components();
    let comp = &components[idx];

    if comp.is_doublestar() && ctx.flags.contains(Flags::DOUBLESTAR_RECURSIVE) {
        return walk_doublestar(pattern, dir, idx, depth, ctx, agg);
    }

    let Some(mut entries) = ctx.read_dir(dir)? else {
        return Ok(());
    };
    let is_last = comp.is_last();

    // POSIX dotfile rule (§4.6): `.` and `..` are never produced by a real
    // directory listing, but a component that explicitly starts with `.`
    // (including the literal components "." and "..") is allowed to match
    // them, so they're synthesized here rather than by `DirFunc`.
    if comp.starts_with_dot() {
        entries.push(DirEntry {
            name: ".".to_string(),
            kind: EntryKind::Directory,
        });
        entries.push(DirEntry {
            name: "..".to_string(),
            kind: EntryKind::Directory,
        });
    }

    for entry in entries {
        if ctx.hidden_excluded(&entry.name, comp.starts_with_dot()) {
            continue;
        }
        if !comp.matches(&entry.name, ctx.extglob(), ctx.escapes()) {
            continue;
        }
        let child = dir.join(&entry.name);
        let is_dir = entry.kind == EntryKind::Directory;

        if is_last {
            if pattern.directories_only() && !is_dir {
                continue;
            }
            if !ctx.passes_kind_filters(entry.kind) {
                continue;
            }
            ctx.emit(agg, &child, is_dir);
        } else {
            if !is_dir || depth + 1 > MAX_RECURSION_DEPTH {
                continue;
            }
            if let Some(gi) = ctx.gitignore
                && gi.should_skip_directory(&child)
            {
                continue;
            }
            walk_components(pattern, &child, idx + 1, depth + 1, ctx, agg)?;
        }
    }
    Ok(())
}

/// `idx` names the `**` component. Tries the zero-segment match first, then
/// recurses into every subdirectory, still looking for the pattern that
/// follows `**` at each depth.
fn walk_doublestar(
    pattern: &BracedPattern,
    dir: &Path,
    idx: usize,
    depth: usize,
    ctx: &mut TraversalContext<'_>,
    agg: &mut ResultsAggregator,
) -> Result<(), GlobError> {
    let components = pattern.components();
    if idx + 1 == components.len() {
        return emit_recursive_all(pattern, dir, depth, ctx, agg);
    }

    walk_components(pattern, dir, idx + 1, depth, ctx, agg)?;

    if depth >= MAX_RECURSION_DEPTH {
        return Ok(());
    }
    let Some(entries) = ctx.read_dir(dir)? else {
        return Ok(());
    };
    for entry in entries {
        if entry.kind != EntryKind::Directory {
            continue;
        }
        if ctx.hidden_excluded(&entry.name, false) {
            continue;
        }
        let child = dir.join(&entry.name);
        if let Some(gi) = ctx.gitignore
            && gi.should_skip_directory(&child)
        {
            continue;
        }
        walk_doublestar(pattern, &child, idx, depth + 1, ctx, agg)?;
    }
    Ok(())
}

/// A trailing `**` with nothing after it: every descendant, file or
/// directory, is a match.
fn emit_recursive_all(
    pattern: &BracedPattern,
    dir: &Path,
    depth: usize,
    ctx: &mut TraversalContext<'_>,
    agg: &mut ResultsAggregator,
) -> Result<(), GlobError> {
    if depth >= MAX_RECURSION_DEPTH {
        return Ok(());
    }
    let Some(entries) = ctx.read_dir(dir)? else {
        return Ok(());
    };
    for entry in entries {
        if ctx.hidden_excluded(&entry.name, false) {
            continue;
        }
        let child = dir.join(&entry.name);
        let is_dir = entry.kind == EntryKind::Directory;
        if pattern.directories_only() && !is_dir {
            continue;
        }
        if !ctx.passes_kind_filters(entry.kind) {
            continue;
        }
        ctx.emit(agg, &child, is_dir);
        if is_dir {
            if let Some(gi) = ctx.gitignore
                && gi.should_skip_directory(&child)
            {
                continue;
            }
            emit_recursive_all(pattern, &child, depth + 1, ctx, agg)?;
        }
    }
    Ok(())
}
