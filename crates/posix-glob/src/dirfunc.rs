//! Alternate directory-access callbacks (`ALTDIRFUNC`).
//!
//! `SPEC_FULL.md` §4.6 describes this as caller-supplied
//! `opendir`/`readdir`/`closedir` callbacks; the Rust rendition collapses
//! the three into a single [`DirFunc::read_dir`] call returning the whole
//! listing, since there is no cross-call handle lifetime to manage once the
//! traversal engine just wants "the entries of this directory".

use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    Other,
}

#[derive(Debug, Clone)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
}

/// A source of directory listings. The default, [`StdDirFunc`], reads the
/// real filesystem; a caller may supply another implementation (an
/// in-memory tree, a virtual filesystem) to stand in for it.
pub trait DirFunc {
    /// # Errors
    /// Returns an error if `path` cannot be opened or read.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StdDirFunc;

impl DirFunc for StdDirFunc {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let kind = if file_type.is_symlink() {
                // `file_type()` doesn't follow the link; resolve what it
                // points at so `**` descends through symlinked directories.
                // A broken link falls back to `Symlink` rather than erroring
                // the whole listing.
                match std::fs::metadata(entry.path()) {
                    Ok(meta) if meta.is_dir() => EntryKind::Directory,
                    Ok(meta) if meta.is_file() => EntryKind::File,
                    Ok(_) => EntryKind::Other,
                    Err(_) => EntryKind::Symlink,
                }
            } else if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_file() {
                EntryKind::File
            } else {
                EntryKind::Other
            };
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_real_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("a.txt"), b"").expect("write");
        std::fs::create_dir(dir.path().join("sub")).expect("mkdir");

        let entries = StdDirFunc.read_dir(dir.path()).expect("read_dir");
        let mut names: Vec<_> = entries.iter().map(|e| e.name.clone()).collect();
        names.sort();
        assert_eq!(names, ["a.txt", "sub"]);

        let sub_kind = entries
            .iter()
            .find(|e| e.name == "sub")
            .map(|e| e.kind)
            .expect("sub entry present");
        assert_eq!(sub_kind, EntryKind::Directory);
    }

    #[test]
    #[cfg(unix)]
    fn symlinked_directory_resolves_as_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("real")).expect("mkdir");
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link"))
            .expect("symlink");

        let entries = StdDirFunc.read_dir(dir.path()).expect("read_dir");
        let link_kind = entries
            .iter()
            .find(|e| e.name == "link")
            .map(|e| e.kind)
            .expect("link entry present");
        assert_eq!(link_kind, EntryKind::Directory);
    }

    #[test]
    #[cfg(unix)]
    fn broken_symlink_falls_back_to_symlink_kind() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::os::unix::fs::symlink(dir.path().join("nope"), dir.path().join("dangling"))
            .expect("symlink");

        let entries = StdDirFunc.read_dir(dir.path()).expect("read_dir");
        let kind = entries
            .iter()
            .find(|e| e.name == "dangling")
            .map(|e| e.kind)
            .expect("dangling entry present");
        assert_eq!(kind, EntryKind::Symlink);
    }

    #[test]
    fn missing_directory_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope");
        assert!(StdDirFunc.read_dir(&missing).is_err());
    }
}
