//! Concrete [`posix_glob::GitIgnoreFilter`] backed by the `ignore` crate's
//! gitignore matcher, built once from every `.gitignore` found between the
//! traversal root and the filesystem root.

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use posix_glob::GitIgnoreFilter;

pub struct IgnoreCrateFilter {
    matcher: Gitignore,
}

impl IgnoreCrateFilter {
    /// Build a matcher rooted at `root`, picking up `.gitignore` files from
    /// `root` itself and any of its ancestors.
    pub fn new(root: &Path) -> anyhow::Result<Self> {
        let mut builder = GitignoreBuilder::new(root);
        for dir in root.ancestors() {
            let candidate = dir.join(".gitignore");
            if candidate.is_file() {
                if let Some(err) = builder.add(candidate) {
                    return Err(anyhow::anyhow!(err));
                }
            }
        }
        let matcher = builder.build()?;
        Ok(Self { matcher })
    }
}

impl GitIgnoreFilter for IgnoreCrateFilter {
    fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        self.matcher.matched_path_or_any_parents(path, is_dir).is_ignore()
    }

    fn should_skip_directory(&self, path: &Path) -> bool {
        self.matcher.matched_path_or_any_parents(path, true).is_ignore()
    }
}
