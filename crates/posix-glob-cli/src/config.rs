//! `.posix-glob.toml` discovery: walk upward from a starting directory,
//! merging child-over-parent until a `root = true` config is reached or the
//! filesystem root is hit.

use std::path::Path;

use serde::Deserialize;

const CONFIG_FILENAME: &str = ".posix-glob.toml";

/// Defaults for flags the CLI would otherwise have to be told on every
/// invocation. Any field left unset in a config file falls through to the
/// next config up the tree, and finally to the CLI's own defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Stop walking upward once this config has been merged in.
    #[serde(default)]
    pub root: bool,

    pub brace: Option<bool>,
    pub tilde: Option<bool>,
    pub extglob: Option<bool>,
    pub gitignore: Option<bool>,
    pub period: Option<bool>,
    pub doublestar_recursive: Option<bool>,
    pub mark: Option<bool>,
    pub nosort: Option<bool>,
}

impl Config {
    /// Fill in any field left unset with `parent`'s value.
    fn merge_parent(&mut self, parent: Config) {
        self.brace = self.brace.or(parent.brace);
        self.tilde = self.tilde.or(parent.tilde);
        self.extglob = self.extglob.or(parent.extglob);
        self.gitignore = self.gitignore.or(parent.gitignore);
        self.period = self.period.or(parent.period);
        self.doublestar_recursive = self.doublestar_recursive.or(parent.doublestar_recursive);
        self.mark = self.mark.or(parent.mark);
        self.nosort = self.nosort.or(parent.nosort);
    }
}

/// Walk upward from `start_dir` looking for `.posix-glob.toml`, merging
/// every config found (closest wins) until one sets `root = true` or the
/// walk runs out of parent directories.
pub fn find_and_load(start_dir: &Path) -> anyhow::Result<Option<Config>> {
    let mut configs: Vec<Config> = Vec::new();
    let mut dir = start_dir.to_path_buf();

    loop {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.is_file() {
            let content = std::fs::read_to_string(&candidate)?;
            let cfg: Config = toml::from_str(&content)
                .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", candidate.display()))?;
            let is_root = cfg.root;
            configs.push(cfg);
            if is_root {
                break;
            }
        }
        if !dir.pop() {
            break;
        }
    }

    if configs.is_empty() {
        return Ok(None);
    }

    let mut merged = configs.remove(0);
    for parent in configs {
        merged.merge_parent(parent);
    }
    Ok(Some(merged))
}

/// Load config starting from the current working directory.
pub fn load() -> anyhow::Result<Config> {
    let cwd = std::env::current_dir()?;
    Ok(find_and_load(&cwd)?.unwrap_or_default())
}
