#![doc = include_str!("../README.md")]

use std::process::ExitCode;

use bpaf::Bpaf;
use posix_glob::{Flags, GlobError, GlobOptions};
use tracing_subscriber::prelude::*;

mod config;
mod gitignore_filter;

#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version, fallback_to_usage, generate(cli))]
/// Expand POSIX-style glob patterns against the filesystem
struct CLI {
    /// Emit trace-level diagnostics to stderr
    #[bpaf(long("verbose"), switch)]
    verbose: bool,

    /// Disable brace expansion (`{a,b}`)
    #[bpaf(long("no-brace"), switch)]
    no_brace: bool,

    /// Disable `~`/`~user` expansion
    #[bpaf(long("no-tilde"), switch)]
    no_tilde: bool,

    /// Enable extglob syntax (`@(...)`, `+(...)`, `*(...)`, `?(...)`, `!(...)`)
    #[bpaf(long("extglob"), switch)]
    extglob: bool,

    /// Treat `**` as matching across directory boundaries
    #[bpaf(long("globstar"), switch)]
    globstar: bool,

    /// Prune paths matched by `.gitignore`
    #[bpaf(long("gitignore"), switch)]
    gitignore: bool,

    /// Match leading dots in filenames with `*`/`?`
    #[bpaf(long("period"), switch)]
    period: bool,

    /// Append a trailing `/` to matched directories
    #[bpaf(long("mark"), switch)]
    mark: bool,

    /// Leave matches in traversal order instead of sorting
    #[bpaf(long("no-sort"), switch)]
    no_sort: bool,

    /// Abort instead of silently skipping unreadable directories
    #[bpaf(long("err"), switch)]
    err_on_read_failure: bool,

    /// Return the literal pattern instead of failing when nothing matches
    #[bpaf(long("nocheck"), switch)]
    nocheck: bool,

    /// The patterns to expand
    #[bpaf(positional("PATTERN"))]
    patterns: Vec<String>,
}

/// Merge config-file defaults under CLI-flag overrides: a flag the user
/// actually passed always wins, an unset flag falls back to config.
fn resolve_flags(cli: &CLI, cfg: &config::Config) -> Flags {
    let mut flags = Flags::NONE;

    if cli.err_on_read_failure {
        flags |= Flags::ERR;
    }
    if cli.mark || cfg.mark == Some(true) {
        flags |= Flags::MARK;
    }
    if cli.no_sort || cfg.nosort == Some(true) {
        flags |= Flags::NOSORT;
    }
    if cli.nocheck {
        flags |= Flags::NOCHECK;
    }
    if cli.period || cfg.period == Some(true) {
        flags |= Flags::PERIOD;
    }
    if !cli.no_brace && cfg.brace != Some(false) {
        flags |= Flags::BRACE;
    }
    if !cli.no_tilde && cfg.tilde != Some(false) {
        flags |= Flags::TILDE;
    }
    if cli.gitignore || cfg.gitignore == Some(true) {
        flags |= Flags::GITIGNORE;
    }
    if cli.globstar || cfg.doublestar_recursive == Some(true) {
        flags |= Flags::DOUBLESTAR_RECURSIVE;
    }
    if cli.extglob || cfg.extglob == Some(true) {
        flags |= Flags::EXTGLOB;
    }

    flags
}

fn setup_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        match tracing_subscriber::EnvFilter::try_from_env("POSIX_GLOB_LOG") {
            Ok(f) => f,
            Err(_) => return,
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_tree::HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true)
                .with_indent_lines(true)
                .with_timer(tracing_tree::time::Uptime::default())
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let opts = cli().run();
    setup_tracing(opts.verbose);

    let cfg = match config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("error loading config: {e:#}");
            return ExitCode::from(2);
        }
    };
    let flags = resolve_flags(&opts, &cfg);

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };

    if opts.patterns.is_empty() {
        eprintln!("posix-glob: no patterns given");
        return ExitCode::from(2);
    }

    let mut had_errors = false;
    let mut result = None;
    for pattern in &opts.patterns {
        let gitignore = if flags.contains(Flags::GITIGNORE) {
            match gitignore_filter::IgnoreCrateFilter::new(&cwd) {
                Ok(f) => Some(Box::new(f) as Box<dyn posix_glob::GitIgnoreFilter>),
                Err(e) => {
                    eprintln!("error building gitignore matcher: {e:#}");
                    return ExitCode::from(2);
                }
            }
        } else {
            None
        };

        let options = GlobOptions {
            gitignore,
            append_to: result.take(),
            ..GlobOptions::default()
        };

        match posix_glob::glob_with(pattern, flags, options) {
            Ok(r) => result = Some(r),
            Err(GlobError::NoMatch) => {
                had_errors = true;
                eprintln!("posix-glob: no matches for {pattern}");
            }
            Err(GlobError::Aborted { path, source }) => {
                had_errors = true;
                eprintln!("posix-glob: aborted reading {}: {source}", path.display());
            }
        }
    }

    if let Some(result) = result {
        for path in result.paths() {
            println!("{path}");
        }
    }

    if had_errors {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
