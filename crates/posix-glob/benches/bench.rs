#![allow(clippy::unwrap_used)]

use criterion::{Criterion, criterion_group, criterion_main};
use posix_glob::{Flags, PathMatcher};

/// Builds a small fixed tree once per benchmark run: a handful of files at
/// the top level plus a nested `src/**` subtree, wide and deep enough to
/// exercise the recursive traversal's directory-pruning and depth-first
/// descent without ballooning bench runtime.
fn fixture() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("src/nested/deep")).unwrap();
    for i in 0..20 {
        std::fs::write(dir.path().join(format!("file{i}.rs")), b"").unwrap();
    }
    for i in 0..20 {
        std::fs::write(dir.path().join(format!("src/mod{i}.rs")), b"").unwrap();
    }
    for i in 0..20 {
        std::fs::write(dir.path().join(format!("src/nested/deep/leaf{i}.rs")), b"").unwrap();
    }
    dir
}

fn bench_single_dir_scan(c: &mut Criterion) {
    let dir = fixture();
    let pattern = dir.path().join("*.rs").to_string_lossy().into_owned();

    c.bench_function("posix_glob_single_dir_scan", |b| {
        b.iter(|| posix_glob::glob(&pattern, Flags::NONE).unwrap());
    });
}

fn bench_recursive_doublestar(c: &mut Criterion) {
    let dir = fixture();
    let pattern = dir.path().join("**/*.rs").to_string_lossy().into_owned();

    c.bench_function("posix_glob_recursive_doublestar", |b| {
        b.iter(|| posix_glob::glob(&pattern, Flags::DOUBLESTAR_RECURSIVE).unwrap());
    });
}

fn bench_glob_crate_recursive(c: &mut Criterion) {
    let dir = fixture();
    let pattern = dir.path().join("**/*.rs").to_string_lossy().into_owned();

    c.bench_function("glob_crate_recursive", |b| {
        b.iter(|| glob::glob(&pattern).unwrap().count());
    });
}

fn bench_path_matcher(c: &mut Criterion) {
    let paths: Vec<String> = (0..200)
        .map(|i| format!("src/nested/deep/leaf{i}.rs"))
        .collect();
    let matcher = PathMatcher::new("src/**/*.rs", Flags::DOUBLESTAR_RECURSIVE);

    c.bench_function("posix_glob_path_matcher_filter", |b| {
        b.iter(|| matcher.filter(paths.iter().map(String::as_str)).len());
    });
}

criterion_group!(
    benches,
    bench_single_dir_scan,
    bench_recursive_doublestar,
    bench_glob_crate_recursive,
    bench_path_matcher,
);
criterion_main!(benches);
