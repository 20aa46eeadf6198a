//! `~` and `~user` expansion.
//!
//! The home-directory lookup itself is an external collaborator (per
//! `SPEC_FULL.md`'s out-of-scope list) consumed through [`HomeDirLookup`];
//! the default implementation only resolves the *current* user via `$HOME`.
//! Resolving `~user` for an arbitrary user would need a `getpwnam`-style
//! system call with no `std` equivalent, so [`EnvHomeDirLookup`] returns
//! `None` for it rather than pulling in a new dependency for one lookup.

pub trait HomeDirLookup {
    /// `user` is `None` for a bare `~`, `Some(name)` for `~name`.
    fn home_dir(&self, user: Option<&str>) -> Option<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EnvHomeDirLookup;

impl HomeDirLookup for EnvHomeDirLookup {
    fn home_dir(&self, user: Option<&str>) -> Option<String> {
        match user {
            None => std::env::var("HOME").ok(),
            Some(_) => None,
        }
    }
}

/// Rewrite a leading `~` or `~user` in `pattern` using `lookup`.
///
/// Returns `None` when the lookup fails and `tilde_check` is set (the
/// pattern should yield no matches); returns the pattern unchanged when the
/// lookup fails and `tilde_check` is not set (the literal `~` is
/// preserved); returns `Some(pattern)` untouched when it doesn't start with
/// `~` at all.
#[must_use]
pub fn expand_tilde(pattern: &str, lookup: &dyn HomeDirLookup, tilde_check: bool) -> Option<String> {
    if !pattern.starts_with('~') {
        return Some(pattern.to_string());
    }
    let rest = &pattern[1..];
    let (user, tail) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };
    let user = (!user.is_empty()).then_some(user);

    match lookup.home_dir(user) {
        Some(home) => Some(format!("{home}{tail}")),
        None if tilde_check => None,
        None => Some(pattern.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeLookup;
    impl HomeDirLookup for FakeLookup {
        fn home_dir(&self, user: Option<&str>) -> Option<String> {
            match user {
                None => Some("/home/alice".to_string()),
                Some("bob") => Some("/home/bob".to_string()),
                Some(_) => None,
            }
        }
    }

    #[test]
    fn bare_tilde_expands_to_home() {
        assert_eq!(
            expand_tilde("~/src", &FakeLookup, false).as_deref(),
            Some("/home/alice/src")
        );
    }

    #[test]
    fn named_user_expands() {
        assert_eq!(
            expand_tilde("~bob/docs", &FakeLookup, false).as_deref(),
            Some("/home/bob/docs")
        );
    }

    #[test]
    fn unknown_user_without_check_keeps_literal() {
        assert_eq!(
            expand_tilde("~carol/docs", &FakeLookup, false).as_deref(),
            Some("~carol/docs")
        );
    }

    #[test]
    fn unknown_user_with_check_fails() {
        assert_eq!(expand_tilde("~carol/docs", &FakeLookup, true), None);
    }

    #[test]
    fn non_tilde_pattern_is_unchanged() {
        assert_eq!(
            expand_tilde("src/*.rs", &FakeLookup, true).as_deref(),
            Some("src/*.rs")
        );
    }

    #[test]
    fn env_lookup_reads_home_var() {
        // SAFETY: test runs single-threaded within this process's test
        // harness; no other test reads/writes HOME concurrently.
        unsafe {
            std::env::set_var("HOME", "/home/testuser");
        }
        let lookup = EnvHomeDirLookup;
        assert_eq!(lookup.home_dir(None).as_deref(), Some("/home/testuser"));
        assert_eq!(lookup.home_dir(Some("anyone")), None);
    }
}
