//! Compiled per-segment pattern context: template classification,
//! required-last-char rejection filter, and the `*EXT` suffix matcher.
//!
//! Every field here is a pure function of the pattern bytes handed to
//! [`PatternContext::new`]; compilation is a one-shot, idempotent pass and
//! nothing about the context is mutated afterward.

use crate::posix_class;

/// Fixed-suffix equality test for `*EXT` patterns.
///
/// For suffixes of four bytes or fewer the comparison is done as a single
/// little-endian integer load-and-compare rather than a byte loop; longer
/// suffixes fall back to a plain tail-slice comparison.
#[derive(Clone, Copy, Debug)]
pub struct SuffixMatcher<'p> {
    suffix: &'p [u8],
}

impl<'p> SuffixMatcher<'p> {
    #[must_use]
    pub const fn new(suffix: &'p [u8]) -> Self {
        Self { suffix }
    }

    #[must_use]
    pub fn suffix(&self) -> &'p [u8] {
        self.suffix
    }

    #[must_use]
    pub fn is_match(&self, name: &[u8]) -> bool {
        if name.len() < self.suffix.len() {
            return false;
        }
        let tail = &name[name.len() - self.suffix.len()..];
        if self.suffix.len() <= 4 {
            Self::batched_eq(tail, self.suffix)
        } else {
            tail == self.suffix
        }
    }

    fn batched_eq(a: &[u8], b: &[u8]) -> bool {
        debug_assert_eq!(a.len(), b.len());
        let mut av = 0u32;
        let mut bv = 0u32;
        for (i, (&x, &y)) in a.iter().zip(b.iter()).enumerate() {
            av |= u32::from(x) << (8 * i);
            bv |= u32::from(y) << (8 * i);
        }
        av == bv
    }
}

/// Returns a [`SuffixMatcher`] iff `pattern` is exactly `*EXT` with no
/// further wildcards in `EXT` (the `check_simple_star_suffix` fast path).
#[must_use]
pub fn check_simple_star_suffix(pattern: &[u8]) -> Option<SuffixMatcher<'_>> {
    if pattern.first() != Some(&b'*') {
        return None;
    }
    let rest = &pattern[1..];
    if rest.iter().any(|&b| matches!(b, b'*' | b'?' | b'[' | b'{' | b'\\')) {
        return None;
    }
    Some(SuffixMatcher::new(rest))
}

/// A 256-bit membership set used by the `bracket_with_affixes` template.
#[derive(Clone, Copy, Debug, Default)]
pub struct Bitmap256([u64; 4]);

impl Bitmap256 {
    fn set(&mut self, b: u8) {
        self.0[(b >> 6) as usize] |= 1u64 << (b & 63);
    }

    #[must_use]
    pub fn get(&self, b: u8) -> bool {
        self.0[(b >> 6) as usize] & (1u64 << (b & 63)) != 0
    }
}

/// The closed-form match classification a pattern falls into, if any.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Template {
    #[default]
    None,
    Literal,
    StarOnly,
    StarDotExt,
    PrefixStar,
    PrefixStarExt,
    BracketWithAffixes,
}

/// A pattern compiled once, ahead of matching against many candidate names.
///
/// Borrows the pattern bytes it was built from; every other field is cached
/// output of analyzing them.
#[derive(Clone, Copy, Debug)]
pub struct PatternContext<'p> {
    pattern: &'p [u8],
    has_wildcards: bool,
    starts_with_dot: bool,
    is_dot_or_dotdot: bool,
    required_last_char: Option<u8>,
    template: Template,
    template_prefix: &'p [u8],
    template_suffix: &'p [u8],
    bracket_bitmap: Option<(Bitmap256, bool)>,
    suffix_matcher: Option<SuffixMatcher<'p>>,
}

impl<'p> PatternContext<'p> {
    #[must_use]
    pub fn new(pattern: &'p [u8]) -> Self {
        let has_backslash = pattern.contains(&b'\\');
        let has_wildcards = pattern.iter().any(|&b| matches!(b, b'*' | b'?' | b'['));
        let starts_with_dot = pattern.first() == Some(&b'.');
        let is_dot_or_dotdot = pattern == b"." || pattern == b"..";
        let required_last_char = required_last_char(pattern, has_backslash);
        let suffix_matcher = check_simple_star_suffix(pattern);

        let (template, template_prefix, template_suffix, bracket_bitmap) = if has_backslash {
            (Template::None, &pattern[..0], &pattern[..0], None)
        } else {
            classify(pattern)
        };

        Self {
            pattern,
            has_wildcards,
            starts_with_dot,
            is_dot_or_dotdot,
            required_last_char,
            template,
            template_prefix,
            template_suffix,
            bracket_bitmap,
            suffix_matcher,
        }
    }

    #[must_use]
    pub fn pattern(&self) -> &'p [u8] {
        self.pattern
    }

    #[must_use]
    pub fn has_wildcards(&self) -> bool {
        self.has_wildcards
    }

    #[must_use]
    pub fn starts_with_dot(&self) -> bool {
        self.starts_with_dot
    }

    #[must_use]
    pub fn is_dot_or_dotdot(&self) -> bool {
        self.is_dot_or_dotdot
    }

    #[must_use]
    pub fn required_last_char(&self) -> Option<u8> {
        self.required_last_char
    }

    #[must_use]
    pub fn template(&self) -> Template {
        self.template
    }

    #[must_use]
    pub fn suffix_matcher(&self) -> Option<&SuffixMatcher<'p>> {
        self.suffix_matcher.as_ref()
    }

    /// Try the closed-form template for this pattern. `None` means "no
    /// fast path; fall through to the full matcher".
    #[must_use]
    pub fn match_template(&self, name: &[u8]) -> Option<bool> {
        match self.template {
            Template::None => None,
            Template::Literal => Some(name == self.pattern),
            Template::StarOnly => Some(true),
            Template::StarDotExt => Some(ends_with(name, self.template_suffix)),
            Template::PrefixStar => Some(name.starts_with(self.template_prefix)),
            Template::PrefixStarExt => Some(
                name.len() >= self.template_prefix.len() + self.template_suffix.len()
                    && name.starts_with(self.template_prefix)
                    && ends_with(name, self.template_suffix),
            ),
            Template::BracketWithAffixes => {
                let p = self.template_prefix;
                let s = self.template_suffix;
                if name.len() != p.len() + 1 + s.len() {
                    return Some(false);
                }
                if &name[..p.len()] != p || &name[name.len() - s.len()..] != s {
                    return Some(false);
                }
                let Some((bitmap, negated)) = self.bracket_bitmap else {
                    return Some(false);
                };
                let mid = name[p.len()];
                Some(bitmap.get(mid) != negated)
            }
        }
    }

    /// Full match: required-last-char rejection, then template fast path,
    /// then the general fnmatch kernel (with extglob if `extglob` is set).
    ///
    /// Equivalent to `self.matches_opts(name, extglob, true)`.
    #[must_use]
    pub fn matches(&self, name: &[u8], extglob: bool) -> bool {
        self.matches_opts(name, extglob, true)
    }

    /// As [`Self::matches`], but `escapes` gates whether `\` introduces an
    /// escape (`NOESCAPE` unset) or is an ordinary character (`NOESCAPE`
    /// set) in the fallthrough fnmatch kernel.
    #[must_use]
    pub fn matches_opts(&self, name: &[u8], extglob: bool, escapes: bool) -> bool {
        if let Some(rlc) = self.required_last_char {
            if name.last() != Some(&rlc) {
                return false;
            }
        }
        if escapes {
            if let Some(result) = self.match_template(name) {
                return result;
            }
        }
        let no_escape = !escapes;
        match (core::str::from_utf8(self.pattern), core::str::from_utf8(name)) {
            (Ok(p), Ok(n)) => {
                if extglob && is_extglob(self.pattern) {
                    crate::glob_match_extglob_opts(p, n, no_escape)
                } else {
                    crate::glob_match_opts(p, n, no_escape)
                }
            }
            _ => self.pattern == name,
        }
    }
}

fn ends_with(name: &[u8], suffix: &[u8]) -> bool {
    name.len() >= suffix.len() && &name[name.len() - suffix.len()..] == suffix
}

fn is_extglob(pattern: &[u8]) -> bool {
    let mut i = 0;
    while i + 1 < pattern.len() {
        if matches!(pattern[i], b'?' | b'*' | b'+' | b'@' | b'!') && pattern[i + 1] == b'(' {
            return true;
        }
        i += 1;
    }
    false
}

/// The literal byte every match must end with, if the pattern's final
/// non-wildcard byte is determinable and not inside a bracket expression.
fn required_last_char(pattern: &[u8], has_backslash: bool) -> Option<u8> {
    let &last = pattern.last()?;
    if matches!(last, b'*' | b'?' | b']') {
        return None;
    }
    if has_backslash {
        // An escaped final byte (`...\X`) still has a fixed required value;
        // anything else involving a backslash is left undetermined.
        if pattern.len() >= 2 && pattern[pattern.len() - 2] == b'\\' {
            return Some(last);
        }
        return None;
    }
    Some(last)
}

#[allow(clippy::type_complexity)]
fn classify<'p>(
    pattern: &'p [u8],
) -> (Template, &'p [u8], &'p [u8], Option<(Bitmap256, bool)>) {
    let empty: &[u8] = &[];
    if !pattern.iter().any(|&b| matches!(b, b'*' | b'?' | b'[')) {
        return (Template::Literal, pattern, empty, None);
    }
    if pattern == b"*" {
        return (Template::StarOnly, empty, empty, None);
    }
    if pattern.first() == Some(&b'*')
        && !pattern[1..].iter().any(|&b| matches!(b, b'*' | b'?' | b'['))
    {
        return (Template::StarDotExt, empty, &pattern[1..], None);
    }
    if let Some(star_pos) = single_star_position(pattern) {
        let prefix = &pattern[..star_pos];
        let suffix = &pattern[star_pos + 1..];
        let plain = |s: &[u8]| !s.iter().any(|&b| matches!(b, b'*' | b'?' | b'['));
        if plain(prefix) && plain(suffix) {
            if suffix.is_empty() {
                return (Template::PrefixStar, prefix, empty, None);
            }
            return (Template::PrefixStarExt, prefix, suffix, None);
        }
    }
    if let Some((prefix, bitmap, negated, suffix)) = bracket_with_affixes(pattern) {
        return (Template::BracketWithAffixes, prefix, suffix, Some((bitmap, negated)));
    }
    (Template::None, empty, empty, None)
}

fn single_star_position(pattern: &[u8]) -> Option<usize> {
    let mut pos = None;
    for (i, &b) in pattern.iter().enumerate() {
        if b == b'*' {
            if pos.is_some() {
                return None;
            }
            pos = Some(i);
        }
    }
    pos
}

/// Recognizes `PREFIX[set]SUFFIX` where `PREFIX`/`SUFFIX` contain no further
/// wildcards and there is exactly one bracket expression.
fn bracket_with_affixes(pattern: &[u8]) -> Option<(&[u8], Bitmap256, bool, &[u8])> {
    let open = pattern.iter().position(|&b| b == b'[')?;
    let end = crate::skip_char_class(pattern, open);
    if end > pattern.len() || pattern.get(end - 1) != Some(&b']') {
        return None;
    }
    let prefix = &pattern[..open];
    let suffix = &pattern[end..];
    let plain = |s: &[u8]| !s.iter().any(|&b| matches!(b, b'*' | b'?' | b'[' | b']'));
    if !plain(prefix) || !plain(suffix) {
        return None;
    }
    let mut inner = open + 1;
    let mut negated = false;
    if pattern.get(inner) == Some(&b'^') || pattern.get(inner) == Some(&b'!') {
        negated = true;
        inner += 1;
    }
    let content = &pattern[inner..end - 1];
    let mut bitmap = Bitmap256::default();
    let mut i = 0;
    let mut first = true;
    while i < content.len() {
        if let Some((name, class_end)) = posix_class::parse_class_at(content, i) {
            for b in 0..=255u8 {
                if posix_class::contains(name, b) == Some(true) {
                    bitmap.set(b);
                }
            }
            i = class_end;
            first = false;
            continue;
        }
        // `]` as the first content byte is literal, not a close (already
        // excluded from `content` by `skip_char_class`'s own handling).
        let low = content[i];
        i += 1;
        let high = if i + 1 < content.len() && content[i] == b'-' && content[i + 1] != b']' {
            let h = content[i + 1];
            i += 2;
            h
        } else {
            low
        };
        for b in low..=high {
            bitmap.set(b);
        }
        first = false;
    }
    let _ = first;
    Some((prefix, bitmap, negated, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_template() {
        let ctx = PatternContext::new(b"foo.txt");
        assert_eq!(ctx.template(), Template::Literal);
        assert_eq!(ctx.match_template(b"foo.txt"), Some(true));
        assert_eq!(ctx.match_template(b"bar.txt"), Some(false));
    }

    #[test]
    fn star_only_template() {
        let ctx = PatternContext::new(b"*");
        assert_eq!(ctx.template(), Template::StarOnly);
        assert_eq!(ctx.match_template(b"anything"), Some(true));
    }

    #[test]
    fn star_dot_ext_template() {
        let ctx = PatternContext::new(b"*.rs");
        assert_eq!(ctx.template(), Template::StarDotExt);
        assert_eq!(ctx.match_template(b"main.rs"), Some(true));
        assert_eq!(ctx.match_template(b"main.rb"), Some(false));
        assert_eq!(ctx.required_last_char(), Some(b's'));
    }

    #[test]
    fn prefix_star_ext_template() {
        let ctx = PatternContext::new(b"src*.rs");
        assert_eq!(ctx.template(), Template::PrefixStarExt);
        assert!(ctx.match_template(b"srcmain.rs").unwrap());
        assert!(!ctx.match_template(b"lib.rs").unwrap());
    }

    #[test]
    fn bracket_with_affixes_template() {
        let ctx = PatternContext::new(b"v[123].txt");
        assert_eq!(ctx.template(), Template::BracketWithAffixes);
        assert_eq!(ctx.match_template(b"v1.txt"), Some(true));
        assert_eq!(ctx.match_template(b"v4.txt"), Some(false));
    }

    #[test]
    fn bracket_with_affixes_posix_class() {
        let ctx = PatternContext::new(b"v[[:digit:]].txt");
        assert_eq!(ctx.template(), Template::BracketWithAffixes);
        assert_eq!(ctx.match_template(b"v7.txt"), Some(true));
        assert_eq!(ctx.match_template(b"va.txt"), Some(false));
    }

    #[test]
    fn backslash_disables_templates() {
        let ctx = PatternContext::new(b"foo\\*bar");
        assert_eq!(ctx.template(), Template::None);
    }

    #[test]
    fn required_last_char_none_for_wildcard_tail() {
        assert_eq!(PatternContext::new(b"foo*").required_last_char(), None);
        assert_eq!(PatternContext::new(b"foo?").required_last_char(), None);
    }

    #[test]
    fn falls_through_to_full_matcher() {
        let ctx = PatternContext::new(b"a*b*c");
        assert_eq!(ctx.template(), Template::None);
        assert!(ctx.matches(b"axbyc", false));
        assert!(!ctx.matches(b"axbyd", false));
    }

    #[test]
    fn extglob_routes_through_kernel() {
        let ctx = PatternContext::new(b"*.!(js)");
        assert!(ctx.matches(b"foo.css", true));
        assert!(!ctx.matches(b"foo.js", true));
    }
}
