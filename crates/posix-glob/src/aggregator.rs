//! Length-tracked path accumulator and the finalized result table it
//! produces.

/// The finalized, caller-facing result of a glob call.
///
/// Keeps the `pathc`/`offs`/flag-bit *shape* of the `glob(3)` result table
/// so a caller porting C-shaped code finds the same fields, but expressed
/// with a `Vec<String>` rather than raw pointers: `Drop` releases the path
/// strings, there is no explicit free function.
#[derive(Debug, Default, Clone)]
pub struct GlobResult {
    paths: Vec<String>,
    offs: usize,
    magic_char_seen: bool,
}

impl GlobResult {
    #[must_use]
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    #[must_use]
    pub fn into_paths(self) -> Vec<String> {
        self.paths
    }

    /// Count of matched paths, excluding the `offs` leading reserved slots.
    #[must_use]
    pub fn pathc(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn offs(&self) -> usize {
        self.offs
    }

    #[must_use]
    pub fn magic_char_seen(&self) -> bool {
        self.magic_char_seen
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Projects onto the `pathv`-shaped external view: `offs` leading `None`
    /// slots (the `DOOFFS` reservation), one `Some` per match, and a
    /// trailing `None` sentinel -- `offs + pathc + 1` entries total.
    #[must_use]
    pub fn pathv(&self) -> Vec<Option<&str>> {
        let mut v = Vec::with_capacity(self.offs + self.paths.len() + 1);
        v.extend(core::iter::repeat(None).take(self.offs));
        v.extend(self.paths.iter().map(|p| Some(p.as_str())));
        v.push(None);
        v
    }

    #[must_use]
    pub fn pathlen(&self) -> Vec<usize> {
        self.paths.iter().map(String::len).collect()
    }
}

/// Accumulates matched paths during a single traversal, owning every string
/// it allocates until `finalize` transfers that ownership to a
/// [`GlobResult`]. If a traversal function returns early with `Err`, the
/// aggregator (and with it every path string accumulated so far) is simply
/// dropped -- no explicit cleanup code is required.
#[derive(Debug, Default)]
pub struct ResultsAggregator {
    paths: Vec<String>,
    magic_char_seen: bool,
}

impl ResultsAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn note_magic_char(&mut self) {
        self.magic_char_seen = true;
    }

    /// Push a fully-formed path. Strips a leading `./`; the caller is
    /// responsible for having already decided whether a trailing `/`
    /// belongs on this entry (only `MARK`-ed directories and the root path
    /// `/` itself should carry one).
    pub fn append(&mut self, path: String) {
        let normalized = match path.strip_prefix("./") {
            Some(rest) if !rest.is_empty() => rest.to_string(),
            _ => path,
        };
        self.paths.push(normalized);
    }

    /// In-place lexicographic sort by path bytes.
    pub fn sort(&mut self) {
        self.paths.sort_unstable_by(|a, b| a.as_bytes().cmp(b.as_bytes()));
    }

    /// Consume the aggregator into a result table reserving `offs` leading
    /// slots, optionally sorting first.
    #[must_use]
    pub fn finalize(mut self, offs: usize, sort: bool) -> GlobResult {
        if sort {
            self.sort();
        }
        GlobResult {
            paths: self.paths,
            offs,
            magic_char_seen: self.magic_char_seen,
        }
    }

    /// Append this aggregator's matches after an existing result's,
    /// preserving its `offs` leading slots, and sort only the newly
    /// appended range (the existing prefix is assumed already sorted).
    #[must_use]
    pub fn finalize_append(mut self, mut into: GlobResult, sort: bool) -> GlobResult {
        if sort {
            self.sort();
        }
        into.paths.extend(self.paths);
        into.magic_char_seen |= self.magic_char_seen;
        into
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_leading_dot_slash() {
        let mut agg = ResultsAggregator::new();
        agg.append("./foo.txt".to_string());
        assert_eq!(agg.finalize(0, false).paths(), ["foo.txt"]);
    }

    #[test]
    fn keeps_root_path() {
        let mut agg = ResultsAggregator::new();
        agg.append("/".to_string());
        assert_eq!(agg.finalize(0, false).paths(), ["/"]);
    }

    #[test]
    fn sorts_lexicographically() {
        let mut agg = ResultsAggregator::new();
        agg.append("b.txt".to_string());
        agg.append("a.txt".to_string());
        let result = agg.finalize(0, true);
        assert_eq!(result.paths(), ["a.txt", "b.txt"]);
    }

    #[test]
    fn dooffs_reserves_leading_null_slots() {
        let mut agg = ResultsAggregator::new();
        agg.append("a.txt".to_string());
        let result = agg.finalize(3, false);
        let pathv = result.pathv();
        assert_eq!(pathv.len(), 3 + 1 + 1);
        assert!(pathv[0].is_none() && pathv[1].is_none() && pathv[2].is_none());
        assert_eq!(pathv[3], Some("a.txt"));
        assert!(pathv[4].is_none());
    }

    #[test]
    fn append_preserves_prefix_and_sorts_only_new_range() {
        let mut first = ResultsAggregator::new();
        first.append("a.txt".to_string());
        let base = first.finalize(2, false);

        let mut second = ResultsAggregator::new();
        second.append("c.txt".to_string());
        second.append("b.txt".to_string());
        let combined = second.finalize_append(base, true);

        assert_eq!(combined.offs(), 2);
        assert_eq!(combined.paths(), ["a.txt", "b.txt", "c.txt"]);
    }
}
