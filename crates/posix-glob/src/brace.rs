//! Brace expansion: `{a,b,c}` parsing plus the single-walk / fallback mode
//! split described in `SPEC_FULL.md` §4.4.
//!
//! Parsing builds a small tree of [`Node`] (literal runs and alternative
//! groups) so nested braces (`{a,{b,c}}`) and escapes compose naturally.
//! Whether any alternative crosses a `/` boundary decides whether the
//! traversal engine can descend component-by-component ([`BraceExpansion::SingleWalk`])
//! or must fall back to a fully expanded Cartesian product of literal
//! patterns ([`BraceExpansion::Fallback`]).

/// Upper bound on the number of literal patterns a single brace expansion
/// may produce. Beyond this the remaining alternatives are dropped (and the
/// truncation is logged) rather than materializing an unbounded product.
const MAX_EXPANSIONS: usize = 4096;

#[derive(Debug, Clone)]
enum Node {
    Literal(Vec<u8>),
    Group(Vec<Vec<Node>>),
}

/// One `/`-separated segment of a single-walk braced pattern.
#[derive(Debug, Clone)]
pub struct BracedComponent {
    text: String,
    alternatives: Option<Vec<String>>,
    glob_set: Option<glob_set::GlobSet>,
    is_last: bool,
}

impl BracedComponent {
    fn new(text: String, alternatives: Option<Vec<String>>, is_last: bool) -> Self {
        let glob_set = alternatives.as_ref().and_then(|alts| build_glob_set(alts));
        Self {
            text,
            alternatives,
            glob_set,
            is_last,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn alternatives(&self) -> Option<&[String]> {
        self.alternatives.as_deref()
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.is_last
    }

    /// Whether this is an unalternated recursive-descent marker (`**`).
    #[must_use]
    pub fn is_doublestar(&self) -> bool {
        self.alternatives.is_none() && self.text == "**"
    }

    /// Whether this component can only ever match the entry it names
    /// literally -- no wildcards, brackets, extglob, or alternatives --
    /// and so is safe for the `literal_stat` fast path, which joins the
    /// component's text straight onto a path without running it through
    /// the fnmatch kernel. With escapes enabled a `\`-bearing component
    /// still needs a real match (the backslash must be unescaped), so it
    /// is not eligible even though it contains no `*?[`.
    #[must_use]
    pub fn is_literal(&self, escapes: bool) -> bool {
        self.alternatives.is_none()
            && !glob_matcher::PatternContext::new(self.text.as_bytes()).has_wildcards()
            && !is_extglob(&self.text)
            && !(escapes && self.text.contains('\\'))
    }

    /// True when the name this component would match is allowed to start
    /// with a hidden-file dot without the `PERIOD` flag -- i.e. the
    /// component (or, for an alternatives group, any one of its
    /// alternatives) itself begins with a literal `.`.
    #[must_use]
    pub fn starts_with_dot(&self) -> bool {
        match &self.alternatives {
            Some(alts) => alts.iter().any(|a| a.starts_with('.')),
            None => self.text.starts_with('.'),
        }
    }

    /// Test a single directory-entry basename against this component.
    /// `escapes` is false under the `NOESCAPE` flag, where `\` is an
    /// ordinary character; the pre-built `glob_set` only ever assumes
    /// escapes are enabled, so it's skipped in that case.
    #[must_use]
    pub fn matches(&self, name: &str, extglob: bool, escapes: bool) -> bool {
        match &self.alternatives {
            Some(alts) => {
                if escapes && let Some(set) = &self.glob_set {
                    set.is_match(name)
                } else {
                    alts.iter().any(|alt| match_one(alt, name, extglob, escapes))
                }
            }
            None => match_one(&self.text, name, extglob, escapes),
        }
    }
}

fn match_one(pattern: &str, name: &str, extglob: bool, escapes: bool) -> bool {
    if extglob && is_extglob(pattern) {
        glob_matcher::glob_match_extglob_opts(pattern, name, !escapes)
    } else {
        glob_matcher::glob_match_opts(pattern, name, !escapes)
    }
}

pub(crate) fn is_extglob(pattern: &str) -> bool {
    let bytes = pattern.as_bytes();
    bytes
        .iter()
        .zip(bytes.iter().skip(1))
        .any(|(&b, &next)| matches!(b, b'?' | b'*' | b'+' | b'@' | b'!') && next == b'(')
}

/// `glob-set` validates more strictly than the raw fnmatch kernel (it
/// rejects extglob syntax, for instance); when any alternative fails to
/// parse as a `Glob`, callers fall back to linear [`glob_matcher::glob_match`]
/// iteration over the alternatives instead.
fn build_glob_set(alternatives: &[String]) -> Option<glob_set::GlobSet> {
    let mut builder = glob_set::GlobSetBuilder::new();
    for alt in alternatives {
        if is_extglob(alt) {
            return None;
        }
        builder.add(glob_set::Glob::new(alt).ok()?);
    }
    builder.build().ok()
}

/// A pattern whose brace groups were resolved into a structured,
/// `/`-component-aligned walk plan.
#[derive(Debug, Clone)]
pub struct BracedPattern {
    components: Vec<BracedComponent>,
    has_recursive: bool,
    is_absolute: bool,
    directories_only: bool,
}

impl BracedPattern {
    #[must_use]
    pub fn components(&self) -> &[BracedComponent] {
        &self.components
    }

    #[must_use]
    pub fn has_recursive(&self) -> bool {
        self.has_recursive
    }

    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.is_absolute
    }

    #[must_use]
    pub fn directories_only(&self) -> bool {
        self.directories_only
    }
}

/// Build a component list directly from a literal (already brace-expanded,
/// possibly still wildcarded) pattern string, without any alternatives.
/// Used for fallback-mode expansions, which are re-fed to the traversal
/// engine as plain patterns.
#[must_use]
pub fn literal_components(pattern: &str) -> BracedPattern {
    let is_absolute = pattern.starts_with('/');
    let directories_only = pattern.len() > 1 && pattern.ends_with('/');
    let trimmed = if directories_only {
        &pattern[..pattern.len() - 1]
    } else {
        pattern
    };
    let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);

    let components: Vec<BracedComponent> = if trimmed.is_empty() {
        Vec::new()
    } else {
        let parts: Vec<&str> = trimmed.split('/').collect();
        let last = parts.len().saturating_sub(1);
        parts
            .into_iter()
            .enumerate()
            .map(|(i, part)| BracedComponent::new(part.to_string(), None, i == last))
            .collect()
    };
    let has_recursive = components.iter().any(|c| c.text() == "**");

    BracedPattern {
        components,
        has_recursive,
        is_absolute,
        directories_only,
    }
}

/// The result of expanding one pattern's brace groups.
#[derive(Debug, Clone)]
pub enum BraceExpansion {
    SingleWalk(BracedPattern),
    Fallback(Vec<String>),
}

pub struct BraceExpander;

impl BraceExpander {
    /// Expand `pattern`'s brace groups, choosing single-walk or fallback
    /// mode depending on whether any alternative spans a `/` boundary.
    #[must_use]
    pub fn expand(pattern: &str) -> BraceExpansion {
        let bytes = pattern.as_bytes();
        let mut pos = 0;
        let nodes = parse_sequence(bytes, &mut pos, false);

        if has_crossing_group(&nodes) {
            let mut expansions = expand_sequence(&nodes);
            expansions.truncate(MAX_EXPANSIONS);
            let patterns = expansions
                .into_iter()
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .collect();
            return BraceExpansion::Fallback(patterns);
        }

        let is_absolute = pattern.starts_with('/');
        let directories_only = pattern.len() > 1 && pattern.ends_with('/');

        let mut component_nodes = split_components(nodes);
        // A leading/trailing empty segment with no group is just the
        // boundary slash; drop it and record it as is_absolute/directories_only
        // instead of a literal empty-text component to match against.
        if is_absolute && component_nodes.first().is_some_and(Vec::is_empty) {
            component_nodes.remove(0);
        }
        if directories_only && component_nodes.last().is_some_and(Vec::is_empty) {
            component_nodes.pop();
        }

        let last = component_nodes.len().saturating_sub(1);
        let components = component_nodes
            .into_iter()
            .enumerate()
            .map(|(i, nodes)| build_component(nodes, i == last))
            .collect::<Vec<_>>();
        let has_recursive = components.iter().any(|c| match &c.alternatives {
            Some(alts) => alts.iter().any(|a| a == "**"),
            None => c.text == "**",
        });

        BraceExpansion::SingleWalk(BracedPattern {
            components,
            has_recursive,
            is_absolute,
            directories_only,
        })
    }
}

fn build_component(nodes: Vec<Node>, is_last: bool) -> BracedComponent {
    let has_group = nodes.iter().any(|n| matches!(n, Node::Group(_)));
    if has_group {
        let mut expansions = expand_sequence(&nodes);
        expansions.truncate(MAX_EXPANSIONS);
        let alternatives = expansions
            .into_iter()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .collect();
        BracedComponent::new(String::new(), Some(alternatives), is_last)
    } else {
        let text = nodes
            .into_iter()
            .map(|n| match n {
                Node::Literal(b) => String::from_utf8_lossy(&b).into_owned(),
                Node::Group(_) => unreachable!("has_group already false"),
            })
            .collect::<String>();
        BracedComponent::new(text, None, is_last)
    }
}

fn split_components(nodes: Vec<Node>) -> Vec<Vec<Node>> {
    let mut components = Vec::new();
    let mut current = Vec::new();
    for node in nodes {
        match node {
            Node::Literal(bytes) => {
                let mut start = 0;
                for (i, &b) in bytes.iter().enumerate() {
                    if b == b'/' {
                        if start < i {
                            current.push(Node::Literal(bytes[start..i].to_vec()));
                        }
                        components.push(core::mem::take(&mut current));
                        start = i + 1;
                    }
                }
                if start < bytes.len() {
                    current.push(Node::Literal(bytes[start..].to_vec()));
                }
            }
            group @ Node::Group(_) => current.push(group),
        }
    }
    components.push(current);
    components
}

fn parse_sequence(bytes: &[u8], pos: &mut usize, in_group: bool) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut literal = Vec::new();
    while *pos < bytes.len() {
        let b = bytes[*pos];
        if b == b'\\' && *pos + 1 < bytes.len() {
            literal.push(b);
            literal.push(bytes[*pos + 1]);
            *pos += 2;
            continue;
        }
        if in_group && (b == b',' || b == b'}') {
            break;
        }
        if b == b'{' {
            let save = *pos;
            *pos += 1;
            if let Some(group) = parse_group(bytes, pos) {
                if !literal.is_empty() {
                    nodes.push(Node::Literal(core::mem::take(&mut literal)));
                }
                nodes.push(group);
                continue;
            }
            *pos = save;
            literal.push(b'{');
            *pos += 1;
            continue;
        }
        literal.push(b);
        *pos += 1;
    }
    if !literal.is_empty() {
        nodes.push(Node::Literal(literal));
    }
    nodes
}

/// Called with `pos` just past an opening `{`. Returns `None` (and leaves
/// `pos` wherever parsing stopped; the caller restores it) if the braces
/// never close or contain no top-level comma -- both cases are "not
/// actually a group" per the unclosed/no-alternative literal rule.
fn parse_group(bytes: &[u8], pos: &mut usize) -> Option<Node> {
    let mut alternatives = Vec::new();
    let mut saw_comma = false;
    loop {
        let alt = parse_sequence(bytes, pos, true);
        alternatives.push(alt);
        if *pos >= bytes.len() {
            return None;
        }
        match bytes[*pos] {
            b',' => {
                saw_comma = true;
                *pos += 1;
            }
            b'}' => {
                *pos += 1;
                break;
            }
            _ => unreachable!("parse_sequence(in_group=true) stops only at ',' or '}'"),
        }
    }
    saw_comma.then_some(Node::Group(alternatives))
}

fn has_crossing_group(nodes: &[Node]) -> bool {
    nodes.iter().any(|n| match n {
        Node::Literal(_) => false,
        Node::Group(alts) => {
            alts.iter().any(|seq| sequence_contains_slash(seq))
                || alts.iter().any(|seq| has_crossing_group(seq))
        }
    })
}

fn sequence_contains_slash(nodes: &[Node]) -> bool {
    nodes.iter().any(|n| match n {
        Node::Literal(b) => b.contains(&b'/'),
        Node::Group(alts) => alts.iter().any(|seq| sequence_contains_slash(seq)),
    })
}

fn expand_sequence(nodes: &[Node]) -> Vec<Vec<u8>> {
    let mut results = vec![Vec::new()];
    for node in nodes {
        let pieces: Vec<Vec<u8>> = match node {
            Node::Literal(b) => vec![b.clone()],
            Node::Group(alts) => alts.iter().flat_map(|seq| expand_sequence(seq)).collect(),
        };
        if pieces.is_empty() {
            continue;
        }
        let mut next = Vec::with_capacity((results.len() * pieces.len()).min(MAX_EXPANSIONS));
        'outer: for r in &results {
            for p in &pieces {
                let mut combined = r.clone();
                combined.extend_from_slice(p);
                next.push(combined);
                if next.len() >= MAX_EXPANSIONS {
                    break 'outer;
                }
            }
        }
        results = next;
    }
    results
}
