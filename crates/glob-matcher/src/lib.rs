#![doc = include_str!("../README.md")]
#![no_std]
extern crate alloc;

mod context;
mod extglob;
mod posix_class;
mod syntax;
pub use context::{
    Bitmap256, PatternContext, SuffixMatcher, Template, check_simple_star_suffix,
};
pub use extglob::{glob_match_extglob, glob_match_extglob_opts};
pub use syntax::{skip_braces, skip_char_class};

use alloc::vec::Vec;
use core::ops::Range;

#[allow(clippy::inline_always)]
#[inline(always)]
fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

#[derive(Clone, Copy, Debug, Default)]
struct State {
    /// Character index into the path string.
    path_index: usize,
    /// Character index into the glob string.
    glob_index: usize,

    /// When we hit a * or **, we store the state for backtracking.
    wildcard: Wildcard,
    globstar: Wildcard,

    /// The current index into the captures list.
    capture_index: usize,
}

#[derive(Clone, Copy, Debug, Default)]
struct Wildcard {
    /// Using u32 rather than usize for these results in 10% faster performance.
    glob: u32,
    path: u32,
    capture: u32,
}

#[derive(PartialEq)]
enum BraceState {
    Invalid,
    Comma,
    EndBrace,
}

struct BraceStack {
    stack: [State; 10],
    length: u32,
    longest_brace_match: u32,
}

type Capture = Range<usize>;

pub fn glob_match(glob: &str, path: &str) -> bool {
    Matcher::new(glob, path).run(None)
}

/// As [`glob_match`], but when `no_escape` is set, `\` is an ordinary
/// character rather than an escape introducer (the `NOESCAPE` flag).
#[must_use]
pub fn glob_match_opts(glob: &str, path: &str, no_escape: bool) -> bool {
    let mut matcher = Matcher::new(glob, path);
    matcher.no_escape = no_escape;
    matcher.run(None)
}

pub fn glob_match_with_captures(glob: &str, path: &str) -> Option<Vec<Capture>> {
    let mut captures = Vec::new();
    if Matcher::new(glob, path).run(Some(&mut captures)) {
        return Some(captures);
    }
    None
}

enum Step {
    Continue,
    Return(bool),
    Backtrack,
}

struct Matcher<'a> {
    glob: &'a [u8],
    path: &'a [u8],
    state: State,
    brace_stack: BraceStack,
    /// `NOESCAPE`: when set, `\` is matched literally instead of
    /// introducing an escape.
    no_escape: bool,
}

#[allow(clippy::similar_names)]
impl<'a> Matcher<'a> {
    fn new(glob: &'a str, path: &'a str) -> Self {
        Matcher {
            glob: glob.as_bytes(),
            path: path.as_bytes(),
            state: State::default(),
            brace_stack: BraceStack::default(),
            no_escape: false,
        }
    }

    #[allow(clippy::inline_always)]
    #[inline(always)]
    fn unescape(&mut self, c: &mut u8) -> bool {
        if *c == b'\\' && !self.no_escape {
            self.state.glob_index += 1;
            if self.state.glob_index >= self.glob.len() {
                // Invalid pattern!
                return false;
            }
            *c = match self.glob[self.state.glob_index] {
                b'a' => b'\x61', // \a → literal 'a' (not BEL)
                b'b' => b'\x08',
                b'n' => b'\n',
                b'r' => b'\r',
                b't' => b'\t',
                c => c,
            }
        }
        true
    }

    // This algorithm is based on https://research.swtch.com/glob
    fn run(&mut self, mut captures: Option<&mut Vec<Capture>>) -> bool {
        // First, check if the pattern is negated with a leading '!' character.
        let mut negated = false;
        while self.state.glob_index < self.glob.len() && self.glob[self.state.glob_index] == b'!' {
            negated = !negated;
            self.state.glob_index += 1;
        }

        while self.state.glob_index < self.glob.len() || self.state.path_index < self.path.len() {
            if self.state.glob_index < self.glob.len() {
                match self.glob[self.state.glob_index] {
                    b'*' => match self.match_star(&mut captures) {
                        Step::Continue => continue,
                        Step::Return(v) => return v,
                        Step::Backtrack => {}
                    },
                    b'?' if self.state.path_index < self.path.len() => {
                        if !is_separator(self.path[self.state.path_index] as char) {
                            self.state.add_char_capture(&mut captures);
                            self.state.glob_index += 1;
                            self.state.path_index += 1;
                            continue;
                        }
                    }
                    b'[' if self.state.path_index < self.path.len() => {
                        match self.match_bracket(&mut captures) {
                            Step::Continue => continue,
                            Step::Return(v) => return v,
                            Step::Backtrack => {}
                        }
                    }
                    b'{' => {
                        if self.brace_stack.length as usize >= self.brace_stack.stack.len() {
                            return false;
                        }
                        self.state.end_capture(&mut captures);
                        self.state.begin_capture(
                            &mut captures,
                            self.state.path_index..self.state.path_index,
                        );
                        let snap = self.state;
                        self.state = self.brace_stack.push(&snap);
                        continue;
                    }
                    b'}' if self.brace_stack.length > 0 => {
                        #[allow(clippy::cast_possible_truncation)]
                        {
                            self.brace_stack.longest_brace_match = self
                                .brace_stack
                                .longest_brace_match
                                .max(self.state.path_index as u32 + 1);
                        }
                        self.state.glob_index += 1;
                        let snap = self.state;
                        self.state = self.brace_stack.pop(&snap, &mut captures);
                        continue;
                    }
                    b',' if self.brace_stack.length > 0 => {
                        #[allow(clippy::cast_possible_truncation)]
                        {
                            self.brace_stack.longest_brace_match = self
                                .brace_stack
                                .longest_brace_match
                                .max(self.state.path_index as u32 + 1);
                        }
                        self.state.path_index = self.brace_stack.last().path_index;
                        self.state.glob_index += 1;
                        self.state.wildcard = Wildcard::default();
                        self.state.globstar = Wildcard::default();
                        continue;
                    }
                    _ if self.state.path_index < self.path.len() => {
                        match self.match_literal(&mut captures) {
                            Step::Continue => continue,
                            Step::Return(v) => return v,
                            Step::Backtrack => {}
                        }
                    }
                    _ => {}
                }
            }

            match self.try_backtrack(&mut captures, negated) {
                Step::Continue => {}
                Step::Return(v) => return v,
                Step::Backtrack => unreachable!(),
            }
        }

        if self.brace_stack.length > 0
            && self.state.glob_index > 0
            && self.glob[self.state.glob_index - 1] == b'}'
        {
            #[allow(clippy::cast_possible_truncation)]
            {
                self.brace_stack.longest_brace_match = self.state.path_index as u32 + 1;
            }
            let snap = self.state;
            self.brace_stack.pop(&snap, &mut captures);
        }

        !negated
    }

    #[allow(clippy::cast_possible_truncation)]
    fn match_star(&mut self, captures: &mut Option<&mut Vec<Capture>>) -> Step {
        let is_globstar = self.state.glob_index + 1 < self.glob.len()
            && self.glob[self.state.glob_index + 1] == b'*';
        if is_globstar {
            self.skip_globstars();
        }

        // If we are on a different glob index than before, start a new capture.
        // Otherwise, extend the active one.
        if captures.as_ref().is_some_and(|c| {
            c.is_empty() || self.state.glob_index != self.state.wildcard.glob as usize
        }) {
            self.state.wildcard.capture = self.state.capture_index as u32;
            self.state
                .begin_capture(captures, self.state.path_index..self.state.path_index);
        } else {
            self.state.extend_capture(captures);
        }

        self.state.wildcard.glob = self.state.glob_index as u32;
        self.state.wildcard.path = self.state.path_index as u32 + 1;

        // ** allows path separators, whereas * does not.
        // However, ** must be a full path component, i.e. a/**/b not a**b.
        let mut in_globstar = false;
        if is_globstar {
            self.state.glob_index += 2;
            let is_end_invalid = self.state.glob_index != self.glob.len()
                && !(self.brace_stack.length > 0
                    && matches!(self.glob[self.state.glob_index], b'}' | b','));
            let preceded_by_sep = self.state.glob_index < 3
                || self.glob[self.state.glob_index - 3] == b'/'
                || (self.brace_stack.length > 0
                    && matches!(self.glob[self.state.glob_index - 3], b'{' | b','));
            if preceded_by_sep && (!is_end_invalid || self.glob[self.state.glob_index] == b'/') {
                if is_end_invalid {
                    self.state.end_capture(captures);
                    self.state.glob_index += 1;
                }
                self.skip_to_separator(is_end_invalid);
                in_globstar = true;
            }
        } else {
            self.state.glob_index += 1;
        }

        if self.state.path_index < self.path.len()
            && is_separator(self.path[self.state.path_index] as char)
        {
            if in_globstar {
                self.state.path_index += 1;
            } else if self.state.globstar.path > 0 && self.state.path_index < self.path.len() {
                self.state.wildcard = self.state.globstar;
            } else {
                self.state.wildcard.path = 0;
            }
        }

        // If the next char is a special brace separator,
        // skip to the end of the braces so we don't try to match it.
        if self.brace_stack.length > 0
            && self.state.glob_index < self.glob.len()
            && matches!(self.glob[self.state.glob_index], b',' | b'}')
            && self.skip_braces(captures, false) == BraceState::Invalid
        {
            return Step::Return(false);
        }

        Step::Continue
    }

    fn match_bracket(&mut self, captures: &mut Option<&mut Vec<Capture>>) -> Step {
        self.state.glob_index += 1;
        let c = self.path[self.state.path_index];

        // Check if the character class is negated.
        let mut negated = false;
        if self.state.glob_index < self.glob.len()
            && matches!(self.glob[self.state.glob_index], b'^' | b'!')
        {
            negated = true;
            self.state.glob_index += 1;
        }

        // Try each range.
        let mut first = true;
        let mut is_match = false;
        while self.state.glob_index < self.glob.len()
            && (first || self.glob[self.state.glob_index] != b']')
        {
            if let Some((name, end)) = posix_class::parse_class_at(self.glob, self.state.glob_index)
            {
                if posix_class::contains(name, c) == Some(true) {
                    is_match = true;
                }
                self.state.glob_index = end;
                first = false;
                continue;
            }

            let mut low = self.glob[self.state.glob_index];
            if !self.unescape(&mut low) {
                return Step::Return(false);
            }
            self.state.glob_index += 1;

            // If there is a - and the following character is not ], read the range end character.
            let high = if self.state.glob_index + 1 < self.glob.len()
                && self.glob[self.state.glob_index] == b'-'
                && self.glob[self.state.glob_index + 1] != b']'
            {
                self.state.glob_index += 1;
                let mut high = self.glob[self.state.glob_index];
                if !self.unescape(&mut high) {
                    return Step::Return(false);
                }
                self.state.glob_index += 1;
                high
            } else {
                low
            };

            if low <= c && c <= high {
                is_match = true;
            }
            first = false;
        }
        if self.state.glob_index >= self.glob.len() {
            return Step::Return(false);
        }
        self.state.glob_index += 1;
        if is_match != negated {
            self.state.add_char_capture(captures);
            self.state.path_index += 1;
            return Step::Continue;
        }
        Step::Backtrack
    }

    #[allow(clippy::cast_possible_truncation)]
    fn match_literal(&mut self, captures: &mut Option<&mut Vec<Capture>>) -> Step {
        let mut c = self.glob[self.state.glob_index];
        if !self.unescape(&mut c) {
            return Step::Return(false);
        }

        let is_match = if c == b'/' {
            is_separator(self.path[self.state.path_index] as char)
        } else {
            self.path[self.state.path_index] == c
        };

        if is_match {
            self.state.end_capture(captures);

            if self.brace_stack.length > 0
                && self.state.glob_index > 0
                && self.glob[self.state.glob_index - 1] == b'}'
            {
                self.brace_stack.longest_brace_match = self.state.path_index as u32 + 1;
                let snap = self.state;
                self.state = self.brace_stack.pop(&snap, captures);
            }
            self.state.glob_index += 1;
            self.state.path_index += 1;

            if c == b'/' {
                self.state.wildcard = self.state.globstar;
            }
            return Step::Continue;
        }
        Step::Backtrack
    }

    fn try_backtrack(&mut self, captures: &mut Option<&mut Vec<Capture>>, negated: bool) -> Step {
        // If we didn't match, restore state to the previous star pattern.
        if self.state.wildcard.path > 0 && self.state.wildcard.path as usize <= self.path.len() {
            self.state.backtrack();
            return Step::Continue;
        }

        if self.brace_stack.length > 0 {
            match self.skip_braces(captures, true) {
                BraceState::Invalid => return Step::Return(false),
                BraceState::Comma => {
                    self.state.path_index = self.brace_stack.last().path_index;
                    return Step::Continue;
                }
                BraceState::EndBrace => {
                    if self.brace_stack.longest_brace_match > 0 {
                        let snap = self.state;
                        self.state = self.brace_stack.pop(&snap, captures);
                        return Step::Continue;
                    }
                    self.state = *self.brace_stack.last();
                    self.brace_stack.length -= 1;
                    if let Some(captures) = captures {
                        captures.truncate(self.state.capture_index);
                    }
                    if self.state.wildcard.path > 0
                        && self.state.wildcard.path as usize <= self.path.len()
                    {
                        self.state.backtrack();
                        return Step::Continue;
                    }
                }
            }
        }

        Step::Return(negated)
    }

    #[allow(clippy::inline_always)]
    #[inline(always)]
    fn skip_globstars(&mut self) {
        let mut glob_index = self.state.glob_index + 2;
        while glob_index + 4 <= self.glob.len() && &self.glob[glob_index..glob_index + 4] == b"/**/"
        {
            glob_index += 3;
        }
        if glob_index + 3 == self.glob.len() && &self.glob[glob_index..] == b"/**" {
            glob_index += 3;
        }
        self.state.glob_index = glob_index - 2;
    }

    #[allow(clippy::inline_always, clippy::cast_possible_truncation)]
    #[inline(always)]
    fn skip_to_separator(&mut self, is_end_invalid: bool) {
        if self.state.path_index == self.path.len() {
            self.state.wildcard.path += 1;
            return;
        }

        let mut path_index = self.state.path_index + 1;
        while path_index < self.path.len() && !is_separator(self.path[path_index] as char) {
            path_index += 1;
        }

        if is_end_invalid && path_index == self.path.len() {
            path_index += 1;
        }

        self.state.wildcard.path = path_index as u32;
        self.state.globstar = self.state.wildcard;
    }

    fn skip_braces(
        &mut self,
        captures: &mut Option<&mut Vec<Capture>>,
        stop_on_comma: bool,
    ) -> BraceState {
        let mut braces = 1;
        let mut in_brackets = false;
        let mut capture_index = self.state.capture_index + 1;
        while self.state.glob_index < self.glob.len() && braces > 0 {
            match self.glob[self.state.glob_index] {
                b'{' if !in_brackets => braces += 1,
                b'}' if !in_brackets => braces -= 1,
                b',' if stop_on_comma && braces == 1 && !in_brackets => {
                    self.state.glob_index += 1;
                    return BraceState::Comma;
                }
                c @ (b'*' | b'?' | b'[') if !in_brackets => {
                    if c == b'[' {
                        in_brackets = true;
                    }
                    if let Some(captures) = captures {
                        if capture_index < captures.len() {
                            captures[capture_index] = self.state.path_index..self.state.path_index;
                        } else {
                            captures.push(self.state.path_index..self.state.path_index);
                        }
                        capture_index += 1;
                    }
                    if c == b'*'
                        && self.state.glob_index + 1 < self.glob.len()
                        && self.glob[self.state.glob_index + 1] == b'*'
                    {
                        self.skip_globstars();
                        self.state.glob_index += 1;
                    }
                }
                b']' => in_brackets = false,
                b'\\' => {
                    self.state.glob_index += 1;
                }
                _ => {}
            }
            self.state.glob_index += 1;
        }

        if braces != 0 {
            return BraceState::Invalid;
        }

        BraceState::EndBrace
    }
}

impl State {
    #[allow(clippy::inline_always)]
    #[inline(always)]
    fn backtrack(&mut self) {
        self.glob_index = self.wildcard.glob as usize;
        self.path_index = self.wildcard.path as usize;
        self.capture_index = self.wildcard.capture as usize;
    }

    #[allow(clippy::inline_always)]
    #[inline(always)]
    fn begin_capture(&self, captures: &mut Option<&mut Vec<Capture>>, capture: Capture) {
        if let Some(captures) = captures {
            if self.capture_index < captures.len() {
                captures[self.capture_index] = capture;
            } else {
                captures.push(capture);
            }
        }
    }

    #[allow(clippy::inline_always)]
    #[inline(always)]
    fn extend_capture(&self, captures: &mut Option<&mut Vec<Capture>>) {
        if let Some(captures) = captures
            && self.capture_index < captures.len()
        {
            captures[self.capture_index].end = self.path_index;
        }
    }

    #[allow(clippy::inline_always)]
    #[inline(always)]
    fn end_capture(&mut self, captures: &mut Option<&mut Vec<Capture>>) {
        if let Some(captures) = captures
            && self.capture_index < captures.len()
        {
            self.capture_index += 1;
        }
    }

    #[allow(clippy::inline_always)]
    #[inline(always)]
    fn add_char_capture(&mut self, captures: &mut Option<&mut Vec<Capture>>) {
        self.end_capture(captures);
        self.begin_capture(captures, self.path_index..self.path_index + 1);
        self.capture_index += 1;
    }
}

impl Default for BraceStack {
    #[inline]
    fn default() -> Self {
        // Manual implementation is faster than the automatically derived one.
        BraceStack {
            stack: [State::default(); 10],
            length: 0,
            longest_brace_match: 0,
        }
    }
}

impl BraceStack {
    #[allow(clippy::inline_always)]
    #[inline(always)]
    fn push(&mut self, state: &State) -> State {
        // Push old state to the stack, and reset current state.
        self.stack[self.length as usize] = *state;
        self.length += 1;
        State {
            path_index: state.path_index,
            glob_index: state.glob_index + 1,
            capture_index: state.capture_index + 1,
            ..State::default()
        }
    }

    #[allow(clippy::inline_always)]
    #[inline(always)]
    fn pop(&mut self, state: &State, captures: &mut Option<&mut Vec<Capture>>) -> State {
        self.length -= 1;
        let mut state = State {
            path_index: (self.longest_brace_match - 1) as usize,
            glob_index: state.glob_index,
            // But restore star state if needed later.
            wildcard: self.stack[self.length as usize].wildcard,
            globstar: self.stack[self.length as usize].globstar,
            capture_index: self.stack[self.length as usize].capture_index,
        };
        if self.length == 0 {
            self.longest_brace_match = 0;
        }
        state.extend_capture(captures);
        if let Some(captures) = captures {
            state.capture_index = captures.len();
        }

        state
    }

    #[allow(clippy::inline_always)]
    #[inline(always)]
    fn last(&self) -> &State {
        &self.stack[self.length as usize - 1]
    }
}
