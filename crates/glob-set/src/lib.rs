#![doc = include_str!("../README.md")]
#![no_std]
extern crate alloc;

mod engine;
mod error;
mod glob;
mod literal;
mod map;
mod parse;
mod set;
mod strategy;
mod tinyset;

pub use crate::error::{Error, ErrorKind};
pub use crate::glob::{Candidate, Glob, GlobBuilder, GlobMatcher};
pub use crate::map::{GlobMap, GlobMapBuilder};
pub use crate::set::{GlobSet, GlobSetBuilder};
pub use crate::tinyset::{TinyGlobSet, TinyGlobSetBuilder};

use alloc::string::String;

/// Escape all special glob characters in the given string.
///
/// The returned string, when used as a glob pattern, will match the input
/// string literally.
pub fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '*' | '?' | '[' | ']' | '{' | '}' | '\\' | '!' | '^' | ',' => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}
