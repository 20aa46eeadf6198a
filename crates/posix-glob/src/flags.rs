//! Behavior flags, bitflags-style. Bit positions are arbitrary (this crate
//! has no ABI to match), but the flag set mirrors conventional `glob(3)`
//! naming so a caller porting C-shaped code finds the same names.

use core::ops::{BitAnd, BitOr, BitOrAssign};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Flags(u32);

macro_rules! flag {
    ($name:ident, $bit:expr) => {
        pub const $name: Flags = Flags(1 << $bit);
    };
}

impl Flags {
    pub const NONE: Flags = Flags(0);

    flag!(ERR, 0);
    flag!(MARK, 1);
    flag!(NOSORT, 2);
    flag!(DOOFFS, 3);
    flag!(NOCHECK, 4);
    flag!(APPEND, 5);
    flag!(NOESCAPE, 6);
    flag!(PERIOD, 7);
    /// Output-only: set in the result when a wildcard was encountered.
    flag!(MAGCHAR, 8);
    flag!(ALTDIRFUNC, 9);
    flag!(BRACE, 10);
    flag!(NOMAGIC, 11);
    flag!(TILDE, 12);
    flag!(ONLYDIR, 13);
    flag!(TILDE_CHECK, 14);
    flag!(GITIGNORE, 15);
    flag!(DOUBLESTAR_RECURSIVE, 16);
    flag!(EXTGLOB, 17);

    #[must_use]
    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn insert(self, other: Flags) -> Flags {
        Flags(self.0 | other.0)
    }

    #[must_use]
    pub const fn remove(self, other: Flags) -> Flags {
        Flags(self.0 & !other.0)
    }
}

impl BitOr for Flags {
    type Output = Flags;
    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Flags {
    type Output = Flags;
    fn bitand(self, rhs: Flags) -> Flags {
        Flags(self.0 & rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_and_test() {
        let f = Flags::MARK | Flags::BRACE | Flags::EXTGLOB;
        assert!(f.contains(Flags::MARK));
        assert!(f.contains(Flags::BRACE));
        assert!(!f.contains(Flags::NOSORT));
    }

    #[test]
    fn remove_flag() {
        let f = (Flags::MARK | Flags::NOSORT).remove(Flags::NOSORT);
        assert!(f.contains(Flags::MARK));
        assert!(!f.contains(Flags::NOSORT));
    }
}
