use std::fmt;
use std::hash::{Hash, Hasher};

/// A set of byte values, optionally complemented.
///
/// Character classes are the alphabet-level leaves of pattern structure:
/// every consuming NFA edge references one. Equality and hashing are defined
/// over *effective* membership (after applying the negation flag), so that a
/// class built as the complement of `[a]` compares equal to a directly built
/// class containing every byte except `a`. Identical effective classes
/// therefore collapse when the equivalence-class table is computed.
#[derive(Clone, Copy)]
pub struct CharClass {
    /// One bit per byte value.
    bits: [u128; 2],
    /// When set, membership is complemented.
    negated: bool,
}

impl CharClass {
    /// Create a class containing no bytes.
    pub fn empty() -> CharClass {
        CharClass { bits: [0; 2], negated: false }
    }

    /// Create a class containing exactly one byte.
    pub fn byte(b: u8) -> CharClass {
        let mut class = CharClass::empty();
        class.add(b);
        class
    }

    /// Create a class containing the inclusive range of bytes given.
    pub fn range(start: u8, end: u8) -> CharClass {
        let mut class = CharClass::empty();
        class.add_range(start, end);
        class
    }

    /// The designated wildcard class. In single line mode it contains every
    /// byte value; otherwise the newline byte is excluded.
    pub fn any(single_line: bool) -> CharClass {
        let mut class = CharClass::range(0, 255);
        if !single_line {
            class.remove(b'\n');
        }
        class
    }

    /// Add a byte to this class.
    pub fn add(&mut self, byte: u8) {
        let bucket = byte / 128;
        let bit = byte % 128;
        self.bits[bucket as usize] |= 1 << bit;
    }

    /// Add an inclusive range of bytes.
    pub fn add_range(&mut self, start: u8, end: u8) {
        debug_assert!(start <= end);
        for b in start..=end {
            self.add(b);
        }
    }

    /// Remove a byte from this class.
    pub fn remove(&mut self, byte: u8) {
        let bucket = byte / 128;
        let bit = byte % 128;
        self.bits[bucket as usize] &= !(1 << bit);
    }

    /// Complement this class.
    pub fn negate(&mut self) {
        self.negated = !self.negated;
    }

    /// Return true if and only if the given byte is a member, accounting for
    /// negation.
    pub fn contains(&self, byte: u8) -> bool {
        let bucket = byte / 128;
        let bit = byte % 128;
        let raw = self.bits[bucket as usize] & (1 << bit) > 0;
        raw != self.negated
    }

    /// The number of member bytes, accounting for negation.
    pub fn len(&self) -> usize {
        let ones =
            self.bits[0].count_ones() as usize + self.bits[1].count_ones() as usize;
        if self.negated {
            256 - ones
        } else {
            ones
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Membership bits with negation applied.
    fn effective(&self) -> [u128; 2] {
        if self.negated {
            [!self.bits[0], !self.bits[1]]
        } else {
            self.bits
        }
    }

    /// Iterate over the contiguous ranges of member bytes, in order.
    pub fn ranges(&self) -> CharClassRanges {
        CharClassRanges { class: *self, byte: 0, done: false }
    }
}

impl PartialEq for CharClass {
    fn eq(&self, other: &CharClass) -> bool {
        self.effective() == other.effective()
    }
}

impl Eq for CharClass {}

impl Hash for CharClass {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.effective().hash(state);
    }
}

impl fmt::Debug for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CharClass(")?;
        for (i, (start, end)) in self.ranges().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if start == end {
                write!(f, "{:?}", start)?;
            } else {
                write!(f, "{:?}-{:?}", start, end)?;
            }
        }
        write!(f, ")")
    }
}

/// An iterator over the contiguous member ranges of a class.
#[derive(Debug)]
pub struct CharClassRanges {
    class: CharClass,
    byte: usize,
    done: bool,
}

impl Iterator for CharClassRanges {
    type Item = (u8, u8);

    fn next(&mut self) -> Option<(u8, u8)> {
        if self.done {
            return None;
        }
        while self.byte < 256 && !self.class.contains(self.byte as u8) {
            self.byte += 1;
        }
        if self.byte >= 256 {
            self.done = true;
            return None;
        }
        let start = self.byte as u8;
        while self.byte < 256 && self.class.contains(self.byte as u8) {
            self.byte += 1;
        }
        let end = (self.byte - 1) as u8;
        if self.byte >= 256 {
            self.done = true;
        }
        Some((start, end))
    }
}
