use std::fmt;

use crate::charclass::CharClass;

/// A partition of all 256 byte values into equivalence classes, built by
/// successive refinement as character classes are registered.
///
/// The partition starts with a single symbol covering every byte. Each
/// registered character class splits every existing symbol that contains
/// both a member and a non-member of the class. Bytes that remain in the
/// same symbol after every class has been registered are indistinguishable
/// to the automaton, so its transition tables only need one column per
/// symbol instead of one per byte value.
#[derive(Clone, Debug)]
pub struct ByteClassSet {
    map: [u8; 256],
    len: usize,
}

impl ByteClassSet {
    /// Create a partition where all bytes belong to one symbol.
    pub fn new() -> ByteClassSet {
        ByteClassSet { map: [0; 256], len: 1 }
    }

    /// Refine the partition with the given character class.
    ///
    /// Every symbol containing both a member and a non-member of the class
    /// is split in two: the members keep the symbol's identifier and the
    /// non-members move to a fresh one, so refinement is deterministic.
    /// This is O(symbols) per class and the symbol count is bounded by
    /// min(256, distinct classes + 1).
    pub fn add_class(&mut self, class: &CharClass) {
        let old_len = self.len;
        let mut has_member = vec![false; old_len];
        let mut has_other = vec![false; old_len];
        for b in 0..256 {
            let sym = self.map[b] as usize;
            if class.contains(b as u8) {
                has_member[sym] = true;
            } else {
                has_other[sym] = true;
            }
        }
        let mut split: Vec<Option<u8>> = vec![None; old_len];
        for b in 0..256 {
            let sym = self.map[b] as usize;
            if sym >= old_len || !has_member[sym] || !has_other[sym] {
                continue;
            }
            if !class.contains(b as u8) {
                let fresh = match split[sym] {
                    Some(id) => id,
                    None => {
                        let id = self.len as u8;
                        self.len += 1;
                        split[sym] = Some(id);
                        id
                    }
                };
                self.map[b] = fresh;
            }
        }
    }

    /// Freeze the partition into a byte class map.
    pub fn byte_classes(&self) -> ByteClasses {
        ByteClasses { map: self.map, len: self.len }
    }
}

/// A frozen byte-to-symbol map with two sentinel input units.
///
/// This is built once per compiled pattern set and shared read-only by every
/// subsequent match. In addition to the byte symbols, the alphabet carries
/// two sentinel units that are never produced by classifying a byte: a
/// begin-of-input unit and an end-of-input unit. The match routines feed
/// them when the caller asserts the corresponding anchor, which is how
/// `^`/`$` and the begin/end match flags are realized in a plain DFA.
#[derive(Clone, Copy)]
pub struct ByteClasses {
    map: [u8; 256],
    len: usize,
}

impl ByteClasses {
    /// Get the equivalence-class symbol for the given byte.
    #[inline]
    pub fn get(&self, byte: u8) -> usize {
        self.map[byte as usize] as usize
    }

    /// The total number of input units, including the two sentinels.
    #[inline]
    pub fn alphabet_len(&self) -> usize {
        self.len + 2
    }

    /// The begin-of-input sentinel unit.
    #[inline]
    pub fn bol(&self) -> usize {
        self.len
    }

    /// The end-of-input sentinel unit.
    #[inline]
    pub fn eol(&self) -> usize {
        self.len + 1
    }

    /// One arbitrary representative byte per byte symbol, indexed by symbol.
    ///
    /// Any two bytes in the same symbol are indistinguishable by every
    /// registered character class, so testing a class against the
    /// representative answers for the whole symbol. This is what lets
    /// subset construction explore one byte per symbol instead of all 256.
    pub fn representatives(&self) -> Vec<u8> {
        let mut reps = vec![0u8; self.len];
        let mut seen = vec![false; self.len];
        for b in 0..256 {
            let sym = self.map[b] as usize;
            if !seen[sym] {
                seen[sym] = true;
                reps[sym] = b as u8;
            }
        }
        reps
    }
}

impl fmt::Debug for ByteClasses {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ByteClasses(")?;
        for sym in 0..self.len {
            if sym > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} => [", sym)?;
            let mut first = true;
            let mut b = 0usize;
            while b < 256 {
                if self.map[b] as usize != sym {
                    b += 1;
                    continue;
                }
                let start = b;
                while b < 256 && self.map[b] as usize == sym {
                    b += 1;
                }
                if !first {
                    write!(f, ", ")?;
                }
                first = false;
                if start == b - 1 {
                    write!(f, "{:?}", start as u8)?;
                } else {
                    write!(f, "{:?}-{:?}", start as u8, (b - 1) as u8)?;
                }
            }
            write!(f, "]")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::ByteClassSet;
    use crate::charclass::CharClass;

    #[test]
    fn one_class_splits_once() {
        let mut set = ByteClassSet::new();
        set.add_class(&CharClass::range(b'a', b'z'));
        let classes = set.byte_classes();
        // two byte symbols plus the two sentinel units
        assert_eq!(4, classes.alphabet_len());
        assert_eq!(classes.get(b'a'), classes.get(b'z'));
        assert_ne!(classes.get(b'a'), classes.get(b'A'));
    }

    #[test]
    fn refinement_is_minimal() {
        let mut set = ByteClassSet::new();
        set.add_class(&CharClass::range(b'a', b'z'));
        set.add_class(&CharClass::range(b'a', b'c'));
        let classes = set.byte_classes();
        // {a-c}, {d-z}, {rest}
        assert_eq!(3 + 2, classes.alphabet_len());
        assert_eq!(classes.get(b'a'), classes.get(b'c'));
        assert_eq!(classes.get(b'd'), classes.get(b'z'));
        assert_ne!(classes.get(b'a'), classes.get(b'd'));
    }

    #[test]
    fn overlapping_classes() {
        let mut set = ByteClassSet::new();
        set.add_class(&CharClass::range(b'a', b'm'));
        set.add_class(&CharClass::range(b'g', b'z'));
        let classes = set.byte_classes();
        // {a-f}, {g-m}, {n-z}, {rest}
        assert_eq!(4 + 2, classes.alphabet_len());
        assert_eq!(classes.get(b'a'), classes.get(b'f'));
        assert_eq!(classes.get(b'g'), classes.get(b'm'));
        assert_eq!(classes.get(b'n'), classes.get(b'z'));
        assert_ne!(classes.get(b'f'), classes.get(b'g'));
        assert_ne!(classes.get(b'm'), classes.get(b'n'));
    }

    #[test]
    fn identical_classes_do_not_split() {
        let mut set = ByteClassSet::new();
        set.add_class(&CharClass::range(b'0', b'9'));
        set.add_class(&CharClass::range(b'0', b'9'));
        let classes = set.byte_classes();
        assert_eq!(2 + 2, classes.alphabet_len());
    }

    #[test]
    fn representatives_cover_every_symbol() {
        let mut set = ByteClassSet::new();
        set.add_class(&CharClass::range(b'a', b'm'));
        set.add_class(&CharClass::range(b'g', b'z'));
        let classes = set.byte_classes();
        let reps = classes.representatives();
        assert_eq!(classes.alphabet_len() - 2, reps.len());
        for (sym, &rep) in reps.iter().enumerate() {
            assert_eq!(sym, classes.get(rep));
        }
    }
}
