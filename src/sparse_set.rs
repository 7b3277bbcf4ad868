/// A sparse set used for representing ordered NFA state sets.
///
/// This supports constant time addition and membership testing. Clearing an
/// entire set can also be done in constant time. Iteration yields elements
/// in the order in which they were inserted, which is what makes the
/// deterministic-state keys built from it canonical.
///
/// The data structure is based on: https://research.swtch.com/sparse
/// Note though that we don't actually use uninitialized memory. We generally
/// reuse sparse sets, so the initial allocation cost is bearable.
#[derive(Clone, Debug)]
pub struct SparseSet {
    /// The number of elements currently in this set.
    len: usize,
    /// Elements in the order in which they were inserted.
    dense: Vec<usize>,
    /// Maps an element to its location in dense.
    ///
    /// An element is in the set if and only if
    /// sparse[el] < len && el == dense[sparse[el]].
    sparse: Vec<usize>,
}

impl SparseSet {
    pub fn new(size: usize) -> SparseSet {
        SparseSet { len: 0, dense: vec![0; size], sparse: vec![0; size] }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, value: usize) {
        let i = self.len;
        assert!(i < self.dense.len(), "{} exceeds capacity", value);
        self.dense[i] = value;
        self.sparse[value] = i;
        self.len += 1;
    }

    pub fn contains(&self, value: usize) -> bool {
        let i = self.sparse[value];
        i < self.len && self.dense[i] == value
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.dense[..self.len].iter().copied()
    }
}
