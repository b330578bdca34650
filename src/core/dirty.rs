use crate::core::table::FIELD_POSITIONS;

/// Set of channel indices changed since the last frame.
///
/// A table maps at most 63 positions, so one word holds every channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DirtySet(u64);

const _: () = assert!(FIELD_POSITIONS <= u64::BITS as usize);

impl DirtySet {
    pub const fn new() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, index: usize) {
        debug_assert!(index < FIELD_POSITIONS);
        self.0 |= 1u64 << index;
    }

    pub fn contains(&self, index: usize) -> bool {
        index < FIELD_POSITIONS && self.0 & (1u64 << index) != 0
    }

    pub fn union_with(&mut self, other: DirtySet) {
        self.0 |= other.0;
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Indices in ascending (table) order.
    pub fn iter(&self) -> DirtyIter {
        DirtyIter(self.0)
    }
}

impl FromIterator<usize> for DirtySet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = DirtySet::new();
        for index in iter {
            set.insert(index);
        }
        set
    }
}

impl IntoIterator for DirtySet {
    type Item = usize;
    type IntoIter = DirtyIter;

    fn into_iter(self) -> DirtyIter {
        self.iter()
    }
}

pub struct DirtyIter(u64);

impl Iterator for DirtyIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let index = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}
