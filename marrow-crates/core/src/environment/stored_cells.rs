use crate::containers::StorageKey;

/// A backtrackable integer cell of an [`Environment`](super::Environment).
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct StoredInt(u32);

impl StorageKey for StoredInt {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        StoredInt(index as u32)
    }
}

/// A double cell of an [`Environment`](super::Environment); it is backtrackable when written
/// through [`Environment::set_double`](super::Environment::set_double) and keeps its value across
/// pops when written through the untrailed setters.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct StoredDouble(u32);

impl StorageKey for StoredDouble {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        StoredDouble(index as u32)
    }
}

/// A fixed-capacity backtrackable bitset, backed by a contiguous run of words of the
/// [`Environment`](super::Environment).
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct StoredBitSet {
    pub(super) first_word: usize,
    pub(super) num_words: usize,
    pub(super) capacity: usize,
}

impl StoredBitSet {
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub(super) fn word_of(&self, bit: usize) -> usize {
        self.first_word + bit / 64
    }
}

/// The bit owned by one boolean variable in the boolean slot pool of an
/// [`Environment`](super::Environment).
///
/// A set bit in `unfixed` means the variable is not instantiated; otherwise its value is the bit
/// in `value`.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct BoolSlot {
    pub(super) unfixed: StoredBitSet,
    pub(super) value: StoredBitSet,
    pub(super) bit: usize,
}
