use std::marker::PhantomData;

use super::StorageKey;

/// Hands out fresh [`StorageKey`]s for identifiers which are not backed by a [`KeyedVec`], such
/// as the ids of variable monitors.
///
/// [`KeyedVec`]: super::KeyedVec
#[derive(Clone, Copy, Debug)]
pub struct KeyGenerator<Key> {
    key: PhantomData<Key>,
    counter: usize,
}

impl<Key> Default for KeyGenerator<Key> {
    fn default() -> Self {
        Self {
            key: PhantomData,
            counter: 0,
        }
    }
}

impl<Key: StorageKey> KeyGenerator<Key> {
    /// Generate a new `Key`.
    pub fn next_key(&mut self) -> Key {
        let key = Key::create_from_index(self.counter);
        self.counter += 1;
        key
    }

    /// The number of keys handed out so far.
    pub fn len(&self) -> usize {
        self.counter
    }

    pub fn is_empty(&self) -> bool {
        self.counter == 0
    }
}
