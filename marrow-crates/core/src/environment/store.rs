use log::trace;

use super::BoolSlot;
use super::StoredBitSet;
use super::StoredDouble;
use super::StoredInt;
use super::UndoAction;
use crate::basic_types::Trail;
use crate::containers::KeyedVec;
use crate::marrow_assert_moderate;
use crate::marrow_assert_simple;

/// Stamp of a cell which has not been saved in any world yet; the first trailed write to such a
/// cell always records its previous value.
const NEVER_SAVED: u64 = u64::MAX;

#[derive(Clone, Copy, Debug)]
struct Stamped<T> {
    value: T,
    /// The timestamp of the world in which the value was last saved on the trail.
    stamp: u64,
}

impl<T> Stamped<T> {
    fn new(value: T) -> Self {
        Stamped {
            value,
            stamp: NEVER_SAVED,
        }
    }
}

#[derive(Debug, Default)]
struct Cells {
    ints: KeyedVec<StoredInt, Stamped<i64>>,
    doubles: KeyedVec<StoredDouble, Stamped<f64>>,
    words: Vec<Stamped<u64>>,
}

impl Cells {
    fn undo(&mut self, action: UndoAction) {
        match action {
            UndoAction::RestoreInt { cell, value } => self.ints[cell].value = value,
            UndoAction::RestoreDouble { cell, value } => self.doubles[cell].value = value,
            UndoAction::RestoreWord { word, value } => self.words[word].value = value,
            UndoAction::RevokeWeight { cell, amount } => {
                let weight = &mut self.doubles[cell].value;
                *weight = (*weight - amount).max(0.0);
            }
        }
    }
}

/// The backtrackable memory of a model.
///
/// The environment is a stack of *worlds*. Writes through the trailed setters are visible
/// immediately and are undone when the world in which they were made is popped. The root world
/// (index 0) is never popped, so writes made in it are not recorded.
///
/// Next to the trailed cells, the environment offers deferred restores ([`Environment::save`] and
/// [`Environment::save_at`]) which are applied when a given world pops, after the trailed writes
/// of that world have been undone.
#[derive(Debug)]
pub struct Environment {
    cells: Cells,
    trail: Trail<UndoAction>,
    /// The restores registered through [`Environment::save_at`], indexed by the world whose pop
    /// applies them.
    deferred: Vec<Vec<UndoAction>>,
    timestamp: u64,
    /// The bitsets (unfixed, value) of the boolean slot pool, 64 slots per pair.
    bool_chunks: Vec<(StoredBitSet, StoredBitSet)>,
    num_bool_slots: usize,
}

impl Default for Environment {
    fn default() -> Self {
        Environment {
            cells: Cells::default(),
            trail: Trail::default(),
            deferred: vec![Vec::new()],
            timestamp: 0,
            bool_chunks: Vec::new(),
            num_bool_slots: 0,
        }
    }
}

impl Environment {
    /// The index of the current world; the root world has index 0.
    pub fn world_index(&self) -> usize {
        self.trail.current_world()
    }

    /// A counter which increases on every push and pop.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn world_push(&mut self) {
        self.trail.new_world();
        self.timestamp += 1;

        let world = self.trail.current_world();
        if self.deferred.len() <= world {
            self.deferred.push(Vec::new());
        }
        marrow_assert_moderate!(self.deferred[world].is_empty());
    }

    /// Pops the current world, restoring every trailed write made in it and applying the restores
    /// registered for it.
    pub fn world_pop(&mut self) {
        let world = self.trail.current_world();
        marrow_assert_simple!(world > 0, "the root world cannot be popped");

        self.timestamp += 1;
        for action in self.trail.synchronise(world - 1) {
            self.cells.undo(action);
        }

        let deferred = std::mem::take(&mut self.deferred[world]);
        if !deferred.is_empty() {
            trace!("applying {} deferred restores of world {world}", deferred.len());
        }
        for action in deferred.into_iter().rev() {
            self.cells.undo(action);
        }
    }

    /// Pops worlds until `world` is the current world.
    pub fn world_pop_until(&mut self, world: usize) {
        marrow_assert_simple!(world <= self.world_index());
        while self.world_index() > world {
            self.world_pop();
        }
    }

    /// Registers `action` to be applied when the current world pops.
    pub fn save(&mut self, action: UndoAction) {
        if self.world_index() > 0 {
            self.trail.push(action);
        }
    }

    /// Registers `action` to be applied when `world` pops.
    ///
    /// Restores registered for the root world are dropped since the root world never pops.
    pub fn save_at(&mut self, action: UndoAction, world: usize) {
        marrow_assert_simple!(
            world <= self.world_index(),
            "cannot register a restore for world {world} above the current world {}",
            self.world_index()
        );
        if world == 0 {
            return;
        }
        self.deferred[world].push(action);
    }

    pub fn make_int(&mut self, value: i64) -> StoredInt {
        self.cells.ints.push(Stamped::new(value))
    }

    pub fn get_int(&self, cell: StoredInt) -> i64 {
        self.cells.ints[cell].value
    }

    pub fn set_int(&mut self, cell: StoredInt, value: i64) {
        let world = self.trail.current_world();
        let entry = &mut self.cells.ints[cell];
        if entry.value == value {
            return;
        }
        if world > 0 && entry.stamp != self.timestamp {
            self.trail.push(UndoAction::RestoreInt {
                cell,
                value: entry.value,
            });
            entry.stamp = self.timestamp;
        }
        entry.value = value;
    }

    /// Adds `delta` to the cell and returns the new value.
    pub fn add_int(&mut self, cell: StoredInt, delta: i64) -> i64 {
        let value = self.get_int(cell) + delta;
        self.set_int(cell, value);
        value
    }

    pub fn make_double(&mut self, value: f64) -> StoredDouble {
        self.cells.doubles.push(Stamped::new(value))
    }

    pub fn get_double(&self, cell: StoredDouble) -> f64 {
        self.cells.doubles[cell].value
    }

    pub fn set_double(&mut self, cell: StoredDouble, value: f64) {
        let world = self.trail.current_world();
        let entry = &mut self.cells.doubles[cell];
        if entry.value.to_bits() == value.to_bits() {
            return;
        }
        if world > 0 && entry.stamp != self.timestamp {
            self.trail.push(UndoAction::RestoreDouble {
                cell,
                value: entry.value,
            });
            entry.stamp = self.timestamp;
        }
        entry.value = value;
    }

    /// Writes a double which keeps its value when worlds are popped.
    pub fn set_double_untrailed(&mut self, cell: StoredDouble, value: f64) {
        self.cells.doubles[cell].value = value;
    }

    pub fn add_double_untrailed(&mut self, cell: StoredDouble, delta: f64) -> f64 {
        let entry = &mut self.cells.doubles[cell];
        entry.value += delta;
        entry.value
    }

    /// Creates a bitset able to hold the bits `0..capacity`, all of them cleared.
    pub fn make_bitset(&mut self, capacity: usize) -> StoredBitSet {
        let num_words = capacity.div_ceil(64);
        let first_word = self.cells.words.len();
        self.cells
            .words
            .resize(first_word + num_words, Stamped::new(0));

        StoredBitSet {
            first_word,
            num_words,
            capacity,
        }
    }

    fn word(&self, word: usize) -> u64 {
        self.cells.words[word].value
    }

    fn write_word(&mut self, word: usize, value: u64) {
        let world = self.trail.current_world();
        let entry = &mut self.cells.words[word];
        if entry.value == value {
            return;
        }
        if world > 0 && entry.stamp != self.timestamp {
            self.trail.push(UndoAction::RestoreWord {
                word,
                value: entry.value,
            });
            entry.stamp = self.timestamp;
        }
        entry.value = value;
    }

    pub fn get_bit(&self, bitset: StoredBitSet, bit: usize) -> bool {
        bit < bitset.capacity && self.word(bitset.word_of(bit)) & (1 << (bit % 64)) != 0
    }

    pub fn set_bit(&mut self, bitset: StoredBitSet, bit: usize) {
        self.update_range(bitset, bit, bit, true);
    }

    pub fn clear_bit(&mut self, bitset: StoredBitSet, bit: usize) {
        self.update_range(bitset, bit, bit, false);
    }

    /// Sets the bits `from..=to`.
    pub fn set_range(&mut self, bitset: StoredBitSet, from: usize, to: usize) {
        self.update_range(bitset, from, to, true);
    }

    /// Clears the bits `from..=to`.
    pub fn clear_range(&mut self, bitset: StoredBitSet, from: usize, to: usize) {
        self.update_range(bitset, from, to, false);
    }

    pub fn clear_all(&mut self, bitset: StoredBitSet) {
        if bitset.capacity > 0 {
            self.update_range(bitset, 0, bitset.capacity - 1, false);
        }
    }

    fn update_range(&mut self, bitset: StoredBitSet, from: usize, to: usize, set: bool) {
        marrow_assert_simple!(
            to < bitset.capacity,
            "bit {to} is out of the bounds of a bitset of capacity {}",
            bitset.capacity
        );

        let mut bit = from;
        while bit <= to {
            let word = bitset.word_of(bit);
            let start = bit % 64;
            let end = 63.min(start + (to - bit));
            let mask = (u64::MAX >> (63 - end)) & (u64::MAX << start);

            let old = self.word(word);
            let new = if set { old | mask } else { old & !mask };
            self.write_word(word, new);

            bit += end - start + 1;
        }
    }

    /// The smallest set bit at or after `from`.
    pub fn next_set_bit(&self, bitset: StoredBitSet, from: usize) -> Option<usize> {
        if from >= bitset.capacity {
            return None;
        }

        let mut word_index = from / 64;
        let mut word = self.word(bitset.first_word + word_index) & (u64::MAX << (from % 64));
        loop {
            if word != 0 {
                let bit = word_index * 64 + word.trailing_zeros() as usize;
                return (bit < bitset.capacity).then_some(bit);
            }
            word_index += 1;
            if word_index >= bitset.num_words {
                return None;
            }
            word = self.word(bitset.first_word + word_index);
        }
    }

    /// The largest set bit at or before `from`.
    pub fn previous_set_bit(&self, bitset: StoredBitSet, from: usize) -> Option<usize> {
        if bitset.capacity == 0 {
            return None;
        }
        let from = from.min(bitset.capacity - 1);

        let mut word_index = from / 64;
        let mut word = self.word(bitset.first_word + word_index) & (u64::MAX >> (63 - from % 64));
        loop {
            if word != 0 {
                return Some(word_index * 64 + 63 - word.leading_zeros() as usize);
            }
            if word_index == 0 {
                return None;
            }
            word_index -= 1;
            word = self.word(bitset.first_word + word_index);
        }
    }

    /// The smallest cleared bit at or after `from`; bits at or beyond the capacity count as
    /// cleared.
    pub fn next_clear_bit(&self, bitset: StoredBitSet, from: usize) -> usize {
        if from >= bitset.capacity {
            return from;
        }

        let mut word_index = from / 64;
        let mut word = !self.word(bitset.first_word + word_index) & (u64::MAX << (from % 64));
        loop {
            if word != 0 {
                let bit = word_index * 64 + word.trailing_zeros() as usize;
                return bit.min(bitset.capacity);
            }
            word_index += 1;
            if word_index >= bitset.num_words {
                return bitset.capacity;
            }
            word = !self.word(bitset.first_word + word_index);
        }
    }

    /// The largest cleared bit at or before `from`.
    pub fn previous_clear_bit(&self, bitset: StoredBitSet, from: usize) -> Option<usize> {
        if from >= bitset.capacity {
            return Some(from);
        }

        let mut word_index = from / 64;
        let mut word = !self.word(bitset.first_word + word_index) & (u64::MAX >> (63 - from % 64));
        loop {
            if word != 0 {
                return Some(word_index * 64 + 63 - word.leading_zeros() as usize);
            }
            if word_index == 0 {
                return None;
            }
            word_index -= 1;
            word = !self.word(bitset.first_word + word_index);
        }
    }

    /// The number of set bits.
    pub fn cardinality(&self, bitset: StoredBitSet) -> usize {
        (0..bitset.num_words)
            .map(|index| self.word(bitset.first_word + index).count_ones() as usize)
            .sum()
    }

    /// Hands out a fresh slot of the boolean pool; the slot starts out unfixed in every world.
    pub fn allocate_bool_slot(&mut self) -> BoolSlot {
        // Above the root, a chunk may already have been saved in the current world, and a pop
        // would then restore a word without the new slot; such slots get a chunk of their own.
        if self.num_bool_slots % 64 == 0 || self.world_index() > 0 {
            self.num_bool_slots = self.num_bool_slots.next_multiple_of(64);
            let unfixed = self.make_bitset(64);
            let value = self.make_bitset(64);
            self.bool_chunks.push((unfixed, value));
        }
        let bit = self.num_bool_slots % 64;
        let (unfixed, value) = self.bool_chunks[self.num_bool_slots / 64];
        self.num_bool_slots += 1;

        // Untrailed: popping the world in which the slot was handed out must not fix it.
        self.cells.words[unfixed.word_of(bit)].value |= 1 << bit;

        BoolSlot {
            unfixed,
            value,
            bit,
        }
    }

    pub fn bool_value(&self, slot: BoolSlot) -> Option<bool> {
        if self.get_bit(slot.unfixed, slot.bit) {
            None
        } else {
            Some(self.get_bit(slot.value, slot.bit))
        }
    }

    pub fn fix_bool(&mut self, slot: BoolSlot, value: bool) {
        self.clear_bit(slot.unfixed, slot.bit);
        if value {
            self.set_bit(slot.value, slot.bit);
        } else {
            self.clear_bit(slot.value, slot.bit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popping_restores_the_values_of_the_popped_world() {
        let mut environment = Environment::default();
        let cell = environment.make_int(3);

        environment.world_push();
        environment.set_int(cell, 5);
        environment.world_push();
        environment.set_int(cell, 7);
        environment.set_int(cell, 9);

        environment.world_pop();
        assert_eq!(5, environment.get_int(cell));
        environment.world_pop();
        assert_eq!(3, environment.get_int(cell));
    }

    #[test]
    fn timestamp_distinguishes_worlds_with_the_same_index() {
        let mut environment = Environment::default();

        environment.world_push();
        let first = environment.timestamp();
        environment.world_pop();
        environment.world_push();

        assert_eq!(1, environment.world_index());
        assert!(environment.timestamp() > first);
    }

    #[test]
    fn writes_after_a_pop_are_recorded_again() {
        let mut environment = Environment::default();
        let cell = environment.make_int(0);

        environment.world_push();
        environment.set_int(cell, 1);
        environment.world_push();
        environment.set_int(cell, 2);
        environment.world_pop();
        environment.set_int(cell, 3);
        environment.world_pop();

        assert_eq!(0, environment.get_int(cell));
    }

    #[test]
    fn cells_created_in_a_world_restore_their_initial_value() {
        let mut environment = Environment::default();
        environment.world_push();
        let cell = environment.make_int(4);
        environment.set_int(cell, 10);

        environment.world_pop();

        assert_eq!(4, environment.get_int(cell));
    }

    #[test]
    fn pop_until_pops_multiple_worlds() {
        let mut environment = Environment::default();
        let cell = environment.make_double(1.0);

        environment.world_push();
        environment.set_double(cell, 2.0);
        environment.world_push();
        environment.world_push();
        environment.set_double(cell, 3.0);

        environment.world_pop_until(1);
        assert_eq!(1, environment.world_index());
        assert_eq!(2.0, environment.get_double(cell));
    }

    #[test]
    fn deferred_restore_fires_when_its_world_pops() {
        let mut environment = Environment::default();
        let weight = environment.make_double(0.0);

        environment.world_push();
        environment.world_push();
        environment.world_push();
        let _ = environment.add_double_untrailed(weight, 1.0);
        environment.save_at(
            UndoAction::RevokeWeight {
                cell: weight,
                amount: 1.0,
            },
            2,
        );

        environment.world_pop();
        assert_eq!(1.0, environment.get_double(weight));
        environment.world_pop();
        assert_eq!(0.0, environment.get_double(weight));
    }

    #[test]
    fn restores_registered_for_the_root_world_never_fire() {
        let mut environment = Environment::default();
        let weight = environment.make_double(2.0);

        environment.world_push();
        environment.save_at(
            UndoAction::RevokeWeight {
                cell: weight,
                amount: 1.0,
            },
            0,
        );
        environment.world_pop();

        assert_eq!(2.0, environment.get_double(weight));
    }

    #[test]
    fn revoking_a_weight_saturates_at_zero() {
        let mut environment = Environment::default();
        let weight = environment.make_double(0.5);

        environment.world_push();
        environment.save(UndoAction::RevokeWeight {
            cell: weight,
            amount: 1.0,
        });
        environment.world_pop();

        assert_eq!(0.0, environment.get_double(weight));
    }

    #[test]
    fn untrailed_doubles_survive_a_pop() {
        let mut environment = Environment::default();
        let weight = environment.make_double(0.0);

        environment.world_push();
        let _ = environment.add_double_untrailed(weight, 3.0);
        environment.world_pop();

        assert_eq!(3.0, environment.get_double(weight));
    }

    #[test]
    fn bitset_searches_across_words() {
        let mut environment = Environment::default();
        let bitset = environment.make_bitset(150);
        environment.set_range(bitset, 10, 140);
        environment.clear_bit(bitset, 70);

        assert_eq!(Some(10), environment.next_set_bit(bitset, 0));
        assert_eq!(Some(71), environment.next_set_bit(bitset, 70));
        assert_eq!(Some(69), environment.previous_set_bit(bitset, 70));
        assert_eq!(Some(140), environment.previous_set_bit(bitset, 149));
        assert_eq!(70, environment.next_clear_bit(bitset, 64));
        assert_eq!(141, environment.next_clear_bit(bitset, 71));
        assert_eq!(Some(9), environment.previous_clear_bit(bitset, 69));
        assert_eq!(None, environment.next_set_bit(bitset, 141));
        assert_eq!(130, environment.cardinality(bitset));
    }

    #[test]
    fn bitset_writes_are_backtracked() {
        let mut environment = Environment::default();
        let bitset = environment.make_bitset(64);
        environment.set_range(bitset, 0, 63);

        environment.world_push();
        environment.clear_range(bitset, 5, 60);
        assert_eq!(8, environment.cardinality(bitset));
        environment.world_pop();

        assert_eq!(64, environment.cardinality(bitset));
    }

    #[test]
    fn bool_slots_start_unfixed_and_fix_reversibly() {
        let mut environment = Environment::default();
        let slots = (0..70)
            .map(|_| environment.allocate_bool_slot())
            .collect::<Vec<_>>();

        assert!(slots.iter().all(|slot| environment.bool_value(*slot).is_none()));

        environment.world_push();
        environment.fix_bool(slots[65], true);
        environment.fix_bool(slots[3], false);
        assert_eq!(Some(true), environment.bool_value(slots[65]));
        assert_eq!(Some(false), environment.bool_value(slots[3]));
        assert_eq!(None, environment.bool_value(slots[4]));

        environment.world_pop();
        assert_eq!(None, environment.bool_value(slots[65]));
        assert_eq!(None, environment.bool_value(slots[3]));
    }
}
