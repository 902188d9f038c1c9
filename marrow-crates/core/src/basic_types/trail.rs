use std::iter::Rev;
use std::ops::Deref;
use std::vec::Drain;

use crate::marrow_assert_simple;

/// A stack of entries segmented into worlds.
///
/// Entries pushed while world `w` is the current world belong to `w`; synchronising to an older
/// world hands back the entries of every discarded world, most recent first.
#[derive(Clone, Debug)]
pub(crate) struct Trail<T> {
    current_world: usize,
    /// At index `i` is the position where world `i` ends (exclusive) on the trail
    world_delimiter: Vec<usize>,
    trail: Vec<T>,
}

impl<T> Default for Trail<T> {
    fn default() -> Self {
        Trail {
            current_world: 0,
            world_delimiter: Vec::new(),
            trail: Vec::new(),
        }
    }
}

impl<T> Trail<T> {
    pub(crate) fn new_world(&mut self) {
        self.current_world += 1;
        self.world_delimiter.push(self.trail.len());
    }

    pub(crate) fn current_world(&self) -> usize {
        self.current_world
    }

    /// Drops every world above `new_world` and returns their entries in reverse push order.
    pub(crate) fn synchronise(&mut self, new_world: usize) -> Rev<Drain<'_, T>> {
        marrow_assert_simple!(
            new_world < self.current_world,
            "cannot synchronise world {} to world {new_world} which is not older",
            self.current_world
        );

        let new_trail_len = self.world_delimiter[new_world];

        self.current_world = new_world;
        self.world_delimiter.truncate(new_world);
        self.trail.drain(new_trail_len..).rev()
    }

    pub(crate) fn push(&mut self, elem: T) {
        self.trail.push(elem)
    }
}

impl<T> Deref for Trail<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.trail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popping_a_world_removes_its_entries() {
        let mut trail = Trail::default();

        trail.new_world();
        trail.push(1);
        let _ = trail.synchronise(0);

        assert!(trail.is_empty());
        assert_eq!(0, trail.current_world());
    }

    #[test]
    fn entries_of_the_root_world_survive() {
        let mut trail = Trail::default();
        trail.push(1);

        trail.new_world();
        trail.push(2);
        trail.new_world();
        trail.push(3);
        trail.new_world();
        trail.push(4);

        let _ = trail.synchronise(1);

        assert_eq!(&[1, 2], trail.deref());
        assert_eq!(1, trail.current_world());
    }

    #[test]
    fn popped_entries_are_given_most_recent_first() {
        let mut trail = Trail::default();
        trail.push(1);

        trail.new_world();
        trail.push(2);
        trail.push(3);
        trail.new_world();
        trail.push(4);

        let popped = trail.synchronise(0).collect::<Vec<_>>();
        assert_eq!(vec![4, 3, 2], popped);
    }
}
