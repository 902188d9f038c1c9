use crate::engine::events::IntEventType;
use crate::engine::events::NUM_BUCKETS;
use crate::engine::propagation::PropagatorVarId;
use crate::marrow_assert_moderate;

/// The propagators watching one variable, partitioned into buckets by propagation condition.
///
/// Bucket `b` occupies `entries[starts[b]..starts[b + 1]]`, ordered from the bucket woken by any
/// change to the passive bucket which is never woken. Linking and unlinking move at most one entry
/// per bucket, so the partition is kept without re-sorting.
#[derive(Clone, Debug, Default)]
pub(crate) struct PropagatorRegistry {
    entries: Vec<PropagatorVarId>,
    starts: [usize; NUM_BUCKETS + 1],
}

impl PropagatorRegistry {
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = PropagatorVarId> + '_ {
        self.entries.iter().copied()
    }

    pub(crate) fn bucket(&self, bucket: usize) -> &[PropagatorVarId] {
        &self.entries[self.starts[bucket]..self.starts[bucket + 1]]
    }

    pub(crate) fn link(&mut self, entry: PropagatorVarId, bucket: usize) {
        marrow_assert_moderate!(bucket < NUM_BUCKETS);

        // The first entry of every later bucket moves to the free slot past the end of its
        // bucket, which frees up the slot right after `bucket`.
        self.entries.push(entry);
        for later in (bucket + 1..NUM_BUCKETS).rev() {
            let first = self.starts[later];
            let free = self.starts[later + 1];
            self.entries[free] = self.entries[first];
            self.starts[later + 1] += 1;
        }
        let free = self.starts[bucket + 1];
        self.entries[free] = entry;
        self.starts[bucket + 1] += 1;
    }

    /// Removes `entry` and returns the bucket it was registered in.
    pub(crate) fn unlink(&mut self, entry: PropagatorVarId) -> Option<usize> {
        let position = self.entries.iter().position(|candidate| *candidate == entry)?;
        let bucket = (0..NUM_BUCKETS)
            .find(|&bucket| position < self.starts[bucket + 1])
            .unwrap_or(NUM_BUCKETS - 1);

        // The last entry of the bucket fills the hole, then every later bucket shifts its last
        // entry into the hole in front of it.
        let mut hole = position;
        for current in bucket..NUM_BUCKETS {
            let last = self.starts[current + 1] - 1;
            self.entries[hole] = self.entries[last];
            hole = last;
            self.starts[current + 1] -= 1;
        }
        let _ = self.entries.pop();
        marrow_assert_moderate!(hole == self.entries.len());

        Some(bucket)
    }

    pub(crate) fn woken_by(&self, event: IntEventType) -> WokenPropagators<'_> {
        WokenPropagators {
            registry: self,
            buckets: event.woken_buckets(),
            bucket_index: 0,
            position: event
                .woken_buckets()
                .first()
                .map(|&bucket| self.starts[bucket])
                .unwrap_or(0),
        }
    }
}

/// The propagators woken by one event, bucket by bucket.
#[derive(Clone, Debug)]
pub struct WokenPropagators<'a> {
    registry: &'a PropagatorRegistry,
    buckets: &'static [usize],
    bucket_index: usize,
    position: usize,
}

impl Iterator for WokenPropagators<'_> {
    type Item = PropagatorVarId;

    fn next(&mut self) -> Option<Self::Item> {
        while self.bucket_index < self.buckets.len() {
            let bucket = self.buckets[self.bucket_index];
            if self.position < self.registry.starts[bucket + 1] {
                let entry = self.registry.entries[self.position];
                self.position += 1;
                return Some(entry);
            }

            self.bucket_index += 1;
            if let Some(&next_bucket) = self.buckets.get(self.bucket_index) {
                self.position = self.registry.starts[next_bucket];
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::events::PASSIVE_BUCKET;
    use crate::engine::propagation::PropagatorId;

    fn entry(propagator: u32) -> PropagatorVarId {
        PropagatorVarId {
            propagator: PropagatorId(propagator),
            index: 0,
        }
    }

    fn registry_with_one_per_bucket() -> PropagatorRegistry {
        let mut registry = PropagatorRegistry::default();
        // Linked out of order on purpose.
        for bucket in [4, 0, 3, 1, 2, 5] {
            registry.link(entry(bucket as u32), bucket);
        }
        registry
    }

    #[test]
    fn linking_keeps_every_entry_in_its_bucket() {
        let registry = registry_with_one_per_bucket();

        for bucket in 0..NUM_BUCKETS {
            assert_eq!(&[entry(bucket as u32)], registry.bucket(bucket));
        }
    }

    #[test]
    fn events_wake_the_matching_buckets_only() {
        let registry = registry_with_one_per_bucket();

        let woken = |event| {
            registry
                .woken_by(event)
                .map(|entry| entry.propagator.0)
                .collect::<Vec<_>>()
        };

        assert_eq!(vec![0], woken(IntEventType::Remove));
        assert_eq!(vec![0, 1, 2], woken(IntEventType::IncreaseLowerBound));
        assert_eq!(vec![0, 1, 3], woken(IntEventType::DecreaseUpperBound));
        assert_eq!(vec![0, 1, 2, 3], woken(IntEventType::Bounds));
        assert_eq!(vec![0, 1, 2, 3, 4], woken(IntEventType::Instantiate));
    }

    #[test]
    fn unlinking_compacts_the_buckets() {
        let mut registry = registry_with_one_per_bucket();
        registry.link(entry(10), 1);

        assert_eq!(Some(1), registry.unlink(entry(1)));
        assert_eq!(Some(PASSIVE_BUCKET), registry.unlink(entry(5)));
        assert_eq!(None, registry.unlink(entry(5)));

        assert_eq!(&[entry(10)], registry.bucket(1));
        assert_eq!(&[entry(4)], registry.bucket(4));
        assert!(registry.bucket(PASSIVE_BUCKET).is_empty());
        assert_eq!(5, registry.len());
        assert_eq!(
            vec![0, 10, 2],
            registry
                .woken_by(IntEventType::IncreaseLowerBound)
                .map(|entry| entry.propagator.0)
                .collect::<Vec<_>>()
        );
    }
}
