use super::DiscreteDomain;
use super::DomainResult;
use crate::engine::contradiction::ReasonCode;
use crate::engine::delta::DeltaSink;
use crate::engine::events::IntEventType;
use crate::environment::Environment;
use crate::environment::StoredBitSet;
use crate::environment::StoredInt;
use crate::marrow_assert_moderate;
use crate::marrow_assert_simple;

/// An enumerated domain: bit `i` is set when `offset + i` is in the domain.
///
/// The bits outside `[lower_bound, upper_bound]` are always cleared, so the bitset alone is an
/// exact description of the domain; the bounds and the size are cached next to it.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BitsetDomain {
    offset: i32,
    bits: StoredBitSet,
    lower_bound: StoredInt,
    upper_bound: StoredInt,
    size: StoredInt,
}

impl BitsetDomain {
    pub(crate) fn with_range(
        environment: &mut Environment,
        lower_bound: i32,
        upper_bound: i32,
    ) -> BitsetDomain {
        marrow_assert_simple!(lower_bound <= upper_bound);

        let capacity = (upper_bound as i64 - lower_bound as i64 + 1) as usize;
        let bits = environment.make_bitset(capacity);
        environment.set_range(bits, 0, capacity - 1);

        BitsetDomain {
            offset: lower_bound,
            bits,
            lower_bound: environment.make_int(lower_bound as i64),
            upper_bound: environment.make_int(upper_bound as i64),
            size: environment.make_int(capacity as i64),
        }
    }

    /// Creates the domain containing exactly `values`, which must be sorted, deduplicated and
    /// non-empty.
    pub(crate) fn with_values(environment: &mut Environment, values: &[i32]) -> BitsetDomain {
        marrow_assert_simple!(!values.is_empty());
        marrow_assert_moderate!(values.windows(2).all(|pair| pair[0] < pair[1]));

        let lower_bound = values[0];
        let upper_bound = values[values.len() - 1];
        let capacity = (upper_bound as i64 - lower_bound as i64 + 1) as usize;
        let bits = environment.make_bitset(capacity);
        for &value in values {
            environment.set_bit(bits, (value - lower_bound) as usize);
        }

        BitsetDomain {
            offset: lower_bound,
            bits,
            lower_bound: environment.make_int(lower_bound as i64),
            upper_bound: environment.make_int(upper_bound as i64),
            size: environment.make_int(values.len() as i64),
        }
    }

    fn bit(&self, value: i32) -> usize {
        (value - self.offset) as usize
    }

    fn value(&self, bit: usize) -> i32 {
        self.offset + bit as i32
    }

    fn first_at_or_after(&self, environment: &Environment, value: i32) -> Option<i32> {
        environment
            .next_set_bit(self.bits, self.bit(value))
            .map(|bit| self.value(bit))
    }

    fn last_at_or_before(&self, environment: &Environment, value: i32) -> Option<i32> {
        environment
            .previous_set_bit(self.bits, self.bit(value))
            .map(|bit| self.value(bit))
    }

    /// Clears every value in `from..=to` (which lies within the bounds), recording each, and
    /// returns how many values were removed.
    fn clear_values(
        &self,
        environment: &mut Environment,
        from: i32,
        to: i32,
        delta: &mut DeltaSink<'_>,
    ) -> i64 {
        let mut removed = 0;
        let mut current = self.first_at_or_after(environment, from);
        while let Some(value) = current.filter(|&value| value <= to) {
            delta.value(environment, value);
            removed += 1;
            current = if value < to {
                self.first_at_or_after(environment, value + 1)
            } else {
                None
            };
        }

        if removed > 0 {
            environment.clear_range(self.bits, self.bit(from), self.bit(to));
            let _ = environment.add_int(self.size, -removed);
        }
        removed
    }

    /// Narrows the domain to `[new_lower_bound, new_upper_bound]`; both must be values of the
    /// domain.
    fn narrow(
        &self,
        environment: &mut Environment,
        new_lower_bound: i32,
        new_upper_bound: i32,
        delta: &mut DeltaSink<'_>,
    ) -> IntEventType {
        let lower_bound = self.lower_bound(environment);
        let upper_bound = self.upper_bound(environment);

        if new_lower_bound > lower_bound {
            let _ = self.clear_values(environment, lower_bound, new_lower_bound - 1, delta);
            environment.set_int(self.lower_bound, new_lower_bound as i64);
        }
        if new_upper_bound < upper_bound {
            let _ = self.clear_values(environment, new_upper_bound + 1, upper_bound, delta);
            environment.set_int(self.upper_bound, new_upper_bound as i64);
        }

        IntEventType::classify(
            new_lower_bound > lower_bound,
            new_upper_bound < upper_bound,
            self.is_instantiated(environment),
        )
    }
}

impl DiscreteDomain for BitsetDomain {
    fn lower_bound(&self, environment: &Environment) -> i32 {
        environment.get_int(self.lower_bound) as i32
    }

    fn upper_bound(&self, environment: &Environment) -> i32 {
        environment.get_int(self.upper_bound) as i32
    }

    fn size(&self, environment: &Environment) -> u64 {
        environment.get_int(self.size) as u64
    }

    fn contains(&self, environment: &Environment, value: i32) -> bool {
        value >= self.lower_bound(environment)
            && value <= self.upper_bound(environment)
            && environment.get_bit(self.bits, self.bit(value))
    }

    fn is_enumerated(&self) -> bool {
        true
    }

    fn next_value(&self, environment: &Environment, value: i32) -> i32 {
        let lower_bound = self.lower_bound(environment);
        if value < lower_bound {
            lower_bound
        } else if value >= self.upper_bound(environment) {
            i32::MAX
        } else {
            self.first_at_or_after(environment, value + 1)
                .unwrap_or(i32::MAX)
        }
    }

    fn previous_value(&self, environment: &Environment, value: i32) -> i32 {
        let upper_bound = self.upper_bound(environment);
        if value > upper_bound {
            upper_bound
        } else if value <= self.lower_bound(environment) {
            i32::MIN
        } else {
            self.last_at_or_before(environment, value - 1)
                .unwrap_or(i32::MIN)
        }
    }

    fn next_value_out(&self, environment: &Environment, value: i32) -> i32 {
        let next = value.saturating_add(1);
        if next < self.lower_bound(environment) || next > self.upper_bound(environment) {
            next
        } else {
            self.value(environment.next_clear_bit(self.bits, self.bit(next)))
        }
    }

    fn previous_value_out(&self, environment: &Environment, value: i32) -> i32 {
        let previous = value.saturating_sub(1);
        if previous < self.lower_bound(environment) || previous > self.upper_bound(environment) {
            previous
        } else {
            environment
                .previous_clear_bit(self.bits, self.bit(previous))
                .map(|bit| self.value(bit))
                .unwrap_or(self.offset - 1)
        }
    }

    fn remove_value(
        &self,
        environment: &mut Environment,
        value: i32,
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        if !self.contains(environment, value) {
            return Ok(None);
        }
        if self.size(environment) == 1 {
            return Err(ReasonCode::RemoveLastValue);
        }

        let lower_bound = self.lower_bound(environment);
        let upper_bound = self.upper_bound(environment);

        environment.clear_bit(self.bits, self.bit(value));
        let _ = environment.add_int(self.size, -1);
        delta.value(environment, value);

        if value == lower_bound {
            let next = self.first_at_or_after(environment, value + 1).unwrap_or(upper_bound);
            environment.set_int(self.lower_bound, next as i64);
        } else if value == upper_bound {
            let previous = self
                .last_at_or_before(environment, value - 1)
                .unwrap_or(lower_bound);
            environment.set_int(self.upper_bound, previous as i64);
        }

        Ok(Some(IntEventType::classify(
            value == lower_bound,
            value == upper_bound,
            self.is_instantiated(environment),
        )))
    }

    fn remove_interval(
        &self,
        environment: &mut Environment,
        from: i32,
        to: i32,
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        let lower_bound = self.lower_bound(environment);
        let upper_bound = self.upper_bound(environment);

        if from > to || from > upper_bound || to < lower_bound {
            return Ok(None);
        }
        if from <= lower_bound && to >= upper_bound {
            return Err(ReasonCode::EmptyDomain);
        }

        if from <= lower_bound {
            return self.update_lower_bound(environment, to + 1, delta);
        }
        if to >= upper_bound {
            return self.update_upper_bound(environment, from - 1, delta);
        }

        let removed = self.clear_values(environment, from, to, delta);
        Ok((removed > 0).then_some(IntEventType::Remove))
    }

    fn instantiate_to(
        &self,
        environment: &mut Environment,
        value: i32,
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        if !self.contains(environment, value) {
            return Err(if self.is_instantiated(environment) {
                ReasonCode::AlreadyInstantiated
            } else {
                ReasonCode::UnknownValue
            });
        }
        if self.is_instantiated(environment) {
            return Ok(None);
        }

        Ok(Some(self.narrow(environment, value, value, delta)))
    }

    fn update_lower_bound(
        &self,
        environment: &mut Environment,
        value: i32,
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        if value <= self.lower_bound(environment) {
            return Ok(None);
        }
        let upper_bound = self.upper_bound(environment);
        if value > upper_bound {
            return Err(ReasonCode::EmptyDomain);
        }

        let new_lower_bound = self.first_at_or_after(environment, value).unwrap_or(upper_bound);
        Ok(Some(self.narrow(environment, new_lower_bound, upper_bound, delta)))
    }

    fn update_upper_bound(
        &self,
        environment: &mut Environment,
        value: i32,
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        if value >= self.upper_bound(environment) {
            return Ok(None);
        }
        let lower_bound = self.lower_bound(environment);
        if value < lower_bound {
            return Err(ReasonCode::EmptyDomain);
        }

        let new_upper_bound = self.last_at_or_before(environment, value).unwrap_or(lower_bound);
        Ok(Some(self.narrow(environment, lower_bound, new_upper_bound, delta)))
    }

    fn update_bounds(
        &self,
        environment: &mut Environment,
        lower_bound: i32,
        upper_bound: i32,
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        if lower_bound > upper_bound {
            return Err(ReasonCode::BoundOrderViolated);
        }

        let old_lower_bound = self.lower_bound(environment);
        let old_upper_bound = self.upper_bound(environment);
        let lower_bound = lower_bound.max(old_lower_bound);
        let upper_bound = upper_bound.min(old_upper_bound);

        if lower_bound == old_lower_bound && upper_bound == old_upper_bound {
            return Ok(None);
        }
        if lower_bound > upper_bound {
            return Err(ReasonCode::EmptyDomain);
        }

        let new_lower_bound = self
            .first_at_or_after(environment, lower_bound)
            .filter(|&value| value <= upper_bound)
            .ok_or(ReasonCode::EmptyDomain)?;
        let new_upper_bound = self
            .last_at_or_before(environment, upper_bound)
            .unwrap_or(new_lower_bound);

        Ok(Some(self.narrow(
            environment,
            new_lower_bound,
            new_upper_bound,
            delta,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(domain: &BitsetDomain, environment: &Environment) -> Vec<i32> {
        let mut values = vec![];
        let mut value = domain.lower_bound(environment);
        while value != i32::MAX {
            values.push(value);
            value = domain.next_value(environment, value);
        }
        values
    }

    #[test]
    fn removing_a_bound_moves_it_to_the_next_present_value() {
        let mut environment = Environment::default();
        let domain = BitsetDomain::with_values(&mut environment, &[1, 3, 4, 9]);

        let event = domain
            .remove_value(&mut environment, 1, &mut DeltaSink::discard())
            .expect("non-empty");

        assert_eq!(Some(IntEventType::IncreaseLowerBound), event);
        assert_eq!(3, domain.lower_bound(&environment));
        assert_eq!(vec![3, 4, 9], collect(&domain, &environment));
    }

    #[test]
    fn removing_an_absent_value_does_nothing() {
        let mut environment = Environment::default();
        let domain = BitsetDomain::with_values(&mut environment, &[1, 3]);

        let event = domain
            .remove_value(&mut environment, 2, &mut DeltaSink::discard())
            .expect("non-empty");

        assert_eq!(None, event);
        assert_eq!(2, domain.size(&environment));
    }

    #[test]
    fn removing_the_last_value_fails_without_touching_the_domain() {
        let mut environment = Environment::default();
        let domain = BitsetDomain::with_range(&mut environment, 5, 5);

        let result = domain.remove_value(&mut environment, 5, &mut DeltaSink::discard());

        assert_eq!(Err(ReasonCode::RemoveLastValue), result);
        assert!(domain.contains(&environment, 5));
    }

    #[test]
    fn interior_interval_removal_leaves_bounds() {
        let mut environment = Environment::default();
        let domain = BitsetDomain::with_range(&mut environment, 0, 9);

        let event = domain
            .remove_interval(&mut environment, 3, 5, &mut DeltaSink::discard())
            .expect("non-empty");

        assert_eq!(Some(IntEventType::Remove), event);
        assert_eq!(7, domain.size(&environment));
        assert_eq!(6, domain.next_value(&environment, 2));
        assert_eq!(2, domain.previous_value(&environment, 6));
        assert_eq!(3, domain.next_value_out(&environment, 1));
        assert_eq!(5, domain.previous_value_out(&environment, 7));
    }

    #[test]
    fn bound_update_skips_holes() {
        let mut environment = Environment::default();
        let domain = BitsetDomain::with_values(&mut environment, &[0, 1, 5, 6]);

        let event = domain
            .update_lower_bound(&mut environment, 2, &mut DeltaSink::discard())
            .expect("non-empty");

        assert_eq!(Some(IntEventType::IncreaseLowerBound), event);
        assert_eq!(5, domain.lower_bound(&environment));
        assert_eq!(2, domain.size(&environment));
    }

    #[test]
    fn update_bounds_within_a_hole_fails() {
        let mut environment = Environment::default();
        let domain = BitsetDomain::with_values(&mut environment, &[0, 5]);

        let result = domain.update_bounds(&mut environment, 1, 4, &mut DeltaSink::discard());

        assert_eq!(Err(ReasonCode::EmptyDomain), result);
        assert_eq!(2, domain.size(&environment));
    }

    #[test]
    fn instantiation_rules() {
        let mut environment = Environment::default();
        let domain = BitsetDomain::with_values(&mut environment, &[1, 2, 4]);

        assert_eq!(
            Err(ReasonCode::UnknownValue),
            domain.instantiate_to(&mut environment, 3, &mut DeltaSink::discard())
        );
        assert_eq!(
            Ok(Some(IntEventType::Instantiate)),
            domain.instantiate_to(&mut environment, 2, &mut DeltaSink::discard())
        );
        assert_eq!(
            Ok(None),
            domain.instantiate_to(&mut environment, 2, &mut DeltaSink::discard())
        );
        assert_eq!(
            Err(ReasonCode::AlreadyInstantiated),
            domain.instantiate_to(&mut environment, 4, &mut DeltaSink::discard())
        );
    }

    #[test]
    fn removals_are_undone_on_pop() {
        let mut environment = Environment::default();
        let domain = BitsetDomain::with_range(&mut environment, 0, 4);

        environment.world_push();
        let _ = domain
            .instantiate_to(&mut environment, 3, &mut DeltaSink::discard())
            .expect("non-empty");
        assert!(domain.is_instantiated(&environment));

        environment.world_pop();
        assert_eq!(vec![0, 1, 2, 3, 4], collect(&domain, &environment));
    }
}
