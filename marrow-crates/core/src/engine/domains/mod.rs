//! The domain representations of variables.
//!
//! Every discrete representation implements [`DiscreteDomain`]. A representation only holds
//! handles into the [`Environment`], which makes it `Copy` and lets the model read a
//! representation while mutating the environment.
//!
//! Every mutator returns `Ok(None)` when it would not shrink the domain, `Err` without touching
//! the domain when it would empty it, and otherwise commits the change, records the removed values
//! in the [`DeltaSink`] and returns the event describing the change.
mod bitset_domain;
mod bool_domain;
mod constant_domain;
mod domain_iterators;
mod interval_domain;
mod real_domain;

use std::borrow::Cow;

pub(crate) use bitset_domain::BitsetDomain;
pub(crate) use bool_domain::BoolDomain;
pub(crate) use constant_domain::ConstantDomain;
pub use domain_iterators::RangeIterator;
pub use domain_iterators::ValueIterator;
pub(crate) use interval_domain::IntervalDomain;
pub(crate) use real_domain::RealDomain;

use crate::engine::contradiction::ReasonCode;
use crate::engine::delta::DeltaSink;
use crate::engine::events::IntEventType;
use crate::environment::Environment;

pub(crate) type DomainResult = Result<Option<IntEventType>, ReasonCode>;

pub(crate) trait DiscreteDomain {
    fn lower_bound(&self, environment: &Environment) -> i32;

    fn upper_bound(&self, environment: &Environment) -> i32;

    fn size(&self, environment: &Environment) -> u64;

    fn contains(&self, environment: &Environment, value: i32) -> bool;

    /// Whether holes in the domain are represented.
    fn is_enumerated(&self) -> bool;

    /// The smallest value in the domain greater than `value`, or [`i32::MAX`] if there is none.
    fn next_value(&self, environment: &Environment, value: i32) -> i32;

    /// The largest value in the domain smaller than `value`, or [`i32::MIN`] if there is none.
    fn previous_value(&self, environment: &Environment, value: i32) -> i32;

    /// The smallest value greater than `value` which is not in the domain.
    fn next_value_out(&self, environment: &Environment, value: i32) -> i32;

    /// The largest value smaller than `value` which is not in the domain.
    fn previous_value_out(&self, environment: &Environment, value: i32) -> i32;

    fn remove_value(
        &self,
        environment: &mut Environment,
        value: i32,
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult;

    fn remove_interval(
        &self,
        environment: &mut Environment,
        from: i32,
        to: i32,
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult;

    fn instantiate_to(
        &self,
        environment: &mut Environment,
        value: i32,
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult;

    fn update_lower_bound(
        &self,
        environment: &mut Environment,
        value: i32,
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult;

    fn update_upper_bound(
        &self,
        environment: &mut Environment,
        value: i32,
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult;

    fn update_bounds(
        &self,
        environment: &mut Environment,
        lower_bound: i32,
        upper_bound: i32,
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult;

    fn is_instantiated(&self, environment: &Environment) -> bool {
        self.size(environment) == 1
    }

    fn remove_values(
        &self,
        environment: &mut Environment,
        values: &[i32],
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        let mut present = values
            .iter()
            .copied()
            .filter(|&value| self.contains(environment, value))
            .collect::<Vec<_>>();
        present.sort_unstable();
        present.dedup();

        if present.is_empty() {
            return Ok(None);
        }
        if present.len() as u64 == self.size(environment) {
            return Err(ReasonCode::RemoveLastValue);
        }

        self.remove_each(environment, &present, delta)
    }

    fn remove_all_but(
        &self,
        environment: &mut Environment,
        values: &[i32],
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        let mut removed = Vec::new();
        let upper_bound = self.upper_bound(environment);
        let mut value = self.lower_bound(environment);
        while value <= upper_bound {
            if !values.contains(&value) {
                removed.push(value);
            }
            value = self.next_value(environment, value);
        }

        if removed.is_empty() {
            return Ok(None);
        }
        if removed.len() as u64 == self.size(environment) {
            return Err(ReasonCode::EmptyDomain);
        }

        self.remove_each(environment, &removed, delta)
    }

    /// Removes values of which at least one is known to remain, and classifies the combined
    /// change.
    fn remove_each(
        &self,
        environment: &mut Environment,
        values: &[i32],
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        let old_lower_bound = self.lower_bound(environment);
        let old_upper_bound = self.upper_bound(environment);

        let mut changed = false;
        for &value in values {
            changed |= self.remove_value(environment, value, delta)?.is_some();
        }

        Ok(changed.then(|| {
            IntEventType::classify(
                self.lower_bound(environment) != old_lower_bound,
                self.upper_bound(environment) != old_upper_bound,
                self.is_instantiated(environment),
            )
        }))
    }
}

/// The discrete representations.
#[derive(Clone, Copy, Debug)]
pub(crate) enum IntDomain {
    Bitset(BitsetDomain),
    Interval(IntervalDomain),
    Bool(BoolDomain),
    Constant(ConstantDomain),
}

macro_rules! dispatch {
    ($domain:expr, $inner:ident => $call:expr) => {
        match $domain {
            IntDomain::Bitset($inner) => $call,
            IntDomain::Interval($inner) => $call,
            IntDomain::Bool($inner) => $call,
            IntDomain::Constant($inner) => $call,
        }
    };
}

impl DiscreteDomain for IntDomain {
    fn lower_bound(&self, environment: &Environment) -> i32 {
        dispatch!(self, domain => domain.lower_bound(environment))
    }

    fn upper_bound(&self, environment: &Environment) -> i32 {
        dispatch!(self, domain => domain.upper_bound(environment))
    }

    fn size(&self, environment: &Environment) -> u64 {
        dispatch!(self, domain => domain.size(environment))
    }

    fn contains(&self, environment: &Environment, value: i32) -> bool {
        dispatch!(self, domain => domain.contains(environment, value))
    }

    fn is_enumerated(&self) -> bool {
        dispatch!(self, domain => domain.is_enumerated())
    }

    fn next_value(&self, environment: &Environment, value: i32) -> i32 {
        dispatch!(self, domain => domain.next_value(environment, value))
    }

    fn previous_value(&self, environment: &Environment, value: i32) -> i32 {
        dispatch!(self, domain => domain.previous_value(environment, value))
    }

    fn next_value_out(&self, environment: &Environment, value: i32) -> i32 {
        dispatch!(self, domain => domain.next_value_out(environment, value))
    }

    fn previous_value_out(&self, environment: &Environment, value: i32) -> i32 {
        dispatch!(self, domain => domain.previous_value_out(environment, value))
    }

    fn remove_value(
        &self,
        environment: &mut Environment,
        value: i32,
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        dispatch!(self, domain => domain.remove_value(environment, value, delta))
    }

    fn remove_values(
        &self,
        environment: &mut Environment,
        values: &[i32],
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        dispatch!(self, domain => domain.remove_values(environment, values, delta))
    }

    fn remove_interval(
        &self,
        environment: &mut Environment,
        from: i32,
        to: i32,
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        dispatch!(self, domain => domain.remove_interval(environment, from, to, delta))
    }

    fn remove_all_but(
        &self,
        environment: &mut Environment,
        values: &[i32],
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        dispatch!(self, domain => domain.remove_all_but(environment, values, delta))
    }

    fn instantiate_to(
        &self,
        environment: &mut Environment,
        value: i32,
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        dispatch!(self, domain => domain.instantiate_to(environment, value, delta))
    }

    fn update_lower_bound(
        &self,
        environment: &mut Environment,
        value: i32,
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        dispatch!(self, domain => domain.update_lower_bound(environment, value, delta))
    }

    fn update_upper_bound(
        &self,
        environment: &mut Environment,
        value: i32,
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        dispatch!(self, domain => domain.update_upper_bound(environment, value, delta))
    }

    fn update_bounds(
        &self,
        environment: &mut Environment,
        lower_bound: i32,
        upper_bound: i32,
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        dispatch!(self, domain => domain.update_bounds(environment, lower_bound, upper_bound, delta))
    }
}

/// A domain operation, as requested on a variable and forwarded through views.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum DomainOperation<'a> {
    RemoveValue(i32),
    RemoveValues(Cow<'a, [i32]>),
    RemoveInterval(i32, i32),
    RemoveAllBut(Cow<'a, [i32]>),
    InstantiateTo(i32),
    UpdateLowerBound(i32),
    UpdateUpperBound(i32),
    UpdateBounds(i32, i32),
}

impl DomainOperation<'_> {
    pub(crate) fn apply_to(
        &self,
        domain: &impl DiscreteDomain,
        environment: &mut Environment,
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        match self {
            DomainOperation::RemoveValue(value) => domain.remove_value(environment, *value, delta),
            DomainOperation::RemoveValues(values) => {
                domain.remove_values(environment, values, delta)
            }
            DomainOperation::RemoveInterval(from, to) => {
                domain.remove_interval(environment, *from, *to, delta)
            }
            DomainOperation::RemoveAllBut(values) => {
                domain.remove_all_but(environment, values, delta)
            }
            DomainOperation::InstantiateTo(value) => {
                domain.instantiate_to(environment, *value, delta)
            }
            DomainOperation::UpdateLowerBound(value) => {
                domain.update_lower_bound(environment, *value, delta)
            }
            DomainOperation::UpdateUpperBound(value) => {
                domain.update_upper_bound(environment, *value, delta)
            }
            DomainOperation::UpdateBounds(lower_bound, upper_bound) => {
                domain.update_bounds(environment, *lower_bound, *upper_bound, delta)
            }
        }
    }
}

/// [`DiscreteDomain::next_value`] for domains without holes.
pub(crate) fn contiguous_next_value(lower_bound: i32, upper_bound: i32, value: i32) -> i32 {
    if value < lower_bound {
        lower_bound
    } else if value >= upper_bound {
        i32::MAX
    } else {
        value + 1
    }
}

/// [`DiscreteDomain::previous_value`] for domains without holes.
pub(crate) fn contiguous_previous_value(lower_bound: i32, upper_bound: i32, value: i32) -> i32 {
    if value > upper_bound {
        upper_bound
    } else if value <= lower_bound {
        i32::MIN
    } else {
        value - 1
    }
}

/// [`DiscreteDomain::next_value_out`] for domains without holes.
pub(crate) fn contiguous_next_value_out(lower_bound: i32, upper_bound: i32, value: i32) -> i32 {
    let next = value.saturating_add(1);
    if next < lower_bound || next > upper_bound {
        next
    } else {
        upper_bound.saturating_add(1)
    }
}

/// [`DiscreteDomain::previous_value_out`] for domains without holes.
pub(crate) fn contiguous_previous_value_out(
    lower_bound: i32,
    upper_bound: i32,
    value: i32,
) -> i32 {
    let previous = value.saturating_sub(1);
    if previous < lower_bound || previous > upper_bound {
        previous
    } else {
        lower_bound.saturating_sub(1)
    }
}
