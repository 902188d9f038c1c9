use super::DiscreteDomain;
use super::DomainResult;
use crate::engine::contradiction::ReasonCode;
use crate::engine::delta::DeltaSink;
use crate::environment::Environment;

/// A domain with a single value fixed at creation; it needs no storage.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ConstantDomain {
    value: i32,
}

impl ConstantDomain {
    pub(crate) fn new(value: i32) -> ConstantDomain {
        ConstantDomain { value }
    }

    fn keep_if(&self, kept: bool, reason: ReasonCode) -> DomainResult {
        if kept {
            Ok(None)
        } else {
            Err(reason)
        }
    }
}

impl DiscreteDomain for ConstantDomain {
    fn lower_bound(&self, _environment: &Environment) -> i32 {
        self.value
    }

    fn upper_bound(&self, _environment: &Environment) -> i32 {
        self.value
    }

    fn size(&self, _environment: &Environment) -> u64 {
        1
    }

    fn contains(&self, _environment: &Environment, value: i32) -> bool {
        value == self.value
    }

    fn is_enumerated(&self) -> bool {
        true
    }

    fn next_value(&self, _environment: &Environment, value: i32) -> i32 {
        if value < self.value {
            self.value
        } else {
            i32::MAX
        }
    }

    fn previous_value(&self, _environment: &Environment, value: i32) -> i32 {
        if value > self.value {
            self.value
        } else {
            i32::MIN
        }
    }

    fn next_value_out(&self, _environment: &Environment, value: i32) -> i32 {
        if value.saturating_add(1) == self.value {
            self.value.saturating_add(1)
        } else {
            value.saturating_add(1)
        }
    }

    fn previous_value_out(&self, _environment: &Environment, value: i32) -> i32 {
        if value.saturating_sub(1) == self.value {
            self.value.saturating_sub(1)
        } else {
            value.saturating_sub(1)
        }
    }

    fn remove_value(
        &self,
        _environment: &mut Environment,
        value: i32,
        _delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        self.keep_if(value != self.value, ReasonCode::RemoveLastValue)
    }

    fn remove_interval(
        &self,
        _environment: &mut Environment,
        from: i32,
        to: i32,
        _delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        self.keep_if(
            self.value < from || self.value > to,
            ReasonCode::EmptyDomain,
        )
    }

    fn instantiate_to(
        &self,
        _environment: &mut Environment,
        value: i32,
        _delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        self.keep_if(value == self.value, ReasonCode::AlreadyInstantiated)
    }

    fn update_lower_bound(
        &self,
        _environment: &mut Environment,
        value: i32,
        _delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        self.keep_if(value <= self.value, ReasonCode::EmptyDomain)
    }

    fn update_upper_bound(
        &self,
        _environment: &mut Environment,
        value: i32,
        _delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        self.keep_if(value >= self.value, ReasonCode::EmptyDomain)
    }

    fn update_bounds(
        &self,
        _environment: &mut Environment,
        lower_bound: i32,
        upper_bound: i32,
        _delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        if lower_bound > upper_bound {
            return Err(ReasonCode::BoundOrderViolated);
        }
        self.keep_if(
            lower_bound <= self.value && self.value <= upper_bound,
            ReasonCode::EmptyDomain,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_removing_the_value_fails() {
        let mut environment = Environment::default();
        let domain = ConstantDomain::new(4);

        assert_eq!(
            Ok(None),
            domain.remove_interval(&mut environment, 5, 9, &mut DeltaSink::discard())
        );
        assert_eq!(
            Ok(None),
            domain.update_lower_bound(&mut environment, 4, &mut DeltaSink::discard())
        );
        assert_eq!(
            Err(ReasonCode::RemoveLastValue),
            domain.remove_value(&mut environment, 4, &mut DeltaSink::discard())
        );
        assert_eq!(
            Err(ReasonCode::AlreadyInstantiated),
            domain.instantiate_to(&mut environment, 3, &mut DeltaSink::discard())
        );
    }
}
