use super::contiguous_next_value;
use super::contiguous_next_value_out;
use super::contiguous_previous_value;
use super::contiguous_previous_value_out;
use super::DiscreteDomain;
use super::DomainResult;
use crate::engine::contradiction::ReasonCode;
use crate::engine::delta::DeltaSink;
use crate::engine::events::IntEventType;
use crate::environment::BoolSlot;
use crate::environment::Environment;

/// A `{0, 1}` domain stored as one bit of the boolean slot pool.
///
/// The only possible change is an instantiation.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BoolDomain {
    slot: BoolSlot,
}

impl BoolDomain {
    pub(crate) fn new(environment: &mut Environment) -> BoolDomain {
        BoolDomain {
            slot: environment.allocate_bool_slot(),
        }
    }

    /// Keeps the values of the domain for which `keep` holds.
    fn restrict(
        &self,
        environment: &mut Environment,
        keep: impl Fn(i32) -> bool,
        reason: ReasonCode,
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        let keep_false = self.contains(environment, 0) && keep(0);
        let keep_true = self.contains(environment, 1) && keep(1);

        if !keep_false && !keep_true {
            return Err(reason);
        }
        if keep_false == keep_true || environment.bool_value(self.slot).is_some() {
            return Ok(None);
        }

        environment.fix_bool(self.slot, keep_true);
        delta.value(environment, i32::from(!keep_true));
        Ok(Some(IntEventType::Instantiate))
    }
}

impl DiscreteDomain for BoolDomain {
    fn lower_bound(&self, environment: &Environment) -> i32 {
        environment.bool_value(self.slot).map_or(0, i32::from)
    }

    fn upper_bound(&self, environment: &Environment) -> i32 {
        environment.bool_value(self.slot).map_or(1, i32::from)
    }

    fn size(&self, environment: &Environment) -> u64 {
        if environment.bool_value(self.slot).is_some() {
            1
        } else {
            2
        }
    }

    fn contains(&self, environment: &Environment, value: i32) -> bool {
        match environment.bool_value(self.slot) {
            Some(fixed) => value == i32::from(fixed),
            None => value == 0 || value == 1,
        }
    }

    fn is_enumerated(&self) -> bool {
        true
    }

    fn next_value(&self, environment: &Environment, value: i32) -> i32 {
        contiguous_next_value(
            self.lower_bound(environment),
            self.upper_bound(environment),
            value,
        )
    }

    fn previous_value(&self, environment: &Environment, value: i32) -> i32 {
        contiguous_previous_value(
            self.lower_bound(environment),
            self.upper_bound(environment),
            value,
        )
    }

    fn next_value_out(&self, environment: &Environment, value: i32) -> i32 {
        contiguous_next_value_out(
            self.lower_bound(environment),
            self.upper_bound(environment),
            value,
        )
    }

    fn previous_value_out(&self, environment: &Environment, value: i32) -> i32 {
        contiguous_previous_value_out(
            self.lower_bound(environment),
            self.upper_bound(environment),
            value,
        )
    }

    fn remove_value(
        &self,
        environment: &mut Environment,
        value: i32,
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        self.restrict(
            environment,
            |candidate| candidate != value,
            ReasonCode::RemoveLastValue,
            delta,
        )
    }

    fn remove_interval(
        &self,
        environment: &mut Environment,
        from: i32,
        to: i32,
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        self.restrict(
            environment,
            |candidate| candidate < from || candidate > to,
            ReasonCode::EmptyDomain,
            delta,
        )
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

        self.restrict(
            environment,
            |candidate| candidate == value,
            ReasonCode::EmptyDomain,
            delta,
        )
    }

    fn update_lower_bound(
        &self,
        environment: &mut Environment,
        value: i32,
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        self.restrict(
            environment,
            |candidate| candidate >= value,
            ReasonCode::EmptyDomain,
            delta,
        )
    }

    fn update_upper_bound(
        &self,
        environment: &mut Environment,
        value: i32,
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        self.restrict(
            environment,
            |candidate| candidate <= value,
            ReasonCode::EmptyDomain,
            delta,
        )
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

        self.restrict(
            environment,
            |candidate| candidate >= lower_bound && candidate <= upper_bound,
            ReasonCode::EmptyDomain,
            delta,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_change_is_an_instantiation() {
        let mut environment = Environment::default();
        let domain = BoolDomain::new(&mut environment);

        let result = domain.update_lower_bound(&mut environment, 1, &mut DeltaSink::discard());

        assert_eq!(Ok(Some(IntEventType::Instantiate)), result);
        assert_eq!(1, domain.lower_bound(&environment));
        assert_eq!(
            Err(ReasonCode::RemoveLastValue),
            domain.remove_value(&mut environment, 1, &mut DeltaSink::discard())
        );
        assert_eq!(
            Ok(None),
            domain.remove_value(&mut environment, 0, &mut DeltaSink::discard())
        );
    }

    #[test]
    fn instantiation_is_undone_on_pop() {
        let mut environment = Environment::default();
        let domain = BoolDomain::new(&mut environment);

        environment.world_push();
        let _ = domain
            .remove_interval(&mut environment, -5, 0, &mut DeltaSink::discard())
            .expect("one value remains");
        assert!(domain.is_instantiated(&environment));

        environment.world_pop();
        assert_eq!(2, domain.size(&environment));
    }
}
