use super::contiguous_next_value;
use super::contiguous_next_value_out;
use super::contiguous_previous_value;
use super::contiguous_previous_value_out;
use super::DiscreteDomain;
use super::DomainResult;
use crate::engine::contradiction::ReasonCode;
use crate::engine::delta::DeltaSink;
use crate::engine::events::IntEventType;
use crate::environment::Environment;
use crate::environment::StoredInt;

/// A domain represented by its bounds only; removals strictly inside the bounds are ignored.
#[derive(Clone, Copy, Debug)]
pub(crate) struct IntervalDomain {
    lower_bound: StoredInt,
    upper_bound: StoredInt,
}

impl IntervalDomain {
    pub(crate) fn new(
        environment: &mut Environment,
        lower_bound: i32,
        upper_bound: i32,
    ) -> IntervalDomain {
        IntervalDomain {
            lower_bound: environment.make_int(lower_bound as i64),
            upper_bound: environment.make_int(upper_bound as i64),
        }
    }

    /// Sets the bounds to `[lower_bound, upper_bound]`, which must be a non-empty sub-interval of
    /// the current domain.
    fn narrow(
        &self,
        environment: &mut Environment,
        lower_bound: i32,
        upper_bound: i32,
        delta: &mut DeltaSink<'_>,
    ) -> Option<IntEventType> {
        let old_lower_bound = self.lower_bound(environment);
        let old_upper_bound = self.upper_bound(environment);
        let lower_bound_moved = lower_bound > old_lower_bound;
        let upper_bound_moved = upper_bound < old_upper_bound;

        if lower_bound_moved {
            delta.range(environment, old_lower_bound, lower_bound - 1);
            environment.set_int(self.lower_bound, lower_bound as i64);
        }
        if upper_bound_moved {
            delta.range(environment, upper_bound + 1, old_upper_bound);
            environment.set_int(self.upper_bound, upper_bound as i64);
        }

        (lower_bound_moved || upper_bound_moved).then(|| {
            IntEventType::classify(
                lower_bound_moved,
                upper_bound_moved,
                lower_bound == upper_bound,
            )
        })
    }
}

impl DiscreteDomain for IntervalDomain {
    fn lower_bound(&self, environment: &Environment) -> i32 {
        environment.get_int(self.lower_bound) as i32
    }

    fn upper_bound(&self, environment: &Environment) -> i32 {
        environment.get_int(self.upper_bound) as i32
    }

    fn size(&self, environment: &Environment) -> u64 {
        (environment.get_int(self.upper_bound) - environment.get_int(self.lower_bound) + 1) as u64
    }

    fn contains(&self, environment: &Environment, value: i32) -> bool {
        value >= self.lower_bound(environment) && value <= self.upper_bound(environment)
    }

    fn is_enumerated(&self) -> bool {
        false
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
        let lower_bound = self.lower_bound(environment);
        let upper_bound = self.upper_bound(environment);

        if value == lower_bound && value == upper_bound {
            Err(ReasonCode::RemoveLastValue)
        } else if value == lower_bound {
            Ok(self.narrow(environment, lower_bound + 1, upper_bound, delta))
        } else if value == upper_bound {
            Ok(self.narrow(environment, lower_bound, upper_bound - 1, delta))
        } else {
            Ok(None)
        }
    }

    fn remove_values(
        &self,
        environment: &mut Environment,
        values: &[i32],
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        let mut sorted = values.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let mut lower_bound = self.lower_bound(environment);
        let mut upper_bound = self.upper_bound(environment);

        for &value in &sorted {
            if value == lower_bound {
                lower_bound += 1;
            } else if value > lower_bound {
                break;
            }
        }
        if lower_bound > upper_bound {
            return Err(ReasonCode::RemoveLastValue);
        }
        for &value in sorted.iter().rev() {
            if value == upper_bound {
                upper_bound -= 1;
            } else if value < upper_bound {
                break;
            }
        }

        Ok(self.narrow(environment, lower_bound, upper_bound, delta))
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
            Ok(None)
        } else if from <= lower_bound && to >= upper_bound {
            Err(ReasonCode::EmptyDomain)
        } else if from <= lower_bound {
            Ok(self.narrow(environment, to + 1, upper_bound, delta))
        } else if to >= upper_bound {
            Ok(self.narrow(environment, lower_bound, from - 1, delta))
        } else {
            Ok(None)
        }
    }

    fn remove_all_but(
        &self,
        environment: &mut Environment,
        values: &[i32],
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        let kept = values
            .iter()
            .copied()
            .filter(|&value| self.contains(environment, value));
        let (Some(lower_bound), Some(upper_bound)) = (kept.clone().min(), kept.max()) else {
            return Err(ReasonCode::EmptyDomain);
        };

        Ok(self.narrow(environment, lower_bound, upper_bound, delta))
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

        Ok(self.narrow(environment, value, value, delta))
    }

    fn update_lower_bound(
        &self,
        environment: &mut Environment,
        value: i32,
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        let upper_bound = self.upper_bound(environment);
        if value <= self.lower_bound(environment) {
            Ok(None)
        } else if value > upper_bound {
            Err(ReasonCode::EmptyDomain)
        } else {
            Ok(self.narrow(environment, value, upper_bound, delta))
        }
    }

    fn update_upper_bound(
        &self,
        environment: &mut Environment,
        value: i32,
        delta: &mut DeltaSink<'_>,
    ) -> DomainResult {
        let lower_bound = self.lower_bound(environment);
        if value >= self.upper_bound(environment) {
            Ok(None)
        } else if value < lower_bound {
            Err(ReasonCode::EmptyDomain)
        } else {
            Ok(self.narrow(environment, lower_bound, value, delta))
        }
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

        let lower_bound = lower_bound.max(self.lower_bound(environment));
        let upper_bound = upper_bound.min(self.upper_bound(environment));
        if lower_bound > upper_bound {
            return Err(ReasonCode::EmptyDomain);
        }

        Ok(self.narrow(environment, lower_bound, upper_bound, delta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_removals_are_ignored() {
        let mut environment = Environment::default();
        let domain = IntervalDomain::new(&mut environment, 0, 10);

        let result = domain.remove_value(&mut environment, 5, &mut DeltaSink::discard());

        assert_eq!(Ok(None), result);
        assert_eq!(11, domain.size(&environment));
        assert!(domain.contains(&environment, 5));
    }

    #[test]
    fn removing_values_peels_both_bounds() {
        let mut environment = Environment::default();
        let domain = IntervalDomain::new(&mut environment, 0, 10);

        let result = domain.remove_values(
            &mut environment,
            &[1, 0, 5, 10, 2, 9],
            &mut DeltaSink::discard(),
        );

        assert_eq!(Ok(Some(IntEventType::Bounds)), result);
        assert_eq!(3, domain.lower_bound(&environment));
        assert_eq!(8, domain.upper_bound(&environment));
    }

    #[test]
    fn removing_every_value_fails() {
        let mut environment = Environment::default();
        let domain = IntervalDomain::new(&mut environment, 2, 4);

        let result = domain.remove_values(&mut environment, &[4, 3, 2], &mut DeltaSink::discard());

        assert_eq!(Err(ReasonCode::RemoveLastValue), result);
        assert_eq!(3, domain.size(&environment));
    }

    #[test]
    fn interval_removal_touching_a_bound_moves_it() {
        let mut environment = Environment::default();
        let domain = IntervalDomain::new(&mut environment, 0, 10);

        let result = domain.remove_interval(&mut environment, 8, 20, &mut DeltaSink::discard());

        assert_eq!(Ok(Some(IntEventType::DecreaseUpperBound)), result);
        assert_eq!(7, domain.upper_bound(&environment));
    }

    #[test]
    fn narrowing_to_one_value_is_an_instantiation() {
        let mut environment = Environment::default();
        let domain = IntervalDomain::new(&mut environment, 0, 3);

        let result = domain.update_bounds(&mut environment, 3, 7, &mut DeltaSink::discard());

        assert_eq!(Ok(Some(IntEventType::Instantiate)), result);
        assert!(domain.is_instantiated(&environment));
    }

    #[test]
    fn crossing_bounds_are_rejected() {
        let mut environment = Environment::default();
        let domain = IntervalDomain::new(&mut environment, 0, 3);

        let result = domain.update_bounds(&mut environment, 2, 1, &mut DeltaSink::discard());

        assert_eq!(Err(ReasonCode::BoundOrderViolated), result);
    }
}
