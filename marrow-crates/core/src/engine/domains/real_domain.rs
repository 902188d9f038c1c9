use crate::engine::contradiction::ReasonCode;
use crate::engine::events::IntEventType;
use crate::environment::Environment;
use crate::environment::StoredDouble;

/// A continuous interval `[lower_bound, upper_bound]`, considered instantiated once its width is
/// within `precision`.
///
/// Only bound events are produced; holes cannot be represented.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RealDomain {
    lower_bound: StoredDouble,
    upper_bound: StoredDouble,
    precision: f64,
}

impl RealDomain {
    pub(crate) fn new(
        environment: &mut Environment,
        lower_bound: f64,
        upper_bound: f64,
        precision: f64,
    ) -> RealDomain {
        RealDomain {
            lower_bound: environment.make_double(lower_bound),
            upper_bound: environment.make_double(upper_bound),
            precision,
        }
    }

    pub(crate) fn lower_bound(&self, environment: &Environment) -> f64 {
        environment.get_double(self.lower_bound)
    }

    pub(crate) fn upper_bound(&self, environment: &Environment) -> f64 {
        environment.get_double(self.upper_bound)
    }

    pub(crate) fn precision(&self) -> f64 {
        self.precision
    }

    pub(crate) fn is_instantiated(&self, environment: &Environment) -> bool {
        self.upper_bound(environment) - self.lower_bound(environment) <= self.precision
    }

    pub(crate) fn update_lower_bound(
        &self,
        environment: &mut Environment,
        value: f64,
    ) -> Result<Option<IntEventType>, ReasonCode> {
        self.narrow(environment, value, self.upper_bound(environment))
    }

    pub(crate) fn update_upper_bound(
        &self,
        environment: &mut Environment,
        value: f64,
    ) -> Result<Option<IntEventType>, ReasonCode> {
        self.narrow(environment, self.lower_bound(environment), value)
    }

    pub(crate) fn update_bounds(
        &self,
        environment: &mut Environment,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<Option<IntEventType>, ReasonCode> {
        if lower_bound > upper_bound {
            return Err(ReasonCode::BoundOrderViolated);
        }
        self.narrow(environment, lower_bound, upper_bound)
    }

    fn narrow(
        &self,
        environment: &mut Environment,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<Option<IntEventType>, ReasonCode> {
        let old_lower_bound = self.lower_bound(environment);
        let old_upper_bound = self.upper_bound(environment);
        let lower_bound_moved = lower_bound > old_lower_bound;
        let upper_bound_moved = upper_bound < old_upper_bound;

        if !lower_bound_moved && !upper_bound_moved {
            return Ok(None);
        }

        let new_lower_bound = lower_bound.max(old_lower_bound);
        let new_upper_bound = upper_bound.min(old_upper_bound);
        if new_lower_bound > new_upper_bound {
            return Err(ReasonCode::EmptyDomain);
        }

        if lower_bound_moved {
            environment.set_double(self.lower_bound, new_lower_bound);
        }
        if upper_bound_moved {
            environment.set_double(self.upper_bound, new_upper_bound);
        }

        Ok(Some(IntEventType::classify(
            lower_bound_moved,
            upper_bound_moved,
            false,
        )))
    }
}
