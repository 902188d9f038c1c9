use std::borrow::Cow;

use log::trace;

use super::Model;
use crate::engine::contradiction::Cause;
use crate::engine::contradiction::Contradiction;
use crate::engine::contradiction::ReasonCode;
use crate::engine::delta::DeltaSink;
use crate::engine::domains::DomainOperation;
use crate::engine::domains::RealDomain;
use crate::engine::events::IntEventType;
use crate::engine::propagation::EventListener;
use crate::engine::propagation::VariableUpdate;
use crate::engine::variables::Representation;
use crate::engine::variables::VariableId;
use crate::engine::views::ViewTranslation;
use crate::environment::Environment;

type RealResult = Result<Option<IntEventType>, ReasonCode>;

impl Model {
    /// Removes `value`; returns whether the domain changed.
    pub fn remove_value(
        &mut self,
        variable: VariableId,
        value: i32,
        cause: Cause,
        listener: &mut (impl EventListener + ?Sized),
    ) -> Result<bool, Contradiction> {
        self.apply(variable, DomainOperation::RemoveValue(value), cause, listener)
            .map(|event| event.is_some())
    }

    pub fn remove_values(
        &mut self,
        variable: VariableId,
        values: &[i32],
        cause: Cause,
        listener: &mut (impl EventListener + ?Sized),
    ) -> Result<bool, Contradiction> {
        self.apply(
            variable,
            DomainOperation::RemoveValues(Cow::Borrowed(values)),
            cause,
            listener,
        )
        .map(|event| event.is_some())
    }

    /// Removes the values `from..=to`.
    pub fn remove_interval(
        &mut self,
        variable: VariableId,
        from: i32,
        to: i32,
        cause: Cause,
        listener: &mut (impl EventListener + ?Sized),
    ) -> Result<bool, Contradiction> {
        self.apply(
            variable,
            DomainOperation::RemoveInterval(from, to),
            cause,
            listener,
        )
        .map(|event| event.is_some())
    }

    /// Removes every value not in `values`.
    pub fn remove_all_but(
        &mut self,
        variable: VariableId,
        values: &[i32],
        cause: Cause,
        listener: &mut (impl EventListener + ?Sized),
    ) -> Result<bool, Contradiction> {
        self.apply(
            variable,
            DomainOperation::RemoveAllBut(Cow::Borrowed(values)),
            cause,
            listener,
        )
        .map(|event| event.is_some())
    }

    pub fn instantiate_to(
        &mut self,
        variable: VariableId,
        value: i32,
        cause: Cause,
        listener: &mut (impl EventListener + ?Sized),
    ) -> Result<bool, Contradiction> {
        self.apply(variable, DomainOperation::InstantiateTo(value), cause, listener)
            .map(|event| event.is_some())
    }

    pub fn update_lower_bound(
        &mut self,
        variable: VariableId,
        value: i32,
        cause: Cause,
        listener: &mut (impl EventListener + ?Sized),
    ) -> Result<bool, Contradiction> {
        self.apply(
            variable,
            DomainOperation::UpdateLowerBound(value),
            cause,
            listener,
        )
        .map(|event| event.is_some())
    }

    pub fn update_upper_bound(
        &mut self,
        variable: VariableId,
        value: i32,
        cause: Cause,
        listener: &mut (impl EventListener + ?Sized),
    ) -> Result<bool, Contradiction> {
        self.apply(
            variable,
            DomainOperation::UpdateUpperBound(value),
            cause,
            listener,
        )
        .map(|event| event.is_some())
    }

    pub fn update_bounds(
        &mut self,
        variable: VariableId,
        lower_bound: i32,
        upper_bound: i32,
        cause: Cause,
        listener: &mut (impl EventListener + ?Sized),
    ) -> Result<bool, Contradiction> {
        self.apply(
            variable,
            DomainOperation::UpdateBounds(lower_bound, upper_bound),
            cause,
            listener,
        )
        .map(|event| event.is_some())
    }

    pub fn update_real_lower_bound(
        &mut self,
        variable: VariableId,
        value: f64,
        cause: Cause,
        listener: &mut (impl EventListener + ?Sized),
    ) -> Result<bool, Contradiction> {
        self.apply_real(
            variable,
            |domain, environment| domain.update_lower_bound(environment, value),
            DomainOperation::UpdateLowerBound(round_up(value)),
            cause,
            listener,
        )
        .map(|event| event.is_some())
    }

    pub fn update_real_upper_bound(
        &mut self,
        variable: VariableId,
        value: f64,
        cause: Cause,
        listener: &mut (impl EventListener + ?Sized),
    ) -> Result<bool, Contradiction> {
        self.apply_real(
            variable,
            |domain, environment| domain.update_upper_bound(environment, value),
            DomainOperation::UpdateUpperBound(round_down(value)),
            cause,
            listener,
        )
        .map(|event| event.is_some())
    }

    pub fn update_real_bounds(
        &mut self,
        variable: VariableId,
        lower_bound: f64,
        upper_bound: f64,
        cause: Cause,
        listener: &mut (impl EventListener + ?Sized),
    ) -> Result<bool, Contradiction> {
        self.apply_real(
            variable,
            |domain, environment| domain.update_bounds(environment, lower_bound, upper_bound),
            DomainOperation::UpdateBounds(round_up(lower_bound), round_down(upper_bound)),
            cause,
            listener,
        )
        .map(|event| event.is_some())
    }

    /// The contradiction to raise when `cause` finds the model inconsistent on `variable`.
    pub fn fail(&self, cause: Cause, variable: VariableId) -> Contradiction {
        Contradiction::new(cause, Some(variable), ReasonCode::EmptyDomain)
    }

    pub(crate) fn apply<L: EventListener + ?Sized>(
        &mut self,
        variable: VariableId,
        operation: DomainOperation<'_>,
        cause: Cause,
        listener: &mut L,
    ) -> Result<Option<IntEventType>, Contradiction> {
        let event = match self.variables[variable].representation {
            Representation::Domain(domain) => {
                let Model {
                    environment,
                    variables,
                    ..
                } = self;
                let mut delta = DeltaSink::new(variables[variable].delta.as_mut(), cause);
                let event = operation
                    .apply_to(&domain, environment, &mut delta)
                    .map_err(|reason| Contradiction::new(cause, Some(variable), reason))?;

                let Some(event) = event else {
                    return Ok(None);
                };
                self.record_event(variable, event);
                event
            }

            Representation::Real(domain) => {
                return self.apply_to_real_domain(
                    variable,
                    domain,
                    |domain, environment| real_operation(domain, environment, &operation),
                    cause,
                    listener,
                );
            }

            Representation::View(view) => {
                let instantiated = self.is_instantiated(variable);
                let forwarded = match view.translate(&operation, instantiated) {
                    ViewTranslation::NoChange => return Ok(None),
                    ViewTranslation::Fails(reason) => {
                        return Err(Contradiction::new(cause, Some(variable), reason))
                    }
                    ViewTranslation::Forward(forwarded) => forwarded,
                };

                let source_event = self
                    .apply(view.source, forwarded, Cause::View(variable), listener)
                    .map_err(|contradiction| {
                        Contradiction::new(cause, Some(variable), contradiction.reason)
                    })?;
                let Some(source_event) = source_event else {
                    return Ok(None);
                };
                source_event.through_scale(view.scale)
            }
        };

        self.notify(variable, event, cause, listener);
        Ok(Some(event))
    }

    /// Applies `operation` to a real variable; any other variable receives `discrete`, the same
    /// operation on the integer bounds.
    fn apply_real<L: EventListener + ?Sized>(
        &mut self,
        variable: VariableId,
        operation: impl FnOnce(&RealDomain, &mut Environment) -> RealResult,
        discrete: DomainOperation<'_>,
        cause: Cause,
        listener: &mut L,
    ) -> Result<Option<IntEventType>, Contradiction> {
        let Representation::Real(domain) = self.variables[variable].representation else {
            return self.apply(variable, discrete, cause, listener);
        };
        self.apply_to_real_domain(variable, domain, operation, cause, listener)
    }

    fn apply_to_real_domain<L: EventListener + ?Sized>(
        &mut self,
        variable: VariableId,
        domain: RealDomain,
        operation: impl FnOnce(&RealDomain, &mut Environment) -> RealResult,
        cause: Cause,
        listener: &mut L,
    ) -> Result<Option<IntEventType>, Contradiction> {

        let event = operation(&domain, &mut self.environment)
            .map_err(|reason| Contradiction::new(cause, Some(variable), reason))?;
        let Some(event) = event else {
            return Ok(None);
        };

        self.record_event(variable, event);
        self.notify(variable, event, cause, listener);
        Ok(Some(event))
    }

    fn record_event(&mut self, variable: VariableId, event: IntEventType) {
        trace!("{variable}: {event}");
        self.event_counts[event] += 1;

        if event.is_instantiation() {
            let world = self.environment.world_index() as i64;
            let stamp = self.instantiation_counter;
            self.instantiation_counter += 1;

            let fixed_world = self.variables[variable].fixed_world;
            let fixed_stamp = self.variables[variable].fixed_stamp;
            self.environment.set_int(fixed_world, world);
            self.environment.set_int(fixed_stamp, stamp);
        }
    }

    /// Notifies the monitors of the variable, then the listener, then the views over the variable
    /// except the one which caused the change.
    fn notify<L: EventListener + ?Sized>(
        &self,
        variable: VariableId,
        event: IntEventType,
        cause: Cause,
        listener: &mut L,
    ) {
        let entry = &self.variables[variable];

        for &monitor in &entry.monitors {
            listener.on_monitor_update(monitor, variable, event, cause);
        }

        listener.on_variable_update(VariableUpdate {
            variable,
            event,
            cause,
            woken: entry.propagators.woken_by(event),
        });

        for &view in &entry.views {
            if cause == Cause::View(view) {
                continue;
            }
            let scale = self.variables[view].view().map_or(1, |view| view.scale);
            self.notify(view, event.through_scale(scale), cause, listener);
        }
    }
}

/// The discrete operations as understood by a real domain; holes cannot be made in it.
fn round_up(value: f64) -> i32 {
    value.ceil() as i32
}

fn round_down(value: f64) -> i32 {
    value.floor() as i32
}

fn real_operation(
    domain: &RealDomain,
    environment: &mut Environment,
    operation: &DomainOperation<'_>,
) -> RealResult {
    match *operation {
        DomainOperation::InstantiateTo(value) => {
            domain.update_bounds(environment, value as f64, value as f64)
        }
        DomainOperation::UpdateLowerBound(value) => {
            domain.update_lower_bound(environment, value as f64)
        }
        DomainOperation::UpdateUpperBound(value) => {
            domain.update_upper_bound(environment, value as f64)
        }
        DomainOperation::UpdateBounds(lower_bound, upper_bound) => {
            domain.update_bounds(environment, lower_bound as f64, upper_bound as f64)
        }
        DomainOperation::RemoveValue(_)
        | DomainOperation::RemoveValues(_)
        | DomainOperation::RemoveInterval(_, _)
        | DomainOperation::RemoveAllBut(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::events::IntDomainEvent;
    use crate::engine::propagation::test_helper::EventLog;
    use crate::engine::propagation::PropagatorId;
    use crate::engine::NoPropagation;

    #[test]
    fn removing_the_lower_bound_raises_one_lower_bound_event() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 5);
        let mut log = EventLog::default();

        let changed = model
            .remove_value(x, 0, Cause::Decision, &mut log)
            .expect("non-empty");

        assert!(changed);
        assert_eq!(vec![IntEventType::IncreaseLowerBound], log.events_of(x));
    }

    #[test]
    fn instantiating_twice_changes_nothing_the_second_time() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 5);
        let mut log = EventLog::default();

        assert_eq!(Ok(true), model.instantiate_to(x, 3, Cause::Decision, &mut log));
        assert_eq!(Ok(false), model.instantiate_to(x, 3, Cause::Decision, &mut log));

        assert_eq!(vec![IntEventType::Instantiate], log.events_of(x));
        assert_eq!(Some(3), model.value(x));
    }

    #[test]
    fn a_failed_operation_leaves_the_domain_untouched() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 5);
        let propagator = model.add_propagator(&[x], &[IntDomainEvent::Removal.into()]);
        let mut log = EventLog::default();

        let contradiction = model
            .update_lower_bound(x, 6, Cause::Propagator(propagator), &mut log)
            .expect_err("empties the domain");

        assert_eq!(Some(propagator), contradiction.propagator());
        assert_eq!(Some(x), contradiction.variable);
        assert_eq!(ReasonCode::EmptyDomain, contradiction.reason);
        assert_eq!(6, model.domain_size(x));
        assert!(log.updates.is_empty());
    }

    #[test]
    fn only_matching_propagators_are_woken() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 5);
        let on_removal = model.add_propagator(&[x], &[IntDomainEvent::Removal.into()]);
        let on_assign = model.add_propagator(&[x], &[IntDomainEvent::Assign.into()]);
        let mut log = EventLog::default();

        let _ = model
            .remove_value(x, 3, Cause::Decision, &mut log)
            .expect("non-empty");
        let _ = model
            .instantiate_to(x, 4, Cause::Decision, &mut log)
            .expect("non-empty");

        assert_eq!(vec![on_removal], log.updates[0].3);
        assert_eq!(vec![on_removal, on_assign], log.updates[1].3);
    }

    #[test]
    fn monitors_are_notified_before_the_variable_and_views_after() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 5);
        let y = model.new_view("y", x, -1, 0);
        let monitor = model.new_monitor_id();
        model.add_monitor(x, monitor);
        let mut log = EventLog::default();

        let _ = model
            .update_upper_bound(x, 3, Cause::Decision, &mut log)
            .expect("non-empty");

        assert_eq!(vec![(monitor, x, IntEventType::DecreaseUpperBound)], log.monitors);
        let notified = log
            .updates
            .iter()
            .map(|update| (update.0, update.1))
            .collect::<Vec<_>>();
        assert_eq!(
            vec![
                (x, IntEventType::DecreaseUpperBound),
                (y, IntEventType::IncreaseLowerBound),
            ],
            notified
        );
        assert_eq!(-3, model.lower_bound(y));
    }

    #[test]
    fn changes_made_through_a_view_notify_the_view_once() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 5);
        let y = model.new_view("y", x, 2, 1);
        let mut log = EventLog::default();

        let _ = model
            .update_lower_bound(y, 6, Cause::Decision, &mut log)
            .expect("non-empty");

        assert_eq!(3, model.lower_bound(x));
        assert_eq!(7, model.lower_bound(y));
        assert_eq!(vec![IntEventType::IncreaseLowerBound], log.events_of(y));
        assert_eq!(vec![IntEventType::IncreaseLowerBound], log.events_of(x));
        assert_eq!(Cause::View(y), log.updates[0].2);
        assert_eq!(Cause::Decision, log.updates[1].2);
    }

    #[test]
    fn contradictions_of_the_source_are_attributed_to_the_view() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 5);
        let y = model.new_view("y", x, 1, 10);
        let cause = Cause::Propagator(PropagatorId(7));

        let contradiction = model
            .update_upper_bound(y, 9, cause, &mut NoPropagation)
            .expect_err("empties the domain");

        assert_eq!(cause, contradiction.cause);
        assert_eq!(Some(y), contradiction.variable);
    }

    #[test]
    fn popping_restores_domains_and_instantiation_worlds() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 5);
        let b = model.new_bool_var("b");

        model.world_push();
        model.world_push();
        let _ = model
            .instantiate_to(x, 2, Cause::Decision, &mut NoPropagation)
            .expect("non-empty");
        let _ = model
            .instantiate_to(b, 1, Cause::Decision, &mut NoPropagation)
            .expect("non-empty");
        assert_eq!(Some(2), model.fixed_world(x));
        assert!(model.fixed_stamp(x) < model.fixed_stamp(b));

        model.world_pop_until(0);
        assert_eq!(6, model.domain_size(x));
        assert_eq!(2, model.domain_size(b));
        assert_eq!(None, model.fixed_world(x));
        assert_eq!(None, model.fixed_stamp(b));
    }

    #[test]
    fn real_variables_only_move_their_bounds() {
        let mut model = Model::default();
        let r = model.new_real_var("r", 0.0, 10.0, 0.5);
        let mut log = EventLog::default();

        assert_eq!(
            Ok(true),
            model.update_real_bounds(r, 2.5, 2.75, Cause::Decision, &mut log)
        );
        assert_eq!(Ok(false), model.remove_value(r, 2, Cause::Decision, &mut log));
        assert!(model.is_instantiated(r));
        assert_eq!(vec![IntEventType::Bounds], log.events_of(r));
        assert_eq!(
            ReasonCode::EmptyDomain,
            model
                .update_real_lower_bound(r, 3.0, Cause::Decision, &mut log)
                .expect_err("empties the domain")
                .reason
        );
    }

    #[test]
    fn real_bounds_on_an_integer_variable_are_rounded_inwards() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 10);
        let mut log = EventLog::default();

        assert_eq!(
            Ok(true),
            model.update_real_bounds(x, 2.5, 7.5, Cause::Decision, &mut log)
        );
        assert_eq!((3, 7), (model.lower_bound(x), model.upper_bound(x)));
        assert_eq!(
            Ok(false),
            model.update_real_upper_bound(x, 7.9, Cause::Decision, &mut log)
        );
        assert_eq!(
            ReasonCode::EmptyDomain,
            model
                .update_real_lower_bound(x, 7.5, Cause::Decision, &mut log)
                .expect_err("no integer is left")
                .reason
        );
    }
}
