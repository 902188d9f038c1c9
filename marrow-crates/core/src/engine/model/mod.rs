//! The [`Model`]: the variables, their domains and the propagator scopes watching them.
mod mutations;

use enum_map::EnumMap;
use enumset::EnumSet;

use crate::containers::KeyGenerator;
use crate::containers::KeyedVec;
use crate::engine::delta::DeltaMonitor;
use crate::engine::delta::DeltaRecorder;
use crate::engine::domains::BitsetDomain;
use crate::engine::domains::BoolDomain;
use crate::engine::domains::ConstantDomain;
use crate::engine::domains::DiscreteDomain;
use crate::engine::domains::IntDomain;
use crate::engine::domains::IntervalDomain;
use crate::engine::domains::RealDomain;
use crate::engine::events::bucket_for;
use crate::engine::events::IntDomainEvent;
use crate::engine::events::IntEventType;
use crate::engine::events::PASSIVE_BUCKET;
use crate::engine::propagation::PropagatorId;
use crate::engine::propagation::PropagatorScope;
use crate::engine::propagation::PropagatorVarId;
use crate::engine::variables::MonitorId;
use crate::engine::variables::PropagatorRegistry;
use crate::engine::variables::Representation;
use crate::engine::variables::Variable;
use crate::engine::variables::VariableId;
use crate::engine::variables::VariableKind;
use crate::engine::views::AffineView;
use crate::environment::Environment;
use crate::marrow_assert_eq_simple;
use crate::marrow_assert_simple;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

/// The variables of a problem together with the backtrackable [`Environment`] holding their
/// domains.
///
/// Every domain operation reports the resulting event to an
/// [`EventListener`](crate::engine::EventListener), usually the propagation engine.
#[derive(Debug, Default)]
pub struct Model {
    environment: Environment,
    variables: KeyedVec<VariableId, Variable>,
    propagators: KeyedVec<PropagatorId, PropagatorScope>,
    monitor_ids: KeyGenerator<MonitorId>,
    instantiation_counter: i64,
    event_counts: EnumMap<IntEventType, u64>,
}

// Creation
impl Model {
    /// Creates an integer variable with the domain `lower_bound..=upper_bound`, in which holes
    /// can be made.
    pub fn new_enumerated_var(
        &mut self,
        name: impl Into<String>,
        lower_bound: i32,
        upper_bound: i32,
    ) -> VariableId {
        marrow_assert_simple!(
            lower_bound <= upper_bound,
            "the domain [{lower_bound}, {upper_bound}] is empty"
        );
        let domain = BitsetDomain::with_range(&mut self.environment, lower_bound, upper_bound);
        self.push_variable(
            name.into(),
            VariableKind::Int,
            Representation::Domain(IntDomain::Bitset(domain)),
            lower_bound == upper_bound,
        )
    }

    /// Creates an integer variable whose domain consists of `values`.
    pub fn new_enumerated_var_from_values(
        &mut self,
        name: impl Into<String>,
        values: &[i32],
    ) -> VariableId {
        let mut values = values.to_vec();
        values.sort_unstable();
        values.dedup();
        marrow_assert_simple!(!values.is_empty(), "a variable needs at least one value");

        let domain = BitsetDomain::with_values(&mut self.environment, &values);
        self.push_variable(
            name.into(),
            VariableKind::Int,
            Representation::Domain(IntDomain::Bitset(domain)),
            values.len() == 1,
        )
    }

    /// Creates an integer variable of which only the bounds are represented.
    pub fn new_bounded_var(
        &mut self,
        name: impl Into<String>,
        lower_bound: i32,
        upper_bound: i32,
    ) -> VariableId {
        marrow_assert_simple!(
            lower_bound <= upper_bound,
            "the domain [{lower_bound}, {upper_bound}] is empty"
        );
        let domain = IntervalDomain::new(&mut self.environment, lower_bound, upper_bound);
        self.push_variable(
            name.into(),
            VariableKind::Int,
            Representation::Domain(IntDomain::Interval(domain)),
            lower_bound == upper_bound,
        )
    }

    pub fn new_bool_var(&mut self, name: impl Into<String>) -> VariableId {
        let domain = BoolDomain::new(&mut self.environment);
        self.push_variable(
            name.into(),
            VariableKind::Bool,
            Representation::Domain(IntDomain::Bool(domain)),
            false,
        )
    }

    pub fn new_constant(&mut self, value: i32) -> VariableId {
        self.push_variable(
            value.to_string(),
            VariableKind::Int,
            Representation::Domain(IntDomain::Constant(ConstantDomain::new(value))),
            true,
        )
    }

    /// Creates a real variable which counts as instantiated once its bounds are within
    /// `precision` of each other.
    pub fn new_real_var(
        &mut self,
        name: impl Into<String>,
        lower_bound: f64,
        upper_bound: f64,
        precision: f64,
    ) -> VariableId {
        marrow_assert_simple!(lower_bound <= upper_bound);
        let domain = RealDomain::new(&mut self.environment, lower_bound, upper_bound, precision);
        self.push_variable(
            name.into(),
            VariableKind::Real,
            Representation::Real(domain),
            false,
        )
    }

    /// Creates the view `scale * source + offset`.
    ///
    /// The view is boolean when its source is boolean and the view is the identity or the
    /// negation `1 - source`.
    pub fn new_view(
        &mut self,
        name: impl Into<String>,
        source: VariableId,
        scale: i32,
        offset: i32,
    ) -> VariableId {
        let source_kind = self.variables[source].kind;
        marrow_assert_simple!(
            source_kind != VariableKind::Real,
            "views over real variables are not supported"
        );

        let kind = if source_kind == VariableKind::Bool
            && matches!((scale, offset), (1, 0) | (-1, 1))
        {
            VariableKind::Bool
        } else {
            VariableKind::Int
        };

        let view = self.push_variable(
            name.into(),
            kind,
            Representation::View(AffineView::new(source, scale, offset)),
            false,
        );
        self.variables[source].views.push(view);
        view
    }

    /// Creates the negation of `source`: `1 - source` for booleans and `-source` otherwise.
    pub fn new_negated_view(&mut self, name: impl Into<String>, source: VariableId) -> VariableId {
        if self.variables[source].kind == VariableKind::Bool {
            self.new_view(name, source, -1, 1)
        } else {
            self.new_view(name, source, -1, 0)
        }
    }

    fn push_variable(
        &mut self,
        name: String,
        kind: VariableKind,
        representation: Representation,
        instantiated: bool,
    ) -> VariableId {
        let (world, stamp) = if instantiated {
            self.instantiation_counter += 1;
            (
                self.environment.world_index() as i64,
                self.instantiation_counter - 1,
            )
        } else {
            (-1, -1)
        };
        let fixed_world = self.environment.make_int(world);
        let fixed_stamp = self.environment.make_int(stamp);

        self.variables.push(Variable {
            name,
            kind,
            representation,
            propagators: Default::default(),
            views: vec![],
            monitors: vec![],
            delta: None,
            fixed_world,
            fixed_stamp,
        })
    }
}

// Queries
impl Model {
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn variables(&self) -> impl Iterator<Item = VariableId> {
        self.variables.keys()
    }

    pub fn name(&self, variable: VariableId) -> &str {
        &self.variables[variable].name
    }

    pub fn kind(&self, variable: VariableId) -> VariableKind {
        self.variables[variable].kind
    }

    pub fn is_view(&self, variable: VariableId) -> bool {
        self.variables[variable].view().is_some()
    }

    /// Whether the variable is a constant, or a view over one.
    pub fn is_constant(&self, variable: VariableId) -> bool {
        match self.variables[variable].representation {
            Representation::Domain(IntDomain::Constant(_)) => true,
            Representation::Domain(_) | Representation::Real(_) => false,
            Representation::View(view) => self.is_constant(view.source),
        }
    }

    pub fn has_enumerated_domain(&self, variable: VariableId) -> bool {
        match self.variables[variable].representation {
            Representation::Domain(domain) => domain.is_enumerated(),
            Representation::Real(_) => false,
            Representation::View(view) => self.has_enumerated_domain(view.source),
        }
    }

    /// The lower bound of the variable; real variables report their bounds rounded outwards.
    pub fn lower_bound(&self, variable: VariableId) -> i32 {
        match self.variables[variable].representation {
            Representation::Domain(domain) => domain.lower_bound(&self.environment),
            Representation::Real(domain) => domain.lower_bound(&self.environment).floor() as i32,
            Representation::View(view) => view.lower_bound(self),
        }
    }

    pub fn upper_bound(&self, variable: VariableId) -> i32 {
        match self.variables[variable].representation {
            Representation::Domain(domain) => domain.upper_bound(&self.environment),
            Representation::Real(domain) => domain.upper_bound(&self.environment).ceil() as i32,
            Representation::View(view) => view.upper_bound(self),
        }
    }

    pub fn domain_size(&self, variable: VariableId) -> u64 {
        match self.variables[variable].representation {
            Representation::Domain(domain) => domain.size(&self.environment),
            Representation::Real(domain) => {
                if domain.is_instantiated(&self.environment) {
                    1
                } else {
                    (self.upper_bound(variable) as i64 - self.lower_bound(variable) as i64 + 1)
                        .max(2) as u64
                }
            }
            Representation::View(view) => self.domain_size(view.source),
        }
    }

    pub fn contains(&self, variable: VariableId, value: i32) -> bool {
        match self.variables[variable].representation {
            Representation::Domain(domain) => domain.contains(&self.environment, value),
            Representation::Real(domain) => {
                let value = value as f64;
                domain.lower_bound(&self.environment) <= value
                    && value <= domain.upper_bound(&self.environment)
            }
            Representation::View(view) => view.contains(self, value),
        }
    }

    pub fn is_instantiated(&self, variable: VariableId) -> bool {
        match self.variables[variable].representation {
            Representation::Domain(domain) => domain.is_instantiated(&self.environment),
            Representation::Real(domain) => domain.is_instantiated(&self.environment),
            Representation::View(view) => self.is_instantiated(view.source),
        }
    }

    /// The value of an instantiated variable.
    pub fn value(&self, variable: VariableId) -> Option<i32> {
        self.is_instantiated(variable)
            .then(|| self.lower_bound(variable))
    }

    /// See [`Model::lower_bound`] for how real variables are treated by the discrete queries.
    pub fn next_value(&self, variable: VariableId, value: i32) -> i32 {
        match self.variables[variable].representation {
            Representation::Domain(domain) => domain.next_value(&self.environment, value),
            Representation::Real(_) => {
                if value < self.lower_bound(variable) {
                    self.lower_bound(variable)
                } else if value >= self.upper_bound(variable) {
                    i32::MAX
                } else {
                    value + 1
                }
            }
            Representation::View(view) => view.next_value(self, value),
        }
    }

    pub fn previous_value(&self, variable: VariableId, value: i32) -> i32 {
        match self.variables[variable].representation {
            Representation::Domain(domain) => domain.previous_value(&self.environment, value),
            Representation::Real(_) => {
                if value > self.upper_bound(variable) {
                    self.upper_bound(variable)
                } else if value <= self.lower_bound(variable) {
                    i32::MIN
                } else {
                    value - 1
                }
            }
            Representation::View(view) => view.previous_value(self, value),
        }
    }

    /// The smallest value greater than `value` which is not in the domain.
    pub fn next_value_out(&self, variable: VariableId, value: i32) -> i32 {
        match self.variables[variable].representation {
            Representation::Domain(domain) => domain.next_value_out(&self.environment, value),
            Representation::Real(_) => {
                let next = value.saturating_add(1);
                if next < self.lower_bound(variable) || next > self.upper_bound(variable) {
                    next
                } else {
                    self.upper_bound(variable).saturating_add(1)
                }
            }
            Representation::View(view) => view.next_value_out(self, value),
        }
    }

    /// The largest value smaller than `value` which is not in the domain.
    pub fn previous_value_out(&self, variable: VariableId, value: i32) -> i32 {
        match self.variables[variable].representation {
            Representation::Domain(domain) => domain.previous_value_out(&self.environment, value),
            Representation::Real(_) => {
                let previous = value.saturating_sub(1);
                if previous < self.lower_bound(variable) || previous > self.upper_bound(variable) {
                    previous
                } else {
                    self.lower_bound(variable).saturating_sub(1)
                }
            }
            Representation::View(view) => view.previous_value_out(self, value),
        }
    }

    pub fn real_lower_bound(&self, variable: VariableId) -> f64 {
        match self.variables[variable].representation {
            Representation::Real(domain) => domain.lower_bound(&self.environment),
            _ => self.lower_bound(variable) as f64,
        }
    }

    pub fn real_upper_bound(&self, variable: VariableId) -> f64 {
        match self.variables[variable].representation {
            Representation::Real(domain) => domain.upper_bound(&self.environment),
            _ => self.upper_bound(variable) as f64,
        }
    }

    /// The precision of a real variable; discrete variables have a precision of zero.
    pub fn precision(&self, variable: VariableId) -> f64 {
        match self.variables[variable].representation {
            Representation::Real(domain) => domain.precision(),
            _ => 0.0,
        }
    }

    /// The world in which the variable became instantiated, if it is.
    pub fn fixed_world(&self, variable: VariableId) -> Option<usize> {
        let root = self.root(variable).0;
        let world = self.environment.get_int(self.variables[root].fixed_world);
        (world >= 0).then_some(world as usize)
    }

    /// A counter which orders instantiations; a variable with a larger stamp was instantiated
    /// later.
    pub fn fixed_stamp(&self, variable: VariableId) -> Option<u64> {
        let root = self.root(variable).0;
        let stamp = self.environment.get_int(self.variables[root].fixed_stamp);
        (stamp >= 0).then_some(stamp as u64)
    }

    /// The variable owning the storage of `variable`, with the scale and offset mapping the root
    /// to `variable`.
    pub(crate) fn root(&self, variable: VariableId) -> (VariableId, i32, i32) {
        let mut root = variable;
        let mut scale = 1;
        let mut offset = 0;
        while let Some(view) = self.variables[root].view() {
            // y = s * (s' * x + o') + o
            offset += scale * view.offset;
            scale *= view.scale;
            root = view.source;
        }
        (root, scale, offset)
    }

    /// How many times each event type has been raised.
    pub fn event_counts(&self) -> &EnumMap<IntEventType, u64> {
        &self.event_counts
    }

    pub fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.variables
            .len()
            .log(statistic_logger.attach_to_prefix("variables"));
        self.propagators
            .iter()
            .filter(|scope| !scope.removed)
            .count()
            .log(statistic_logger.attach_to_prefix("propagators"));
        for (event, count) in &self.event_counts {
            count.log(statistic_logger.attach_to_prefix(format!("{event}").to_lowercase()));
        }
    }
}

// Propagators and monitors
impl Model {
    /// Registers a propagator watching `variables`, the i-th one under `conditions[i]`.
    pub fn add_propagator(
        &mut self,
        variables: &[VariableId],
        conditions: &[EnumSet<IntDomainEvent>],
    ) -> PropagatorId {
        marrow_assert_eq_simple!(variables.len(), conditions.len());

        let propagator = self.propagators.next_key();
        for (index, (&variable, &condition)) in variables.iter().zip(conditions).enumerate() {
            self.variables[variable].propagators.link(
                PropagatorVarId {
                    propagator,
                    index: index as u32,
                },
                bucket_for(condition),
            );
        }

        self.propagators.push(PropagatorScope {
            variables: variables.to_vec(),
            conditions: conditions.to_vec(),
            removed: false,
        })
    }

    pub fn remove_propagator(&mut self, propagator: PropagatorId) {
        self.for_each_scope_entry(propagator, |registry, entry, _| {
            let _ = registry.unlink(entry);
        });
        self.propagators[propagator].removed = true;
    }

    /// Moves the propagator to the passive bucket of its variables, so it is woken by nothing.
    pub fn passivate(&mut self, propagator: PropagatorId) {
        self.for_each_scope_entry(propagator, |registry, entry, _| {
            if registry.unlink(entry).is_some() {
                registry.link(entry, PASSIVE_BUCKET);
            }
        });
    }

    /// Undoes [`Model::passivate`].
    pub fn activate(&mut self, propagator: PropagatorId) {
        self.for_each_scope_entry(propagator, |registry, entry, condition| {
            if registry.unlink(entry).is_some() {
                registry.link(entry, bucket_for(condition));
            }
        });
    }

    fn for_each_scope_entry(
        &mut self,
        propagator: PropagatorId,
        mut action: impl FnMut(&mut PropagatorRegistry, PropagatorVarId, EnumSet<IntDomainEvent>),
    ) {
        let scope = &self.propagators[propagator];
        for (index, (&variable, &condition)) in
            scope.variables.iter().zip(&scope.conditions).enumerate()
        {
            action(
                &mut self.variables[variable].propagators,
                PropagatorVarId {
                    propagator,
                    index: index as u32,
                },
                condition,
            );
        }
    }

    pub fn scope(&self, propagator: PropagatorId) -> &[VariableId] {
        &self.propagators[propagator].variables
    }

    pub fn is_removed(&self, propagator: PropagatorId) -> bool {
        self.propagators[propagator].removed
    }

    /// The propagators which have not been removed.
    pub fn propagators(&self) -> impl Iterator<Item = PropagatorId> + '_ {
        self.propagators
            .keys()
            .filter(|&propagator| !self.propagators[propagator].removed)
    }

    /// The propagators registered on the variable, passive ones included.
    pub fn propagators_of(
        &self,
        variable: VariableId,
    ) -> impl Iterator<Item = PropagatorVarId> + '_ {
        self.variables[variable].propagators.iter()
    }

    pub fn number_of_propagators(&self, variable: VariableId) -> usize {
        self.variables[variable].propagators.len()
    }

    pub fn new_monitor_id(&mut self) -> MonitorId {
        self.monitor_ids.next_key()
    }

    /// Attaches the monitor to the variable; attaching it twice has no effect.
    pub fn add_monitor(&mut self, variable: VariableId, monitor: MonitorId) {
        let monitors = &mut self.variables[variable].monitors;
        if !monitors.contains(&monitor) {
            monitors.push(monitor);
        }
    }

    pub fn remove_monitor(&mut self, variable: VariableId, monitor: MonitorId) {
        self.variables[variable]
            .monitors
            .retain(|&candidate| candidate != monitor);
    }

    /// Starts recording the removals of the variable (of its root, for a view); real variables
    /// record nothing.
    pub fn create_delta(&mut self, variable: VariableId) {
        let (root, _, _) = self.root(variable);
        let Representation::Domain(domain) = self.variables[root].representation else {
            return;
        };
        if self.variables[root].delta.is_some() {
            return;
        }

        let recorder = if domain.is_enumerated() {
            DeltaRecorder::values(&mut self.environment)
        } else {
            DeltaRecorder::ranges(&mut self.environment)
        };
        self.variables[root].delta = Some(recorder);
    }

    /// Creates a monitor over the removals of the variable made from now on; removals caused by
    /// `owner` are skipped.
    pub fn monitor_delta(
        &mut self,
        variable: VariableId,
        owner: Option<PropagatorId>,
    ) -> DeltaMonitor {
        self.create_delta(variable);
        let (root, scale, offset) = self.root(variable);
        let recorded = self.variables[root]
            .delta
            .as_ref()
            .map_or(0, |delta| delta.len(&self.environment));
        let cursor = self.environment.make_int(recorded as i64);

        DeltaMonitor::new(root, owner, cursor, recorded, scale, offset)
    }

    pub(crate) fn delta_of(&self, root: VariableId) -> Option<&DeltaRecorder> {
        self.variables[root].delta.as_ref()
    }
}

// Worlds
impl Model {
    pub fn world_index(&self) -> usize {
        self.environment.world_index()
    }

    pub fn world_push(&mut self) {
        self.environment.world_push();
    }

    pub fn world_pop(&mut self) {
        self.environment.world_pop();
    }

    pub fn world_pop_until(&mut self, world: usize) {
        self.environment.world_pop_until(world);
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// The storage of the model, for heuristics and propagators keeping backtrackable state.
    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.environment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Cause;
    use crate::engine::NoPropagation;

    #[test]
    fn bounds_and_size_agree_after_changes() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 9);

        let _ = model
            .remove_interval(x, 0, 3, Cause::Null, &mut NoPropagation)
            .expect("non-empty");
        let _ = model
            .remove_value(x, 9, Cause::Null, &mut NoPropagation)
            .expect("non-empty");

        assert_eq!(4, model.lower_bound(x));
        assert_eq!(8, model.upper_bound(x));
        assert_eq!(5, model.domain_size(x));
        assert!(!model.is_instantiated(x));
    }

    #[test]
    fn views_read_through_their_source() {
        let mut model = Model::default();
        let x = model.new_enumerated_var_from_values("x", &[1, 3, 4]);
        let y = model.new_view("y", x, -2, 10);

        assert_eq!(2, model.lower_bound(y));
        assert_eq!(8, model.upper_bound(y));
        assert!(model.contains(y, 4));
        assert!(!model.contains(y, 5));
        assert_eq!(4, model.next_value(y, 2));
        assert_eq!(8, model.next_value(y, 4));
        assert_eq!(i32::MAX, model.next_value(y, 8));
        assert_eq!(4, model.previous_value(y, 8));
        assert_eq!(3, model.next_value_out(y, 2));
        assert_eq!(x, model.root(y).0);
    }

    #[test]
    fn negated_booleans_stay_boolean() {
        let mut model = Model::default();
        let b = model.new_bool_var("b");
        let not_b = model.new_negated_view("not_b", b);
        let x = model.new_enumerated_var("x", 0, 3);
        let minus_x = model.new_negated_view("minus_x", x);

        assert_eq!(VariableKind::Bool, model.kind(not_b));
        assert_eq!(VariableKind::Int, model.kind(minus_x));
        assert_eq!(-3, model.lower_bound(minus_x));
    }

    #[test]
    fn passive_propagators_are_not_woken() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 3);
        let propagator = model.add_propagator(&[x], &[IntDomainEvent::Removal.into()]);

        model.passivate(propagator);
        assert_eq!(
            0,
            model.variables[x]
                .propagators
                .woken_by(IntEventType::Instantiate)
                .count()
        );

        model.activate(propagator);
        assert_eq!(
            1,
            model.variables[x]
                .propagators
                .woken_by(IntEventType::Remove)
                .count()
        );
    }

    #[test]
    fn adding_a_monitor_twice_registers_it_once() {
        let mut model = Model::default();
        let x = model.new_bool_var("x");
        let monitor = model.new_monitor_id();

        model.add_monitor(x, monitor);
        model.add_monitor(x, monitor);
        assert_eq!(1, model.variables[x].monitors.len());

        model.remove_monitor(x, monitor);
        assert!(model.variables[x].monitors.is_empty());
    }
}
