use crate::containers::HashMap;
use crate::engine::Model;
use crate::engine::PropagatorId;
use crate::engine::VariableId;

/// The two deepest variables of a propagator at the time it was last credited with a
/// contradiction.
///
/// Free variables are the deepest, followed by the variables which were instantiated most
/// recently. As long as both are free, the propagator still has at least two free variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchedPair {
    pub first: VariableId,
    pub second: VariableId,
    /// The number of free variables in the scope when the pair was computed.
    pub counter: usize,
}

/// The [`WatchedPair`] of every propagator which has been credited with a contradiction.
#[derive(Debug, Default, Clone)]
pub struct WatchedPairs {
    pairs: HashMap<PropagatorId, WatchedPair>,
}

impl WatchedPairs {
    pub fn get(&self, propagator: PropagatorId) -> Option<WatchedPair> {
        self.pairs.get(&propagator).copied()
    }

    /// Recomputes the pair of `propagator` from the current state of its scope.
    ///
    /// Returns [`None`] if the scope contains fewer than two variables.
    pub fn attribute(&mut self, model: &Model, propagator: PropagatorId) -> Option<WatchedPair> {
        let pair = deepest_pair(model, model.scope(propagator))?;
        let _ = self.pairs.insert(propagator, pair);
        Some(pair)
    }

    /// Whether at least two variables of `propagator` are free.
    ///
    /// Only rescans the scope when one of the watched variables has been instantiated.
    pub fn has_at_least_two_free(&mut self, model: &Model, propagator: PropagatorId) -> bool {
        if let Some(pair) = self.pairs.get(&propagator) {
            if !model.is_instantiated(pair.first) && !model.is_instantiated(pair.second) {
                return true;
            }
        }
        self.attribute(model, propagator)
            .is_some_and(|pair| pair.counter >= 2)
    }
}

/// Orders variables by depth: free variables are deepest, instantiated ones by the world in
/// which they were fixed and then by their instantiation stamp.
fn depth(model: &Model, variable: VariableId) -> (bool, usize, u64) {
    if !model.is_instantiated(variable) {
        return (true, 0, 0);
    }
    (
        false,
        model.fixed_world(variable).unwrap_or(0),
        model.fixed_stamp(variable).unwrap_or(0),
    )
}

fn deepest_pair(model: &Model, scope: &[VariableId]) -> Option<WatchedPair> {
    if scope.len() < 2 {
        return None;
    }

    let mut counter = 0;
    let mut first: Option<(VariableId, (bool, usize, u64))> = None;
    let mut second: Option<(VariableId, (bool, usize, u64))> = None;
    for &variable in scope {
        let variable_depth = depth(model, variable);
        if variable_depth.0 {
            counter += 1;
        }

        if first.is_none_or(|(_, deepest)| variable_depth > deepest) {
            second = first;
            first = Some((variable, variable_depth));
        } else if second.is_none_or(|(_, runner_up)| variable_depth > runner_up) {
            second = Some((variable, variable_depth));
        }
    }

    match (first, second) {
        (Some((first, _)), Some((second, _))) => Some(WatchedPair {
            first,
            second,
            counter,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use enumset::EnumSet;

    use super::*;
    use crate::engine::events::IntDomainEvent;
    use crate::engine::Cause;
    use crate::engine::NoPropagation;

    fn propagator_over(model: &mut Model, variables: &[VariableId]) -> PropagatorId {
        let conditions: Vec<EnumSet<IntDomainEvent>> =
            vec![IntDomainEvent::Assign.into(); variables.len()];
        model.add_propagator(variables, &conditions)
    }

    #[test]
    fn free_variables_are_the_deepest() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 2);
        let y = model.new_enumerated_var("y", 0, 2);
        let z = model.new_enumerated_var("z", 0, 2);
        let propagator = propagator_over(&mut model, &[x, y, z]);

        model.world_push();
        let _ = model.instantiate_to(x, 1, Cause::Decision, &mut NoPropagation);

        let pair = WatchedPairs::default()
            .attribute(&model, propagator)
            .expect("the scope has three variables");
        assert_eq!(
            WatchedPair {
                first: y,
                second: z,
                counter: 2
            },
            pair
        );
    }

    #[test]
    fn ties_between_fixed_variables_go_to_the_most_recent() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 2);
        let y = model.new_enumerated_var("y", 0, 2);
        let z = model.new_enumerated_var("z", 0, 2);
        let propagator = propagator_over(&mut model, &[x, y, z]);

        model.world_push();
        let _ = model.instantiate_to(y, 0, Cause::Decision, &mut NoPropagation);
        let _ = model.instantiate_to(x, 0, Cause::Decision, &mut NoPropagation);

        let pair = WatchedPairs::default()
            .attribute(&model, propagator)
            .expect("the scope has three variables");
        assert_eq!(z, pair.first);
        assert_eq!(x, pair.second);
        assert_eq!(1, pair.counter);
    }

    #[test]
    fn the_pair_is_rewatched_once_a_watched_variable_is_fixed() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 2);
        let y = model.new_enumerated_var("y", 0, 2);
        let z = model.new_enumerated_var("z", 0, 2);
        let propagator = propagator_over(&mut model, &[x, y, z]);
        let mut pairs = WatchedPairs::default();

        assert!(pairs.has_at_least_two_free(&model, propagator));

        model.world_push();
        let _ = model.instantiate_to(x, 0, Cause::Decision, &mut NoPropagation);
        assert!(pairs.has_at_least_two_free(&model, propagator));

        model.world_push();
        let _ = model.instantiate_to(y, 0, Cause::Decision, &mut NoPropagation);
        assert!(!pairs.has_at_least_two_free(&model, propagator));

        model.world_pop();
        assert!(pairs.has_at_least_two_free(&model, propagator));
    }

    #[test]
    fn unary_propagators_have_no_pair() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 2);
        let propagator = propagator_over(&mut model, &[x]);

        let mut pairs = WatchedPairs::default();
        assert_eq!(None, pairs.attribute(&model, propagator));
        assert!(!pairs.has_at_least_two_free(&model, propagator));
    }
}
