use log::debug;

use super::is_weighted;
use super::Criterion;
use super::FlushTracker;
use super::VariableWeights;
use super::WatchedPair;
use super::WatchedPairs;
use super::WeightFlush;
use super::WeightedSearch;
use super::WeightedSearchStatistics;
use crate::branching::SelectionContext;
use crate::engine::Model;
use crate::engine::PropagatorId;
use crate::engine::VariableId;

/// The options of [`DomWDeg`] and [`DomWDegRef`](super::DomWDegRef).
#[derive(Debug, Clone, Copy)]
pub struct DomWDegOptions {
    /// When the weights are cleared after a restart.
    pub flush: WeightFlush,
}

impl Default for DomWDegOptions {
    fn default() -> Self {
        DomWDegOptions {
            flush: WeightFlush::WhenTopStable {
                top: 10,
                restarts: 32,
            },
        }
    }
}

/// The weighted-degree criterion: every variable of a failing propagator gains a weight of 1 and
/// the variable minimising `|D(x)| / (1 + w(x))` is selected.
///
/// When only one variable of the propagator is free and it is the deepest one, the failure does
/// not depend on the last variable which was instantiated beyond the world it was fixed in; the
/// increment of that variable is therefore revoked when its world is popped.
#[derive(Debug, Clone)]
pub struct DomWDeg {
    weights: VariableWeights,
    options: DomWDegOptions,
    flush: FlushTracker<VariableId>,
}

impl DomWDeg {
    pub fn new(options: DomWDegOptions) -> Self {
        DomWDeg {
            weights: VariableWeights::default(),
            options,
            flush: FlushTracker::default(),
        }
    }

    pub fn weights(&self) -> &VariableWeights {
        &self.weights
    }
}

impl WeightedSearch<DomWDeg> {
    pub fn dom_wdeg(variables: &[VariableId]) -> Self {
        WeightedSearch::new(variables, DomWDeg::new(DomWDegOptions::default()))
    }
}

impl Criterion for DomWDeg {
    fn increase(
        &mut self,
        context: &mut SelectionContext,
        propagator: PropagatorId,
        pair: WatchedPair,
        statistics: &mut WeightedSearchStatistics,
    ) {
        let arity = context.model().scope(propagator).len();
        for index in 0..arity {
            let variable = context.model().scope(propagator)[index];
            if is_weighted(context.model(), variable) {
                let _ = self.weights.add(context.model_mut(), variable, 1.0);
            }
        }

        if pair.counter == 1
            && !context.is_instantiated(pair.first)
            && is_weighted(context.model(), pair.second)
        {
            let world = context.model().fixed_world(pair.second).unwrap_or(0);
            if world < context.world_index() {
                self.weights
                    .revoke_at(context.model_mut(), pair.second, 1.0, world);
                statistics.revoked_increments += 1;
            }
        }
    }

    fn score(&mut self, model: &Model, _: &mut WatchedPairs, variable: VariableId) -> f64 {
        (1.0 + self.weights.weight(model, variable)) / model.domain_size(variable) as f64
    }

    fn after_restart(
        &mut self,
        context: &mut SelectionContext,
        statistics: &mut WeightedSearchStatistics,
    ) {
        flush_weights(
            &mut self.weights,
            &mut self.flush,
            self.options.flush,
            context.model_mut(),
            statistics,
        );
    }
}

/// Clears `weights` if the `policy` says so.
pub(crate) fn flush_weights(
    weights: &mut VariableWeights,
    tracker: &mut FlushTracker<VariableId>,
    policy: WeightFlush,
    model: &mut Model,
    statistics: &mut WeightedSearchStatistics,
) {
    if tracker.should_flush(policy, |top| weights.top(model, top)) {
        debug!("Flushing the learned variable weights");
        weights.clear(model);
        statistics.weight_flushes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::tests::TestRandom;
    use crate::branching::SearchEvent;
    use crate::branching::VariableSelector;
    use crate::engine::events::IntDomainEvent;
    use crate::engine::Cause;
    use crate::engine::Contradiction;
    use crate::engine::NoPropagation;
    use crate::engine::ReasonCode;

    #[test]
    fn the_variables_of_the_failing_propagator_are_preferred() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 3);
        let y = model.new_enumerated_var("y", 0, 3);
        let z = model.new_enumerated_var("z", 0, 3);
        let propagator = model.add_propagator(
            &[y, z],
            &[IntDomainEvent::Assign.into(), IntDomainEvent::Assign.into()],
        );
        let mut strategy = WeightedSearch::dom_wdeg(&[x, y, z]);

        let mut engine = NoPropagation;
        let mut rng = TestRandom {
            usizes: vec![1],
            ..Default::default()
        };
        let mut context = SelectionContext::new(&mut model, &mut engine, &mut rng);
        assert!(strategy.init(&mut context));

        strategy.on_contradiction(
            &mut context,
            &Contradiction::new(
                Cause::Propagator(propagator),
                Some(y),
                ReasonCode::EmptyDomain,
            ),
        );

        assert_eq!(1.0, strategy.criterion().weights().weight(context.model(), y));
        assert_eq!(0.0, strategy.criterion().weights().weight(context.model(), x));
        // y and z tie, the random tie-breaker picks the second one
        assert_eq!(Some(z), strategy.select_variable(&mut context));
    }

    #[test]
    fn decisions_are_not_credited() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 3);
        let mut strategy = WeightedSearch::dom_wdeg(&[x]);

        let mut engine = NoPropagation;
        let mut rng = TestRandom::default();
        let mut context = SelectionContext::new(&mut model, &mut engine, &mut rng);

        strategy.on_contradiction(
            &mut context,
            &Contradiction::new(Cause::Decision, Some(x), ReasonCode::EmptyDomain),
        );

        assert_eq!(1, strategy.core().statistics().contradictions);
        assert_eq!(0, strategy.core().statistics().attributed_contradictions);
    }

    #[test]
    fn the_subscription_follows_init_and_remove() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 3);
        let mut strategy = WeightedSearch::dom_wdeg(&[x]);
        assert!(strategy.subscribe_to_events().is_empty());

        let mut engine = NoPropagation;
        let mut rng = TestRandom::default();
        let mut context = SelectionContext::new(&mut model, &mut engine, &mut rng);
        assert!(strategy.init(&mut context));
        assert!(strategy.init(&mut context));
        assert_eq!(
            vec![SearchEvent::Contradiction, SearchEvent::Restart],
            strategy.subscribe_to_events()
        );

        strategy.remove();
        assert!(strategy.subscribe_to_events().is_empty());
    }

    #[test]
    fn the_weights_are_flushed_when_asked_to() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 3);
        let y = model.new_enumerated_var("y", 0, 3);
        let propagator = model.add_propagator(
            &[x, y],
            &[IntDomainEvent::Assign.into(), IntDomainEvent::Assign.into()],
        );
        let mut strategy = WeightedSearch::new(
            &[x, y],
            DomWDeg::new(DomWDegOptions {
                flush: WeightFlush::Always,
            }),
        );

        let mut engine = NoPropagation;
        let mut rng = TestRandom::default();
        let mut context = SelectionContext::new(&mut model, &mut engine, &mut rng);
        strategy.on_contradiction(
            &mut context,
            &Contradiction::new(
                Cause::Propagator(propagator),
                Some(x),
                ReasonCode::EmptyDomain,
            ),
        );
        strategy.on_restart(&mut context);

        assert_eq!(0.0, strategy.criterion().weights().weight(context.model(), x));
        assert_eq!(1, strategy.core().statistics().weight_flushes);
    }
}
