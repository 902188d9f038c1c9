use super::dom_wdeg::flush_weights;
use super::is_weighted;
use super::Criterion;
use super::DomWDegOptions;
use super::FlushTracker;
use super::VariableWeights;
use super::WatchedPair;
use super::WatchedPairs;
use super::WeightedSearch;
use super::WeightedSearchStatistics;
use crate::branching::SelectionContext;
use crate::engine::Model;
use crate::engine::PropagatorId;
use crate::engine::VariableId;

/// The refined weighted-degree criterion: a failing propagator of arity `n` credits each of its
/// variables with `1 / (n × |D(x)|)`, so that small propagators and small domains at the moment
/// of the failure weigh more.
#[derive(Debug, Clone)]
pub struct DomWDegRef {
    weights: VariableWeights,
    options: DomWDegOptions,
    flush: FlushTracker<VariableId>,
}

impl DomWDegRef {
    pub fn new(options: DomWDegOptions) -> Self {
        DomWDegRef {
            weights: VariableWeights::default(),
            options,
            flush: FlushTracker::default(),
        }
    }

    pub fn weights(&self) -> &VariableWeights {
        &self.weights
    }
}

impl WeightedSearch<DomWDegRef> {
    pub fn dom_wdeg_ref(variables: &[VariableId]) -> Self {
        WeightedSearch::new(variables, DomWDegRef::new(DomWDegOptions::default()))
    }
}

impl Criterion for DomWDegRef {
    fn increase(
        &mut self,
        context: &mut SelectionContext,
        propagator: PropagatorId,
        _: WatchedPair,
        _: &mut WeightedSearchStatistics,
    ) {
        let arity = context.model().scope(propagator).len();
        for index in 0..arity {
            let variable = context.model().scope(propagator)[index];
            if !is_weighted(context.model(), variable) {
                continue;
            }
            let size = (context.domain_size(variable) as f64).max(0.5);
            let _ = self
                .weights
                .add(context.model_mut(), variable, 1.0 / (arity as f64 * size));
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::tests::TestRandom;
    use crate::branching::VariableSelector;
    use crate::engine::events::IntDomainEvent;
    use crate::engine::Cause;
    use crate::engine::Contradiction;
    use crate::engine::NoPropagation;
    use crate::engine::ReasonCode;

    #[test]
    fn small_domains_receive_larger_increments() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 1);
        let y = model.new_enumerated_var("y", 0, 3);
        let constant = model.new_constant(2);
        let propagator = model.add_propagator(
            &[x, y, constant],
            &[IntDomainEvent::Assign.into(); 3],
        );
        let mut strategy = WeightedSearch::dom_wdeg_ref(&[x, y]);

        let mut engine = NoPropagation;
        let mut rng = TestRandom::default();
        let mut context = SelectionContext::new(&mut model, &mut engine, &mut rng);
        strategy.on_contradiction(
            &mut context,
            &Contradiction::new(
                Cause::Propagator(propagator),
                Some(y),
                ReasonCode::EmptyDomain,
            ),
        );

        let weights = strategy.criterion().weights();
        assert_eq!(1.0 / 6.0, weights.weight(context.model(), x));
        assert_eq!(1.0 / 12.0, weights.weight(context.model(), y));
        assert_eq!(0.0, weights.weight(context.model(), constant));
    }
}
