use super::Criterion;
use super::WatchedPair;
use super::WatchedPairs;
use super::WeightedSearch;
use super::WeightedSearchStatistics;
use crate::branching::SelectionContext;
use crate::containers::HashMap;
use crate::engine::Model;
use crate::engine::PropagatorId;
use crate::engine::VariableId;

/// The options of [`ConflictHistory`].
#[derive(Debug, Clone, Copy)]
pub struct ConflictHistoryOptions {
    /// The initial step size of the moving average.
    pub step_size: f64,
    /// How much the step size decreases after every conflict.
    pub step_size_decrement: f64,
    /// The smallest step size.
    pub minimum_step_size: f64,
    /// The decay applied to the scores on a restart, per conflict since the last failure of a
    /// propagator.
    pub decay: f64,
    /// Added to the weight of every variable so that variables without failing propagators can
    /// still be told apart by their domain size.
    pub epsilon: f64,
}

impl Default for ConflictHistoryOptions {
    fn default() -> Self {
        ConflictHistoryOptions {
            step_size: 0.1,
            step_size_decrement: 1e-6,
            minimum_step_size: 0.06,
            decay: 0.995,
            epsilon: 1e-4,
        }
    }
}

/// Conflict-history search: every propagator has a score, an exponential moving average of a
/// reward which is larger when the propagator failed recently. The weight of a variable is the
/// sum of the scores of its propagators which have at least two free variables.
#[derive(Debug, Clone)]
pub struct ConflictHistory {
    options: ConflictHistoryOptions,
    scores: HashMap<PropagatorId, f64>,
    last_conflict: HashMap<PropagatorId, u64>,
    conflicts: u64,
    step_size: f64,
}

impl ConflictHistory {
    pub fn new(options: ConflictHistoryOptions) -> Self {
        ConflictHistory {
            options,
            scores: HashMap::default(),
            last_conflict: HashMap::default(),
            conflicts: 0,
            step_size: options.step_size,
        }
    }

    pub fn score_of(&self, propagator: PropagatorId) -> f64 {
        self.scores.get(&propagator).copied().unwrap_or(0.0)
    }

    pub fn conflicts(&self) -> u64 {
        self.conflicts
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }
}

impl WeightedSearch<ConflictHistory> {
    pub fn conflict_history(variables: &[VariableId]) -> Self {
        WeightedSearch::new(
            variables,
            ConflictHistory::new(ConflictHistoryOptions::default()),
        )
    }
}

impl Criterion for ConflictHistory {
    fn increase(
        &mut self,
        _: &mut SelectionContext,
        propagator: PropagatorId,
        _: WatchedPair,
        _: &mut WeightedSearchStatistics,
    ) {
        let last_conflict = self.last_conflict.get(&propagator).copied().unwrap_or(0);
        let reward = 1.0 / ((self.conflicts - last_conflict) as f64 + 1.0);

        let score = self.scores.entry(propagator).or_insert(0.0);
        *score = (1.0 - self.step_size) * *score + self.step_size * reward;

        let _ = self.last_conflict.insert(propagator, self.conflicts);
        self.conflicts += 1;
        self.step_size =
            (self.step_size - self.options.step_size_decrement).max(self.options.minimum_step_size);
    }

    fn score(
        &mut self,
        model: &Model,
        watched_pairs: &mut WatchedPairs,
        variable: VariableId,
    ) -> f64 {
        let weight = model
            .propagators_of(variable)
            .map(|entry| entry.propagator)
            .filter(|propagator| self.scores.contains_key(propagator))
            .filter(|&propagator| watched_pairs.has_at_least_two_free(model, propagator))
            .map(|propagator| self.scores[&propagator])
            .sum::<f64>();
        (weight + self.options.epsilon) / model.domain_size(variable) as f64
    }

    fn after_restart(&mut self, _: &mut SelectionContext, _: &mut WeightedSearchStatistics) {
        for (propagator, score) in self.scores.iter_mut() {
            let last_conflict = self.last_conflict.get(propagator).copied().unwrap_or(0);
            let elapsed = self.conflicts - last_conflict;
            *score *= self.options.decay.powi(elapsed.min(i32::MAX as u64) as i32);
        }
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

    fn fail(propagator: PropagatorId) -> Contradiction {
        Contradiction::new(
            Cause::Propagator(propagator),
            None,
            ReasonCode::EmptyDomain,
        )
    }

    #[test]
    fn the_score_is_a_moving_average_of_the_reward() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 3);
        let y = model.new_enumerated_var("y", 0, 3);
        let propagator = model.add_propagator(
            &[x, y],
            &[IntDomainEvent::Assign.into(), IntDomainEvent::Assign.into()],
        );
        let mut strategy = WeightedSearch::conflict_history(&[x, y]);

        let mut engine = NoPropagation;
        let mut rng = TestRandom::default();
        let mut context = SelectionContext::new(&mut model, &mut engine, &mut rng);

        strategy.on_contradiction(&mut context, &fail(propagator));
        assert_eq!(0.1, strategy.criterion().score_of(propagator));

        strategy.on_contradiction(&mut context, &fail(propagator));
        let step_size = 0.1 - 1e-6;
        let expected = (1.0 - step_size) * 0.1 + step_size * 0.5;
        assert!((expected - strategy.criterion().score_of(propagator)).abs() < 1e-12);
        assert_eq!(2, strategy.criterion().conflicts());
    }

    #[test]
    fn the_step_size_does_not_drop_below_its_minimum() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 3);
        let y = model.new_enumerated_var("y", 0, 3);
        let propagator = model.add_propagator(
            &[x, y],
            &[IntDomainEvent::Assign.into(), IntDomainEvent::Assign.into()],
        );
        let mut strategy = WeightedSearch::new(
            &[x, y],
            ConflictHistory::new(ConflictHistoryOptions {
                step_size_decrement: 0.03,
                ..Default::default()
            }),
        );

        let mut engine = NoPropagation;
        let mut rng = TestRandom::default();
        let mut context = SelectionContext::new(&mut model, &mut engine, &mut rng);
        for _ in 0..5 {
            strategy.on_contradiction(&mut context, &fail(propagator));
        }

        assert_eq!(0.06, strategy.criterion().step_size());
    }

    #[test]
    fn scores_decay_on_restart() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 3);
        let y = model.new_enumerated_var("y", 0, 3);
        let z = model.new_enumerated_var("z", 0, 3);
        let first = model.add_propagator(
            &[x, y],
            &[IntDomainEvent::Assign.into(), IntDomainEvent::Assign.into()],
        );
        let second = model.add_propagator(
            &[y, z],
            &[IntDomainEvent::Assign.into(), IntDomainEvent::Assign.into()],
        );
        let mut strategy = WeightedSearch::conflict_history(&[x, y, z]);

        let mut engine = NoPropagation;
        let mut rng = TestRandom::default();
        let mut context = SelectionContext::new(&mut model, &mut engine, &mut rng);
        strategy.on_contradiction(&mut context, &fail(first));
        strategy.on_contradiction(&mut context, &fail(second));
        let before = strategy.criterion().score_of(first);

        strategy.on_restart(&mut context);

        // `first` last failed at conflict 0, two conflicts have been seen since
        let expected = before * 0.995 * 0.995;
        assert!((expected - strategy.criterion().score_of(first)).abs() < 1e-12);
    }

    #[test]
    fn variables_of_failing_propagators_are_preferred() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 3);
        let y = model.new_enumerated_var("y", 0, 3);
        let z = model.new_enumerated_var("z", 0, 3);
        let propagator = model.add_propagator(
            &[x, y],
            &[IntDomainEvent::Assign.into(), IntDomainEvent::Assign.into()],
        );
        let _ = model.add_propagator(
            &[y, z],
            &[IntDomainEvent::Assign.into(), IntDomainEvent::Assign.into()],
        );
        let mut strategy = WeightedSearch::conflict_history(&[z, x, y]);

        let mut engine = NoPropagation;
        let mut rng = TestRandom {
            usizes: vec![0],
            ..Default::default()
        };
        let mut context = SelectionContext::new(&mut model, &mut engine, &mut rng);
        strategy.on_contradiction(&mut context, &fail(propagator));

        // x and y share the score of the failing propagator, z only has the epsilon
        assert_eq!(Some(x), strategy.select_variable(&mut context));
    }
}
