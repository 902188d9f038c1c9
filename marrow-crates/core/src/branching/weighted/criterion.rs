use log::debug;
use log::trace;
use log::warn;

use super::WatchedPair;
use super::WatchedPairs;
use super::WeightedSearchStatistics;
use crate::branching::tie_breaking::Direction;
use crate::branching::tie_breaking::RandomTieBreaker;
use crate::branching::tie_breaking::TieBreaker;
use crate::branching::variable_selection::FreeVariableScan;
use crate::branching::SearchEvent;
use crate::branching::SelectionContext;
use crate::branching::VariableSelector;
use crate::engine::Contradiction;
use crate::engine::Model;
use crate::engine::PropagatorId;
use crate::engine::VariableId;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

/// Defines how a [`WeightedSearch`] learns from contradictions and scores the free variables.
pub trait Criterion {
    /// Credits the contradiction raised by `propagator`, whose deepest variables are `pair`.
    fn increase(
        &mut self,
        context: &mut SelectionContext,
        propagator: PropagatorId,
        pair: WatchedPair,
        statistics: &mut WeightedSearchStatistics,
    );

    /// The score of the free variable `variable`; the variable with the largest score is
    /// selected.
    fn score(&mut self, model: &Model, watched_pairs: &mut WatchedPairs, variable: VariableId)
        -> f64;

    /// Called after every restart.
    fn after_restart(
        &mut self,
        _context: &mut SelectionContext,
        _statistics: &mut WeightedSearchStatistics,
    ) {
    }
}

/// The state shared by every weighted selector: the free candidates, the watched pair of every
/// failing propagator and whether the selector listens to the search.
#[derive(Debug, Clone)]
pub struct CriterionCore {
    scan: FreeVariableScan,
    watched_pairs: WatchedPairs,
    subscribed: bool,
    statistics: WeightedSearchStatistics,
}

impl CriterionCore {
    fn new(variables: &[VariableId]) -> Self {
        CriterionCore {
            scan: FreeVariableScan::new(variables),
            watched_pairs: WatchedPairs::default(),
            subscribed: false,
            statistics: WeightedSearchStatistics::default(),
        }
    }

    pub fn watched_pairs(&self) -> &WatchedPairs {
        &self.watched_pairs
    }

    /// Whether at least two variables of `propagator` are free, see
    /// [`WatchedPairs::has_at_least_two_free`].
    pub fn has_at_least_two_free(&mut self, model: &Model, propagator: PropagatorId) -> bool {
        self.watched_pairs.has_at_least_two_free(model, propagator)
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    pub fn statistics(&self) -> &WeightedSearchStatistics {
        &self.statistics
    }
}

/// A [`VariableSelector`] choosing the free variable with the largest score according to its
/// [`Criterion`]; ties are broken uniformly at random.
///
/// The selector only learns once [`VariableSelector::init`] has subscribed it to the
/// contradictions and restarts of the search.
#[derive(Debug)]
pub struct WeightedSearch<C> {
    core: CriterionCore,
    criterion: C,
    tie_breaker: RandomTieBreaker<VariableId, f64>,
}

impl<C: Criterion> WeightedSearch<C> {
    pub fn new(variables: &[VariableId], criterion: C) -> Self {
        if variables.is_empty() {
            warn!("The weighted variable selector was not provided with any variables");
        }
        WeightedSearch {
            core: CriterionCore::new(variables),
            criterion,
            tie_breaker: RandomTieBreaker::new(Direction::Maximum),
        }
    }

    pub fn core(&self) -> &CriterionCore {
        &self.core
    }

    pub fn criterion(&self) -> &C {
        &self.criterion
    }
}

impl<C: Criterion> VariableSelector for WeightedSearch<C> {
    fn init(&mut self, _context: &mut SelectionContext) -> bool {
        if !self.core.subscribed {
            debug!(
                "Subscribing a weighted selector over {} variables",
                self.core.scan.len()
            );
            self.core.subscribed = true;
        }
        true
    }

    fn select_variable(&mut self, context: &mut SelectionContext) -> Option<VariableId> {
        let free_variables = self.core.scan.free_variables(context.model_mut());
        for &variable in free_variables {
            let score = self
                .criterion
                .score(context.model(), &mut self.core.watched_pairs, variable);
            self.tie_breaker.consider(variable, score);
        }
        self.tie_breaker.select(context.random())
    }

    fn remove(&mut self) {
        self.core.subscribed = false;
    }

    fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.core.statistics.log(statistic_logger);
    }

    fn on_contradiction(&mut self, context: &mut SelectionContext, contradiction: &Contradiction) {
        self.core.statistics.contradictions += 1;

        let Some(propagator) = contradiction.propagator() else {
            return;
        };
        let Some(pair) = self
            .core
            .watched_pairs
            .attribute(context.model(), propagator)
        else {
            return;
        };

        trace!(
            "Attributing a contradiction to {propagator:?}, watching {} and {} ({} free)",
            pair.first,
            pair.second,
            pair.counter
        );
        self.core.statistics.attributed_contradictions += 1;
        self.criterion
            .increase(context, propagator, pair, &mut self.core.statistics);
    }

    fn on_restart(&mut self, context: &mut SelectionContext) {
        self.criterion
            .after_restart(context, &mut self.core.statistics);
    }

    fn subscribe_to_events(&self) -> Vec<SearchEvent> {
        if self.core.subscribed {
            vec![SearchEvent::Contradiction, SearchEvent::Restart]
        } else {
            vec![]
        }
    }
}
