use log::debug;

use super::dom_wdeg::flush_weights;
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
use crate::containers::HashMap;
use crate::engine::InsightTouch;
use crate::engine::Model;
use crate::engine::PropagatorId;
use crate::engine::VariableId;

/// How a reduction reported by the engine is turned into a credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum InsightWeighting {
    /// Every touched element gains 1.
    #[default]
    Uniform,
    /// Every touched element gains the number of values which were removed.
    ProportionalToDelta,
    /// The removals are normalised such that one propagation distributes a credit of 100.
    NormalizedTo100,
    /// The number of removed values, divided by one more than the current world index.
    DepthAdjusted,
}

impl InsightWeighting {
    fn credit(self, touch: &InsightTouch, total_removed: u64, world_index: usize) -> f64 {
        match self {
            InsightWeighting::Uniform => 1.0,
            InsightWeighting::ProportionalToDelta => touch.removed as f64,
            InsightWeighting::NormalizedTo100 => {
                if total_removed == 0 {
                    0.0
                } else {
                    touch.removed as f64 / total_removed as f64 * 100.0
                }
            }
            InsightWeighting::DepthAdjusted => touch.removed as f64 / (1 + world_index) as f64,
        }
    }
}

/// The options of [`PickOnDom`] and [`PickOnFil`].
#[derive(Debug, Clone, Copy)]
pub struct PickOnOptions {
    pub weighting: InsightWeighting,
    /// When the learned weights are cleared after a restart.
    pub flush: WeightFlush,
}

impl Default for PickOnOptions {
    fn default() -> Self {
        PickOnOptions {
            weighting: InsightWeighting::default(),
            flush: WeightFlush::Never,
        }
    }
}

/// The credits of the most recent propagation, or [`None`] if the engine reported nothing.
fn collect_credits(
    context: &SelectionContext,
    weighting: InsightWeighting,
) -> Option<Vec<(InsightTouch, f64)>> {
    let insight = context.inference_insight()?;
    if insight.is_empty() {
        return None;
    }
    let total_removed = insight.total_removed();
    let world_index = context.world_index();
    Some(
        insight
            .touches()
            .iter()
            .map(|touch| {
                (
                    *touch,
                    weighting.credit(touch, total_removed, world_index),
                )
            })
            .collect(),
    )
}

/// Credits the variables whose domains were reduced during the failing propagation.
///
/// When the engine does not report what it filtered, the variables of the failing propagator
/// are credited uniformly instead.
#[derive(Debug, Clone)]
pub struct PickOnDom {
    weights: VariableWeights,
    options: PickOnOptions,
    flush: FlushTracker<VariableId>,
}

impl PickOnDom {
    pub fn new(options: PickOnOptions) -> Self {
        PickOnDom {
            weights: VariableWeights::default(),
            options,
            flush: FlushTracker::default(),
        }
    }

    pub fn weights(&self) -> &VariableWeights {
        &self.weights
    }
}

impl WeightedSearch<PickOnDom> {
    pub fn pick_on_dom(variables: &[VariableId], options: PickOnOptions) -> Self {
        WeightedSearch::new(variables, PickOnDom::new(options))
    }
}

impl Criterion for PickOnDom {
    fn increase(
        &mut self,
        context: &mut SelectionContext,
        propagator: PropagatorId,
        _: WatchedPair,
        _: &mut WeightedSearchStatistics,
    ) {
        if let Some(credits) = collect_credits(context, self.options.weighting) {
            for (touch, credit) in credits {
                if is_weighted(context.model(), touch.variable) {
                    let _ = self
                        .weights
                        .add(context.model_mut(), touch.variable, credit);
                }
            }
            return;
        }

        let arity = context.model().scope(propagator).len();
        for index in 0..arity {
            let variable = context.model().scope(propagator)[index];
            if is_weighted(context.model(), variable) {
                let _ = self.weights.add(context.model_mut(), variable, 1.0);
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

/// Credits the propagators which filtered during the failing propagation; the weight of a
/// variable is the sum of the scores of its propagators.
///
/// When the engine does not report what it filtered, the failing propagator is credited
/// uniformly instead.
#[derive(Debug, Clone)]
pub struct PickOnFil {
    scores: HashMap<PropagatorId, f64>,
    options: PickOnOptions,
    flush: FlushTracker<PropagatorId>,
}

impl PickOnFil {
    pub fn new(options: PickOnOptions) -> Self {
        PickOnFil {
            scores: HashMap::default(),
            options,
            flush: FlushTracker::default(),
        }
    }

    pub fn score_of(&self, propagator: PropagatorId) -> f64 {
        self.scores.get(&propagator).copied().unwrap_or(0.0)
    }

    /// The sum of the scores of the propagators of `variable`.
    pub fn weight(&self, model: &Model, variable: VariableId) -> f64 {
        model
            .propagators_of(variable)
            .map(|entry| self.score_of(entry.propagator))
            .sum()
    }
}

impl WeightedSearch<PickOnFil> {
    pub fn pick_on_fil(variables: &[VariableId], options: PickOnOptions) -> Self {
        WeightedSearch::new(variables, PickOnFil::new(options))
    }
}

impl Criterion for PickOnFil {
    fn increase(
        &mut self,
        context: &mut SelectionContext,
        propagator: PropagatorId,
        _: WatchedPair,
        _: &mut WeightedSearchStatistics,
    ) {
        match collect_credits(context, self.options.weighting) {
            Some(credits) => {
                for (touch, credit) in credits {
                    *self.scores.entry(touch.propagator).or_insert(0.0) += credit;
                }
            }
            None => *self.scores.entry(propagator).or_insert(0.0) += 1.0,
        }
    }

    fn score(&mut self, model: &Model, _: &mut WatchedPairs, variable: VariableId) -> f64 {
        (1.0 + self.weight(model, variable)) / model.domain_size(variable) as f64
    }

    fn after_restart(
        &mut self,
        _: &mut SelectionContext,
        statistics: &mut WeightedSearchStatistics,
    ) {
        let scores = &self.scores;
        let should_flush = self
            .flush
            .should_flush(self.options.flush, |k| top_propagators(scores, k));
        if should_flush {
            debug!("Flushing the learned propagator scores");
            self.scores.clear();
            statistics.weight_flushes += 1;
        }
    }
}

/// The (at most) `k` propagators with the largest positive score, best first.
fn top_propagators(scores: &HashMap<PropagatorId, f64>, k: usize) -> Vec<PropagatorId> {
    let mut scored = scores
        .iter()
        .filter(|&(_, &score)| score > 0.0)
        .map(|(&propagator, &score)| (propagator, score))
        .collect::<Vec<_>>();
    scored.sort_by(|(lhs, lhs_score), (rhs, rhs_score)| {
        rhs_score.total_cmp(lhs_score).then(lhs.cmp(rhs))
    });
    scored
        .into_iter()
        .take(k)
        .map(|(propagator, _)| propagator)
        .collect()
}
