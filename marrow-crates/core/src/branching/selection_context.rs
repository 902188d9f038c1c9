use crate::basic_types::Random;
#[cfg(doc)]
use crate::branching::Brancher;
use crate::branching::Decision;
use crate::engine::Cause;
use crate::engine::Contradiction;
use crate::engine::InferenceInsight;
use crate::engine::Model;
use crate::engine::PropagationEngine;
use crate::engine::VariableId;

/// The context provided to the [`Brancher`] and its components.
///
/// Next to read access to the domains, it gives the heuristics access to the random generator,
/// to the backtrackable storage (for their own stored counters) and to the propagation engine
/// (for heuristics which probe the effect of a decision).
pub struct SelectionContext<'a> {
    model: &'a mut Model,
    engine: &'a mut dyn PropagationEngine,
    random_generator: &'a mut dyn Random,
}

impl std::fmt::Debug for SelectionContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionContext")
            .field("world_index", &self.model.world_index())
            .finish_non_exhaustive()
    }
}

impl<'a> SelectionContext<'a> {
    pub fn new(
        model: &'a mut Model,
        engine: &'a mut dyn PropagationEngine,
        rng: &'a mut dyn Random,
    ) -> Self {
        SelectionContext {
            model,
            engine,
            random_generator: rng,
        }
    }

    pub fn model(&self) -> &Model {
        &*self.model
    }

    pub fn model_mut(&mut self) -> &mut Model {
        &mut *self.model
    }

    /// Returns a random generator which can be used to generate random values (see [`Random`] for
    /// more information).
    pub fn random(&mut self) -> &mut dyn Random {
        &mut *self.random_generator
    }

    /// What the engine learned during its most recent propagation, if it keeps track of it.
    pub fn inference_insight(&self) -> Option<&InferenceInsight> {
        self.engine.inference_insight()
    }

    pub fn lower_bound(&self, variable: VariableId) -> i32 {
        self.model.lower_bound(variable)
    }

    pub fn upper_bound(&self, variable: VariableId) -> i32 {
        self.model.upper_bound(variable)
    }

    pub fn domain_size(&self, variable: VariableId) -> u64 {
        self.model.domain_size(variable)
    }

    pub fn contains(&self, variable: VariableId, value: i32) -> bool {
        self.model.contains(variable, value)
    }

    pub fn is_instantiated(&self, variable: VariableId) -> bool {
        self.model.is_instantiated(variable)
    }

    pub fn world_index(&self) -> usize {
        self.model.world_index()
    }

    pub fn world_push(&mut self) {
        self.model.world_push()
    }

    pub fn world_pop(&mut self) {
        self.model.world_pop()
    }

    /// Applies `decision`, scheduling the woken propagators in the engine.
    pub fn apply(&mut self, decision: Decision) -> Result<bool, Contradiction> {
        decision.apply(&mut *self.model, &mut *self.engine)
    }

    /// Applies the negation of `decision`.
    pub fn refute(&mut self, decision: Decision) -> Result<bool, Contradiction> {
        decision.refute(&mut *self.model, &mut *self.engine)
    }

    /// Instantiates `variable` on behalf of a heuristic (e.g. while probing).
    pub(crate) fn instantiate_to(
        &mut self,
        variable: VariableId,
        value: i32,
    ) -> Result<bool, Contradiction> {
        self.model
            .instantiate_to(variable, value, Cause::Heuristic, &mut *self.engine)
    }

    pub(crate) fn remove_value(
        &mut self,
        variable: VariableId,
        value: i32,
    ) -> Result<bool, Contradiction> {
        self.model
            .remove_value(variable, value, Cause::Heuristic, &mut *self.engine)
    }

    pub(crate) fn update_bounds(
        &mut self,
        variable: VariableId,
        lower_bound: i32,
        upper_bound: i32,
    ) -> Result<bool, Contradiction> {
        self.model.update_bounds(
            variable,
            lower_bound,
            upper_bound,
            Cause::Heuristic,
            &mut *self.engine,
        )
    }

    pub(crate) fn remove_interval(
        &mut self,
        variable: VariableId,
        from: i32,
        to: i32,
    ) -> Result<bool, Contradiction> {
        self.model
            .remove_interval(variable, from, to, Cause::Heuristic, &mut *self.engine)
    }

    /// Runs the engine to its fixpoint.
    pub fn propagate(&mut self) -> Result<(), Contradiction> {
        self.engine.propagate(&mut *self.model)
    }

    /// Drops the pending propagations of the engine, e.g. after a contradiction.
    pub fn flush(&mut self) {
        self.engine.flush(&mut *self.model)
    }
}
