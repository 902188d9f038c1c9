use log::warn;

use super::FreeVariableScan;
use crate::branching::tie_breaking::Direction;
use crate::branching::tie_breaking::InOrderTieBreaker;
use crate::branching::tie_breaking::TieBreaker;
use crate::branching::SelectionContext;
use crate::branching::VariableSelector;
use crate::engine::VariableId;
use crate::marrow_assert_eq_simple;

/// A [`VariableSelector`] which selects the variable with the largest domain.
///
/// Uses a [`TieBreaker`] to break ties, the default is the [`InOrderTieBreaker`] but it is
/// possible to construct the variable selector with a custom [`TieBreaker`] by using
/// the method [`AntiFirstFail::with_tie_breaker`].
pub struct AntiFirstFail<TieBreaking> {
    scan: FreeVariableScan,
    tie_breaker: TieBreaking,
}

impl<TieBreaking> std::fmt::Debug for AntiFirstFail<TieBreaking> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AntiFirstFail").finish()
    }
}

impl AntiFirstFail<InOrderTieBreaker<VariableId, u64>> {
    pub fn new(variables: &[VariableId]) -> Self {
        AntiFirstFail::with_tie_breaker(variables, InOrderTieBreaker::new(Direction::Maximum))
    }
}

impl<TieBreaking: TieBreaker<VariableId, u64>> AntiFirstFail<TieBreaking> {
    pub fn with_tie_breaker(variables: &[VariableId], tie_breaker: TieBreaking) -> Self {
        marrow_assert_eq_simple!(
            tie_breaker.get_direction(),
            Direction::Maximum,
            "The provided tie-breaker to AntiFirstFail attempts to find the Minimum value
             instead of the Maximum value, please ensure that you have passed the correct tie-breaker");
        if variables.is_empty() {
            warn!("The AntiFirstFail variable selector was not provided with any variables");
        }
        AntiFirstFail {
            scan: FreeVariableScan::new(variables),
            tie_breaker,
        }
    }
}

impl<TieBreaking: TieBreaker<VariableId, u64>> VariableSelector for AntiFirstFail<TieBreaking> {
    fn select_variable(&mut self, context: &mut SelectionContext) -> Option<VariableId> {
        for &variable in self.scan.free_variables(context.model_mut()) {
            self.tie_breaker
                .consider(variable, context.domain_size(variable));
        }
        self.tie_breaker.select(context.random())
    }
}
