use log::warn;

use super::FreeVariableScan;
use crate::branching::tie_breaking::Direction;
use crate::branching::tie_breaking::InOrderTieBreaker;
use crate::branching::tie_breaking::TieBreaker;
use crate::branching::SelectionContext;
use crate::branching::VariableSelector;
use crate::engine::VariableId;
use crate::marrow_assert_eq_simple;

/// A [`VariableSelector`] which selects the variable with the smallest lower bound.
pub struct Smallest<TieBreaking> {
    scan: FreeVariableScan,
    tie_breaker: TieBreaking,
}

impl<TieBreaking> std::fmt::Debug for Smallest<TieBreaking> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Smallest").finish()
    }
}

impl Smallest<InOrderTieBreaker<VariableId, i32>> {
    pub fn new(variables: &[VariableId]) -> Self {
        Smallest::with_tie_breaker(variables, InOrderTieBreaker::new(Direction::Minimum))
    }
}

impl<TieBreaking: TieBreaker<VariableId, i32>> Smallest<TieBreaking> {
    pub fn with_tie_breaker(variables: &[VariableId], tie_breaker: TieBreaking) -> Self {
        marrow_assert_eq_simple!(tie_breaker.get_direction(), Direction::Minimum);
        if variables.is_empty() {
            warn!("The Smallest variable selector was not provided with any variables");
        }
        Smallest {
            scan: FreeVariableScan::new(variables),
            tie_breaker,
        }
    }
}

impl<TieBreaking: TieBreaker<VariableId, i32>> VariableSelector for Smallest<TieBreaking> {
    fn select_variable(&mut self, context: &mut SelectionContext) -> Option<VariableId> {
        for &variable in self.scan.free_variables(context.model_mut()) {
            self.tie_breaker
                .consider(variable, context.lower_bound(variable));
        }
        self.tie_breaker.select(context.random())
    }
}
