use log::warn;

use super::FreeVariableScan;
use crate::branching::tie_breaking::Direction;
use crate::branching::tie_breaking::InOrderTieBreaker;
use crate::branching::tie_breaking::TieBreaker;
use crate::branching::SelectionContext;
use crate::branching::VariableSelector;
use crate::engine::VariableId;
use crate::marrow_assert_eq_simple;

/// A [`VariableSelector`] which selects the variable with the largest upper bound.
pub struct Largest<TieBreaking> {
    scan: FreeVariableScan,
    tie_breaker: TieBreaking,
}

impl<TieBreaking> std::fmt::Debug for Largest<TieBreaking> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Largest").finish()
    }
}

impl Largest<InOrderTieBreaker<VariableId, i32>> {
    pub fn new(variables: &[VariableId]) -> Self {
        Largest::with_tie_breaker(variables, InOrderTieBreaker::new(Direction::Maximum))
    }
}

impl<TieBreaking: TieBreaker<VariableId, i32>> Largest<TieBreaking> {
    pub fn with_tie_breaker(variables: &[VariableId], tie_breaker: TieBreaking) -> Self {
        marrow_assert_eq_simple!(tie_breaker.get_direction(), Direction::Maximum);
        if variables.is_empty() {
            warn!("The Largest variable selector was not provided with any variables");
        }
        Largest {
            scan: FreeVariableScan::new(variables),
            tie_breaker,
        }
    }
}

impl<TieBreaking: TieBreaker<VariableId, i32>> VariableSelector for Largest<TieBreaking> {
    fn select_variable(&mut self, context: &mut SelectionContext) -> Option<VariableId> {
        for &variable in self.scan.free_variables(context.model_mut()) {
            self.tie_breaker
                .consider(variable, context.upper_bound(variable));
        }
        self.tie_breaker.select(context.random())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::tests::TestRandom;
    use crate::engine::Cause;
    use crate::engine::Model;
    use crate::engine::NoPropagation;

    #[test]
    fn the_largest_upper_bound_is_selected() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 10);
        let y = model.new_enumerated_var("y", 5, 20);
        let mut strategy = Largest::new(&[x, y]);

        let mut engine = NoPropagation;
        let mut rng = TestRandom::default();
        let mut context = SelectionContext::new(&mut model, &mut engine, &mut rng);
        assert_eq!(Some(y), strategy.select_variable(&mut context));

        let _ = context
            .model_mut()
            .update_upper_bound(y, 8, Cause::Decision, &mut NoPropagation)
            .expect("non-empty");
        assert_eq!(Some(x), strategy.select_variable(&mut context));
    }
}
