use log::warn;

use super::FreeVariableScan;
use crate::branching::tie_breaking::Direction;
use crate::branching::tie_breaking::InOrderTieBreaker;
use crate::branching::tie_breaking::TieBreaker;
use crate::branching::SelectionContext;
use crate::branching::VariableSelector;
use crate::engine::VariableId;
use crate::marrow_assert_eq_simple;

/// A [`VariableSelector`] which selects the variable with the smallest domain.
///
/// Uses a [`TieBreaker`] to break ties, the default is the [`InOrderTieBreaker`] but it is
/// possible to construct the variable selector with a custom [`TieBreaker`] by using
/// the method [`FirstFail::with_tie_breaker`].
pub struct FirstFail<TieBreaking> {
    scan: FreeVariableScan,
    tie_breaker: TieBreaking,
}

impl<TieBreaking> std::fmt::Debug for FirstFail<TieBreaking> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirstFail").finish()
    }
}

impl FirstFail<InOrderTieBreaker<VariableId, u64>> {
    pub fn new(variables: &[VariableId]) -> Self {
        FirstFail::with_tie_breaker(variables, InOrderTieBreaker::new(Direction::Minimum))
    }
}

impl<TieBreaking: TieBreaker<VariableId, u64>> FirstFail<TieBreaking> {
    pub fn with_tie_breaker(variables: &[VariableId], tie_breaker: TieBreaking) -> Self {
        marrow_assert_eq_simple!(
            tie_breaker.get_direction(),
            Direction::Minimum,
            "The provided tie-breaker to FirstFail attempts to find the Maximum value
             instead of the Minimum value, please ensure that you have passed the correct tie-breaker");
        if variables.is_empty() {
            warn!("The FirstFail variable selector was not provided with any variables");
        }
        FirstFail {
            scan: FreeVariableScan::new(variables),
            tie_breaker,
        }
    }
}

impl<TieBreaking: TieBreaker<VariableId, u64>> VariableSelector for FirstFail<TieBreaking> {
    fn select_variable(&mut self, context: &mut SelectionContext) -> Option<VariableId> {
        for &variable in self.scan.free_variables(context.model_mut()) {
            self.tie_breaker
                .consider(variable, context.domain_size(variable));
        }
        self.tie_breaker.select(context.random())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::tests::TestRandom;
    use crate::engine::Model;
    use crate::engine::NoPropagation;

    #[test]
    fn the_smallest_domain_is_selected() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 10);
        let y = model.new_enumerated_var_from_values("y", &[1, 5, 9]);
        let z = model.new_constant(3);
        let mut strategy = FirstFail::new(&[x, y, z]);

        let mut engine = NoPropagation;
        let mut rng = TestRandom::default();
        let mut context = SelectionContext::new(&mut model, &mut engine, &mut rng);

        assert_eq!(Some(y), strategy.select_variable(&mut context));
    }

    #[test]
    fn no_variable_is_selected_when_all_are_instantiated() {
        let mut model = Model::default();
        let x = model.new_constant(1);
        let y = model.new_constant(2);
        let mut strategy = FirstFail::new(&[x, y]);

        let mut engine = NoPropagation;
        let mut rng = TestRandom::default();
        let mut context = SelectionContext::new(&mut model, &mut engine, &mut rng);

        assert_eq!(None, strategy.select_variable(&mut context));
    }
}
