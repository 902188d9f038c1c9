use crate::branching::Decision;
use crate::branching::SelectionContext;
use crate::branching::ValueSelector;
use crate::engine::VariableId;

/// A [`ValueSelector`] which assigns the variable to a random value in its domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct InDomainRandom;

impl ValueSelector for InDomainRandom {
    fn select_value(
        &mut self,
        context: &mut SelectionContext,
        decision_variable: VariableId,
    ) -> Decision {
        let values_in_domain = (context.lower_bound(decision_variable)
            ..=context.upper_bound(decision_variable))
            .filter(|&value| context.contains(decision_variable, value))
            .collect::<Vec<_>>();
        let random_index = context
            .random()
            .generate_usize_in_range(0..values_in_domain.len());
        Decision::assign(decision_variable, values_in_domain[random_index])
    }
}
