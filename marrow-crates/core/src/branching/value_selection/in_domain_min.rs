use crate::branching::Decision;
use crate::branching::SelectionContext;
use crate::branching::ValueSelector;
use crate::engine::VariableId;

/// A [`ValueSelector`] which assigns the variable to its lower bound.
#[derive(Debug, Clone, Copy, Default)]
pub struct InDomainMin;

impl ValueSelector for InDomainMin {
    fn select_value(
        &mut self,
        context: &mut SelectionContext,
        decision_variable: VariableId,
    ) -> Decision {
        Decision::assign(decision_variable, context.lower_bound(decision_variable))
    }
}
