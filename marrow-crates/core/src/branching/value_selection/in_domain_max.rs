use crate::branching::Decision;
use crate::branching::SelectionContext;
use crate::branching::ValueSelector;
use crate::engine::VariableId;

/// A [`ValueSelector`] which assigns the variable to its upper bound.
#[derive(Debug, Clone, Copy, Default)]
pub struct InDomainMax;

impl ValueSelector for InDomainMax {
    fn select_value(
        &mut self,
        context: &mut SelectionContext,
        decision_variable: VariableId,
    ) -> Decision {
        Decision::assign(decision_variable, context.upper_bound(decision_variable))
    }
}
