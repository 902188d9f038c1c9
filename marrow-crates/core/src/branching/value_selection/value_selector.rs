use crate::branching::Decision;
#[cfg(doc)]
use crate::branching::DecisionOperator;
use crate::branching::SelectionContext;
use crate::engine::VariableId;

/// A trait containing the interface for [`ValueSelector`]s, specifying the method required for
/// choosing how to branch on a given variable.
pub trait ValueSelector {
    /// Determines which value in the domain of `decision_variable` to branch next on.
    /// The domain of the `decision_variable` variable should have at least 2 values in it (as it
    /// otherwise should not have been selected as `decision_variable`). Returns the
    /// [`Decision`] to apply, usually with [`DecisionOperator::Assign`].
    fn select_value(
        &mut self,
        context: &mut SelectionContext,
        decision_variable: VariableId,
    ) -> Decision;
}
