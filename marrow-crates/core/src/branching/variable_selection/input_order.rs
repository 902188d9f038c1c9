use log::warn;

use super::StoredCursor;
use crate::branching::SelectionContext;
use crate::branching::VariableSelector;
use crate::engine::VariableId;

/// A [`VariableSelector`] which selects the first variable which is not instantiated given the
/// order in the provided list.
///
/// The variables before the stored cursor are known to be instantiated in the current branch.
#[derive(Debug)]
pub struct InputOrder {
    variables: Vec<VariableId>,
    first_free: StoredCursor,
}

impl InputOrder {
    pub fn new(variables: &[VariableId]) -> Self {
        if variables.is_empty() {
            warn!("The InputOrder variable selector was not provided with any variables");
        }
        InputOrder {
            variables: variables.to_vec(),
            first_free: StoredCursor::default(),
        }
    }
}

impl VariableSelector for InputOrder {
    fn select_variable(&mut self, context: &mut SelectionContext) -> Option<VariableId> {
        let start = self.first_free.get(context.model_mut());
        let position = (start..self.variables.len())
            .find(|&position| !context.is_instantiated(self.variables[position]))?;
        self.first_free.set(context.model_mut(), position);
        Some(self.variables[position])
    }
}
