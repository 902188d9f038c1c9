use log::warn;

use super::FreeVariableScan;
use crate::branching::SelectionContext;
use crate::branching::VariableSelector;
use crate::engine::VariableId;

/// A [`VariableSelector`] which selects a random variable which is not instantiated.
#[derive(Debug)]
pub struct RandomSelector {
    scan: FreeVariableScan,
}

impl RandomSelector {
    pub fn new(variables: &[VariableId]) -> Self {
        if variables.is_empty() {
            warn!("The RandomSelector variable selector was not provided with any variables");
        }
        RandomSelector {
            scan: FreeVariableScan::new(variables),
        }
    }
}

impl VariableSelector for RandomSelector {
    fn select_variable(&mut self, context: &mut SelectionContext) -> Option<VariableId> {
        let free = self.scan.free_variables(context.model_mut());
        if free.is_empty() {
            return None;
        }
        let index = context.random().generate_usize_in_range(0..free.len());
        Some(free[index])
    }
}
