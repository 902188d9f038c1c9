use crate::engine::Model;
use crate::engine::VariableId;
use crate::environment::StoredInt;

/// The candidates of a selector, partitioned into the possibly free ones and the ones known to be
/// instantiated.
///
/// Every scan swaps the instantiated candidates it meets behind the last free index, which is kept
/// in backtrackable storage: later scans in the same branch skip them, and backtracking makes them
/// candidates again. Swaps only happen within the free prefix, so restoring the index restores
/// exactly the set of candidates it held.
#[derive(Debug, Clone)]
pub(crate) struct FreeVariableScan {
    variables: Vec<VariableId>,
    /// Allocated on the first scan.
    last_free: Option<StoredInt>,
}

impl FreeVariableScan {
    pub(crate) fn new(variables: &[VariableId]) -> Self {
        FreeVariableScan {
            variables: variables.to_vec(),
            last_free: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.variables.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// All candidates, in their current order.
    pub(crate) fn variables(&self) -> &[VariableId] {
        &self.variables
    }

    /// Returns the candidates which are not instantiated.
    pub(crate) fn free_variables(&mut self, model: &mut Model) -> &[VariableId] {
        let num_variables = self.variables.len() as i64;
        let cell = *self
            .last_free
            .get_or_insert_with(|| model.environment_mut().make_int(num_variables));

        let mut last_free = model.environment().get_int(cell) as usize;
        let mut index = 0;
        while index < last_free {
            if model.is_instantiated(self.variables[index]) {
                last_free -= 1;
                self.variables.swap(index, last_free);
            } else {
                index += 1;
            }
        }
        model.environment_mut().set_int(cell, last_free as i64);

        &self.variables[..last_free]
    }
}

/// A position in a list of candidates which is restored on backtracking.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct StoredCursor {
    cell: Option<StoredInt>,
}

impl StoredCursor {
    pub(crate) fn get(&mut self, model: &mut Model) -> usize {
        let cell = self.cell(model);
        model.environment().get_int(cell) as usize
    }

    pub(crate) fn set(&mut self, model: &mut Model, position: usize) {
        let cell = self.cell(model);
        model.environment_mut().set_int(cell, position as i64);
    }

    fn cell(&mut self, model: &mut Model) -> StoredInt {
        *self
            .cell
            .get_or_insert_with(|| model.environment_mut().make_int(0))
    }
}
