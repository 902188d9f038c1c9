use crate::containers::HashMap;
use crate::engine::Model;
use crate::engine::VariableId;
use crate::environment::StoredDouble;
use crate::environment::UndoAction;

/// The learned weight of every variable, kept in the storage of the model.
///
/// Weights survive backtracking: they are written without trailing, and the only way for a
/// world pop to lower a weight is an explicit revocation scheduled through
/// [`VariableWeights::revoke_at`]. Cells are allocated the first time a variable is credited.
#[derive(Debug, Default, Clone)]
pub struct VariableWeights {
    cells: HashMap<VariableId, StoredDouble>,
}

impl VariableWeights {
    pub fn weight(&self, model: &Model, variable: VariableId) -> f64 {
        self.cells
            .get(&variable)
            .map_or(0.0, |&cell| model.environment().get_double(cell))
    }

    /// Adds `amount` to the weight of `variable` and returns the new weight.
    pub fn add(&mut self, model: &mut Model, variable: VariableId, amount: f64) -> f64 {
        let cell = self.cell(model, variable);
        model.environment_mut().add_double_untrailed(cell, amount)
    }

    /// Subtracts `amount` from the weight of `variable` once `world` is popped.
    pub fn revoke_at(&mut self, model: &mut Model, variable: VariableId, amount: f64, world: usize) {
        let cell = self.cell(model, variable);
        model
            .environment_mut()
            .save_at(UndoAction::RevokeWeight { cell, amount }, world);
    }

    /// Resets every weight to 0.
    pub fn clear(&mut self, model: &mut Model) {
        for &cell in self.cells.values() {
            model.environment_mut().set_double_untrailed(cell, 0.0);
        }
    }

    /// The (at most) `k` variables with the largest positive weight, heaviest first.
    pub fn top(&self, model: &Model, k: usize) -> Vec<VariableId> {
        let mut weighted = self
            .cells
            .iter()
            .map(|(&variable, &cell)| (variable, model.environment().get_double(cell)))
            .filter(|&(_, weight)| weight > 0.0)
            .collect::<Vec<_>>();
        weighted.sort_by(|(lhs, lhs_weight), (rhs, rhs_weight)| {
            rhs_weight.total_cmp(lhs_weight).then(lhs.cmp(rhs))
        });
        weighted
            .into_iter()
            .take(k)
            .map(|(variable, _)| variable)
            .collect()
    }

    fn cell(&mut self, model: &mut Model, variable: VariableId) -> StoredDouble {
        *self
            .cells
            .entry(variable)
            .or_insert_with(|| model.environment_mut().make_double(0.0))
    }
}
