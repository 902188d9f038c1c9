use log::warn;

use super::StoredCursor;
use crate::branching::SelectionContext;
use crate::branching::VariableSelector;
use crate::engine::VariableId;

/// A [`VariableSelector`] which goes round the provided list: it selects the first variable which
/// is not instantiated, starting after the previously selected one.
#[derive(Debug)]
pub struct Cyclic {
    variables: Vec<VariableId>,
    next: StoredCursor,
}

impl Cyclic {
    pub fn new(variables: &[VariableId]) -> Self {
        if variables.is_empty() {
            warn!("The Cyclic variable selector was not provided with any variables");
        }
        Cyclic {
            variables: variables.to_vec(),
            next: StoredCursor::default(),
        }
    }
}

impl VariableSelector for Cyclic {
    fn select_variable(&mut self, context: &mut SelectionContext) -> Option<VariableId> {
        let num_variables = self.variables.len();
        let start = self.next.get(context.model_mut());
        let position = (0..num_variables)
            .map(|offset| (start + offset) % num_variables)
            .find(|&position| !context.is_instantiated(self.variables[position]))?;
        self.next.set(context.model_mut(), (position + 1) % num_variables);
        Some(self.variables[position])
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
    fn selection_wraps_around() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 10);
        let y = model.new_enumerated_var("y", 0, 10);
        let z = model.new_enumerated_var("z", 0, 10);
        let mut strategy = Cyclic::new(&[x, y, z]);

        let mut engine = NoPropagation;
        let mut rng = TestRandom::default();
        let mut context = SelectionContext::new(&mut model, &mut engine, &mut rng);

        assert_eq!(Some(x), strategy.select_variable(&mut context));
        assert_eq!(Some(y), strategy.select_variable(&mut context));

        let _ = context
            .model_mut()
            .instantiate_to(z, 3, Cause::Decision, &mut NoPropagation)
            .expect("non-empty");
        assert_eq!(Some(x), strategy.select_variable(&mut context));
    }
}
