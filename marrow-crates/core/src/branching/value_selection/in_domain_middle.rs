use crate::branching::Decision;
use crate::branching::SelectionContext;
use crate::branching::ValueSelector;
use crate::engine::VariableId;

/// A [`ValueSelector`] which assigns the variable to the value in its domain closest to the
/// middle of its bounds; ties are broken towards the lower value.
#[derive(Debug, Clone, Copy, Default)]
pub struct InDomainMiddle;

impl ValueSelector for InDomainMiddle {
    fn select_value(
        &mut self,
        context: &mut SelectionContext,
        decision_variable: VariableId,
    ) -> Decision {
        let lower_bound = context.lower_bound(decision_variable) as i64;
        let upper_bound = context.upper_bound(decision_variable) as i64;
        let middle = ((lower_bound + upper_bound).div_euclid(2)) as i32;

        if context.contains(decision_variable, middle) {
            return Decision::assign(decision_variable, middle);
        }

        let below = context.model().previous_value(decision_variable, middle);
        let above = context.model().next_value(decision_variable, middle);
        let value = if (middle as i64 - below as i64) <= (above as i64 - middle as i64) {
            below
        } else {
            above
        };
        Decision::assign(decision_variable, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::tests::TestRandom;
    use crate::engine::Model;
    use crate::engine::NoPropagation;

    #[test]
    fn the_middle_value_is_selected() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 10);

        let mut engine = NoPropagation;
        let mut rng = TestRandom::default();
        let mut context = SelectionContext::new(&mut model, &mut engine, &mut rng);

        assert_eq!(
            Decision::assign(x, 5),
            InDomainMiddle.select_value(&mut context, x)
        );
    }

    #[test]
    fn the_closest_value_to_a_missing_middle_is_selected() {
        let mut model = Model::default();
        let x = model.new_enumerated_var_from_values("x", &[0, 3, 8, 10]);
        let y = model.new_enumerated_var_from_values("y", &[0, 4, 7, 10]);

        let mut engine = NoPropagation;
        let mut rng = TestRandom::default();
        let mut context = SelectionContext::new(&mut model, &mut engine, &mut rng);

        assert_eq!(
            Decision::assign(x, 3),
            InDomainMiddle.select_value(&mut context, x)
        );
        assert_eq!(
            Decision::assign(y, 4),
            InDomainMiddle.select_value(&mut context, y)
        );
    }
}
