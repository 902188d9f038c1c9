use super::Direction;
use super::TieBreaker;
use crate::basic_types::Random;

/// A tie-breaker which simply selects the first variable that it receives with the "best" value
/// according to the provided [`Direction`].
///
/// For example, if the provided direction is [`Direction::Minimum`] and there are two variables
/// `x1` with value 5 and `x2` with value 5, if the tie-breaker first receives `x2` and then `x1`
/// then it will return `x2` because it was the first variable with the minimum value (of 5 in this
/// example) which was provided.
#[derive(Debug)]
pub struct InOrderTieBreaker<Var, Value> {
    /// The selected variable and its value, [`None`] if no variable has been considered yet
    selected: Option<(Var, Value)>,
    direction: Direction,
}

impl<Var, Value> InOrderTieBreaker<Var, Value> {
    pub fn new(direction: Direction) -> Self {
        Self {
            selected: None,
            direction,
        }
    }
}

impl<Var: Copy, Value: PartialOrd> TieBreaker<Var, Value> for InOrderTieBreaker<Var, Value> {
    fn consider(&mut self, variable: Var, value: Value) {
        let is_better = match &self.selected {
            Some((_, selected_value)) => self.direction.improves(&value, selected_value),
            None => true,
        };
        if is_better {
            self.selected = Some((variable, value));
        }
    }

    fn select(&mut self, _random: &mut dyn Random) -> Option<Var> {
        self.selected.take().map(|(variable, _)| variable)
    }

    fn get_direction(&self) -> Direction {
        self.direction
    }
}
