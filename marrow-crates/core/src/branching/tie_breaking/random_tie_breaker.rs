use super::Direction;
use super::TieBreaker;
use crate::basic_types::Random;

/// A tie breaker which selects the variable with the "best" value (according to the
/// [`Direction`]); if there is a tie then it selects any of the variables part of this tie with
/// equal probability.
#[derive(Debug)]
pub struct RandomTieBreaker<Var, Value> {
    /// The variables sharing the best value seen so far
    candidates: Vec<Var>,
    best_value: Option<Value>,
    direction: Direction,
}

impl<Var, Value> RandomTieBreaker<Var, Value> {
    pub fn new(direction: Direction) -> Self {
        Self {
            candidates: vec![],
            best_value: None,
            direction,
        }
    }
}

impl<Var: Copy, Value: PartialOrd> TieBreaker<Var, Value> for RandomTieBreaker<Var, Value> {
    fn consider(&mut self, variable: Var, value: Value) {
        let (is_better, is_tie) = match &self.best_value {
            Some(best_value) => (
                self.direction.improves(&value, best_value),
                value == *best_value,
            ),
            None => (true, false),
        };
        if is_better {
            self.candidates.clear();
            self.candidates.push(variable);
            self.best_value = Some(value);
        } else if is_tie {
            self.candidates.push(variable);
        }
    }

    fn select(&mut self, random: &mut dyn Random) -> Option<Var> {
        let selected = match self.candidates.len() {
            0 => None,
            1 => Some(self.candidates[0]),
            len => Some(self.candidates[random.generate_usize_in_range(0..len)]),
        };
        self.candidates.clear();
        self.best_value = None;
        selected
    }

    fn get_direction(&self) -> Direction {
        self.direction
    }
}
