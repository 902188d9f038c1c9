use crate::engine::variables::VariableId;
use crate::engine::Model;

/// A pausable iterator over the values of a variable, in either direction.
///
/// The iterator reads the live domain on every step, so values beyond the next one which are
/// removed while it is paused are skipped. It has to be re-initialised with
/// [`ValueIterator::bottom_up_init`] or [`ValueIterator::top_down_init`] before every traversal.
#[derive(Clone, Copy, Debug)]
pub struct ValueIterator {
    variable: VariableId,
    value: i32,
    bound: i32,
}

impl ValueIterator {
    pub fn new(variable: VariableId) -> ValueIterator {
        ValueIterator {
            variable,
            value: i32::MAX,
            bound: i32::MIN,
        }
    }

    pub fn bottom_up_init(&mut self, model: &Model) {
        self.value = model.lower_bound(self.variable);
        self.bound = model.upper_bound(self.variable);
    }

    pub fn has_next(&self) -> bool {
        self.value != i32::MAX && self.value <= self.bound
    }

    pub fn next(&mut self, model: &Model) -> i32 {
        let value = self.value;
        self.value = model.next_value(self.variable, value);
        value
    }

    pub fn top_down_init(&mut self, model: &Model) {
        self.value = model.upper_bound(self.variable);
        self.bound = model.lower_bound(self.variable);
    }

    pub fn has_previous(&self) -> bool {
        self.value != i32::MIN && self.value >= self.bound
    }

    pub fn previous(&mut self, model: &Model) -> i32 {
        let value = self.value;
        self.value = model.previous_value(self.variable, value);
        value
    }
}

/// A pausable iterator over the maximal ranges of consecutive values of a variable.
///
/// The current range is `min()..=max()`; like [`ValueIterator`] it has to be re-initialised
/// before every traversal.
#[derive(Clone, Copy, Debug)]
pub struct RangeIterator {
    variable: VariableId,
    from: i32,
    to: i32,
    bound: i32,
}

impl RangeIterator {
    pub fn new(variable: VariableId) -> RangeIterator {
        RangeIterator {
            variable,
            from: i32::MAX,
            to: i32::MAX,
            bound: i32::MIN,
        }
    }

    pub fn min(&self) -> i32 {
        self.from
    }

    pub fn max(&self) -> i32 {
        self.to
    }

    pub fn bottom_up_init(&mut self, model: &Model) {
        self.bound = model.upper_bound(self.variable);
        self.from = model.lower_bound(self.variable);
        self.to = model.next_value_out(self.variable, self.from) - 1;
    }

    pub fn has_next(&self) -> bool {
        self.from != i32::MAX && self.from <= self.bound
    }

    pub fn next(&mut self, model: &Model) {
        self.from = model.next_value(self.variable, self.to);
        if self.from != i32::MAX {
            self.to = model.next_value_out(self.variable, self.from) - 1;
        }
    }

    pub fn top_down_init(&mut self, model: &Model) {
        self.bound = model.lower_bound(self.variable);
        self.to = model.upper_bound(self.variable);
        self.from = model.previous_value_out(self.variable, self.to) + 1;
    }

    pub fn has_previous(&self) -> bool {
        self.to != i32::MIN && self.to >= self.bound
    }

    pub fn previous(&mut self, model: &Model) {
        self.to = model.previous_value(self.variable, self.from);
        if self.to != i32::MIN {
            self.from = model.previous_value_out(self.variable, self.to) + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Cause;
    use crate::engine::NoPropagation;

    fn model_with_holes() -> (Model, VariableId) {
        let mut model = Model::default();
        let x = model.new_enumerated_var_from_values("x", &[1, 2, 3, 6, 7, 9]);
        (model, x)
    }

    #[test]
    fn values_bottom_up_and_top_down() {
        let (model, x) = model_with_holes();
        let mut iterator = ValueIterator::new(x);

        let mut values = vec![];
        iterator.bottom_up_init(&model);
        while iterator.has_next() {
            values.push(iterator.next(&model));
        }
        assert_eq!(vec![1, 2, 3, 6, 7, 9], values);

        values.clear();
        iterator.top_down_init(&model);
        while iterator.has_previous() {
            values.push(iterator.previous(&model));
        }
        assert_eq!(vec![9, 7, 6, 3, 2, 1], values);
    }

    #[test]
    fn ranges_bottom_up_and_top_down() {
        let (model, x) = model_with_holes();
        let mut iterator = RangeIterator::new(x);

        let mut ranges = vec![];
        iterator.bottom_up_init(&model);
        while iterator.has_next() {
            ranges.push((iterator.min(), iterator.max()));
            iterator.next(&model);
        }
        assert_eq!(vec![(1, 3), (6, 7), (9, 9)], ranges);

        ranges.clear();
        iterator.top_down_init(&model);
        while iterator.has_previous() {
            ranges.push((iterator.min(), iterator.max()));
            iterator.previous(&model);
        }
        assert_eq!(vec![(9, 9), (6, 7), (1, 3)], ranges);
    }

    #[test]
    fn paused_iterators_skip_removed_values() {
        let (mut model, x) = model_with_holes();
        let mut iterator = ValueIterator::new(x);

        iterator.bottom_up_init(&model);
        assert_eq!(1, iterator.next(&model));
        let _ = model
            .remove_value(x, 3, Cause::Null, &mut NoPropagation)
            .expect("non-empty");

        assert_eq!(2, iterator.next(&model));
        assert_eq!(6, iterator.next(&model));
    }
}
