use crate::engine::contradiction::Cause;
use crate::engine::propagation::PropagatorId;
use crate::engine::variables::VariableId;
use crate::engine::Model;
use crate::environment::StoredInt;

/// A propagator's reading position in the removal ledger of a variable.
///
/// The readable window is fixed by [`DeltaMonitor::freeze`] and consumed by
/// [`DeltaMonitor::unfreeze`]; since the position is stored in the environment, backtracking
/// past an `unfreeze` makes the removals readable again.
///
/// A monitor created for a view reports the removed values of the view.
#[derive(Clone, Copy, Debug)]
pub struct DeltaMonitor {
    root: VariableId,
    owner: Option<PropagatorId>,
    cursor: StoredInt,
    frozen_end: usize,
    scale: i32,
    offset: i32,
}

impl DeltaMonitor {
    pub(crate) fn new(
        root: VariableId,
        owner: Option<PropagatorId>,
        cursor: StoredInt,
        frozen_end: usize,
        scale: i32,
        offset: i32,
    ) -> DeltaMonitor {
        DeltaMonitor {
            root,
            owner,
            cursor,
            frozen_end,
            scale,
            offset,
        }
    }

    pub fn freeze(&mut self, model: &Model) {
        self.frozen_end = model
            .delta_of(self.root)
            .map_or(0, |delta| delta.len(model.environment()));
    }

    pub fn unfreeze(&self, model: &mut Model) {
        let cursor = self.cursor;
        model
            .environment_mut()
            .set_int(cursor, self.frozen_end as i64);
    }

    /// Calls `action` with every value removed within the frozen window.
    pub fn for_each_value(&self, model: &Model, mut action: impl FnMut(i32)) {
        self.for_each_entry(model, |lower, upper| {
            for value in lower..=upper {
                action(self.view_value(value));
            }
        });
    }

    /// Calls `action` with every range `(min, max)` removed within the frozen window.
    ///
    /// Through a view with a scale other than 1 or -1 the removed values are not consecutive,
    /// and every value is reported as a range of its own.
    pub fn for_each_range(&self, model: &Model, mut action: impl FnMut(i32, i32)) {
        self.for_each_entry(model, |lower, upper| {
            if self.scale.abs() == 1 {
                let from = self.view_value(lower);
                let to = self.view_value(upper);
                action(from.min(to), from.max(to));
            } else {
                for value in lower..=upper {
                    let value = self.view_value(value);
                    action(value, value);
                }
            }
        });
    }

    fn for_each_entry(&self, model: &Model, mut action: impl FnMut(i32, i32)) {
        let Some(delta) = model.delta_of(self.root) else {
            return;
        };
        let start = model.environment().get_int(self.cursor) as usize;
        let end = self.frozen_end.min(delta.len(model.environment()));

        for index in start..end {
            let (lower, upper, cause) = delta.entry(index);
            if self
                .owner
                .is_some_and(|owner| cause == Cause::Propagator(owner))
            {
                continue;
            }
            action(lower, upper);
        }
    }

    fn view_value(&self, value: i32) -> i32 {
        self.scale * value + self.offset
    }
}
