use std::borrow::Cow;

use crate::engine::contradiction::ReasonCode;
use crate::engine::domains::DomainOperation;
use crate::engine::variables::VariableId;
use crate::engine::Model;
use crate::marrow_assert_simple;
use crate::math::num_ext::NumExt;

/// A view `scale * source + offset` over another variable; it owns no storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct AffineView {
    pub(crate) source: VariableId,
    pub(crate) scale: i32,
    pub(crate) offset: i32,
}

/// What an operation on a view amounts to on its source.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ViewTranslation<'a> {
    Forward(DomainOperation<'a>),
    NoChange,
    Fails(ReasonCode),
}

fn saturate(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

impl AffineView {
    pub(crate) fn new(source: VariableId, scale: i32, offset: i32) -> AffineView {
        marrow_assert_simple!(scale != 0, "a view cannot have a scale of zero");
        AffineView {
            source,
            scale,
            offset,
        }
    }

    /// The view value of a source value.
    pub(crate) fn view_value(&self, source_value: i32) -> i32 {
        saturate(self.scale as i64 * source_value as i64 + self.offset as i64)
    }

    /// The source value of a view value, if the view value is reachable.
    pub(crate) fn source_value(&self, value: i32) -> Option<i32> {
        let shifted = value as i64 - self.offset as i64;
        let scale = self.scale as i64;
        (shifted % scale == 0).then(|| saturate(shifted / scale))
    }

    /// `(value - offset) / scale`, rounded up.
    fn source_ceil(&self, value: i32) -> i32 {
        saturate(<i64 as NumExt>::div_ceil(
            value as i64 - self.offset as i64,
            self.scale as i64,
        ))
    }

    fn source_floor(&self, value: i32) -> i32 {
        saturate(<i64 as NumExt>::div_floor(
            value as i64 - self.offset as i64,
            self.scale as i64,
        ))
    }

    /// The source values whose view values lie in `from..=to`.
    fn source_range(&self, from: i32, to: i32) -> (i32, i32) {
        if self.scale > 0 {
            (self.source_ceil(from), self.source_floor(to))
        } else {
            (self.source_ceil(to), self.source_floor(from))
        }
    }

    pub(crate) fn translate<'a>(
        &self,
        operation: &DomainOperation<'a>,
        view_instantiated: bool,
    ) -> ViewTranslation<'a> {
        use DomainOperation::*;

        match operation {
            RemoveValue(value) => self
                .source_value(*value)
                .map_or(ViewTranslation::NoChange, |value| {
                    ViewTranslation::Forward(RemoveValue(value))
                }),
            RemoveValues(values) => {
                let values = values
                    .iter()
                    .filter_map(|&value| self.source_value(value))
                    .collect::<Vec<_>>();
                if values.is_empty() {
                    ViewTranslation::NoChange
                } else {
                    ViewTranslation::Forward(RemoveValues(Cow::Owned(values)))
                }
            }
            RemoveInterval(from, to) => {
                let (from, to) = self.source_range(*from, *to);
                if from > to {
                    ViewTranslation::NoChange
                } else {
                    ViewTranslation::Forward(RemoveInterval(from, to))
                }
            }
            RemoveAllBut(values) => ViewTranslation::Forward(RemoveAllBut(Cow::Owned(
                values
                    .iter()
                    .filter_map(|&value| self.source_value(value))
                    .collect(),
            ))),
            InstantiateTo(value) => match self.source_value(*value) {
                Some(value) => ViewTranslation::Forward(InstantiateTo(value)),
                None if view_instantiated => {
                    ViewTranslation::Fails(ReasonCode::AlreadyInstantiated)
                }
                None => ViewTranslation::Fails(ReasonCode::UnknownValue),
            },
            UpdateLowerBound(value) => ViewTranslation::Forward(if self.scale > 0 {
                UpdateLowerBound(self.source_ceil(*value))
            } else {
                UpdateUpperBound(self.source_floor(*value))
            }),
            UpdateUpperBound(value) => ViewTranslation::Forward(if self.scale > 0 {
                UpdateUpperBound(self.source_floor(*value))
            } else {
                UpdateLowerBound(self.source_ceil(*value))
            }),
            UpdateBounds(lower_bound, upper_bound) => {
                if lower_bound > upper_bound {
                    return ViewTranslation::Fails(ReasonCode::BoundOrderViolated);
                }
                let (lower_bound, upper_bound) = self.source_range(*lower_bound, *upper_bound);
                if lower_bound > upper_bound {
                    ViewTranslation::Fails(ReasonCode::EmptyDomain)
                } else {
                    ViewTranslation::Forward(UpdateBounds(lower_bound, upper_bound))
                }
            }
        }
    }

    pub(crate) fn lower_bound(&self, model: &Model) -> i32 {
        if self.scale > 0 {
            self.view_value(model.lower_bound(self.source))
        } else {
            self.view_value(model.upper_bound(self.source))
        }
    }

    pub(crate) fn upper_bound(&self, model: &Model) -> i32 {
        if self.scale > 0 {
            self.view_value(model.upper_bound(self.source))
        } else {
            self.view_value(model.lower_bound(self.source))
        }
    }

    pub(crate) fn contains(&self, model: &Model, value: i32) -> bool {
        self.source_value(value)
            .is_some_and(|value| model.contains(self.source, value))
    }

    pub(crate) fn next_value(&self, model: &Model, value: i32) -> i32 {
        let next = if self.scale > 0 {
            model.next_value(self.source, self.source_floor(value))
        } else {
            model.previous_value(self.source, self.source_ceil(value))
        };
        if next == i32::MAX || next == i32::MIN {
            i32::MAX
        } else {
            self.view_value(next)
        }
    }

    pub(crate) fn previous_value(&self, model: &Model, value: i32) -> i32 {
        let previous = if self.scale > 0 {
            model.previous_value(self.source, self.source_ceil(value))
        } else {
            model.next_value(self.source, self.source_floor(value))
        };
        if previous == i32::MAX || previous == i32::MIN {
            i32::MIN
        } else {
            self.view_value(previous)
        }
    }

    pub(crate) fn next_value_out(&self, model: &Model, value: i32) -> i32 {
        match self.scale {
            1 => self.view_value(
                model.next_value_out(self.source, value.saturating_sub(self.offset)),
            ),
            -1 => self.view_value(
                model.previous_value_out(self.source, self.offset.saturating_sub(value)),
            ),
            // Consecutive values of the view are at least two apart.
            _ => {
                let next = value.saturating_add(1);
                if self.contains(model, next) {
                    next.saturating_add(1)
                } else {
                    next
                }
            }
        }
    }

    pub(crate) fn previous_value_out(&self, model: &Model, value: i32) -> i32 {
        match self.scale {
            1 => self.view_value(
                model.previous_value_out(self.source, value.saturating_sub(self.offset)),
            ),
            -1 => self.view_value(
                model.next_value_out(self.source, self.offset.saturating_sub(value)),
            ),
            _ => {
                let previous = value.saturating_sub(1);
                if self.contains(model, previous) {
                    previous.saturating_sub(1)
                } else {
                    previous
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_swap_under_a_negative_scale() {
        let view = AffineView::new(VariableId(0), -2, 1);

        assert_eq!(
            ViewTranslation::Forward(DomainOperation::UpdateUpperBound(-2)),
            view.translate(&DomainOperation::UpdateLowerBound(5), false)
        );
        assert_eq!(
            ViewTranslation::Forward(DomainOperation::UpdateLowerBound(-2)),
            view.translate(&DomainOperation::UpdateUpperBound(5), false)
        );
    }

    #[test]
    fn unreachable_values_are_not_forwarded() {
        let view = AffineView::new(VariableId(0), 3, 0);

        assert_eq!(
            ViewTranslation::NoChange,
            view.translate(&DomainOperation::RemoveValue(4), false)
        );
        assert_eq!(
            ViewTranslation::NoChange,
            view.translate(&DomainOperation::RemoveInterval(4, 5), false)
        );
        assert_eq!(
            ViewTranslation::Fails(ReasonCode::UnknownValue),
            view.translate(&DomainOperation::InstantiateTo(4), false)
        );
        assert_eq!(
            ViewTranslation::Forward(DomainOperation::RemoveInterval(2, 3)),
            view.translate(&DomainOperation::RemoveInterval(4, 9), false)
        );
    }

    #[test]
    fn bounds_between_two_view_values_empty_the_view() {
        let view = AffineView::new(VariableId(0), 2, 0);

        assert_eq!(
            ViewTranslation::Fails(ReasonCode::EmptyDomain),
            view.translate(&DomainOperation::UpdateBounds(3, 3), false)
        );
    }
}
