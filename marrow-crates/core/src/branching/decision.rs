use std::fmt::Display;

use crate::engine::Cause;
use crate::engine::Contradiction;
use crate::engine::EventListener;
use crate::engine::Model;
use crate::engine::VariableId;

/// How a [`Decision`] restricts the domain of its variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecisionOperator {
    /// `x = v`
    Assign,
    /// `x != v`
    Remove,
    /// `x <= v`
    SplitLower,
    /// `x >= v`
    SplitUpper,
}

impl DecisionOperator {
    /// The operator of the refutation of a decision with this operator.
    pub fn negation(self) -> DecisionOperator {
        match self {
            DecisionOperator::Assign => DecisionOperator::Remove,
            DecisionOperator::Remove => DecisionOperator::Assign,
            DecisionOperator::SplitLower => DecisionOperator::SplitUpper,
            DecisionOperator::SplitUpper => DecisionOperator::SplitLower,
        }
    }
}

impl Display for DecisionOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecisionOperator::Assign => write!(f, "="),
            DecisionOperator::Remove => write!(f, "!="),
            DecisionOperator::SplitLower => write!(f, "<="),
            DecisionOperator::SplitUpper => write!(f, ">="),
        }
    }
}

/// A branching decision on a single variable, e.g. `x = 3` or `x <= 4`.
///
/// A decision is applied on the way down and refuted (its negation is applied) once the left
/// branch has been refuted by search. Both are made with [`Cause::Decision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decision {
    pub variable: VariableId,
    pub operator: DecisionOperator,
    pub value: i32,
}

impl Decision {
    pub fn new(variable: VariableId, operator: DecisionOperator, value: i32) -> Self {
        Decision {
            variable,
            operator,
            value,
        }
    }

    pub fn assign(variable: VariableId, value: i32) -> Self {
        Decision::new(variable, DecisionOperator::Assign, value)
    }

    pub fn remove(variable: VariableId, value: i32) -> Self {
        Decision::new(variable, DecisionOperator::Remove, value)
    }

    pub fn split_lower(variable: VariableId, value: i32) -> Self {
        Decision::new(variable, DecisionOperator::SplitLower, value)
    }

    pub fn split_upper(variable: VariableId, value: i32) -> Self {
        Decision::new(variable, DecisionOperator::SplitUpper, value)
    }

    /// Restricts the domain of the variable according to the decision; returns whether the
    /// domain changed.
    pub fn apply(
        &self,
        model: &mut Model,
        listener: &mut (impl EventListener + ?Sized),
    ) -> Result<bool, Contradiction> {
        apply_operator(self.operator, self.variable, self.value, model, listener)
    }

    /// Applies the negation of the decision.
    pub fn refute(
        &self,
        model: &mut Model,
        listener: &mut (impl EventListener + ?Sized),
    ) -> Result<bool, Contradiction> {
        match self.operator {
            // The split decisions negate to the strict version of the opposite split.
            DecisionOperator::SplitLower => model.update_lower_bound(
                self.variable,
                self.value.saturating_add(1),
                Cause::Decision,
                listener,
            ),
            DecisionOperator::SplitUpper => model.update_upper_bound(
                self.variable,
                self.value.saturating_sub(1),
                Cause::Decision,
                listener,
            ),
            operator => apply_operator(
                operator.negation(),
                self.variable,
                self.value,
                model,
                listener,
            ),
        }
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.variable, self.operator, self.value)
    }
}

fn apply_operator(
    operator: DecisionOperator,
    variable: VariableId,
    value: i32,
    model: &mut Model,
    listener: &mut (impl EventListener + ?Sized),
) -> Result<bool, Contradiction> {
    match operator {
        DecisionOperator::Assign => model.instantiate_to(variable, value, Cause::Decision, listener),
        DecisionOperator::Remove => model.remove_value(variable, value, Cause::Decision, listener),
        DecisionOperator::SplitLower => {
            model.update_upper_bound(variable, value, Cause::Decision, listener)
        }
        DecisionOperator::SplitUpper => {
            model.update_lower_bound(variable, value, Cause::Decision, listener)
        }
    }
}
