use std::cmp::Ordering;

use log::warn;

use super::FreeVariableScan;
use crate::branching::tie_breaking::Direction;
use crate::branching::tie_breaking::InOrderTieBreaker;
use crate::branching::tie_breaking::TieBreaker;
#[cfg(doc)]
use crate::branching::variable_selection::FirstFail;
use crate::branching::SelectionContext;
use crate::branching::VariableSelector;
use crate::engine::VariableId;
use crate::marrow_assert_eq_simple;

/// A [`VariableSelector`] which selects the variable with the smallest domain (similar to
/// [`FirstFail`]).
///
/// It breaks ties according to the number of attached propagators (giving priority to the
/// variable with more attached propagators).
pub struct MostConstrained<TieBreaking> {
    scan: FreeVariableScan,
    tie_breaker: TieBreaking,
}

impl<TieBreaking> std::fmt::Debug for MostConstrained<TieBreaking> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MostConstrained").finish()
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct MostConstrainedValue {
    domain_size: u64,
    number_of_attached_propagators: usize,
}

impl PartialOrd for MostConstrainedValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.domain_size.cmp(&other.domain_size) {
            Ordering::Equal => Some(
                // Note that we are comparing `other` to `self` instead of the normal `self` to
                // `other`, this is because the tie-breaking is minimizing while we want to
                // tie-break in the maximizing direction.
                other
                    .number_of_attached_propagators
                    .cmp(&self.number_of_attached_propagators),
            ),
            ordering => Some(ordering),
        }
    }
}

impl MostConstrained<InOrderTieBreaker<VariableId, MostConstrainedValue>> {
    pub fn new(variables: &[VariableId]) -> Self {
        MostConstrained::with_tie_breaker(variables, InOrderTieBreaker::new(Direction::Minimum))
    }
}

impl<TieBreaking: TieBreaker<VariableId, MostConstrainedValue>> MostConstrained<TieBreaking> {
    pub fn with_tie_breaker(variables: &[VariableId], tie_breaker: TieBreaking) -> Self {
        marrow_assert_eq_simple!(tie_breaker.get_direction(), Direction::Minimum);
        if variables.is_empty() {
            warn!("The MostConstrained variable selector was not provided with any variables");
        }
        MostConstrained {
            scan: FreeVariableScan::new(variables),
            tie_breaker,
        }
    }
}

impl<TieBreaking> VariableSelector for MostConstrained<TieBreaking>
where
    TieBreaking: TieBreaker<VariableId, MostConstrainedValue>,
{
    fn select_variable(&mut self, context: &mut SelectionContext) -> Option<VariableId> {
        for &variable in self.scan.free_variables(context.model_mut()) {
            self.tie_breaker.consider(
                variable,
                MostConstrainedValue {
                    domain_size: context.domain_size(variable),
                    number_of_attached_propagators: context
                        .model()
                        .number_of_propagators(variable),
                },
            );
        }
        self.tie_breaker.select(context.random())
    }
}
