//! A [`Brancher`] which simply uses a single [`VariableSelector`] and a single
//! [`ValueSelector`].
use crate::branching::Brancher;
use crate::branching::Decision;
use crate::branching::SearchEvent;
use crate::branching::SelectionContext;
use crate::branching::ValueSelector;
use crate::branching::VariableSelector;
use crate::engine::Contradiction;
use crate::statistics::StatisticLogger;

/// An implementation of a [`Brancher`] which simply uses a single [`VariableSelector`] and a
/// single [`ValueSelector`] independently of one another.
#[derive(Debug)]
pub struct IndependentVariableValueBrancher<VariableSelect, ValueSelect> {
    /// The [`VariableSelector`] of the [`Brancher`], determines which (free) variable to branch
    /// next on.
    pub(crate) variable_selector: VariableSelect,
    /// The [`ValueSelector`] of the [`Brancher`] determines how to branch on the selected
    /// variable.
    pub(crate) value_selector: ValueSelect,
}

impl<VariableSelect, ValueSelect> IndependentVariableValueBrancher<VariableSelect, ValueSelect>
where
    VariableSelect: VariableSelector,
    ValueSelect: ValueSelector,
{
    pub fn new(var_selector: VariableSelect, val_selector: ValueSelect) -> Self {
        IndependentVariableValueBrancher {
            variable_selector: var_selector,
            value_selector: val_selector,
        }
    }
}

impl<VariableSelect, ValueSelect> Brancher
    for IndependentVariableValueBrancher<VariableSelect, ValueSelect>
where
    VariableSelect: VariableSelector,
    ValueSelect: ValueSelector,
{
    fn init(&mut self, context: &mut SelectionContext) -> bool {
        self.variable_selector.init(context)
    }

    /// First we select a variable
    ///  - If all variables under consideration are instantiated (i.e. `select_variable` returns
    ///    None) then we simply return None
    ///  - Otherwise we select a value and return the corresponding decision
    fn next_decision(&mut self, context: &mut SelectionContext) -> Option<Decision> {
        self.variable_selector
            .select_variable(context)
            .map(|selected_variable| self.value_selector.select_value(context, selected_variable))
    }

    fn remove(&mut self) {
        self.variable_selector.remove()
    }

    fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.variable_selector.log_statistics(statistic_logger)
    }

    fn on_contradiction(&mut self, context: &mut SelectionContext, contradiction: &Contradiction) {
        self.variable_selector
            .on_contradiction(context, contradiction)
    }

    fn on_restart(&mut self, context: &mut SelectionContext) {
        self.variable_selector.on_restart(context)
    }

    fn subscribe_to_events(&self) -> Vec<SearchEvent> {
        self.variable_selector.subscribe_to_events()
    }
}
