#[cfg(doc)]
use crate::branching::Brancher;
use crate::branching::SearchEvent;
use crate::branching::SelectionContext;
use crate::engine::Contradiction;
use crate::engine::VariableId;
use crate::statistics::StatisticLogger;

/// A trait containing the interface for [`VariableSelector`]s, specifying the appropriate hooks
/// into the search and the methods required for selecting variables.
///
/// The hooks mirror those of the [`Brancher`]; they are only called for the events returned by
/// [`VariableSelector::subscribe_to_events`].
pub trait VariableSelector {
    /// Prepares the selector before search starts; repeated calls have no additional effect.
    ///
    /// Returns `false` if the selector detected that the model is inconsistent.
    fn init(&mut self, _context: &mut SelectionContext) -> bool {
        true
    }

    /// Determines which variable to select next if there are any left to branch on.
    /// Should only return [`None`] when all variables which have been passed to the
    /// [`VariableSelector`] have been instantiated. Otherwise it should return the variable to
    /// branch on next.
    fn select_variable(&mut self, context: &mut SelectionContext) -> Option<VariableId>;

    /// Unsubscribes the selector from all events.
    fn remove(&mut self) {}

    fn log_statistics(&self, _statistic_logger: StatisticLogger) {}

    /// A function which is called when propagation raised `contradiction`, before backtracking.
    fn on_contradiction(&mut self, _context: &mut SelectionContext, _contradiction: &Contradiction) {
    }

    /// A function which is called after a restart.
    fn on_restart(&mut self, _context: &mut SelectionContext) {}

    /// Indicates which [`SearchEvent`]s are relevant for this particular [`VariableSelector`].
    fn subscribe_to_events(&self) -> Vec<SearchEvent> {
        vec![]
    }
}
