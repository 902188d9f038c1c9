use enum_map::Enum;

#[cfg(doc)]
use crate::basic_types::Random;
use crate::branching::Decision;
use crate::branching::SelectionContext;
#[cfg(doc)]
use crate::branching::ValueSelector;
#[cfg(doc)]
use crate::branching::VariableSelector;
#[cfg(doc)]
use crate::create_statistics_struct;
use crate::engine::Contradiction;
use crate::statistics::StatisticLogger;

/// A trait for defining a branching strategy (oftentimes utilising a [`VariableSelector`] and a
/// [`ValueSelector`]).
///
/// In general, implementations of this trait define how search proceeds. It is required that the
/// resulting decision creates a smaller domain for at least 1 of the variables.
///
/// The search driver calls a hook only for the [`SearchEvent`]s returned by
/// [`Brancher::subscribe_to_events`].
pub trait Brancher {
    /// Prepares the brancher before search starts, subscribing it to the events it needs. Calling
    /// this more than once has no additional effect on the subscription.
    ///
    /// Returns `false` if the brancher detected that the model is inconsistent.
    fn init(&mut self, _context: &mut SelectionContext) -> bool {
        true
    }

    /// Returns the next decision (or [`None`] if all variables under consideration are
    /// instantiated).
    ///
    /// Note that this method does not apply the decision; the [`SelectionContext`] is mutable to
    /// account for the usage of random generators (e.g. see [`Random`]) and stored counters.
    fn next_decision(&mut self, context: &mut SelectionContext) -> Option<Decision>;

    /// Unsubscribes the brancher from all events.
    fn remove(&mut self) {}

    /// Logs statistics of the brancher using the provided [`StatisticLogger`].
    ///
    /// It is recommended to create a struct through the [`create_statistics_struct!`] macro!
    fn log_statistics(&self, _statistic_logger: StatisticLogger) {}

    /// Called when propagation (or a decision) raised `contradiction`, before backtracking.
    ///
    /// To receive information about this event, use [`SearchEvent::Contradiction`] in
    /// [`Self::subscribe_to_events`]
    fn on_contradiction(&mut self, _context: &mut SelectionContext, _contradiction: &Contradiction) {
    }

    /// Called after a restart, once the search has returned to the root world.
    ///
    /// To receive information about this event, use [`SearchEvent::Restart`] in
    /// [`Self::subscribe_to_events`]
    fn on_restart(&mut self, _context: &mut SelectionContext) {}

    /// Called before a decision (`left`) or its refutation is applied.
    ///
    /// To receive information about this event, use [`SearchEvent::DownBranch`] in
    /// [`Self::subscribe_to_events`]
    fn before_down_branch(&mut self, _context: &mut SelectionContext, _left: bool) {}

    /// Called after a decision (`left`) or its refutation has been propagated, whether or not
    /// propagation failed, before any backtracking.
    ///
    /// To receive information about this event, use [`SearchEvent::DownBranch`] in
    /// [`Self::subscribe_to_events`]
    fn after_down_branch(&mut self, _context: &mut SelectionContext, _left: bool) {}

    /// Whether the brancher asks the driver to restart now.
    fn requests_restart(&self) -> bool {
        false
    }

    /// Indicates which [`SearchEvent`]s are relevant for this particular [`Brancher`].
    fn subscribe_to_events(&self) -> Vec<SearchEvent>;
}

/// The events of the search lifecycle a heuristic can subscribe to. Used for returning which
/// events are relevant in [`Brancher::subscribe_to_events`] and
/// [`VariableSelector::subscribe_to_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
pub enum SearchEvent {
    /// Event for when propagation raised a contradiction
    Contradiction,
    /// Event for when a restart occurs
    Restart,
    /// Event for when a decision (or its refutation) is applied
    DownBranch,
}
