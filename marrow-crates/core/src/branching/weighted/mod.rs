//! Variable selectors which learn from the contradictions met during search.
//!
//! All of them are a [`WeightedSearch`] parameterised by a [`Criterion`], which defines how a
//! contradiction is credited and how a free variable is scored:
//! - [`DomWDeg`]: every variable of the failing propagator gains 1 (with the increment revoked on
//!   backtracking when it is not relevant to the failure).
//! - [`DomWDegRef`]: the refined variant crediting `1 / (arity × size)`.
//! - [`ConflictHistory`]: a moving average of how recently each propagator failed.
//! - [`PickOnDom`] and [`PickOnFil`]: credits following the filtering reported by the engine.
//!
//! The shared bookkeeping (the free candidates and, per propagator, the pair of variables which
//! witnesses that it still has two free variables) lives in [`CriterionCore`].
mod conflict_history;
mod criterion;
mod dom_wdeg;
mod dom_wdeg_ref;
mod pick_on;
mod variable_weights;
mod watched_pairs;
mod weight_flush;

pub use conflict_history::*;
pub use criterion::*;
pub use dom_wdeg::*;
pub use dom_wdeg_ref::*;
pub use pick_on::*;
pub use variable_weights::VariableWeights;
pub use watched_pairs::WatchedPair;
pub use watched_pairs::WatchedPairs;
pub use weight_flush::WeightFlush;
pub(crate) use weight_flush::FlushTracker;

use crate::create_statistics_struct;
use crate::engine::Model;
use crate::engine::VariableId;
use crate::engine::VariableKind;

create_statistics_struct!(
    /// Statistics shared by the weighted variable selectors.
    WeightedSearchStatistics {
        /// The number of contradictions which have been reported
        contradictions: u64,
        /// The number of contradictions credited to a propagator
        attributed_contradictions: u64,
        /// The number of increments which were scheduled to be revoked on backtracking
        revoked_increments: u64,
        /// The number of times the learned weights have been cleared
        weight_flushes: u64,
});

/// Whether `variable` can carry a weight; constants and real variables never do.
pub(crate) fn is_weighted(model: &Model, variable: VariableId) -> bool {
    model.kind(variable) != VariableKind::Real && !model.is_constant(variable)
}
