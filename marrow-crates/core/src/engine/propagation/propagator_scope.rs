use enumset::EnumSet;

use crate::engine::events::IntDomainEvent;
use crate::engine::variables::VariableId;

/// The variables a propagator watches, each with the condition under which it wakes the
/// propagator.
#[derive(Clone, Debug)]
pub(crate) struct PropagatorScope {
    pub(crate) variables: Vec<VariableId>,
    pub(crate) conditions: Vec<EnumSet<IntDomainEvent>>,
    pub(crate) removed: bool,
}
