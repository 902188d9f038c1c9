use thiserror::Error;

use crate::engine::propagation::PropagatorId;
use crate::engine::variables::VariableId;

/// Why a domain operation failed.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ReasonCode {
    #[error("removing the last value of the domain")]
    RemoveLastValue,
    #[error("the domain became empty")]
    EmptyDomain,
    #[error("the variable is already instantiated to another value")]
    AlreadyInstantiated,
    #[error("the value is not part of the domain")]
    UnknownValue,
    #[error("the new lower bound exceeds the new upper bound")]
    BoundOrderViolated,
}

/// What triggered a domain change.
///
/// A [`Cause::View`] marks a change a view forwarded to its source; the view itself is then not
/// notified again by its source.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Cause {
    #[default]
    Null,
    Propagator(PropagatorId),
    View(VariableId),
    Decision,
    Heuristic,
}

impl Cause {
    pub fn propagator(self) -> Option<PropagatorId> {
        match self {
            Cause::Propagator(propagator) => Some(propagator),
            _ => None,
        }
    }
}

/// The failure raised when an operation would wipe out a domain (or otherwise make the model
/// inconsistent).
///
/// The domain of the offending variable is left untouched when the contradiction is raised.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[error("contradiction on {variable:?} caused by {cause:?}: {reason}")]
pub struct Contradiction {
    pub cause: Cause,
    pub variable: Option<VariableId>,
    pub reason: ReasonCode,
}

impl Contradiction {
    pub fn new(cause: Cause, variable: Option<VariableId>, reason: ReasonCode) -> Self {
        Contradiction {
            cause,
            variable,
            reason,
        }
    }

    /// The propagator which raised the contradiction, if it was raised by one.
    pub fn propagator(&self) -> Option<PropagatorId> {
        self.cause.propagator()
    }
}
