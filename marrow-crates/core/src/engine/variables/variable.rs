use crate::engine::delta::DeltaRecorder;
use crate::engine::domains::IntDomain;
use crate::engine::domains::RealDomain;
use crate::engine::variables::MonitorId;
use crate::engine::variables::PropagatorRegistry;
use crate::engine::variables::VariableId;
use crate::engine::views::AffineView;
use crate::environment::StoredInt;

/// The kind of values a variable ranges over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Bool,
    Int,
    Real,
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum Representation {
    Domain(IntDomain),
    Real(RealDomain),
    View(AffineView),
}

/// Everything the model knows about one variable or view.
#[derive(Clone, Debug)]
pub(crate) struct Variable {
    pub(crate) name: String,
    pub(crate) kind: VariableKind,
    pub(crate) representation: Representation,
    pub(crate) propagators: PropagatorRegistry,
    /// The views whose source is this variable.
    pub(crate) views: Vec<VariableId>,
    pub(crate) monitors: Vec<MonitorId>,
    pub(crate) delta: Option<DeltaRecorder>,
    /// The world in which the variable became instantiated, or -1 while it is free.
    pub(crate) fixed_world: StoredInt,
    /// The value of the model's instantiation counter when the variable became instantiated.
    pub(crate) fixed_stamp: StoredInt,
}

impl Variable {
    pub(crate) fn view(&self) -> Option<AffineView> {
        match self.representation {
            Representation::View(view) => Some(view),
            _ => None,
        }
    }
}
