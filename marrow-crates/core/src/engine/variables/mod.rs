mod propagator_registry;
mod variable;
mod variable_id;

pub(crate) use propagator_registry::PropagatorRegistry;
pub use propagator_registry::WokenPropagators;
pub(crate) use variable::Representation;
pub(crate) use variable::Variable;
pub use variable::VariableKind;
pub use variable_id::MonitorId;
pub use variable_id::VariableId;
