//! The seam between the model and the (external) propagation engine.
mod event_listener;
mod propagator_id;
mod propagator_scope;

#[cfg(test)]
pub(crate) use event_listener::test_helper;
pub use event_listener::EventListener;
pub use event_listener::InferenceInsight;
pub use event_listener::InsightTouch;
pub use event_listener::NoPropagation;
pub use event_listener::PropagationEngine;
pub use event_listener::VariableUpdate;
pub use propagator_id::PropagatorId;
pub use propagator_id::PropagatorVarId;
pub(crate) use propagator_scope::PropagatorScope;
