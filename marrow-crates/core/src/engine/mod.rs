//! The propagation core: variables and their domains, the events raised when domains change and
//! the notification of the propagation engine.
mod contradiction;
pub(crate) mod delta;
pub(crate) mod domains;
pub mod events;
mod model;
pub(crate) mod propagation;
pub(crate) mod variables;
pub(crate) mod views;

pub use contradiction::Cause;
pub use contradiction::Contradiction;
pub use contradiction::ReasonCode;
pub use delta::DeltaMonitor;
pub use domains::RangeIterator;
pub use domains::ValueIterator;
pub use model::Model;
pub use propagation::EventListener;
pub use propagation::InferenceInsight;
pub use propagation::InsightTouch;
pub use propagation::NoPropagation;
pub use propagation::PropagationEngine;
pub use propagation::PropagatorId;
pub use propagation::PropagatorVarId;
pub use propagation::VariableUpdate;
pub use variables::MonitorId;
pub use variables::VariableId;
pub use variables::VariableKind;
pub use variables::WokenPropagators;
