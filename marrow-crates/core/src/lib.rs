//! The propagation-and-search core of a constraint programming engine.
//!
//! A [`Model`] owns the decision variables, their backtrackable domains and the registrations of
//! the propagators watching them. Every domain change is classified into an
//! [`IntEventType`](engine::events::IntEventType) and announced to an [`EventListener`] (usually
//! the propagation engine) so that only the interested propagators are scheduled. All state lives
//! in an [`Environment`](environment::Environment), which is rolled back when search backtracks.
//!
//! On top of the model, the [`branching`] module provides variable-selection heuristics, from
//! first-fail to heuristics learning from failures such as
//! [`DomWDeg`](branching::weighted::DomWDeg) or
//! [`ActivityBased`](branching::branchers::ActivityBased) search.
//!
//! # Example
//! ```rust
//! # use marrow_core::Cause;
//! # use marrow_core::Model;
//! # use marrow_core::NoPropagation;
//! let mut model = Model::default();
//! let x = model.new_enumerated_var("x", 0, 5);
//!
//! model.world_push();
//! let changed = model
//!     .update_lower_bound(x, 3, Cause::Decision, &mut NoPropagation)
//!     .expect("the domain is not emptied");
//! assert!(changed);
//! assert_eq!(3, model.lower_bound(x));
//!
//! model.world_pop();
//! assert_eq!(0, model.lower_bound(x));
//! ```
pub(crate) mod basic_types;
pub mod branching;
pub mod containers;
pub mod engine;
pub mod environment;
pub(crate) mod math;
#[doc(hidden)]
pub mod marrow_asserts;
pub mod statistics;

pub use convert_case;
pub use rand;

pub use crate::basic_types::Random;
pub use crate::engine::Cause;
pub use crate::engine::Contradiction;
pub use crate::engine::EventListener;
pub use crate::engine::Model;
pub use crate::engine::NoPropagation;
pub use crate::engine::PropagationEngine;
pub use crate::engine::PropagatorId;
pub use crate::engine::ReasonCode;
pub use crate::engine::VariableId;
pub use crate::engine::VariableKind;
