//! Provides the [`VariableSelector`] trait which is required for variable selectors to implement;
//! the main method in this trait is the [`VariableSelector::select_variable`] method.
//!
//! Selectors which compare the candidates ([`FirstFail`], [`Smallest`], ...) skip the
//! instantiated ones through a backtrackable scan, selectors which follow the input order keep a
//! backtrackable cursor instead. The learning selectors live in
//! [`weighted`](crate::branching::weighted).
mod anti_first_fail;
mod cyclic;
mod first_fail;
mod free_variable_scan;
mod input_order;
mod largest;
mod most_constrained;
mod random;
mod smallest;
mod variable_selector;

pub use anti_first_fail::*;
pub use cyclic::*;
pub use first_fail::*;
pub(crate) use free_variable_scan::FreeVariableScan;
pub(crate) use free_variable_scan::StoredCursor;
pub use input_order::*;
pub use largest::*;
pub use most_constrained::*;
pub use random::*;
pub use smallest::*;
pub use variable_selector::VariableSelector;
