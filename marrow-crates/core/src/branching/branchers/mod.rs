//! Implementations of [`Brancher`](crate::branching::Brancher).
//!
//! [`IndependentVariableValueBrancher`] combines a variable and a value selector; the
//! activity- and impact-based heuristics choose both at once and therefore implement the trait
//! directly.
mod activity_based;
mod impact_based;
mod independent_variable_value_brancher;

pub use activity_based::*;
pub use impact_based::*;
pub use independent_variable_value_brancher::*;
