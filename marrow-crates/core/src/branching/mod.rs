//! Contains the search strategies: which variable to branch on next and how.
//!
//! A [`Brancher`] produces the [`Decision`]s of the search. The usual way of creating one is to
//! combine a [`VariableSelector`] with a [`ValueSelector`] through an
//! [`IndependentVariableValueBrancher`](branchers::IndependentVariableValueBrancher), e.g.
//! ```rust
//! # use marrow_core::branching::branchers::IndependentVariableValueBrancher;
//! # use marrow_core::branching::value_selection::InDomainMin;
//! # use marrow_core::branching::variable_selection::FirstFail;
//! # use marrow_core::Model;
//! let mut model = Model::default();
//! let variables = vec![model.new_enumerated_var("x", 0, 10), model.new_bool_var("b")];
//!
//! let brancher =
//!     IndependentVariableValueBrancher::new(FirstFail::new(&variables), InDomainMin);
//! ```
//!
//! Heuristics which learn from the search (see [`weighted`] and [`branchers`]) are notified of
//! the [`SearchEvent`]s they subscribe to.
mod brancher;
pub mod branchers;
mod decision;
mod selection_context;
pub mod tie_breaking;
pub mod value_selection;
pub mod variable_selection;
pub mod weighted;

pub use brancher::Brancher;
pub use brancher::SearchEvent;
pub use decision::Decision;
pub use decision::DecisionOperator;
pub use selection_context::SelectionContext;
pub use value_selection::ValueSelector;
pub use variable_selection::VariableSelector;
