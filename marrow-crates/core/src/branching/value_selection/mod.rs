//! Provides the [`ValueSelector`] trait which is required for value selectors to implement; the
//! main method in this trait is the [`ValueSelector::select_value`] method.
mod in_domain_max;
mod in_domain_middle;
mod in_domain_min;
mod in_domain_random;
mod value_selector;

pub use in_domain_max::*;
pub use in_domain_middle::*;
pub use in_domain_min::*;
pub use in_domain_random::*;
pub use value_selector::ValueSelector;
