//! Tie-breakers decide between the candidates of a selector which share the best value.
mod in_order_tie_breaker;
mod random_tie_breaker;
mod tie_breaker;

pub use in_order_tie_breaker::InOrderTieBreaker;
pub use random_tie_breaker::RandomTieBreaker;
pub use tie_breaker::Direction;
pub use tie_breaker::TieBreaker;
