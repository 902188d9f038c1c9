//! Backtrackable storage: versioned integer, double and bitset cells plus deferred restores, all
//! undone when the world in which they were written is popped.
mod store;
mod stored_cells;
mod undo_action;

pub use store::Environment;
pub use stored_cells::*;
pub use undo_action::UndoAction;
