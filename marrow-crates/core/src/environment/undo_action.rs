use super::StoredDouble;
use super::StoredInt;

/// A deferred restore, applied when the world it was registered for is popped.
///
/// Restores are plain data so that they can be stored on the trail and replayed in reverse order
/// of registration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UndoAction {
    RestoreInt { cell: StoredInt, value: i64 },
    RestoreDouble { cell: StoredDouble, value: f64 },
    RestoreWord { word: usize, value: u64 },
    /// Subtracts `amount` from a restart-scoped weight, saturating at zero.
    RevokeWeight { cell: StoredDouble, amount: f64 },
}
