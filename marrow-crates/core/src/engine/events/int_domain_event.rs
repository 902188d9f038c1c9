use enumset::EnumSet;
use enumset::EnumSetType;

/// The kinds of change a propagator can ask to be woken for on one of its variables.
///
/// A propagation condition is an [`EnumSet`] of these; see [`DomainEvents`] for the common ones.
#[derive(Debug, EnumSetType, Hash)]
pub enum IntDomainEvent {
    /// The variable became instantiated.
    Assign,
    /// The lower bound increased.
    LowerBound,
    /// The upper bound decreased.
    UpperBound,
    /// Any value was removed.
    Removal,
}

impl std::fmt::Display for IntDomainEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntDomainEvent::Assign => write!(f, "Assign"),
            IntDomainEvent::LowerBound => write!(f, "LowerBound"),
            IntDomainEvent::UpperBound => write!(f, "UpperBound"),
            IntDomainEvent::Removal => write!(f, "Removal"),
        }
    }
}

/// Commonly used propagation conditions.
#[derive(Debug, Clone, Copy)]
pub struct DomainEvents;

impl DomainEvents {
    /// Woken on every change.
    pub const ANY_INT: EnumSet<IntDomainEvent> = enumset::enum_set!(
        IntDomainEvent::Assign
            | IntDomainEvent::LowerBound
            | IntDomainEvent::UpperBound
            | IntDomainEvent::Removal
    );
    /// Woken on bound changes (and instantiation).
    pub const BOUNDS: EnumSet<IntDomainEvent> = enumset::enum_set!(
        IntDomainEvent::Assign | IntDomainEvent::LowerBound | IntDomainEvent::UpperBound
    );
    pub const LOWER_BOUND: EnumSet<IntDomainEvent> =
        enumset::enum_set!(IntDomainEvent::Assign | IntDomainEvent::LowerBound);
    pub const UPPER_BOUND: EnumSet<IntDomainEvent> =
        enumset::enum_set!(IntDomainEvent::Assign | IntDomainEvent::UpperBound);
    /// Woken only on instantiation.
    pub const ASSIGN: EnumSet<IntDomainEvent> = enumset::enum_set!(IntDomainEvent::Assign);
}
