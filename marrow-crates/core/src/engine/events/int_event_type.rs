use enum_map::Enum;
use enumset::EnumSet;

use super::IntDomainEvent;

/// The minimal description of a change to an integer domain.
///
/// A change leaving a single value is always reported as [`IntEventType::Instantiate`]; otherwise
/// a change which moved a bound is reported as a bound event and any other change as
/// [`IntEventType::Remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
pub enum IntEventType {
    Remove,
    IncreaseLowerBound,
    DecreaseUpperBound,
    /// Both bounds moved in one operation.
    Bounds,
    Instantiate,
}

/// The registry bucket of propagators woken by any change.
pub(crate) const ANY_BUCKET: usize = 0;
pub(crate) const BOUNDS_BUCKET: usize = 1;
pub(crate) const LOWER_BUCKET: usize = 2;
pub(crate) const UPPER_BUCKET: usize = 3;
pub(crate) const ASSIGN_BUCKET: usize = 4;
/// Propagators in this bucket are never woken.
pub(crate) const PASSIVE_BUCKET: usize = 5;
pub(crate) const NUM_BUCKETS: usize = 6;

impl IntEventType {
    /// Classifies a committed change.
    pub(crate) fn classify(
        lower_bound_moved: bool,
        upper_bound_moved: bool,
        instantiated: bool,
    ) -> IntEventType {
        if instantiated {
            IntEventType::Instantiate
        } else if lower_bound_moved && upper_bound_moved {
            IntEventType::Bounds
        } else if lower_bound_moved {
            IntEventType::IncreaseLowerBound
        } else if upper_bound_moved {
            IntEventType::DecreaseUpperBound
        } else {
            IntEventType::Remove
        }
    }

    pub fn is_instantiation(self) -> bool {
        self == IntEventType::Instantiate
    }

    pub fn moves_lower_bound(self) -> bool {
        matches!(
            self,
            IntEventType::IncreaseLowerBound | IntEventType::Bounds | IntEventType::Instantiate
        )
    }

    pub fn moves_upper_bound(self) -> bool {
        matches!(
            self,
            IntEventType::DecreaseUpperBound | IntEventType::Bounds | IntEventType::Instantiate
        )
    }

    /// The propagation conditions satisfied by this event.
    pub fn domain_events(self) -> EnumSet<IntDomainEvent> {
        let mut events = EnumSet::only(IntDomainEvent::Removal);
        if self.moves_lower_bound() {
            events |= IntDomainEvent::LowerBound;
        }
        if self.moves_upper_bound() {
            events |= IntDomainEvent::UpperBound;
        }
        if self.is_instantiation() {
            events |= IntDomainEvent::Assign;
        }
        events
    }

    /// The event seen through a view with the given scale; a negative scale swaps the bounds.
    pub fn through_scale(self, scale: i32) -> IntEventType {
        if scale > 0 {
            return self;
        }
        match self {
            IntEventType::IncreaseLowerBound => IntEventType::DecreaseUpperBound,
            IntEventType::DecreaseUpperBound => IntEventType::IncreaseLowerBound,
            other => other,
        }
    }

    /// The registry buckets whose propagators this event wakes, in registry order.
    pub(crate) fn woken_buckets(self) -> &'static [usize] {
        match self {
            IntEventType::Remove => &[ANY_BUCKET],
            IntEventType::IncreaseLowerBound => &[ANY_BUCKET, BOUNDS_BUCKET, LOWER_BUCKET],
            IntEventType::DecreaseUpperBound => &[ANY_BUCKET, BOUNDS_BUCKET, UPPER_BUCKET],
            IntEventType::Bounds => &[ANY_BUCKET, BOUNDS_BUCKET, LOWER_BUCKET, UPPER_BUCKET],
            IntEventType::Instantiate => &[
                ANY_BUCKET,
                BOUNDS_BUCKET,
                LOWER_BUCKET,
                UPPER_BUCKET,
                ASSIGN_BUCKET,
            ],
        }
    }
}

/// The bucket in which a propagator with the given condition is registered.
pub(crate) fn bucket_for(condition: EnumSet<IntDomainEvent>) -> usize {
    if condition.contains(IntDomainEvent::Removal) {
        ANY_BUCKET
    } else if condition.contains(IntDomainEvent::LowerBound)
        && condition.contains(IntDomainEvent::UpperBound)
    {
        BOUNDS_BUCKET
    } else if condition.contains(IntDomainEvent::LowerBound) {
        LOWER_BUCKET
    } else if condition.contains(IntDomainEvent::UpperBound) {
        UPPER_BUCKET
    } else if condition.contains(IntDomainEvent::Assign) {
        ASSIGN_BUCKET
    } else {
        PASSIVE_BUCKET
    }
}

impl std::fmt::Display for IntEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntEventType::Remove => write!(f, "REMOVE"),
            IntEventType::IncreaseLowerBound => write!(f, "INCLOW"),
            IntEventType::DecreaseUpperBound => write!(f, "DECUPP"),
            IntEventType::Bounds => write!(f, "BOUND"),
            IntEventType::Instantiate => write!(f, "INSTANTIATE"),
        }
    }
}
