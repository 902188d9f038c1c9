//! Domain events and propagation conditions.
mod int_domain_event;
mod int_event_type;

pub use int_domain_event::*;
pub(crate) use int_event_type::bucket_for;
pub use int_event_type::IntEventType;
pub(crate) use int_event_type::NUM_BUCKETS;
pub(crate) use int_event_type::PASSIVE_BUCKET;
