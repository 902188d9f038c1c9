#![allow(dead_code, reason = "every test file only uses some of the helpers")]

use marrow_core::engine::events::IntDomainEvent;
use marrow_core::Cause;
use marrow_core::Contradiction;
use marrow_core::Model;
use marrow_core::PropagatorId;
use marrow_core::ReasonCode;
use marrow_core::VariableId;

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Registers a propagator which is woken by the instantiation of any of `variables`.
pub(crate) fn propagator_over(model: &mut Model, variables: &[VariableId]) -> PropagatorId {
    let conditions = variables
        .iter()
        .map(|_| IntDomainEvent::Assign.into())
        .collect::<Vec<_>>();
    model.add_propagator(variables, &conditions)
}

/// The contradiction `propagator` raises when it fails.
pub(crate) fn failure_of(propagator: PropagatorId) -> Contradiction {
    Contradiction::new(
        Cause::Propagator(propagator),
        None,
        ReasonCode::EmptyDomain,
    )
}

/// Opens worlds until the world index is `world`.
pub(crate) fn push_until(model: &mut Model, world: usize) {
    while model.world_index() < world {
        model.world_push();
    }
}
