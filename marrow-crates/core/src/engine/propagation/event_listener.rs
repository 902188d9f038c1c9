use crate::engine::contradiction::Cause;
use crate::engine::contradiction::Contradiction;
use crate::engine::events::IntEventType;
use crate::engine::propagation::PropagatorId;
use crate::engine::variables::MonitorId;
use crate::engine::variables::VariableId;
use crate::engine::variables::WokenPropagators;
use crate::engine::Model;

/// A committed change of one variable, as reported to the [`EventListener`].
#[derive(Debug)]
pub struct VariableUpdate<'a> {
    pub variable: VariableId,
    pub event: IntEventType,
    pub cause: Cause,
    /// The propagators whose propagation condition is met by the event; the propagator which
    /// caused the change is included.
    pub woken: WokenPropagators<'a>,
}

/// Receives the notifications of domain changes.
///
/// For every change the monitors of the variable are reported first, then the variable itself;
/// the views of the variable follow with their own (translated) notifications.
pub trait EventListener {
    fn on_monitor_update(
        &mut self,
        _monitor: MonitorId,
        _variable: VariableId,
        _event: IntEventType,
        _cause: Cause,
    ) {
    }

    fn on_variable_update(&mut self, update: VariableUpdate<'_>);
}

/// The propagation engine as seen from the search.
///
/// The engine schedules the propagators it is told about through [`EventListener`] and runs them
/// to a fixpoint on [`PropagationEngine::propagate`].
pub trait PropagationEngine: EventListener {
    fn propagate(&mut self, model: &mut Model) -> Result<(), Contradiction>;

    /// Drops every pending propagation, e.g. after a contradiction.
    fn flush(&mut self, model: &mut Model);

    /// Which propagators reduced which variables during the last call to
    /// [`PropagationEngine::propagate`], if the engine keeps track of it.
    fn inference_insight(&self) -> Option<&InferenceInsight> {
        None
    }
}

/// An engine which schedules nothing; the model is then driven by decisions only.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPropagation;

impl EventListener for NoPropagation {
    fn on_variable_update(&mut self, _update: VariableUpdate<'_>) {}
}

impl PropagationEngine for NoPropagation {
    fn propagate(&mut self, _model: &mut Model) -> Result<(), Contradiction> {
        Ok(())
    }

    fn flush(&mut self, _model: &mut Model) {}
}

/// One reduction performed by a propagator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InsightTouch {
    pub propagator: PropagatorId,
    pub variable: VariableId,
    pub removed: u64,
}

/// The reductions performed during one propagation, in the order they happened.
#[derive(Clone, Debug, Default)]
pub struct InferenceInsight {
    touches: Vec<InsightTouch>,
}

impl InferenceInsight {
    pub fn record(&mut self, propagator: PropagatorId, variable: VariableId, removed: u64) {
        self.touches.push(InsightTouch {
            propagator,
            variable,
            removed,
        });
    }

    pub fn clear(&mut self) {
        self.touches.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.touches.is_empty()
    }

    pub fn touches(&self) -> &[InsightTouch] {
        &self.touches
    }

    pub fn total_removed(&self) -> u64 {
        self.touches.iter().map(|touch| touch.removed).sum()
    }
}
