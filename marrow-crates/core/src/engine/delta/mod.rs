//! Opt-in ledgers of the values removed from a variable, and the monitors propagators read them
//! through.
mod delta_monitor;
mod delta_recorder;

pub use delta_monitor::DeltaMonitor;
pub(crate) use delta_recorder::DeltaRecorder;
pub(crate) use delta_recorder::DeltaSink;
