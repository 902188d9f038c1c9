use crate::engine::contradiction::Cause;
use crate::environment::Environment;
use crate::environment::StoredInt;

/// The ledger of removals of one variable.
///
/// Only the first `size` entries are live; `size` is stored in the environment, so entries recorded
/// in a popped world are discarded by the next write.
#[derive(Clone, Debug)]
pub(crate) enum DeltaRecorder {
    /// Individual removed values, for enumerated and boolean domains.
    Values(ValueDelta),
    /// Removed ranges, for interval domains.
    Ranges(RangeDelta),
}

#[derive(Clone, Debug)]
pub(crate) struct ValueDelta {
    values: Vec<i32>,
    causes: Vec<Cause>,
    size: StoredInt,
}

#[derive(Clone, Debug)]
pub(crate) struct RangeDelta {
    lower: Vec<i32>,
    upper: Vec<i32>,
    causes: Vec<Cause>,
    size: StoredInt,
}

impl DeltaRecorder {
    pub(crate) fn values(environment: &mut Environment) -> DeltaRecorder {
        DeltaRecorder::Values(ValueDelta {
            values: vec![],
            causes: vec![],
            size: environment.make_int(0),
        })
    }

    pub(crate) fn ranges(environment: &mut Environment) -> DeltaRecorder {
        DeltaRecorder::Ranges(RangeDelta {
            lower: vec![],
            upper: vec![],
            causes: vec![],
            size: environment.make_int(0),
        })
    }

    /// The number of live entries.
    pub(crate) fn len(&self, environment: &Environment) -> usize {
        let size = match self {
            DeltaRecorder::Values(delta) => delta.size,
            DeltaRecorder::Ranges(delta) => delta.size,
        };
        environment.get_int(size) as usize
    }

    /// The removed range `lower..=upper` of entry `index`, with the cause of its removal.
    pub(crate) fn entry(&self, index: usize) -> (i32, i32, Cause) {
        match self {
            DeltaRecorder::Values(delta) => {
                (delta.values[index], delta.values[index], delta.causes[index])
            }
            DeltaRecorder::Ranges(delta) => {
                (delta.lower[index], delta.upper[index], delta.causes[index])
            }
        }
    }

    pub(crate) fn record(
        &mut self,
        environment: &mut Environment,
        lower: i32,
        upper: i32,
        cause: Cause,
    ) {
        match self {
            DeltaRecorder::Values(delta) => {
                let live = environment.get_int(delta.size) as usize;
                delta.values.truncate(live);
                delta.causes.truncate(live);

                for value in lower..=upper {
                    delta.values.push(value);
                    delta.causes.push(cause);
                }
                environment.set_int(delta.size, delta.values.len() as i64);
            }
            DeltaRecorder::Ranges(delta) => {
                let live = environment.get_int(delta.size) as usize;
                delta.lower.truncate(live);
                delta.upper.truncate(live);
                delta.causes.truncate(live);

                delta.lower.push(lower);
                delta.upper.push(upper);
                delta.causes.push(cause);
                environment.set_int(delta.size, delta.lower.len() as i64);
            }
        }
    }
}

/// Where a domain reports the values it removes.
#[derive(Debug)]
pub(crate) struct DeltaSink<'a> {
    recorder: Option<&'a mut DeltaRecorder>,
    cause: Cause,
}

impl<'a> DeltaSink<'a> {
    pub(crate) fn new(recorder: Option<&'a mut DeltaRecorder>, cause: Cause) -> Self {
        DeltaSink { recorder, cause }
    }

    /// A sink which drops everything.
    pub(crate) fn discard() -> DeltaSink<'static> {
        DeltaSink {
            recorder: None,
            cause: Cause::Null,
        }
    }

    pub(crate) fn value(&mut self, environment: &mut Environment, value: i32) {
        self.range(environment, value, value);
    }

    pub(crate) fn range(&mut self, environment: &mut Environment, lower: i32, upper: i32) {
        if lower > upper {
            return;
        }
        if let Some(recorder) = self.recorder.as_deref_mut() {
            recorder.record(environment, lower, upper, self.cause);
        }
    }
}
