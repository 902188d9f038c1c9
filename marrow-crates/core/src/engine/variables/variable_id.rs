use crate::containers::StorageKey;

/// The identifier of a variable (or view) within a [`Model`](crate::engine::Model).
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct VariableId(pub(crate) u32);

impl VariableId {
    pub fn id(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for VariableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl StorageKey for VariableId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        VariableId(index as u32)
    }
}

/// The identifier of a variable monitor; monitors are told about every change of the variables
/// they are attached to before any propagator is scheduled.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct MonitorId(u32);

impl StorageKey for MonitorId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        MonitorId(index as u32)
    }
}
