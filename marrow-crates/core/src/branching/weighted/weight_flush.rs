/// When the learned weights are cleared after a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightFlush {
    /// The weights are kept for the whole search.
    Never,
    /// The weights are cleared after every restart.
    Always,
    /// The weights are cleared once the `top` heaviest elements have not changed for `restarts`
    /// consecutive restarts.
    WhenTopStable { top: usize, restarts: u32 },
}

/// Follows the heaviest elements across restarts to decide when [`WeightFlush`] applies.
#[derive(Debug, Clone)]
pub(crate) struct FlushTracker<Key> {
    previous_top: Vec<Key>,
    stable_restarts: u32,
}

impl<Key> Default for FlushTracker<Key> {
    fn default() -> Self {
        FlushTracker {
            previous_top: vec![],
            stable_restarts: 0,
        }
    }
}

impl<Key: PartialEq> FlushTracker<Key> {
    /// Reports a restart; `current_top` are the heaviest elements (heaviest first) when the
    /// policy looks at them. Returns whether the weights should be cleared now.
    pub(crate) fn should_flush(
        &mut self,
        policy: WeightFlush,
        current_top: impl FnOnce(usize) -> Vec<Key>,
    ) -> bool {
        match policy {
            WeightFlush::Never => false,
            WeightFlush::Always => true,
            WeightFlush::WhenTopStable { top, restarts } => {
                let current_top = current_top(top);
                if !current_top.is_empty() && current_top == self.previous_top {
                    self.stable_restarts += 1;
                } else {
                    self.stable_restarts = 0;
                    self.previous_top = current_top;
                }

                if self.stable_restarts >= restarts {
                    self.stable_restarts = 0;
                    self.previous_top.clear();
                    true
                } else {
                    false
                }
            }
        }
    }
}
