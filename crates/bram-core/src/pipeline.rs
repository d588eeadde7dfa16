//! Enable-tracked output pipeline shift registers for one port.

/// Per-port output pipeline of configurable depth.
///
/// Holds `depth + 1` enable slots and `depth` data slots. Slot 0 of the
/// enable chain records whether the port was enabled on the previous tick;
/// each data slot shifts forward only when its enable slot was set, so a
/// value captured by a single enable pulse travels the chain alongside that
/// pulse and everything else holds. Depth 0 degenerates to the single
/// base-latency capture register owned by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortPipeline {
    enables: Box<[bool]>,
    stages: Box<[u64]>,
}

impl PortPipeline {
    /// Creates a cleared pipeline with `depth` extra register stages.
    #[must_use]
    pub fn new(depth: usize) -> Self {
        Self {
            enables: vec![false; depth + 1].into_boxed_slice(),
            stages: vec![0; depth].into_boxed_slice(),
        }
    }

    /// Rebuilds a pipeline from exported slots.
    ///
    /// Callers guarantee `enables.len() == stages.len() + 1`.
    pub(crate) fn from_parts(enables: &[bool], stages: &[u64]) -> Self {
        Self {
            enables: enables.into(),
            stages: stages.into(),
        }
    }

    /// Number of extra register stages beyond the base-latency register.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stages.len()
    }

    /// Advances the pipeline by one tick.
    ///
    /// `captured_enable` is this tick's memory-enable, shifted into slot 0.
    /// `captured_value` is the capture register's value from *before* this
    /// tick's capture update; it enters stage 0 when the enable that fed
    /// slot 0 last tick was set. Returns the `(final_enable, final_value)`
    /// pair arriving at the output register this tick, computed entirely
    /// from the pre-advance state.
    pub fn advance(&mut self, captured_enable: bool, captured_value: u64) -> (bool, u64) {
        let final_enable = self.enables[self.stages.len()];
        let final_value = self.stages.last().copied().unwrap_or(captured_value);

        for slot in (1..self.stages.len()).rev() {
            if self.enables[slot] {
                self.stages[slot] = self.stages[slot - 1];
            }
        }
        if self.enables[0] && !self.stages.is_empty() {
            self.stages[0] = captured_value;
        }

        for slot in (1..self.enables.len()).rev() {
            self.enables[slot] = self.enables[slot - 1];
        }
        self.enables[0] = captured_enable;

        (final_enable, final_value)
    }

    /// Read-only view of the enable slots, base slot first.
    #[must_use]
    pub fn enables(&self) -> &[bool] {
        &self.enables
    }

    /// Read-only view of the data slots, first stage first.
    #[must_use]
    pub fn stages(&self) -> &[u64] {
        &self.stages
    }
}
