//! Reset-armed scrub sequencer wrapping one access port.

use crate::{MemConfig, PortRequest};

/// Scrub sequencer state, re-armed by every reset assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ScrubState {
    /// Walking the address space, zeroing one word per tick.
    Scrubbing {
        /// Next address to be zeroed.
        counter: usize,
    },
    /// Sequence complete; the wrapped port's requests pass through untouched.
    Ready,
}

/// Intercepts one port's request stream until the whole array is zeroed.
///
/// While scrubbing, the caller's request is replaced by an internally
/// generated zero write that walks every address. The write for the all-ones
/// counter value is still emitted from the scrubbing state; the transition to
/// [`ScrubState::Ready`] lands on the following tick. Asserting reset at any
/// point re-arms the walk from address zero, so repeated resets reproduce the
/// full zero-fill guarantee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetScrubber {
    state: ScrubState,
    last_addr: usize,
}

impl ResetScrubber {
    /// Creates a sequencer that starts scrubbing at power-up.
    #[must_use]
    pub const fn new(config: &MemConfig) -> Self {
        Self {
            state: ScrubState::Scrubbing { counter: 0 },
            last_addr: config.last_addr(),
        }
    }

    /// Rebuilds a sequencer from an exported state.
    pub(crate) const fn from_state(state: ScrubState, config: &MemConfig) -> Self {
        Self {
            state,
            last_addr: config.last_addr(),
        }
    }

    /// True while the caller's requests are being overridden.
    #[must_use]
    pub const fn is_scrubbing(&self) -> bool {
        matches!(self.state, ScrubState::Scrubbing { .. })
    }

    /// Current sequencer state.
    #[must_use]
    pub const fn state(&self) -> ScrubState {
        self.state
    }

    /// Filters one tick's request for the wrapped port.
    ///
    /// Returns either the caller's request unmodified (ready) or the next
    /// scrub write (scrubbing). The reset level always passes through so the
    /// port's output register is forced low while reset is held; the output
    /// clock enable is forced low during the walk so no stale pipeline value
    /// can surface before the array is clean.
    pub const fn intercept(&mut self, request: PortRequest) -> PortRequest {
        if request.reset {
            self.state = ScrubState::Scrubbing { counter: 0 };
        }
        match self.state {
            ScrubState::Scrubbing { counter } => {
                self.state = if counter == self.last_addr {
                    ScrubState::Ready
                } else {
                    ScrubState::Scrubbing {
                        counter: counter + 1,
                    }
                };
                PortRequest {
                    reset: request.reset,
                    enable: true,
                    write_enable: true,
                    output_reg_enable: false,
                    addr: counter,
                    data: 0,
                }
            }
            ScrubState::Ready => request,
        }
    }
}
