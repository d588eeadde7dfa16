//! Deterministic trace hooks emitted at commit points within a tick.

use crate::PortId;

/// One observable device effect, reported in architected commit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    /// A write committed to the backing array.
    WriteCommitted {
        /// Committing port.
        port: PortId,
        /// Target word address.
        addr: usize,
        /// Stored (masked) value.
        value: u64,
    },
    /// A read value was captured into a port's base-latency register.
    ReadCaptured {
        /// Capturing port.
        port: PortId,
        /// Source word address.
        addr: usize,
        /// Captured (masked) value.
        value: u64,
    },
    /// Both ports wrote the same address this tick.
    WriteConflict {
        /// Contested word address.
        addr: usize,
        /// Port whose value sticks under the fixed commit order.
        winner: PortId,
    },
    /// A port's output register took a newly delivered pipeline value.
    OutputUpdated {
        /// Updated port.
        port: PortId,
        /// Value now visible to the caller.
        value: u64,
    },
    /// The scrub sequencer was re-armed by a reset assertion.
    ScrubStarted,
    /// The scrub sequencer finished walking the address space.
    ScrubCompleted,
}

/// Sink for trace events, invoked in deterministic order within each tick.
pub trait TraceSink {
    /// Records one event.
    fn on_event(&mut self, event: TraceEvent);
}

/// Sink that drops every event; used by the untraced tick paths.
pub(crate) struct NullSink;

impl TraceSink for NullSink {
    fn on_event(&mut self, _event: TraceEvent) {}
}
