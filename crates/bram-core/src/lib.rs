//! Tick-accurate model of a synchronous dual-port block memory.
//!
//! The device pairs a shared word array with two independent access ports,
//! "no-change" read/write semantics, a configurable-depth enable-tracked
//! output pipeline, and a scrub sequencer that zero-fills the whole address
//! space on reset before the device becomes transparent to its caller.

/// Device geometry configuration and construction-time validation.
pub mod config;
pub use config::{
    MemConfig, DEFAULT_DEPTH, DEFAULT_PIPELINE_DEPTH, DEFAULT_WORD_WIDTH, MAX_ADDR_WIDTH,
    MAX_PIPELINE_DEPTH, MAX_WORD_WIDTH,
};

/// Construction-time and wiring-time error taxonomy.
pub mod error;
pub use error::ConfigError;

/// Word-addressed backing store shared by both ports.
pub mod array;
pub use array::{MemoryArray, POWER_UP_PATTERN};

/// Enable-tracked output pipeline shift registers.
pub mod pipeline;
pub use pipeline::PortPipeline;

/// Dual-port tick controller and per-port request records.
pub mod controller;
pub use controller::{DualPortController, PortId, PortRequest};

/// Reset-armed zero-fill scrub sequencer.
pub mod scrubber;
pub use scrubber::{ResetScrubber, ScrubState};

/// Host-facing device composition, snapshots, and counters.
pub mod device;
pub use device::{
    DeviceSnapshot, DeviceStats, LaneSnapshot, MemDevice, SnapshotError, SnapshotVersion,
};

/// Deterministic trace hooks emitted in commit order.
pub mod trace;
pub use trace::{TraceEvent, TraceSink};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
