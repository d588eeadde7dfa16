//! Host-facing device: scrub-wrapped controller, snapshots, and counters.

use thiserror::Error;

use crate::{
    ConfigError, DualPortController, MemConfig, MemoryArray, PortId, PortPipeline, PortRequest,
    ResetScrubber, ScrubState, TraceEvent, TraceSink,
};

/// Stable snapshot wire-version identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u16)]
pub enum SnapshotVersion {
    /// Initial schema revision for bram-core v0.1.x.
    V1 = 1,
}

impl SnapshotVersion {
    /// Converts a wire value to a known snapshot version.
    #[must_use]
    pub const fn from_u16(version: u16) -> Option<Self> {
        match version {
            1 => Some(Self::V1),
            _ => None,
        }
    }
}

/// Errors raised when rebuilding a device from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum SnapshotError {
    /// The embedded geometry fails construction-time validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A snapshot field does not match the embedded geometry.
    #[error("snapshot contents do not match the embedded geometry")]
    ShapeMismatch,
}

/// Exported register state for one port lane.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct LaneSnapshot {
    /// Base-latency read capture register.
    pub capture: u64,
    /// Output register visible to the caller.
    pub output: u64,
    /// Enable pipeline slots, base slot first (`pipeline_depth + 1` entries).
    pub enables: Vec<bool>,
    /// Data pipeline slots, first stage first (`pipeline_depth` entries).
    pub stages: Vec<u64>,
}

/// Versioned full-state snapshot of one device.
///
/// Carries everything tick-visible: array contents, both lanes' registers,
/// and the scrub sequencer. Host-side counters are observability, not
/// architectural state, and restart from zero on import.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DeviceSnapshot {
    /// Snapshot schema version.
    pub version: SnapshotVersion,
    /// Device geometry at export time.
    pub config: MemConfig,
    /// Backing array contents, one word per address.
    pub words: Vec<u64>,
    /// Register state for ports A and B, in that order.
    pub lanes: [LaneSnapshot; 2],
    /// Scrub sequencer state.
    pub scrub: ScrubState,
    /// Ticks elapsed since construction.
    pub tick_count: u64,
}

/// Saturating counters over the trace event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceStats {
    /// Writes committed to the array, scrub writes included.
    pub writes_committed: u64,
    /// Read values captured into a base-latency register.
    pub reads_captured: u64,
    /// Same-tick same-address write collisions observed.
    pub write_conflicts: u64,
    /// Output register updates delivered to a caller.
    pub output_updates: u64,
    /// Scrub walks that ran to completion.
    pub scrub_passes: u64,
}

impl TraceSink for DeviceStats {
    fn on_event(&mut self, event: TraceEvent) {
        match event {
            TraceEvent::WriteCommitted { .. } => {
                self.writes_committed = self.writes_committed.saturating_add(1);
            }
            TraceEvent::ReadCaptured { .. } => {
                self.reads_captured = self.reads_captured.saturating_add(1);
            }
            TraceEvent::WriteConflict { .. } => {
                self.write_conflicts = self.write_conflicts.saturating_add(1);
            }
            TraceEvent::OutputUpdated { .. } => {
                self.output_updates = self.output_updates.saturating_add(1);
            }
            TraceEvent::ScrubCompleted => {
                self.scrub_passes = self.scrub_passes.saturating_add(1);
            }
            TraceEvent::ScrubStarted => {}
        }
    }
}

/// Feeds every event to the stats block and optionally to a host sink.
struct Fanout<'a, 'b> {
    stats: &'a mut DeviceStats,
    host: Option<&'b mut dyn TraceSink>,
}

impl TraceSink for Fanout<'_, '_> {
    fn on_event(&mut self, event: TraceEvent) {
        self.stats.on_event(event);
        if let Some(host) = self.host.as_mut() {
            host.on_event(event);
        }
    }
}

/// The complete memory device: controller plus scrub-wrapped port A.
///
/// Freshly constructed devices start scrubbing, so the first `depth` ticks
/// zero-fill the array before port A's caller is seen at all. Port B is
/// never intercepted; enclosing systems keep it quiet until the scrub
/// completes.
#[derive(Debug, Clone)]
pub struct MemDevice {
    config: MemConfig,
    controller: DualPortController,
    scrubber: ResetScrubber,
    stats: DeviceStats,
    tick_count: u64,
}

impl MemDevice {
    /// Builds a device from a validated geometry.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the geometry fails validation.
    pub fn new(config: MemConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            controller: DualPortController::new(&config)?,
            scrubber: ResetScrubber::new(&config),
            config,
            stats: DeviceStats::default(),
            tick_count: 0,
        })
    }

    /// Advances the device by one tick.
    pub fn tick(&mut self, a: PortRequest, b: PortRequest) {
        self.tick_inner(a, b, None);
    }

    /// Advances the device by one tick, reporting effects to `sink`.
    pub fn tick_traced(&mut self, a: PortRequest, b: PortRequest, sink: &mut dyn TraceSink) {
        self.tick_inner(a, b, Some(sink));
    }

    fn tick_inner(&mut self, a: PortRequest, b: PortRequest, host: Option<&mut dyn TraceSink>) {
        let mut sink = Fanout {
            stats: &mut self.stats,
            host,
        };

        let was_scrubbing = self.scrubber.is_scrubbing();
        let port_a = self.scrubber.intercept(a);
        if !was_scrubbing && self.scrubber.is_scrubbing() {
            sink.on_event(TraceEvent::ScrubStarted);
        }

        self.controller.tick_traced(port_a, b, &mut sink);

        if was_scrubbing && !self.scrubber.is_scrubbing() {
            sink.on_event(TraceEvent::ScrubCompleted);
        }
        self.tick_count = self.tick_count.saturating_add(1);
    }

    /// Current output register value for `port`.
    #[must_use]
    pub fn read_data(&self, port: PortId) -> u64 {
        self.controller.read_data(port)
    }

    /// True while port A's requests are overridden by the scrub walk.
    #[must_use]
    pub const fn is_scrubbing(&self) -> bool {
        self.scrubber.is_scrubbing()
    }

    /// Device geometry.
    #[must_use]
    pub const fn config(&self) -> &MemConfig {
        &self.config
    }

    /// Counter block accumulated since construction or import.
    #[must_use]
    pub const fn stats(&self) -> DeviceStats {
        self.stats
    }

    /// Ticks elapsed since construction or import.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Read-only verification view of the backing array.
    #[must_use]
    pub fn memory(&self) -> &MemoryArray {
        self.controller.array()
    }

    /// Checks a caller's declared port shape against this device.
    ///
    /// # Errors
    ///
    /// Returns a width-mismatch [`ConfigError`] when the wiring disagrees.
    pub const fn check_port_shape(
        &self,
        caller_word_width: u32,
        caller_addr_width: u32,
    ) -> Result<(), ConfigError> {
        self.config
            .check_port_shape(caller_word_width, caller_addr_width)
    }

    /// Exports the complete tick-visible state.
    #[must_use]
    pub fn snapshot(&self) -> DeviceSnapshot {
        let lane = |port: PortId| {
            let lane = &self.controller.lanes[port.index()];
            LaneSnapshot {
                capture: lane.capture,
                output: lane.output,
                enables: lane.pipeline.enables().to_vec(),
                stages: lane.pipeline.stages().to_vec(),
            }
        };
        DeviceSnapshot {
            version: SnapshotVersion::V1,
            config: self.config,
            words: self.memory().words().to_vec(),
            lanes: [lane(PortId::A), lane(PortId::B)],
            scrub: self.scrubber.state(),
            tick_count: self.tick_count,
        }
    }

    /// Rebuilds a device from an exported snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Config`] when the embedded geometry is
    /// invalid and [`SnapshotError::ShapeMismatch`] when any field does not
    /// fit that geometry.
    pub fn from_snapshot(snapshot: &DeviceSnapshot) -> Result<Self, SnapshotError> {
        let config = snapshot.config;
        config.validate()?;

        if snapshot.words.len() != config.depth {
            return Err(SnapshotError::ShapeMismatch);
        }
        for lane in &snapshot.lanes {
            if lane.enables.len() != config.pipeline_depth + 1
                || lane.stages.len() != config.pipeline_depth
            {
                return Err(SnapshotError::ShapeMismatch);
            }
        }
        if let ScrubState::Scrubbing { counter } = snapshot.scrub {
            if counter > config.last_addr() {
                return Err(SnapshotError::ShapeMismatch);
            }
        }

        let mut device = Self::new(config)?;
        device.controller.array = MemoryArray::from_words(&snapshot.words, config.word_mask());
        for (lane, exported) in device.controller.lanes.iter_mut().zip(&snapshot.lanes) {
            lane.capture = exported.capture & config.word_mask();
            lane.output = exported.output & config.word_mask();
            lane.pipeline = PortPipeline::from_parts(&exported.enables, &exported.stages);
        }
        device.scrubber = ResetScrubber::from_state(snapshot.scrub, &config);
        device.tick_count = snapshot.tick_count;
        Ok(device)
    }
}
