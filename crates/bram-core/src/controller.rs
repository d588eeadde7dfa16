//! Dual-port tick controller: two-phase commit against the shared array.

use crate::trace::NullSink;
use crate::{ConfigError, MemConfig, MemoryArray, PortPipeline, TraceEvent, TraceSink};

/// Access-port identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum PortId {
    /// First access port; the device wraps this one with the scrubber.
    A,
    /// Second access port.
    B,
}

impl PortId {
    /// Both ports in commit order.
    pub const ALL: [Self; 2] = [Self::A, Self::B];

    /// Returns the lane index for this port (`0..=1`).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

/// One port's request record for a single tick.
///
/// Callers supply a fresh record every tick; the scrubber synthesizes one
/// for port A while it is active. Plain data in, data out: no identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct PortRequest {
    /// Synchronous level-sensitive reset for this port's output register.
    pub reset: bool,
    /// Memory enable; gates both write commit and read capture.
    pub enable: bool,
    /// Selects write commit over read capture while enabled.
    pub write_enable: bool,
    /// Clock enable for the output register's final copy.
    pub output_reg_enable: bool,
    /// Word address, masked to the configured address width.
    pub addr: usize,
    /// Write data, masked to the configured word width.
    pub data: u64,
}

impl PortRequest {
    /// Idle request: no access this tick, output clock enable held high.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            reset: false,
            enable: false,
            write_enable: false,
            output_reg_enable: true,
            addr: 0,
            data: 0,
        }
    }

    /// Read request at `addr`.
    #[must_use]
    pub const fn read(addr: usize) -> Self {
        Self {
            enable: true,
            addr,
            ..Self::idle()
        }
    }

    /// Write request storing `data` at `addr`.
    #[must_use]
    pub const fn write(addr: usize, data: u64) -> Self {
        Self {
            enable: true,
            write_enable: true,
            addr,
            data,
            ..Self::idle()
        }
    }

    /// Same request with the reset level asserted.
    #[must_use]
    pub const fn with_reset(mut self) -> Self {
        self.reset = true;
        self
    }

    /// Same request with the output register clock enable deasserted.
    #[must_use]
    pub const fn output_disabled(mut self) -> Self {
        self.output_reg_enable = false;
        self
    }
}

/// Per-port register state: base-latency capture, pipeline, output register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PortLane {
    pub(crate) capture: u64,
    pub(crate) pipeline: PortPipeline,
    pub(crate) output: u64,
}

impl PortLane {
    fn new(pipeline_depth: usize) -> Self {
        Self {
            capture: 0,
            pipeline: PortPipeline::new(pipeline_depth),
            output: 0,
        }
    }
}

/// What one port decided to do this tick, snapshotted before any commit.
#[derive(Debug, Clone, Copy, Default)]
struct LaneDecision {
    capture: Option<(usize, u64)>,
    write: Option<(usize, u64)>,
}

/// Owns the shared array and both port lanes; advances them tick by tick.
///
/// Each tick runs in two phases: first both ports' read captures and write
/// intents are computed from the pre-tick array contents, then writes are
/// applied in fixed port order. Neither port ever observes the other port's
/// same-tick write, and a same-address write collision deterministically
/// resolves to port B (last applied).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DualPortController {
    pub(crate) array: MemoryArray,
    pub(crate) lanes: [PortLane; 2],
    addr_mask: usize,
    word_mask: u64,
}

impl DualPortController {
    /// Builds a controller for a validated geometry.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the geometry fails validation.
    pub fn new(config: &MemConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            array: MemoryArray::new(config.depth, config.word_mask()),
            lanes: [
                PortLane::new(config.pipeline_depth),
                PortLane::new(config.pipeline_depth),
            ],
            addr_mask: config.addr_mask(),
            word_mask: config.word_mask(),
        })
    }

    /// Advances both ports by one tick.
    pub fn tick(&mut self, a: PortRequest, b: PortRequest) {
        let mut sink = NullSink;
        self.tick_traced(a, b, &mut sink);
    }

    /// Advances both ports by one tick, reporting effects to `sink`.
    pub fn tick_traced(&mut self, a: PortRequest, b: PortRequest, sink: &mut dyn TraceSink) {
        let requests = [a, b];

        // Phase one: decisions from a consistent pre-tick snapshot.
        let mut decisions = [LaneDecision::default(); 2];
        for (decision, request) in decisions.iter_mut().zip(&requests) {
            if !request.enable {
                continue;
            }
            let addr = request.addr & self.addr_mask;
            if request.write_enable {
                decision.write = Some((addr, request.data & self.word_mask));
            } else {
                decision.capture = Some((addr, self.array.read(addr)));
            }
        }

        if let (Some((addr_a, _)), Some((addr_b, _))) = (decisions[0].write, decisions[1].write) {
            if addr_a == addr_b {
                sink.on_event(TraceEvent::WriteConflict {
                    addr: addr_a,
                    winner: PortId::B,
                });
            }
        }

        // Phase two: commit writes in fixed port order, port B last.
        for (port, decision) in PortId::ALL.into_iter().zip(decisions) {
            if let Some((addr, value)) = decision.write {
                self.array.write(addr, value);
                sink.on_event(TraceEvent::WriteCommitted { port, addr, value });
            }
        }

        // Advance each lane's registers from their pre-tick values.
        for ((port, lane), (request, decision)) in PortId::ALL
            .into_iter()
            .zip(self.lanes.iter_mut())
            .zip(requests.into_iter().zip(decisions))
        {
            let prior_capture = lane.capture;
            let (final_enable, final_value) = lane.pipeline.advance(request.enable, prior_capture);

            // No-change rule: a write tick leaves the capture register alone.
            if let Some((addr, value)) = decision.capture {
                lane.capture = value;
                sink.on_event(TraceEvent::ReadCaptured { port, addr, value });
            }

            if request.reset {
                lane.output = 0;
            } else if final_enable && request.output_reg_enable {
                lane.output = final_value;
                sink.on_event(TraceEvent::OutputUpdated {
                    port,
                    value: final_value,
                });
            }
        }
    }

    /// Current output register value for `port`.
    #[must_use]
    pub fn read_data(&self, port: PortId) -> u64 {
        self.lanes[port.index()].output
    }

    /// Read-only view of the shared backing array.
    #[must_use]
    pub fn array(&self) -> &MemoryArray {
        &self.array
    }
}

#[cfg(test)]
mod tests {
    use super::{DualPortController, PortId, PortRequest};
    use crate::{MemConfig, TraceEvent, TraceSink};

    fn config() -> MemConfig {
        MemConfig {
            word_width: 8,
            depth: 16,
            pipeline_depth: 0,
        }
    }

    fn controller() -> DualPortController {
        DualPortController::new(&config()).expect("test geometry is valid")
    }

    struct Recorder(Vec<TraceEvent>);

    impl TraceSink for Recorder {
        fn on_event(&mut self, event: TraceEvent) {
            self.0.push(event);
        }
    }

    #[test]
    fn invalid_geometry_is_rejected_at_construction() {
        let bad = MemConfig {
            depth: 12,
            ..config()
        };
        assert!(DualPortController::new(&bad).is_err());
    }

    #[test]
    fn write_then_read_round_trips_through_either_port() {
        let mut controller = controller();

        controller.tick(PortRequest::write(3, 0x5A), PortRequest::idle());
        controller.tick(PortRequest::idle(), PortRequest::read(3));
        controller.tick(PortRequest::idle(), PortRequest::idle());

        assert_eq!(controller.read_data(PortId::B), 0x5A);
    }

    #[test]
    fn same_tick_read_sees_the_pre_tick_value_not_the_other_ports_write() {
        let mut controller = controller();

        controller.tick(PortRequest::write(7, 0x11), PortRequest::idle());
        // Port A overwrites address 7 while port B reads it in the same tick.
        controller.tick(PortRequest::write(7, 0x22), PortRequest::read(7));
        controller.tick(PortRequest::idle(), PortRequest::idle());

        assert_eq!(controller.read_data(PortId::B), 0x11);
        assert_eq!(controller.array().read(7), 0x22);
    }

    #[test]
    fn same_address_write_collision_resolves_to_port_b() {
        let mut controller = controller();
        let mut recorder = Recorder(Vec::new());

        controller.tick_traced(
            PortRequest::write(5, 0xAA),
            PortRequest::write(5, 0xBB),
            &mut recorder,
        );

        assert_eq!(controller.array().read(5), 0xBB);
        assert_eq!(
            recorder.0.first(),
            Some(&TraceEvent::WriteConflict {
                addr: 5,
                winner: PortId::B
            })
        );
    }

    #[test]
    fn addresses_and_data_are_masked_at_the_boundary() {
        let mut controller = controller();

        // Address 19 folds onto address 3; data is masked to eight bits.
        controller.tick(PortRequest::write(19, 0x1FF), PortRequest::idle());

        assert_eq!(controller.array().read(3), 0xFF);
    }

    #[test]
    fn reset_forces_the_output_register_to_zero_next_tick() {
        let mut controller = controller();

        controller.tick(PortRequest::write(1, 0x42), PortRequest::idle());
        controller.tick(PortRequest::read(1), PortRequest::idle());
        controller.tick(PortRequest::idle(), PortRequest::idle());
        assert_eq!(controller.read_data(PortId::A), 0x42);

        controller.tick(PortRequest::idle().with_reset(), PortRequest::idle());
        assert_eq!(controller.read_data(PortId::A), 0);
    }

    #[test]
    fn output_register_holds_while_its_clock_enable_is_low() {
        let mut controller = controller();

        controller.tick(PortRequest::write(2, 0x77), PortRequest::idle());
        controller.tick(PortRequest::read(2).output_disabled(), PortRequest::idle());
        controller.tick(PortRequest::idle().output_disabled(), PortRequest::idle());
        assert_eq!(controller.read_data(PortId::A), 0);
    }
}
