//! Dual-port interaction: shared array, hazard determinism, independence.

#![allow(clippy::pedantic, clippy::nursery)]

use bram_core::{MemConfig, MemDevice, PortId, PortRequest, TraceEvent, TraceSink};
use proptest::prelude::*;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

fn settled(word_width: u32, depth: usize, pipeline_depth: usize) -> MemDevice {
    let config = MemConfig {
        word_width,
        depth,
        pipeline_depth,
    };
    let mut device = MemDevice::new(config).expect("test geometry is valid");
    for _ in 0..depth + 2 {
        device.tick(PortRequest::idle(), PortRequest::idle());
    }
    assert!(!device.is_scrubbing());
    device
}

fn idle_ticks(device: &mut MemDevice, count: usize) {
    for _ in 0..count {
        device.tick(PortRequest::idle(), PortRequest::idle());
    }
}

struct Recorder(Vec<TraceEvent>);

impl TraceSink for Recorder {
    fn on_event(&mut self, event: TraceEvent) {
        self.0.push(event);
    }
}

#[test]
fn both_ports_address_a_single_shared_array() {
    let mut device = settled(8, 16, 0);

    device.tick(PortRequest::write(3, 0x21), PortRequest::write(12, 0x43));
    device.tick(PortRequest::read(12), PortRequest::read(3));
    idle_ticks(&mut device, 1);

    assert_eq!(device.read_data(PortId::A), 0x43);
    assert_eq!(device.read_data(PortId::B), 0x21);
}

#[test]
fn same_address_collision_is_deterministic_and_contained() {
    let mut device = settled(8, 16, 0);
    let mut recorder = Recorder(Vec::new());

    device.tick_traced(
        PortRequest::write(5, 0xAA),
        PortRequest::write(5, 0xBB),
        &mut recorder,
    );

    assert_eq!(device.memory().read(5), 0xBB);
    assert_eq!(device.stats().write_conflicts, 1);
    // Every other word is untouched by the collision.
    for addr in (0..16).filter(|addr| *addr != 5) {
        assert_eq!(device.memory().read(addr), 0);
    }
    assert_eq!(
        recorder.0,
        vec![
            TraceEvent::WriteConflict {
                addr: 5,
                winner: PortId::B
            },
            TraceEvent::WriteCommitted {
                port: PortId::A,
                addr: 5,
                value: 0xAA
            },
            TraceEvent::WriteCommitted {
                port: PortId::B,
                addr: 5,
                value: 0xBB
            },
        ]
    );
}

#[test]
fn port_a_latency_is_unaffected_by_port_b_traffic() {
    let mut device = settled(8, 16, 3);

    device.tick(PortRequest::write(2, 0x5A), PortRequest::idle());
    device.tick(PortRequest::read(2), PortRequest::write(9, 0x01));
    for step in 0..3 {
        device.tick(PortRequest::idle(), PortRequest::write(10 + step, 0x02));
        assert_eq!(device.read_data(PortId::A), 0);
    }
    device.tick(PortRequest::idle(), PortRequest::write(14, 0x03));

    assert_eq!(device.read_data(PortId::A), 0x5A);
}

#[test]
fn stats_track_commits_captures_and_conflicts() {
    let mut device = settled(8, 16, 0);
    let before = device.stats();

    device.tick(PortRequest::write(1, 0x02), PortRequest::write(1, 0x03));
    device.tick(PortRequest::read(1), PortRequest::idle());
    idle_ticks(&mut device, 1);

    let after = device.stats();
    assert_eq!(after.writes_committed, before.writes_committed + 2);
    assert_eq!(after.write_conflicts, before.write_conflicts + 1);
    assert_eq!(after.reads_captured, before.reads_captured + 1);
    assert!(after.output_updates > before.output_updates);
}

proptest! {
    #[test]
    fn written_words_round_trip_across_ports(addr in 0usize..16, data in any::<u64>()) {
        let mut device = settled(8, 16, 2);

        device.tick(PortRequest::write(addr, data), PortRequest::idle());
        device.tick(PortRequest::idle(), PortRequest::read(addr));
        idle_ticks(&mut device, 3);

        prop_assert_eq!(device.read_data(PortId::B), data & 0xFF);
    }

    #[test]
    fn scrubbed_addresses_read_zero_until_written(addr in 0usize..16) {
        let mut device = settled(8, 16, 1);

        device.tick(PortRequest::read(addr), PortRequest::idle());
        idle_ticks(&mut device, 2);

        prop_assert_eq!(device.read_data(PortId::A), 0);
    }
}
