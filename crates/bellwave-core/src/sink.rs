//! Device output sink
//!
//! The scheduler emits per-group intensity packets through this trait. The
//! transport is fire-and-forget: a sink that loses contact with its device
//! handles that itself, and the scheduler never blocks or retries on emit.

use crate::types::DeviceGroup;

/// Accepts intensity packets for a device group and a global stop command.
pub trait DeviceSink {
    /// Play one packet: intensities (0..=100) indexed by motor slot, for
    /// `duration_ms` milliseconds.
    fn play(&mut self, group: DeviceGroup, intensities: &[u8], duration_ms: u32);

    /// Immediately silence every device group.
    fn stop_all(&mut self);
}

/// A sink that discards everything.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullSink;

impl DeviceSink for NullSink {
    #[inline]
    fn play(&mut self, _group: DeviceGroup, _intensities: &[u8], _duration_ms: u32) {}

    #[inline]
    fn stop_all(&mut self) {}
}

// ============================================================================
// MemorySink (std)
// ============================================================================

/// One recorded packet.
#[cfg(feature = "std")]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedPacket {
    /// Target device group
    pub group: DeviceGroup,
    /// Intensity buffer as sent
    pub intensities: std::vec::Vec<u8>,
    /// Declared packet duration in milliseconds
    pub duration_ms: u32,
}

/// A sink that records every packet and stop command, for tests and dry runs.
#[cfg(feature = "std")]
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    /// Packets in emission order
    pub packets: std::vec::Vec<RecordedPacket>,
    /// Number of `stop_all` commands received
    pub stops: usize,
}

#[cfg(feature = "std")]
impl MemorySink {
    /// Empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Packets addressed to one group, in emission order.
    pub fn packets_for(&self, group: DeviceGroup) -> impl Iterator<Item = &RecordedPacket> {
        self.packets.iter().filter(move |p| p.group == group)
    }
}

#[cfg(feature = "std")]
impl DeviceSink for MemorySink {
    fn play(&mut self, group: DeviceGroup, intensities: &[u8], duration_ms: u32) {
        self.packets.push(RecordedPacket {
            group,
            intensities: intensities.to_vec(),
            duration_ms,
        });
    }

    fn stop_all(&mut self) {
        self.stops += 1;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(all(test, feature = "std"))]
mod tests {
    use std::vec;

    use super::*;

    #[test]
    fn test_memory_sink_records_in_order() {
        let mut sink = MemorySink::new();
        sink.play(DeviceGroup::Vest, &[0, 50, 100], 150);
        sink.play(DeviceGroup::GloveLeft, &[10], 100);
        sink.stop_all();

        assert_eq!(sink.packets.len(), 2);
        assert_eq!(sink.packets[0].group, DeviceGroup::Vest);
        assert_eq!(sink.packets[0].intensities, vec![0, 50, 100]);
        assert_eq!(sink.packets[1].duration_ms, 100);
        assert_eq!(sink.stops, 1);
        assert_eq!(sink.packets_for(DeviceGroup::Vest).count(), 1);
    }
}
