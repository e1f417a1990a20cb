//! Storage collaborator interface.
//!
//! The FIFO does not own a memory; it drives two independent ports of an
//! external dual-port storage, one per clock domain. The read port is
//! registered: data for a read issued on one read-domain cycle appears a
//! fixed number of cycles later. The occupancy tracker guarantees a slot
//! is never read before its write has become visible, so implementations
//! need no collision arbitration.

use dpram_model::DualPortRam;

/// Dual-port storage with a latency-registered read port.
pub trait DualPortStorage {
    /// Number of slots.
    fn slot_count(&self) -> usize;

    /// Read latency in read-domain cycles (>= 1).
    fn read_latency(&self) -> usize;

    /// Write-domain port: store `data` at `addr` this write-domain cycle.
    fn write_port(&mut self, addr: usize, data: u128);

    /// Read-domain port: advance one read-domain cycle, optionally issuing
    /// a read at `addr`. Returns the completed read from `read_latency()`
    /// cycles ago, if one was issued then. Must be called exactly once per
    /// read-domain cycle.
    fn read_port(&mut self, addr: Option<usize>) -> Option<u128>;

    /// Discard in-flight read results (read-domain reset).
    fn flush_read_port(&mut self);
}

impl DualPortStorage for DualPortRam {
    fn slot_count(&self) -> usize {
        self.slot_count()
    }

    fn read_latency(&self) -> usize {
        self.latency()
    }

    fn write_port(&mut self, addr: usize, data: u128) {
        DualPortRam::write_port(self, addr, data);
    }

    fn read_port(&mut self, addr: Option<usize>) -> Option<u128> {
        DualPortRam::read_port(self, addr)
    }

    fn flush_read_port(&mut self) {
        DualPortRam::flush_read_port(self);
    }
}
