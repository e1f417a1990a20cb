//! Cycle model of a simple dual-port RAM.
//!
//! Models a memory with two physically independent ports: a write port
//! clocked by one domain and a read port clocked by the other. The read
//! port is registered with a fixed latency: data for a read issued on
//! cycle `t` appears on the output on cycle `t + latency`.
//!
//! The model makes no attempt to arbitrate same-slot collisions between
//! the ports. Callers are expected to guarantee, through their own
//! occupancy accounting, that a slot is never read before its write has
//! become visible.

/// Dual-port RAM with a registered read port.
///
/// Each slot holds one 128-bit word. `read_port` must be called exactly
/// once per read-domain cycle; `write_port` at most once per write-domain
/// cycle.
#[derive(Debug, Clone)]
pub struct DualPortRam {
    slots: Vec<u128>,
    /// Read pipeline, one entry per latency stage. Front is the oldest.
    pipe: std::collections::VecDeque<Option<u128>>,
    latency: usize,
}

impl DualPortRam {
    /// Create a RAM with `slot_count` slots and the given read latency
    /// (in read-domain cycles, minimum 1).
    ///
    /// # Panics
    ///
    /// Panics if `slot_count` is zero or `latency` is zero; both are
    /// structural parameters fixed by the instantiating design.
    pub fn new(slot_count: usize, latency: usize) -> Self {
        assert!(slot_count > 0, "dual-port RAM needs at least one slot");
        assert!(latency > 0, "read port is registered; latency must be >= 1");
        Self {
            slots: vec![0; slot_count],
            pipe: std::collections::VecDeque::from(vec![None; latency]),
            latency,
        }
    }

    /// Number of slots.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Read latency in read-domain cycles.
    pub fn latency(&self) -> usize {
        self.latency
    }

    /// Write-domain port: store `data` at `addr` this cycle.
    pub fn write_port(&mut self, addr: usize, data: u128) {
        self.slots[addr] = data;
    }

    /// Read-domain port: advance the read pipeline one cycle.
    ///
    /// `addr` issues a new read this cycle (or `None` for an idle cycle).
    /// Returns the data for the read issued `latency` cycles ago, if any.
    /// The array is sampled at issue time, matching a registered
    /// read-first port.
    pub fn read_port(&mut self, addr: Option<usize>) -> Option<u128> {
        self.pipe.push_back(addr.map(|a| self.slots[a]));
        self.pipe.pop_front().flatten()
    }

    /// Clear the in-flight read pipeline (read-domain reset). Stored data
    /// is unaffected; only pending read results are discarded.
    pub fn flush_read_port(&mut self) {
        for stage in self.pipe.iter_mut() {
            *stage = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_returns_after_latency() {
        let mut ram = DualPortRam::new(8, 2);
        ram.write_port(3, 0xDEAD_BEEF);

        assert_eq!(ram.read_port(Some(3)), None, "cycle 0: issue");
        assert_eq!(ram.read_port(None), None, "cycle 1: in flight");
        assert_eq!(ram.read_port(None), Some(0xDEAD_BEEF), "cycle 2: data out");
    }

    #[test]
    fn latency_one_returns_next_cycle() {
        let mut ram = DualPortRam::new(4, 1);
        ram.write_port(0, 7);

        assert_eq!(ram.read_port(Some(0)), None);
        assert_eq!(ram.read_port(None), Some(7));
    }

    #[test]
    fn back_to_back_reads_stay_ordered() {
        let mut ram = DualPortRam::new(4, 1);
        ram.write_port(0, 10);
        ram.write_port(1, 11);
        ram.write_port(2, 12);

        assert_eq!(ram.read_port(Some(0)), None);
        assert_eq!(ram.read_port(Some(1)), Some(10));
        assert_eq!(ram.read_port(Some(2)), Some(11));
        assert_eq!(ram.read_port(None), Some(12));
        assert_eq!(ram.read_port(None), None);
    }

    #[test]
    fn sample_at_issue_ignores_later_writes() {
        let mut ram = DualPortRam::new(4, 2);
        ram.write_port(1, 1);
        assert_eq!(ram.read_port(Some(1)), None);
        // Overwrite after the read was issued; the read sees the old value.
        ram.write_port(1, 2);
        assert_eq!(ram.read_port(None), None);
        assert_eq!(ram.read_port(None), Some(1));
    }

    #[test]
    fn flush_discards_in_flight_results() {
        let mut ram = DualPortRam::new(4, 2);
        ram.write_port(0, 42);
        assert_eq!(ram.read_port(Some(0)), None);
        ram.flush_read_port();
        assert_eq!(ram.read_port(None), None);
        assert_eq!(ram.read_port(None), None, "flushed read never completes");
    }
}
