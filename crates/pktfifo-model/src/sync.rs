//! Cross-domain synchronizer primitives.
//!
//! Each primitive is owned by its destination domain and stepped once per
//! destination cycle, sampling a register that only changes on source
//! domain cycles. Two register stages bound metastability the way a
//! two-flop synchronizer does in hardware: the destination observes any
//! source value within two of its own cycles, and never observes a torn
//! intermediate (multi-bit values must be Gray-coded by the caller).
//!
//! These primitives cannot fail; they only add latency. Occupancy
//! predicates built on them are therefore pessimistic by up to two
//! destination cycles.

/// Two-stage synchronizer for an N-bit Gray-coded bus.
#[derive(Debug, Clone, Copy, Default)]
pub struct BusSync {
    stages: [u32; 2],
}

impl BusSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one destination cycle, sampling `source` (the value the
    /// source domain's register currently holds). Returns the synchronized
    /// value visible in the destination domain this cycle.
    pub fn step(&mut self, source: u32) -> u32 {
        self.stages[1] = self.stages[0];
        self.stages[0] = source;
        self.stages[1]
    }

    /// Synchronized value without advancing.
    pub fn value(&self) -> u32 {
        self.stages[1]
    }
}

/// Destination half of a toggle-crossed event pulse.
///
/// The source domain flips a toggle register on each pulse (see
/// [`crate::status::StatusReporter`]). The destination double-registers the
/// toggle and XORs it against the previous synchronized value, turning the
/// level change back into a one-cycle pulse.
#[derive(Debug, Clone, Copy, Default)]
pub struct PulseSync {
    stages: [bool; 2],
    prev: bool,
}

impl PulseSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one destination cycle. Returns true for exactly one cycle
    /// per source-domain toggle.
    pub fn step(&mut self, source_toggle: bool) -> bool {
        self.prev = self.stages[1];
        self.stages[1] = self.stages[0];
        self.stages[0] = source_toggle;
        self.stages[1] != self.prev
    }
}

/// Reset re-registration into a domain.
///
/// An external reset arrives asynchronously; two stages make its release
/// synchronous to the destination domain. Also used to import the other
/// domain's reset so each side can observe its peer vanishing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResetSync {
    stages: [bool; 2],
}

impl ResetSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one destination cycle. Returns the synchronized reset level.
    pub fn step(&mut self, reset_in: bool) -> bool {
        self.stages[1] = self.stages[0];
        self.stages[0] = reset_in;
        self.stages[1]
    }

    /// Synchronized level without advancing.
    pub fn value(&self) -> bool {
        self.stages[1]
    }
}
