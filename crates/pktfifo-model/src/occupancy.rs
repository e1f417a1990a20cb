//! Occupancy tracking across the two clock domains.
//!
//! Each domain keeps its own progress counters and a synchronized copy of
//! the other domain's Gray-coded counter. Predicates are pessimistic by
//! the synchronizer latency: an item can be reported not-yet-available for
//! up to two cycles after it was committed, but never available early.
//! The asymmetry is what makes an uninitialized-slot read impossible.

use crate::gray::ProgressCounter;
use crate::sync::BusSync;

/// Write-domain half of the occupancy tracker.
///
/// Holds the committed boundary (visible to the read side), the
/// speculative cursor (physically written, may roll back in frame mode),
/// and the synchronized read-side counter. Outside frame mode the two
/// counters advance in lockstep.
#[derive(Debug, Clone)]
pub struct WriteOccupancy {
    pub committed: ProgressCounter,
    pub speculative: ProgressCounter,
    rd_sync: BusSync,
    rd_gray: u32,
    /// Top-two-bits flip for the "one lap ahead" Gray comparison.
    top_flip: u32,
    /// Lap bit of the raw counter (== slot count).
    lap_bit: u32,
}

impl WriteOccupancy {
    pub fn new(slot_count: usize) -> Self {
        // Counter width is one more than the address width.
        let width = slot_count.trailing_zeros() + 1;
        Self {
            committed: ProgressCounter::new(slot_count),
            speculative: ProgressCounter::new(slot_count),
            rd_sync: BusSync::new(),
            rd_gray: 0,
            top_flip: 0b11 << (width - 2),
            lap_bit: slot_count as u32,
        }
    }

    /// Sample the read domain's published Gray counter. Once per
    /// write-domain cycle.
    pub fn sample(&mut self, rd_gray_src: u32) {
        self.rd_gray = self.rd_sync.step(rd_gray_src);
    }

    /// Committed boundary is exactly one lap ahead of the synchronized
    /// read position: Gray codes equal except the top two bits.
    pub fn full(&self) -> bool {
        self.rd_gray == (self.committed.gray() ^ self.top_flip)
    }

    /// Same comparison against the speculative cursor; detects imminent
    /// overflow before the in-progress frame commits.
    pub fn full_cur(&self) -> bool {
        self.rd_gray == (self.speculative.gray() ^ self.top_flip)
    }

    /// The in-progress frame's span equals the whole storage: the
    /// speculative cursor is one lap ahead of the committed boundary.
    /// Both counters are local, so this compares raw values.
    pub fn frame_spans_storage(&self) -> bool {
        self.speculative.raw() == (self.committed.raw() ^ self.lap_bit)
    }

    /// Reset both counters to the origin. The synchronizer keeps running;
    /// reset never reaches into the other domain's registers.
    pub fn clear(&mut self) {
        self.committed.clear();
        self.speculative.clear();
    }
}

/// Read-domain half of the occupancy tracker.
///
/// The cursor advances when a storage read is issued, not when the item
/// leaves the staging pipeline; a slot is free for reuse as soon as its
/// contents are safely in flight toward the pipeline.
#[derive(Debug, Clone)]
pub struct ReadOccupancy {
    pub cursor: ProgressCounter,
    wr_sync: BusSync,
    wr_gray: u32,
}

impl ReadOccupancy {
    pub fn new(slot_count: usize) -> Self {
        Self {
            cursor: ProgressCounter::new(slot_count),
            wr_sync: BusSync::new(),
            wr_gray: 0,
        }
    }

    /// Sample the write domain's published committed-boundary Gray
    /// counter. Once per read-domain cycle.
    pub fn sample(&mut self, wr_gray_src: u32) {
        self.wr_gray = self.wr_sync.step(wr_gray_src);
    }

    /// Nothing committed beyond the read cursor.
    pub fn empty(&self) -> bool {
        self.cursor.gray() == self.wr_gray
    }

    /// Reset the cursor to the origin.
    pub fn clear(&mut self) {
        self.cursor.clear();
    }
}
