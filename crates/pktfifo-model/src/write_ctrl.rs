//! Frame admission controller (write domain).
//!
//! Decides, per offered item, whether to admit it into the in-progress
//! frame, discard it, or resolve the frame's fate. Outside frame mode the
//! committed boundary and the speculative cursor are the same position and
//! every item commits immediately. In frame mode the committed boundary
//! advances only when a frame's fate is resolved: commit on a good end
//! marker, rollback on a bad one or on a policy drop, cut-through when a
//! frame outgrows storage and oversize dropping is disabled.
//!
//! The drop decision keeps a fixed priority: an already-dropping frame
//! first, then a full queue under the drop-when-full policy, then an
//! oversize frame under the oversize-drop policy. The order is observable
//! and must not be rearranged.

use crate::config::FifoConfig;
use crate::occupancy::WriteOccupancy;
use crate::record::{Item, RecordLayout};
use crate::status::{StatusPulses, StatusReporter};
use crate::storage::DualPortStorage;
use crate::sync::ResetSync;

/// Inputs sampled by the write domain on one of its cycles.
#[derive(Debug, Clone, Copy)]
pub struct WriteCycleIn {
    /// Producer presents an item.
    pub valid: bool,
    /// The offered item (ignored unless `valid`).
    pub item: Item,
    /// Write-domain external reset (asynchronous assert).
    pub reset: bool,
    /// The read domain's synchronized reset level, crossed in.
    pub remote_reset: bool,
    /// The read domain's published Gray cursor.
    pub rd_gray: u32,
}

/// Outputs of one write-domain cycle.
#[derive(Debug, Clone, Copy)]
pub struct WriteCycleOut {
    /// The offered item was consumed this cycle (admitted or deliberately
    /// discarded).
    pub accepted: bool,
    /// Write-domain status pulses raised this cycle.
    pub pulses: StatusPulses,
}

#[derive(Debug)]
pub struct WriteCtrl {
    occ: WriteOccupancy,
    layout: RecordLayout,
    reporter: StatusReporter,
    rst_local: ResetSync,
    rst_remote: ResetSync,

    frame_mode: bool,
    drop_oversize: bool,
    drop_bad: bool,
    drop_when_full: bool,
    bad_value: u32,
    bad_mask: u32,

    /// Registered space-ready the producer observes this cycle.
    ready: bool,
    /// Current frame is being discarded through to its end marker.
    dropping: bool,
    /// At least one item of the current frame admitted, end marker not
    /// yet seen.
    frame_open: bool,
}

impl WriteCtrl {
    pub fn new(cfg: &FifoConfig) -> Self {
        Self {
            occ: WriteOccupancy::new(cfg.slot_count()),
            layout: RecordLayout::new(cfg),
            reporter: StatusReporter::new(),
            rst_local: ResetSync::new(),
            rst_remote: ResetSync::new(),
            frame_mode: cfg.frame_mode,
            drop_oversize: cfg.drop_oversize_frame,
            drop_bad: cfg.drop_bad_frame,
            drop_when_full: cfg.drop_when_full,
            bad_value: cfg.bad_frame_value,
            bad_mask: cfg.bad_frame_mask,
            ready: true,
            dropping: false,
            frame_open: false,
        }
    }

    /// Registered space-ready for the current cycle.
    pub fn ready(&self) -> bool {
        self.ready
    }

    /// Committed-boundary Gray code, published for crossing to the read
    /// domain.
    pub fn committed_gray(&self) -> u32 {
        self.occ.committed.gray()
    }

    /// Synchronized local reset level, published for crossing to the read
    /// domain.
    pub fn reset_level(&self) -> bool {
        self.rst_local.value()
    }

    /// Status toggle levels, published for crossing to the read domain.
    pub fn status_toggles(&self) -> (bool, bool, bool) {
        self.reporter.toggles()
    }

    /// Advance one write-domain cycle.
    pub fn step<S: DualPortStorage>(&mut self, input: &WriteCycleIn, storage: &mut S) -> WriteCycleOut {
        self.occ.sample(input.rd_gray);
        let rst = self.rst_local.step(input.reset) | self.rst_remote.step(input.remote_reset);

        let mut pulses = StatusPulses::default();
        let mut accepted = false;

        if rst {
            // Abort non-committed write activity. A mid-flight frame's
            // remaining items are still on the wire; latch a drop so they
            // are discarded instead of partially admitted.
            if self.frame_open {
                log::debug!("write reset mid-frame: latching frame drop");
                self.dropping = true;
                self.frame_open = false;
            }
            self.occ.clear();
        } else if input.valid && self.ready {
            accepted = true;
            if self.frame_mode {
                pulses = self.admit_frame_item(&input.item, storage);
            } else {
                let slot = self.occ.speculative.slot();
                storage.write_port(slot, self.layout.pack(&input.item));
                self.occ.speculative.advance();
                self.occ.committed.set_to(&self.occ.speculative);
            }
        }

        // Cut-through on overflow: with no drop policy, a frame that runs
        // the queue full forwards its written prefix so the reader can
        // drain and free space for the remainder.
        if !rst && self.frame_mode && !self.drop_oversize && self.occ.full_cur() {
            self.occ.committed.set_to(&self.occ.speculative);
        }

        self.reporter.record(pulses);

        // Registered ready for the next cycle.
        self.ready = !rst
            && if self.frame_mode {
                !self.occ.full_cur()
                    || (self.occ.frame_spans_storage() && self.drop_oversize)
                    || self.drop_when_full
            } else {
                !self.occ.full()
            };

        WriteCycleOut { accepted, pulses }
    }

    /// Frame-mode admission for one consumed item. Priority order:
    /// already dropping, then full queue under drop-when-full, then
    /// oversize under drop-oversize.
    fn admit_frame_item<S: DualPortStorage>(&mut self, item: &Item, storage: &mut S) -> StatusPulses {
        let mut pulses = StatusPulses::default();

        let must_drop = self.dropping
            || (self.occ.full_cur() && self.drop_when_full)
            || (self.occ.frame_spans_storage() && self.drop_oversize);

        if must_drop {
            if !self.dropping {
                log::debug!(
                    "dropping frame: {}",
                    if self.occ.frame_spans_storage() {
                        "oversize"
                    } else {
                        "queue full"
                    }
                );
            }
            self.dropping = true;
            self.frame_open = !item.eof;
            if item.eof {
                // Frame fate resolved: discard everything written so far.
                self.dropping = false;
                self.occ.speculative.set_to(&self.occ.committed);
                pulses.overflow = true;
            }
            return pulses;
        }

        let slot = self.occ.speculative.slot();
        storage.write_port(slot, self.layout.pack(item));
        self.occ.speculative.advance();

        if item.eof {
            self.frame_open = false;
            let bad =
                self.drop_bad && (item.status & self.bad_mask) == (self.bad_value & self.bad_mask);
            if bad {
                log::debug!("dropping frame: bad status {:#x}", item.status);
                self.occ.speculative.set_to(&self.occ.committed);
                pulses.bad_frame = true;
            } else {
                self.occ.committed.set_to(&self.occ.speculative);
                pulses.good_frame = true;
            }
        } else {
            self.frame_open = true;
        }
        pulses
    }
}
