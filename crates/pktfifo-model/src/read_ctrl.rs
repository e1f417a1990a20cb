//! Output staging pipeline (read domain).
//!
//! A depth-P pipeline of pending results decouples the storage read
//! latency from consumer backpressure: reads are issued against storage
//! whenever a stage is free net of in-flight reads, and completed reads
//! queue up behind the head in commit order. Items leave strictly in the
//! order the admission controller committed them.
//!
//! If a reset lands while a frame is mid-delivery (some items handed to
//! the consumer, end marker not yet), the pipeline is flushed and a
//! synthetic terminator is injected: end-of-frame set, status carrying the
//! configured bad-frame pattern. Every frame the consumer sees started is
//! therefore seen terminated.

use std::collections::VecDeque;

use crate::config::FifoConfig;
use crate::occupancy::ReadOccupancy;
use crate::record::{Item, RecordLayout};
use crate::status::{StatusMirror, StatusPulses};
use crate::storage::DualPortStorage;
use crate::sync::ResetSync;

/// Inputs sampled by the read domain on one of its cycles.
#[derive(Debug, Clone, Copy)]
pub struct ReadCycleIn {
    /// Consumer accepts the head item this cycle.
    pub ready: bool,
    /// Read-domain external reset (asynchronous assert).
    pub reset: bool,
    /// The write domain's synchronized reset level, crossed in.
    pub remote_reset: bool,
    /// The write domain's published committed-boundary Gray code.
    pub wr_gray: u32,
    /// The write domain's status toggle levels.
    pub status_toggles: (bool, bool, bool),
}

/// Outputs of one read-domain cycle.
#[derive(Debug, Clone, Copy)]
pub struct ReadCycleOut {
    /// Item handed to the consumer this cycle, if any.
    pub delivered: Option<Item>,
    /// Write-domain status events, reconstructed in this domain.
    pub pulses: StatusPulses,
}

/// One staging slot: an unpacked item plus the synthetic-terminator flag.
#[derive(Debug, Clone, Copy)]
struct Stage {
    item: Item,
    synthetic: bool,
}

#[derive(Debug)]
pub struct ReadCtrl {
    occ: ReadOccupancy,
    layout: RecordLayout,
    mirror: StatusMirror,
    rst_local: ResetSync,
    rst_remote: ResetSync,

    depth: usize,
    /// Bad-frame status pattern stamped on synthetic terminators.
    bad_value: u32,

    /// Pending results, head first. Never longer than `depth`.
    staged: VecDeque<Stage>,
    /// Reads issued to storage, not yet completed.
    in_flight: usize,
    /// A frame has started delivery and its end marker has not left yet.
    mid_frame: bool,
    /// A terminator is owed to the consumer once the reset level drops.
    pending_terminator: bool,
}

impl ReadCtrl {
    pub fn new(cfg: &FifoConfig) -> Self {
        Self {
            occ: ReadOccupancy::new(cfg.slot_count()),
            layout: RecordLayout::new(cfg),
            mirror: StatusMirror::new(),
            rst_local: ResetSync::new(),
            rst_remote: ResetSync::new(),
            depth: cfg.pipeline_depth,
            bad_value: cfg.bad_frame_value,
            staged: VecDeque::with_capacity(cfg.pipeline_depth),
            in_flight: 0,
            mid_frame: false,
            pending_terminator: false,
        }
    }

    /// Registered item-valid for the current cycle.
    pub fn valid(&self) -> bool {
        !self.staged.is_empty()
    }

    /// Head item visible this cycle, if any.
    pub fn peek(&self) -> Option<&Item> {
        self.staged.front().map(|s| &s.item)
    }

    /// Read-cursor Gray code, published for crossing to the write domain.
    pub fn cursor_gray(&self) -> u32 {
        self.occ.cursor.gray()
    }

    /// Synchronized local reset level, published for crossing to the
    /// write domain.
    pub fn reset_level(&self) -> bool {
        self.rst_local.value()
    }

    /// Advance one read-domain cycle.
    pub fn step<S: DualPortStorage>(&mut self, input: &ReadCycleIn, storage: &mut S) -> ReadCycleOut {
        self.occ.sample(input.wr_gray);
        let pulses = self.mirror.step(input.status_toggles);
        let rst = self.rst_local.step(input.reset) | self.rst_remote.step(input.remote_reset);

        // Drain the head first; completions this cycle become visible
        // next cycle, like a registered pipeline stage.
        let mut delivered = None;
        if input.ready {
            if let Some(head) = self.staged.pop_front() {
                if head.synthetic {
                    log::debug!("delivering synthetic frame terminator");
                }
                self.mid_frame = !head.item.eof;
                delivered = Some(head.item);
            }
        }

        let mut issue = None;
        if rst {
            // Stale results belong to a stream that is being torn down.
            // The flush repeats on every reset cycle, so the terminator is
            // only latched here and staged after the level drops.
            self.staged.clear();
            storage.flush_read_port();
            self.in_flight = 0;
            self.occ.clear();
            if self.mid_frame {
                log::debug!("reset mid-frame: frame terminator owed");
                self.pending_terminator = true;
                self.mid_frame = false;
            }
        } else {
            if self.pending_terminator {
                self.staged.push_back(Stage {
                    item: Item {
                        eof: true,
                        status: self.bad_value,
                        ..Item::default()
                    },
                    synthetic: true,
                });
                self.pending_terminator = false;
            }
            if self.staged.len() + self.in_flight < self.depth && !self.occ.empty() {
                issue = Some(self.occ.cursor.slot());
                self.occ.cursor.advance();
                self.in_flight += 1;
            }
        }

        if let Some(rec) = storage.read_port(issue) {
            self.in_flight -= 1;
            self.staged.push_back(Stage {
                item: self.layout.unpack(rec),
                synthetic: false,
            });
        }

        ReadCycleOut { delivered, pulses }
    }
}
