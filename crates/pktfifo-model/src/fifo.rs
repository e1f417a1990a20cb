//! Top-level dual-clock packet FIFO.
//!
//! Owns the write-domain admission controller, the read-domain staging
//! pipeline and the storage collaborator, and wires the cross-domain
//! signals between them: committed-boundary and read-cursor Gray codes,
//! status toggles, and each side's synchronized reset level.
//!
//! The two domains are stepped independently. `step_write` advances one
//! write-domain cycle, `step_read` one read-domain cycle; callers
//! interleave them in whatever ratio models their clock relationship.
//! Producer and consumer handshakes are two-signal valid/ready: a
//! transfer happens on a cycle where the presenting side asserts valid
//! and this side's registered ready (or vice versa) holds.

use crate::config::{ConfigError, FifoConfig};
use crate::read_ctrl::{ReadCtrl, ReadCycleIn, ReadCycleOut};
use crate::record::Item;
use crate::storage::DualPortStorage;
use crate::write_ctrl::{WriteCtrl, WriteCycleIn, WriteCycleOut};

/// Dual-clock frame-aware SPSC FIFO over an external dual-port storage.
#[derive(Debug)]
pub struct PacketFifo<S: DualPortStorage> {
    cfg: FifoConfig,
    storage: S,
    write: WriteCtrl,
    read: ReadCtrl,
}

impl<S: DualPortStorage> PacketFifo<S> {
    /// Build a FIFO over `storage`. The configuration is validated here;
    /// an invalid policy combination can never become a running FIFO.
    pub fn new(cfg: FifoConfig, storage: S) -> Result<Self, ConfigError> {
        cfg.validate()?;
        if storage.slot_count() < cfg.slot_count() {
            return Err(ConfigError::StorageTooSmall {
                need: cfg.slot_count(),
                got: storage.slot_count(),
            });
        }
        Ok(Self {
            write: WriteCtrl::new(&cfg),
            read: ReadCtrl::new(&cfg),
            cfg,
            storage,
        })
    }

    pub fn config(&self) -> &FifoConfig {
        &self.cfg
    }

    /// Producer-side space-ready for the current write-domain cycle.
    pub fn producer_ready(&self) -> bool {
        self.write.ready()
    }

    /// Consumer-side item-valid for the current read-domain cycle.
    pub fn consumer_valid(&self) -> bool {
        self.read.valid()
    }

    /// Head item the consumer would receive, without accepting it.
    pub fn peek(&self) -> Option<&Item> {
        self.read.peek()
    }

    /// Advance one write-domain cycle. The offered item is consumed only
    /// if `valid` and the producer-side ready both held; check
    /// `WriteCycleOut::accepted`.
    pub fn step_write(&mut self, valid: bool, item: Item, reset: bool) -> WriteCycleOut {
        let input = WriteCycleIn {
            valid,
            item,
            reset,
            remote_reset: self.read.reset_level(),
            rd_gray: self.read.cursor_gray(),
        };
        self.write.step(&input, &mut self.storage)
    }

    /// Advance one write-domain cycle with no item offered.
    pub fn step_write_idle(&mut self) -> WriteCycleOut {
        self.step_write(false, Item::default(), false)
    }

    /// Advance one read-domain cycle. `ready` is the consumer's
    /// acceptance of the current head.
    pub fn step_read(&mut self, ready: bool, reset: bool) -> ReadCycleOut {
        let input = ReadCycleIn {
            ready,
            reset,
            remote_reset: self.write.reset_level(),
            wr_gray: self.write.committed_gray(),
            status_toggles: self.write.status_toggles(),
        };
        self.read.step(&input, &mut self.storage)
    }
}
