//! Deterministic two-domain simulation harness.
//!
//! Interleaves write-domain and read-domain cycles on a shared abstract
//! timeline at a configurable period ratio, drives a scripted producer
//! against the FIFO's handshake, applies a consumer backpressure pattern,
//! and collects delivered items and status events per domain. Used by the
//! integration tests and the CLI scenario runner; the FIFO itself never
//! sees this code.

use std::collections::VecDeque;

use crate::fifo::PacketFifo;
use crate::record::Item;
use crate::status::StatusPulses;
use crate::storage::DualPortStorage;

/// Clocking and backpressure for a simulation run.
#[derive(Debug, Clone, Copy)]
pub struct SimOptions {
    /// Abstract time units per write-domain cycle.
    pub write_period: u32,
    /// Abstract time units per read-domain cycle.
    pub read_period: u32,
    /// Consumer asserts ready on one read cycle in this many (1 = always).
    pub consumer_ready_every: u32,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            write_period: 1,
            read_period: 1,
            consumer_ready_every: 1,
        }
    }
}

/// Event totals observed in one domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventCounts {
    pub overflow: u32,
    pub bad_frame: u32,
    pub good_frame: u32,
}

impl EventCounts {
    fn add(&mut self, p: StatusPulses) {
        self.overflow += p.overflow as u32;
        self.bad_frame += p.bad_frame as u32;
        self.good_frame += p.good_frame as u32;
    }
}

/// Scripted producer, patterned consumer, and the FIFO under simulation.
#[derive(Debug)]
pub struct Simulation<S: DualPortStorage> {
    fifo: PacketFifo<S>,
    opts: SimOptions,
    pending: VecDeque<Item>,
    delivered: Vec<Item>,
    producer_events: EventCounts,
    consumer_events: EventCounts,
    time: u64,
    read_cycles: u64,
}

impl<S: DualPortStorage> Simulation<S> {
    pub fn new(fifo: PacketFifo<S>, opts: SimOptions) -> Self {
        Self {
            fifo,
            opts,
            pending: VecDeque::new(),
            delivered: Vec::new(),
            producer_events: EventCounts::default(),
            consumer_events: EventCounts::default(),
            time: 0,
            read_cycles: 0,
        }
    }

    /// Queue a single item for the producer to offer.
    pub fn push_item(&mut self, item: Item) {
        self.pending.push_back(item);
    }

    /// Queue a frame: one item per payload, end-of-frame on the last,
    /// whose status is `last_status`.
    ///
    /// # Panics
    ///
    /// Panics on an empty payload slice; a frame has at least one item.
    pub fn push_frame(&mut self, payloads: &[u64], last_status: u32) {
        let (last, body) = payloads.split_last().expect("frame needs at least one item");
        for &p in body {
            self.pending.push_back(Item::data(p));
        }
        self.pending.push_back(Item::last_with_status(*last, last_status));
    }

    /// Advance the timeline by `units` abstract time units.
    pub fn run(&mut self, units: u64) {
        for _ in 0..units {
            if self.time % u64::from(self.opts.write_period) == 0 {
                self.step_producer();
            }
            if self.time % u64::from(self.opts.read_period) == 0 {
                self.step_consumer();
            }
            self.time += 1;
        }
    }

    /// Run until nothing has been delivered or accepted for `quiet` time
    /// units, up to `max_units`. Returns true if the run went quiet.
    pub fn run_until_idle(&mut self, quiet: u64, max_units: u64) -> bool {
        let mut spent = 0;
        loop {
            let before = (self.delivered.len(), self.pending.len());
            self.run(quiet);
            spent += quiet;
            if (self.delivered.len(), self.pending.len()) == before {
                return true;
            }
            if spent >= max_units {
                return false;
            }
        }
    }

    fn step_producer(&mut self) {
        let offer = self.pending.front().copied();
        let out = match offer {
            Some(item) => self.fifo.step_write(true, item, false),
            None => self.fifo.step_write_idle(),
        };
        if out.accepted {
            self.pending.pop_front();
        }
        self.producer_events.add(out.pulses);
    }

    fn step_consumer(&mut self) {
        let ready = self.read_cycles % u64::from(self.opts.consumer_ready_every) == 0;
        self.read_cycles += 1;
        let out = self.fifo.step_read(ready, false);
        if let Some(item) = out.delivered {
            self.delivered.push(item);
        }
        self.consumer_events.add(out.pulses);
    }

    /// Items delivered to the consumer so far, in delivery order.
    pub fn delivered(&self) -> &[Item] {
        &self.delivered
    }

    /// Items the producer has not yet managed to offer successfully.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Event totals seen in the write domain.
    pub fn producer_events(&self) -> EventCounts {
        self.producer_events
    }

    /// Event totals seen in the read domain (mirrored).
    pub fn consumer_events(&self) -> EventCounts {
        self.consumer_events
    }

    /// Access the FIFO under simulation.
    pub fn fifo(&self) -> &PacketFifo<S> {
        &self.fifo
    }

    pub fn fifo_mut(&mut self) -> &mut PacketFifo<S> {
        &mut self.fifo
    }
}
