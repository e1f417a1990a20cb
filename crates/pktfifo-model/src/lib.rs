//! Cycle-accurate digital twin of a dual-clock, frame-aware SPSC FIFO.
//!
//! Models a bounded queue that moves items between two free-running clock
//! domains sharing no common notion of time. Occupancy state crosses
//! between the domains as Gray-coded counters through two-stage
//! synchronizers; status events (overflow, bad frame, good frame) cross
//! as toggle-encoded pulses. In frame mode, items group into frames
//! delimited by an end-of-frame marker and the FIFO admits, forwards or
//! discards whole frames atomically: the boundary visible to the reader
//! advances only when a frame's fate is resolved.
//!
//! Storage is an external collaborator behind [`storage::DualPortStorage`]
//! (see the `dpram-model` crate for the reference implementation). The
//! two domains are stepped explicitly: callers interleave
//! [`fifo::PacketFifo::step_write`] and [`fifo::PacketFifo::step_read`]
//! in whatever ratio models their clocks, or use [`sim::Simulation`] for
//! a scripted run.

pub mod config;
pub mod fifo;
pub mod gray;
pub mod occupancy;
pub mod read_ctrl;
pub mod record;
pub mod sim;
pub mod status;
pub mod storage;
pub mod sync;
pub mod write_ctrl;

pub use config::{ConfigError, FifoConfig};
pub use fifo::PacketFifo;
pub use record::Item;
pub use status::StatusPulses;
pub use storage::DualPortStorage;
