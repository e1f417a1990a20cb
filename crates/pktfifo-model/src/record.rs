//! Item sideband fields and the packed storage record.
//!
//! One item occupies one storage slot as a single 128-bit record. Field
//! offsets depend on which sideband fields the configuration enables, so
//! the layout is computed once at construction rather than baked into
//! constants. Disabled fields occupy no record bits and unpack as zero.

use crate::config::FifoConfig;

/// One queue item: payload plus optional sideband fields.
///
/// Fields whose configured width is zero are ignored on pack and returned
/// as zero on unpack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Item {
    /// Opaque payload, up to 64 bits.
    pub payload: u64,
    /// Byte keep mask.
    pub keep: u32,
    /// End-of-frame marker. Always carried.
    pub eof: bool,
    /// Source id.
    pub id: u32,
    /// Destination id.
    pub dest: u32,
    /// User/status bits; the final item's status decides frame fate.
    pub status: u32,
}

impl Item {
    /// Plain data item.
    pub fn data(payload: u64) -> Self {
        Self {
            payload,
            ..Self::default()
        }
    }

    /// Data item carrying the end-of-frame marker.
    pub fn last(payload: u64) -> Self {
        Self {
            payload,
            eof: true,
            ..Self::default()
        }
    }

    /// End-of-frame item with a status value.
    pub fn last_with_status(payload: u64, status: u32) -> Self {
        Self {
            payload,
            eof: true,
            status,
            ..Self::default()
        }
    }
}

/// Field layout of the packed record for one configuration.
///
/// Layout, low to high: payload, keep, id, dest, status, eof.
#[derive(Debug, Clone, Copy)]
pub struct RecordLayout {
    payload_off: u32,
    payload_mask: u128,
    keep_off: u32,
    keep_mask: u128,
    id_off: u32,
    id_mask: u128,
    dest_off: u32,
    dest_mask: u128,
    status_off: u32,
    status_mask: u128,
    eof_off: u32,
}

fn mask(bits: u32) -> u128 {
    if bits == 0 {
        0
    } else {
        (1u128 << bits) - 1
    }
}

impl RecordLayout {
    pub fn new(cfg: &FifoConfig) -> Self {
        let payload_off = 0;
        let keep_off = payload_off + cfg.payload_bits;
        let id_off = keep_off + cfg.keep_bits;
        let dest_off = id_off + cfg.id_bits;
        let status_off = dest_off + cfg.dest_bits;
        let eof_off = status_off + cfg.status_bits;
        Self {
            payload_off,
            payload_mask: mask(cfg.payload_bits),
            keep_off,
            keep_mask: mask(cfg.keep_bits),
            id_off,
            id_mask: mask(cfg.id_bits),
            dest_off,
            dest_mask: mask(cfg.dest_bits),
            status_off,
            status_mask: mask(cfg.status_bits),
            eof_off,
        }
    }

    /// Total record width in bits, eof included.
    pub fn record_bits(&self) -> u32 {
        self.eof_off + 1
    }

    /// Pack an item into a storage record. Field values are truncated to
    /// their configured widths.
    pub fn pack(&self, item: &Item) -> u128 {
        let mut rec = 0u128;
        rec |= (item.payload as u128 & self.payload_mask) << self.payload_off;
        rec |= (item.keep as u128 & self.keep_mask) << self.keep_off;
        rec |= (item.id as u128 & self.id_mask) << self.id_off;
        rec |= (item.dest as u128 & self.dest_mask) << self.dest_off;
        rec |= (item.status as u128 & self.status_mask) << self.status_off;
        rec |= (item.eof as u128) << self.eof_off;
        rec
    }

    /// Unpack a storage record.
    pub fn unpack(&self, rec: u128) -> Item {
        Item {
            payload: ((rec >> self.payload_off) & self.payload_mask) as u64,
            keep: ((rec >> self.keep_off) & self.keep_mask) as u32,
            id: ((rec >> self.id_off) & self.id_mask) as u32,
            dest: ((rec >> self.dest_off) & self.dest_mask) as u32,
            status: ((rec >> self.status_off) & self.status_mask) as u32,
            eof: (rec >> self.eof_off) & 1 != 0,
        }
    }
}
