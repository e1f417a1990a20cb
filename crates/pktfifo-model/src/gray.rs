//! Race-safe (Gray) coding for progress counters.
//!
//! A progress counter is one bit wider than the slot address space and
//! wraps modulo twice the slot count. The low bits address a slot; the
//! extra lap bit distinguishes full from empty when the low bits of the
//! write and read counters coincide.
//!
//! Counters are crossed between clock domains in Gray code: consecutive
//! counter values differ in exactly one code bit, so a value sampled
//! mid-transition is either the old or the new value, never a third one.

/// Encode a binary value as Gray code.
#[inline]
pub fn encode(bin: u32) -> u32 {
    bin ^ (bin >> 1)
}

/// Decode a Gray code back to binary.
#[inline]
pub fn decode(gray: u32) -> u32 {
    let mut bin = gray;
    let mut shift = 1;
    while shift < u32::BITS {
        bin ^= bin >> shift;
        shift <<= 1;
    }
    bin
}

/// A slot-addressing progress counter, one bit wider than the address
/// space, wrapping modulo `2 * slot_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressCounter {
    value: u32,
    /// `2 * slot_count - 1`; slot_count is a power of two.
    wrap_mask: u32,
}

impl ProgressCounter {
    /// Counter for a FIFO with `slot_count` slots (a power of two, >= 2).
    pub fn new(slot_count: usize) -> Self {
        debug_assert!(slot_count.is_power_of_two() && slot_count >= 2);
        Self {
            value: 0,
            wrap_mask: (2 * slot_count as u32) - 1,
        }
    }

    /// Raw counter value, in `0 .. 2 * slot_count`.
    #[inline]
    pub fn raw(&self) -> u32 {
        self.value
    }

    /// Slot addressed by the counter's low bits.
    #[inline]
    pub fn slot(&self) -> usize {
        (self.value & (self.wrap_mask >> 1)) as usize
    }

    /// Gray code of the raw value, safe to cross between domains.
    #[inline]
    pub fn gray(&self) -> u32 {
        encode(self.value)
    }

    /// Advance by one item.
    #[inline]
    pub fn advance(&mut self) {
        self.value = (self.value + 1) & self.wrap_mask;
    }

    /// Reset to the origin.
    #[inline]
    pub fn clear(&mut self) {
        self.value = 0;
    }

    /// Copy another counter's position (speculative-cursor rollback and
    /// committed-boundary advance).
    #[inline]
    pub fn set_to(&mut self, other: &ProgressCounter) {
        self.value = other.value;
    }
}
