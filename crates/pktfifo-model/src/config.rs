//! Construction-time configuration.
//!
//! Every parameter is fixed when the FIFO is built. Invalid policy
//! combinations are rejected here; nothing is re-checked on the data path.

/// Errors raised when a configuration cannot be instantiated.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Capacity of zero slots.
    #[error("capacity must be at least 1 item")]
    ZeroCapacity,

    /// Output staging pipeline must hold at least one pending result.
    #[error("pipeline depth must be at least 1")]
    ZeroPipelineDepth,

    /// Payload must fit the 64-bit record field and cannot be empty.
    #[error("payload width {0} must be in 1..=64")]
    InvalidPayloadWidth(u32),

    /// A sideband field wider than its 32-bit record slot.
    #[error("{field} width {width} exceeds 32 bits")]
    SidebandTooWide { field: &'static str, width: u32 },

    /// All fields plus the end-of-frame flag must fit one storage slot.
    #[error("record width {0} bits exceeds the 128-bit storage slot")]
    RecordTooWide(u32),

    /// Bad-frame dropping only makes sense when a dropped frame's storage
    /// can be reclaimed, which requires the oversize-drop machinery.
    #[error("drop_bad_frame requires drop_oversize_frame")]
    BadFrameDropRequiresOversizeDrop,

    /// Same reclamation requirement as bad-frame dropping.
    #[error("drop_when_full requires drop_oversize_frame")]
    DropWhenFullRequiresOversizeDrop,

    /// With an all-zero mask every frame would match the bad pattern.
    #[error("bad_frame_mask must be non-zero when drop_bad_frame is enabled")]
    ZeroBadFrameMask,

    /// Frame policies are meaningless outside frame mode.
    #[error("frame drop policies require frame_mode")]
    FramePolicyWithoutFrameMode,

    /// The storage collaborator does not cover the effective slot count.
    #[error("storage has {got} slots, configuration needs {need}")]
    StorageTooSmall { need: usize, got: usize },
}

/// Static configuration of the packet FIFO.
///
/// `capacity` is a request; the effective slot count is the next power of
/// two, with a floor of 2 (the lap bit needs at least one address bit).
/// Sideband fields with a width of 0 are disabled and occupy no record
/// bits; the end-of-frame flag is always carried.
#[derive(Debug, Clone)]
pub struct FifoConfig {
    /// Requested capacity in items.
    pub capacity: usize,
    /// Payload width in bits (1..=64).
    pub payload_bits: u32,
    /// Keep-mask width in bits (0 disables).
    pub keep_bits: u32,
    /// Source-id width in bits (0 disables).
    pub id_bits: u32,
    /// Destination-id width in bits (0 disables).
    pub dest_bits: u32,
    /// User/status width in bits (0 disables).
    pub status_bits: u32,
    /// Output staging pipeline depth P (>= 1).
    pub pipeline_depth: usize,
    /// Group items into frames delimited by the end-of-frame flag.
    pub frame_mode: bool,
    /// Drop frames whose length reaches the slot count.
    pub drop_oversize_frame: bool,
    /// Drop frames whose final status matches the bad pattern.
    /// Requires `drop_oversize_frame`.
    pub drop_bad_frame: bool,
    /// Never backpressure: drop whole frames while full instead.
    /// Requires `drop_oversize_frame`.
    pub drop_when_full: bool,
    /// Status pattern marking a bad frame.
    pub bad_frame_value: u32,
    /// Bits of the status field compared against `bad_frame_value`.
    pub bad_frame_mask: u32,
}

impl Default for FifoConfig {
    fn default() -> Self {
        Self {
            capacity: 16,
            payload_bits: 64,
            keep_bits: 0,
            id_bits: 0,
            dest_bits: 0,
            status_bits: 1,
            pipeline_depth: 1,
            frame_mode: false,
            drop_oversize_frame: false,
            drop_bad_frame: false,
            drop_when_full: false,
            bad_frame_value: 1,
            bad_frame_mask: 1,
        }
    }
}

impl FifoConfig {
    /// Effective slot count: requested capacity rounded up to a power of
    /// two, floor 2.
    pub fn slot_count(&self) -> usize {
        self.capacity.next_power_of_two().max(2)
    }

    /// Validate the configuration. Called once at construction; a FIFO
    /// cannot exist with an invalid configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.pipeline_depth == 0 {
            return Err(ConfigError::ZeroPipelineDepth);
        }
        if self.payload_bits == 0 || self.payload_bits > 64 {
            return Err(ConfigError::InvalidPayloadWidth(self.payload_bits));
        }
        for (field, width) in [
            ("keep", self.keep_bits),
            ("id", self.id_bits),
            ("dest", self.dest_bits),
            ("status", self.status_bits),
        ] {
            if width > 32 {
                return Err(ConfigError::SidebandTooWide { field, width });
            }
        }
        let record_bits = self.payload_bits
            + self.keep_bits
            + self.id_bits
            + self.dest_bits
            + self.status_bits
            + 1;
        if record_bits > 128 {
            return Err(ConfigError::RecordTooWide(record_bits));
        }
        if !self.frame_mode
            && (self.drop_oversize_frame || self.drop_bad_frame || self.drop_when_full)
        {
            return Err(ConfigError::FramePolicyWithoutFrameMode);
        }
        if self.drop_bad_frame && !self.drop_oversize_frame {
            return Err(ConfigError::BadFrameDropRequiresOversizeDrop);
        }
        if self.drop_when_full && !self.drop_oversize_frame {
            return Err(ConfigError::DropWhenFullRequiresOversizeDrop);
        }
        if self.drop_bad_frame && self.bad_frame_mask == 0 {
            return Err(ConfigError::ZeroBadFrameMask);
        }
        Ok(())
    }
}
