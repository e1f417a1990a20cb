//! Status event reporting across domains.
//!
//! The write domain raises one-shot pulses for overflow, bad-frame and
//! good-frame events. Each pulse flips an independent toggle register; the
//! read domain double-registers the toggles and reconstructs edge pulses,
//! so telemetry on either side sees each event exactly once, synchronized
//! to its own cycle sequence.

use crate::sync::PulseSync;

/// One cycle's worth of status pulses in one domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusPulses {
    /// A frame was discarded for capacity reasons (policy drop, oversize,
    /// or reset-latched disposal).
    pub overflow: bool,
    /// A frame's trailing status matched the bad-frame pattern.
    pub bad_frame: bool,
    /// A frame completed and was committed.
    pub good_frame: bool,
}

impl StatusPulses {
    pub fn any(&self) -> bool {
        self.overflow || self.bad_frame || self.good_frame
    }
}

/// Write-domain pulse generator: three independent toggle latches.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusReporter {
    overflow_toggle: bool,
    bad_frame_toggle: bool,
    good_frame_toggle: bool,
}

impl StatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch this cycle's pulses into the toggle registers.
    pub fn record(&mut self, pulses: StatusPulses) {
        self.overflow_toggle ^= pulses.overflow;
        self.bad_frame_toggle ^= pulses.bad_frame;
        self.good_frame_toggle ^= pulses.good_frame;
    }

    /// Current toggle levels, wired to the read-domain mirror.
    pub fn toggles(&self) -> (bool, bool, bool) {
        (
            self.overflow_toggle,
            self.bad_frame_toggle,
            self.good_frame_toggle,
        )
    }
}

/// Read-domain reconstruction of the write-domain pulses.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusMirror {
    overflow: PulseSync,
    bad_frame: PulseSync,
    good_frame: PulseSync,
}

impl StatusMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one read-domain cycle, sampling the reporter's toggles.
    pub fn step(&mut self, toggles: (bool, bool, bool)) -> StatusPulses {
        StatusPulses {
            overflow: self.overflow.step(toggles.0),
            bad_frame: self.bad_frame.step(toggles.1),
            good_frame: self.good_frame.step(toggles.2),
        }
    }
}
