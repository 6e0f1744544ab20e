//! Status LED heartbeat
//!
//! Polled from the same loop iteration as the flush, so a flush stalled on
//! the host also freezes the LED.

use fpgalink_hal::OutputPin;

/// Default LED toggle period
pub const DEFAULT_PERIOD_MS: u32 = 2000;

/// Periodic LED toggler driven by a millisecond clock
#[derive(Debug, Clone, Copy)]
pub struct Heartbeat {
    period_ms: u32,
    last_toggle_ms: u32,
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD_MS)
    }
}

impl Heartbeat {
    /// Create a heartbeat; the first toggle comes one period after t=0
    pub const fn new(period_ms: u32) -> Self {
        Self {
            period_ms,
            last_toggle_ms: 0,
        }
    }

    /// Toggle `led` if more than one period has elapsed
    ///
    /// `now_ms` may wrap; elapsed time is computed modulo 2^32.
    /// Returns true when the LED was toggled.
    pub fn poll<P: OutputPin>(&mut self, now_ms: u32, led: &mut P) -> bool {
        if now_ms.wrapping_sub(self.last_toggle_ms) > self.period_ms {
            led.toggle();
            self.last_toggle_ms = now_ms;
            true
        } else {
            false
        }
    }

    /// Toggle period in milliseconds
    pub const fn period_ms(&self) -> u32 {
        self.period_ms
    }
}
