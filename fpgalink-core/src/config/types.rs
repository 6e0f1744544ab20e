//! Configuration type definitions
//!
//! Defaults give the plain bridge behavior: overwrite on
//! overflow, contiguous-run chunk sizing, unbounded retry towards the host
//! and an unbounded wait on UART transmit.

use fpgalink_hal::TxLimit;
use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bridge::RetryPolicy;
use crate::heartbeat::DEFAULT_PERIOD_MS;
use crate::ring::{ChunkSizing, OverflowPolicy};

/// Maximum length of a USB string descriptor value
pub const MAX_USB_STRING_LEN: usize = 32;

/// Default UART baud rate
pub const DEFAULT_BAUDRATE: u32 = 115_200;

/// Peer UART settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UartSettings {
    /// Baud rate in bits per second
    pub baudrate: u32,
}

impl Default for UartSettings {
    fn default() -> Self {
        Self {
            baudrate: DEFAULT_BAUDRATE,
        }
    }
}

/// Ring buffer policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RingSettings {
    pub overflow: OverflowPolicy,
    pub chunk_sizing: ChunkSizing,
}

/// Default bound on one host transmit attempt when retries are limited
pub const DEFAULT_ATTEMPT_TIMEOUT_MS: u32 = 100;

/// UART → USB flush settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlushSettings {
    pub retry: RetryPolicy,
    /// Bound on one host transmit attempt in milliseconds, 0 waits forever.
    /// Only applies under a limited retry policy.
    pub attempt_timeout_ms: u32,
}

impl Default for FlushSettings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::Unbounded,
            attempt_timeout_ms: DEFAULT_ATTEMPT_TIMEOUT_MS,
        }
    }
}

impl FlushSettings {
    /// Per-attempt bound handed to the host transmitter
    ///
    /// Unbounded retry keeps every attempt unbounded, so an unread or
    /// unplugged port stalls the flush as before. A retry limit only counts
    /// attempts that end, so it comes with a bounded attempt.
    pub const fn attempt_limit(&self) -> TxLimit {
        match self.retry {
            RetryPolicy::Unbounded => TxLimit::Unbounded,
            RetryPolicy::Limited(_) => TxLimit::from_millis(self.attempt_timeout_ms),
        }
    }
}

/// USB → UART egress settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EgressSettings {
    /// UART transmit bound in milliseconds, 0 waits forever
    pub tx_timeout_ms: u32,
}

impl EgressSettings {
    /// Transmit bound handed to the peer transmitter
    pub const fn tx_limit(&self) -> TxLimit {
        TxLimit::from_millis(self.tx_timeout_ms)
    }
}

/// Status LED settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HeartbeatSettings {
    pub period_ms: u32,
}

impl Default for HeartbeatSettings {
    fn default() -> Self {
        Self {
            period_ms: DEFAULT_PERIOD_MS,
        }
    }
}

/// USB device identity
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UsbIdentity {
    pub vid: u16,
    pub pid: u16,
    pub manufacturer: String<MAX_USB_STRING_LEN>,
    pub product: String<MAX_USB_STRING_LEN>,
    pub serial_number: String<MAX_USB_STRING_LEN>,
}

impl Default for UsbIdentity {
    fn default() -> Self {
        Self {
            vid: 0x0483,
            pid: 0x5740,
            manufacturer: short_string("fpgalink"),
            product: short_string("FPGA UART Bridge"),
            serial_number: short_string("FPGALINK-0001"),
        }
    }
}

fn short_string(s: &str) -> String<MAX_USB_STRING_LEN> {
    let mut out = String::new();
    let pushed = out.push_str(s);
    debug_assert!(pushed.is_ok(), "default USB string longer than {}", MAX_USB_STRING_LEN);
    out
}

/// Complete bridge configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BridgeConfig {
    pub uart: UartSettings,
    pub ring: RingSettings,
    pub flush: FlushSettings,
    pub egress: EgressSettings,
    pub heartbeat: HeartbeatSettings,
    pub usb: UsbIdentity,
}

impl BridgeConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }
}
