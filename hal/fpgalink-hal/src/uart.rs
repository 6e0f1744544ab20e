//! Peer transport (UART) abstractions
//!
//! The peer side delivers an unframed byte stream one byte at a time and
//! accepts arbitrary-length buffers for blocking transmission.

use core::future::Future;

/// Upper bound on how long a blocking transmit may wait for completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxLimit {
    /// Wait until the transmit completes, however long that takes
    #[default]
    Unbounded,
    /// Give up after the given number of milliseconds
    Millis(u32),
}

impl TxLimit {
    /// Build a limit from a millisecond count, where 0 means unbounded
    pub const fn from_millis(ms: u32) -> Self {
        if ms == 0 {
            TxLimit::Unbounded
        } else {
            TxLimit::Millis(ms)
        }
    }

    /// Millisecond bound, if any
    pub const fn as_millis(self) -> Option<u32> {
        match self {
            TxLimit::Unbounded => None,
            TxLimit::Millis(ms) => Some(ms),
        }
    }
}

/// Errors from receiving on the peer transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeerRxError {
    /// Framing error on the line
    Framing,
    /// Receiver overrun (a byte was lost in hardware)
    Overrun,
    /// Parity error
    Parity,
    /// Break condition detected
    Break,
    /// Any other driver error
    Other,
}

/// Errors from transmitting on the peer transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeerTxError {
    /// The configured [`TxLimit`] expired before the transmit completed
    Timeout,
    /// Driver error
    Other,
}

/// Peer receiver
///
/// Each call arms reception of exactly one byte and resolves when it has
/// arrived. Calling again re-arms the receiver for the next byte.
pub trait PeerRx {
    /// Receive a single byte
    fn receive_byte(&mut self) -> impl Future<Output = Result<u8, PeerRxError>>;
}

/// Peer transmitter
pub trait PeerTx {
    /// Transmit the whole buffer in one blocking operation
    ///
    /// Resolves once every byte has been handed to the line, or with
    /// [`PeerTxError::Timeout`] if `limit` expires first.
    fn transmit(&mut self, data: &[u8], limit: TxLimit)
        -> impl Future<Output = Result<(), PeerTxError>>;
}
