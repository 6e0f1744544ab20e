//! USB → UART
//!
//! Each packet delivered by the host goes to the peer whole, unmodified, in
//! one blocking transmit. Nothing is buffered and the packet is not kept
//! past the call.

use fpgalink_hal::{PeerTx, PeerTxError, TxLimit};

/// Egress failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EgressError {
    /// Transmit bound expired, packet abandoned
    Timeout,
    /// Peer transmitter failed
    Transport,
}

impl From<PeerTxError> for EgressError {
    fn from(e: PeerTxError) -> Self {
        match e {
            PeerTxError::Timeout => EgressError::Timeout,
            PeerTxError::Other => EgressError::Transport,
        }
    }
}

/// Host-to-peer forwarding path
#[derive(Debug, Clone, Copy, Default)]
pub struct EgressPath {
    limit: TxLimit,
}

impl EgressPath {
    /// Create an egress path with the given transmit bound
    pub const fn new(limit: TxLimit) -> Self {
        Self { limit }
    }

    /// Forward one host packet to the peer
    ///
    /// Returns the number of bytes handed to the peer transmitter.
    pub async fn forward<P: PeerTx>(&self, peer: &mut P, packet: &[u8]) -> Result<usize, EgressError> {
        if packet.is_empty() {
            return Ok(0);
        }
        peer.transmit(packet, self.limit).await?;
        Ok(packet.len())
    }

    /// Configured transmit bound
    pub const fn limit(&self) -> TxLimit {
        self.limit
    }
}
