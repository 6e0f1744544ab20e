//! UART → ring buffer
//!
//! Runs in interrupt context. Per byte: one push into the ring, then the
//! receiver is armed for the next byte. No transmission, no copies beyond
//! the single byte, no locking beyond the ring's own critical section.

use fpgalink_hal::{PeerRx, PeerRxError};

use crate::ring::{PushOutcome, RingBuffer, RING_CAPACITY};

/// Producer half of the bridge
#[derive(Clone, Copy)]
pub struct IngestionPath<'a, const C: usize = RING_CAPACITY> {
    ring: &'a RingBuffer<C>,
}

impl<'a, const C: usize> IngestionPath<'a, C> {
    /// Create an ingestion path feeding `ring`
    pub fn new(ring: &'a RingBuffer<C>) -> Self {
        Self { ring }
    }

    /// Receive-complete callback for one byte
    #[inline]
    pub fn on_byte(&self, byte: u8) -> PushOutcome {
        self.ring.push(byte)
    }

    /// Wait for one byte from the peer and push it
    ///
    /// Calling this again is what re-arms the receiver.
    pub async fn service<R: PeerRx>(&self, rx: &mut R) -> Result<PushOutcome, PeerRxError> {
        let byte = rx.receive_byte().await?;
        Ok(self.on_byte(byte))
    }

    /// Service the receiver forever
    ///
    /// Receive errors are handed to `on_error` and reception continues.
    pub async fn run<R: PeerRx>(&self, rx: &mut R, mut on_error: impl FnMut(PeerRxError)) -> ! {
        loop {
            if let Err(e) = self.service(rx).await {
                on_error(e);
            }
        }
    }
}
