//! Buffered UART adapters
//!
//! The interrupt handler of `BufferedUart` moves bytes between the FIFO and
//! its ring buffers; these adapters only ever see the buffered halves.

use embassy_rp::uart::{BufferedUartRx, BufferedUartTx, Config, Error as UartError};
use embassy_time::{with_timeout, Duration};
use embedded_io_async::{Read, Write};
use fpgalink_hal::{PeerRx, PeerRxError, PeerTx, PeerTxError, TxLimit};

/// UART configuration for the peer link (8N1 at `baudrate`)
pub fn uart_config(baudrate: u32) -> Config {
    let mut config = Config::default();
    config.baudrate = baudrate;
    config
}

fn rx_error(e: UartError) -> PeerRxError {
    match e {
        UartError::Framing => PeerRxError::Framing,
        UartError::Overrun => PeerRxError::Overrun,
        UartError::Parity => PeerRxError::Parity,
        UartError::Break => PeerRxError::Break,
        #[allow(unreachable_patterns)]
        _ => PeerRxError::Other,
    }
}

/// Receive half of the peer UART
pub struct UartPeerRx {
    rx: BufferedUartRx,
}

impl UartPeerRx {
    pub fn new(rx: BufferedUartRx) -> Self {
        Self { rx }
    }
}

impl PeerRx for UartPeerRx {
    async fn receive_byte(&mut self) -> Result<u8, PeerRxError> {
        let mut byte = [0u8; 1];
        loop {
            // A buffered read never completes with zero bytes, but be exact
            // about handing out one byte per call.
            if self.rx.read(&mut byte).await.map_err(rx_error)? == 1 {
                return Ok(byte[0]);
            }
        }
    }
}

/// Transmit half of the peer UART
pub struct UartPeerTx {
    tx: BufferedUartTx,
}

impl UartPeerTx {
    pub fn new(tx: BufferedUartTx) -> Self {
        Self { tx }
    }

    async fn write_and_drain(&mut self, data: &[u8]) -> Result<(), PeerTxError> {
        self.tx.write_all(data).await.map_err(|_| PeerTxError::Other)?;
        // Resolve only once the bytes have left the software buffer
        self.tx.flush().await.map_err(|_| PeerTxError::Other)
    }
}

impl PeerTx for UartPeerTx {
    async fn transmit(&mut self, data: &[u8], limit: TxLimit) -> Result<(), PeerTxError> {
        match limit {
            TxLimit::Unbounded => self.write_and_drain(data).await,
            TxLimit::Millis(ms) => {
                with_timeout(Duration::from_millis(u64::from(ms)), self.write_and_drain(data))
                    .await
                    .map_err(|_| PeerTxError::Timeout)?
            }
        }
    }
}
