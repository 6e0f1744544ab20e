//! USB CDC-ACM host adapter

use embassy_time::{with_timeout, Duration};
use embassy_usb::class::cdc_acm::Sender;
use embassy_usb::driver::{Driver, EndpointError};
use fpgalink_hal::{transfer_packets, HostTx, HostTxError, TxLimit};

/// Host transmitter over a CDC-ACM bulk IN endpoint
///
/// A chunk longer than the endpoint's max packet size goes out as several
/// packets; a chunk that is an exact multiple of it is terminated with a
/// zero-length packet so the host sees the transfer end.
///
/// With [`TxLimit::Unbounded`] an attempt waits for the host to poll the
/// endpoint and, while the port is down, for it to come back. With
/// [`TxLimit::Millis`] an attempt the host does not take up in time fails
/// with [`HostTxError::Busy`], and a disabled port fails straight away with
/// [`HostTxError::Unavailable`].
pub struct CdcHostTx<'d, D: Driver<'d>> {
    sender: Sender<'d, D>,
    limit: TxLimit,
}

impl<'d, D: Driver<'d>> CdcHostTx<'d, D> {
    pub fn new(sender: Sender<'d, D>, limit: TxLimit) -> Self {
        Self { sender, limit }
    }

    async fn write_transfer(&mut self, chunk: &[u8]) -> Result<(), EndpointError> {
        let max_packet = usize::from(self.sender.max_packet_size());
        for packet in transfer_packets(chunk, max_packet) {
            self.sender.write_packet(packet).await?;
        }
        Ok(())
    }
}

impl<'d, D: Driver<'d>> HostTx for CdcHostTx<'d, D> {
    async fn transmit(&mut self, chunk: &[u8]) -> Result<(), HostTxError> {
        let result = match self.limit {
            TxLimit::Unbounded => self.write_transfer(chunk).await,
            TxLimit::Millis(ms) => {
                with_timeout(Duration::from_millis(u64::from(ms)), self.write_transfer(chunk))
                    .await
                    .map_err(|_| HostTxError::Busy)?
            }
        };

        match result {
            Ok(()) => Ok(()),
            Err(EndpointError::BufferOverflow) => Err(HostTxError::Busy),
            Err(EndpointError::Disabled) => {
                if self.limit == TxLimit::Unbounded {
                    // Park until the host reconfigures the port so the
                    // unbounded retry loop does not spin.
                    self.sender.wait_connection().await;
                }
                Err(HostTxError::Unavailable)
            }
        }
    }
}
