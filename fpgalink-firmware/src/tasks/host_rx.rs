//! Host → peer task
//!
//! Each packet the host writes to the CDC-ACM OUT endpoint goes straight to
//! the peer UART through the egress path.

use defmt::*;
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_usb::class::cdc_acm::Receiver;
use embassy_usb::driver::EndpointError;

use fpgalink_core::EgressPath;
use fpgalink_hal_rp2040::UartPeerTx;

/// Full-speed bulk max packet size
const PACKET_SIZE: usize = 64;

#[embassy_executor::task]
pub async fn host_rx_task(
    mut receiver: Receiver<'static, Driver<'static, USB>>,
    mut peer: UartPeerTx,
    egress: EgressPath,
) {
    info!("Host RX task started");

    let mut buf = [0u8; PACKET_SIZE];

    loop {
        receiver.wait_connection().await;
        info!("Host connected");

        loop {
            match receiver.read_packet(&mut buf).await {
                Ok(n) => {
                    trace!("Host packet: {} bytes", n);
                    if let Err(e) = egress.forward(&mut peer, &buf[..n]).await {
                        warn!("Dropped {} byte host packet: {:?}", n, e);
                    }
                }
                Err(EndpointError::BufferOverflow) => {
                    warn!("Host packet larger than {} bytes", PACKET_SIZE);
                }
                Err(EndpointError::Disabled) => break,
            }
        }

        info!("Host disconnected");
    }
}
