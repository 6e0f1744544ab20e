//! Peer UART receive task
//!
//! Spawned on the interrupt executor, so each byte is pushed into the ring
//! from interrupt context, preempting the flush loop.

use defmt::*;

use fpgalink_core::IngestionPath;
use fpgalink_hal_rp2040::UartPeerRx;

#[embassy_executor::task]
pub async fn ingest_task(ingest: IngestionPath<'static>, mut rx: UartPeerRx) {
    info!("Ingestion task started");

    ingest
        .run(&mut rx, |e| warn!("UART receive error: {:?}", e))
        .await
}
