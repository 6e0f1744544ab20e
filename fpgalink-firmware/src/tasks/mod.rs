//! Embassy async tasks
//!
//! The ingestion task runs on the interrupt executor; everything else runs
//! on the thread-mode executor next to the flush loop in `main`.

pub mod host_rx;
pub mod ingest;
pub mod usb;

pub use host_rx::host_rx_task;
pub use ingest::ingest_task;
pub use usb::usb_task;
