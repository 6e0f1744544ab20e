//! The three data paths of the bridge
//!
//! ```text
//! UART RX ──► IngestionPath ──► RingBuffer ──► FlushScheduler ──► USB TX
//! USB RX  ──► EgressPath ───────────────────────────────────────► UART TX
//! ```
//!
//! The two directions share no state.

pub mod egress;
pub mod flush;
pub mod ingest;

pub use egress::{EgressError, EgressPath};
pub use flush::{FlushOutcome, FlushScheduler, FlushStats, RetryPolicy};
pub use ingest::IngestionPath;
