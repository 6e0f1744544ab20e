//! Board-agnostic bridge logic
//!
//! Everything between the two transports that does not depend on a
//! particular chip lives here:
//!
//! - Ring buffer shared by the UART receive interrupt and the main loop
//! - Ingestion (UART → ring), flush (ring → USB) and egress (USB → UART) paths
//! - Status LED heartbeat
//! - Configuration types and the `bridge.toml` parser
//! - [`BridgeContext`], the single owner of all bridge state

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod bridge;
pub mod config;
pub mod context;
pub mod heartbeat;
pub mod ring;

#[cfg(test)]
pub(crate) mod testing;

pub use bridge::{
    EgressError, EgressPath, FlushOutcome, FlushScheduler, FlushStats, IngestionPath,
    RetryPolicy,
};
pub use config::{parse_config, BridgeConfig};
pub use context::BridgeContext;
pub use heartbeat::Heartbeat;
pub use ring::{
    ChunkSizing, OverflowPolicy, PushOutcome, RingBuffer, RingStats, TransferChunk,
    CHUNK_CAPACITY, RING_CAPACITY,
};
