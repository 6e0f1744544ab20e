//! Bridge context
//!
//! Owns every piece of bridge state: the ring buffer and the configuration
//! it was built from. The firmware keeps one of these in a `StaticCell` and
//! hands `&'static` references to the interrupt-side and thread-side tasks.

use crate::bridge::{EgressPath, FlushScheduler, IngestionPath};
use crate::config::BridgeConfig;
use crate::heartbeat::Heartbeat;
use crate::ring::{RingBuffer, CHUNK_CAPACITY, RING_CAPACITY};

/// Shared state of one UART/USB pairing
pub struct BridgeContext<const C: usize = RING_CAPACITY> {
    ring: RingBuffer<C>,
    config: BridgeConfig,
}

impl<const C: usize> BridgeContext<C> {
    /// Build the context with an empty ring configured from `config`
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            ring: RingBuffer::new(config.ring.overflow, config.ring.chunk_sizing),
            config,
        }
    }

    /// The shared ring buffer
    pub fn ring(&self) -> &RingBuffer<C> {
        &self.ring
    }

    /// Configuration the context was built from
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Producer path, for the UART receive context
    pub fn ingestion(&self) -> IngestionPath<'_, C> {
        IngestionPath::new(&self.ring)
    }

    /// Consumer path, for the main control loop
    pub fn flush_scheduler(&self) -> FlushScheduler<'_, C, CHUNK_CAPACITY> {
        FlushScheduler::new(&self.ring, self.config.flush.retry)
    }

    /// Host-to-peer path
    pub fn egress(&self) -> EgressPath {
        EgressPath::new(self.config.egress.tx_limit())
    }

    /// Status LED toggler
    pub fn heartbeat(&self) -> Heartbeat {
        Heartbeat::new(self.config.heartbeat.period_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{FlushOutcome, RetryPolicy};
    use crate::ring::OverflowPolicy;
    use crate::testing::{FlakyHostTx, RecordingPeerTx, ScriptedPeerRx};
    use embassy_futures::block_on;
    use fpgalink_hal::TxLimit;

    #[test]
    fn test_context_applies_config() {
        let mut config = BridgeConfig::default();
        config.ring.overflow = OverflowPolicy::RejectNew;
        config.flush.retry = RetryPolicy::Limited(4);
        config.egress.tx_timeout_ms = 20;
        config.heartbeat.period_ms = 250;

        let ctx: BridgeContext = BridgeContext::new(config);
        assert_eq!(ctx.ring().overflow_policy(), OverflowPolicy::RejectNew);
        assert_eq!(ctx.ring().capacity(), RING_CAPACITY);
        assert_eq!(ctx.flush_scheduler().retry_policy(), RetryPolicy::Limited(4));
        assert_eq!(ctx.egress().limit(), TxLimit::Millis(20));
        assert_eq!(ctx.heartbeat().period_ms(), 250);
    }

    #[test]
    fn test_peer_to_host_end_to_end() {
        let ctx: BridgeContext = BridgeContext::new(BridgeConfig::default());
        let payload: std::vec::Vec<u8> = (0..=255u8).cycle().take(700).collect();
        let mut rx = ScriptedPeerRx::from_bytes(&payload);
        let mut host = FlakyHostTx::refusing(3, fpgalink_hal::HostTxError::Busy);

        let ingest = ctx.ingestion();
        let mut flush = ctx.flush_scheduler();

        // Interleave arrivals with loop iterations: ten bytes per iteration
        for window in payload.chunks(10) {
            for _ in window {
                block_on(ingest.service(&mut rx)).unwrap();
            }
            block_on(flush.run_once(&mut host));
        }
        while block_on(flush.run_once(&mut host)) != FlushOutcome::Idle {}

        assert_eq!(host.stream(), payload);
        assert!(host.delivered.iter().all(|c| c.len() <= CHUNK_CAPACITY));
    }

    #[test]
    fn test_overflow_without_draining() {
        let ctx: BridgeContext = BridgeContext::new(BridgeConfig::default());
        let ingest = ctx.ingestion();
        let original: std::vec::Vec<u8> = (0..RING_CAPACITY).map(|i| (i * 7) as u8).collect();
        for &b in &original {
            ingest.on_byte(b);
        }
        for b in [0xA0, 0xA1, 0xA2, 0xA3, 0xA4] {
            ingest.on_byte(b);
        }

        let mut host = FlakyHostTx::default();
        let mut flush = ctx.flush_scheduler();
        while block_on(flush.run_once(&mut host)) != FlushOutcome::Idle {}

        let stream = host.stream();
        assert_eq!(stream.len(), RING_CAPACITY);
        assert_eq!(&stream[..1019], &original[5..]);
        assert_eq!(&stream[1019..], &[0xA0, 0xA1, 0xA2, 0xA3, 0xA4]);
    }

    #[test]
    fn test_host_packet_reaches_peer_whole() {
        let ctx: BridgeContext = BridgeContext::new(BridgeConfig::default());
        let mut peer = RecordingPeerTx::default();
        let packet = [0x42u8; 64];

        assert_eq!(block_on(ctx.egress().forward(&mut peer, &packet)), Ok(64));
        assert_eq!(peer.calls.len(), 1);
        assert_eq!(peer.calls[0].0.len(), 64);
        // Egress leaves the ring alone
        assert!(ctx.ring().is_empty());
    }
}
