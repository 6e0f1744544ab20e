//! Ring buffer → USB
//!
//! Called once per main-loop iteration. Drains at most one chunk and pushes
//! it to the host, retrying until the host accepts it. While the host keeps
//! refusing, the whole loop iteration waits here; a [`RetryPolicy`] bound
//! turns that stall into a dropped chunk instead.

use fpgalink_hal::{HostTx, HostTxError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ring::{RingBuffer, TransferChunk, CHUNK_CAPACITY, RING_CAPACITY};

/// How many times one chunk is offered to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RetryPolicy {
    /// Keep trying until the host accepts
    #[default]
    Unbounded,
    /// Give up after this many attempts (including the first)
    Limited(u32),
}

impl RetryPolicy {
    /// Build a policy from an attempt limit, where 0 means unbounded
    pub const fn from_limit(attempts: u32) -> Self {
        if attempts == 0 {
            RetryPolicy::Unbounded
        } else {
            RetryPolicy::Limited(attempts)
        }
    }

    fn exhausted(self, attempts: u32) -> bool {
        match self {
            RetryPolicy::Unbounded => false,
            RetryPolicy::Limited(max) => attempts >= max,
        }
    }
}

/// What one flush iteration did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlushOutcome {
    /// Ring was empty, nothing offered to the host
    Idle,
    /// Chunk of this many bytes accepted by the host
    Sent(usize),
    /// Retry bound reached, chunk dropped
    Abandoned {
        len: usize,
        last_error: HostTxError,
    },
}

/// Flush counters, wrapping on overflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlushStats {
    pub chunks_sent: u32,
    pub bytes_sent: u32,
    /// Attempts refused by the host
    pub retries: u32,
    pub chunks_abandoned: u32,
    pub bytes_abandoned: u32,
}

/// Consumer half of the bridge
pub struct FlushScheduler<'a, const C: usize = RING_CAPACITY, const K: usize = CHUNK_CAPACITY> {
    ring: &'a RingBuffer<C>,
    retry: RetryPolicy,
    stats: FlushStats,
}

impl<'a, const C: usize, const K: usize> FlushScheduler<'a, C, K> {
    /// Create a scheduler draining `ring`
    pub fn new(ring: &'a RingBuffer<C>, retry: RetryPolicy) -> Self {
        Self {
            ring,
            retry,
            stats: FlushStats::default(),
        }
    }

    /// One control-loop iteration
    pub async fn run_once<H: HostTx>(&mut self, host: &mut H) -> FlushOutcome {
        let chunk: TransferChunk<K> = self.ring.drain_chunk(K);
        if chunk.is_empty() {
            return FlushOutcome::Idle;
        }

        let mut attempts: u32 = 0;
        loop {
            attempts = attempts.saturating_add(1);
            match host.transmit(&chunk).await {
                Ok(()) => {
                    self.stats.chunks_sent = self.stats.chunks_sent.wrapping_add(1);
                    self.stats.bytes_sent = self.stats.bytes_sent.wrapping_add(chunk.len() as u32);
                    return FlushOutcome::Sent(chunk.len());
                }
                Err(err) if self.retry.exhausted(attempts) => {
                    self.stats.chunks_abandoned = self.stats.chunks_abandoned.wrapping_add(1);
                    self.stats.bytes_abandoned =
                        self.stats.bytes_abandoned.wrapping_add(chunk.len() as u32);
                    return FlushOutcome::Abandoned {
                        len: chunk.len(),
                        last_error: err,
                    };
                }
                Err(_) => {
                    self.stats.retries = self.stats.retries.wrapping_add(1);
                }
            }
        }
    }

    /// Counters since creation
    pub fn stats(&self) -> FlushStats {
        self.stats
    }

    /// Active retry policy
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FlakyHostTx;
    use embassy_futures::block_on;

    #[test]
    fn test_empty_ring_never_touches_host() {
        let ring: RingBuffer = RingBuffer::default();
        let mut flush: FlushScheduler = FlushScheduler::new(&ring, RetryPolicy::Unbounded);
        let mut host = FlakyHostTx::default();

        assert_eq!(block_on(flush.run_once(&mut host)), FlushOutcome::Idle);
        assert_eq!(host.attempts, 0);
    }

    #[test]
    fn test_one_chunk_per_iteration() {
        let ring: RingBuffer = RingBuffer::default();
        for i in 0..300u32 {
            ring.push(i as u8);
        }
        let mut flush: FlushScheduler = FlushScheduler::new(&ring, RetryPolicy::Unbounded);
        let mut host = FlakyHostTx::default();

        assert_eq!(block_on(flush.run_once(&mut host)), FlushOutcome::Sent(128));
        assert_eq!(block_on(flush.run_once(&mut host)), FlushOutcome::Sent(128));
        assert_eq!(block_on(flush.run_once(&mut host)), FlushOutcome::Sent(44));
        assert_eq!(block_on(flush.run_once(&mut host)), FlushOutcome::Idle);

        let expected: std::vec::Vec<u8> = (0..300u32).map(|i| i as u8).collect();
        assert_eq!(host.stream(), expected);
        assert_eq!(flush.stats().chunks_sent, 3);
        assert_eq!(flush.stats().bytes_sent, 300);
    }

    #[test]
    fn test_unbounded_retries_until_accepted() {
        let ring: RingBuffer = RingBuffer::default();
        ring.push(0xAB);
        let mut flush: FlushScheduler = FlushScheduler::new(&ring, RetryPolicy::Unbounded);
        let mut host = FlakyHostTx::refusing(50, HostTxError::Busy);

        assert_eq!(block_on(flush.run_once(&mut host)), FlushOutcome::Sent(1));
        assert_eq!(host.attempts, 51);
        assert_eq!(flush.stats().retries, 50);
        assert_eq!(host.stream(), [0xAB]);
    }

    #[test]
    fn test_limited_retry_abandons_chunk() {
        let ring: RingBuffer = RingBuffer::default();
        for b in 0..10 {
            ring.push(b);
        }
        let mut flush: FlushScheduler = FlushScheduler::new(&ring, RetryPolicy::from_limit(3));
        let mut host = FlakyHostTx::refusing(usize::MAX, HostTxError::Unavailable);

        assert_eq!(
            block_on(flush.run_once(&mut host)),
            FlushOutcome::Abandoned {
                len: 10,
                last_error: HostTxError::Unavailable
            }
        );
        assert_eq!(host.attempts, 3);
        assert!(ring.is_empty());
        assert_eq!(flush.stats().chunks_abandoned, 1);
        assert_eq!(flush.stats().bytes_abandoned, 10);
    }

    #[test]
    fn test_limited_retry_succeeds_within_bound() {
        let ring: RingBuffer = RingBuffer::default();
        ring.push(7);
        let mut flush: FlushScheduler = FlushScheduler::new(&ring, RetryPolicy::Limited(3));
        let mut host = FlakyHostTx::refusing(2, HostTxError::Busy);

        assert_eq!(block_on(flush.run_once(&mut host)), FlushOutcome::Sent(1));
        assert_eq!(host.attempts, 3);
    }

    #[test]
    fn test_zero_limit_means_unbounded() {
        assert_eq!(RetryPolicy::from_limit(0), RetryPolicy::Unbounded);
        assert_eq!(RetryPolicy::from_limit(5), RetryPolicy::Limited(5));
    }
}
