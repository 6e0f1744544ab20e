//! Byte ring buffer shared between the UART receive interrupt and the main loop
//!
//! Single producer (the ingestion path, running in interrupt context) and
//! single consumer (the flush scheduler, running in the main loop). Both
//! sides go through the same short critical section: the producer for one
//! byte store plus an index update, the consumer for a snapshot, a copy of
//! at most one chunk, and an index commit.
//!
//! There is no backpressure. When the producer outruns the consumer the
//! configured [`OverflowPolicy`] decides what happens to the excess.

use core::cell::RefCell;
use core::ops::Deref;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ring buffer capacity in bytes
pub const RING_CAPACITY: usize = 1024;

/// Maximum bytes drained per flush iteration
pub const CHUNK_CAPACITY: usize = 128;

/// What to do with a byte that arrives while the ring is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OverflowPolicy {
    /// Store it anyway, silently overwriting the oldest unread byte
    #[default]
    OverwriteOldest,
    /// Drop the incoming byte and keep the backlog intact
    RejectNew,
}

/// How much of the backlog a single drain may see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChunkSizing {
    /// Only the contiguous run from the read cursor up to the write cursor
    /// or the end of storage, whichever comes first.
    ///
    /// Once the write cursor has wrapped, bytes at the start of storage wait
    /// for the next drain.
    #[default]
    ContiguousRun,
    /// The whole backlog, copying across the wrap point
    FullBacklog,
}

/// Result of a single push
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PushOutcome {
    /// Byte stored in free space
    Stored,
    /// Byte stored over the oldest unread byte
    Overwrote,
    /// Ring full, byte dropped
    Rejected,
}

/// Running counters, wrapping on overflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RingStats {
    /// Bytes written into storage
    pub stored: u32,
    /// Unread bytes lost to [`OverflowPolicy::OverwriteOldest`]
    pub overwritten: u32,
    /// Incoming bytes dropped by [`OverflowPolicy::RejectNew`]
    pub rejected: u32,
}

/// Bytes taken out of the ring by one drain
///
/// Lives only as long as the transmit that consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransferChunk<const K: usize = CHUNK_CAPACITY> {
    bytes: Vec<u8, K>,
}

impl<const K: usize> TransferChunk<K> {
    /// Chunk contents
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl<const K: usize> Deref for TransferChunk<K> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Storage and cursors, only ever touched inside the critical section
struct Cursors<const C: usize> {
    data: [u8; C],
    write: usize,
    read: usize,
    /// Occupancy, needed to tell full from empty when `write == read`
    len: usize,
    stats: RingStats,
}

impl<const C: usize> Cursors<C> {
    const fn new() -> Self {
        Self {
            data: [0; C],
            write: 0,
            read: 0,
            len: 0,
            stats: RingStats {
                stored: 0,
                overwritten: 0,
                rejected: 0,
            },
        }
    }

    fn push(&mut self, byte: u8, policy: OverflowPolicy) -> PushOutcome {
        let full = self.len == C;
        if full && policy == OverflowPolicy::RejectNew {
            self.stats.rejected = self.stats.rejected.wrapping_add(1);
            return PushOutcome::Rejected;
        }

        self.data[self.write] = byte;
        self.write = (self.write + 1) % C;
        self.stats.stored = self.stats.stored.wrapping_add(1);

        if full {
            // The oldest byte sat under the old write cursor; the next
            // oldest is now under the new one.
            self.read = self.write;
            self.stats.overwritten = self.stats.overwritten.wrapping_add(1);
            PushOutcome::Overwrote
        } else {
            self.len += 1;
            PushOutcome::Stored
        }
    }

    fn available(&self, sizing: ChunkSizing) -> usize {
        if self.len == 0 {
            return 0;
        }
        match sizing {
            ChunkSizing::ContiguousRun => {
                if self.write > self.read {
                    self.write - self.read
                } else {
                    C - self.read
                }
            }
            ChunkSizing::FullBacklog => self.len,
        }
    }

    fn drain<const K: usize>(&mut self, max_len: usize, sizing: ChunkSizing) -> TransferChunk<K> {
        let count = self.available(sizing).min(max_len).min(K);
        let mut bytes = Vec::new();
        if count == 0 {
            return TransferChunk { bytes };
        }

        let first = count.min(C - self.read);
        // count <= K, so neither extend can exceed the chunk capacity
        let copied = bytes
            .extend_from_slice(&self.data[self.read..self.read + first])
            .and_then(|()| bytes.extend_from_slice(&self.data[..count - first]));
        debug_assert!(copied.is_ok(), "chunk of {} bytes exceeds capacity {}", count, K);

        self.read = (self.read + count) % C;
        self.len -= count;

        TransferChunk { bytes }
    }
}

/// Fixed-capacity circular byte store with a critical-section guard
pub struct RingBuffer<const C: usize = RING_CAPACITY> {
    state: Mutex<CriticalSectionRawMutex, RefCell<Cursors<C>>>,
    overflow: OverflowPolicy,
    sizing: ChunkSizing,
}

impl<const C: usize> RingBuffer<C> {
    /// Create an empty ring with both cursors at zero
    pub const fn new(overflow: OverflowPolicy, sizing: ChunkSizing) -> Self {
        assert!(C > 0, "ring capacity must be non-zero");
        Self {
            state: Mutex::new(RefCell::new(Cursors::new())),
            overflow,
            sizing,
        }
    }

    /// Append one byte. Producer side only.
    ///
    /// Never blocks and never signals the producer; overflow is resolved by
    /// the ring's [`OverflowPolicy`].
    pub fn push(&self, byte: u8) -> PushOutcome {
        self.state
            .lock(|cell| cell.borrow_mut().push(byte, self.overflow))
    }

    /// Take up to `max_len` bytes (never more than `K`). Consumer side only.
    ///
    /// Returns an empty chunk when nothing is buffered. A full backlog takes
    /// repeated calls.
    pub fn drain_chunk<const K: usize>(&self, max_len: usize) -> TransferChunk<K> {
        self.state
            .lock(|cell| cell.borrow_mut().drain(max_len, self.sizing))
    }

    /// Storage size in bytes
    pub const fn capacity(&self) -> usize {
        C
    }

    /// Number of unread bytes
    pub fn len(&self) -> usize {
        self.state.lock(|cell| cell.borrow().len)
    }

    /// True when there is nothing to drain
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Next position the producer will write
    pub fn write_index(&self) -> usize {
        self.state.lock(|cell| cell.borrow().write)
    }

    /// Next position the consumer will read
    pub fn read_index(&self) -> usize {
        self.state.lock(|cell| cell.borrow().read)
    }

    /// Snapshot of the running counters
    pub fn stats(&self) -> RingStats {
        self.state.lock(|cell| cell.borrow().stats)
    }

    /// Configured overflow policy
    pub const fn overflow_policy(&self) -> OverflowPolicy {
        self.overflow
    }

    /// Configured chunk sizing
    pub const fn chunk_sizing(&self) -> ChunkSizing {
        self.sizing
    }
}

impl<const C: usize> Default for RingBuffer<C> {
    fn default() -> Self {
        Self::new(OverflowPolicy::default(), ChunkSizing::default())
    }
}
