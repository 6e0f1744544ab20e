//! Host transport (USB virtual serial) abstractions

use core::future::Future;

/// Reasons a host transmit attempt did not go through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostTxError {
    /// Endpoint still busy with a previous transfer, try again
    Busy,
    /// No host attached or the port is not configured
    Unavailable,
}

/// Host transmitter
///
/// A single attempt either delivers the whole chunk as one transfer or
/// reports why it did not. Retrying is the caller's business.
pub trait HostTx {
    /// Attempt to send one chunk to the host
    fn transmit(&mut self, chunk: &[u8]) -> impl Future<Output = Result<(), HostTxError>>;
}

/// Split `chunk` into the packets of one bulk transfer
///
/// Full packets of `max_packet` bytes come first, then the remainder. A
/// transfer that ends exactly on a packet boundary (including an empty one)
/// gets a trailing zero-length packet so the host sees it end.
pub fn transfer_packets(chunk: &[u8], max_packet: usize) -> TransferPackets<'_> {
    TransferPackets {
        rest: chunk,
        max_packet: max_packet.max(1),
        done: false,
    }
}

/// Iterator returned by [`transfer_packets`]
#[derive(Debug, Clone)]
pub struct TransferPackets<'a> {
    rest: &'a [u8],
    max_packet: usize,
    done: bool,
}

impl<'a> Iterator for TransferPackets<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        if self.done {
            return None;
        }
        if self.rest.len() < self.max_packet {
            // Short packet (possibly zero-length) ends the transfer
            self.done = true;
            return Some(core::mem::take(&mut self.rest));
        }
        let (packet, rest) = self.rest.split_at(self.max_packet);
        self.rest = rest;
        Some(packet)
    }
}
