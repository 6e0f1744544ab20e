//! Transport doubles for host-side tests

use std::collections::VecDeque;
use std::vec::Vec;

use fpgalink_hal::{
    HostTx, HostTxError, OutputPin, PeerRx, PeerRxError, PeerTx, PeerTxError, TxLimit,
};

/// Peer receiver that replays a fixed script of bytes and errors
#[derive(Default)]
pub struct ScriptedPeerRx {
    pub script: VecDeque<Result<u8, PeerRxError>>,
    pub arms: usize,
}

impl ScriptedPeerRx {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            script: bytes.iter().copied().map(Ok).collect(),
            arms: 0,
        }
    }
}

impl PeerRx for ScriptedPeerRx {
    async fn receive_byte(&mut self) -> Result<u8, PeerRxError> {
        self.arms += 1;
        self.script
            .pop_front()
            .expect("receiver armed with an empty script")
    }
}

/// Peer transmitter that records every call
#[derive(Default)]
pub struct RecordingPeerTx {
    pub calls: Vec<(Vec<u8>, TxLimit)>,
    pub fail_with: Option<PeerTxError>,
}

impl PeerTx for RecordingPeerTx {
    async fn transmit(&mut self, data: &[u8], limit: TxLimit) -> Result<(), PeerTxError> {
        self.calls.push((data.to_vec(), limit));
        match self.fail_with {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Host transmitter that refuses a number of attempts before accepting
#[derive(Default)]
pub struct FlakyHostTx {
    pub refusals_left: usize,
    pub refusal: Option<HostTxError>,
    pub attempts: usize,
    pub delivered: Vec<Vec<u8>>,
}

impl FlakyHostTx {
    pub fn refusing(count: usize, err: HostTxError) -> Self {
        Self {
            refusals_left: count,
            refusal: Some(err),
            ..Default::default()
        }
    }

    pub fn stream(&self) -> Vec<u8> {
        self.delivered.concat()
    }
}

impl HostTx for FlakyHostTx {
    async fn transmit(&mut self, chunk: &[u8]) -> Result<(), HostTxError> {
        self.attempts += 1;
        if self.refusals_left > 0 {
            self.refusals_left -= 1;
            return Err(self.refusal.unwrap_or(HostTxError::Busy));
        }
        self.delivered.push(chunk.to_vec());
        Ok(())
    }
}

/// Output pin that remembers its level and how often it changed
#[derive(Default)]
pub struct RecordingPin {
    pub high: bool,
    pub toggles: usize,
}

impl OutputPin for RecordingPin {
    fn set_high(&mut self) {
        if !self.high {
            self.toggles += 1;
        }
        self.high = true;
    }

    fn set_low(&mut self) {
        if self.high {
            self.toggles += 1;
        }
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}
