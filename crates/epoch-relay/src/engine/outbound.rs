use crate::codec::Receiver;
use serde::Serialize;
use std::collections::VecDeque;

/// A sent message waiting for relayers to carry it to the destination chain
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutboundRecord {
    pub nonce: u64,
    #[serde(serialize_with = "hex::serialize")]
    pub target: Receiver,
    /// The epoch whose validators will attest to the send
    pub epoch_number: u64,
    pub participant_count: u32,
    #[serde(serialize_with = "hex::serialize")]
    pub payload: Vec<u8>,
}

/// FIFO of outbound records
#[derive(Clone, Debug, Default)]
pub struct Outbox {
    records: VecDeque<OutboundRecord>,
}

impl Outbox {
    pub fn push(&mut self, record: OutboundRecord) {
        self.records.push_back(record);
    }

    /// Removes and returns everything queued so far, oldest first
    pub fn drain(&mut self) -> Vec<OutboundRecord> {
        self.records.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
