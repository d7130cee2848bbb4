use super::take;
use crate::RelayResult;
use serde::Serialize;

pub const REQUEST_ID_BYTES: usize = 32;
pub const RECEIVER_BYTES: usize = 20;
/// Bytes preceding the call data
pub const MESSAGE_PREFIX_BYTES: usize = REQUEST_ID_BYTES + RECEIVER_BYTES;

/// Address of a destination handler
pub type Receiver = [u8; RECEIVER_BYTES];

/// A cross-chain message: `request_id:32 | receiver:20 | call_data:*`.
/// The request id is the replay identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessagePayload {
    #[serde(serialize_with = "hex::serialize")]
    pub request_id: [u8; REQUEST_ID_BYTES],
    #[serde(serialize_with = "hex::serialize")]
    pub receiver: Receiver,
    #[serde(serialize_with = "hex::serialize")]
    pub call_data: Vec<u8>,
}

impl MessagePayload {
    pub fn decode(bytes: &[u8]) -> RelayResult<Self> {
        let mut input = bytes;
        let mut request_id = [0u8; REQUEST_ID_BYTES];
        request_id.copy_from_slice(take(&mut input, REQUEST_ID_BYTES, "request id")?);
        let mut receiver = [0u8; RECEIVER_BYTES];
        receiver.copy_from_slice(take(&mut input, RECEIVER_BYTES, "receiver")?);
        Ok(MessagePayload {
            request_id,
            receiver,
            call_data: input.to_vec(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        [&self.request_id[..], &self.receiver[..], &self.call_data[..]].concat()
    }
}
