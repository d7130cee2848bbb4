use super::take;
use crate::{RelayError, RelayResult};
use byteorder::{ByteOrder, LittleEndian};
use relay_bls::PUBLIC_KEY_BYTES;
use serde::Serialize;

const FIXED_PREFIX_BYTES: usize = 8 + 4 + 1;
const PARTICIPANT_ID_BYTES: usize = 8;

/// Announcement of the next validator set, carried as a transaction on the source chain.
///
/// Wire layout, integers little-endian:
/// `version:8 | epoch_number:4 | n:1 | public_key:96 | embedded_tx:* | participant_ids:8*n`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EpochUpdate {
    pub version: u64,
    pub epoch_number: u32,
    /// Compressed aggregated G2 key of the incoming validator set. Not validated here.
    #[serde(serialize_with = "hex::serialize")]
    pub public_key: Vec<u8>,
    #[serde(serialize_with = "hex::serialize")]
    pub embedded_tx: Vec<u8>,
    pub participant_ids: Vec<u64>,
}

impl EpochUpdate {
    pub fn decode(bytes: &[u8]) -> RelayResult<Self> {
        let mut input = bytes;
        let prefix = take(&mut input, FIXED_PREFIX_BYTES, "epoch update prefix")?;
        let version = LittleEndian::read_u64(&prefix[..8]);
        let epoch_number = LittleEndian::read_u32(&prefix[8..12]);
        let count = prefix[12] as usize;

        let ids_len = count * PARTICIPANT_ID_BYTES;
        if input.len() < PUBLIC_KEY_BYTES + ids_len {
            return Err(RelayError::MalformedPayload(format!(
                "{} bytes cannot hold a public key and {} participant ids",
                input.len(),
                count
            )));
        }
        let public_key = take(&mut input, PUBLIC_KEY_BYTES, "public key")?.to_vec();
        let tx_len = input.len() - ids_len;
        let embedded_tx = take(&mut input, tx_len, "embedded transaction")?.to_vec();
        let participant_ids = input
            .chunks_exact(PARTICIPANT_ID_BYTES)
            .map(LittleEndian::read_u64)
            .collect();

        Ok(EpochUpdate {
            version,
            epoch_number,
            public_key,
            embedded_tx,
            participant_ids,
        })
    }

    /// Fails if there are more participants than the one-byte count can express
    pub fn encode(&self) -> RelayResult<Vec<u8>> {
        let count = self.participant_count()?;
        let mut bytes = Vec::with_capacity(
            FIXED_PREFIX_BYTES
                + self.public_key.len()
                + self.embedded_tx.len()
                + self.participant_ids.len() * PARTICIPANT_ID_BYTES,
        );
        bytes.extend_from_slice(&self.version.to_le_bytes());
        bytes.extend_from_slice(&self.epoch_number.to_le_bytes());
        bytes.push(count);
        bytes.extend_from_slice(&self.public_key);
        bytes.extend_from_slice(&self.embedded_tx);
        for id in &self.participant_ids {
            bytes.extend_from_slice(&id.to_le_bytes());
        }
        Ok(bytes)
    }

    pub fn participant_count(&self) -> RelayResult<u8> {
        if self.participant_ids.len() > u8::MAX as usize {
            return Err(RelayError::MalformedPayload(format!(
                "{} participants do not fit a one-byte count",
                self.participant_ids.len()
            )));
        }
        Ok(self.participant_ids.len() as u8)
    }
}
