use crate::{RelayError, RelayResult};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;
use std::io::{Cursor, Read};

/// Size of an encoded block header
pub const HEADER_BYTES: usize = 128;

/// A source chain block header, as attested by an epoch's validators
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BlockHeader {
    pub source_chain_id: u64,
    #[serde(serialize_with = "hex::serialize")]
    pub prev_block_hash: [u8; 32],
    #[serde(serialize_with = "hex::serialize")]
    pub epoch_block_hash: [u8; 32],
    /// Merkle root that inclusion proofs are checked against
    #[serde(serialize_with = "hex::serialize")]
    pub transactions_root: [u8; 32],
    pub source_height: u64,
    pub height: u64,
    pub timestamp: u64,
}

fn read_hash(reader: &mut Cursor<&[u8]>) -> std::io::Result<[u8; 32]> {
    let mut hash = [0u8; 32];
    reader.read_exact(&mut hash)?;
    Ok(hash)
}

impl BlockHeader {
    /// Decodes a header from exactly `HEADER_BYTES` bytes
    pub fn decode(bytes: &[u8]) -> RelayResult<Self> {
        if bytes.len() != HEADER_BYTES {
            return Err(RelayError::MalformedHeader(format!(
                "expected {} bytes, got {}",
                HEADER_BYTES,
                bytes.len()
            )));
        }
        Self::read(&mut Cursor::new(bytes))
            .map_err(|e| RelayError::MalformedHeader(e.to_string()))
    }

    fn read(reader: &mut Cursor<&[u8]>) -> std::io::Result<Self> {
        Ok(BlockHeader {
            source_chain_id: reader.read_u64::<BigEndian>()?,
            prev_block_hash: read_hash(reader)?,
            epoch_block_hash: read_hash(reader)?,
            transactions_root: read_hash(reader)?,
            source_height: reader.read_u64::<BigEndian>()?,
            height: reader.read_u64::<BigEndian>()?,
            timestamp: reader.read_u64::<BigEndian>()?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_BYTES);
        // writes into a Vec cannot fail
        let _ = self.write(&mut bytes);
        bytes
    }

    fn write(&self, bytes: &mut Vec<u8>) -> std::io::Result<()> {
        bytes.write_u64::<BigEndian>(self.source_chain_id)?;
        bytes.extend_from_slice(&self.prev_block_hash);
        bytes.extend_from_slice(&self.epoch_block_hash);
        bytes.extend_from_slice(&self.transactions_root);
        bytes.write_u64::<BigEndian>(self.source_height)?;
        bytes.write_u64::<BigEndian>(self.height)?;
        bytes.write_u64::<BigEndian>(self.timestamp)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BlockHeader {
        BlockHeader {
            source_chain_id: 0x0102_0304_0506_0708,
            prev_block_hash: [0x11; 32],
            epoch_block_hash: [0x22; 32],
            transactions_root: [0x33; 32],
            source_height: 42,
            height: 7,
            timestamp: 1_600_000_000,
        }
    }

    #[test]
    fn layout_is_big_endian_and_fixed() {
        let bytes = sample().encode();
        assert_eq!(bytes.len(), HEADER_BYTES);
        assert_eq!(&bytes[..8], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(&bytes[8..40], &[0x11; 32]);
        assert_eq!(&bytes[72..104], &[0x33; 32]);
        assert_eq!(&bytes[104..112], &42u64.to_be_bytes());
        assert_eq!(&bytes[120..], &1_600_000_000u64.to_be_bytes());
        assert_eq!(BlockHeader::decode(&bytes).unwrap(), sample());
    }

    #[test]
    fn wrong_length_is_malformed() {
        let bytes = sample().encode();
        for len in &[0usize, 127, 129] {
            let mut input = bytes.clone();
            input.resize(*len, 0);
            assert!(matches!(
                BlockHeader::decode(&input),
                Err(RelayError::MalformedHeader(_))
            ));
        }
    }
}
