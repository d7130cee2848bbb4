use super::{take, varint, BlockHeader};
use crate::{RelayError, RelayResult};
use relay_bls::ParticipantMask;

/// Everything a relayer submits to prove one payload: the attested header, the payload, the
/// Merkle path tying the payload to the header's transactions root, and the epoch's signature.
///
/// Header, path and signature stay as raw bytes so the signature is always checked over
/// exactly what the relayer sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationBundle {
    pub header: Vec<u8>,
    pub payload: Vec<u8>,
    pub merkle_path: Vec<u8>,
    pub signature: Vec<u8>,
    pub participants: ParticipantMask,
}

impl VerificationBundle {
    pub fn new(
        header: Vec<u8>,
        payload: Vec<u8>,
        merkle_path: Vec<u8>,
        signature: Vec<u8>,
        participants: ParticipantMask,
    ) -> Self {
        VerificationBundle {
            header,
            payload,
            merkle_path,
            signature,
            participants,
        }
    }

    /// Builds a bundle from a packed data field, `compact_size(len) | payload | path`
    pub fn from_packed(
        header: Vec<u8>,
        data: &[u8],
        signature: Vec<u8>,
        participants: ParticipantMask,
    ) -> RelayResult<Self> {
        let mut input = data;
        let payload_len = varint::read(&mut input)?;
        if payload_len > input.len() as u64 {
            return Err(RelayError::MalformedPayload(format!(
                "packed payload claims {} bytes, {} available",
                payload_len,
                input.len()
            )));
        }
        let payload = take(&mut input, payload_len as usize, "packed payload")?.to_vec();
        Ok(Self::new(header, payload, input.to_vec(), signature, participants))
    }

    /// The inverse of [`from_packed`](Self::from_packed)
    pub fn packed_data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(9 + self.payload.len() + self.merkle_path.len());
        varint::write(self.payload.len() as u64, &mut data);
        data.extend_from_slice(&self.payload);
        data.extend_from_slice(&self.merkle_path);
        data
    }

    pub fn decode_header(&self) -> RelayResult<BlockHeader> {
        BlockHeader::decode(&self.header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_data_splits_payload_and_path() {
        let bundle = VerificationBundle::new(
            vec![0u8; 128],
            vec![7u8; 300],
            vec![1u8; 66],
            vec![9u8; 48],
            ParticipantMask::all(4),
        );
        let data = bundle.packed_data();
        assert_eq!(&data[..3], &[0xfd, 0x2c, 0x01]);
        let unpacked = VerificationBundle::from_packed(
            bundle.header.clone(),
            &data,
            bundle.signature.clone(),
            bundle.participants,
        )
        .unwrap();
        assert_eq!(unpacked, bundle);
    }

    #[test]
    fn overlong_payload_length_is_malformed() {
        let data = [5u8, 1, 2, 3];
        assert!(matches!(
            VerificationBundle::from_packed(vec![], &data, vec![], ParticipantMask::default()),
            Err(RelayError::MalformedPayload(_))
        ));
    }
}
