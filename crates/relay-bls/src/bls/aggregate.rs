use super::{PublicKey, PublicKeyCache, Signature};
use crate::{BlsError, BlsResult, HashToCurve};

use ark_bls12_377::G1Projective;
use log::trace;

use std::fmt;

const MASK_BYTES: usize = 32;

/// Records which of an epoch's registered participants co-signed a header. Bit `i` stands
/// for participant `i`; the 256 bits cover every count a one-byte participant field can
/// express. Stored big-endian so the encoding reads like the integer it represents.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ParticipantMask([u8; MASK_BYTES]);

impl ParticipantMask {
    pub const BITS: usize = MASK_BYTES * 8;

    /// The mask with the lowest `count` participants set
    pub fn all(count: usize) -> Self {
        let mut mask = Self::default();
        for i in 0..count.min(Self::BITS) {
            mask.set(i);
        }
        mask
    }

    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; MASK_BYTES];
        bytes[MASK_BYTES - 8..].copy_from_slice(&value.to_be_bytes());
        ParticipantMask(bytes)
    }

    pub fn from_bitmap(bitmap: &[bool]) -> Self {
        let mut mask = Self::default();
        for (i, _) in bitmap
            .iter()
            .take(Self::BITS)
            .enumerate()
            .filter(|(_, b)| **b)
        {
            mask.set(i);
        }
        mask
    }

    pub fn from_bytes(bytes: &[u8]) -> BlsResult<Self> {
        if bytes.len() != MASK_BYTES {
            return Err(BlsError::InvalidLength {
                expected: MASK_BYTES,
                actual: bytes.len(),
            });
        }
        let mut mask = [0u8; MASK_BYTES];
        mask.copy_from_slice(bytes);
        Ok(ParticipantMask(mask))
    }

    pub fn as_bytes(&self) -> &[u8; MASK_BYTES] {
        &self.0
    }

    pub fn set(&mut self, index: usize) {
        if index < Self::BITS {
            self.0[MASK_BYTES - 1 - index / 8] |= 1 << (index % 8);
        }
    }

    pub fn is_set(&self, index: usize) -> bool {
        index < Self::BITS && self.0[MASK_BYTES - 1 - index / 8] & (1 << (index % 8)) != 0
    }

    /// Number of participants that signed
    pub fn count(&self) -> u32 {
        self.0.iter().map(|b| b.count_ones()).sum()
    }

    pub fn highest_set(&self) -> Option<usize> {
        (0..Self::BITS).rev().find(|i| self.is_set(*i))
    }

    /// Expands the mask into one flag per participant
    pub fn to_bitmap(&self, participants: usize) -> Vec<bool> {
        (0..participants).map(|i| self.is_set(i)).collect()
    }
}

impl fmt::Debug for ParticipantMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParticipantMask(0x{})", hex::encode(self.0))
    }
}

/// Checks aggregate signatures against an epoch's pre-summed group key.
///
/// Individual validator keys are never stored, so the participant mask cannot be turned
/// into a sub-aggregate: the signature must validate against the full aggregated key that
/// was installed when the epoch was rotated in. The mask only travels along for auditing.
pub struct AggregateVerifier<'a, H> {
    hash_to_g1: &'a H,
    keys: PublicKeyCache,
}

impl<'a, H> AggregateVerifier<'a, H>
where
    H: HashToCurve<Output = G1Projective>,
{
    pub fn new(hash_to_g1: &'a H, key_cache_size: usize) -> Self {
        AggregateVerifier {
            hash_to_g1,
            keys: PublicKeyCache::new(key_cache_size),
        }
    }

    /// Decodes an aggregated key through the cache
    pub fn decode_key(&mut self, aggregated_public_key: &[u8]) -> BlsResult<PublicKey> {
        self.keys.deserialize(aggregated_public_key)
    }

    /// Decodes `signature` and checks it against `aggregated_public_key` over `message`.
    /// Fails closed on malformed keys, malformed signatures and pairing mismatches alike.
    pub fn verify(
        &mut self,
        aggregated_public_key: &[u8],
        participants: &ParticipantMask,
        signature: &[u8],
        message: &[u8],
    ) -> BlsResult<()> {
        let signature = Signature::from_bytes(signature)?;
        self.verify_decoded(aggregated_public_key, participants, &signature, message)
    }

    /// Same as [`verify`](Self::verify) with an already decoded signature, for callers that
    /// try the same signature against several keys
    pub fn verify_decoded(
        &mut self,
        aggregated_public_key: &[u8],
        participants: &ParticipantMask,
        signature: &Signature,
        message: &[u8],
    ) -> BlsResult<()> {
        let public_key = self.decode_key(aggregated_public_key)?;
        trace!(
            "verifying aggregate signature of {} participants over {} bytes",
            participants.count(),
            message.len()
        );
        public_key.verify(message, &[], signature, self.hash_to_g1)
    }

    pub fn cached_keys(&self) -> usize {
        self.keys.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        hash_to_curve::try_and_increment::DIRECT_HASH_TO_G1,
        test_helpers::{keygen_committee, sign_with_committee},
    };
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    #[test]
    fn mask_bits() {
        let mask = ParticipantMask::from_u64(0b1011);
        assert!(mask.is_set(0));
        assert!(mask.is_set(1));
        assert!(!mask.is_set(2));
        assert!(mask.is_set(3));
        assert_eq!(mask.count(), 3);
        assert_eq!(mask.highest_set(), Some(3));
        assert_eq!(mask.to_bitmap(5), vec![true, true, false, true, false]);
        assert_eq!(ParticipantMask::from_bitmap(&mask.to_bitmap(5)), mask);
    }

    #[test]
    fn mask_covers_full_participant_range() {
        let mask = ParticipantMask::all(256);
        assert_eq!(mask.count(), 256);
        assert_eq!(mask.as_bytes(), &[0xff; 32]);

        let forty = ParticipantMask::all(40);
        assert_eq!(forty, ParticipantMask::from_u64((1u64 << 40) - 1));
        assert_eq!(ParticipantMask::default().highest_set(), None);
        assert!(ParticipantMask::from_bytes(&[0u8; 31]).is_err());
    }

    #[test]
    fn verifies_committee_signature() {
        let rng = &mut XorShiftRng::seed_from_u64(31);
        let hasher = &*DIRECT_HASH_TO_G1;
        let (keys, apk) = keygen_committee(rng, 3);
        let apk_bytes = apk.to_bytes().unwrap();
        let message = b"block header bytes";
        let sig = sign_with_committee(&keys, message).to_bytes().unwrap();

        let mut verifier = AggregateVerifier::new(hasher, 4);
        let mask = ParticipantMask::all(keys.len());
        verifier.verify(&apk_bytes, &mask, &sig, message).unwrap();
        assert_eq!(verifier.cached_keys(), 1);

        let err = verifier
            .verify(&apk_bytes, &mask, &sig, b"another header")
            .unwrap_err();
        assert!(err.is_mismatch());
    }

    #[test]
    fn partial_committee_fails_against_full_key() {
        let rng = &mut XorShiftRng::seed_from_u64(32);
        let hasher = &*DIRECT_HASH_TO_G1;
        let (keys, apk) = keygen_committee(rng, 3);
        let message = b"header";
        let sig = sign_with_committee(&keys[..2], message).to_bytes().unwrap();

        let mut verifier = AggregateVerifier::new(hasher, 4);
        let err = verifier
            .verify(
                &apk.to_bytes().unwrap(),
                &ParticipantMask::all(2),
                &sig,
                message,
            )
            .unwrap_err();
        assert!(err.is_mismatch());
    }

    #[test]
    fn malformed_inputs_fail_closed() {
        let rng = &mut XorShiftRng::seed_from_u64(33);
        let hasher = &*DIRECT_HASH_TO_G1;
        let (keys, apk) = keygen_committee(rng, 1);
        let sig = sign_with_committee(&keys, b"m").to_bytes().unwrap();
        let mut verifier = AggregateVerifier::new(hasher, 4);
        let mask = ParticipantMask::all(1);

        let err = verifier.verify(&[1u8; 10], &mask, &sig, b"m").unwrap_err();
        assert!(!err.is_mismatch());
        let err = verifier
            .verify(&apk.to_bytes().unwrap(), &mask, &sig[..40], b"m")
            .unwrap_err();
        assert!(!err.is_mismatch());
        assert_eq!(verifier.cached_keys(), 0);
    }
}
