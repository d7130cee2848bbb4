use crate::{BlsError, BlsResult, HashToCurve, Signature, POP_DOMAIN, SIG_DOMAIN};

use ark_bls12_377::{Bls12_377, Fq12, G1Projective, G2Affine, G2Projective};
use ark_ec::{AffineCurve, PairingEngine, ProjectiveCurve};
use ark_ff::{One, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use log::debug;

use std::{borrow::Borrow, ops::Neg};

/// Size of a compressed G2 element
pub const PUBLIC_KEY_BYTES: usize = 96;

/// A BLS public key on G2
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey(G2Projective);

impl From<G2Projective> for PublicKey {
    fn from(pk: G2Projective) -> PublicKey {
        PublicKey(pk)
    }
}

impl AsRef<G2Projective> for PublicKey {
    fn as_ref(&self) -> &G2Projective {
        &self.0
    }
}

impl PublicKey {
    /// Sums the provided keys. Every key must come with a verified proof of possession,
    /// otherwise the sum is open to rogue key attacks.
    pub fn aggregate<P: Borrow<PublicKey>>(public_keys: impl IntoIterator<Item = P>) -> PublicKey {
        public_keys
            .into_iter()
            .map(|pk| pk.borrow().0)
            .sum::<G2Projective>()
            .into()
    }

    /// Decodes a compressed key, rejecting wrong lengths, points outside the prime order
    /// subgroup and the point at infinity
    pub fn from_bytes(bytes: &[u8]) -> BlsResult<PublicKey> {
        if bytes.len() != PUBLIC_KEY_BYTES {
            return Err(BlsError::InvalidLength {
                expected: PUBLIC_KEY_BYTES,
                actual: bytes.len(),
            });
        }
        let affine = G2Affine::deserialize(bytes)?;
        if affine.is_zero() {
            return Err(BlsError::IdentityPoint("public key"));
        }
        Ok(PublicKey(affine.into_projective()))
    }

    pub fn to_bytes(&self) -> BlsResult<Vec<u8>> {
        let mut bytes = Vec::with_capacity(PUBLIC_KEY_BYTES);
        self.0.into_affine().serialize(&mut bytes)?;
        Ok(bytes)
    }

    pub fn verify<H: HashToCurve<Output = G1Projective>>(
        &self,
        message: &[u8],
        extra_data: &[u8],
        signature: &Signature,
        hash_to_g1: &H,
    ) -> BlsResult<()> {
        self.verify_sig(SIG_DOMAIN, message, extra_data, signature, hash_to_g1)
    }

    /// Checks that `signature` is this key's signature over its own encoding
    pub fn verify_pop<H: HashToCurve<Output = G1Projective>>(
        &self,
        signature: &Signature,
        hash_to_g1: &H,
    ) -> BlsResult<()> {
        let message = self.to_bytes()?;
        self.verify_sig(POP_DOMAIN, &message, &[], signature, hash_to_g1)
    }

    fn verify_sig<H: HashToCurve<Output = G1Projective>>(
        &self,
        domain: &[u8],
        message: &[u8],
        extra_data: &[u8],
        signature: &Signature,
        hash_to_g1: &H,
    ) -> BlsResult<()> {
        if self.0.is_zero() || signature.as_ref().is_zero() {
            return Err(BlsError::VerificationFailed);
        }
        let pairing = Bls12_377::product_of_pairings(&vec![
            (
                signature.as_ref().into_affine().into(),
                G2Affine::prime_subgroup_generator().neg().into(),
            ),
            (
                hash_to_g1
                    .hash(domain, message, extra_data)?
                    .into_affine()
                    .into(),
                self.0.into_affine().into(),
            ),
        ]);
        if pairing == Fq12::one() {
            Ok(())
        } else {
            debug!("pairing check failed for message {}", hex::encode(message));
            Err(BlsError::VerificationFailed)
        }
    }
}
