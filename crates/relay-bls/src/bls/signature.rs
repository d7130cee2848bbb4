use crate::{BlsError, BlsResult};

use ark_bls12_377::{G1Affine, G1Projective};
use ark_ec::{AffineCurve, ProjectiveCurve};
use ark_ff::Zero;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use std::borrow::Borrow;

/// Size of a compressed G1 element
pub const SIGNATURE_BYTES: usize = 48;

/// A BLS signature on G1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature(G1Projective);

impl From<G1Projective> for Signature {
    fn from(sig: G1Projective) -> Signature {
        Signature(sig)
    }
}

impl AsRef<G1Projective> for Signature {
    fn as_ref(&self) -> &G1Projective {
        &self.0
    }
}

impl Signature {
    /// Sums the provided signatures to produce the aggregate signature.
    pub fn aggregate<S: Borrow<Signature>>(signatures: impl IntoIterator<Item = S>) -> Signature {
        signatures
            .into_iter()
            .map(|s| s.borrow().0)
            .sum::<G1Projective>()
            .into()
    }

    /// Decodes a compressed signature. The identity element is rejected since it is the
    /// only signature an identity key could produce.
    pub fn from_bytes(bytes: &[u8]) -> BlsResult<Signature> {
        if bytes.len() != SIGNATURE_BYTES {
            return Err(BlsError::InvalidLength {
                expected: SIGNATURE_BYTES,
                actual: bytes.len(),
            });
        }
        let affine = G1Affine::deserialize(bytes)?;
        if affine.is_zero() {
            return Err(BlsError::IdentityPoint("signature"));
        }
        Ok(Signature(affine.into_projective()))
    }

    pub fn to_bytes(&self) -> BlsResult<Vec<u8>> {
        let mut bytes = Vec::with_capacity(SIGNATURE_BYTES);
        self.0.into_affine().serialize(&mut bytes)?;
        Ok(bytes)
    }
}
