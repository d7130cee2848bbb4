use log::trace;
use std::marker::PhantomData;

use super::{hash_length, HashToCurve};
use crate::hashers::{DirectHasher, Hasher};
use crate::BlsError;

use ark_bls12_377::g1;
use ark_ec::{
    models::{
        short_weierstrass_jacobian::{GroupAffine, GroupProjective},
        SWModelParameters,
    },
    AffineCurve,
};
use ark_ff::Zero;
use ark_serialize::CanonicalSerialize;

use once_cell::sync::Lazy;

const NUM_TRIES: u8 = 255;

/// Try-and-increment hasher to BLS12-377's G1 over Blake2s (CRH) and Blake2Xs (XOF).
pub type DirectHashToG1 = TryAndIncrement<'static, DirectHasher, g1::Parameters>;

/// The hasher used for every header and proof-of-possession signature in the relay.
pub static DIRECT_HASH_TO_G1: Lazy<DirectHashToG1> = Lazy::new(|| TryAndIncrement::new(&DirectHasher));

/// A try-and-increment method for hashing to G1 and G2. See page 521 in
/// https://link.springer.com/content/pdf/10.1007/3-540-45682-1_30.pdf.
#[derive(Clone)]
pub struct TryAndIncrement<'a, H, P> {
    hasher: &'a H,
    curve_params: PhantomData<P>,
}

impl<'a, H, P> TryAndIncrement<'a, H, P>
where
    H: Hasher<Error = BlsError>,
    P: SWModelParameters,
{
    /// Instantiates a new Try-and-increment hasher with the provided hashing method
    /// and curve parameters based on the type
    pub fn new(h: &'a H) -> Self {
        TryAndIncrement {
            hasher: h,
            curve_params: PhantomData,
        }
    }

    /// Hashes the input prefixed with a one-byte counter until the digest decodes to a curve
    /// point whose cofactor-cleared multiple is not the identity. Returns the point and the
    /// counter value that produced it.
    pub fn hash_with_attempt(
        &self,
        domain: &[u8],
        message: &[u8],
        extra_data: &[u8],
    ) -> Result<(GroupProjective<P>, usize), BlsError> {
        let num_bytes = GroupAffine::<P>::zero().serialized_size();
        let hash_bytes = hash_length(num_bytes);

        for c in 0..NUM_TRIES {
            let candidate_hash =
                self.hasher
                    .hash(domain, &[&[c][..], extra_data, message].concat(), hash_bytes)?;

            if let Some(p) = GroupAffine::<P>::from_random_bytes(&candidate_hash[..num_bytes]) {
                let scaled = p.mul_by_cofactor_to_projective();
                if scaled.is_zero() {
                    continue;
                }

                trace!(
                    "succeeded hashing \"{}\" to curve in {} tries",
                    hex::encode(message),
                    c
                );
                return Ok((scaled, c as usize));
            }
        }
        Err(BlsError::HashToCurveError)
    }
}

impl<'a, H, P> HashToCurve for TryAndIncrement<'a, H, P>
where
    H: Hasher<Error = BlsError>,
    P: SWModelParameters,
{
    type Output = GroupProjective<P>;

    fn hash(
        &self,
        domain: &[u8],
        message: &[u8],
        extra_data: &[u8],
    ) -> Result<Self::Output, BlsError> {
        self.hash_with_attempt(domain, message, extra_data)
            .map(|res| res.0)
    }
}
