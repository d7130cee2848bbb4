use crate::{BlsError, BlsResult, HashToCurve, PublicKey, Signature, POP_DOMAIN, SIG_DOMAIN};

use ark_bls12_377::{Fr, G1Projective, G2Projective};
use ark_ec::ProjectiveCurve;
use ark_ff::{PrimeField, UniformRand};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, Read, SerializationError, Write};
use rand::Rng;

/// Size of a serialized secret scalar
pub const PRIVATE_KEY_BYTES: usize = 32;

/// A BLS secret key, a scalar of BLS12-377's prime order subgroup
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct PrivateKey {
    sk: Fr,
}

impl From<Fr> for PrivateKey {
    fn from(sk: Fr) -> PrivateKey {
        PrivateKey { sk }
    }
}

impl AsRef<Fr> for PrivateKey {
    fn as_ref(&self) -> &Fr {
        &self.sk
    }
}

impl PrivateKey {
    pub fn generate<R: Rng>(rng: &mut R) -> PrivateKey {
        PrivateKey { sk: Fr::rand(rng) }
    }

    pub fn from_bytes(bytes: &[u8]) -> BlsResult<PrivateKey> {
        if bytes.len() != PRIVATE_KEY_BYTES {
            return Err(BlsError::InvalidLength {
                expected: PRIVATE_KEY_BYTES,
                actual: bytes.len(),
            });
        }
        Ok(PrivateKey::deserialize(bytes)?)
    }

    pub fn to_bytes(&self) -> BlsResult<Vec<u8>> {
        let mut bytes = Vec::with_capacity(PRIVATE_KEY_BYTES);
        self.serialize(&mut bytes)?;
        Ok(bytes)
    }

    /// Signs `message` (and optional `extra_data`) under the header signing domain
    pub fn sign<H: HashToCurve<Output = G1Projective>>(
        &self,
        message: &[u8],
        extra_data: &[u8],
        hash_to_g1: &H,
    ) -> BlsResult<Signature> {
        self.sign_message(SIG_DOMAIN, message, extra_data, hash_to_g1)
    }

    /// Signs this key's own compressed public key, proving possession of the secret
    pub fn sign_pop<H: HashToCurve<Output = G1Projective>>(
        &self,
        hash_to_g1: &H,
    ) -> BlsResult<Signature> {
        let pubkey = self.to_public().to_bytes()?;
        self.sign_message(POP_DOMAIN, &pubkey, &[], hash_to_g1)
    }

    fn sign_message<H: HashToCurve<Output = G1Projective>>(
        &self,
        domain: &[u8],
        message: &[u8],
        extra_data: &[u8],
        hash_to_g1: &H,
    ) -> BlsResult<Signature> {
        Ok(hash_to_g1
            .hash(domain, message, extra_data)?
            .mul(self.sk.into_repr())
            .into())
    }

    pub fn to_public(&self) -> PublicKey {
        PublicKey::from(G2Projective::prime_subgroup_generator().mul(self.sk.into_repr()))
    }
}
