use crate::{hash_to_curve::try_and_increment::DIRECT_HASH_TO_G1, PrivateKey, PublicKey, Signature};
use rand::Rng;

/// Generates `num` validator keys and returns them along with their aggregate public key
pub fn keygen_committee<R: Rng>(rng: &mut R, num: usize) -> (Vec<PrivateKey>, PublicKey) {
    let keys = (0..num).map(|_| PrivateKey::generate(rng)).collect::<Vec<_>>();
    let pubkeys = keys.iter().map(|k| k.to_public()).collect::<Vec<_>>();
    let aggregate = PublicKey::aggregate(&pubkeys);
    (keys, aggregate)
}

/// Signs `message` with each key under the relay's signature domain and aggregates the result
pub fn sign_with_committee(keys: &[PrivateKey], message: &[u8]) -> Signature {
    let sigs = keys
        .iter()
        .map(|k| k.sign(message, &[], &*DIRECT_HASH_TO_G1).unwrap())
        .collect::<Vec<_>>();
    Signature::aggregate(&sigs)
}
