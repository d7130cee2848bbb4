use super::Hasher;
use crate::BlsError;
use blake2s_simd::Params;

/// Blake2s personalization strings are limited to 8 bytes
const MAX_DOMAIN_LENGTH: usize = 8;

/// Size of a single Blake2s digest, and of each XOF output block
const DIGEST_LENGTH: usize = 32;

/// A hasher that runs Blake2s as the CRH and a Blake2Xs-style tree expansion as the XOF
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectHasher;

fn check_domain(domain: &[u8]) -> Result<(), BlsError> {
    if domain.len() > MAX_DOMAIN_LENGTH {
        return Err(BlsError::DomainTooLarge(domain.len()));
    }
    Ok(())
}

impl Hasher for DirectHasher {
    type Error = BlsError;

    fn crh(&self, domain: &[u8], message: &[u8], _: usize) -> Result<Vec<u8>, Self::Error> {
        check_domain(domain)?;
        let hash = Params::new()
            .hash_length(DIGEST_LENGTH)
            .personal(domain)
            .to_state()
            .update(message)
            .finalize();
        Ok(hash.as_ref().to_vec())
    }

    fn xof(
        &self,
        domain: &[u8],
        hashed_message: &[u8],
        output_size_in_bytes: usize,
    ) -> Result<Vec<u8>, Self::Error> {
        check_domain(domain)?;
        let num_hashes = (output_size_in_bytes + DIGEST_LENGTH - 1) / DIGEST_LENGTH;
        // the upper half of the node offset carries the total output length so that
        // different output sizes never share a prefix
        let xof_length = (output_size_in_bytes as u64) << 32;

        let mut result = Vec::with_capacity(num_hashes * DIGEST_LENGTH);
        for i in 0..num_hashes {
            let hash_length = if i == num_hashes - 1 && output_size_in_bytes % DIGEST_LENGTH != 0 {
                output_size_in_bytes % DIGEST_LENGTH
            } else {
                DIGEST_LENGTH
            };
            let hash = Params::new()
                .hash_length(hash_length)
                .max_leaf_length(DIGEST_LENGTH as u32)
                .inner_hash_length(DIGEST_LENGTH)
                .fanout(0)
                .max_depth(0)
                .node_offset(xof_length | i as u64)
                .personal(domain)
                .to_state()
                .update(hashed_message)
                .finalize();
            result.extend_from_slice(hash.as_ref());
        }

        Ok(result)
    }
}
