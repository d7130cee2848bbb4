//! # Relay BLS
//!
//! BLS signatures over BLS12-377 as used by the epoch relay: validator keys live in G2,
//! signatures in G1, and an epoch's signing authority is a single pre-aggregated public key.
/// BLS signing
pub(crate) mod bls;
pub use bls::{
    AggregateVerifier, ParticipantMask, PrivateKey, PublicKey, PublicKeyCache, Signature,
    PRIVATE_KEY_BYTES, PUBLIC_KEY_BYTES, SIGNATURE_BYTES,
};

/// Hashing to curve utilities
pub mod hash_to_curve;
pub use hash_to_curve::HashToCurve;

/// Useful hash functions
pub mod hashers;
pub use hashers::Hasher;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

use ark_serialize::SerializationError;
use thiserror::Error;

/// Convenience result alias
pub type BlsResult<T> = std::result::Result<T, BlsError>;

/// Domain separator for signing block headers
pub const SIG_DOMAIN: &[u8] = b"ERforsig";

/// Domain separator for Proofs of Possession
pub const POP_DOMAIN: &[u8] = b"ERforpop";

#[derive(Debug, Error)]
/// Error type
pub enum BlsError {
    /// The pairing check did not hold
    #[error("signature verification failed")]
    VerificationFailed,
    /// Personalization string cannot be larger than 8 bytes
    #[error("domain length is too large: {0}")]
    DomainTooLarge(usize),
    #[error("could not hash to curve")]
    HashToCurveError,
    /// An encoded element had the wrong size
    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    /// The point at infinity was supplied where a real key or signature is required
    #[error("the point at infinity is not a valid {0}")]
    IdentityPoint(&'static str),
    #[error("{0}")]
    SerializationError(#[from] SerializationError),
}

impl BlsError {
    /// Returns true if the inputs decoded but the pairing check failed, as opposed to the
    /// inputs being malformed
    pub fn is_mismatch(&self) -> bool {
        matches!(self, BlsError::VerificationFailed)
    }
}
