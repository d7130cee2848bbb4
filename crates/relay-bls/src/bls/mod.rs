//! BLS signatures with proofs of possession, following
//! https://crypto.stanford.edu/~dabo/pubs/papers/BLSmultisig.html.
mod secret;
pub use secret::{PrivateKey, PRIVATE_KEY_BYTES};

mod public;
pub use public::{PublicKey, PUBLIC_KEY_BYTES};

mod signature;
pub use signature::{Signature, SIGNATURE_BYTES};

mod cache;
pub use cache::PublicKeyCache;

mod aggregate;
pub use aggregate::{AggregateVerifier, ParticipantMask};
