use relay_bls::BlsError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Convenience result alias
pub type RelayResult<T> = std::result::Result<T, RelayError>;

/// Caller capabilities checked by the engine. Assignment of roles is handled outside the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Role {
    Admin,
    Operator,
    Validator,
    Gatekeeper,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "admin",
            Role::Operator => "operator",
            Role::Validator => "validator",
            Role::Gatekeeper => "gatekeeper",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
/// Every way a relay operation can be rejected. The engine state is untouched whenever one is returned.
pub enum RelayError {
    #[error("malformed header: {0}")]
    MalformedHeader(String),
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("invalid signature: {0}")]
    InvalidSignature(String),
    #[error("merkle proof does not resolve to the transactions root")]
    MerkleMismatch,
    #[error("merkle proof has {depth} steps, more than the allowed {max}")]
    ProofTooDeep { depth: usize, max: usize },
    #[error("wrong epoch number: expected {expected}, got {actual}")]
    WrongEpochNumber { expected: u64, actual: u64 },
    #[error("wrong epoch")]
    WrongEpoch,
    #[error("request id already seen: {0}")]
    AlreadySeen(String),
    #[error("state inactive")]
    InactiveState,
    #[error("epoch not set")]
    EpochNotSet,
    #[error("nonce mismatch: expected {expected}, got {actual}")]
    NonceMismatch { expected: u64, actual: u64 },
    #[error("caller lacks the {0} role")]
    MissingRole(Role),
    #[error("batch of {size} bundles exceeds the limit of {max}")]
    BatchTooLarge { size: usize, max: usize },
    #[error("no handler registered for receiver {0}")]
    UnknownReceiver(String),
    #[error("handler failed: {0}")]
    DispatchFailed(String),
}

impl RelayError {
    /// Errors from the BLS layer surface as authentication failures: a key or signature that
    /// does not decode is treated exactly like one that does not verify
    pub(crate) fn signature(err: BlsError) -> Self {
        RelayError::InvalidSignature(err.to_string())
    }
}
