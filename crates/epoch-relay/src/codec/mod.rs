//! Byte layouts exchanged with relayers. Decoding is structural only: nothing in here checks
//! signatures, keys or proofs.
mod bundle;
mod epoch_update;
mod header;
mod message;
pub mod varint;

pub use bundle::VerificationBundle;
pub use epoch_update::EpochUpdate;
pub use header::{BlockHeader, HEADER_BYTES};
pub use message::{MessagePayload, Receiver, MESSAGE_PREFIX_BYTES, RECEIVER_BYTES, REQUEST_ID_BYTES};

use crate::{RelayError, RelayResult};

/// Splits `len` bytes off the front of `input`, failing with `MalformedPayload` naming `what`
pub(crate) fn take<'a>(input: &mut &'a [u8], len: usize, what: &str) -> RelayResult<&'a [u8]> {
    if input.len() < len {
        return Err(RelayError::MalformedPayload(format!(
            "{} needs {} bytes, {} left",
            what,
            len,
            input.len()
        )));
    }
    let (head, tail) = input.split_at(len);
    *input = tail;
    Ok(head)
}
