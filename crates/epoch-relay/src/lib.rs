//! # Epoch Relay
//!
//! Authenticates cross-chain messages. A rotating validator epoch signs source chain headers
//! with an aggregated BLS key; a message is accepted when one of the two live epochs signed the
//! header, a Merkle path places the message under the header's transactions root, and its
//! request id has not been seen before.

pub mod codec;

pub mod config;
pub use config::RelayConfig;

pub mod engine;
pub use engine::{
    CallContext, Delivery, Engine, EngineState, MessageHandler, OutboundRecord, RelayState,
};

pub mod epoch;
pub use epoch::{Epoch, EpochRef, EpochStore};

mod error;
pub use error::{RelayError, RelayResult, Role};

pub mod merkle;

pub mod replay;
pub use replay::ReplayTracker;
