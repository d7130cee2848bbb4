//! The verification engine: authenticates epoch rotations and inbound messages, and sequences
//! outbound sends.
//!
//! All persistent relay state lives in [`EngineState`], which callers own and pass by exclusive
//! reference into each operation. Every operation either applies completely or returns an
//! error with the state untouched.
mod handler;
mod outbound;
mod roles;

pub use handler::{HandlerRegistry, MessageHandler};
pub use outbound::{OutboundRecord, Outbox};
pub use roles::CallContext;

use crate::{
    codec::{BlockHeader, EpochUpdate, MessagePayload, Receiver, VerificationBundle},
    epoch::{Epoch, EpochRef, EpochStore},
    merkle::MerklePath,
    RelayConfig, RelayError, RelayResult, Role,
};
use relay_bls::{
    hash_to_curve::try_and_increment::{DirectHashToG1, DIRECT_HASH_TO_G1},
    AggregateVerifier, Signature,
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Whether the engine accepts traffic
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RelayState {
    Active,
    Inactive,
}

impl Default for RelayState {
    fn default() -> Self {
        RelayState::Inactive
    }
}

/// Process-wide relay state: the activity flag, both live epochs with their replay trackers,
/// and the next outbound nonce per destination
#[derive(Clone, Debug, Default)]
pub struct EngineState {
    pub state: RelayState,
    pub epochs: EpochStore,
    pub outbound_nonces: HashMap<Receiver, u64>,
}

impl EngineState {
    /// Inactive, with both epochs at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.state == RelayState::Active
    }

    fn require_active(&self) -> RelayResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(RelayError::InactiveState)
        }
    }

    pub fn current_epoch(&self) -> &Epoch {
        self.epochs.current()
    }

    pub fn previous_epoch(&self) -> &Epoch {
        self.epochs.previous()
    }

    /// The nonce the next send to `target` must carry
    pub fn next_nonce(&self, target: &Receiver) -> u64 {
        self.outbound_nonces.get(target).copied().unwrap_or_default()
    }
}

/// A successfully delivered message
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Delivery {
    #[serde(serialize_with = "hex::serialize")]
    pub request_id: [u8; 32],
    #[serde(serialize_with = "hex::serialize")]
    pub receiver: Receiver,
    /// Number of the epoch whose key validated the header
    pub epoch_number: u64,
    pub validated_by: EpochRef,
}

/// Stateless services shared by all operations: signature verification with its key cache,
/// the handler table and the outbound queue
pub struct Engine {
    config: RelayConfig,
    verifier: AggregateVerifier<'static, DirectHashToG1>,
    handlers: HandlerRegistry,
    outbox: Outbox,
}

impl Engine {
    pub fn new(config: RelayConfig) -> Self {
        let verifier = AggregateVerifier::new(&*DIRECT_HASH_TO_G1, config.key_cache_size);
        Engine {
            config,
            verifier,
            handlers: HandlerRegistry::default(),
            outbox: Outbox::default(),
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Installs the handler invoked for messages addressed to `receiver`
    pub fn register_handler(
        &mut self,
        ctx: &CallContext,
        receiver: Receiver,
        handler: Box<dyn MessageHandler>,
    ) -> RelayResult<()> {
        ctx.require(Role::Admin)?;
        info!(receiver = %hex::encode(receiver), "registered message handler");
        self.handlers.register(receiver, handler);
        Ok(())
    }

    pub fn set_state(
        &self,
        state: &mut EngineState,
        ctx: &CallContext,
        new_state: RelayState,
    ) -> RelayResult<()> {
        ctx.require(Role::Operator)?;
        if state.state != new_state {
            info!(from = ?state.state, to = ?new_state, "relay state changed");
        }
        state.state = new_state;
        Ok(())
    }

    /// Advances the current epoch number by one without touching keys or trackers, so that a
    /// rotation can target a later number. Allowed while inactive.
    pub fn reset_epoch(&self, state: &mut EngineState, ctx: &CallContext) -> RelayResult<u64> {
        ctx.require(Role::Operator)?;
        let number = state.epochs.reset();
        info!(epoch = number, "current epoch number reset");
        Ok(number)
    }

    /// Rotates in the validator set announced by the bundle's payload. The header must be signed
    /// by the current epoch, and the payload included under the header's transactions root.
    ///
    /// While the current epoch has no key (before the first rotation) there is nobody to sign,
    /// so the rotation is accepted on its inclusion proof alone.
    pub fn update_epoch(
        &mut self,
        state: &mut EngineState,
        ctx: &CallContext,
        bundle: &VerificationBundle,
    ) -> RelayResult<Epoch> {
        ctx.require(Role::Validator)?;
        state.require_active()?;

        let header = bundle.decode_header()?;
        let update = EpochUpdate::decode(&bundle.payload)?;
        let path = self.decode_path(&bundle.merkle_path)?;

        let current = state.epochs.current();
        if current.has_key() {
            let signature = Signature::from_bytes(&bundle.signature).map_err(RelayError::signature)?;
            self.verifier
                .verify_decoded(&current.public_key, &bundle.participants, &signature, &bundle.header)
                .map_err(RelayError::signature)?;
            debug!(epoch = current.epoch_number, "epoch update signature verified");
        } else {
            warn!(
                epoch = current.epoch_number,
                "current epoch has no key, accepting unsigned epoch update"
            );
        }

        check_inclusion(&path, &bundle.payload, &header)?;

        let expected = current.epoch_number + 1;
        let actual = update.epoch_number as u64;
        if actual != expected {
            return Err(RelayError::WrongEpochNumber { expected, actual });
        }

        self.verifier
            .decode_key(&update.public_key)
            .map_err(|e| RelayError::MalformedPayload(format!("new epoch key: {}", e)))?;

        let next = Epoch::new(
            update.public_key.clone(),
            update.participant_count()? as u32,
            actual,
        );
        state.epochs.rotate(next.clone())?;
        info!(
            epoch = next.epoch_number,
            participants = next.participant_count,
            version = update.version,
            "rotated to new epoch"
        );
        Ok(next)
    }

    /// Delivers a batch of messages. The outer error rejects the whole call; otherwise every
    /// bundle gets its own result and a failed bundle leaves no trace in the state.
    pub fn receive(
        &mut self,
        state: &mut EngineState,
        _ctx: &CallContext,
        bundles: &[VerificationBundle],
    ) -> RelayResult<Vec<RelayResult<Delivery>>> {
        state.require_active()?;
        if bundles.len() > self.config.max_batch_size {
            return Err(RelayError::BatchTooLarge {
                size: bundles.len(),
                max: self.config.max_batch_size,
            });
        }

        let results = bundles
            .iter()
            .enumerate()
            .map(|(index, bundle)| {
                let result = self.receive_one(state, bundle);
                if let Err(err) = &result {
                    warn!(index, error = %err, "rejected message bundle");
                }
                result
            })
            .collect();
        Ok(results)
    }

    fn receive_one(
        &mut self,
        state: &mut EngineState,
        bundle: &VerificationBundle,
    ) -> RelayResult<Delivery> {
        let header = bundle.decode_header()?;
        let message = MessagePayload::decode(&bundle.payload)?;
        let path = self.decode_path(&bundle.merkle_path)?;
        let signature = Signature::from_bytes(&bundle.signature).map_err(RelayError::signature)?;

        let validated_by = self.authenticate(&state.epochs, bundle, &signature)?;
        check_inclusion(&path, &bundle.payload, &header)?;

        if state.epochs.is_seen(&message.request_id) {
            return Err(RelayError::AlreadySeen(hex::encode(message.request_id)));
        }

        self.handlers.dispatch(&message)?;
        state.epochs.record(validated_by, message.request_id);

        let delivery = Delivery {
            request_id: message.request_id,
            receiver: message.receiver,
            epoch_number: state.epochs.epoch(validated_by).epoch_number,
            validated_by,
        };
        info!(
            request_id = %hex::encode(delivery.request_id),
            epoch = delivery.epoch_number,
            "delivered message"
        );
        Ok(delivery)
    }

    /// Finds the live epoch whose key validates the header signature, current first
    fn authenticate(
        &mut self,
        epochs: &EpochStore,
        bundle: &VerificationBundle,
        signature: &Signature,
    ) -> RelayResult<EpochRef> {
        for &which in &[EpochRef::Current, EpochRef::Previous] {
            let epoch = epochs.epoch(which);
            if !epoch.has_key() {
                continue;
            }
            match self.verifier.verify_decoded(
                &epoch.public_key,
                &bundle.participants,
                signature,
                &bundle.header,
            ) {
                Ok(()) => {
                    debug!(epoch = epoch.epoch_number, "header signature verified");
                    return Ok(which);
                }
                Err(err) => debug!(epoch = epoch.epoch_number, error = %err, "header signature rejected"),
            }
        }
        Err(RelayError::WrongEpoch)
    }

    /// Queues `payload` for delivery to `target`. `expected_nonce` must equal the destination's
    /// next nonce, which is then advanced by one.
    pub fn send(
        &mut self,
        state: &mut EngineState,
        ctx: &CallContext,
        payload: &[u8],
        target: Receiver,
        expected_nonce: u64,
    ) -> RelayResult<OutboundRecord> {
        ctx.require(Role::Gatekeeper)?;
        state.require_active()?;

        let epoch = state.epochs.current();
        if epoch.epoch_number == 0 || !epoch.has_key() {
            return Err(RelayError::EpochNotSet);
        }

        let nonce = state.next_nonce(&target);
        if expected_nonce != nonce {
            return Err(RelayError::NonceMismatch {
                expected: nonce,
                actual: expected_nonce,
            });
        }

        let record = OutboundRecord {
            nonce,
            target,
            epoch_number: epoch.epoch_number,
            participant_count: epoch.participant_count,
            payload: payload.to_vec(),
        };
        state.outbound_nonces.insert(target, nonce + 1);
        self.outbox.push(record.clone());
        info!(
            target = %hex::encode(target),
            nonce,
            epoch = record.epoch_number,
            "queued outbound message"
        );
        Ok(record)
    }

    /// Hands every queued outbound record to the caller
    pub fn take_outbound(&mut self) -> Vec<OutboundRecord> {
        self.outbox.drain()
    }

    pub fn pending_outbound(&self) -> usize {
        self.outbox.len()
    }

    fn decode_path(&self, bytes: &[u8]) -> RelayResult<MerklePath> {
        let path = MerklePath::decode(bytes)?;
        if let Some(max) = self.config.max_proof_depth {
            if path.len() > max {
                return Err(RelayError::ProofTooDeep {
                    depth: path.len(),
                    max,
                });
            }
        }
        Ok(path)
    }
}

fn check_inclusion(path: &MerklePath, payload: &[u8], header: &BlockHeader) -> RelayResult<()> {
    if path.verify(payload, &header.transactions_root) {
        Ok(())
    } else {
        Err(RelayError::MerkleMismatch)
    }
}
