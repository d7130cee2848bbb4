use crate::codec::{MessagePayload, Receiver};
use crate::{RelayError, RelayResult};
use std::collections::HashMap;
use tracing::debug;

/// Destination-side effect of a delivered message
pub trait MessageHandler: Send {
    fn handle(&mut self, message: &MessagePayload) -> eyre::Result<()>;
}

impl<F> MessageHandler for F
where
    F: FnMut(&MessagePayload) -> eyre::Result<()> + Send,
{
    fn handle(&mut self, message: &MessagePayload) -> eyre::Result<()> {
        self(message)
    }
}

/// Maps receiver addresses to their handlers
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<Receiver, Box<dyn MessageHandler>>,
}

impl HandlerRegistry {
    /// Installs `handler` for `receiver`, replacing any previous one
    pub fn register(&mut self, receiver: Receiver, handler: Box<dyn MessageHandler>) {
        self.handlers.insert(receiver, handler);
    }

    pub fn contains(&self, receiver: &Receiver) -> bool {
        self.handlers.contains_key(receiver)
    }

    pub fn dispatch(&mut self, message: &MessagePayload) -> RelayResult<()> {
        let handler = self
            .handlers
            .get_mut(&message.receiver)
            .ok_or_else(|| RelayError::UnknownReceiver(hex::encode(message.receiver)))?;
        debug!(
            receiver = %hex::encode(message.receiver),
            call_data_len = message.call_data.len(),
            "dispatching message"
        );
        handler
            .handle(message)
            .map_err(|e| RelayError::DispatchFailed(format!("{:#}", e)))
    }
}
