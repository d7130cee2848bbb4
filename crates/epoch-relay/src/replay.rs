use std::collections::HashSet;

/// Identifier of a relayed message
pub type RequestId = [u8; 32];

/// Append-only set of request ids accepted under a single epoch. Trackers are never cleared:
/// when their epoch leaves the acceptance window the whole tracker is dropped.
#[derive(Clone, Debug, Default)]
pub struct ReplayTracker {
    seen: HashSet<RequestId>,
}

impl ReplayTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &RequestId) -> bool {
        self.seen.contains(id)
    }

    /// Records `id`, returning false if it was already present
    pub fn insert(&mut self, id: RequestId) -> bool {
        self.seen.insert(id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
