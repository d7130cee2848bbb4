use crate::replay::{ReplayTracker, RequestId};
use crate::{RelayError, RelayResult};
use serde::Serialize;

/// A validator set generation. The zero epoch has no key and cannot sign anything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Epoch {
    /// Compressed aggregated public key, empty for the zero epoch
    #[serde(serialize_with = "hex::serialize")]
    pub public_key: Vec<u8>,
    pub participant_count: u32,
    pub epoch_number: u64,
}

impl Epoch {
    pub fn new(public_key: Vec<u8>, participant_count: u32, epoch_number: u64) -> Self {
        Epoch {
            public_key,
            participant_count,
            epoch_number,
        }
    }

    pub fn has_key(&self) -> bool {
        !self.public_key.is_empty()
    }
}

/// Selects one of the two live epochs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum EpochRef {
    Current,
    Previous,
}

#[derive(Clone, Debug, Default)]
struct EpochSlot {
    epoch: Epoch,
    seen: ReplayTracker,
}

/// Holds the current and previous epochs with their replay trackers.
///
/// The two slots are fixed; rotation overwrites the slot holding the previous epoch with the
/// incoming one and a fresh tracker, then flips which slot is current. The old current epoch
/// keeps its tracker and becomes previous.
#[derive(Clone, Debug, Default)]
pub struct EpochStore {
    slots: [EpochSlot; 2],
    current: usize,
}

impl EpochStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn index(&self, which: EpochRef) -> usize {
        match which {
            EpochRef::Current => self.current,
            EpochRef::Previous => 1 - self.current,
        }
    }

    pub fn epoch(&self, which: EpochRef) -> &Epoch {
        &self.slots[self.index(which)].epoch
    }

    pub fn current(&self) -> &Epoch {
        self.epoch(EpochRef::Current)
    }

    pub fn previous(&self) -> &Epoch {
        self.epoch(EpochRef::Previous)
    }

    pub fn tracker(&self, which: EpochRef) -> &ReplayTracker {
        &self.slots[self.index(which)].seen
    }

    /// True if either live epoch has already accepted `id`
    pub fn is_seen(&self, id: &RequestId) -> bool {
        self.slots.iter().any(|slot| slot.seen.contains(id))
    }

    /// Records `id` against the given epoch, returning false if that tracker already held it
    pub fn record(&mut self, which: EpochRef, id: RequestId) -> bool {
        let index = self.index(which);
        self.slots[index].seen.insert(id)
    }

    /// Advances the current epoch number by one, leaving its key, the previous epoch and both
    /// trackers alone. Returns the new number.
    pub fn reset(&mut self) -> u64 {
        let index = self.current;
        let epoch = &mut self.slots[index].epoch;
        epoch.epoch_number += 1;
        epoch.epoch_number
    }

    /// Installs `next` as the current epoch. Its number must be exactly one above the current one.
    pub fn rotate(&mut self, next: Epoch) -> RelayResult<()> {
        let expected = self.current().epoch_number + 1;
        if next.epoch_number != expected {
            return Err(RelayError::WrongEpochNumber {
                expected,
                actual: next.epoch_number,
            });
        }
        let discarded = self.index(EpochRef::Previous);
        self.slots[discarded] = EpochSlot {
            epoch: next,
            seen: ReplayTracker::new(),
        };
        self.current = discarded;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn epoch(n: u64) -> Epoch {
        Epoch::new(vec![n as u8; 96], 4, n)
    }

    #[test]
    fn genesis_is_two_zero_epochs() {
        let store = EpochStore::new();
        assert_eq!(store.current(), &Epoch::default());
        assert_eq!(store.previous(), &Epoch::default());
        assert!(!store.current().has_key());
    }

    #[test]
    fn rotation_demotes_current() {
        let mut store = EpochStore::new();
        store.rotate(epoch(1)).unwrap();
        assert_eq!(store.current(), &epoch(1));
        assert_eq!(store.previous(), &Epoch::default());

        store.rotate(epoch(2)).unwrap();
        assert_eq!(store.current(), &epoch(2));
        assert_eq!(store.previous(), &epoch(1));
    }

    #[test]
    fn rotation_requires_next_number() {
        let mut store = EpochStore::new();
        assert_eq!(
            store.rotate(epoch(2)),
            Err(RelayError::WrongEpochNumber {
                expected: 1,
                actual: 2
            })
        );
        store.rotate(epoch(1)).unwrap();
        assert!(matches!(
            store.rotate(epoch(1)),
            Err(RelayError::WrongEpochNumber { .. })
        ));
        assert_eq!(store.current(), &epoch(1));
    }

    #[test]
    fn trackers_follow_their_epochs() {
        let mut store = EpochStore::new();
        store.rotate(epoch(1)).unwrap();
        assert!(store.record(EpochRef::Current, [1; 32]));
        assert!(!store.record(EpochRef::Current, [1; 32]));

        store.rotate(epoch(2)).unwrap();
        // epoch 1 is now previous and keeps its history, epoch 2 starts empty
        assert!(store.tracker(EpochRef::Previous).contains(&[1; 32]));
        assert!(store.tracker(EpochRef::Current).is_empty());
        assert!(store.is_seen(&[1; 32]));

        store.rotate(epoch(3)).unwrap();
        // epoch 1 left the window along with its tracker
        assert!(!store.is_seen(&[1; 32]));
    }

    #[test]
    fn reset_only_bumps_current_number() {
        let mut store = EpochStore::new();
        store.rotate(epoch(1)).unwrap();
        store.record(EpochRef::Current, [9; 32]);

        assert_eq!(store.reset(), 2);
        assert_eq!(store.current().public_key, epoch(1).public_key);
        assert_eq!(store.current().epoch_number, 2);
        assert_eq!(store.previous(), &Epoch::default());
        assert!(store.is_seen(&[9; 32]));

        store.rotate(epoch(3)).unwrap();
        assert_eq!(store.previous().epoch_number, 2);
    }
}
