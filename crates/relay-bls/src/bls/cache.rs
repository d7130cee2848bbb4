use super::PublicKey;
use crate::BlsResult;

use lru::LruCache;

/// Keeps recently decoded public keys around. Decompressing a G2 point and checking its
/// subgroup membership costs far more than a hash lookup, and the relay verifies against
/// the same two epoch keys over and over.
pub struct PublicKeyCache {
    /// An in-memory mapping of serialized pubkey byte arrays to their deserialized
    /// group element representation
    de: LruCache<Vec<u8>, PublicKey>,
}

impl PublicKeyCache {
    /// Initializes an empty cache holding at most `capacity` keys, and never fewer than one
    pub fn new(capacity: usize) -> Self {
        Self {
            de: LruCache::new(capacity.max(1)),
        }
    }

    /// Returns the PublicKey corresponding to the serialized data from the cache, or decodes
    /// the element, saves it to the cache for later use and returns it. Decoding failures
    /// are not cached.
    pub fn deserialize(&mut self, data: &[u8]) -> BlsResult<PublicKey> {
        let key = data.to_vec();
        if let Some(cached) = self.de.get(&key) {
            return Ok(cached.clone());
        }
        let decoded = PublicKey::from_bytes(data)?;
        self.de.put(key, decoded.clone());
        Ok(decoded)
    }

    pub fn len(&self) -> usize {
        self.de.len()
    }

    pub fn is_empty(&self) -> bool {
        self.de.is_empty()
    }

    pub fn clear(&mut self) {
        self.de.clear();
    }
}
