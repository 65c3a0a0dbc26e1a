/*!
 * Duplicate suppression for stream posts.
 *
 * The server may deliver the same post more than once (reconnect replays,
 * multiple sessions). Posts are remembered by id when they carry one and by a
 * hash of `(user_id, channel_id, text)` otherwise. Both registries are bounded
 * and evict in insertion order; seeing an entry again does not refresh it.
 */

use sha2::{Digest, Sha256};
use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

use crate::stream::protocol::IncomingPost;

/// Default capacity of each registry
pub const DEFAULT_CAPACITY: usize = 1000;

/// Insertion-ordered set with FIFO eviction
#[derive(Debug, Clone)]
pub struct BoundedSeenSet<K> {
    entries: HashSet<K>,
    order: VecDeque<K>,
    capacity: usize,
}

impl<K: Eq + Hash + Clone> BoundedSeenSet<K> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashSet::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert `key`, returning false if it was already present
    pub fn insert(&mut self, key: K) -> bool {
        if self.entries.contains(&key) {
            return false;
        }

        self.entries.insert(key.clone());
        self.order.push_back(key);

        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        true
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

/// Dedup engine owned by the stream worker
#[derive(Debug, Clone)]
pub struct DedupEngine {
    by_id: BoundedSeenSet<String>,
    by_content: BoundedSeenSet<[u8; 32]>,
}

impl Default for DedupEngine {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl DedupEngine {
    pub fn new(capacity: usize) -> Self {
        Self {
            by_id: BoundedSeenSet::new(capacity),
            by_content: BoundedSeenSet::new(capacity),
        }
    }

    /// Record `post`; returns false if it is a repeat and should be dropped
    pub fn observe(&mut self, post: &IncomingPost) -> bool {
        match post.id.as_deref() {
            Some(id) => self.by_id.insert(id.to_string()),
            None => self.by_content.insert(Self::content_key(post)),
        }
    }

    /// SHA-256 over the NUL-separated identity fields
    pub fn content_key(post: &IncomingPost) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(post.user_id.as_bytes());
        hasher.update([0u8]);
        hasher.update(post.channel_id.as_bytes());
        hasher.update([0u8]);
        hasher.update(post.text.as_bytes());
        hasher.finalize().into()
    }

    /// Entries across both registries
    pub fn len(&self) -> usize {
        self.by_id.len() + self.by_content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty() && self.by_content.is_empty()
    }

    /// Capacity of each registry
    pub fn capacity(&self) -> usize {
        self.by_id.capacity()
    }

    pub fn clear(&mut self) {
        self.by_id.clear();
        self.by_content.clear();
    }
}
