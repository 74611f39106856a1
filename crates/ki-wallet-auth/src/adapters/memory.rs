//! # In-Memory Nonce Store
//!
//! `NonceStore` backed by a sharded concurrent map. Each row is guarded by its
//! shard lock, so the compare-and-set in `mark_used_if_live` is atomic per
//! nonce while unrelated nonces proceed in parallel.

use crate::domain::entities::{Nonce, Timestamp};
use crate::ports::outbound::{NonceStore, NonceStoreError};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Concurrent in-memory nonce table.
///
/// Suitable for a single-process deployment and for tests. Rows are lost on
/// restart, which only invalidates outstanding nonces.
#[derive(Debug, Default)]
pub struct InMemoryNonceStore {
    rows: DashMap<String, Nonce>,
}

impl InMemoryNonceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows, live or not.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl NonceStore for InMemoryNonceStore {
    fn insert(&self, nonce: Nonce) -> Result<(), NonceStoreError> {
        match self.rows.entry(nonce.value.clone()) {
            Entry::Occupied(_) => Err(NonceStoreError::Duplicate),
            Entry::Vacant(slot) => {
                slot.insert(nonce);
                Ok(())
            }
        }
    }

    fn get(&self, value: &str) -> Result<Option<Nonce>, NonceStoreError> {
        Ok(self.rows.get(value).map(|row| row.value().clone()))
    }

    fn mark_used_if_live(&self, value: &str, now: Timestamp) -> Result<bool, NonceStoreError> {
        // get_mut holds the shard write lock for the whole check-and-set
        let Some(mut row) = self.rows.get_mut(value) else {
            return Ok(false);
        };
        if !row.is_live(now) {
            return Ok(false);
        }
        row.used = true;
        Ok(true)
    }

    fn delete_expired(&self, now: Timestamp) -> Result<usize, NonceStoreError> {
        let mut removed = 0;
        self.rows.retain(|_, nonce| {
            let keep = nonce.expires_at >= now;
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}
