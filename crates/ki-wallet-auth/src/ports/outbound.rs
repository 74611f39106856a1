//! # Outbound Ports (Driven Ports)
//!
//! Dependencies the host application provides: nonce persistence and a clock.

use crate::domain::entities::{Nonce, Timestamp};
use std::sync::Arc;
use thiserror::Error;

/// Error from nonce persistence.
///
/// Distinct from an invalid nonce: a storage failure is transient and the
/// caller may retry, whereas an invalid nonce is a final answer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NonceStoreError {
    /// A nonce with this value already exists
    #[error("Nonce already exists")]
    Duplicate,

    /// The backing store could not be reached or failed mid-operation
    #[error("Nonce store unavailable: {0}")]
    Unavailable(String),
}

/// Key-value persistence for nonce rows, keyed by nonce value.
///
/// Production: a database table with a primary key on the value
/// Testing: `InMemoryNonceStore` (adapters/memory.rs)
pub trait NonceStore: Send + Sync {
    /// Insert a new row. Fails with `Duplicate` if the value already exists.
    fn insert(&self, nonce: Nonce) -> Result<(), NonceStoreError>;

    /// Fetch a row by value.
    fn get(&self, value: &str) -> Result<Option<Nonce>, NonceStoreError>;

    /// Atomically set `used = true` if the row exists, is unused and
    /// `now < expires_at`.
    ///
    /// ## Atomicity Guarantee
    ///
    /// This is a single compare-and-set, equivalent to
    /// `UPDATE nonces SET used = true WHERE nonce = ? AND used = false AND expires_at > ?`.
    /// Of any number of concurrent calls for one value, at most one returns `true`.
    fn mark_used_if_live(&self, value: &str, now: Timestamp) -> Result<bool, NonceStoreError>;

    /// Delete every row with `expires_at < now`, returning how many were removed.
    fn delete_expired(&self, now: Timestamp) -> Result<usize, NonceStoreError>;
}

/// Wall clock abstraction (for testability).
pub trait TimeSource: Send + Sync {
    /// Current Unix timestamp in seconds.
    fn now(&self) -> Timestamp;

    /// Current Unix timestamp in milliseconds.
    fn now_millis(&self) -> u64 {
        self.now().saturating_mul(1_000)
    }
}

impl<S: NonceStore + ?Sized> NonceStore for Arc<S> {
    fn insert(&self, nonce: Nonce) -> Result<(), NonceStoreError> {
        (**self).insert(nonce)
    }

    fn get(&self, value: &str) -> Result<Option<Nonce>, NonceStoreError> {
        (**self).get(value)
    }

    fn mark_used_if_live(&self, value: &str, now: Timestamp) -> Result<bool, NonceStoreError> {
        (**self).mark_used_if_live(value, now)
    }

    fn delete_expired(&self, now: Timestamp) -> Result<usize, NonceStoreError> {
        (**self).delete_expired(now)
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }

    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }
}
