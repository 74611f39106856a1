//! # Nonce Ledger
//!
//! Issues, validates and consumes single-use claim nonces.
//!
//! Per nonce: `Issued -> Consumed` (terminal) or `Issued -> Expired`
//! (terminal, a predicate on the clock rather than a stored transition).
//! Rows are physically removed only by [`NonceLedger::sweep_expired`].
//!
//! ## Concurrency
//!
//! The ledger holds no lock of its own. `consume` is a single
//! [`NonceStore::mark_used_if_live`] call, so two racing consumers of the same
//! value can never both succeed. Issuance relies on the store's uniqueness
//! constraint on the value.

use super::entities::{expiry_after, Nonce, Timestamp};
use crate::ports::outbound::{NonceStore, NonceStoreError, TimeSource};
use rand::rngs::OsRng;
use rand::RngCore;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Random bytes per nonce (64 hex characters).
pub const NONCE_BYTES: usize = 32;

/// Generate a fresh nonce value from the OS CSPRNG.
pub fn generate_nonce_value() -> String {
    let mut bytes = [0u8; NONCE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Single-use nonce ledger over a [`NonceStore`] and a [`TimeSource`].
pub struct NonceLedger<S: NonceStore, T: TimeSource> {
    store: S,
    clock: T,
}

impl<S: NonceStore, T: TimeSource> NonceLedger<S, T> {
    pub fn new(store: S, clock: T) -> Self {
        Self { store, clock }
    }

    /// Issue a nonce bound to `(source_address, dest_address)`, live for `ttl`.
    ///
    /// A `Duplicate` from the store would mean a 256-bit collision; it is
    /// propagated like any other storage failure rather than retried.
    pub fn issue(
        &self,
        source_address: &str,
        dest_address: &str,
        ttl: Duration,
    ) -> Result<Nonce, NonceStoreError> {
        let nonce = Nonce {
            value: generate_nonce_value(),
            source_address: source_address.to_string(),
            dest_address: dest_address.to_string(),
            expires_at: expiry_after(self.clock.now(), ttl),
            used: false,
        };

        self.store.insert(nonce.clone()).inspect_err(|e| {
            warn!(error = %e, source = source_address, "Failed to store nonce");
        })?;

        info!(
            source = source_address,
            dest = dest_address,
            expires_at = nonce.expires_at,
            "Issued claim nonce"
        );
        Ok(nonce)
    }

    /// Look up a nonce row, live or not.
    pub fn get(&self, value: &str) -> Result<Option<Nonce>, NonceStoreError> {
        self.store.get(value)
    }

    /// `true` iff the nonce exists, is unused and has not expired.
    pub fn is_valid(&self, value: &str) -> Result<bool, NonceStoreError> {
        let now = self.clock.now();
        Ok(self
            .store
            .get(value)?
            .is_some_and(|nonce| nonce.is_live(now)))
    }

    /// Atomically consume a live nonce.
    ///
    /// Returns `false` if the nonce is unknown, already used or expired.
    pub fn consume(&self, value: &str) -> Result<bool, NonceStoreError> {
        let consumed = self.store.mark_used_if_live(value, self.clock.now())?;
        if consumed {
            debug!("Nonce consumed");
        } else {
            debug!("Nonce consumption refused (unknown, used or expired)");
        }
        Ok(consumed)
    }

    /// Delete nonces with `expires_at < now`.
    pub fn sweep_expired(&self, now: Timestamp) -> Result<usize, NonceStoreError> {
        let removed = self.store.delete_expired(now)?;
        if removed > 0 {
            info!(removed, "Swept expired nonces");
        }
        Ok(removed)
    }

    /// Current time according to the ledger's clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn clock(&self) -> &T {
        &self.clock
    }
}
