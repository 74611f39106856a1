//! # Inbound Ports (Driving Ports / API)
//!
//! The operations the HTTP layer calls for claims and admin sessions.

use crate::domain::entities::{
    AdminAuthRequest, ClaimRequest, IssuedToken, KiAddress, Nonce, SigningChallenge, Timestamp,
};
use crate::domain::errors::{AuthError, TokenError};
use crate::ports::outbound::NonceStoreError;
use std::time::Duration;

/// Primary wallet authentication API.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait WalletAuthApi: Send + Sync {
    // =========================================================================
    // Addresses and Signatures
    // =========================================================================

    /// Derive the `ki1…` address of a SEC1 public key.
    fn derive_address(&self, public_key: &[u8]) -> KiAddress;

    /// Verify an ADR-036 signature by the holder of `expected_address`.
    ///
    /// # Security
    /// - Every failure is `false`; the reason is never returned
    fn verify_signature(
        &self,
        message: &[u8],
        signature_b64: &str,
        pub_key_b64: &str,
        expected_address: &str,
    ) -> bool;

    // =========================================================================
    // Nonces
    // =========================================================================

    /// Issue a nonce bound to `(source_address, dest_address)`.
    fn issue_nonce(
        &self,
        source_address: &str,
        dest_address: &str,
        ttl: Duration,
    ) -> Result<Nonce, NonceStoreError>;

    /// Whether a nonce exists, is unused and unexpired.
    fn is_nonce_valid(&self, value: &str) -> Result<bool, NonceStoreError>;

    /// Atomically consume a nonce. At most one caller ever gets `true`.
    fn consume_nonce(&self, value: &str) -> Result<bool, NonceStoreError>;

    /// Delete nonces that expired before `now`.
    fn sweep_expired_nonces(&self, now: Timestamp) -> Result<usize, NonceStoreError>;

    // =========================================================================
    // Admin Tokens
    // =========================================================================

    /// Issue an admin token. Fails with `NotAuthorized` off the allow-list.
    fn issue_auth_token(&self, address: &str, ttl: Duration) -> Result<IssuedToken, TokenError>;

    /// Verify an admin token.
    fn verify_auth_token(&self, token: &str) -> Option<KiAddress>;

    /// Verify an `Authorization: Bearer …` header value.
    fn verify_bearer(&self, header: &str) -> Option<KiAddress>;

    // =========================================================================
    // Flows
    // =========================================================================

    /// Issue a claim nonce and the message the wallet must sign.
    fn prepare_claim(
        &self,
        ki_address: &str,
        eth_address: &str,
    ) -> Result<SigningChallenge, AuthError>;

    /// Check a signed claim and consume its nonce.
    ///
    /// On `Ok` the nonce is spent and the caller may record the claim.
    fn authorize_claim(&self, request: &ClaimRequest) -> Result<(), AuthError>;

    /// Issue an admin login nonce and the message the wallet must sign.
    ///
    /// Fails with `NotAuthorized` off the allow-list.
    fn prepare_admin_login(&self, address: &str) -> Result<SigningChallenge, AuthError>;

    /// Check a signed admin login, consume its nonce and issue a session token.
    ///
    /// Each login nonce opens at most one session.
    fn authenticate_admin(&self, request: &AdminAuthRequest) -> Result<IssuedToken, AuthError>;
}
