//! # Wallet Auth Service
//!
//! Application service implementing [`WalletAuthApi`].
//!
//! ## Architecture
//!
//! - Implements the inbound port (`WalletAuthApi`)
//! - Uses the outbound ports (`NonceStore`, `TimeSource`) through the nonce ledger
//! - Delegates address, signature and token logic to the domain layer
//!
//! ## Flow Ordering
//!
//! Cheap, stateless checks run before curve arithmetic, and the nonce is
//! consumed last: a claim that fails any check leaves its nonce usable until
//! it expires.

use crate::domain::address;
use crate::domain::claim_message::{
    admin_login_message, claim_message, embeds_nonce, embeds_timestamp, ADMIN_LOGIN_AUDIENCE,
};
use crate::domain::config::AuthConfig;
use crate::domain::ecdsa::SignatureVerifier;
use crate::domain::entities::{
    AdminAuthRequest, ClaimRequest, IssuedToken, KiAddress, Nonce, SigningChallenge, Timestamp,
};
use crate::domain::errors::{AuthError, ConfigError, TokenError};
use crate::domain::nonce::NonceLedger;
use crate::domain::token::AuthTokenCodec;
use crate::ports::inbound::WalletAuthApi;
use crate::ports::outbound::{NonceStore, NonceStoreError, TimeSource};
use std::time::Duration;
use tracing::{info, warn};

/// Wallet authentication service.
pub struct WalletAuthService<S: NonceStore, T: TimeSource> {
    config: AuthConfig,
    verifier: SignatureVerifier,
    ledger: NonceLedger<S, T>,
    tokens: AuthTokenCodec,
}

impl<S: NonceStore, T: TimeSource> WalletAuthService<S, T> {
    /// Create a new service.
    ///
    /// # Arguments
    /// * `config` - Secret, allow-list and lifetimes; validated here
    /// * `store` - Nonce persistence
    /// * `clock` - Time source for nonce and token expiry
    pub fn new(config: AuthConfig, store: S, clock: T) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            verifier: SignatureVerifier::new(),
            ledger: NonceLedger::new(store, clock),
            tokens: AuthTokenCodec::new(&config),
            config,
        })
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Current Unix time according to the service clock.
    pub fn now(&self) -> Timestamp {
        self.ledger.now()
    }

    /// Sweep nonces that are already expired at the service clock's `now`.
    pub fn sweep_now(&self) -> Result<usize, NonceStoreError> {
        self.ledger.sweep_expired(self.ledger.now())
    }
}

impl<S: NonceStore, T: TimeSource> WalletAuthApi for WalletAuthService<S, T> {
    fn derive_address(&self, public_key: &[u8]) -> KiAddress {
        address::derive_address(public_key)
    }

    fn verify_signature(
        &self,
        message: &[u8],
        signature_b64: &str,
        pub_key_b64: &str,
        expected_address: &str,
    ) -> bool {
        self.verifier
            .verify(message, signature_b64, pub_key_b64, expected_address)
    }

    fn issue_nonce(
        &self,
        source_address: &str,
        dest_address: &str,
        ttl: Duration,
    ) -> Result<Nonce, NonceStoreError> {
        self.ledger.issue(source_address, dest_address, ttl)
    }

    fn is_nonce_valid(&self, value: &str) -> Result<bool, NonceStoreError> {
        self.ledger.is_valid(value)
    }

    fn consume_nonce(&self, value: &str) -> Result<bool, NonceStoreError> {
        self.ledger.consume(value)
    }

    fn sweep_expired_nonces(&self, now: Timestamp) -> Result<usize, NonceStoreError> {
        self.ledger.sweep_expired(now)
    }

    fn issue_auth_token(&self, address: &str, ttl: Duration) -> Result<IssuedToken, TokenError> {
        self.tokens.issue(address, ttl, self.ledger.now())
    }

    fn verify_auth_token(&self, token: &str) -> Option<KiAddress> {
        self.tokens.verify(token, self.ledger.now())
    }

    fn verify_bearer(&self, header: &str) -> Option<KiAddress> {
        self.tokens.verify_bearer(header, self.ledger.now())
    }

    fn prepare_claim(
        &self,
        ki_address: &str,
        eth_address: &str,
    ) -> Result<SigningChallenge, AuthError> {
        let nonce = self.ledger.issue(
            ki_address,
            eth_address,
            Duration::from_secs(self.config.nonce_ttl_secs),
        )?;
        let message = claim_message(ki_address, eth_address, &nonce.value, self.ledger.now());

        Ok(SigningChallenge {
            nonce: nonce.value,
            message,
            expires_at: nonce.expires_at,
        })
    }

    /// Check a signed claim and consume its nonce.
    ///
    /// ## Check Order
    ///
    /// 1. Nonce exists and is live (`InvalidNonce`)
    /// 2. Nonce was issued for this exact (ki, eth) pair (`NonceMismatch`)
    /// 3. The signed message embeds the nonce (`NonceMismatch`)
    /// 4. Signature verifies for `ki_address` (`InvalidSignature`)
    /// 5. Atomic consume; losing a race is `InvalidNonce`
    fn authorize_claim(&self, request: &ClaimRequest) -> Result<(), AuthError> {
        self.redeem_signed_nonce(
            "claim",
            &request.nonce,
            &request.ki_address,
            &request.eth_address,
            &request.message,
            &request.signature,
            &request.pub_key,
        )?;

        info!(
            ki_address = %request.ki_address,
            eth_address = %request.eth_address,
            "Claim authorized"
        );
        Ok(())
    }

    fn prepare_admin_login(&self, address: &str) -> Result<SigningChallenge, AuthError> {
        self.require_admin(address)?;

        let nonce = self.ledger.issue(
            address,
            ADMIN_LOGIN_AUDIENCE,
            Duration::from_secs(self.config.nonce_ttl_secs),
        )?;
        let message =
            admin_login_message(address, &nonce.value, self.ledger.clock().now_millis());

        Ok(SigningChallenge {
            nonce: nonce.value,
            message,
            expires_at: nonce.expires_at,
        })
    }

    /// Check a signed admin login, consume its nonce and issue a session token.
    ///
    /// ## Check Order
    ///
    /// 1. Address is on the allow-list (`NotAuthorized`)
    /// 2. `|now_ms - timestamp| <= window` and the message ends in that
    ///    timestamp (`RequestExpired`)
    /// 3. Nonce checks as for claims, bound to (address, `"admin"`)
    /// 4. Signature verifies for `address` (`InvalidSignature`)
    /// 5. Atomic consume; a replayed login is `InvalidNonce`
    fn authenticate_admin(&self, request: &AdminAuthRequest) -> Result<IssuedToken, AuthError> {
        self.require_admin(&request.address)?;

        let skew = self.ledger.clock().now_millis().abs_diff(request.timestamp);
        if skew > self.config.admin_request_window_ms {
            warn!(address = %request.address, skew_ms = skew, "Admin login refused: stale request");
            return Err(AuthError::RequestExpired);
        }
        if !embeds_timestamp(&request.message, request.timestamp) {
            warn!(address = %request.address, "Admin login refused: timestamp not in signed message");
            return Err(AuthError::RequestExpired);
        }

        self.redeem_signed_nonce(
            "admin login",
            &request.nonce,
            &request.address,
            ADMIN_LOGIN_AUDIENCE,
            &request.message,
            &request.signature,
            &request.pub_key,
        )?;

        let issued = self.tokens.issue(
            &request.address,
            Duration::from_secs(self.config.token_ttl_secs),
            self.ledger.now(),
        )?;
        Ok(issued)
    }
}

impl<S: NonceStore, T: TimeSource> WalletAuthService<S, T> {
    fn require_admin(&self, address: &str) -> Result<(), AuthError> {
        if self.config.is_admin(address) {
            return Ok(());
        }
        warn!(address, "Admin login refused: not on allow-list");
        Err(AuthError::NotAuthorized {
            address: address.to_string(),
        })
    }

    /// Spend the nonce behind a signed message.
    ///
    /// Nothing is written unless every check passes, so a refused request
    /// leaves its nonce usable until it expires.
    #[allow(clippy::too_many_arguments)]
    fn redeem_signed_nonce(
        &self,
        flow: &'static str,
        nonce_value: &str,
        signer: &str,
        audience: &str,
        message: &str,
        signature: &str,
        pub_key: &str,
    ) -> Result<(), AuthError> {
        let now = self.ledger.now();

        let Some(nonce) = self
            .ledger
            .get(nonce_value)?
            .filter(|nonce| nonce.is_live(now))
        else {
            warn!(flow, signer, "Request refused: invalid or expired nonce");
            return Err(AuthError::InvalidNonce);
        };

        if !nonce.is_bound_to(signer, audience) {
            warn!(flow, signer, "Request refused: nonce issued for another address pair");
            return Err(AuthError::NonceMismatch);
        }

        if !embeds_nonce(message, nonce_value) {
            warn!(flow, signer, "Request refused: message does not embed nonce");
            return Err(AuthError::NonceMismatch);
        }

        if !self
            .verifier
            .verify(message.as_bytes(), signature, pub_key, signer)
        {
            warn!(flow, signer, "Request refused: invalid signature");
            return Err(AuthError::InvalidSignature);
        }

        if !self.ledger.consume(nonce_value)? {
            warn!(flow, signer, "Request refused: nonce consumed concurrently");
            return Err(AuthError::InvalidNonce);
        }
        Ok(())
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================
