//! # Wallet Auth Errors
//!
//! Error types for address handling, token issuance and the authorization flows.
//!
//! Signature and token *verification* never return these: they collapse every
//! failure into `false` / `None` so callers cannot tell a malformed input from a
//! forged one. The types below exist for the internal `?` plumbing and for the
//! few outcomes that are policy decisions rather than forgery attempts.

use crate::ports::outbound::NonceStoreError;
use thiserror::Error;

/// Errors from regrouping a bit stream between group widths.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum BitConversionError {
    /// Group widths must be in `1..=8`
    #[error("Invalid group width: from {from_bits} to {to_bits}")]
    InvalidWidth { from_bits: u32, to_bits: u32 },

    /// An input value does not fit in `from_bits`
    #[error("Value {0} exceeds the source group width")]
    InvalidValue(u8),

    /// Leftover bits form a whole source group when padding is disallowed
    #[error("Incomplete group")]
    IncompleteGroup,

    /// Leftover bits are not all zero when padding is disallowed
    #[error("Non-zero padding")]
    NonZeroPadding,
}

/// Errors from parsing or encoding a bech32 wallet address.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AddressError {
    /// The string is not valid bech32 (bad charset, checksum or mixed case)
    #[error("Invalid bech32 encoding: {0}")]
    Bech32(String),

    /// The human-readable part is not the expected chain prefix
    #[error("Wrong address prefix: expected {expected}, got {actual}")]
    WrongPrefix { expected: &'static str, actual: String },

    /// The decoded payload is not a 20-byte key hash
    #[error("Invalid address payload length: {0} bytes")]
    InvalidLength(usize),

    /// 5-bit words could not be regrouped into bytes
    #[error("Address payload conversion failed: {0}")]
    Conversion(#[from] BitConversionError),
}

/// Reasons a wallet signature is rejected.
///
/// Only logged; the public verifier reduces all of them to `false`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// Signature or public key is not valid base64
    #[error("Invalid base64 in {0}")]
    MalformedEncoding(&'static str),

    /// Decoded signature is not 64 bytes
    #[error("Invalid signature length: {0} bytes")]
    InvalidLength(usize),

    /// The key derives a different address than the claimed one
    #[error("Public key does not belong to the expected address")]
    AddressMismatch,

    /// The public key is not a valid secp256k1 point
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// r or s is zero or not below the curve order
    #[error("Invalid signature format")]
    InvalidFormat,

    /// s is in the upper half of the curve order
    #[error("Malleable signature (high S value)")]
    MalleableSignature,

    /// The curve equation does not hold for this digest and key
    #[error("Signature verification failed")]
    VerificationFailed,
}

/// Errors from issuing an admin session token.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The address is not on the admin allow-list
    #[error("Address {address} is not authorized for admin access")]
    NotAuthorized { address: String },
}

/// Errors from the claim and admin authorization flows.
///
/// Every cryptographic or encoding failure maps to `InvalidSignature`; the
/// specific sub-check that failed is only visible in debug logs.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Signature, public key or address did not verify
    #[error("Invalid signature")]
    InvalidSignature,

    /// Nonce is unknown, already consumed or expired
    #[error("Invalid or expired nonce")]
    InvalidNonce,

    /// Nonce was issued for a different address pair, or the signed message does not embed it
    #[error("Nonce does not match this request")]
    NonceMismatch,

    /// Admin request timestamp is outside the freshness window
    #[error("Authentication request expired")]
    RequestExpired,

    /// Address is not on the admin allow-list
    #[error("Address {address} is not authorized for admin access")]
    NotAuthorized { address: String },

    /// The nonce store failed; the request may be retried
    #[error("Nonce storage failure: {0}")]
    Storage(#[from] NonceStoreError),
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::NotAuthorized { address } => AuthError::NotAuthorized { address },
        }
    }
}

/// Errors from validating an [`AuthConfig`](crate::domain::config::AuthConfig).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The HMAC secret is empty
    #[error("HMAC secret must not be empty")]
    EmptySecret,

    /// No admin wallets are configured
    #[error("Admin allow-list must contain at least one address")]
    EmptyAllowList,

    /// An allow-list entry is not a valid `ki` address
    #[error("Invalid admin address {address}: {reason}")]
    InvalidAllowListEntry { address: String, reason: AddressError },

    /// A numeric setting is out of range
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
