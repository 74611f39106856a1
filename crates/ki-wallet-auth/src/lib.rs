//! # Ki Wallet Auth
//!
//! Off-chain authentication for Ki Chain wallets: proves a message was signed
//! by the holder of a `ki1…` address without any on-chain transaction.
//!
//! ## Architecture
//!
//! This crate follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Address codec, ADR-036 sign documents,
//!   signature verification, nonces and admin tokens. No I/O.
//! - **Ports Layer** (`ports/`): `WalletAuthApi` inbound, `NonceStore` and
//!   `TimeSource` outbound
//! - **Adapters** (`adapters/`): In-memory nonce store and clocks
//! - **Service Layer** (`service.rs`): Wires domain logic to ports
//!
//! ## Security Notes
//!
//! - **No oracle**: signature and token checks return `false`/`None`, never
//!   the reason; reasons are logged at debug level only
//! - **Identity binding**: a valid signature must also come from the key that
//!   derives the claimed address
//! - **Replay**: claim and admin login nonces are single-use, consumed with
//!   one atomic compare-and-set
//! - **Malleability**: high-S signatures are rejected

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::clock::{ManualTimeSource, SystemTimeSource};
pub use adapters::memory::InMemoryNonceStore;
pub use domain::address::{derive_address, is_valid_address, parse_address, ADDRESS_PREFIX};
pub use domain::bits::convert_bits;
pub use domain::claim_message::{admin_login_message, claim_message, ADMIN_LOGIN_AUDIENCE};
pub use domain::config::{parse_admin_wallets, AuthConfig, HmacSecret};
pub use domain::ecdsa::{verify_signature, SignatureVerifier};
pub use domain::entities::{
    AdminAuthRequest, ClaimRequest, IssuedToken, KiAddress, Nonce, SigningChallenge, Timestamp,
};
pub use domain::errors::{
    AddressError, AuthError, BitConversionError, ConfigError, SignatureError, TokenError,
};
pub use domain::nonce::NonceLedger;
pub use domain::sign_doc::{build_sign_doc, SignDoc};
pub use domain::token::AuthTokenCodec;
pub use ports::inbound::WalletAuthApi;
pub use ports::outbound::{NonceStore, NonceStoreError, TimeSource};
pub use service::WalletAuthService;
