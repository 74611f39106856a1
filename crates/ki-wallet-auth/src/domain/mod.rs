//! # Domain Layer
//!
//! Pure wallet-auth logic. Only the nonce ledger touches state, and only
//! through the outbound ports.

pub mod address;
pub mod bits;
pub mod claim_message;
pub mod config;
pub mod ecdsa;
pub mod entities;
pub mod errors;
pub mod nonce;
pub mod sign_doc;
pub mod token;
