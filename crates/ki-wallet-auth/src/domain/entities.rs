//! # Domain Entities
//!
//! Core data structures shared by the verifier, the nonce ledger and the
//! token codec.

use super::address;
use super::errors::AddressError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Expiry `ttl` after `now`, in whole seconds.
///
/// A partial second rounds up, so any positive `ttl` outlives the second it
/// was issued in.
pub fn expiry_after(now: Timestamp, ttl: Duration) -> Timestamp {
    let secs = ttl.as_secs().saturating_add(u64::from(ttl.subsec_nanos() > 0));
    now.saturating_add(secs)
}

// =============================================================================
// Addresses
// =============================================================================

/// A bech32 Ki Chain wallet address (`ki1…`).
///
/// Values of this type are either derived from key material or parsed and
/// checked with [`address::parse_address`]; a raw string never becomes a
/// `KiAddress` without one of the two.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KiAddress(String);

impl KiAddress {
    pub(crate) fn from_encoded(encoded: String) -> Self {
        Self(encoded)
    }

    /// Borrow the address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for KiAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        address::parse_address(s)?;
        Ok(Self(s.to_ascii_lowercase()))
    }
}

impl TryFrom<String> for KiAddress {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KiAddress> for String {
    fn from(address: KiAddress) -> Self {
        address.0
    }
}

// Lets address sets be queried with a plain `&str`
impl Borrow<str> for KiAddress {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for KiAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Nonces
// =============================================================================

/// A single-use claim nonce bound to a (source, destination) address pair.
///
/// `used` only ever moves from `false` to `true`. A nonce is live while it is
/// unused and `now < expires_at`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nonce {
    /// 64 lowercase hex characters (32 random bytes)
    pub value: String,
    /// Address whose holder signs the claim (the `ki1…` wallet)
    pub source_address: String,
    /// Address the claim pays out to
    pub dest_address: String,
    /// Expiry, exclusive
    pub expires_at: Timestamp,
    /// Whether the nonce has been consumed
    pub used: bool,
}

impl Nonce {
    /// Whether the nonce can still be consumed at `now`.
    pub fn is_live(&self, now: Timestamp) -> bool {
        !self.used && now < self.expires_at
    }

    /// Whether the nonce was issued for exactly this address pair.
    pub fn is_bound_to(&self, source_address: &str, dest_address: &str) -> bool {
        self.source_address == source_address && self.dest_address == dest_address
    }
}

// =============================================================================
// Admin Tokens
// =============================================================================

/// An admin session token returned to the caller after authentication.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    /// `base64(hash "." expiry "." address)`
    pub token: String,
    /// Expiry in Unix seconds
    pub expires_at: Timestamp,
}

// =============================================================================
// Flow Requests
// =============================================================================

/// What the front-end needs to ask the wallet for a claim or login signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningChallenge {
    /// The issued nonce value
    pub nonce: String,
    /// The exact message the wallet must sign
    pub message: String,
    /// Nonce expiry in Unix seconds
    pub expires_at: Timestamp,
}

/// A signed claim submission as posted by the wallet front-end.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    /// The claiming `ki1…` wallet
    pub ki_address: String,
    /// The payout address
    pub eth_address: String,
    /// The exact message the wallet signed
    pub message: String,
    /// Base64 64-byte `r || s` signature
    pub signature: String,
    /// Base64 compressed secp256k1 public key
    pub pub_key: String,
    /// Nonce issued for this claim
    pub nonce: String,
}

/// A signed admin login request.
///
/// `message` must embed both `nonce` and `timestamp`; neither field is
/// trusted on its own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAuthRequest {
    pub address: String,
    pub message: String,
    pub signature: String,
    pub pub_key: String,
    /// Login nonce from `prepare_admin_login`
    pub nonce: String,
    /// Client clock at signing time, in milliseconds
    pub timestamp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_nonce() -> Nonce {
        Nonce {
            value: "ab".repeat(32),
            source_address: "ki1source".to_string(),
            dest_address: "0xdest".to_string(),
            expires_at: 1_000,
            used: false,
        }
    }

    /// Test: Sub-second lifetimes round up instead of truncating to zero
    #[test]
    fn test_expiry_after_rounds_up() {
        assert_eq!(expiry_after(100, Duration::from_millis(500)), 101);
        assert_eq!(expiry_after(100, Duration::from_millis(1_500)), 102);
        assert_eq!(expiry_after(100, Duration::from_secs(300)), 400);
        assert_eq!(expiry_after(100, Duration::ZERO), 100);
        assert_eq!(expiry_after(u64::MAX, Duration::from_secs(1)), u64::MAX);
    }

    #[test]
    fn test_nonce_live_until_expiry() {
        let nonce = sample_nonce();
        assert!(nonce.is_live(999));
        assert!(!nonce.is_live(1_000));
        assert!(!nonce.is_live(5_000));
    }

    #[test]
    fn test_used_nonce_is_not_live() {
        let nonce = Nonce {
            used: true,
            ..sample_nonce()
        };
        assert!(!nonce.is_live(0));
    }

    #[test]
    fn test_nonce_binding() {
        let nonce = sample_nonce();
        assert!(nonce.is_bound_to("ki1source", "0xdest"));
        assert!(!nonce.is_bound_to("ki1source", "0xother"));
        assert!(!nonce.is_bound_to("ki1other", "0xdest"));
    }

    #[test]
    fn test_address_parse_rejects_garbage() {
        assert!("ki1wrongaddress".parse::<KiAddress>().is_err());
        assert!("".parse::<KiAddress>().is_err());
    }

    #[test]
    fn test_address_parse_normalizes_case() {
        let upper = "KI1NDUQ8YY8H4NR7G9VUUGLZKLQATMAQUQ9606WKN";
        let parsed: KiAddress = upper.parse().unwrap();
        assert_eq!(parsed.as_str(), "ki1nduq8yy8h4nr7g9vuuglzklqatmaquq9606wkn");
    }

    /// Test: Claim payloads use the front-end's camelCase field names
    #[test]
    fn test_claim_request_field_names() {
        let json = r#"{
            "kiAddress": "ki1nduq8yy8h4nr7g9vuuglzklqatmaquq9606wkn",
            "ethAddress": "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb",
            "message": "m",
            "signature": "c2ln",
            "pubKey": "cGs=",
            "nonce": "n"
        }"#;
        let request: ClaimRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.eth_address, "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb");
        assert_eq!(request.pub_key, "cGs=");
    }
}
