//! # Admin Session Tokens
//!
//! Stateless, address-bound session tokens for privileged calls.
//!
//! ## Wire Format
//!
//! ```text
//! base64( hex(HMAC-SHA256(secret, address || decimal(expiry))) "." expiry "." address )
//! ```
//!
//! `expiry` is decimal Unix seconds. Nothing is persisted: every check
//! recomputes the MAC from the secret, so rotating the secret revokes every
//! outstanding token at once.
//!
//! ## Security Notes
//!
//! - The HMAC secret is the trust anchor; the allow-list is policy
//! - MAC comparison is constant-time
//! - Verification never says why a token was refused

use super::config::{AuthConfig, HmacSecret};
use super::entities::{expiry_after, IssuedToken, KiAddress, Timestamp};
use super::errors::TokenError;
use base64::{engine::general_purpose::STANDARD as B64, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::BTreeSet;
use std::time::Duration;
use subtle::ConstantTimeEq;
use tracing::{debug, info, warn};

type HmacSha256 = Hmac<Sha256>;

/// Separator between the token's three fields.
pub const TOKEN_SEPARATOR: char = '.';

/// Authorization header scheme.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Issues and verifies admin session tokens.
#[derive(Debug, Clone)]
pub struct AuthTokenCodec {
    secret: HmacSecret,
    admin_wallets: BTreeSet<KiAddress>,
}

impl AuthTokenCodec {
    /// Build a codec from the configured secret and allow-list.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.hmac_secret.clone(),
            admin_wallets: config.admin_wallets.clone(),
        }
    }

    /// Issue a token for `address`, valid until `now + ttl`.
    ///
    /// # Errors
    ///
    /// `NotAuthorized` if `address` is not on the allow-list.
    pub fn issue(
        &self,
        address: &str,
        ttl: Duration,
        now: Timestamp,
    ) -> Result<IssuedToken, TokenError> {
        if !self.admin_wallets.contains(address) {
            warn!(address, "Token requested for non-admin address");
            return Err(TokenError::NotAuthorized {
                address: address.to_string(),
            });
        }

        let expires_at = expiry_after(now, ttl);
        let hash = self.address_hash(address, expires_at);
        let token = B64.encode(format!(
            "{hash}{TOKEN_SEPARATOR}{expires_at}{TOKEN_SEPARATOR}{address}"
        ));

        info!(address, expires_at, "Issued admin token");
        Ok(IssuedToken { token, expires_at })
    }

    /// Verify a token, returning the admin address it was issued to.
    ///
    /// `None` for anything malformed, expired, forged, or issued to an address
    /// no longer on the allow-list. A token is still accepted in the second
    /// `now == expiry`.
    pub fn verify(&self, token: &str, now: Timestamp) -> Option<KiAddress> {
        let Ok(decoded) = B64.decode(token.trim()) else {
            debug!("Token rejected: invalid base64");
            return None;
        };
        let Ok(decoded) = String::from_utf8(decoded) else {
            debug!("Token rejected: not UTF-8");
            return None;
        };

        let parts: Vec<&str> = decoded.split(TOKEN_SEPARATOR).collect();
        let [hash, expiry, address] = parts.as_slice() else {
            debug!(parts = parts.len(), "Token rejected: wrong field count");
            return None;
        };

        let Ok(expires_at) = expiry.parse::<Timestamp>() else {
            debug!("Token rejected: unparsable expiry");
            return None;
        };
        if expires_at < now {
            debug!(expires_at, now, "Token rejected: expired");
            return None;
        }

        let Some(admin) = self.admin_wallets.get(*address) else {
            debug!(address = *address, "Token rejected: address not on allow-list");
            return None;
        };

        let expected = self.address_hash(address, expires_at);
        if !bool::from(expected.as_bytes().ct_eq(hash.as_bytes())) {
            debug!(address = *address, "Token rejected: MAC mismatch");
            return None;
        }

        Some(admin.clone())
    }

    /// Verify the value of an `Authorization` header.
    ///
    /// Accepts `Bearer <token>` or a bare token.
    pub fn verify_bearer(&self, header: &str, now: Timestamp) -> Option<KiAddress> {
        let header = header.trim();
        let token = header.strip_prefix(BEARER_PREFIX).unwrap_or(header);
        self.verify(token, now)
    }

    /// `hex(HMAC-SHA256(secret, address || decimal(expiry)))`
    fn address_hash(&self, address: &str, expires_at: Timestamp) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(address.as_bytes());
        mac.update(expires_at.to_string().as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::parse_admin_wallets;

    const ADMIN: &str = "ki1nduq8yy8h4nr7g9vuuglzklqatmaquq9606wkn";
    const OTHER: &str = "ki1wy4ephlnvym3mgcejq0zs48g2zj92tgclk9rzw";
    const NOW: Timestamp = 1_738_195_200;
    const HOUR: Duration = Duration::from_secs(3_600);

    fn codec_with(secret: &[u8], admins: &[&str]) -> AuthTokenCodec {
        let config = AuthConfig::new(
            secret.to_vec(),
            parse_admin_wallets(admins.iter().copied()).unwrap(),
        );
        AuthTokenCodec::new(&config)
    }

    fn codec() -> AuthTokenCodec {
        codec_with(b"test-secret", &[ADMIN])
    }

    fn forge(hash: &str, expiry: &str, address: &str) -> String {
        B64.encode(format!("{hash}.{expiry}.{address}"))
    }

    /// Test: Issued token verifies back to its address
    #[test]
    fn test_issue_verify_roundtrip() {
        let codec = codec();
        let issued = codec.issue(ADMIN, HOUR, NOW).unwrap();

        assert_eq!(issued.expires_at, NOW + 3_600);
        let address = codec.verify(&issued.token, NOW).unwrap();
        assert_eq!(address.as_str(), ADMIN);
    }

    /// Test: Token wire format is base64(hex_hmac "." decimal_expiry "." address)
    #[test]
    fn test_wire_format() {
        let codec = codec();
        let issued = codec.issue(ADMIN, HOUR, NOW).unwrap();

        let decoded = String::from_utf8(B64.decode(&issued.token).unwrap()).unwrap();
        let parts: Vec<&str> = decoded.split('.').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1], "1738198800");
        assert_eq!(parts[2], ADMIN);

        let mut mac = HmacSha256::new_from_slice(b"test-secret").unwrap();
        mac.update(format!("{ADMIN}1738198800").as_bytes());
        assert_eq!(parts[0], hex::encode(mac.finalize().into_bytes()));
    }

    #[test]
    fn test_issue_requires_allow_list() {
        let result = codec().issue(OTHER, HOUR, NOW);
        assert_eq!(
            result,
            Err(TokenError::NotAuthorized {
                address: OTHER.to_string()
            })
        );
    }

    /// Test: Token is valid through its expiry second and rejected after
    #[test]
    fn test_expiry() {
        let codec = codec();
        let issued = codec.issue(ADMIN, HOUR, NOW).unwrap();

        assert!(codec.verify(&issued.token, issued.expires_at).is_some());
        assert!(codec.verify(&issued.token, issued.expires_at + 1).is_none());
    }

    #[test]
    fn test_sub_second_ttl_rounds_up() {
        let codec = codec();
        let issued = codec.issue(ADMIN, Duration::from_millis(250), NOW).unwrap();

        assert_eq!(issued.expires_at, NOW + 1);
        assert!(codec.verify(&issued.token, NOW + 1).is_some());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issued = codec().issue(ADMIN, HOUR, NOW).unwrap();
        let other = codec_with(b"another-secret", &[ADMIN]);
        assert!(other.verify(&issued.token, NOW).is_none());
    }

    /// Test: Removing an address from the allow-list revokes its tokens
    #[test]
    fn test_removed_from_allow_list() {
        let issued = codec_with(b"test-secret", &[ADMIN, OTHER])
            .issue(ADMIN, HOUR, NOW)
            .unwrap();

        let shrunk = codec_with(b"test-secret", &[OTHER]);
        assert!(shrunk.verify(&issued.token, NOW).is_none());
    }

    /// Test: Tampering with any field breaks the MAC
    #[test]
    fn test_tampered_fields_rejected() {
        let codec = codec();
        let issued = codec.issue(ADMIN, HOUR, NOW).unwrap();
        let decoded = String::from_utf8(B64.decode(&issued.token).unwrap()).unwrap();
        let parts: Vec<&str> = decoded.split('.').collect();

        // Extend the expiry
        assert!(codec.verify(&forge(parts[0], "9999999999", ADMIN), NOW).is_none());

        // Swap the address for another admin
        let two = codec_with(b"test-secret", &[ADMIN, OTHER]);
        assert!(two.verify(&forge(parts[0], parts[1], OTHER), NOW).is_none());

        // Uppercase hex is not the canonical MAC
        let upper = parts[0].to_uppercase();
        assert!(codec.verify(&forge(&upper, parts[1], ADMIN), NOW).is_none());
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let codec = codec();
        let hash = "00".repeat(32);

        assert!(codec.verify("", NOW).is_none());
        assert!(codec.verify("!!not-base64!!", NOW).is_none());
        assert!(codec.verify(&B64.encode([0xff, 0xfe, 0x2e]), NOW).is_none());
        assert!(codec.verify(&B64.encode("only.two"), NOW).is_none());
        assert!(codec
            .verify(&B64.encode(format!("{hash}.1.{ADMIN}.extra")), NOW)
            .is_none());
        assert!(codec.verify(&forge(&hash, "soon", ADMIN), NOW).is_none());
        assert!(codec.verify(&forge(&hash, "-1", ADMIN), NOW).is_none());
    }

    #[test]
    fn test_verify_bearer() {
        let codec = codec();
        let issued = codec.issue(ADMIN, HOUR, NOW).unwrap();

        let header = format!("Bearer {}", issued.token);
        assert!(codec.verify_bearer(&header, NOW).is_some());
        assert!(codec.verify_bearer(&issued.token, NOW).is_some());
        assert!(codec.verify_bearer("Bearer ", NOW).is_none());
        assert!(codec.verify_bearer("Basic dXNlcjpwYXNz", NOW).is_none());
    }
}
