//! # Auth Configuration
//!
//! The admin allow-list and the HMAC secret are explicit configuration handed
//! to the service at construction, never compiled-in constants. The secret is
//! the trust anchor for admin tokens; the allow-list is policy, not a secret.

use super::entities::KiAddress;
use super::errors::ConfigError;
use std::collections::BTreeSet;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Default admin session lifetime (1 hour).
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3_600;

/// Default claim nonce lifetime (5 minutes).
pub const DEFAULT_NONCE_TTL_SECS: u64 = 300;

/// Default tolerance between the admin's signing clock and ours (5 minutes).
pub const DEFAULT_ADMIN_REQUEST_WINDOW_MS: u64 = 300_000;

/// HMAC key for admin tokens. Wiped from memory on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct HmacSecret(Vec<u8>);

impl HmacSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for HmacSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HmacSecret([REDACTED; {}])", self.0.len())
    }
}

/// Configuration for wallet authentication.
///
/// All durations have sane defaults; the secret and allow-list have none.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Key for admin token MACs.
    pub hmac_secret: HmacSecret,
    /// Wallets allowed to obtain admin tokens.
    pub admin_wallets: BTreeSet<KiAddress>,
    /// Admin token lifetime in seconds.
    pub token_ttl_secs: u64,
    /// Claim nonce lifetime in seconds.
    pub nonce_ttl_secs: u64,
    /// Maximum |server clock - request timestamp| for admin logins, in milliseconds.
    pub admin_request_window_ms: u64,
}

impl AuthConfig {
    /// Create a configuration with default lifetimes.
    pub fn new(
        hmac_secret: impl Into<Vec<u8>>,
        admin_wallets: impl IntoIterator<Item = KiAddress>,
    ) -> Self {
        Self {
            hmac_secret: HmacSecret::new(hmac_secret),
            admin_wallets: admin_wallets.into_iter().collect(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            nonce_ttl_secs: DEFAULT_NONCE_TTL_SECS,
            admin_request_window_ms: DEFAULT_ADMIN_REQUEST_WINDOW_MS,
        }
    }

    /// Set the admin token lifetime.
    pub fn with_token_ttl_secs(mut self, secs: u64) -> Self {
        self.token_ttl_secs = secs;
        self
    }

    /// Set the claim nonce lifetime.
    pub fn with_nonce_ttl_secs(mut self, secs: u64) -> Self {
        self.nonce_ttl_secs = secs;
        self
    }

    /// Set the admin request freshness window.
    pub fn with_admin_request_window_ms(mut self, millis: u64) -> Self {
        self.admin_request_window_ms = millis;
        self
    }

    /// Whether `address` is on the admin allow-list.
    pub fn is_admin(&self, address: &str) -> bool {
        self.admin_wallets.contains(address)
    }

    /// Check the configuration is usable.
    ///
    /// # Returns
    ///
    /// Returns `Err` if:
    /// - the HMAC secret is empty
    /// - the admin allow-list is empty
    /// - a lifetime is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hmac_secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if self.admin_wallets.is_empty() {
            return Err(ConfigError::EmptyAllowList);
        }
        for (field, value) in [
            ("token_ttl_secs", self.token_ttl_secs),
            ("nonce_ttl_secs", self.nonce_ttl_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Parse allow-list entries, rejecting anything that is not a `ki1…` address.
pub fn parse_admin_wallets<'a>(
    entries: impl IntoIterator<Item = &'a str>,
) -> Result<BTreeSet<KiAddress>, ConfigError> {
    entries
        .into_iter()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse::<KiAddress>()
                .map_err(|reason| ConfigError::InvalidAllowListEntry {
                    address: entry.to_string(),
                    reason,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN: &str = "ki1nduq8yy8h4nr7g9vuuglzklqatmaquq9606wkn";

    fn admin_set() -> BTreeSet<KiAddress> {
        parse_admin_wallets([ADMIN]).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = AuthConfig::new(b"secret".to_vec(), admin_set());
        assert_eq!(config.token_ttl_secs, 3_600);
        assert_eq!(config.nonce_ttl_secs, 300);
        assert_eq!(config.admin_request_window_ms, 300_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_is_admin() {
        let config = AuthConfig::new(b"secret".to_vec(), admin_set());
        assert!(config.is_admin(ADMIN));
        assert!(!config.is_admin("ki1wy4ephlnvym3mgcejq0zs48g2zj92tgclk9rzw"));
    }

    #[test]
    fn test_empty_secret_rejected() {
        let config = AuthConfig::new(Vec::<u8>::new(), admin_set());
        assert_eq!(config.validate(), Err(ConfigError::EmptySecret));
    }

    #[test]
    fn test_empty_allow_list_rejected() {
        let config = AuthConfig::new(b"secret".to_vec(), BTreeSet::new());
        assert_eq!(config.validate(), Err(ConfigError::EmptyAllowList));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let config = AuthConfig::new(b"secret".to_vec(), admin_set()).with_token_ttl_secs(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "token_ttl_secs", .. })
        ));
    }

    /// Test: Allow-list parsing trims, skips blanks and rejects bad entries
    #[test]
    fn test_parse_admin_wallets() {
        let parsed = parse_admin_wallets([" ki1nduq8yy8h4nr7g9vuuglzklqatmaquq9606wkn ", ""]).unwrap();
        assert_eq!(parsed.len(), 1);

        let err = parse_admin_wallets([ADMIN, "ki1wrongaddress"]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidAllowListEntry { ref address, .. } if address == "ki1wrongaddress"
        ));
    }

    #[test]
    fn test_secret_not_printed() {
        let config = AuthConfig::new(b"super-secret".to_vec(), admin_set());
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("REDACTED"));
    }
}
