//! # Runtime Configuration
//!
//! Everything is read from the environment.
//!
//! | Variable                 | Required | Default |
//! |--------------------------|----------|---------|
//! | `KI_AUTH_SECRET`         | yes      |         |
//! | `KI_ADMIN_WALLETS`       | yes      |         |
//! | `KI_TOKEN_TTL_SECS`      | no       | 3600    |
//! | `KI_NONCE_TTL_SECS`      | no       | 300     |
//! | `KI_SWEEP_INTERVAL_SECS` | no       | 60      |
//! | `KI_LOG_LEVEL`           | no       | info    |
//! | `KI_LOG_JSON`            | no       | false   |
//!
//! ## Security Requirements
//!
//! - There is no default secret; a missing or empty `KI_AUTH_SECRET` stops startup
//! - The secret is hex so it can carry arbitrary bytes

use ki_wallet_auth::{parse_admin_wallets, AuthConfig, ConfigError};
use std::time::Duration;
use thiserror::Error;

pub const ENV_AUTH_SECRET: &str = "KI_AUTH_SECRET";
pub const ENV_ADMIN_WALLETS: &str = "KI_ADMIN_WALLETS";
pub const ENV_TOKEN_TTL_SECS: &str = "KI_TOKEN_TTL_SECS";
pub const ENV_NONCE_TTL_SECS: &str = "KI_NONCE_TTL_SECS";
pub const ENV_SWEEP_INTERVAL_SECS: &str = "KI_SWEEP_INTERVAL_SECS";
pub const ENV_LOG_LEVEL: &str = "KI_LOG_LEVEL";
pub const ENV_LOG_JSON: &str = "KI_LOG_JSON";

/// Default interval between expired-nonce sweeps.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Runtime configuration errors.
#[derive(Debug, Error)]
pub enum RuntimeConfigError {
    /// A required variable is unset
    #[error("{0} must be set")]
    Missing(&'static str),

    /// The secret is not valid hex
    #[error("{0} must be hex encoded")]
    InvalidHex(&'static str),

    /// A numeric or boolean variable did not parse
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    /// The assembled auth configuration is unusable
    #[error(transparent)]
    Auth(#[from] ConfigError),
}

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Library configuration.
    pub auth: AuthConfig,
    /// Interval between expired-nonce sweeps.
    pub sweep_interval: Duration,
    /// Fallback log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Emit JSON log lines.
    pub json_logs: bool,
}

impl RuntimeConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, RuntimeConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load using `lookup` to resolve variable names.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, RuntimeConfigError> {
        let secret_hex = lookup(ENV_AUTH_SECRET)
            .filter(|value| !value.trim().is_empty())
            .ok_or(RuntimeConfigError::Missing(ENV_AUTH_SECRET))?;
        let secret = hex::decode(secret_hex.trim())
            .map_err(|_| RuntimeConfigError::InvalidHex(ENV_AUTH_SECRET))?;

        let wallets =
            lookup(ENV_ADMIN_WALLETS).ok_or(RuntimeConfigError::Missing(ENV_ADMIN_WALLETS))?;
        let admin_wallets = parse_admin_wallets(wallets.split(','))?;

        let mut auth = AuthConfig::new(secret, admin_wallets);
        if let Some(secs) = parse_u64(&lookup, ENV_TOKEN_TTL_SECS)? {
            auth = auth.with_token_ttl_secs(secs);
        }
        if let Some(secs) = parse_u64(&lookup, ENV_NONCE_TTL_SECS)? {
            auth = auth.with_nonce_ttl_secs(secs);
        }
        auth.validate()?;

        let sweep_secs =
            parse_u64(&lookup, ENV_SWEEP_INTERVAL_SECS)?.unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS);
        if sweep_secs == 0 {
            return Err(RuntimeConfigError::InvalidValue {
                var: ENV_SWEEP_INTERVAL_SECS,
                value: "0".to_string(),
            });
        }

        let json_logs = match lookup(ENV_LOG_JSON) {
            None => false,
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                _ => {
                    return Err(RuntimeConfigError::InvalidValue {
                        var: ENV_LOG_JSON,
                        value,
                    })
                }
            },
        };

        Ok(Self {
            auth,
            sweep_interval: Duration::from_secs(sweep_secs),
            log_level: lookup(ENV_LOG_LEVEL).unwrap_or_else(|| "info".to_string()),
            json_logs,
        })
    }
}

fn parse_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<u64>, RuntimeConfigError> {
    lookup(var)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| RuntimeConfigError::InvalidValue { var, value })
        })
        .transpose()
}
