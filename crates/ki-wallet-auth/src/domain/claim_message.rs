//! # Signed Messages
//!
//! The human-readable statements a wallet signs to authorize a migration claim
//! or to open an admin session. The front-end builds the same strings, so the
//! formats are fixed byte for byte.
//!
//! Both carry a `Nonce:` field and end in a `Timestamp:` field.

use super::entities::Timestamp;

/// Build the message authorizing migration of `ki_address`'s tokens to `eth_address`.
pub fn claim_message(
    ki_address: &str,
    eth_address: &str,
    nonce: &str,
    timestamp: Timestamp,
) -> String {
    format!(
        "I authorize the migration of my XKI tokens from {ki_address} to {eth_address}. \
         Nonce: {nonce}. Timestamp: {timestamp}"
    )
}

/// Nonce destination for admin logins, in place of a payout address.
pub const ADMIN_LOGIN_AUDIENCE: &str = "admin";

/// Build the message an admin wallet signs to open a session.
///
/// `timestamp_ms` is the signer's clock in milliseconds.
pub fn admin_login_message(address: &str, nonce: &str, timestamp_ms: u64) -> String {
    format!(
        "Sign in to the XKI migration admin panel as {address}. \
         Nonce: {nonce}. Timestamp: {timestamp_ms}"
    )
}

/// Whether `message` ends with `timestamp` as its `Timestamp:` field.
pub fn embeds_timestamp(message: &str, timestamp: u64) -> bool {
    message.ends_with(&format!(" Timestamp: {timestamp}"))
}

/// Whether `message` embeds `nonce` as its `Nonce:` field.
pub fn embeds_nonce(message: &str, nonce: &str) -> bool {
    !nonce.is_empty() && message.contains(&format!("Nonce: {nonce}."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_format() {
        let message = claim_message(
            "ki1nduq8yy8h4nr7g9vuuglzklqatmaquq9606wkn",
            "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb",
            "bf507571815cfe376982145b323b36bd9fa1e69ae82a3eb15f1c3760c9f98ed3",
            1_738_195_200,
        );
        assert_eq!(
            message,
            "I authorize the migration of my XKI tokens from \
             ki1nduq8yy8h4nr7g9vuuglzklqatmaquq9606wkn to \
             0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb. \
             Nonce: bf507571815cfe376982145b323b36bd9fa1e69ae82a3eb15f1c3760c9f98ed3. \
             Timestamp: 1738195200"
        );
    }

    /// Test: Only the full nonce in the Nonce field counts
    #[test]
    fn test_embeds_nonce() {
        let message = claim_message("ki1a", "0xb", "abcdef", 1);
        assert!(embeds_nonce(&message, "abcdef"));
        assert!(!embeds_nonce(&message, "abc"));
        assert!(!embeds_nonce(&message, "ki1a"));
        assert!(!embeds_nonce(&message, ""));
    }

    #[test]
    fn test_admin_login_format() {
        let message = admin_login_message(
            "ki1nduq8yy8h4nr7g9vuuglzklqatmaquq9606wkn",
            "abcdef",
            1_738_195_200_000,
        );
        assert_eq!(
            message,
            "Sign in to the XKI migration admin panel as \
             ki1nduq8yy8h4nr7g9vuuglzklqatmaquq9606wkn. \
             Nonce: abcdef. Timestamp: 1738195200000"
        );
        assert!(embeds_nonce(&message, "abcdef"));
    }

    /// Test: The timestamp must be the message's whole trailing field
    #[test]
    fn test_embeds_timestamp() {
        let message = admin_login_message("ki1a", "abcdef", 1_738_195_200_000);
        assert!(embeds_timestamp(&message, 1_738_195_200_000));
        assert!(!embeds_timestamp(&message, 738_195_200_000));
        assert!(!embeds_timestamp(&message, 1_738_195_200_001));
        assert!(!embeds_timestamp("Admin login", 0));
    }
}
