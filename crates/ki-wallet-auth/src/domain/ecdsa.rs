//! # Wallet Signature Verification (secp256k1)
//!
//! Verifies an ADR-036 off-chain signature: the wallet signed
//! `SHA256(canonical_sign_doc(address, message))` with the key whose derived
//! address is `address`.
//!
//! ## Security Notes
//!
//! - **Never throws**: every failure becomes `false`; the reason is logged at
//!   debug level only, so callers cannot build an oracle from it
//! - **Identity binding**: a curve-valid signature still fails unless the
//!   public key derives the expected address
//! - **Malleability**: high-S signatures are rejected, matching Cosmos SDK
//! - **Cheap checks first**: base64, length and address run before curve math

use super::address::derive_address;
use super::errors::SignatureError;
use super::sign_doc::SignDoc;
use base64::{engine::general_purpose::STANDARD as B64, Engine};
use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{Signature, VerifyingKey};
use tracing::debug;

/// Length of a raw `r || s` signature.
pub const SIGNATURE_LEN: usize = 64;

// =============================================================================
// SIGNATURE VERIFIER
// =============================================================================

/// ADR-036 signature verifier.
///
/// Stateless; one instance can be shared by any number of threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureVerifier;

impl SignatureVerifier {
    /// Create a new verifier.
    pub fn new() -> Self {
        Self
    }

    /// Verify `signature_b64` over `message` by the holder of `expected_address`.
    pub fn verify(
        &self,
        message: &[u8],
        signature_b64: &str,
        pub_key_b64: &str,
        expected_address: &str,
    ) -> bool {
        verify_signature(message, signature_b64, pub_key_b64, expected_address)
    }
}

// =============================================================================
// CORE VERIFICATION FUNCTIONS
// =============================================================================

/// Verify an ADR-036 wallet signature.
///
/// Returns `true` only if the signature is a valid low-S secp256k1 signature
/// over the sign document's digest *and* `pub_key_b64` derives
/// `expected_address`.
pub fn verify_signature(
    message: &[u8],
    signature_b64: &str,
    pub_key_b64: &str,
    expected_address: &str,
) -> bool {
    match check_signature(message, signature_b64, pub_key_b64, expected_address) {
        Ok(()) => true,
        Err(reason) => {
            debug!(address = expected_address, %reason, "Wallet signature rejected");
            false
        }
    }
}

/// The full check with the failure reason kept.
pub(crate) fn check_signature(
    message: &[u8],
    signature_b64: &str,
    pub_key_b64: &str,
    expected_address: &str,
) -> Result<(), SignatureError> {
    let signature_bytes = B64
        .decode(signature_b64)
        .map_err(|_| SignatureError::MalformedEncoding("signature"))?;
    let pub_key_bytes = B64
        .decode(pub_key_b64)
        .map_err(|_| SignatureError::MalformedEncoding("public key"))?;

    if signature_bytes.len() != SIGNATURE_LEN {
        return Err(SignatureError::InvalidLength(signature_bytes.len()));
    }

    if derive_address(&pub_key_bytes).as_str() != expected_address {
        return Err(SignatureError::AddressMismatch);
    }

    let verifying_key =
        VerifyingKey::from_sec1_bytes(&pub_key_bytes).map_err(|_| SignatureError::InvalidPublicKey)?;

    // Rejects r or s equal to zero or >= n
    let signature =
        Signature::from_slice(&signature_bytes).map_err(|_| SignatureError::InvalidFormat)?;
    if signature.normalize_s().is_some() {
        return Err(SignatureError::MalleableSignature);
    }

    let digest = SignDoc::new(expected_address, message).digest();
    verifying_key
        .verify_prehash(&digest, &signature)
        .map_err(|_| SignatureError::VerificationFailed)
}

// =============================================================================
// TEST HELPERS
// =============================================================================


// =============================================================================
// UNIT TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::test_helpers::*;
    use super::*;

    // Fixed vector: secret 4c0883a6…3f362318, message "hello"
    const GOLDEN_PUB_KEY: &str = "Ak47ga+cIjTK0J1nnOYDXtE5I0fOZM5AX13NNiKKJd5u";
    const GOLDEN_ADDRESS: &str = "ki1nduq8yy8h4nr7g9vuuglzklqatmaquq9606wkn";
    const GOLDEN_SIGNATURE: &str =
        "z77+noyKjoEmmMSTFIxLAYoaqtLkTkJo9Vz/xAaZqzQmadLgVV0JjFZh4W+IoTNiGx1hlBG+bxQE0CTKSl8E4Q==";

    fn golden_signing_key() -> k256::ecdsa::SigningKey {
        let secret =
            hex::decode("4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318")
                .unwrap();
        k256::ecdsa::SigningKey::from_slice(&secret).unwrap()
    }

    /// Test: The fixed wallet vector verifies
    #[test]
    fn test_golden_vector_verifies() {
        assert!(verify_signature(
            b"hello",
            GOLDEN_SIGNATURE,
            GOLDEN_PUB_KEY,
            GOLDEN_ADDRESS
        ));
    }

    /// Test: The golden secret really is the key behind the golden public key
    #[test]
    fn test_golden_key_matches() {
        let key = golden_signing_key();
        assert_eq!(pub_key_b64(key.verifying_key()), GOLDEN_PUB_KEY);
        assert_eq!(address_of(key.verifying_key()), GOLDEN_ADDRESS);

        let fresh = sign_arbitrary(&key, GOLDEN_ADDRESS, b"hello");
        assert!(verify_signature(b"hello", &fresh, GOLDEN_PUB_KEY, GOLDEN_ADDRESS));
    }

    #[test]
    fn test_golden_vector_wrong_message() {
        assert_eq!(
            check_signature(b"hello!", GOLDEN_SIGNATURE, GOLDEN_PUB_KEY, GOLDEN_ADDRESS),
            Err(SignatureError::VerificationFailed)
        );
    }

    #[test]
    fn test_verify_random_keypair() {
        let verifier = SignatureVerifier::new();
        let (signing_key, verifying_key) = generate_keypair();
        let address = address_of(&verifying_key);
        let signature = sign_arbitrary(&signing_key, &address, b"claim me");

        assert!(verifier.verify(b"claim me", &signature, &pub_key_b64(&verifying_key), &address));
    }

    /// Test: A signature valid for the message but checked against another address fails
    #[test]
    fn test_wrong_expected_address() {
        let (signing_key, verifying_key) = generate_keypair();
        let (_, other_key) = generate_keypair();
        let address = address_of(&verifying_key);
        let other_address = address_of(&other_key);
        let signature = sign_arbitrary(&signing_key, &address, b"msg");

        assert_eq!(
            check_signature(b"msg", &signature, &pub_key_b64(&verifying_key), &other_address),
            Err(SignatureError::AddressMismatch)
        );
    }

    /// Test: A key that signed honestly for its own address cannot impersonate another
    #[test]
    fn test_foreign_key_signing_for_victim_address() {
        let (attacker_key, attacker_pub) = generate_keypair();
        let (_, victim_pub) = generate_keypair();
        let victim_address = address_of(&victim_pub);

        // Attacker signs a document naming the victim, with their own key
        let signature = sign_arbitrary(&attacker_key, &victim_address, b"msg");

        assert!(!verify_signature(
            b"msg",
            &signature,
            &pub_key_b64(&attacker_pub),
            &victim_address
        ));
        // Presenting the victim's key instead fails the curve check
        assert_eq!(
            check_signature(b"msg", &signature, &pub_key_b64(&victim_pub), &victim_address),
            Err(SignatureError::VerificationFailed)
        );
    }

    #[test]
    fn test_invalid_base64_signature() {
        assert_eq!(
            check_signature(b"m", "not-valid-base64!!!", GOLDEN_PUB_KEY, GOLDEN_ADDRESS),
            Err(SignatureError::MalformedEncoding("signature"))
        );
    }

    #[test]
    fn test_invalid_base64_pub_key() {
        let signature = B64.encode([0x42u8; 64]);
        assert_eq!(
            check_signature(b"m", &signature, "not-valid-base64!!!", GOLDEN_ADDRESS),
            Err(SignatureError::MalformedEncoding("public key"))
        );
    }

    /// Test: Signature lengths other than 64 bytes are rejected
    #[test]
    fn test_wrong_signature_length() {
        for len in [0usize, 32, 63, 65, 128] {
            let signature = B64.encode(vec![0x42u8; len]);
            assert_eq!(
                check_signature(b"m", &signature, GOLDEN_PUB_KEY, GOLDEN_ADDRESS),
                Err(SignatureError::InvalidLength(len))
            );
        }
    }

    /// Test: Bytes that hash to the address but are not a curve point are rejected
    #[test]
    fn test_invalid_public_key_point() {
        let bogus_key = [b'x'; 33];
        let address = derive_address(&bogus_key).to_string();
        let signature = B64.encode([0x42u8; 64]);

        assert_eq!(
            check_signature(b"m", &signature, &B64.encode(bogus_key), &address),
            Err(SignatureError::InvalidPublicKey)
        );
    }

    #[test]
    fn test_zero_and_overflowing_scalars_rejected() {
        let zero = B64.encode([0u8; 64]);
        assert_eq!(
            check_signature(b"m", &zero, GOLDEN_PUB_KEY, GOLDEN_ADDRESS),
            Err(SignatureError::InvalidFormat)
        );

        let max = B64.encode([0xFFu8; 64]);
        assert_eq!(
            check_signature(b"m", &max, GOLDEN_PUB_KEY, GOLDEN_ADDRESS),
            Err(SignatureError::InvalidFormat)
        );
    }

    /// Test: The high-S twin of a valid signature is rejected
    #[test]
    fn test_high_s_rejected() {
        let signature_bytes = B64.decode(GOLDEN_SIGNATURE).unwrap();
        let signature = Signature::from_slice(&signature_bytes).unwrap();
        let (r, s) = signature.split_scalars();
        let high = Signature::from_scalars(r, -*s).unwrap();

        assert_eq!(
            check_signature(b"hello", &B64.encode(high.to_bytes()), GOLDEN_PUB_KEY, GOLDEN_ADDRESS),
            Err(SignatureError::MalleableSignature)
        );
    }

    #[test]
    fn test_random_signature_bytes_rejected() {
        let mut bytes = [0u8; 64];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        assert!(!verify_signature(b"m", &B64.encode(bytes), GOLDEN_PUB_KEY, GOLDEN_ADDRESS));
    }

    /// Test: Verification is deterministic across repeated calls
    #[test]
    fn test_verification_deterministic() {
        for _ in 0..10 {
            assert!(verify_signature(b"hello", GOLDEN_SIGNATURE, GOLDEN_PUB_KEY, GOLDEN_ADDRESS));
            assert!(!verify_signature(b"bye", GOLDEN_SIGNATURE, GOLDEN_PUB_KEY, GOLDEN_ADDRESS));
        }
    }
}
