//! Fuzz target for wallet signature verification.
//!
//! Malformed base64, keys and signatures must all come back as `false`.

#![no_main]

use ki_wallet_auth::{is_valid_address, verify_signature};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, arbitrary::Arbitrary)]
struct SignatureFuzzInput {
    message: Vec<u8>,
    signature_b64: String,
    pub_key_b64: String,
    expected_address: String,
}

fuzz_target!(|input: SignatureFuzzInput| {
    // Must never panic, regardless of input
    let result = verify_signature(
        &input.message,
        &input.signature_b64,
        &input.pub_key_b64,
        &input.expected_address,
    );

    // Deterministic
    let again = verify_signature(
        &input.message,
        &input.signature_b64,
        &input.pub_key_b64,
        &input.expected_address,
    );
    assert_eq!(result, again);

    // Nothing verifies for an address that does not parse
    if !is_valid_address(&input.expected_address) {
        assert!(!result);
    }
});
