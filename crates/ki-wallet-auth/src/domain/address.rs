//! # Ki Chain Address Codec
//!
//! Derives the bech32 wallet address bound to a secp256k1 public key:
//!
//! ```text
//! address = bech32("ki", convert_bits(RIPEMD160(SHA256(pubkey)), 8, 5, pad))
//! ```
//!
//! This is the only identity binding in the crate. A public key owns an
//! address if and only if [`derive_address`] maps the key to that address.

use super::bits::convert_bits;
use super::entities::KiAddress;
use super::errors::AddressError;
use bech32::{Bech32Writer, ToBase32, Variant};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use std::fmt;

/// Human-readable part of every Ki Chain account address.
pub const ADDRESS_PREFIX: &str = "ki";

/// Length of the hashed key payload inside an address.
pub const KEY_HASH_LEN: usize = 20;

/// `RIPEMD160(SHA256(public_key))`.
pub fn key_hash(public_key: &[u8]) -> [u8; KEY_HASH_LEN] {
    let sha = Sha256::digest(public_key);
    let ripe = Ripemd160::digest(sha);

    let mut hash = [0u8; KEY_HASH_LEN];
    hash.copy_from_slice(&ripe);
    hash
}

/// Derive the `ki1…` address of a public key.
///
/// The input is hashed as-is, so the compressed and uncompressed encodings of
/// the same point derive different addresses. Wallets sign with the 33-byte
/// compressed form.
pub fn derive_address(public_key: &[u8]) -> KiAddress {
    encode_key_hash(&key_hash(public_key))
}

/// Bech32-encode a 20-byte key hash under the `ki` prefix.
pub fn encode_key_hash(hash: &[u8; KEY_HASH_LEN]) -> KiAddress {
    KiAddress::from_encoded(Bech32KeyHash(hash).to_string())
}

/// Streams a key hash through the bech32 writer; the only possible error is
/// the sink's, and a `String` sink never fails.
struct Bech32KeyHash<'a>(&'a [u8; KEY_HASH_LEN]);

impl fmt::Display for Bech32KeyHash<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut writer = Bech32Writer::new(ADDRESS_PREFIX, Variant::Bech32, f)?;
        self.0.write_base32(&mut writer)?;
        writer.finalize()
    }
}

/// Decode a `ki1…` address back to its 20-byte key hash.
pub fn parse_address(address: &str) -> Result<[u8; KEY_HASH_LEN], AddressError> {
    let (hrp, words, variant) =
        bech32::decode(address).map_err(|e| AddressError::Bech32(e.to_string()))?;

    if variant != Variant::Bech32 {
        return Err(AddressError::Bech32("bech32m checksum".to_string()));
    }
    if hrp != ADDRESS_PREFIX {
        return Err(AddressError::WrongPrefix {
            expected: ADDRESS_PREFIX,
            actual: hrp,
        });
    }

    let raw: Vec<u8> = words.iter().map(|w| w.to_u8()).collect();
    let bytes = convert_bits(&raw, 5, 8, false)?;
    if bytes.len() != KEY_HASH_LEN {
        return Err(AddressError::InvalidLength(bytes.len()));
    }

    let mut hash = [0u8; KEY_HASH_LEN];
    hash.copy_from_slice(&bytes);
    Ok(hash)
}

/// Whether `address` is a well-formed `ki1…` account address.
pub fn is_valid_address(address: &str) -> bool {
    parse_address(address).is_ok()
}
