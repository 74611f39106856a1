//! # ADR-036 Sign Document
//!
//! Wallet extensions (Keplr `signArbitrary`) never sign the raw message. They
//! wrap it in an inert, transaction-shaped document and sign that instead:
//!
//! ```text
//! {"account_number":"0","chain_id":"","fee":{"amount":[],"gas":"0"},"memo":"",
//!  "msgs":[{"type":"sign/MsgSignData","value":{"data":<base64 msg>,"signer":<address>}}],
//!  "sequence":"0"}
//! ```
//!
//! The signed payload is the canonical JSON of that document: keys sorted at
//! every level, no whitespace, `/` left unescaped. The serializer is written
//! out field by field so the byte layout cannot drift with a serializer's
//! map ordering or escaping defaults.

use base64::{engine::general_purpose::STANDARD as B64, Engine};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// `msgs[0].type` of every arbitrary-data sign request.
pub const MSG_SIGN_DATA_TYPE: &str = "sign/MsgSignData";

/// The ADR-036 document wrapping one arbitrary message.
///
/// All protocol fields other than `data` and `signer` are fixed: zero account
/// number and sequence, empty chain id, memo and fee.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignDoc<'a> {
    signer: &'a str,
    data: String,
}

impl<'a> SignDoc<'a> {
    /// Wrap `message` for `signer`.
    pub fn new(signer: &'a str, message: &[u8]) -> Self {
        Self {
            signer,
            data: B64.encode(message),
        }
    }

    /// Canonical JSON bytes, i.e. the exact payload the wallet signed.
    pub fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut out = String::with_capacity(256 + self.data.len() + self.signer.len());

        out.push_str(r#"{"account_number":"0","chain_id":"","fee":{"amount":[],"gas":"0"},"memo":"","msgs":[{"type":"#);
        push_json_string(&mut out, MSG_SIGN_DATA_TYPE);
        out.push_str(r#","value":{"data":"#);
        push_json_string(&mut out, &self.data);
        out.push_str(r#","signer":"#);
        push_json_string(&mut out, self.signer);
        out.push_str(r#"}}],"sequence":"0"}"#);

        out.into_bytes()
    }

    /// `SHA256` of the canonical bytes; the digest the ECDSA signature covers.
    pub fn digest(&self) -> [u8; 32] {
        Sha256::digest(self.to_canonical_bytes()).into()
    }
}

/// Build the canonical sign document bytes for `message` signed by `signer`.
pub fn build_sign_doc(signer: &str, message: &[u8]) -> Vec<u8> {
    SignDoc::new(signer, message).to_canonical_bytes()
}

/// Append `value` as a JSON string literal.
///
/// serde_json escapes quotes, backslashes and control characters only; `/`
/// and non-ASCII text pass through unchanged.
fn push_json_string(out: &mut String, value: &str) {
    out.push_str(&Value::from(value).to_string());
}
