//! Signature digest engine.
//!
//! A partner signature is produced in three steps:
//!
//! 1. SHA-256 over the UTF-8 canonical string (see [`super::canonical`]).
//! 2. The 32-byte digest rendered as 64 lowercase hex characters.
//! 3. The *hex text* (not the raw digest) base64-encoded with the standard,
//!    padded alphabet.
//!
//! Verification reverses step 3 and compares hex text case-insensitively, so
//! a partner that renders uppercase hex is still accepted. Malformed base64
//! is an ordinary "does not verify" answer here, never an error.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::hash::{constant_time_eq, sha256_hex};
use crate::config::SIGNATURE_HEX_LEN;

/// Produce the transmitted `sig` value for a canonical string.
///
/// ```
/// use trxgate_protocol::crypto::{encode_signature, verify_signature};
///
/// let sig = encode_signature("20200728043423KEYREF00000110PASS");
/// assert!(verify_signature("20200728043423KEYREF00000110PASS", &sig));
/// ```
pub fn encode_signature(canonical: &str) -> String {
    STANDARD.encode(sha256_hex(canonical.as_bytes()).as_bytes())
}

/// Recover the text carried inside a `sig` value.
///
/// ASCII whitespace is ignored, as line-wrapped base64 is common in partner
/// tooling. Returns `None` when the input is not valid base64. Bytes that
/// are not UTF-8 are replaced rather than rejected; they can never match a
/// hex digest anyway.
pub fn decode_signature(signature: &str) -> Option<String> {
    let compact: String = signature
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD.decode(compact.as_bytes()).ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// Check a received `sig` against the digest of `canonical`.
///
/// Returns `false` for undecodable signatures. The comparison is ordinal
/// and ASCII-case-insensitive, evaluated in constant time over the
/// lowercased text.
pub fn verify_signature(canonical: &str, signature: &str) -> bool {
    let Some(received) = decode_signature(signature) else {
        tracing::debug!("signature is not valid base64");
        return false;
    };
    let expected = sha256_hex(canonical.as_bytes());
    let received = received.to_ascii_lowercase();
    constant_time_eq(expected.as_bytes(), received.as_bytes())
}

/// Structural check used by the message validator: does `sig` decode to
/// text that contains a 64-character hex run?
///
/// This does not need the canonical string and says nothing about whether
/// the signature is correct.
pub fn is_signature_format(signature: &str) -> bool {
    match decode_signature(signature) {
        Some(text) => contains_hex_run(&text, SIGNATURE_HEX_LEN),
        None => false,
    }
}

fn contains_hex_run(text: &str, len: usize) -> bool {
    let mut run = 0usize;
    for c in text.chars() {
        if c.is_ascii_hexdigit() {
            run += 1;
            if run >= len {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}
