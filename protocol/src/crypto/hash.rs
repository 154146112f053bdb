//! # Hashing Utilities
//!
//! SHA-256 is the only hash the gateway speaks. Everything here is a thin
//! wrapper over the `sha2` crate plus a constant-time byte comparison from
//! `subtle`.
//!
//! Hex output is always lowercase. Partners are allowed to send uppercase
//! hex, so callers normalize before comparing, never the other way round.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Compute the SHA-256 hash of the input data.
///
/// Returns a 32-byte digest as a `Vec<u8>`.
///
/// # Example
///
/// ```
/// use trxgate_protocol::crypto::sha256;
///
/// let hash = sha256(b"trxgate");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Compute the SHA-256 hash and return a fixed-size array.
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Compute SHA-256 and render it as a 64-character lowercase hex string.
///
/// ```
/// use trxgate_protocol::crypto::sha256_hex;
///
/// assert_eq!(
///     sha256_hex(b""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256_array(data))
}

/// Compare two byte strings without branching on their contents.
///
/// The length check is also folded into the constant-time result so a
/// mismatch in length takes the same path as a mismatch in content. The
/// shorter input is zero-padded to the longer one before comparison.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let max_len = a.len().max(b.len());
    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0u8; max_len];
    a_padded[..a.len()].copy_from_slice(a);
    b_padded[..b.len()].copy_from_slice(b);

    let lengths_equal = (a.len() as u64).ct_eq(&(b.len() as u64));
    let contents_equal = a_padded.ct_eq(&b_padded);
    (lengths_equal & contents_equal).into()
}
