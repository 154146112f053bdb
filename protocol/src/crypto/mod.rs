//! # Cryptographic Primitives
//!
//! Everything the partner signature scheme needs, and nothing more:
//!
//! - **hash**: SHA-256 and constant-time comparison.
//! - **canonical**: the fixed-order string a partner signs.
//! - **digest**: encoding, decoding and verification of the `sig` value.
//!
//! The scheme is a plain digest over a string that embeds the shared
//! secret, not an HMAC. It is what partners implement today; treat it as a
//! wire contract.

pub mod canonical;
pub mod digest;
pub mod hash;

pub use canonical::{canonical_string, signature_timestamp};
pub use digest::{decode_signature, encode_signature, is_signature_format, verify_signature};
pub use hash::{constant_time_eq, sha256, sha256_hex};
