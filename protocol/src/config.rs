//! # Gateway Configuration & Constants
//!
//! Every magic number in the gateway lives here: field limits, the
//! freshness window, the closed set of result messages, and the seed
//! partner set. Partners integrate against these values.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------------

/// Version of the submission message contract.
pub const PROTOCOL_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Message Field Limits
// ---------------------------------------------------------------------------

/// Maximum length of `partnerkey`, in characters.
pub const PARTNER_KEY_MAX_LEN: usize = 50;

/// Minimum length of `partnerrefno`. The sample reference `FA0000001` is
/// nine characters long and partners were onboarded against it.
pub const PARTNER_REF_NO_MIN_LEN: usize = 9;

/// Maximum length of `partnerrefno`.
pub const PARTNER_REF_NO_MAX_LEN: usize = 50;

/// Maximum length of an item's `itemref`.
pub const ITEM_REF_MAX_LEN: usize = 50;

/// Maximum length of an item's `name`.
pub const ITEM_NAME_MAX_LEN: usize = 100;

/// Smallest quantity a single item line may carry.
pub const ITEM_QTY_MIN: i32 = 1;

/// Largest quantity a single item line may carry.
pub const ITEM_QTY_MAX: i32 = 10;

// ---------------------------------------------------------------------------
// Signature Scheme
// ---------------------------------------------------------------------------

/// Layout of the timestamp segment of the canonical string (UTC, seconds).
pub const SIGNATURE_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Length of the hex-rendered SHA-256 digest carried inside `sig`.
pub const SIGNATURE_HEX_LEN: usize = 64;

// ---------------------------------------------------------------------------
// Freshness
// ---------------------------------------------------------------------------

/// Half-width of the window around server time that a request timestamp
/// must fall into. Lower bound inclusive, upper bound exclusive.
pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(300);

/// Same window in seconds, for CLI flags and status output.
pub const FRESHNESS_WINDOW_SECS: u64 = 300;

// ---------------------------------------------------------------------------
// Result Messages
// ---------------------------------------------------------------------------

/// Credentials or signature did not check out. The two causes share one
/// message so callers cannot tell which one failed.
pub const MESSAGE_ACCESS_DENIED: &str = "Access Denied!";

/// Declared total does not match the item lines.
pub const MESSAGE_INVALID_TOTAL_AMOUNT: &str = "Invalid Total Amount.";

/// Timestamp outside the freshness window.
pub const MESSAGE_EXPIRED: &str = "Expired.";

/// Every gate passed.
pub const MESSAGE_REQUEST_VALID: &str = "Request data is valid.";

/// Evaluation hit an unexpected fault. Carries no detail about it.
pub const MESSAGE_UNPROCESSABLE: &str = "Request could not be processed.";

// ---------------------------------------------------------------------------
// Partner Seed
// ---------------------------------------------------------------------------

/// Partners known to a directory built without an external source, as
/// `(id, partner key, partner password)`.
pub const SEED_PARTNERS: &[(u32, &str, &str)] = &[
    (1, "FAKEGOOGLE", "FAKEPASSWORD1234"),
    (2, "FAKEPEOPLE", "FAKEPASSWORD4578"),
];

// ---------------------------------------------------------------------------
// Network Defaults
// ---------------------------------------------------------------------------

/// Default port for the submission API.
pub const DEFAULT_API_PORT: u16 = 8080;

/// Default port for the Prometheus metrics endpoint.
pub const DEFAULT_METRICS_PORT: u16 = 9090;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freshness_constants_agree() {
        assert_eq!(FRESHNESS_WINDOW.as_secs(), FRESHNESS_WINDOW_SECS);
    }

    #[test]
    fn result_messages_are_distinct() {
        let messages = [
            MESSAGE_ACCESS_DENIED,
            MESSAGE_INVALID_TOTAL_AMOUNT,
            MESSAGE_EXPIRED,
            MESSAGE_REQUEST_VALID,
            MESSAGE_UNPROCESSABLE,
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn field_limits_sanity() {
        assert!(PARTNER_REF_NO_MIN_LEN <= PARTNER_REF_NO_MAX_LEN);
        assert!(ITEM_QTY_MIN <= ITEM_QTY_MAX);
        assert!(ITEM_QTY_MIN > 0);
    }

    #[test]
    fn seed_partner_keys_are_unique() {
        let mut keys: Vec<&str> = SEED_PARTNERS.iter().map(|(_, k, _)| *k).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), SEED_PARTNERS.len());
    }

    #[test]
    fn ports_are_distinct() {
        assert_ne!(DEFAULT_API_PORT, DEFAULT_METRICS_PORT);
    }
}
