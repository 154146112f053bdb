//! Canonical signature string.
//!
//! The string a partner hashes is the plain concatenation, in this order, of:
//!
//! ```text
//! sigtimestamp + partnerkey + partnerrefno + totalamount + partnerpassword
//! ```
//!
//! where `sigtimestamp` is the request timestamp converted to UTC and
//! rendered as `yyyyMMddHHmmss`. There are no delimiters. Two different
//! field splits can produce the same string; the scheme is fixed by partner
//! contracts and the ambiguity is accepted as part of it.

use chrono::{DateTime, TimeZone, Utc};

use crate::config::SIGNATURE_TIMESTAMP_FORMAT;

/// Render the timestamp segment: UTC, second precision, no separators.
///
/// Fractional seconds are truncated, not rounded.
pub fn signature_timestamp<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> String {
    timestamp
        .with_timezone(&Utc)
        .format(SIGNATURE_TIMESTAMP_FORMAT)
        .to_string()
}

/// Assemble the canonical string that the signature digest is computed over.
pub fn canonical_string<Tz: TimeZone>(
    timestamp: &DateTime<Tz>,
    partner_key: &str,
    partner_ref_no: &str,
    total_amount: i64,
    partner_password: &str,
) -> String {
    let sig_ts = signature_timestamp(timestamp);
    let amount = total_amount.to_string();

    let mut out = String::with_capacity(
        sig_ts.len()
            + partner_key.len()
            + partner_ref_no.len()
            + amount.len()
            + partner_password.len(),
    );
    out.push_str(&sig_ts);
    out.push_str(partner_key);
    out.push_str(partner_ref_no);
    out.push_str(&amount);
    out.push_str(partner_password);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn kl_time() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2020-07-28T12:34:23.75+08:00").unwrap()
    }

    #[test]
    fn timestamp_segment_is_utc_without_fraction() {
        assert_eq!(signature_timestamp(&kl_time()), "20200728043423");
    }

    #[test]
    fn timestamp_segment_crosses_midnight_when_converting() {
        let ts = DateTime::parse_from_rfc3339("2021-01-01T03:00:00+08:00").unwrap();
        assert_eq!(signature_timestamp(&ts), "20201231190000");
    }

    #[test]
    fn canonical_string_field_order() {
        let s = canonical_string(
            &kl_time(),
            "FAKEGOOGLE",
            "FA0000001",
            1000,
            "FAKEPASSWORD1234",
        );
        assert_eq!(s, "20200728043423FAKEGOOGLEFA00000011000FAKEPASSWORD1234");
    }

    #[test]
    fn same_instant_in_different_zones_is_identical() {
        let utc = Utc.with_ymd_and_hms(2020, 7, 28, 4, 34, 23).unwrap();
        let a = canonical_string(&utc, "K", "REF000001", 5, "P");
        let b = canonical_string(&kl_time(), "K", "REF000001", 5, "P");
        assert_eq!(a, b);
    }

    #[test]
    fn amount_has_no_separators() {
        let utc = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let s = canonical_string(&utc, "", "", 1_234_567, "");
        assert_eq!(s, "202001010000001234567");
    }
}
