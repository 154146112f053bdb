//! Wire types for the submission endpoint.
//!
//! Field names on the wire are the lowercase names partners integrated
//! against (`partnerkey`, `totalamount`, `sig`, ...). Absent and `null`
//! fields decode to their zero value so the validator, not the JSON decoder,
//! reports them with the agreed messages.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::crypto::{canonical_string, encode_signature};

/// Compact-offset ISO-8601 layout, e.g. `2020-07-28T12:34:23.00+0800`.
const COMPACT_OFFSET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// A timestamp that could not be read as a timezone-aware instant.
#[derive(Debug, Error)]
#[error("timestamp {value:?} is not an ISO-8601 instant with offset")]
pub struct TimestampError {
    /// The rejected input, verbatim.
    pub value: String,
}

/// One inbound transaction submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// The allowed partner's key.
    #[serde(rename = "partnerkey", default, deserialize_with = "null_as_default")]
    pub partner_key: String,
    /// Partner's unique reference number for this transaction.
    #[serde(rename = "partnerrefno", default, deserialize_with = "null_as_default")]
    pub partner_ref_no: String,
    /// Shared secret of the partner. Never logged.
    #[serde(rename = "partnerpassword", default, deserialize_with = "null_as_default")]
    pub partner_password: String,
    /// Total in minor units (cents).
    #[serde(rename = "totalamount", default, deserialize_with = "null_as_default")]
    pub total_amount: i64,
    /// ISO-8601 instant with offset, e.g. `2014-04-14T12:34:23.00+0800`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: String,
    /// Base64 of the hex SHA-256 of the canonical string.
    #[serde(rename = "sig", default, deserialize_with = "null_as_default")]
    pub signature: String,
    /// Item lines. May be absent.
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<ItemDetail>,
}

/// One item line of a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDetail {
    /// Partner's reference for the item.
    #[serde(rename = "itemref", default, deserialize_with = "null_as_default")]
    pub item_ref: String,
    /// Display name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Quantity bought, 1..=10.
    #[serde(default, deserialize_with = "null_as_default")]
    pub qty: i32,
    /// Price of one unit in minor units.
    #[serde(rename = "unitprice", default, deserialize_with = "null_as_default")]
    pub unit_price: i64,
}

impl TransactionRequest {
    /// Parse the `timestamp` field.
    ///
    /// Accepts RFC 3339 (`+08:00` or `Z`) and the compact `+0800` offset.
    /// A timestamp without an offset is rejected: the instant it names
    /// would depend on the server's zone.
    pub fn parsed_timestamp(&self) -> Result<DateTime<FixedOffset>, TimestampError> {
        parse_timestamp(&self.timestamp)
    }

    /// The canonical string this request's signature is computed over.
    pub fn canonical_string(&self) -> Result<String, TimestampError> {
        let ts = self.parsed_timestamp()?;
        Ok(canonical_string(
            &ts,
            &self.partner_key,
            &self.partner_ref_no,
            self.total_amount,
            &self.partner_password,
        ))
    }

    /// Fill in `sig` from the current field values.
    ///
    /// This is what partner tooling does before sending; the gateway itself
    /// only ever verifies.
    pub fn sign(&mut self) -> Result<(), TimestampError> {
        self.signature = encode_signature(&self.canonical_string()?);
        Ok(())
    }

    /// A copy safe to write to logs: the partner password is replaced.
    pub fn redacted(&self) -> TransactionRequest {
        TransactionRequest {
            partner_password: REDACTED.to_string(),
            ..self.clone()
        }
    }
}

/// Decode `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Replacement text for secrets in log output.
pub const REDACTED: &str = "[REDACTED]";

/// Parse an ISO-8601 instant that carries an explicit offset.
pub fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>, TimestampError> {
    let trimmed = value.trim();
    DateTime::parse_from_rfc3339(trimmed)
        .or_else(|_| DateTime::parse_from_str(trimmed, COMPACT_OFFSET_FORMAT))
        .map_err(|_| TimestampError {
            value: value.to_string(),
        })
}

/// Render an instant the way partner tooling sends it: RFC 3339 with
/// millisecond precision and an explicit offset.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(chrono::SecondsFormat::Millis, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn decodes_wire_field_names() {
        let json = r#"{
            "partnerkey": "FAKEGOOGLE",
            "partnerrefno": "FA0000001",
            "partnerpassword": "FAKEPASSWORD1234",
            "totalamount": 1000,
            "timestamp": "2024-08-15T02:11:22.0000000Z",
            "sig": "abc=",
            "items": [{ "itemref": "i-00001", "name": "Pen", "qty": 2, "unitprice": 500 }]
        }"#;
        let req: TransactionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.partner_key, "FAKEGOOGLE");
        assert_eq!(req.partner_ref_no, "FA0000001");
        assert_eq!(req.total_amount, 1000);
        assert_eq!(req.signature, "abc=");
        assert_eq!(req.items.len(), 1);
        assert_eq!(req.items[0].item_ref, "i-00001");
        assert_eq!(req.items[0].unit_price, 500);
    }

    #[test]
    fn missing_fields_decode_to_zero_values() {
        let req: TransactionRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req, TransactionRequest::default());
        assert!(req.items.is_empty());
    }

    #[test]
    fn null_fields_decode_to_zero_values() {
        let json = r#"{
            "partnerkey": null,
            "partnerrefno": null,
            "partnerpassword": null,
            "totalamount": null,
            "timestamp": null,
            "sig": null,
            "items": null
        }"#;
        let req: TransactionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req, TransactionRequest::default());
    }

    #[test]
    fn null_item_fields_decode_to_zero_values() {
        let json = r#"{ "items": [{ "itemref": null, "name": null, "qty": null, "unitprice": null }] }"#;
        let req: TransactionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.items, vec![ItemDetail::default()]);
    }

    #[test]
    fn wrong_types_still_fail_to_decode() {
        assert!(serde_json::from_str::<TransactionRequest>(r#"{ "items": "none" }"#).is_err());
        assert!(serde_json::from_str::<TransactionRequest>(r#"{ "totalamount": "lots" }"#).is_err());
    }

    #[test]
    fn encodes_wire_field_names() {
        let json = serde_json::to_value(TransactionRequest::default()).unwrap();
        for key in [
            "partnerkey",
            "partnerrefno",
            "partnerpassword",
            "totalamount",
            "timestamp",
            "sig",
            "items",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn parses_rfc3339_and_compact_offsets() {
        let a = parse_timestamp("2020-07-28T12:34:23.00+08:00").unwrap();
        let b = parse_timestamp("2020-07-28T12:34:23.00+0800").unwrap();
        let c = parse_timestamp("2020-07-28T04:34:23Z").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.with_timezone(&Utc).hour(), 4);
    }

    #[test]
    fn parses_seven_digit_fraction() {
        let ts = parse_timestamp("2024-08-15T10:11:22.1234567+08:00").unwrap();
        assert_eq!(ts.with_timezone(&Utc).second(), 22);
    }

    #[test]
    fn rejects_timestamp_without_offset() {
        assert!(parse_timestamp("2020-07-28T12:34:23").is_err());
    }

    #[test]
    fn rejects_garbage_timestamp() {
        let err = parse_timestamp("yesterday").unwrap_err();
        assert_eq!(err.value, "yesterday");
    }

    #[test]
    fn format_round_trips_through_parse() {
        let now = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap();
        let parsed = parse_timestamp(&format_timestamp(&now)).unwrap();
        assert_eq!(parsed.with_timezone(&Utc), now);
    }

    #[test]
    fn sign_fills_verifiable_signature() {
        let mut req = TransactionRequest {
            partner_key: "FAKEGOOGLE".into(),
            partner_ref_no: "FA0000001".into(),
            partner_password: "FAKEPASSWORD1234".into(),
            total_amount: 1000,
            timestamp: "2020-07-28T12:34:23.00+0800".into(),
            ..Default::default()
        };
        req.sign().unwrap();

        assert_eq!(
            req.canonical_string().unwrap(),
            "20200728043423FAKEGOOGLEFA00000011000FAKEPASSWORD1234"
        );
        assert!(crate::crypto::verify_signature(
            &req.canonical_string().unwrap(),
            &req.signature
        ));
    }

    #[test]
    fn sign_needs_a_timestamp() {
        let mut req = TransactionRequest::default();
        assert!(req.sign().is_err());
        assert!(req.signature.is_empty());
    }

    #[test]
    fn redacted_hides_only_the_password() {
        let req = TransactionRequest {
            partner_key: "K".into(),
            partner_password: "secret".into(),
            ..Default::default()
        };
        let red = req.redacted();
        assert_eq!(red.partner_password, REDACTED);
        assert_eq!(red.partner_key, "K");
        assert!(!serde_json::to_string(&red).unwrap().contains("secret"));
    }
}
