//! Structural validation of submissions.
//!
//! Every field rule is evaluated, so one response lists every problem with
//! the message. Each malformed field yields exactly one violation: an empty
//! or whitespace-only value reports "required" and skips its length or
//! format rule.
//!
//! String lengths are counted in UTF-16 code units, the unit partners'
//! tooling measures in. A character outside the Basic Multilingual Plane
//! counts as two.
//!
//! The one exception is a timestamp that cannot be parsed. That is fatal
//! and returned on its own as [`StructuralError::MalformedTimestamp`]; the
//! hosting layer answers it with a generic "could not read" response rather
//! than a field list.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use super::types::{parse_timestamp, ItemDetail, TimestampError, TransactionRequest};
use crate::config::{
    ITEM_NAME_MAX_LEN, ITEM_QTY_MAX, ITEM_QTY_MIN, ITEM_REF_MAX_LEN, PARTNER_KEY_MAX_LEN,
    PARTNER_REF_NO_MAX_LEN, PARTNER_REF_NO_MIN_LEN,
};
use crate::crypto::is_signature_format;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// A single field-level problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Wire path of the field, e.g. `partnerkey` or `items[0].qty`.
    pub field: String,
    /// Human-readable message returned to the partner.
    pub message: String,
}

impl Violation {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Why a submission was refused before reaching the pipeline.
#[derive(Debug, Error)]
pub enum StructuralError {
    /// One or more fields broke their rules. Ordered by field position.
    #[error("{} validation error(s)", .0.len())]
    Violations(Vec<Violation>),

    /// The timestamp is present but unreadable.
    #[error("malformed timestamp: {0}")]
    MalformedTimestamp(#[from] TimestampError),
}

impl StructuralError {
    /// The violation list, empty for a fatal timestamp error.
    pub fn violations(&self) -> &[Violation] {
        match self {
            StructuralError::Violations(v) => v,
            StructuralError::MalformedTimestamp(_) => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check a submission and all of its item lines.
///
/// # Errors
///
/// [`StructuralError::MalformedTimestamp`] if the timestamp is non-empty but
/// unparsable, otherwise [`StructuralError::Violations`] when any rule fails.
pub fn validate_request(req: &TransactionRequest) -> Result<(), StructuralError> {
    if !req.timestamp.trim().is_empty() {
        parse_timestamp(&req.timestamp)?;
    }

    let mut violations = request_violations(req);
    for (index, item) in req.items.iter().enumerate() {
        violations.extend(item_violations(item, &format!("items[{index}].")));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(StructuralError::Violations(violations))
    }
}

/// Field rules of the message envelope, without its items.
pub fn request_violations(req: &TransactionRequest) -> Vec<Violation> {
    let mut out = Vec::new();

    if let Some(v) = check_length(
        "partnerkey",
        &req.partner_key,
        1,
        PARTNER_KEY_MAX_LEN,
        "The partnerkey require valid key.",
    ) {
        out.push(v);
    }

    if let Some(v) = check_length(
        "partnerrefno",
        &req.partner_ref_no,
        PARTNER_REF_NO_MIN_LEN,
        PARTNER_REF_NO_MAX_LEN,
        "The partnerrefno require valid reference number.",
    ) {
        out.push(v);
    }

    // No upper bound on the password.
    if is_blank(&req.partner_password) {
        out.push(required("partnerpassword"));
    }

    if req.total_amount < 1 {
        out.push(Violation::new(
            "totalamount",
            "The totalamount require positive value.",
        ));
    }

    if is_blank(&req.timestamp) {
        out.push(required("timestamp"));
    }

    if is_blank(&req.signature) {
        out.push(required("sig"));
    } else if !is_signature_format(&req.signature) {
        out.push(Violation::new("sig", "The sig require valid signature format."));
    }

    out
}

/// Field rules of one item line. `prefix` is prepended to field names.
pub fn item_violations(item: &ItemDetail, prefix: &str) -> Vec<Violation> {
    let mut out = Vec::new();

    if let Some(v) = check_length(
        &format!("{prefix}itemref"),
        &item.item_ref,
        1,
        ITEM_REF_MAX_LEN,
        "The itemref require valid reference number.",
    ) {
        out.push(v);
    }

    if let Some(v) = check_length(
        &format!("{prefix}name"),
        &item.name,
        1,
        ITEM_NAME_MAX_LEN,
        &format!(
            "The field name must be a string with a minimum length of 1 and a maximum length of {ITEM_NAME_MAX_LEN}."
        ),
    ) {
        out.push(v);
    }

    if !(ITEM_QTY_MIN..=ITEM_QTY_MAX).contains(&item.qty) {
        out.push(Violation::new(
            format!("{prefix}qty"),
            format!("The field qty must be between {ITEM_QTY_MIN} and {ITEM_QTY_MAX}."),
        ));
    }

    if item.unit_price < 1 {
        out.push(Violation::new(
            format!("{prefix}unitprice"),
            "The unitprice require positive value.",
        ));
    }

    out
}

/// The "required" message reports the bare field name, not its path.
fn required(field: &str) -> Violation {
    let name = field.rsplit('.').next().unwrap_or(field);
    Violation::new(field, format!("The {name} field is required."))
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn utf16_len(value: &str) -> usize {
    value.encode_utf16().count()
}

fn check_length(
    field: &str,
    value: &str,
    min: usize,
    max: usize,
    message: &str,
) -> Option<Violation> {
    if is_blank(value) {
        return Some(required(field));
    }
    let len = utf16_len(value);
    if len < min || len > max {
        return Some(Violation::new(field, message));
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
