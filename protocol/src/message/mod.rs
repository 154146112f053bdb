//! # Submission Messages
//!
//! The inbound message shape and its structural rules.
//!
//! ```text
//! types.rs     : TransactionRequest / ItemDetail wire types, timestamp parsing
//! validation.rs: field-level rules, violation reporting
//! ```
//!
//! Structural validation runs before the pipeline and gates entry to it. The
//! pipeline does not repeat these checks.

pub mod types;
pub mod validation;

pub use types::{
    format_timestamp, parse_timestamp, ItemDetail, TimestampError, TransactionRequest, REDACTED,
};
pub use validation::{
    item_violations, request_violations, validate_request, StructuralError, Violation,
};
